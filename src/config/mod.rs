//! Configuration management module

pub mod parser;
pub mod validation;

// Re-export main functionality
pub use parser::{
    default_configuration, display_config_summary, keys, load_config,
    merge, parse_bool, parse_document, read_configuration, ConfigMap,
};
pub use validation::{ConfigValidator, ValidationLevel, ValidationWarning};

// Re-export from models for convenience
pub use crate::models::Config;
