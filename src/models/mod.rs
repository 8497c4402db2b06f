//! Data models shared across the probe

pub mod config;

// Re-export main model types
pub use config::{Config, MetricsConfig};
