//! Command-line interface

use clap::Parser;
use std::path::PathBuf;

use crate::logging::{LogFormat, LogLevel, LogSettings};

/// S3 Response Time - times a full S3 object lifecycle against an endpoint
#[derive(Parser, Debug, Clone)]
#[command(name = "s3-response-time")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// File that contains the configuration
    #[arg(short = 'c', long = "config", value_name = "configuration_file")]
    pub configuration_file: PathBuf,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// Emit log records as JSON
    #[arg(long)]
    pub log_json: bool,

    /// Force colored output
    #[arg(long)]
    pub color: bool,
}

impl Cli {
    /// Logging settings implied by the verbosity flags
    pub fn log_settings(&self) -> LogSettings {
        let min_level = if self.debug {
            LogLevel::Debug
        } else if self.verbose {
            LogLevel::Info
        } else {
            LogLevel::Warn
        };

        LogSettings {
            min_level,
            use_color: self.color,
            include_location: self.debug,
            format: if self.log_json { LogFormat::Json } else { LogFormat::Console },
        }
    }
}
