//! S3 Response Time
//!
//! A synthetic monitoring probe that times a full object-storage lifecycle
//! (bucket create, upload, verify, download, verify, delete) against an
//! S3-compatible endpoint and optionally reports the latency to InfluxDB.

pub mod app;
pub mod checksum;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod output;
pub mod payload;
pub mod probe;
pub mod storage;

// Re-export commonly used types
pub use error::{AppError, Result};
pub use models::{Config, MetricsConfig};
pub use probe::{Probe, ProbeReport, RunIdentifiers};
pub use storage::{AddressingStyle, ObjectStore, S3Client, StorageError};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const BUILD_TIME: &str = env!("BUILD_TIME");
pub const GIT_COMMIT: Option<&str> = option_env!("GIT_COMMIT");

/// Default configuration values
pub mod defaults {
    pub const DEFAULT_S3_HOST: &str = "https://localhost:443";
    pub const DEFAULT_ADDRESSING_STYLE: &str = "auto";
    pub const DEFAULT_OBJECT_SIZE_MB: &str = "1";
    pub const DEFAULT_CREATE_BUCKET: &str = "True";
    pub const DEFAULT_REGION: &str = "us-east-1";
    pub const DEFAULT_SCRATCH_DIR: &str = "/tmp";
    pub const DEFAULT_INFLUXDB_ENABLED: &str = "False";
    pub const DEFAULT_INFLUXDB_URL: &str = "http://localhost:8086";

    /// Bytes per configured object-size unit
    pub const BYTES_PER_MB: u64 = 1024 * 1024;

    /// Read size used when hashing local files
    pub const DIGEST_CHUNK_SIZE: usize = 4096;

    pub const MEASUREMENT_NAME: &str = "response_time";
}
