//! Configuration data model and validation

use crate::config::{keys, parse_bool, ConfigMap};
use crate::defaults;
use crate::error::{AppError, Result};
use crate::storage::AddressingStyle;
use serde::Serialize;
use std::path::PathBuf;

/// Typed view of the merged configuration.
///
/// Built once from the flat [`ConfigMap`]; flags are already booleans here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    /// Storage endpoint URL
    pub s3_host: String,

    /// Access key
    pub access_key_id: String,

    /// Secret key
    #[serde(skip_serializing)]
    pub secret_access_key: String,

    /// How bucket names are placed in request URLs
    pub addressing_style: AddressingStyle,

    /// Payload size in MiB; zero yields an empty object
    pub object_size_mb: u64,

    /// Create the bucket before the run and delete it afterwards
    pub create_bucket: bool,

    /// Fixed bucket name; `None` means a fresh name per run
    pub bucket_name: Option<String>,

    /// Region handed to the storage client
    pub region: String,

    /// Directory holding the payload and downloaded files
    pub scratch_dir: PathBuf,

    /// Metrics backend settings, present only when reporting is enabled
    pub metrics: Option<MetricsConfig>,
}

/// InfluxDB connection settings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsConfig {
    pub url: String,
    #[serde(skip_serializing)]
    pub token: String,
    pub org: String,
    pub bucket: String,
    pub host: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            s3_host: defaults::DEFAULT_S3_HOST.to_string(),
            access_key_id: String::new(),
            secret_access_key: String::new(),
            addressing_style: AddressingStyle::Auto,
            object_size_mb: 1,
            create_bucket: true,
            bucket_name: None,
            region: defaults::DEFAULT_REGION.to_string(),
            scratch_dir: PathBuf::from(defaults::DEFAULT_SCRATCH_DIR),
            metrics: None,
        }
    }
}

impl Config {
    /// Build the typed configuration from a merged option map
    pub fn from_map(map: &ConfigMap) -> Result<Self> {
        let object_size = value(map, keys::OBJECT_SIZE)?;
        let object_size_mb = object_size.trim().parse::<u64>()
            .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", keys::OBJECT_SIZE, object_size, e)))?;

        let addressing_style = value(map, keys::ADDRESSING_STYLE)?.parse::<AddressingStyle>()?;

        let metrics = if flag(map, keys::INFLUXDB_ENABLED)? {
            Some(MetricsConfig {
                url: value(map, keys::INFLUXDB_URL)?.to_string(),
                token: value(map, keys::INFLUXDB_TOKEN)?.to_string(),
                org: value(map, keys::INFLUXDB_ORG)?.to_string(),
                bucket: value(map, keys::INFLUXDB_BUCKET)?.to_string(),
                host: value(map, keys::INFLUXDB_HOST)?.to_string(),
            })
        } else {
            None
        };

        let config = Self {
            s3_host: value(map, keys::S3_HOST)?.to_string(),
            access_key_id: value(map, keys::AWS_ACCESS_KEY_ID)?.to_string(),
            secret_access_key: value(map, keys::AWS_SECRET_ACCESS_KEY)?.to_string(),
            addressing_style,
            object_size_mb,
            create_bucket: flag(map, keys::CREATE_BUCKET)?,
            bucket_name: non_empty(value(map, keys::BUCKET_NAME)?),
            region: value(map, keys::REGION)?.trim().to_string(),
            scratch_dir: PathBuf::from(value(map, keys::SCRATCH_DIR)?),
            metrics,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration and return the first error
    pub fn validate(&self) -> Result<()> {
        validate_endpoint(keys::S3_HOST, &self.s3_host)?;

        if self.region.is_empty() {
            return Err(AppError::config("Region cannot be empty"));
        }

        if self.payload_size_bytes().is_none() {
            return Err(AppError::config(format!("Object size of {} MB is too large", self.object_size_mb)));
        }

        if self.scratch_dir.as_os_str().is_empty() {
            return Err(AppError::config("Scratch directory cannot be empty"));
        }

        if let Some(metrics) = &self.metrics {
            validate_endpoint(keys::INFLUXDB_URL, &metrics.url)?;
        }

        Ok(())
    }

    /// Payload size in bytes, `None` on overflow
    pub fn payload_size_bytes(&self) -> Option<u64> {
        self.object_size_mb.checked_mul(defaults::BYTES_PER_MB)
    }
}

fn value<'a>(map: &'a ConfigMap, key: &str) -> Result<&'a str> {
    map.get(key)
        .map(String::as_str)
        .ok_or_else(|| AppError::config(format!("Missing configuration key '{}'", key)))
}

fn flag(map: &ConfigMap, key: &str) -> Result<bool> {
    parse_bool(key, value(map, key)?)
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn validate_endpoint(key: &str, endpoint: &str) -> Result<()> {
    if endpoint.trim().is_empty() {
        return Err(AppError::config(format!("{} cannot be empty", key)));
    }

    let parsed = url::Url::parse(endpoint)
        .map_err(|e| AppError::config(format!("Invalid {} '{}': {}", key, endpoint, e)))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AppError::config(format!("{} must use http or https: {}", key, endpoint)));
    }

    if parsed.host_str().is_none() {
        return Err(AppError::config(format!("{} must include a host: {}", key, endpoint)));
    }

    Ok(())
}
