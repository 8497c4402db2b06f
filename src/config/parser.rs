//! Configuration file loading
//!
//! The file is a flat JSON object. Its values are merged over a fixed set of
//! defaults, giving a map that always contains every known key.

use crate::{
    defaults,
    error::{AppError, Result},
    logging::Logger,
    models::Config,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Flat mapping of option name to text value
pub type ConfigMap = BTreeMap<String, String>;

/// Recognized configuration keys
pub mod keys {
    pub const S3_HOST: &str = "s3_host";
    pub const AWS_ACCESS_KEY_ID: &str = "aws_access_key_id";
    pub const AWS_SECRET_ACCESS_KEY: &str = "aws_secret_access_key";
    pub const ADDRESSING_STYLE: &str = "addressing_style";
    pub const OBJECT_SIZE: &str = "object_size";
    pub const CREATE_BUCKET: &str = "create_bucket";
    pub const BUCKET_NAME: &str = "bucket_name";
    pub const REGION: &str = "region";
    pub const SCRATCH_DIR: &str = "scratch_dir";
    pub const INFLUXDB_ENABLED: &str = "influxdb_enabled";
    pub const INFLUXDB_URL: &str = "influxdb_url";
    pub const INFLUXDB_TOKEN: &str = "influxdb_token";
    pub const INFLUXDB_ORG: &str = "influxdb_org";
    pub const INFLUXDB_BUCKET: &str = "influxdb_bucket";
    pub const INFLUXDB_HOST: &str = "influxdb_host";
}

/// The default option map every configuration file is merged over
pub fn default_configuration() -> ConfigMap {
    [
        (keys::S3_HOST, defaults::DEFAULT_S3_HOST),
        (keys::AWS_ACCESS_KEY_ID, ""),
        (keys::AWS_SECRET_ACCESS_KEY, ""),
        (keys::ADDRESSING_STYLE, defaults::DEFAULT_ADDRESSING_STYLE),
        (keys::OBJECT_SIZE, defaults::DEFAULT_OBJECT_SIZE_MB),
        (keys::CREATE_BUCKET, defaults::DEFAULT_CREATE_BUCKET),
        (keys::BUCKET_NAME, ""),
        (keys::REGION, defaults::DEFAULT_REGION),
        (keys::SCRATCH_DIR, defaults::DEFAULT_SCRATCH_DIR),
        (keys::INFLUXDB_ENABLED, defaults::DEFAULT_INFLUXDB_ENABLED),
        (keys::INFLUXDB_URL, defaults::DEFAULT_INFLUXDB_URL),
        (keys::INFLUXDB_TOKEN, ""),
        (keys::INFLUXDB_ORG, ""),
        (keys::INFLUXDB_BUCKET, ""),
        (keys::INFLUXDB_HOST, ""),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), value.to_string()))
    .collect()
}

/// Parse a textual boolean flag.
///
/// Accepts `y yes t true on 1` and `n no f false off 0`, ignoring case and
/// surrounding whitespace.
pub fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "t" | "true" | "on" | "1" => Ok(true),
        "n" | "no" | "f" | "false" | "off" | "0" => Ok(false),
        _ => Err(AppError::config(format!("Invalid truth value '{}' for {}", value, key))),
    }
}

/// Read the configuration file and merge it over the defaults
pub fn read_configuration(path: &Path) -> Result<ConfigMap> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| AppError::config(format!("No configuration found: {}: {}", path.display(), e)))?;

    let file_configuration = parse_document(&content)?;

    let logger = Logger::new("CONFIG");
    let known = default_configuration();
    for key in file_configuration.keys().filter(|k| !known.contains_key(*k)) {
        logger.debug(&format!("Ignoring unknown configuration key '{}'", key))
            .field("key", key)
            .log();
    }

    Ok(merge(known, file_configuration))
}

/// Parse a JSON document into text values
pub fn parse_document(content: &str) -> Result<ConfigMap> {
    let document: Value = serde_json::from_str(content)?;

    let object = match document {
        Value::Object(object) => object,
        other => {
            return Err(AppError::config(format!(
                "Could not decode configuration JSON: expected an object, found {}",
                json_type_name(&other)
            )))
        }
    };

    object
        .into_iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => if b { "True".to_string() } else { "False".to_string() },
                other => {
                    return Err(AppError::config(format!(
                        "Configuration key '{}' must be a string, number or boolean, found {}",
                        key,
                        json_type_name(&other)
                    )))
                }
            };
            Ok((key, text))
        })
        .collect()
}

/// Overlay `overrides` on `base`; keys present in `overrides` win
pub fn merge(mut base: ConfigMap, overrides: ConfigMap) -> ConfigMap {
    base.extend(overrides);
    base
}

/// Convenience function to load the typed configuration from a file
pub fn load_config(path: &Path) -> Result<Config> {
    let map = read_configuration(path)?;
    Config::from_map(&map)
}

/// Display configuration summary for debug purposes
pub fn display_config_summary(config: &Config) -> String {
    let mut summary = Vec::new();

    summary.push(format!("S3 Host: {}", config.s3_host));
    summary.push(format!("Access Key: {}", redact(&config.access_key_id)));
    summary.push(format!("Addressing Style: {}", config.addressing_style));
    summary.push(format!("Region: {}", config.region));
    summary.push(format!("Object Size: {} MB", config.object_size_mb));
    summary.push(format!("Create Bucket: {}", config.create_bucket));
    summary.push(format!("Bucket Name: {}", config.bucket_name.as_deref().unwrap_or("<generated>")));
    summary.push(format!("Scratch Dir: {}", config.scratch_dir.display()));
    match &config.metrics {
        Some(metrics) => {
            summary.push(format!("InfluxDB: {} (org={}, bucket={}, host={})",
                metrics.url, metrics.org, metrics.bucket, metrics.host));
        }
        None => summary.push("InfluxDB: disabled".to_string()),
    }

    summary.join("\n")
}

fn redact(value: &str) -> String {
    match value.len() {
        0 => "<empty>".to_string(),
        1..=4 => "****".to_string(),
        _ => format!("{}****", value.chars().take(4).collect::<String>()),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
