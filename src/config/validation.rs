//! Non-fatal configuration checks
//!
//! Hard errors live in [`Config::validate`]; this module only produces
//! warnings that are logged before the run starts.

use crate::models::Config;

/// Severity of a validation finding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationLevel {
    Info,
    Warning,
}

/// A single validation finding
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationWarning {
    pub level: ValidationLevel,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(level: ValidationLevel, message: String) -> Self {
        Self { level, message }
    }

    /// Format the finding for console display
    pub fn format(&self, use_color: bool) -> String {
        let label = match self.level {
            ValidationLevel::Info => "INFO",
            ValidationLevel::Warning => "WARNING",
        };

        if use_color {
            use colored::Colorize;
            let label = match self.level {
                ValidationLevel::Info => label.blue().bold(),
                ValidationLevel::Warning => label.yellow().bold(),
            };
            format!("[{}] {}", label, self.message)
        } else {
            format!("[{}] {}", label, self.message)
        }
    }
}

/// Configuration validator producing warnings
pub struct ConfigValidator;

impl ConfigValidator {
    /// Collect every warning for the given configuration
    pub fn warnings(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        warnings.extend(Self::check_credentials(config));
        warnings.extend(Self::check_endpoint(config));
        warnings.extend(Self::check_metrics(config));

        warnings
    }

    fn check_credentials(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if config.access_key_id.is_empty() || config.secret_access_key.is_empty() {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                "S3 credentials are empty; requests will carry empty keys".to_string(),
            ));
        }

        warnings
    }

    fn check_endpoint(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if config.s3_host.starts_with("http://") {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("S3 endpoint '{}' uses plain HTTP", config.s3_host),
            ));
        }

        if config.object_size_mb == 0 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                "object_size is 0; the probe uploads an empty object".to_string(),
            ));
        }

        if !config.create_bucket && config.bucket_name.is_none() {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                "create_bucket is disabled but no bucket_name is set; uploads will target a bucket that does not exist".to_string(),
            ));
        }

        warnings
    }

    fn check_metrics(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        let Some(metrics) = &config.metrics else {
            return warnings;
        };

        for (name, value) in [("influxdb_token", &metrics.token), ("influxdb_org", &metrics.org), ("influxdb_bucket", &metrics.bucket)] {
            if value.is_empty() {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Warning,
                    format!("InfluxDB reporting is enabled but {} is empty", name),
                ));
            }
        }

        if metrics.host.is_empty() {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                "influxdb_host is empty; samples are written without a host tag".to_string(),
            ));
        }

        warnings
    }
}
