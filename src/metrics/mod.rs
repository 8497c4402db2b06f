//! Latency reporting to InfluxDB v2

use crate::defaults::MEASUREMENT_NAME;
use crate::error::{AppError, Result};
use crate::logging::HttpLogger;
use crate::models::MetricsConfig;
use futures::stream;
use influxdb2::models::DataPoint;
use influxdb2::Client;
use std::time::Instant;

/// Point recording one probe run. An empty host leaves the point untagged.
pub fn response_time_point(host: &str, seconds: f64) -> Result<DataPoint> {
    let mut builder = DataPoint::builder(MEASUREMENT_NAME);
    if !host.is_empty() {
        builder = builder.tag("host", host);
    }

    builder
        .field("seconds", seconds)
        .build()
        .map_err(|e| AppError::metrics(e.to_string()))
}

/// Writes latency samples to one InfluxDB bucket
pub struct InfluxWriter {
    client: Client,
    bucket: String,
    host: String,
    target: String,
    logger: HttpLogger,
}

impl InfluxWriter {
    pub fn new(config: &MetricsConfig) -> Self {
        Self {
            client: Client::new(config.url.as_str(), config.org.as_str(), config.token.as_str()),
            bucket: config.bucket.clone(),
            host: config.host.clone(),
            target: format!("{} (org={}, bucket={})", config.url, config.org, config.bucket),
            logger: HttpLogger::new("InfluxDB"),
        }
    }

    /// Record one run's elapsed time and wait for the server to acknowledge it
    pub async fn write_response_time(&self, seconds: f64) -> Result<()> {
        let point = response_time_point(&self.host, seconds)?;

        let started = Instant::now();
        let result = self.client.write(&self.bucket, stream::iter(vec![point])).await;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        match result {
            Ok(()) => {
                self.logger.log_request("POST", &self.target, true, None, elapsed_ms);
                Ok(())
            }
            Err(e) => {
                self.logger.log_request("POST", &self.target, false, None, elapsed_ms);
                Err(AppError::metrics(e.to_string()))
            }
        }
    }
}
