//! Main application orchestration and execution

use crate::{
    cli::Cli,
    config::{display_config_summary, load_config, ConfigValidator, ValidationLevel},
    error::Result,
    log_debug, log_info,
    logging::Logger,
    metrics::InfluxWriter,
    output::ConsoleReporter,
    probe::{Probe, ProbeReport, RunIdentifiers},
    storage::S3Client,
    PKG_NAME, VERSION,
};

/// Main application struct that coordinates all components
pub struct App {
    cli: Cli,
    logger: Logger,
}

impl App {
    /// Create a new application instance with CLI configuration
    pub fn new(cli: Cli) -> Self {
        Self {
            cli,
            logger: Logger::new("app"),
        }
    }

    /// Load the configuration, run the lifecycle and report the result
    pub async fn run(self, reporter: &mut ConsoleReporter) -> Result<ProbeReport> {
        self.logger.debug(&format!("{} v{}", PKG_NAME, VERSION))
            .field("build_time", crate::BUILD_TIME)
            .field("git_commit", crate::GIT_COMMIT)
            .field("target", env!("TARGET_TRIPLE"))
            .log();

        let config = load_config(&self.cli.configuration_file)?;

        // Stdout carries the report, so findings go to stderr
        let show_info = self.cli.verbose || self.cli.debug;
        for warning in ConfigValidator::warnings(&config) {
            if warning.level == ValidationLevel::Warning || show_info {
                eprintln!("{}", warning.format(self.cli.color));
            }
        }

        if self.cli.debug {
            self.logger.debug(&format!("Configuration summary:\n{}", display_config_summary(&config)))
                .field("config_file", self.cli.configuration_file.display().to_string())
                .log();
        }

        let client = S3Client::new(&config)?;
        let ids = RunIdentifiers::generate(config.bucket_name.as_deref());
        log_debug!(self.logger, "Probing {} ({} addressing) with bucket {}",
            client.endpoint(), config.addressing_style, ids.bucket);

        let report = Probe::new(&client, &config, reporter).run(ids).await?;

        if let Some(metrics) = &config.metrics {
            InfluxWriter::new(metrics)
                .write_response_time(report.seconds())
                .await?;
            log_info!(self.logger, "Reported {:.3}s to {}", report.seconds(), metrics.url);
        }

        reporter.total_time(report.seconds())?;
        Ok(report)
    }
}
