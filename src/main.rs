//! S3 Response Time - Main CLI Application
//!
//! Times one full S3 object lifecycle against the configured endpoint and
//! reports `OK - total_time: <secs>` or a single `CRITICAL - <error>` line.

use clap::Parser;
use s3_response_time::{
    app::App,
    cli::Cli,
    logging::{self, Logger},
    output::ConsoleReporter,
};
use std::process;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        println!("CRITICAL - Application panic: {}", panic_info);
        process::exit(s3_response_time::error::FAILURE_EXIT_CODE);
    }));

    let cli = Cli::parse();
    logging::init(cli.log_settings());

    let mut reporter = ConsoleReporter::stdout(cli.color);

    if let Err(e) = App::new(cli).run(&mut reporter).await {
        if reporter.critical(&e).is_err() {
            eprintln!("{}", e.format_for_console(false));
        }

        Logger::new("main")
            .error("Probe failed")
            .field("error", e.to_string())
            .error_info(&e)
            .log();

        process::exit(e.exit_code());
    }
}
