//! aidflow: validate and record aid fund transfers.

use std::process::ExitCode;

use af_cli::cli::{Cli, Command};
use af_cli::commands::{self, Report};
use af_telemetry::{init_telemetry, TelemetryConfig};
use clap::Parser;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = TelemetryConfig::from_env().with_json_logs(cli.json_logs);
    let _guard = match init_telemetry(&config) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: logging disabled: {e}");
            None
        }
    };

    let result = match &cli.command {
        Command::Submit(args) => commands::submit(args).await,
        Command::Totals(args) => commands::totals(args).await,
    };

    match result.and_then(print_report) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn print_report(report: Report) -> anyhow::Result<u8> {
    println!("{}", serde_json::to_string_pretty(&report.output)?);
    Ok(report.status.exit_code())
}
