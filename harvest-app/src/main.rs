use anyhow::Result;
use harvest_app::{Layout, ScrapeOptions, run_scrape};
use harvest_common::observability::{LogConfig, LogFormat, init_logging};
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let log_file = init_logging(LogConfig {
        emit_stderr: true,
        format: LogFormat::from_env(),
        ..LogConfig::default()
    })?;
    tracing::debug!(log_file = %log_file.display(), "Logging initialised");

    let layout = Layout::discover()?;
    let outcome = run_scrape(&layout, ScrapeOptions::default()).await?;
    outcome.report();
    Ok(ExitCode::from(outcome.exit_status()))
}
