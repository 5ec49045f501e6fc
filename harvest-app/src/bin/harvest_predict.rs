use anyhow::Result;
use harvest_app::{Layout, PredictOptions, run_predict};
use harvest_common::observability::{LogConfig, LogFormat, init_logging};
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    init_logging(LogConfig {
        app_name: "harvest-predict",
        emit_stderr: true,
        format: LogFormat::from_env(),
        ..LogConfig::default()
    })?;

    let layout = Layout::discover()?;
    let mut stdout = std::io::stdout().lock();
    let outcome = run_predict(&layout, PredictOptions::default(), &mut stdout).await?;
    outcome.report();
    Ok(ExitCode::from(outcome.exit_status()))
}
