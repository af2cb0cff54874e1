//! `ci-triage` entry point.
//!
//! The composition root: parses configuration, installs logging, builds the
//! GitHub and Gemini adapters, wires them into a [`PipelineExecutor`], and
//! maps the outcome onto the process exit code (`0` delivered or nothing to
//! deliver, `2` configuration or logging setup error, `1` any other failure).

mod config;
mod telemetry;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use github::GithubClient;
use llm::GeminiProvider;
use nodes::{DeliveryResolver, DiagnosisRequester, LogFetcher, PipelineExecutor};
use pipeline::{DeliveryOutcome, PipelineError, PipelineRunId};
use tracing::{error, info, info_span, Instrument};

use crate::config::{CliConfig, RunSettings};

#[tokio::main]
async fn main() -> ExitCode {
    let config = CliConfig::parse();

    let telemetry = match telemetry::init(config.log_format, config.otlp_endpoint.as_deref()) {
        Ok(telemetry) => telemetry,
        Err(error) => {
            let failure = PipelineError::config(format!("{error:#}"));
            eprintln!("error: {failure}");
            return ExitCode::from(failure.exit_code());
        }
    };

    let run_id = PipelineRunId::new_random();
    let outcome = run(&config)
        .instrument(info_span!("ci_triage", %run_id))
        .await;

    let code = match outcome {
        Ok(DeliveryOutcome::Delivered(receipt)) => {
            info!(
                %run_id,
                destination = %receipt.target,
                number = %receipt.number,
                url = receipt.html_url.as_deref().unwrap_or(""),
                "triage complete"
            );
            ExitCode::SUCCESS
        }
        Ok(DeliveryOutcome::NoDestination) => {
            info!(%run_id, "nothing delivered");
            ExitCode::SUCCESS
        }
        Err(failure) => {
            error!(%run_id, kind = failure.kind(), error = %failure, "triage failed");
            eprintln!("error: {failure}");
            ExitCode::from(failure.exit_code())
        }
    };

    telemetry.shutdown();
    code
}

async fn run(config: &CliConfig) -> Result<DeliveryOutcome, PipelineError> {
    let RunSettings {
        context,
        signals,
        executor,
        strategy,
        github,
        gemini,
    } = config.validate()?;

    let host = Arc::new(
        GithubClient::new(github).map_err(|error| PipelineError::config(error.to_string()))?,
    );
    let model = Arc::new(
        GeminiProvider::new(gemini).map_err(|error| PipelineError::config(error.to_string()))?,
    );

    let executor = PipelineExecutor::new(
        LogFetcher::new(host.clone(), strategy),
        DiagnosisRequester::new(model),
        DeliveryResolver::new(host),
        executor,
    );

    let association = signals.resolve();
    info!(
        repo = %context.repository,
        run = %context.run_id,
        job = %context.job_id,
        ?association,
        "triaging failed job"
    );
    executor.run(&context, association).await
}
