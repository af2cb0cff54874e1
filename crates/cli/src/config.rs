//! Command-line and environment configuration.
//!
//! Every option can be given as a flag or through the environment variable
//! GitHub Actions (or the workflow author) sets. [`CliConfig::validate`] turns
//! the raw strings into typed settings and is the only place a
//! [`PipelineError::Config`] is produced; it runs before any network call.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use github::{GithubConfig, DEFAULT_API_BASE};
use llm::{GeminiConfig, DEFAULT_GEMINI_API_BASE, DEFAULT_GEMINI_MODEL};
use nodes::ExecutorSettings;
use pipeline::{
    AssociationSignals, FailureContext, IssueNumber, JobId, LogBudget, LogFetchStrategy,
    ModelName, PipelineError, RepositoryId, RunId,
};
use tracing::debug;

pub const DEFAULT_SERVER_URL: &str = "https://github.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per event.
    Json,
}

/// Diagnose a failed CI job and post the analysis to its pull request or
/// tracking issue.
#[derive(Debug, Clone, Parser)]
#[command(name = "ci-triage", version)]
pub struct CliConfig {
    /// Repository in `owner/name` form.
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repository: Option<String>,

    /// Workflow run that failed.
    #[arg(long, env = "FAILED_WORKFLOW_RUN_ID")]
    pub run_id: Option<String>,

    /// Job inside the run whose log is analysed.
    #[arg(long, env = "FAILED_JOB_ID")]
    pub job_id: Option<String>,

    #[arg(long, env = "FAILED_WORKFLOW_NAME")]
    pub workflow_name: Option<String>,

    #[arg(long, env = "FAILED_JOB_NAME")]
    pub job_name: Option<String>,

    /// Link to the run; derived from the server URL when absent.
    #[arg(long, env = "FAILED_RUN_URL")]
    pub run_url: Option<String>,

    /// Pull request the failure belongs to.
    #[arg(long, env = "PR_NUMBER")]
    pub pr_number: Option<String>,

    /// JSON array of the run's associated pull requests.
    #[arg(long, env = "PULL_REQUESTS_JSON")]
    pub pull_requests_json: Option<String>,

    /// Path of the triggering event payload.
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    pub event_path: Option<PathBuf>,

    #[arg(long, env = "GITHUB_REF")]
    pub git_ref: Option<String>,

    /// Issue that collects failures not tied to a pull request.
    #[arg(long, env = "TRACKING_ISSUE_NUMBER")]
    pub tracking_issue: Option<String>,

    /// `list` walks the run's jobs; `direct` downloads the job log by id.
    #[arg(long, env = "LOG_FETCH_STRATEGY", default_value_t = LogFetchStrategy::ListRunJobs)]
    pub log_strategy: LogFetchStrategy,

    /// Characters of log tail handed to the model.
    #[arg(long, env = "LOG_BUDGET", default_value_t = LogBudget::DEFAULT.as_usize())]
    pub log_budget: usize,

    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_BASE)]
    pub github_api_url: String,

    #[arg(long, env = "GITHUB_SERVER_URL", default_value = DEFAULT_SERVER_URL)]
    pub github_server_url: String,

    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub google_api_key: Option<String>,

    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_GEMINI_MODEL)]
    pub model: String,

    #[arg(long, env = "GEMINI_API_BASE", default_value = DEFAULT_GEMINI_API_BASE)]
    pub gemini_api_base: String,

    /// Timeout of every HTTP request, in seconds.
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 60)]
    pub request_timeout_secs: u64,

    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// OTLP collector for span export; spans stay local when unset.
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}

/// Typed settings for one invocation.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub context: FailureContext,
    pub signals: AssociationSignals,
    pub executor: ExecutorSettings,
    pub strategy: LogFetchStrategy,
    pub github: GithubConfig,
    pub gemini: GeminiConfig,
}

impl CliConfig {
    pub fn validate(&self) -> Result<RunSettings, PipelineError> {
        let repository = required(&self.repository, "GITHUB_REPOSITORY")?;
        let repository = RepositoryId::new(repository).ok_or_else(|| {
            PipelineError::config(format!(
                "GITHUB_REPOSITORY must be `owner/name`, got `{repository}`"
            ))
        })?;

        let run_id = required(&self.run_id, "FAILED_WORKFLOW_RUN_ID")?
            .parse::<RunId>()
            .map_err(|error| PipelineError::config(format!("FAILED_WORKFLOW_RUN_ID: {error}")))?;

        let job_id = required(&self.job_id, "FAILED_JOB_ID")?;
        let job_id = JobId::new(job_id)
            .ok_or_else(|| PipelineError::config("FAILED_JOB_ID is blank"))?;

        let workflow_name = optional(&self.workflow_name)
            .unwrap_or("unknown workflow")
            .to_string();
        let job_name = optional(&self.job_name)
            .map(str::to_string)
            .unwrap_or_else(|| format!("job {job_id}"));
        let run_url = optional(&self.run_url)
            .map(str::to_string)
            .unwrap_or_else(|| {
                format!(
                    "{}/{repository}/actions/runs/{run_id}",
                    self.github_server_url.trim_end_matches('/')
                )
            });

        let tracking_issue = optional(&self.tracking_issue)
            .map(|raw| {
                raw.parse::<IssueNumber>().map_err(|error| {
                    PipelineError::config(format!("TRACKING_ISSUE_NUMBER: {error}"))
                })
            })
            .transpose()?;

        let log_budget = LogBudget::new(self.log_budget)
            .ok_or_else(|| PipelineError::config("log budget must be greater than zero"))?;

        let github_token = required(&self.github_token, "GITHUB_TOKEN")?;
        let google_api_key = required(&self.google_api_key, "GOOGLE_API_KEY")?;
        let model = ModelName::new(&self.model)
            .ok_or_else(|| PipelineError::config("GEMINI_MODEL is blank"))?;
        let request_timeout = Duration::from_secs(self.request_timeout_secs.max(1));

        Ok(RunSettings {
            context: FailureContext {
                repository,
                workflow_name,
                run_id,
                job_id,
                job_name,
                run_url,
            },
            signals: self.association_signals(),
            executor: ExecutorSettings {
                log_budget,
                tracking_issue,
            },
            strategy: self.log_strategy,
            github: GithubConfig {
                api_base: self.github_api_url.clone(),
                token: github_token.to_string(),
                request_timeout,
            },
            gemini: GeminiConfig {
                api_base: self.gemini_api_base.clone(),
                api_key: google_api_key.to_string(),
                model,
                request_timeout,
            },
        })
    }

    /// Collects the pull-request signals. An unreadable event file counts as
    /// no signal.
    fn association_signals(&self) -> AssociationSignals {
        let event_payload = self.event_path.as_ref().and_then(|path| {
            std::fs::read_to_string(path)
                .inspect_err(|error| {
                    debug!(path = %path.display(), %error, "event payload unreadable; ignored");
                })
                .ok()
        });

        AssociationSignals {
            explicit: optional(&self.pr_number).map(str::to_string),
            pull_requests_json: optional(&self.pull_requests_json).map(str::to_string),
            event_payload,
            git_ref: optional(&self.git_ref).map(str::to_string),
        }
    }
}

fn optional(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, PipelineError> {
    optional(value).ok_or_else(|| PipelineError::config(format!("{name} is not set")))
}
