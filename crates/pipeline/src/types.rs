//! Shared value types for the triage pipeline.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! values with invariants (budgets are non-zero, a failure context always
//! names a valid repository) and flow between pipeline stages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{IssueNumber, JobId, ModelName, RepositoryId, RunId};

// ---------------------------------------------------------------------------
// Failure context
// ---------------------------------------------------------------------------

/// Identifies one failure event.
///
/// Built once per invocation from trigger data and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureContext {
    /// Repository the failed workflow belongs to.
    pub repository: RepositoryId,
    /// Human-readable workflow name (e.g. `"build"`).
    pub workflow_name: String,
    /// The workflow run containing the failed job.
    pub run_id: RunId,
    /// The failed job.
    pub job_id: JobId,
    /// Human-readable job name (e.g. `"test"`).
    pub job_name: String,
    /// Browser URL of the failed run.
    pub run_url: String,
}

// ---------------------------------------------------------------------------
// Log fetching
// ---------------------------------------------------------------------------

/// How the log fetcher locates a job's log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFetchStrategy {
    /// List the run's jobs, find the job, then fetch from the job's own URL.
    #[default]
    ListRunJobs,
    /// Fetch `/actions/jobs/{job}/logs` directly without listing.
    DirectJobLog,
}

impl std::str::FromStr for LogFetchStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "list" | "list_run_jobs" => Ok(Self::ListRunJobs),
            "direct" | "direct_job_log" => Ok(Self::DirectJobLog),
            other => Err(format!(
                "unknown log fetch strategy '{other}' (expected 'list' or 'direct')"
            )),
        }
    }
}

impl std::fmt::Display for LogFetchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ListRunJobs => write!(f, "list"),
            Self::DirectJobLog => write!(f, "direct"),
        }
    }
}

/// Where a job's log can be downloaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogLocation {
    /// The job's API URL as reported by the run's job listing. The log lives
    /// at `{url}/logs`.
    JobApiUrl(String),
    /// Only the job identifier is known; the log is addressed through the
    /// repository's jobs endpoint.
    JobId(JobId),
}

/// One entry in a run's job listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSummary {
    pub id: JobId,
    #[serde(default)]
    pub name: String,
    /// API URL of the job resource.
    pub url: String,
    #[serde(default)]
    pub conclusion: Option<String>,
}

/// One page of a run's job listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPage {
    /// Total number of jobs in the run, across all pages.
    pub total_count: u64,
    pub jobs: Vec<JobSummary>,
}

// ---------------------------------------------------------------------------
// Issue tracking
// ---------------------------------------------------------------------------

/// Issue metadata as returned by the hosting platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRecord {
    pub number: IssueNumber,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// A comment created on an issue or pull request thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRecord {
    pub id: u64,
    #[serde(default)]
    pub html_url: Option<String>,
}

// ---------------------------------------------------------------------------
// Inference
// ---------------------------------------------------------------------------

/// A single-turn completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub prompt: String,
}

/// The provider's answer to a [`CompletionRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    /// Provider-specific finish reason, when reported.
    pub finish_reason: Option<String>,
}

/// The model's diagnosis of a failure.
///
/// The text is opaque to the pipeline and is delivered verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub text: String,
    /// The model that produced the text.
    pub model: ModelName,
}

// ---------------------------------------------------------------------------
// Budgets
// ---------------------------------------------------------------------------

/// Maximum number of log characters handed to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LogBudget(usize);

impl LogBudget {
    /// Reference budget in characters.
    pub const DEFAULT: LogBudget = LogBudget(8_000);

    /// Creates a [`LogBudget`], returning `None` for zero.
    #[must_use]
    pub fn new(chars: usize) -> Option<Self> {
        if chars == 0 {
            None
        } else {
            Some(Self(chars))
        }
    }

    /// Returns the budget in characters.
    pub fn as_usize(self) -> usize {
        self.0
    }
}

impl Default for LogBudget {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl std::fmt::Display for LogBudget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} chars", self.0)
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S UTC"))
    }
}
