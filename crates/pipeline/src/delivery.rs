//! Destination resolution.
//!
//! Resolution is a small state machine whose every state is a variant:
//!
//! ```text
//! Start ─┬─ PR associated ──────────────► PullRequestThread ─┐
//!        └─ no PR ─┬─ tracking issue ─ probe ─┬─ exists ────► ExistingIssue ─────┼─► Done
//!                  │                           ├─ 404 ───────► NewIssue ──────────┘
//!                  │                           └─ other error ► Failed
//!                  └─ none configured ─────────────────────────► NoDestination
//! ```
//!
//! The types here make the three delivery outcomes exhaustive and mutually
//! exclusive. Performing the calls is the orchestration layer's job.

use serde::{Deserialize, Serialize};

use crate::{HostError, IssueNumber, IssueRecord, PullRequestAssociation, PullRequestNumber};

/// The first resolution step, decided from configuration alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryPlan {
    /// Comment on the associated pull request.
    PullRequest(PullRequestNumber),
    /// Probe the configured tracking issue, falling back to a new issue.
    TrackingIssue(IssueNumber),
}

impl DeliveryPlan {
    /// Decides the plan. A pull request always takes precedence over the
    /// tracking issue; `None` means there is nowhere to post.
    pub fn decide(
        association: PullRequestAssociation,
        tracking_issue: Option<IssueNumber>,
    ) -> Option<Self> {
        match (association, tracking_issue) {
            (PullRequestAssociation::Associated(number), _) => Some(Self::PullRequest(number)),
            (PullRequestAssociation::NotAssociated, issue) => issue.map(Self::TrackingIssue),
        }
    }
}

/// Result of probing the tracking issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueProbe {
    Exists(IssueRecord),
    NotFound,
}

impl IssueProbe {
    /// Classifies a metadata read. Only a 404 means "not found"; any other
    /// failure is passed back to the caller unchanged.
    pub fn classify(result: Result<IssueRecord, HostError>) -> Result<Self, HostError> {
        match result {
            Ok(issue) => Ok(Self::Exists(issue)),
            Err(error) if error.is_not_found() => Ok(Self::NotFound),
            Err(error) => Err(error),
        }
    }
}

/// The single destination of a diagnosis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeliveryTarget {
    PullRequestThread { number: PullRequestNumber },
    ExistingIssue { number: IssueNumber },
    NewIssue { title: String },
}

impl DeliveryTarget {
    /// Resolves the tracking-issue branch from its probe.
    pub fn from_probe(issue: IssueNumber, probe: &IssueProbe, new_title: String) -> Self {
        match probe {
            IssueProbe::Exists(_) => Self::ExistingIssue { number: issue },
            IssueProbe::NotFound => Self::NewIssue { title: new_title },
        }
    }

    /// Short label used in structured log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PullRequestThread { .. } => "pull_request_thread",
            Self::ExistingIssue { .. } => "existing_issue",
            Self::NewIssue { .. } => "new_issue",
        }
    }
}

impl std::fmt::Display for DeliveryTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PullRequestThread { number } => write!(f, "pull request #{number}"),
            Self::ExistingIssue { number } => write!(f, "issue #{number}"),
            Self::NewIssue { title } => write!(f, "new issue '{title}'"),
        }
    }
}

/// Proof of a completed delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    pub target: DeliveryTarget,
    /// The issue or pull request that now holds the diagnosis.
    pub number: IssueNumber,
    /// Browser URL of the created comment or issue, when the host reports one.
    pub html_url: Option<String>,
}

/// How a pipeline run ended, when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered(DeliveryReceipt),
    /// No pull request and no tracking issue configured. Not an error.
    NoDestination,
}
