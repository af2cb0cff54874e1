//! Core domain for CI failure triage.
//!
//! This crate contains every domain concept, newtype identifier, shared value
//! type, error type, and pure algorithm used by the triage pipeline.
//! Infrastructure crates implement the traits defined here; they never add
//! domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`RepositoryId`, `RunId`, `JobId`, etc.) |
//! | [`types`] | Shared value types (`FailureContext`, `JobSummary`, `Diagnosis`, etc.) |
//! | [`errors`] | `HostError`, `LlmError`, and the top-level `PipelineError` |
//! | [`excerpt`] | Tail-preserving log reduction |
//! | [`prompt`] | Diagnosis prompt, report body, and issue title templates |
//! | [`association`] | Pull-request association from trigger signals |
//! | [`delivery`] | Destination resolution state machine |
//! | [`ports`] | Traits implemented by the `github` and `llm` crates |

pub mod association;
pub mod delivery;
pub mod errors;
pub mod excerpt;
pub mod identifiers;
pub mod ports;
pub mod prompt;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use association::{AssociationSignals, PullRequestAssociation};
pub use delivery::{DeliveryOutcome, DeliveryPlan, DeliveryReceipt, DeliveryTarget, IssueProbe};
pub use errors::{truncate_for_error, HostError, LlmError, PipelineError, ERROR_BODY_LIMIT};
pub use excerpt::{LogExcerpt, TRUNCATION_MARKER};
pub use identifiers::{
    IssueNumber, JobId, ModelName, PipelineRunId, PullRequestNumber, RepositoryId, RunId,
};
pub use ports::{IssueTracker, JobLogSource, LlmProvider};
pub use types::{
    CommentRecord, Completion, CompletionRequest, Diagnosis, FailureContext, IssueRecord,
    JobPage, JobSummary, LogBudget, LogFetchStrategy, LogLocation, Timestamp,
};
