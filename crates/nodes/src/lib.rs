//! CI failure triage stages and the executor that drives them.
//!
//! This crate provides the three I/O-bearing stages (log fetching, diagnosis,
//! delivery) and the [`PipelineExecutor`] that sequences them with the pure
//! excerpt reducer from [`pipeline`].
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** Stages sequence calls between business logic in
//! the [`pipeline`] crate and infrastructure traits (`JobLogSource`,
//! `IssueTracker`, `LlmProvider`). They contain no domain rules of their own.
//!
//! ## Control Flow
//!
//! ```text
//! LogFetcher ─► excerpt::reduce ─► DiagnosisRequester ─► DeliveryResolver
//! ```
//!
//! Every stage is awaited in order; the first error aborts the run.

pub mod delivery;
pub mod diagnosis;
pub mod executor;
pub mod log_fetcher;

pub use delivery::DeliveryResolver;
pub use diagnosis::DiagnosisRequester;
pub use executor::{ExecutorSettings, PipelineExecutor};
pub use log_fetcher::LogFetcher;
