//! Port traits implemented by infrastructure crates.
//!
//! The orchestration layer depends only on these traits; the `github` and
//! `llm` crates supply the implementations, and tests supply in-memory fakes.
//! Every method is a single request with no retry.

use async_trait::async_trait;

use crate::{
    Completion, CompletionRequest, CommentRecord, HostError, IssueNumber, IssueRecord, JobPage,
    LlmError, LogLocation, ModelName, RepositoryId, RunId,
};

/// Read access to CI jobs and their logs.
#[async_trait]
pub trait JobLogSource: Send + Sync {
    /// Number of jobs requested per listing page.
    fn page_size(&self) -> u32 {
        100
    }

    /// Lists one page (1-based) of the jobs belonging to `run`.
    async fn list_run_jobs(
        &self,
        repo: &RepositoryId,
        run: RunId,
        page: u32,
    ) -> Result<JobPage, HostError>;

    /// Downloads the full text of a job log.
    async fn download_log(
        &self,
        repo: &RepositoryId,
        location: &LogLocation,
    ) -> Result<String, HostError>;
}

/// Issue and pull-request conversation access.
///
/// Pull requests share the issue comment endpoint, so one trait covers both
/// destinations.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Reads issue metadata. A missing issue is a [`HostError::Status`] with
    /// status 404.
    async fn get_issue(
        &self,
        repo: &RepositoryId,
        number: IssueNumber,
    ) -> Result<IssueRecord, HostError>;

    async fn create_comment(
        &self,
        repo: &RepositoryId,
        number: IssueNumber,
        body: &str,
    ) -> Result<CommentRecord, HostError>;

    async fn create_issue(
        &self,
        repo: &RepositoryId,
        title: &str,
        body: &str,
    ) -> Result<IssueRecord, HostError>;
}

/// A generative model answering single-turn prompts.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// The model this provider sends requests to.
    fn model(&self) -> &ModelName;

    /// Sends one completion request. A refusal is [`LlmError::Blocked`].
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, LlmError>;
}
