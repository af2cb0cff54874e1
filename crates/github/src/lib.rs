//! GitHub infrastructure adapter.
//!
//! Implements the GitHub-facing traits defined in the [`pipeline`] crate
//! ([`JobLogSource`], [`IssueTracker`]) over the GitHub REST API with
//! `reqwest`.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules. URL layout,
//! headers, authentication, and status mapping live here; the [`pipeline`]
//! crate never sees them.
//!
//! ## Error Mapping
//!
//! Every call is a single attempt. A non-2xx answer becomes
//! [`HostError::Status`] carrying the status and the (truncated) body, a
//! request that never got an answer becomes [`HostError::Transport`], and an
//! undecodable 2xx body becomes [`HostError::Decode`].

use std::time::Duration;

use async_trait::async_trait;
use pipeline::{
    CommentRecord, HostError, IssueNumber, IssueRecord, IssueTracker, JobLogSource, JobPage,
    LogLocation, RepositoryId, RunId,
};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

/// Default REST endpoint of github.com.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

const JOBS_PER_PAGE: u32 = 100;

/// Connection settings for [`GithubClient`].
#[derive(Clone)]
pub struct GithubConfig {
    /// REST API root, e.g. [`DEFAULT_API_BASE`] or a GitHub Enterprise
    /// `https://host/api/v3`.
    pub api_base: String,
    /// Bearer credential.
    pub token: String,
    /// Timeout applied to every request.
    pub request_timeout: Duration,
}

impl std::fmt::Debug for GithubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubConfig")
            .field("api_base", &self.api_base)
            .field("token", &"<redacted>")
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Errors raised while constructing a [`GithubClient`].
#[derive(Debug, Error)]
pub enum GithubClientError {
    #[error("github token is empty")]
    MissingToken,

    #[error("github token contains characters not allowed in an HTTP header")]
    InvalidToken,

    #[error("failed to build github http client: {0}")]
    Build(#[source] reqwest::Error),
}

/// GitHub REST client.
#[derive(Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    api_base: String,
}

impl GithubClient {
    pub fn new(config: GithubConfig) -> Result<Self, GithubClientError> {
        let token = config.token.trim();
        if token.is_empty() {
            return Err(GithubClientError::MissingToken);
        }

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("ci-triage"));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static("2022-11-28"),
        );
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| GithubClientError::InvalidToken)?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout.max(Duration::from_millis(1)))
            .build()
            .map_err(GithubClientError::Build)?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    fn repo_url(&self, repo: &RepositoryId, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.api_base,
            repo.owner(),
            repo.name(),
            path.trim_start_matches('/')
        )
    }

    async fn send(
        &self,
        operation: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, HostError> {
        let response = request.send().await.map_err(|error| HostError::Transport {
            operation: operation.to_string(),
            message: error.to_string(),
        })?;

        let status = response.status();
        debug!(operation, status = status.as_u16(), "github api response");
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(HostError::status(operation, status.as_u16(), &body))
    }

    async fn request_json<T>(
        &self,
        operation: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, HostError>
    where
        T: DeserializeOwned,
    {
        self.send(operation, request)
            .await?
            .json::<T>()
            .await
            .map_err(|error| HostError::Decode {
                operation: operation.to_string(),
                message: error.to_string(),
            })
    }

    async fn request_text(
        &self,
        operation: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<String, HostError> {
        self.send(operation, request)
            .await?
            .text()
            .await
            .map_err(|error| HostError::Decode {
                operation: operation.to_string(),
                message: error.to_string(),
            })
    }
}

#[async_trait]
impl JobLogSource for GithubClient {
    fn page_size(&self) -> u32 {
        JOBS_PER_PAGE
    }

    async fn list_run_jobs(
        &self,
        repo: &RepositoryId,
        run: RunId,
        page: u32,
    ) -> Result<JobPage, HostError> {
        let url = self.repo_url(repo, &format!("actions/runs/{run}/jobs"));
        let per_page = JOBS_PER_PAGE.to_string();
        let page = page.max(1).to_string();
        self.request_json(
            "list run jobs",
            self.http
                .get(url)
                .query(&[("per_page", per_page.as_str()), ("page", page.as_str())]),
        )
        .await
    }

    async fn download_log(
        &self,
        repo: &RepositoryId,
        location: &LogLocation,
    ) -> Result<String, HostError> {
        let url = match location {
            LogLocation::JobApiUrl(job_url) => format!("{}/logs", job_url.trim_end_matches('/')),
            LogLocation::JobId(job_id) => self.repo_url(repo, &format!("actions/jobs/{job_id}/logs")),
        };
        self.request_text("download job log", self.http.get(url))
            .await
    }
}

#[async_trait]
impl IssueTracker for GithubClient {
    async fn get_issue(
        &self,
        repo: &RepositoryId,
        number: IssueNumber,
    ) -> Result<IssueRecord, HostError> {
        let url = self.repo_url(repo, &format!("issues/{number}"));
        self.request_json("read issue", self.http.get(url)).await
    }

    async fn create_comment(
        &self,
        repo: &RepositoryId,
        number: IssueNumber,
        body: &str,
    ) -> Result<CommentRecord, HostError> {
        let url = self.repo_url(repo, &format!("issues/{number}/comments"));
        let payload = json!({ "body": body });
        self.request_json("create issue comment", self.http.post(url).json(&payload))
            .await
    }

    async fn create_issue(
        &self,
        repo: &RepositoryId,
        title: &str,
        body: &str,
    ) -> Result<IssueRecord, HostError> {
        let url = self.repo_url(repo, "issues");
        let payload = json!({ "title": title, "body": body });
        self.request_json("create issue", self.http.post(url).json(&payload))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(api_base: &str) -> GithubClient {
        GithubClient::new(GithubConfig {
            api_base: api_base.to_string(),
            token: "t".to_string(),
            request_timeout: Duration::from_secs(5),
        })
        .expect("client")
    }

    #[test]
    fn repo_urls_are_built_from_owner_and_name() {
        let repo = RepositoryId::new("octo/widgets").expect("repo");
        let client = client("https://ghe.example/api/v3/");
        assert_eq!(
            client.repo_url(&repo, "/issues/3"),
            "https://ghe.example/api/v3/repos/octo/widgets/issues/3"
        );
    }

    #[test]
    fn blank_token_is_rejected() {
        let error = GithubClient::new(GithubConfig {
            api_base: DEFAULT_API_BASE.to_string(),
            token: "  ".to_string(),
            request_timeout: Duration::from_secs(5),
        })
        .err()
        .expect("blank token");
        assert!(matches!(error, GithubClientError::MissingToken));
    }

    #[test]
    fn debug_output_redacts_the_token() {
        let config = GithubConfig {
            api_base: DEFAULT_API_BASE.to_string(),
            token: "ghp_secret".to_string(),
            request_timeout: Duration::from_secs(5),
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("ghp_secret"));
    }
}
