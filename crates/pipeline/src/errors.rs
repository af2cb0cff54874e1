//! Error types for the triage pipeline.
//!
//! [`HostError`] and [`LlmError`] are the failure vocabularies of the two
//! external collaborators; infrastructure adapters produce them. The
//! orchestration layer converts both into [`PipelineError`], the top-level
//! taxonomy that decides how a failed invocation is reported and which exit
//! code the process ends with.

use thiserror::Error;

use crate::{JobId, RunId};

/// Maximum number of characters of a response body kept in an error message.
pub const ERROR_BODY_LIMIT: usize = 800;

// ---------------------------------------------------------------------------
// Hosting platform errors
// ---------------------------------------------------------------------------

/// A failed call to the version-control hosting API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The host answered with a non-2xx status.
    #[error("github api {operation} failed with status {status}: {body}")]
    Status {
        /// The operation attempted (e.g. `"read issue"`).
        operation: String,
        /// HTTP status code.
        status: u16,
        /// Response body, truncated to [`ERROR_BODY_LIMIT`] characters.
        body: String,
    },

    /// The request never produced a response (connect failure, timeout).
    #[error("github api {operation} request failed: {message}")]
    Transport { operation: String, message: String },

    /// A 2xx response whose body could not be decoded.
    #[error("failed to decode github {operation} response: {message}")]
    Decode { operation: String, message: String },
}

impl HostError {
    /// Builds a [`HostError::Status`], truncating the body.
    pub fn status(operation: impl Into<String>, status: u16, body: &str) -> Self {
        Self::Status {
            operation: operation.into(),
            status,
            body: truncate_for_error(body, ERROR_BODY_LIMIT),
        }
    }

    /// The HTTP status, if the host answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport { .. } | Self::Decode { .. } => None,
        }
    }

    /// `true` only for a 404 answer.
    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }
}

// ---------------------------------------------------------------------------
// Inference errors
// ---------------------------------------------------------------------------

/// A failed completion call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LlmError {
    /// The provider refused to process the input.
    #[error("prompt was blocked by the model provider: {reason}")]
    Blocked { reason: String },

    #[error("model provider returned status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("model provider request failed: {message}")]
    Transport { message: String },

    #[error("model provider returned an invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("model provider api key is missing")]
    MissingApiKey,
}

// ---------------------------------------------------------------------------
// Pipeline-level errors
// ---------------------------------------------------------------------------

/// Errors that abort a triage run.
///
/// Every variant is fatal. A missing destination is not an error and is
/// reported through [`crate::DeliveryOutcome::NoDestination`] instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Required identifying information is absent or malformed.
    ///
    /// Produced before any network call is attempted.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// The run's job listing has no entry for the requested job.
    #[error("job {job_id} not found in run {run_id}")]
    JobNotFound { job_id: JobId, run_id: RunId },

    /// The hosting platform rejected or failed a call.
    #[error("upstream error: {0}")]
    Upstream(#[from] HostError),

    /// The model refused the prompt.
    #[error("diagnosis blocked: {reason}")]
    Blocked { reason: String },

    /// The completion call failed for any reason other than a refusal.
    #[error("inference error: {0}")]
    Inference(LlmError),
}

impl PipelineError {
    /// Shorthand for [`PipelineError::Config`].
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Process exit code for this failure.
    ///
    /// `2` for configuration problems, `1` for everything else.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config { .. } => 2,
            Self::JobNotFound { .. }
            | Self::Upstream(_)
            | Self::Blocked { .. }
            | Self::Inference(_) => 1,
        }
    }

    /// Short label for the failing error class, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::JobNotFound { .. } => "job_not_found",
            Self::Upstream(_) => "upstream",
            Self::Blocked { .. } => "blocked",
            Self::Inference(_) => "inference",
        }
    }
}

impl From<LlmError> for PipelineError {
    fn from(error: LlmError) -> Self {
        match error {
            LlmError::Blocked { reason } => Self::Blocked { reason },
            other => Self::Inference(other),
        }
    }
}

/// Truncates `text` to at most `max_chars` characters, appending `...` when
/// anything was cut.
pub fn truncate_for_error(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated = text.chars().take(max_chars).collect::<String>();
    truncated.push_str("...");
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_404_counts_as_not_found() {
        assert!(HostError::status("read issue", 404, "Not Found").is_not_found());
        assert!(!HostError::status("read issue", 500, "boom").is_not_found());
        assert!(!HostError::Transport {
            operation: "read issue".into(),
            message: "timed out".into(),
        }
        .is_not_found());
    }

    #[test]
    fn status_error_truncates_long_bodies() {
        let body = "x".repeat(ERROR_BODY_LIMIT + 50);
        let HostError::Status { body, .. } = HostError::status("list jobs", 502, &body) else {
            panic!("expected status error");
        };
        assert_eq!(body.chars().count(), ERROR_BODY_LIMIT + 3);
        assert!(body.ends_with("..."));
    }

    #[test]
    fn blocked_llm_error_stays_distinct_from_transport_failures() {
        let blocked = PipelineError::from(LlmError::Blocked {
            reason: "SAFETY".into(),
        });
        let transport = PipelineError::from(LlmError::Transport {
            message: "connection reset".into(),
        });

        assert!(matches!(blocked, PipelineError::Blocked { ref reason } if reason == "SAFETY"));
        assert!(matches!(transport, PipelineError::Inference(_)));
        assert_eq!(blocked.kind(), "blocked");
        assert_eq!(transport.kind(), "inference");
    }

    #[test]
    fn exit_codes_separate_configuration_failures() {
        assert_eq!(PipelineError::config("missing repository").exit_code(), 2);
        assert_eq!(
            PipelineError::JobNotFound {
                job_id: JobId::from(3),
                run_id: RunId::new(1),
            }
            .exit_code(),
            1
        );
    }

    #[test]
    fn status_error_message_includes_status_and_body() {
        let error = PipelineError::from(HostError::status("create issue", 422, "Validation Failed"));
        let message = error.to_string();
        assert!(message.contains("422"));
        assert!(message.contains("Validation Failed"));
        assert!(message.contains("create issue"));
    }
}
