//! Pull-request association.
//!
//! A failure may or may not belong to a pull request, and the signal that
//! says so arrives in several shapes depending on how the pipeline was
//! triggered. Absence of a pull request is the common case, so a signal that
//! fails to parse is skipped rather than reported as an error.

use serde_json::Value;
use tracing::debug;

use crate::PullRequestNumber;

/// Whether the failure belongs to a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullRequestAssociation {
    Associated(PullRequestNumber),
    NotAssociated,
}

impl PullRequestAssociation {
    /// The associated pull request, if any.
    pub fn pull_request(self) -> Option<PullRequestNumber> {
        match self {
            Self::Associated(number) => Some(number),
            Self::NotAssociated => None,
        }
    }
}

/// The raw signals a trigger may supply about an associated pull request.
///
/// Signals are consulted in field order; the first one that yields a number
/// wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssociationSignals {
    /// A pull request number given explicitly by the caller.
    pub explicit: Option<String>,
    /// A JSON array of pull request objects, as carried by a `workflow_run`
    /// trigger's `pull_requests` field.
    pub pull_requests_json: Option<String>,
    /// The full JSON event payload of the trigger.
    pub event_payload: Option<String>,
    /// A git ref such as `refs/pull/42/merge`.
    pub git_ref: Option<String>,
}

impl AssociationSignals {
    /// Resolves the signals to a single association.
    pub fn resolve(&self) -> PullRequestAssociation {
        let found = self
            .explicit
            .as_deref()
            .and_then(parse_explicit)
            .or_else(|| {
                self.pull_requests_json
                    .as_deref()
                    .and_then(parse_pull_requests_json)
            })
            .or_else(|| self.event_payload.as_deref().and_then(parse_event_payload))
            .or_else(|| self.git_ref.as_deref().and_then(parse_git_ref));

        match found {
            Some(number) => PullRequestAssociation::Associated(number),
            None => PullRequestAssociation::NotAssociated,
        }
    }
}

fn parse_explicit(raw: &str) -> Option<PullRequestNumber> {
    if raw.trim().is_empty() {
        return None;
    }
    match raw.parse::<PullRequestNumber>() {
        Ok(number) => Some(number),
        Err(error) => {
            debug!(value = raw, %error, "ignoring unparseable pull request number");
            None
        }
    }
}

/// Parses a JSON array of pull request objects and returns the first number.
///
/// An empty string, `null`, or an empty array all mean "no pull request".
pub fn parse_pull_requests_json(raw: &str) -> Option<PullRequestNumber> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return None;
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => first_pull_request(&value),
        Err(error) => {
            debug!(
                %error,
                prefix = %trimmed.chars().take(200).collect::<String>(),
                "ignoring unparseable pull_requests json"
            );
            None
        }
    }
}

/// Extracts the first associated pull request from a trigger event payload.
///
/// Understands `workflow_run` and `check_suite` payloads (each carrying a
/// `pull_requests` array) and `pull_request` payloads.
pub fn parse_event_payload(raw: &str) -> Option<PullRequestNumber> {
    let payload = match serde_json::from_str::<Value>(raw) {
        Ok(payload) => payload,
        Err(error) => {
            debug!(%error, "ignoring unparseable event payload");
            return None;
        }
    };

    ["workflow_run", "check_suite"]
        .iter()
        .find_map(|key| payload.get(key).and_then(|run| run.get("pull_requests")))
        .and_then(first_pull_request)
        .or_else(|| {
            payload
                .get("pull_request")
                .and_then(|pr| pr.get("number"))
                .and_then(number_from_value)
        })
}

/// Parses `refs/pull/{number}/merge` (or `/head`).
pub fn parse_git_ref(raw: &str) -> Option<PullRequestNumber> {
    let mut segments = raw.trim().split('/');
    match (segments.next(), segments.next(), segments.next()) {
        (Some("refs"), Some("pull"), Some(number)) => number.parse().ok(),
        _ => None,
    }
}

fn first_pull_request(value: &Value) -> Option<PullRequestNumber> {
    value
        .as_array()?
        .first()?
        .get("number")
        .and_then(number_from_value)
}

fn number_from_value(value: &Value) -> Option<PullRequestNumber> {
    match value {
        Value::Number(number) => number.as_u64().filter(|n| *n > 0).map(PullRequestNumber::new),
        Value::String(text) => text.parse().ok(),
        _ => None,
    }
}
