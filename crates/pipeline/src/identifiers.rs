//! Newtype domain identifiers.
//!
//! Every concept with an identity is a distinct newtype wrapping a primitive.
//! This prevents accidentally interchanging, for example, a [`RunId`] with an
//! [`IssueNumber`] even though both are `u64` under the hood.

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is blank.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                let trimmed = v.trim();
                if trimmed.is_empty() { None } else { Some(Self(trimmed.to_string())) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Macro for u64-wrapped newtypes (host-assigned integers).
// Generates: struct (Copy), new(), as_u64(), FromStr, Display.
// ---------------------------------------------------------------------------
macro_rules! u64_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(u64);

        impl $name {
            /// Creates a new identifier from a raw integer.
            pub fn new(value: u64) -> Self {
                Self(value)
            }

            /// Returns the underlying integer value.
            pub fn as_u64(self) -> u64 {
                self.0
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                match trimmed.parse::<u64>() {
                    Ok(0) => Err(format!("{} must be a positive integer", stringify!($name))),
                    Ok(value) => Ok(Self(value)),
                    Err(_) => Err(format!(
                        "{} must be a positive integer, got '{}'",
                        stringify!($name),
                        trimmed
                    )),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers — host-integer-backed
// ---------------------------------------------------------------------------

u64_id! {
    /// Identifies one execution of a CI workflow.
    RunId
}

u64_id! {
    /// Identifies an issue on the hosting platform.
    ///
    /// Pull requests share the issue number space, so a [`PullRequestNumber`]
    /// converts losslessly into an [`IssueNumber`] for comment calls.
    IssueNumber
}

u64_id! {
    /// Identifies a pull request on the hosting platform.
    PullRequestNumber
}

impl PullRequestNumber {
    /// The issue number addressing this pull request's conversation thread.
    pub fn as_issue_number(self) -> IssueNumber {
        IssueNumber(self.0)
    }
}

// ---------------------------------------------------------------------------
// Identifiers — UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies a single invocation of the triage pipeline.
///
/// Generated fresh for every CLI invocation and attached to the root span so
/// all activity from one run can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PipelineRunId(Uuid);

impl PipelineRunId {
    /// Generates a new random run identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for PipelineRunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identifiers — String-backed
// ---------------------------------------------------------------------------

string_id! {
    /// Identifies a generative model by its provider-side name
    /// (e.g. `"gemini-1.5-flash"`).
    ModelName
}

// ---------------------------------------------------------------------------

/// Identifies a CI job.
///
/// Job identifiers arrive as JSON numbers from the host API and as text from
/// the trigger environment. Both forms normalise to the same trimmed string,
/// and equality is defined on that string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct JobId(String);

impl JobId {
    /// Creates a job identifier from text, returning `None` if it is blank.
    pub fn new(value: impl AsRef<str>) -> Option<Self> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Returns the normalised identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u64> for JobId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for JobId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawJobId {
            Number(u64),
            Text(String),
        }

        match RawJobId::deserialize(deserializer)? {
            RawJobId::Number(value) => Ok(JobId::from(value)),
            RawJobId::Text(text) => JobId::new(&text)
                .ok_or_else(|| serde::de::Error::custom("job id must not be empty")),
        }
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------

/// Identifies a repository in `"owner/name"` format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryId(String);

impl RepositoryId {
    /// Creates a repository identifier.
    ///
    /// Returns `None` unless the value is exactly two non-empty segments
    /// separated by a single `/`.
    pub fn new(value: impl AsRef<str>) -> Option<Self> {
        let trimmed = value.as_ref().trim();
        let (owner, name) = trimmed.split_once('/')?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    /// Returns the identifier as `"owner/name"`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The owning account or organisation.
    pub fn owner(&self) -> &str {
        self.0.split_once('/').map(|(owner, _)| owner).unwrap_or_default()
    }

    /// The repository name without its owner.
    pub fn name(&self) -> &str {
        self.0.split_once('/').map(|(_, name)| name).unwrap_or_default()
    }
}

impl std::fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_id_normalises_text_and_numbers_to_the_same_value() {
        let from_text = JobId::new(" 4242 ").expect("non-empty");
        let from_number: JobId = serde_json::from_str("4242").expect("number form");
        let from_json_text: JobId = serde_json::from_str("\"4242\"").expect("text form");

        assert_eq!(from_text, from_number);
        assert_eq!(from_number, from_json_text);
    }

    #[test]
    fn job_id_rejects_blank_text() {
        assert!(JobId::new("   ").is_none());
        assert!(serde_json::from_str::<JobId>("\"\"").is_err());
    }

    #[test]
    fn repository_id_requires_owner_and_name() {
        let repo = RepositoryId::new("octo/widgets").expect("valid");
        assert_eq!(repo.owner(), "octo");
        assert_eq!(repo.name(), "widgets");

        assert!(RepositoryId::new("widgets").is_none());
        assert!(RepositoryId::new("/widgets").is_none());
        assert!(RepositoryId::new("octo/").is_none());
        assert!(RepositoryId::new("octo/widgets/extra").is_none());
    }

    #[test]
    fn integer_ids_parse_trimmed_positive_values() {
        assert_eq!("  17 ".parse::<RunId>(), Ok(RunId::new(17)));
        assert!("0".parse::<IssueNumber>().is_err());
        assert!("abc".parse::<PullRequestNumber>().is_err());
    }

    #[test]
    fn pull_request_number_addresses_issue_thread() {
        assert_eq!(
            PullRequestNumber::new(9).as_issue_number(),
            IssueNumber::new(9)
        );
    }
}
