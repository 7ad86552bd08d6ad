use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::MetaError;

/// External catalog key naming one meta document, e.g. `tt0111161`.
///
/// The value is taken verbatim from the CSV cell so that lookups against cached
/// file names stay exact. It must be non-empty and usable as a file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ImdbId(String);

impl ImdbId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImdbId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ImdbId {
    type Err = MetaError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim().is_empty() {
            return Err(MetaError::EmptyIdentifier);
        }
        if value.contains(['/', '\\', '\0']) || value == "." || value == ".." {
            return Err(MetaError::InvalidIdentifier(value.to_string()));
        }
        Ok(Self(value.to_string()))
    }
}

/// A payload that passed the fetch checks and is ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedMeta {
    pub id: ImdbId,
    pub raw: String,
}

/// Why an identifier produced no payload in this run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    Network(String),
    Status(u16),
    Body(String),
    InvalidJson(String),
    MissingMeta,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Network(message) => write!(f, "request failed: {message}"),
            SkipReason::Status(status) => write!(f, "bad GET response: {status}"),
            SkipReason::Body(message) => write!(f, "couldn't read response body: {message}"),
            SkipReason::InvalidJson(message) => write!(f, "response is not JSON: {message}"),
            SkipReason::MissingMeta => write!(
                f,
                "response body is empty or doesn't contain a \"meta\" element"
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Fetched(FetchedMeta),
    Skipped { id: ImdbId, reason: SkipReason },
}

impl FetchOutcome {
    pub fn into_fetched(self) -> Option<FetchedMeta> {
        match self {
            FetchOutcome::Fetched(meta) => Some(meta),
            FetchOutcome::Skipped { .. } => None,
        }
    }
}
