use thiserror::Error;

/// The only failure `ReferenceResolver::resolve` reports to its caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("Invalid filter: year_from {year_from} is after year_to {year_to}")]
    InvalidFilter { year_from: u32, year_to: u32 },
}

/// Failures inside a single source adapter. Logged and absorbed, never
/// returned from the resolver.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Missing API key: {0}")]
    MissingKey(String),
    #[error("Timed out after {0:?}")]
    Timeout(std::time::Duration),
}

impl From<serde_json::Error> for SourceError {
    fn from(e: serde_json::Error) -> Self {
        SourceError::Parse(e.to_string())
    }
}
