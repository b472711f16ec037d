use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unauthorized,
    Forbidden,
    NotFound,
    Validation,
    Internal,
    #[serde(other)]
    Unknown,
}

/// Error body a listing endpoint sends with a non-success status.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Error)]
#[error("{message} ({code:?})")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

/// Raised while validating a listing payload at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("pagination link url '{url}' is not a valid url: {reason}")]
    InvalidLinkUrl { url: String, reason: String },
    #[error("pagination link url '{url}' carries invalid page '{page}'")]
    InvalidLinkPage { url: String, page: String },
}

#[cfg(test)]
#[path = "tests/error_tests.rs"]
mod tests;
