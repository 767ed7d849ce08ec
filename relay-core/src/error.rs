//! Error types for relay operations
//!
//! Every variant carries a stable error code (e.g. `MISSING_CONFIG`) for
//! log aggregation, and an HTTP status for the webhook endpoint.
//!
//! Two boundaries consume these errors:
//! - the webhook handler, which maps caller errors onto its own response
//! - the delivery client, which only ever logs them
//!
//! # Example
//!
//! ```rust
//! use relay_core::error::RelayError;
//!
//! let err = RelayError::MissingConfig { key: "TIKTOK_PIXEL_ID".to_string() };
//! assert_eq!(err.code(), "MISSING_CONFIG");
//! assert!(!err.is_caller_error());
//! ```

use thiserror::Error;

/// Result type alias for relay operations
pub type RelayResult<T> = std::result::Result<T, RelayError>;

/// Errors that can occur while relaying a conversion event
#[derive(Error, Debug)]
pub enum RelayError {
    /// Inbound webhook body could not be parsed
    #[error("Malformed webhook body: {reason}")]
    MalformedBody { reason: String },

    /// A required advertiser secret is absent or blank
    #[error("Missing configuration: '{key}' is not set. Export it before delivering events.")]
    MissingConfig { key: String },

    /// The conversion API could not be reached
    #[error("Transport error: {0}")]
    Transport(String),

    /// The conversion API answered with a non-success status
    #[error("Conversion API rejected event with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RelayError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            RelayError::MalformedBody { .. } => "MALFORMED_BODY",
            RelayError::MissingConfig { .. } => "MISSING_CONFIG",
            RelayError::Transport(_) => "TRANSPORT_ERROR",
            RelayError::Rejected { .. } => "REJECTED",
            RelayError::Serialization(_) => "SERIALIZATION_ERROR",
            RelayError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// HTTP status the webhook endpoint should answer with.
    ///
    /// Delivery errors (`Transport`, `Rejected`, `MissingConfig`) are only
    /// logged by the delivery client and never reach the webhook response.
    pub fn http_status_code(&self) -> u16 {
        match self {
            RelayError::MalformedBody { .. } => 400,
            _ => 500,
        }
    }

    /// Whether the upstream caller is at fault
    pub fn is_caller_error(&self) -> bool {
        matches!(self, RelayError::MalformedBody { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_and_statuses() {
        let malformed = RelayError::MalformedBody { reason: "eof".to_string() };
        assert_eq!(malformed.code(), "MALFORMED_BODY");
        assert_eq!(malformed.http_status_code(), 400);
        assert!(malformed.is_caller_error());

        let rejected = RelayError::Rejected { status: 401, body: "{}".to_string() };
        assert_eq!(rejected.code(), "REJECTED");
        assert_eq!(rejected.http_status_code(), 500);
        assert!(!rejected.is_caller_error());
    }

    #[test]
    fn test_missing_config_message_names_key() {
        let err = RelayError::MissingConfig { key: "TIKTOK_ACCESS_TOKEN".to_string() };
        assert!(err.to_string().contains("TIKTOK_ACCESS_TOKEN"));
        assert_eq!(err.http_status_code(), 500);
    }
}
