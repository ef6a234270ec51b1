#![warn(missing_docs)]
//! # devdesk-core
//!
//! ## Purpose
//! Defines the pure data model shared across the `devdesk` workspace.
//!
//! ## Responsibilities
//! - Represent the uniform `{code, msg, data}` backend response envelope.
//! - Separate transport success from application-level success signaling.
//! - Model user-visible notices emitted by failure classification.
//!
//! ## Data flow
//! The gateway decodes backend bodies into [`ApiEnvelope`] values. Callers
//! unwrap application data through [`ApiEnvelope::into_data`]. Failure
//! classification produces [`Notice`] values for the active notice sink.
//!
//! ## Ownership and lifetimes
//! Envelope and notice values own their strings to avoid borrowing from
//! transient network buffers.
//!
//! ## Error model
//! Codec failures and application-level rejections return [`CoreError`]
//! variants with caller-actionable categorization.
//!
//! ## Security and privacy notes
//! This crate never carries credentials; envelope messages are operator-facing
//! text and safe to display.
//!
//! ## Example
//! ```rust
//! use devdesk_core::{ApiEnvelope, SUCCESS_CODE};
//!
//! let envelope = ApiEnvelope {
//!     code: SUCCESS_CODE,
//!     message: "success".to_string(),
//!     data: Some(42_u32),
//! };
//! assert_eq!(envelope.into_data().unwrap(), 42);
//! ```

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Application-level success code used by every backend endpoint.
pub const SUCCESS_CODE: i32 = 0;

/// Application-level generic failure code.
pub const FAILURE_CODE: i32 = -1;

/// Uniform response wrapper returned by every backend call.
///
/// `code` signals application success independently of the transport status;
/// transport-status handling is the gateway's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    /// Application status code; [`SUCCESS_CODE`] means success.
    pub code: i32,
    /// Human-readable outcome description.
    #[serde(rename = "msg")]
    pub message: String,
    /// Payload; absent on rejections and data-free operations.
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    /// Returns `true` when the application accepted the request.
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    /// Unwraps the application payload.
    ///
    /// # Errors
    /// Returns [`CoreError::Rejected`] when `code` signals failure.
    /// Returns [`CoreError::MissingData`] when a successful envelope carries
    /// no payload.
    pub fn into_data(self) -> Result<T, CoreError> {
        if !self.is_success() {
            return Err(CoreError::Rejected {
                code: self.code,
                message: self.message,
            });
        }

        self.data.ok_or(CoreError::MissingData)
    }
}

impl<T: DeserializeOwned> ApiEnvelope<T> {
    /// Decodes an envelope from a raw response body.
    ///
    /// # Errors
    /// Returns [`CoreError::Codec`] when the body is not a valid envelope.
    pub fn from_json_bytes(raw: &[u8]) -> Result<Self, CoreError> {
        serde_json::from_slice(raw).map_err(CoreError::Codec)
    }
}

impl<T: Serialize> ApiEnvelope<T> {
    /// Serializes the envelope to compact JSON bytes.
    ///
    /// # Errors
    /// Returns [`CoreError::Codec`] when JSON serialization fails.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, CoreError> {
        serde_json::to_vec(self).map_err(CoreError::Codec)
    }
}

/// Severity of a user-visible notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeLevel {
    /// Informational status.
    Info,
    /// Degraded but recoverable condition.
    Warning,
    /// Failed operation requiring user attention.
    Error,
}

/// User-visible signal emitted when an operation is classified as failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Display severity.
    pub level: NoticeLevel,
    /// Display text; safe to render verbatim.
    pub message: String,
}

impl Notice {
    /// Creates an error-level notice.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    /// Creates an info-level notice.
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }
}

/// Error type for envelope codec and application-rejection outcomes.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Envelope JSON encoding/decoding failure.
    #[error("envelope codec failure: {0}")]
    Codec(#[from] serde_json::Error),
    /// Backend accepted the transport but rejected the request.
    #[error("request rejected (code {code}): {message}")]
    Rejected {
        /// Application status code reported by the backend.
        code: i32,
        /// Backend-provided rejection message.
        message: String,
    },
    /// Successful envelope without the expected payload.
    #[error("envelope data is missing")]
    MissingData,
}

#[cfg(test)]
mod tests {
    //! Unit tests for envelope success signaling.

    use super::*;

    #[test]
    fn rejection_carries_backend_message() {
        let envelope: ApiEnvelope<String> = ApiEnvelope {
            code: FAILURE_CODE,
            message: "username already taken".to_string(),
            data: None,
        };

        match envelope.into_data() {
            Err(CoreError::Rejected { code, message }) => {
                assert_eq!(code, FAILURE_CODE);
                assert_eq!(message, "username already taken");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn successful_envelope_without_payload_is_flagged() {
        let envelope: ApiEnvelope<u32> = ApiEnvelope {
            code: SUCCESS_CODE,
            message: "success".to_string(),
            data: None,
        };
        assert!(matches!(envelope.into_data(), Err(CoreError::MissingData)));
    }
}
