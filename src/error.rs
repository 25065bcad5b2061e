//! Error types for wvlicense.
//!
//! Cryptographic failures are reported as a single coarse variant per step and
//! never carry the underlying cause.

use thiserror::Error;

/// Main error type for license transactions.
#[derive(Debug, Error)]
pub enum Error {
    /// The initialization data is shorter than its fixed 32-byte header.
    #[error("Init data too short: {len} bytes (need at least 32)")]
    InitDataTooShort { len: usize },

    /// The device private key (or its container) could not be parsed.
    #[error("Invalid device key: {0}")]
    InvalidKey(String),

    /// A binary message failed to decode.
    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    /// Privacy mode was requested without a device certificate.
    #[error("Privacy mode requires a device certificate")]
    PrivacyModeUnavailable,

    /// The license request could not be signed.
    #[error("Failed to sign license request")]
    SigningFailed,

    /// The license response carries no session key.
    #[error("License response is missing the session key")]
    MissingSessionKey,

    /// The session key could not be unwrapped with the device key.
    #[error("Failed to unwrap session key")]
    KeyUnwrapFailed,

    /// A single key container could not be decrypted. Non-fatal to the batch.
    #[error("Malformed key container #{index}: {reason}")]
    MalformedKeyContainer { index: usize, reason: String },

    /// The transport collaborator failed to deliver the request.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Base64 decode error.
    #[error("Base64 decode error: {0}")]
    Base64DecodeError(#[from] base64::DecodeError),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<prost::DecodeError> for Error {
    fn from(err: prost::DecodeError) -> Self {
        Error::MalformedMessage(err.to_string())
    }
}

/// Result type alias for wvlicense operations.
pub type Result<T> = std::result::Result<T, Error>;
