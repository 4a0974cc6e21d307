//! Error types for cfddns
//!
//! Every failure a reconciliation cycle can hit is one variant here. The
//! run loop logs and swallows all of them; none terminate the process.

use thiserror::Error;

/// Result type alias for cfddns operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for cfddns
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Missing or malformed configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input the provider cannot work with (e.g. a single-label domain)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Zone lookup returned a non-success status
    #[error("Failed to fetch zone ID. (Error {status}: {reason})")]
    ZoneLookupFailed {
        /// HTTP status code
        status: u16,
        /// HTTP reason phrase
        reason: String,
    },

    /// Zone lookup succeeded but matched nothing
    #[error("No zone found for domain: {zone}")]
    ZoneNotFound {
        /// Root domain that was queried
        zone: String,
    },

    /// Record lookup returned a non-success status
    #[error("Failed to fetch DNS records. (Error {status}: {reason})")]
    RecordLookupFailed {
        /// HTTP status code
        status: u16,
        /// HTTP reason phrase
        reason: String,
    },

    /// Record creation returned a non-success status
    #[error("Could not create DNS record. (Error {status}: {reason}) - {body}")]
    RecordCreateFailed {
        /// HTTP status code
        status: u16,
        /// HTTP reason phrase
        reason: String,
        /// Error body returned by the provider
        body: String,
    },

    /// Record patch returned a non-success status
    #[error("Could not patch DNS record. (Error {status}: {reason})")]
    RecordPatchFailed {
        /// HTTP status code
        status: u16,
        /// HTTP reason phrase
        reason: String,
    },

    /// Public IP endpoint returned a non-success status
    #[error("Did not receive public IP. (Error {status}: {reason})")]
    PublicIpFetchFailed {
        /// HTTP status code
        status: u16,
        /// HTTP reason phrase
        reason: String,
    },

    /// Request could not be sent or no response arrived in time
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response body did not have the expected shape
    #[error("Malformed response: {0}")]
    Decode(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// HTTP status carried by the error, if the failure was a non-success response
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ZoneLookupFailed { status, .. }
            | Self::RecordLookupFailed { status, .. }
            | Self::RecordCreateFailed { status, .. }
            | Self::RecordPatchFailed { status, .. }
            | Self::PublicIpFetchFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}
