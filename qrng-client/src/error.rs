// SPDX-License-Identifier: MIT
//
// QRNG Client: Quantum Random Numbers over HTTP
// Copyright (c) 2025 Valer Bocan, PhD, CSSLP
// Email: valer.bocan@upt.ro
//
// Department of Computer and Information Technology
// Politehnica University of Timisoara
//
// https://github.com/vbocan/qrng-data-diode

//! Error types for the QRNG client
//!
//! Provides a unified error taxonomy using `thiserror` for ergonomic error handling.
//! Variants are grouped into configuration, validation, transport, decode and
//! sampler failures; the `is_*` helpers classify them.

pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for QRNG client operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration is invalid or could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),

    /// Authenticated endpoint selected but no API key set
    #[error("API key required for this endpoint")]
    MissingApiKey,

    /// Caller supplied an out-of-range argument
    #[error("Validation error: {0}")]
    Validation(String),

    /// Hex type tag is not `hex8` or `hex16`
    #[error("Invalid hex type '{0}', must be hex8 or hex16")]
    InvalidHexType(String),

    /// Hex block size outside `[1, 10]`
    #[error("Block size must be between 1-10, got {0}")]
    InvalidBlockSize(usize),

    /// Network communication failed
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Request exceeded the configured timeout
    #[error("Operation timed out")]
    Timeout,

    /// Upstream answered with a non-success status
    #[error("Unexpected status code {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// Response body could not be interpreted
    #[error("Decode error: {0}")]
    Decode(String),

    /// Upstream reported failure with a message
    #[error("API error: {0}")]
    Api(String),

    /// Upstream reported failure without a message
    #[error("API request failed")]
    ApiFailure,

    /// Upstream returned fewer values than requested
    #[error("Insufficient data: expected {expected}, got {actual}")]
    InsufficientData { expected: usize, actual: usize },

    /// Sampler bounds are inverted
    #[error("min cannot be greater than max (min={min}, max={max})")]
    InvalidRange { min: i64, max: i64 },

    /// Sampler range cannot be represented
    #[error("Range size exceeds maximum supported value: {0}")]
    RangeTooLarge(String),

    /// Sampler rejected every draw up to the configured cap
    #[error("No acceptable sample after {attempts} attempts")]
    SamplingExhausted { attempts: u32 },
}

impl Error {
    /// Missing or invalid configuration
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_) | Error::MissingApiKey)
    }

    /// Argument rejected before any request was made
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::Validation(_) | Error::InvalidHexType(_) | Error::InvalidBlockSize(_)
        )
    }

    /// Network failure, timeout or non-success HTTP status
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Network(_) | Error::Timeout | Error::HttpStatus { .. }
        )
    }

    /// Malformed body, upstream-reported failure or short data
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            Error::Decode(_) | Error::Api(_) | Error::ApiFailure | Error::InsufficientData { .. }
        )
    }

    /// Sampler precondition or exhaustion
    pub fn is_range(&self) -> bool {
        matches!(
            self,
            Error::InvalidRange { .. } | Error::RangeTooLarge(_) | Error::SamplingExhausted { .. }
        )
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Error::Timeout
        } else {
            Error::Network(e)
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Decode(format!("json parse error: {}", e))
    }
}

impl From<::config::ConfigError> for Error {
    fn from(e: ::config::ConfigError) -> Self {
        Error::Config(e.to_string())
    }
}
