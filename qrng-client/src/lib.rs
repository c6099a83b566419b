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

//! QRNG Client Library
//!
//! Async client for the ANU quantum random number service. Each accessor performs
//! one HTTP round trip (the bounded sampler may perform several), decodes the JSON
//! envelope and reshapes the returned integers into the requested form.
//!
//! # Architecture
//!
//! - `config`: Endpoint, authentication mode and timeouts
//! - `protocol`: Request parameters and response envelope
//! - `reshape`: Bit slicing, width narrowing and hex formatting
//! - `sampler`: Unbiased bounded integers via rejection sampling
//! - `client`: The HTTP client tying it all together
//! - `metrics`: Lightweight request counters
//! - `error`: Unified error types
//!
//! # Example
//!
//! ```no_run
//! # async fn run() -> qrng_client::Result<()> {
//! let client = qrng_client::QrngClient::new()?;
//! let bits = client.get_random_bits(8).await?;
//! let die = client.get_random_number(1, 6).await?;
//! println!("{:?} {}", bits, die);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod metrics;
pub mod protocol;
pub mod reshape;
pub mod sampler;

pub use client::QrngClient;
pub use config::{AuthMode, ClientConfig};
pub use error::{Error, Result};
pub use protocol::{DataType, HexType};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum number of `uint8` values per request
pub const MAX_UINT8_LENGTH: usize = 1024;

/// Maximum number of `uint16` values per request
pub const MAX_UINT16_LENGTH: usize = 1024;

/// Maximum number of hex blocks per request
pub const MAX_HEX_BLOCKS: usize = 1024;

/// Maximum number of bits per request (one full `uint8` batch)
pub const MAX_BITS: usize = MAX_UINT8_LENGTH * 8;

/// Valid hex block sizes (bytes per block)
pub const MIN_HEX_BLOCK_SIZE: usize = 1;
pub const MAX_HEX_BLOCK_SIZE: usize = 10;

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default cap on sampler draws before giving up
pub const DEFAULT_MAX_SAMPLING_ATTEMPTS: u32 = 128;
