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

//! Wire contract with the upstream QRNG service
//!
//! Requests are plain `GET <endpoint>?length=N&type=T[&size=S]`. Responses are a
//! JSON envelope carrying a success flag, the integer payload and some metadata
//! that is passed through untouched.

use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Header carrying the credential for the authenticated endpoint
pub const API_KEY_HEADER: &str = "x-api-key";

/// Payload type requested from the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Uint8,
    Uint16,
    Hex8,
    Hex16,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Uint8 => "uint8",
            DataType::Uint16 => "uint16",
            DataType::Hex8 => "hex8",
            DataType::Hex16 => "hex16",
        }
    }

    pub fn is_hex(&self) -> bool {
        matches!(self, DataType::Hex8 | DataType::Hex16)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hex output variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HexType {
    /// `block_size` bytes per block
    Hex8,
    /// One 16-bit word per block
    Hex16,
}

impl HexType {
    pub fn as_str(&self) -> &'static str {
        self.data_type().as_str()
    }

    pub fn data_type(&self) -> DataType {
        match self {
            HexType::Hex8 => DataType::Hex8,
            HexType::Hex16 => DataType::Hex16,
        }
    }

    /// Number of hex digits per formatted block
    pub fn digits(&self, block_size: usize) -> usize {
        match self {
            HexType::Hex8 => block_size * 2,
            HexType::Hex16 => 4,
        }
    }
}

impl fmt::Display for HexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HexType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "hex8" => Ok(HexType::Hex8),
            "hex16" => Ok(HexType::Hex16),
            other => Err(Error::InvalidHexType(other.to_string())),
        }
    }
}

impl From<HexType> for DataType {
    fn from(hex: HexType) -> Self {
        hex.data_type()
    }
}

/// One request against the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomRequest {
    pub length: usize,
    pub data_type: DataType,
    /// Only sent for hex types
    pub block_size: Option<usize>,
}

impl RandomRequest {
    pub fn uint8(length: usize) -> Self {
        Self {
            length,
            data_type: DataType::Uint8,
            block_size: None,
        }
    }

    pub fn uint16(length: usize) -> Self {
        Self {
            length,
            data_type: DataType::Uint16,
            block_size: None,
        }
    }

    pub fn hex(length: usize, hex_type: HexType, block_size: usize) -> Self {
        Self {
            length,
            data_type: hex_type.into(),
            block_size: Some(block_size),
        }
    }

    /// Query parameters in wire order
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("length", self.length.to_string()),
            ("type", self.data_type.as_str().to_string()),
        ];

        if let Some(size) = self.block_size.filter(|&s| s > 0 && self.data_type.is_hex()) {
            pairs.push(("size", size.to_string()));
        }

        pairs
    }

    /// Append the query parameters to `url`
    pub fn apply_to(&self, url: &mut Url) {
        let mut query = url.query_pairs_mut();
        for (key, value) in self.query_pairs() {
            query.append_pair(key, &value);
        }
    }
}

/// JSON envelope returned by the service
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResponseEnvelope {
    #[serde(rename = "type")]
    pub data_type: Option<String>,
    pub length: Option<u64>,
    pub success: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub data: Vec<u128>,
    pub completion_time: Option<String>,
    pub seed: Option<String>,
    pub refresh: Option<bool>,
    pub error: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub info: Vec<String>,
}

impl ResponseEnvelope {
    /// Check the envelope against a request for `requested` values and return
    /// exactly that many.
    pub fn into_data(self, requested: usize) -> Result<Vec<u128>> {
        if !self.success {
            return Err(match self.error.filter(|e| !e.is_empty()) {
                Some(message) => Error::Api(message),
                None => Error::ApiFailure,
            });
        }

        let mut data = self.data;
        if data.len() < requested {
            return Err(Error::InsufficientData {
                expected: requested,
                actual: data.len(),
            });
        }

        data.truncate(requested);
        Ok(data)
    }
}

/// Parse a response body and validate it against the requested length
pub fn decode_envelope(body: &[u8], requested: usize) -> Result<Vec<u128>> {
    let envelope: ResponseEnvelope = serde_json::from_slice(body)?;
    envelope.into_data(requested)
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
