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

//! Bounded uniform integer sampling
//!
//! Draws are taken over the smallest power of two covering the range and
//! rejected when they fall outside it, so every value in `[min, max]` is equally
//! likely. Reducing a draw modulo the range size would favour the low values
//! whenever the range does not divide the power of two.
//!
//! The sampler itself is pure: the client feeds it fresh bytes from the service
//! until [`BoundedSampler::accept`] returns a value.

use crate::{reshape::bytes_to_u64, Error, Result};

/// Acceptance plan for one `[min, max]` request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundedSampler {
    min: i64,
    range_size: u64,
    bit_width: u32,
}

impl BoundedSampler {
    /// Plan sampling over the inclusive range `[min, max]`
    pub fn new(min: i64, max: i64) -> Result<Self> {
        if min > max {
            return Err(Error::InvalidRange { min, max });
        }

        let range_size = max
            .checked_sub(min)
            .and_then(|span| span.checked_add(1))
            .ok_or_else(|| {
                Error::RangeTooLarge(format!("range [{}, {}] overflows i64", min, max))
            })? as u64;

        // At least one bit, so every draw requests at least one byte
        let mut bit_width = 1u32;
        while (1u128 << bit_width) < u128::from(range_size) {
            bit_width += 1;
        }

        if bit_width as usize > crate::MAX_BITS {
            return Err(Error::RangeTooLarge(format!(
                "maximum supported bits is {}",
                crate::MAX_BITS
            )));
        }

        Ok(Self {
            min,
            range_size,
            bit_width,
        })
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    /// Number of values in the range
    pub fn range_size(&self) -> u64 {
        self.range_size
    }

    /// Bits per draw
    pub fn bit_width(&self) -> u32 {
        self.bit_width
    }

    /// Bytes to request per draw
    pub fn byte_len(&self) -> usize {
        (self.bit_width as usize).div_ceil(8)
    }

    /// Mask keeping the low `bit_width` bits
    pub fn mask(&self) -> u64 {
        if self.bit_width >= 64 {
            u64::MAX
        } else {
            (1u64 << self.bit_width) - 1
        }
    }

    /// Map one draw into the range, or `None` if it must be discarded
    pub fn accept(&self, bytes: &[u8]) -> Option<i64> {
        let value = bytes_to_u64(bytes) & self.mask();
        if value < self.range_size {
            // value < range_size <= i64::MAX, and min + value <= max
            Some(self.min + value as i64)
        } else {
            None
        }
    }
}
