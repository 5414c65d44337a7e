/*
 * This file is part of the ContentGate content authorization service.
 *
 * Copyright (C) 2026 ContentGate contributors
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published
 * by the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use thiserror::Error;

/// A 64-bit permission vector. Bit `i` (counted right to left) set means the
/// holder carries capability `i`.
///
/// Masks are derived from JWT claims, document-store fields or manifest
/// metadata and compared with [`BitMask64::allows`]: access is allowed when
/// the bitwise AND of the two masks is non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitMask64(u64);

#[derive(Debug, Error, PartialEq)]
pub enum BitMaskError {
    #[error("a bitmask holds at most 8 bytes, got {0}")]
    TooManyBytes(usize),

    #[error("invalid base64 bitmask: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("invalid binary bitmask rendering: '{0}'")]
    InvalidBinary(String),
}

impl BitMask64 {
    /// Returns the raw 64-bit value.
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Access predicate: true when the two masks share at least one set bit.
    pub fn allows(&self, other: &BitMask64) -> bool {
        self.0 & other.0 != 0
    }

    /// Big-endian byte rendering, the inverse of [`BitMask64::try_from`] on
    /// an 8-byte slice.
    pub fn to_be_bytes(&self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    /// Decodes a base64 string into a mask. The decoded payload follows the
    /// byte constructor rules: at most 8 bytes, big-endian, left-padded with
    /// zero bits when shorter.
    pub fn from_base64(encoded: &str) -> Result<Self, BitMaskError> {
        let bytes = BASE64.decode(encoded)?;
        Self::try_from(bytes.as_slice())
    }
}

impl From<u64> for BitMask64 {
    fn from(value: u64) -> Self {
        BitMask64(value)
    }
}

impl TryFrom<&[u8]> for BitMask64 {
    type Error = BitMaskError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() > 8 {
            return Err(BitMaskError::TooManyBytes(bytes.len()));
        }
        let mut padded = [0u8; 8];
        padded[8 - bytes.len()..].copy_from_slice(bytes);
        Ok(BitMask64(u64::from_be_bytes(padded)))
    }
}

impl FromStr for BitMask64 {
    type Err = BitMaskError;

    /// Parses the 64-character binary rendering produced by `Display`.
    /// Shorter strings of binary digits are accepted and padded on the left.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s.len() > 64 || !s.bytes().all(|b| b == b'0' || b == b'1') {
            return Err(BitMaskError::InvalidBinary(s.to_string()));
        }
        u64::from_str_radix(s, 2)
            .map(BitMask64)
            .map_err(|_| BitMaskError::InvalidBinary(s.to_string()))
    }
}

impl fmt::Display for BitMask64 {
    /// Renders all 64 bits, most significant bit leftmost.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:064b}", self.0)
    }
}
