// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Defines the container header of the binary Taml format.
//!
//! Every binary Taml stream starts with a fixed-size [`TamlHeader`]: the ASCII
//! signature, the format version, and a one-byte compression flag. The element
//! records that follow are described by the lanes that encode them; the header
//! is the only part of the format with a fixed layout.
//!
//! Integers are little-endian. Legacy files were written in the host's native
//! order, which is little-endian on every platform the engine shipped on, so the
//! two agree byte for byte.

use thiserror::Error;

/// The signature token opening every binary Taml stream. No length, no terminator.
pub const TAML_SIGNATURE: [u8; 4] = *b"Taml";

/// The format version written by default and the newest version readers accept.
pub const TAML_FORMAT_VERSION: u32 = 1;

/// An error raised while parsing a [`TamlHeader`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HeaderError {
    /// Fewer bytes than [`TamlHeader::SIZE`] were available.
    #[error("not enough bytes for a Taml header: expected {expected}, got {actual}")]
    TooShort {
        /// Size of a complete header.
        expected: usize,
        /// Number of bytes available.
        actual: usize,
    },
    /// The stream does not start with [`TAML_SIGNATURE`].
    #[error("invalid signature {0:?}; not a binary Taml stream")]
    InvalidSignature([u8; 4]),
    /// The compression flag byte was neither 0 nor 1.
    #[error("invalid compressed flag byte {0:#04x}")]
    InvalidCompressedFlag(u8),
}

/// The fixed-size header at the beginning of every binary Taml stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TamlHeader {
    /// The format version the payload was written with.
    pub version: u32,
    /// Whether the element records are wrapped in a compressed block.
    pub compressed: bool,
}

impl TamlHeader {
    /// The total size of the header in bytes.
    pub const SIZE: usize = TAML_SIGNATURE.len() + 4 + 1;

    /// Creates a header for the given version and compression mode.
    pub fn new(version: u32, compressed: bool) -> Self {
        Self {
            version,
            compressed,
        }
    }

    /// Lays the header out exactly as it appears on the wire.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&TAML_SIGNATURE);
        bytes[4..8].copy_from_slice(&self.version.to_le_bytes());
        bytes[8] = u8::from(self.compressed);
        bytes
    }

    /// Attempts to parse a `TamlHeader` from the beginning of a byte slice.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HeaderError> {
        if bytes.len() < Self::SIZE {
            return Err(HeaderError::TooShort {
                expected: Self::SIZE,
                actual: bytes.len(),
            });
        }

        let mut signature = [0u8; 4];
        signature.copy_from_slice(&bytes[0..4]);
        if signature != TAML_SIGNATURE {
            return Err(HeaderError::InvalidSignature(signature));
        }

        let mut version_bytes = [0u8; 4];
        version_bytes.copy_from_slice(&bytes[4..8]);
        let version = u32::from_le_bytes(version_bytes);

        let compressed = match bytes[8] {
            0 => false,
            1 => true,
            other => return Err(HeaderError::InvalidCompressedFlag(other)),
        };

        Ok(Self {
            version,
            compressed,
        })
    }

    /// Returns `true` when `bytes` starts with the Taml signature.
    pub fn has_signature(bytes: &[u8]) -> bool {
        bytes.starts_with(&TAML_SIGNATURE)
    }
}

impl Default for TamlHeader {
    fn default() -> Self {
        Self::new(TAML_FORMAT_VERSION, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_layout_is_signature_version_flag() {
        let bytes = TamlHeader::new(3, true).to_bytes();
        assert_eq!(&bytes[0..4], b"Taml");
        assert_eq!(&bytes[4..8], &[3, 0, 0, 0]);
        assert_eq!(bytes[8], 1);
    }

    #[test]
    fn header_parses_back() {
        let header = TamlHeader::new(TAML_FORMAT_VERSION, false);
        let parsed = TamlHeader::from_bytes(&header.to_bytes()).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn rejects_foreign_signature() {
        let mut bytes = TamlHeader::default().to_bytes();
        bytes[0..4].copy_from_slice(b"KHOR");
        assert_eq!(
            TamlHeader::from_bytes(&bytes),
            Err(HeaderError::InvalidSignature(*b"KHOR"))
        );
    }

    #[test]
    fn rejects_short_input_and_bad_flag() {
        assert!(matches!(
            TamlHeader::from_bytes(b"Taml"),
            Err(HeaderError::TooShort { expected: 9, actual: 4 })
        ));

        let mut bytes = TamlHeader::default().to_bytes();
        bytes[8] = 7;
        assert_eq!(
            TamlHeader::from_bytes(&bytes),
            Err(HeaderError::InvalidCompressedFlag(7))
        );
    }
}
