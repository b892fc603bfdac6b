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

//! Defines the abstract contract for Taml serialization strategies and their errors.
//!
//! The core of this module is the [`SerializationStrategy`] trait, which provides
//! a unified interface for every encoding `Lane`. Agents hold strategies behind
//! this trait and dispatch to them by id or by sniffing the payload.

mod binary_lane;

pub use binary_lane::*;

use std::io;
use taml_core::{HeaderError, TamlGraph, WriteNode};
use thiserror::Error;

/// An error that can occur while encoding a write-node tree.
///
/// Encoding never fails because of string content; values that are too long
/// are truncated instead.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The underlying sink rejected a write. The output must be discarded.
    #[error("Serialization failed: I/O error - {0}")]
    Io(#[from] io::Error),
    /// The tree violates a shape rule (empty class name, bad reference).
    /// Nothing was written.
    #[error("Serialization failed: invalid argument - {0}")]
    InvalidArgument(String),
}

/// An error that can occur while decoding a Taml stream.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The underlying source failed for a reason other than running out of data.
    #[error("Deserialization failed: I/O error - {0}")]
    Io(io::Error),
    /// The stream ended in the middle of a record.
    #[error("Deserialization failed: stream truncated")]
    Truncated,
    /// The header is not a valid Taml header.
    #[error("Deserialization failed: invalid header - {0}")]
    Header(#[from] HeaderError),
    /// The stream was written by a newer format version.
    #[error("Deserialization failed: unsupported version {found} (newest supported is {supported})")]
    UnsupportedVersion {
        /// The version found in the header.
        found: u32,
        /// The newest version this reader understands.
        supported: u32,
    },
    /// A boolean byte was neither 0 nor 1.
    #[error("Deserialization failed: invalid boolean byte {0:#04x}")]
    InvalidBool(u8),
    /// An element record carried an empty class name.
    #[error("Deserialization failed: element with empty class name")]
    EmptyClassName,
    /// A points-to id did not match any object decoded earlier.
    #[error("Deserialization failed: unresolved reference to id {0}")]
    UnresolvedReference(u32),
    /// Two full records claimed the same reference id.
    #[error("Deserialization failed: duplicate reference id {0}")]
    DuplicateReference(u32),
    /// Elements or custom nodes nest deeper than the decoder allows.
    #[error("Deserialization failed: nesting deeper than {0} levels")]
    NestingTooDeep(usize),
    /// Decoded ids do not form a consistent graph.
    #[error("Deserialization failed: decoded graph is inconsistent")]
    InconsistentGraph,
    /// The compressed payload could not be inflated.
    #[error("Deserialization failed: corrupt compressed payload - {0}")]
    Decompression(String),
}

impl From<io::Error> for DecodeError {
    fn from(error: io::Error) -> Self {
        if error.kind() == io::ErrorKind::UnexpectedEof {
            DecodeError::Truncated
        } else {
            DecodeError::Io(error)
        }
    }
}

/// The abstract contract for a Taml serialization strategy `Lane`.
///
/// Each implementation converts a write-node tree to bytes and bytes back into
/// a decoded object graph.
pub trait SerializationStrategy: Send + Sync {
    /// Returns the unique, versioned string identifier for this strategy.
    /// Example: `"TAML_BINARY_V1"`.
    fn get_strategy_id(&self) -> &'static str;

    /// Returns `true` if `data` looks like something this strategy produced.
    fn can_deserialize(&self, data: &[u8]) -> bool;

    /// Serializes the tree rooted at `root` into a byte payload.
    fn serialize(&self, root: &WriteNode, compressed: bool) -> Result<Vec<u8>, EncodeError>;

    /// Deserializes a byte payload into a decoded object graph.
    fn deserialize(&self, data: &[u8]) -> Result<TamlGraph, DecodeError>;
}
