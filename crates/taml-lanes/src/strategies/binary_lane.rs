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

//! A serialization strategy backed by the binary Taml writer and reader.

use crate::binary::{TamlBinaryReader, TamlBinaryWriter};
use crate::strategies::{DecodeError, EncodeError, SerializationStrategy};
use taml_core::{TamlGraph, TamlHeader, WriteNode, TAML_FORMAT_VERSION};

/// Identifier of the binary Taml strategy.
pub const BINARY_STRATEGY_ID: &str = "TAML_BINARY_V1";

/// The binary Taml strategy.
///
/// The payload is the complete stream, header included, so files written by
/// this lane are readable by any other binary Taml reader.
#[derive(Debug, Clone)]
pub struct BinarySerializationLane {
    writer: TamlBinaryWriter,
    reader: TamlBinaryReader,
}

impl BinarySerializationLane {
    /// Creates a lane writing the current format version.
    pub fn new() -> Self {
        Self::with_version(TAML_FORMAT_VERSION)
    }

    /// Creates a lane writing `version` and accepting streams up to that version.
    pub fn with_version(version: u32) -> Self {
        Self {
            writer: TamlBinaryWriter::new().with_version(version),
            reader: TamlBinaryReader::new().with_max_version(version.max(TAML_FORMAT_VERSION)),
        }
    }
}

impl Default for BinarySerializationLane {
    fn default() -> Self {
        Self::new()
    }
}

impl SerializationStrategy for BinarySerializationLane {
    fn get_strategy_id(&self) -> &'static str {
        BINARY_STRATEGY_ID
    }

    fn can_deserialize(&self, data: &[u8]) -> bool {
        TamlHeader::has_signature(data)
    }

    fn serialize(&self, root: &WriteNode, compressed: bool) -> Result<Vec<u8>, EncodeError> {
        let mut payload = Vec::new();
        self.writer.write(&mut payload, root, compressed)?;
        Ok(payload)
    }

    fn deserialize(&self, data: &[u8]) -> Result<TamlGraph, DecodeError> {
        self.reader.read_bytes(data)
    }
}
