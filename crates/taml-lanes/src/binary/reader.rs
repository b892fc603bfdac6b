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

//! The binary Taml reader.

use crate::binary::references::ReferenceTable;
use crate::binary::wire::{bounded, read_str, read_text, read_u32};
use crate::compression;
use crate::strategies::DecodeError;
use std::io::{BufRead, BufReader, Read};
use taml_core::{Field, ObjectId, TamlGraph, TamlHeader, TamlObject, TAML_FORMAT_VERSION};

/// Deepest chain of nested elements and custom nodes a stream may contain.
///
/// Each level costs a stack frame while decoding; deeper streams are rejected
/// with [`DecodeError::NestingTooDeep`].
pub const MAX_NESTING_DEPTH: usize = 256;

/// Reconstructs the object graph of a binary Taml stream.
///
/// Pointer records resolve to the object decoded at their first occurrence,
/// so shared objects come back as a single arena entry.
#[derive(Debug, Clone, Copy)]
pub struct TamlBinaryReader {
    max_version: u32,
}

impl TamlBinaryReader {
    /// Creates a reader accepting every version up to the current one.
    pub fn new() -> Self {
        Self {
            max_version: TAML_FORMAT_VERSION,
        }
    }

    /// Sets the newest format version this reader accepts.
    pub fn with_max_version(mut self, max_version: u32) -> Self {
        self.max_version = max_version;
        self
    }

    /// Reads the header only, leaving the stream positioned at the payload.
    pub fn read_header<R: Read + ?Sized>(&self, stream: &mut R) -> Result<TamlHeader, DecodeError> {
        let mut bytes = [0u8; TamlHeader::SIZE];
        stream.read_exact(&mut bytes)?;
        let header = TamlHeader::from_bytes(&bytes)?;
        if header.version > self.max_version {
            return Err(DecodeError::UnsupportedVersion {
                found: header.version,
                supported: self.max_version,
            });
        }
        Ok(header)
    }

    /// Reads a complete stream.
    ///
    /// # Errors
    /// [`DecodeError::Truncated`] if the stream ends inside a record; the
    /// format carries no length framing, so this is only noticed when a read
    /// comes up short. Other variants report malformed content.
    pub fn read<R: Read>(&self, stream: &mut R) -> Result<TamlGraph, DecodeError> {
        let header = self.read_header(stream)?;

        let graph = if header.compressed {
            let mut packed = Vec::new();
            stream.read_to_end(&mut packed)?;
            let raw = compression::decompress(&packed)?;
            ElementDecoder::new(raw.as_slice()).decode()?
        } else {
            ElementDecoder::new(BufReader::new(stream)).decode()?
        };

        log::debug!(
            "Read Taml '{}' (version {}, {} objects, compressed: {})",
            graph.root_object().class_name,
            header.version,
            graph.len(),
            header.compressed
        );
        Ok(graph)
    }

    /// Reads a complete stream held in memory.
    pub fn read_bytes(&self, data: &[u8]) -> Result<TamlGraph, DecodeError> {
        let mut cursor = data;
        self.read(&mut cursor)
    }
}

impl Default for TamlBinaryReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads element records into an object arena. One decoder serves one pass.
pub(crate) struct ElementDecoder<R: BufRead> {
    pub(crate) stream: R,
    objects: Vec<TamlObject>,
    references: ReferenceTable,
    depth: usize,
}

impl<R: BufRead> ElementDecoder<R> {
    pub(crate) fn new(stream: R) -> Self {
        Self {
            stream,
            objects: Vec::new(),
            references: ReferenceTable::new(),
            depth: 0,
        }
    }

    pub(crate) fn decode(mut self) -> Result<TamlGraph, DecodeError> {
        let root = self.read_element()?;

        if !self.stream.fill_buf()?.is_empty() {
            log::warn!("Ignoring trailing bytes after the root element");
        }

        log::trace!(
            "Decoded {} objects, {} reference ids",
            self.objects.len(),
            self.references.len()
        );
        TamlGraph::from_parts(self.objects, root).ok_or(DecodeError::InconsistentGraph)
    }

    /// Descends one level, failing once [`MAX_NESTING_DEPTH`] is reached.
    pub(crate) fn enter(&mut self) -> Result<(), DecodeError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(DecodeError::NestingTooDeep(MAX_NESTING_DEPTH));
        }
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.depth -= 1;
    }

    pub(crate) fn read_element(&mut self) -> Result<ObjectId, DecodeError> {
        self.enter()?;
        let element = self.read_element_body();
        self.leave();
        element
    }

    fn read_element_body(&mut self) -> Result<ObjectId, DecodeError> {
        let class_name = read_str(&mut self.stream)?;
        if class_name.is_empty() {
            return Err(DecodeError::EmptyClassName);
        }
        let object_name = Some(read_str(&mut self.stream)?).filter(|name| !name.is_empty());
        let ref_id = read_u32(&mut self.stream)?;

        let points_to = read_u32(&mut self.stream)?;
        if points_to != 0 {
            let target = self.references.resolve(points_to)?;
            log::trace!("'{class_name}' resolved to reference id {points_to}");
            return Ok(target);
        }

        let id = ObjectId::new(self.objects.len());
        self.objects
            .push(TamlObject::new(class_name, object_name, ref_id));
        if ref_id != 0 {
            self.references.register(ref_id, id)?;
        }

        let fields = self.read_attributes()?;
        let children = self.read_children()?;
        let custom_nodes = self.read_custom_elements()?;

        let object = &mut self.objects[id.index()];
        object.fields = fields;
        object.children = children;
        object.custom_nodes = custom_nodes;
        Ok(id)
    }

    fn read_attributes(&mut self) -> Result<Vec<Field>, DecodeError> {
        let count = read_u32(&mut self.stream)?;
        let mut fields = Vec::with_capacity(bounded(count));
        for _ in 0..count {
            let name = read_str(&mut self.stream)?;
            let value = read_text(&mut self.stream)?;
            fields.push(Field { name, value });
        }
        Ok(fields)
    }

    fn read_children(&mut self) -> Result<Vec<ObjectId>, DecodeError> {
        let count = read_u32(&mut self.stream)?;
        let mut children = Vec::with_capacity(bounded(count));
        for _ in 0..count {
            children.push(self.read_element()?);
        }
        Ok(children)
    }
}
