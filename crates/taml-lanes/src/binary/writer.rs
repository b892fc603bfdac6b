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

//! The binary Taml writer.

use crate::binary::references::ReferenceResolver;
use crate::binary::wire::{write_count, write_str, write_u32};
use crate::compression;
use crate::strategies::EncodeError;
use std::io::Write;
use taml_core::{TamlHeader, WriteNode, MAX_ATTRIBUTE_VALUE_LENGTH, TAML_FORMAT_VERSION};

/// Serializes a write-node tree into a binary Taml stream.
///
/// The writer holds no state between calls: every [`write`](Self::write) is an
/// independent pass over the tree it is given. It appends to the sink and
/// never seeks.
#[derive(Debug, Clone, Copy)]
pub struct TamlBinaryWriter {
    version_id: u32,
}

impl TamlBinaryWriter {
    /// Creates a writer for the current format version.
    pub fn new() -> Self {
        Self {
            version_id: TAML_FORMAT_VERSION,
        }
    }

    /// Sets the version id written into the header.
    pub fn with_version(mut self, version_id: u32) -> Self {
        self.version_id = version_id;
        self
    }

    /// Returns the version id written into the header.
    pub fn version_id(&self) -> u32 {
        self.version_id
    }

    /// Writes the header followed by the element tree rooted at `root`.
    ///
    /// When `compressed` is set the element records are wrapped in one LZ4
    /// block; the header itself is never compressed.
    ///
    /// # Errors
    /// [`EncodeError::InvalidArgument`] when the tree breaks a shape rule, in
    /// which case nothing is written. [`EncodeError::Io`] when the sink fails;
    /// whatever reached the sink must then be discarded.
    pub fn write<W: Write + ?Sized>(
        &self,
        stream: &mut W,
        root: &WriteNode,
        compressed: bool,
    ) -> Result<(), EncodeError> {
        let summary = ReferenceResolver::validate(root)?;

        stream.write_all(&TamlHeader::new(self.version_id, compressed).to_bytes())?;

        if compressed {
            let mut raw = Vec::new();
            ElementEncoder::new(&mut raw).write_element(root)?;
            let packed = compression::compress(&raw);
            log::trace!("Compressed element payload {} -> {} bytes", raw.len(), packed.len());
            stream.write_all(&packed)?;
        } else {
            ElementEncoder::new(stream).write_element(root)?;
        }

        log::debug!(
            "Wrote Taml '{}' (version {}, {} objects, {} references, compressed: {})",
            root.class_name,
            self.version_id,
            summary.objects,
            summary.references,
            compressed
        );
        Ok(())
    }
}

impl Default for TamlBinaryWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes element records to a sink. One encoder serves one pass.
pub(crate) struct ElementEncoder<'a, W: Write + ?Sized> {
    pub(crate) stream: &'a mut W,
}

impl<'a, W: Write + ?Sized> ElementEncoder<'a, W> {
    pub(crate) fn new(stream: &'a mut W) -> Self {
        Self { stream }
    }

    pub(crate) fn write_element(&mut self, node: &WriteNode) -> Result<(), EncodeError> {
        write_str(self.stream, &node.class_name, None)?;
        write_str(self.stream, node.object_name.as_deref().unwrap_or_default(), None)?;
        write_u32(self.stream, node.ref_id)?;

        if let Some(target) = node.reference_to {
            // Pointer only: the payload was written with the target.
            write_u32(self.stream, target)?;
            return Ok(());
        }

        write_u32(self.stream, 0)?;
        self.write_attributes(node)?;
        self.write_children(node)?;
        self.write_custom_elements(node)
    }

    fn write_attributes(&mut self, node: &WriteNode) -> Result<(), EncodeError> {
        write_count(self.stream, node.fields.len())?;
        for field in &node.fields {
            write_str(self.stream, &field.name, None)?;
            write_str(self.stream, &field.value, Some(MAX_ATTRIBUTE_VALUE_LENGTH))?;
        }
        Ok(())
    }

    fn write_children(&mut self, node: &WriteNode) -> Result<(), EncodeError> {
        write_count(self.stream, node.child_count())?;
        for child in node.children() {
            self.write_element(child)?;
        }
        Ok(())
    }
}
