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

//! Reference bookkeeping for both directions of the binary codec.
//!
//! Every distinct object is written in full exactly once; every other occurrence
//! is a pointer to its reference id. Pointers may only target objects that
//! appear earlier in write order. An object's id is live as soon as its header
//! has been written, so descendants can point back at an ancestor.

use crate::strategies::{DecodeError, EncodeError};
use ahash::{AHashMap, AHashSet};
use taml_core::{CustomNode, ObjectId, WriteNode};

/// Counts gathered while validating a tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReferenceSummary {
    /// Records written with a full payload.
    pub objects: usize,
    /// Pointer-only records.
    pub references: usize,
}

/// Checks a write-node tree against the reference rules before anything is
/// written.
///
/// The walk follows write order exactly: an element, then its children, then
/// the proxies inside its custom node groups.
#[derive(Debug, Default)]
pub struct ReferenceResolver {
    written: AHashSet<u32>,
    summary: ReferenceSummary,
}

impl ReferenceResolver {
    /// Validates `root` and returns what the pass will write.
    ///
    /// # Errors
    /// [`EncodeError::InvalidArgument`] for an empty class name, a pointer to id
    /// 0, a pointer to an id not yet written, or two full records sharing a
    /// non-zero id.
    pub fn validate(root: &WriteNode) -> Result<ReferenceSummary, EncodeError> {
        let mut resolver = Self::default();
        resolver.visit_element(root)?;
        Ok(resolver.summary)
    }

    fn visit_element(&mut self, node: &WriteNode) -> Result<(), EncodeError> {
        if node.class_name.is_empty() {
            return Err(EncodeError::InvalidArgument(
                "element has an empty class name".to_string(),
            ));
        }

        if let Some(target) = node.reference_to {
            if target == 0 {
                return Err(EncodeError::InvalidArgument(format!(
                    "'{}' points at reference id 0",
                    node.class_name
                )));
            }
            if !self.written.contains(&target) {
                return Err(EncodeError::InvalidArgument(format!(
                    "'{}' points at reference id {} before it is written",
                    node.class_name, target
                )));
            }
            self.summary.references += 1;
            return Ok(());
        }

        if node.ref_id != 0 && !self.written.insert(node.ref_id) {
            return Err(EncodeError::InvalidArgument(format!(
                "reference id {} is used by more than one full record",
                node.ref_id
            )));
        }
        self.summary.objects += 1;

        for child in node.children() {
            self.visit_element(child)?;
        }

        for group in node.custom_nodes.groups() {
            for custom in &group.nodes {
                self.visit_custom_node(custom)?;
            }
        }

        Ok(())
    }

    fn visit_custom_node(&mut self, node: &CustomNode) -> Result<(), EncodeError> {
        if let Some(proxy) = node.proxy_write_node() {
            return self.visit_element(proxy);
        }
        for child in &node.children {
            self.visit_custom_node(child)?;
        }
        Ok(())
    }
}

/// Maps reference ids seen while decoding to the objects they name.
#[derive(Debug, Default)]
pub struct ReferenceTable {
    ids: AHashMap<u32, ObjectId>,
}

impl ReferenceTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `ref_id` names `object`.
    pub fn register(&mut self, ref_id: u32, object: ObjectId) -> Result<(), DecodeError> {
        if self.ids.insert(ref_id, object).is_some() {
            return Err(DecodeError::DuplicateReference(ref_id));
        }
        Ok(())
    }

    /// Resolves a points-to id against everything registered so far.
    pub fn resolve(&self, ref_id: u32) -> Result<ObjectId, DecodeError> {
        self.ids
            .get(&ref_id)
            .copied()
            .ok_or(DecodeError::UnresolvedReference(ref_id))
    }

    /// Number of registered ids.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns `true` if nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
