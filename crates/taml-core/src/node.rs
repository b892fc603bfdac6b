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

//! The write-node model consumed by Taml encoders.
//!
//! A [`WriteNode`] tree is built by the reflection layer immediately before a
//! serialization pass, walked once by an encoder, and then dropped. Reference
//! bookkeeping (`ref_id` / `reference_to`) arrives already resolved; encoders
//! validate it but never compute or reorder it.

/// Maximum number of bytes of an attribute value that reach the wire.
///
/// Longer values are truncated at this byte boundary. The truncation is silent
/// and lossy: callers storing large blobs in attributes lose the tail.
pub const MAX_ATTRIBUTE_VALUE_LENGTH: usize = 4096;

/// Width of a custom node's text value on the wire, and the cap applied to
/// custom field values.
///
/// Text values are always written padded to exactly this many bytes; field
/// values are written variable-length but truncated to it.
pub const MAX_NODE_FIELD_VALUE_LENGTH: usize = 2048;

/// A single named scalar attribute of an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValuePair {
    /// The attribute name.
    pub name: String,
    /// The attribute value in its textual form.
    pub value: String,
}

impl FieldValuePair {
    /// Creates a new field/value pair.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One serializable object instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteNode {
    /// Semantic type tag. Must not be empty.
    pub class_name: String,
    /// Optional instance name; written as an empty string when absent.
    pub object_name: Option<String>,
    /// Identifier other nodes use to point at this one; 0 when nothing does.
    pub ref_id: u32,
    /// Reference id of a node written earlier in the same pass.
    ///
    /// When set, this node is only a pointer: nothing but its header and the
    /// target id is written.
    pub reference_to: Option<u32>,
    /// Scalar attributes, in write order.
    pub fields: Vec<FieldValuePair>,
    /// Owned child objects. `None` encodes exactly like an empty list.
    pub children: Option<Vec<WriteNode>>,
    /// Structured data that does not fit flat attributes.
    pub custom_nodes: CustomNodes,
}

impl WriteNode {
    /// Creates an empty node for the given class.
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            object_name: None,
            ref_id: 0,
            reference_to: None,
            fields: Vec::new(),
            children: None,
            custom_nodes: CustomNodes::default(),
        }
    }

    /// Creates a pointer-only node referring to an object already written with
    /// reference id `target_ref_id`.
    pub fn reference(class_name: impl Into<String>, target_ref_id: u32) -> Self {
        Self {
            reference_to: Some(target_ref_id),
            ..Self::new(class_name)
        }
    }

    /// Sets the instance name.
    pub fn with_name(mut self, object_name: impl Into<String>) -> Self {
        self.object_name = Some(object_name.into());
        self
    }

    /// Sets the reference id other nodes may point at.
    pub fn with_ref_id(mut self, ref_id: u32) -> Self {
        self.ref_id = ref_id;
        self
    }

    /// Appends a scalar attribute.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_field(name, value);
        self
    }

    /// Appends a child object.
    pub fn with_child(mut self, child: WriteNode) -> Self {
        self.add_child(child);
        self
    }

    /// Appends a top-level custom node group.
    pub fn with_custom_group(mut self, group: CustomNodeGroup) -> Self {
        self.custom_nodes.add_group(group);
        self
    }

    /// Appends a scalar attribute.
    pub fn add_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push(FieldValuePair::new(name, value));
    }

    /// Appends a child object, creating the children collection on first use.
    pub fn add_child(&mut self, child: WriteNode) {
        self.children.get_or_insert_with(Vec::new).push(child);
    }

    /// Returns `true` if this node is a pointer to another node.
    pub fn is_reference(&self) -> bool {
        self.reference_to.is_some()
    }

    /// Iterates the children, treating a missing collection as empty.
    pub fn children(&self) -> impl Iterator<Item = &WriteNode> {
        self.children.iter().flatten()
    }

    /// Returns the number of children, 0 when the collection is absent.
    pub fn child_count(&self) -> usize {
        self.children.as_ref().map_or(0, Vec::len)
    }

    /// Clears the node back to an empty state, keeping only its class name.
    pub fn reset(&mut self) {
        self.fields.clear();
        self.children = None;
        self.ref_id = 0;
        self.reference_to = None;
        self.object_name = None;
        self.custom_nodes.reset();
    }
}

/// The forest of custom node groups attached to a [`WriteNode`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomNodes {
    groups: Vec<CustomNodeGroup>,
}

impl CustomNodes {
    /// Appends a group.
    pub fn add_group(&mut self, group: CustomNodeGroup) {
        self.groups.push(group);
    }

    /// Returns the groups in write order.
    pub fn groups(&self) -> &[CustomNodeGroup] {
        &self.groups
    }

    /// Finds the first group with the given name.
    pub fn find_group(&self, name: &str) -> Option<&CustomNodeGroup> {
        self.groups.iter().find(|group| group.name == name)
    }

    /// Returns `true` if there are no groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Removes every group.
    pub fn reset(&mut self) {
        self.groups.clear();
    }
}

/// A named collection of custom nodes.
///
/// Only the group name and its members are encoded; a group has no text value
/// or fields of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomNodeGroup {
    /// The collection name (e.g. `"Collisions"`).
    pub name: String,
    /// The typed entries of the collection, in write order.
    pub nodes: Vec<CustomNode>,
}

impl CustomNodeGroup {
    /// Creates an empty group.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
        }
    }

    /// Appends a member node.
    pub fn with_node(mut self, node: CustomNode) -> Self {
        self.nodes.push(node);
        self
    }

    /// Appends a member node.
    pub fn add_node(&mut self, node: CustomNode) {
        self.nodes.push(node);
    }
}

/// A field local to a [`CustomNode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomField {
    /// The field name.
    pub name: String,
    /// The field value, capped at [`MAX_NODE_FIELD_VALUE_LENGTH`] on write.
    pub value: String,
}

impl CustomField {
    /// Creates a new custom field.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A named structured subtree, or a proxy for a full object record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomNode {
    /// Tag identifying the node's role.
    pub name: String,
    /// Scalar payload, written fixed-width.
    ///
    /// Empty and absent text are the same on the wire: `Some("")` reads back as `None`.
    pub text_value: Option<String>,
    /// Nested custom nodes, in write order.
    pub children: Vec<CustomNode>,
    /// Fields local to this node.
    pub fields: Vec<CustomField>,
    /// The wrapped object when this node stands in for a first-class sub-object.
    pub proxy: Option<Box<WriteNode>>,
}

impl CustomNode {
    /// Creates an empty structural node.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text_value: None,
            children: Vec::new(),
            fields: Vec::new(),
            proxy: None,
        }
    }

    /// Creates a proxy node wrapping a full object record.
    pub fn proxy(write_node: WriteNode) -> Self {
        Self {
            proxy: Some(Box::new(write_node)),
            ..Self::new(String::new())
        }
    }

    /// Returns `true` if this node wraps a full object record.
    pub fn is_proxy_object(&self) -> bool {
        self.proxy.is_some()
    }

    /// Returns the wrapped object of a proxy node.
    pub fn proxy_write_node(&self) -> Option<&WriteNode> {
        self.proxy.as_deref()
    }

    /// Sets the text value.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text_value = Some(text.into());
        self
    }

    /// Appends a local field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(CustomField::new(name, value));
        self
    }

    /// Appends a nested node.
    pub fn with_child(mut self, child: CustomNode) -> Self {
        self.children.push(child);
        self
    }

    /// Appends a local field.
    pub fn add_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push(CustomField::new(name, value));
    }

    /// Appends a nested node.
    pub fn add_child(&mut self, child: CustomNode) {
        self.children.push(child);
    }
}
