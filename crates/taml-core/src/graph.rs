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

//! The decoded form of a Taml stream.
//!
//! Readers reconstruct the object graph into an arena: every distinct object is
//! stored once in [`TamlGraph`] and addressed by an [`ObjectId`]. Children and
//! proxy custom nodes hold ids rather than owned values, so a back-reference in
//! the stream resolves to the very same object as its first occurrence, and a
//! child pointing back at an ancestor forms a cycle without any ownership issue.

use crate::node::{CustomField, CustomNode, CustomNodeGroup, FieldValuePair, WriteNode};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::ops::{Deref, Index};

/// Index of an object inside a [`TamlGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ObjectId(usize);

impl ObjectId {
    /// Wraps a raw arena index.
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the raw arena index.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A string value read from the wire.
///
/// Writers cut long values at a byte boundary, which can split a multi-byte
/// character. Such a value reads as text with a replacement character, and the
/// exact bytes that were on the wire stay available through [`as_bytes`].
///
/// [`as_bytes`]: WireText::as_bytes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WireText {
    text: String,
    /// Set only when `text` is a lossy rendering of these bytes.
    raw: Option<Vec<u8>>,
}

impl WireText {
    /// Wraps bytes read from the wire.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        match String::from_utf8(bytes) {
            Ok(text) => Self { text, raw: None },
            Err(err) => Self {
                text: String::from_utf8_lossy(err.as_bytes()).into_owned(),
                raw: Some(err.into_bytes()),
            },
        }
    }

    /// The value as text, with invalid sequences replaced.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The exact bytes that were on the wire.
    pub fn as_bytes(&self) -> &[u8] {
        self.raw.as_deref().unwrap_or(self.text.as_bytes())
    }

    /// Returns `true` if the wire bytes were not valid UTF-8.
    pub fn is_lossy(&self) -> bool {
        self.raw.is_some()
    }
}

impl From<String> for WireText {
    fn from(text: String) -> Self {
        Self { text, raw: None }
    }
}

impl From<&str> for WireText {
    fn from(text: &str) -> Self {
        Self::from(text.to_owned())
    }
}

impl Deref for WireText {
    type Target = str;

    fn deref(&self) -> &str {
        &self.text
    }
}

impl PartialEq<str> for WireText {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<&str> for WireText {
    fn eq(&self, other: &&str) -> bool {
        *self == **other
    }
}

impl fmt::Display for WireText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for WireText {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.raw {
            None => serializer.serialize_str(&self.text),
            Some(raw) => {
                let mut state = serializer.serialize_struct("WireText", 2)?;
                state.serialize_field("text", &self.text)?;
                state.serialize_field("bytes", raw)?;
                state.end()
            }
        }
    }
}

/// A decoded name/value pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    /// The field name.
    pub name: String,
    /// The field value, as it survived truncation on write.
    pub value: WireText,
}

impl Field {
    /// Creates a new field.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: WireText::from(value.into()),
        }
    }
}

/// A decoded object record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TamlObject {
    /// Semantic type tag.
    pub class_name: String,
    /// Instance name, `None` when written empty.
    pub object_name: Option<String>,
    /// Reference id the object was written with, 0 if it was never a target.
    pub ref_id: u32,
    /// Scalar attributes in stream order.
    pub fields: Vec<Field>,
    /// Children in stream order.
    pub children: Vec<ObjectId>,
    /// Custom node groups in stream order.
    pub custom_nodes: Vec<CustomGroup>,
}

impl TamlObject {
    /// Creates an object with a header but no body yet.
    pub fn new(class_name: impl Into<String>, object_name: Option<String>, ref_id: u32) -> Self {
        Self {
            class_name: class_name.into(),
            object_name,
            ref_id,
            fields: Vec::new(),
            children: Vec::new(),
            custom_nodes: Vec::new(),
        }
    }

    /// Returns the value of the first field named `name`.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.find_field(name).map(WireText::as_str)
    }

    /// Returns the exact wire bytes of the first field named `name`.
    pub fn field_bytes(&self, name: &str) -> Option<&[u8]> {
        self.find_field(name).map(WireText::as_bytes)
    }

    fn find_field(&self, name: &str) -> Option<&WireText> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| &field.value)
    }

    /// Returns the first custom group named `name`.
    pub fn custom_group(&self, name: &str) -> Option<&CustomGroup> {
        self.custom_nodes.iter().find(|group| group.name == name)
    }
}

/// A decoded custom node group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomGroup {
    /// The collection name.
    pub name: String,
    /// The members of the collection.
    pub nodes: Vec<CustomValue>,
}

/// A decoded custom node entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CustomValue {
    /// A structural node carrying its own data.
    Node(DecodedCustomNode),
    /// A full object record reached through a custom node slot.
    Proxy {
        /// The object the proxy decoded to.
        object: ObjectId,
    },
}

/// The data of a non-proxy custom node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedCustomNode {
    /// Tag identifying the node's role.
    pub name: String,
    /// The text value with its padding removed; `None` when it was empty.
    pub text: Option<WireText>,
    /// Nested entries.
    pub children: Vec<CustomValue>,
    /// Local fields.
    pub fields: Vec<Field>,
}

/// An arena holding every object decoded from one stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TamlGraph {
    objects: Vec<TamlObject>,
    root: ObjectId,
    #[serde(skip)]
    dirty: bool,
}

impl TamlGraph {
    /// Assembles a graph, checking that every id it contains is in range.
    pub fn from_parts(objects: Vec<TamlObject>, root: ObjectId) -> Option<Self> {
        let in_range = |id: &ObjectId| id.index() < objects.len();
        if !in_range(&root) {
            return None;
        }
        for object in &objects {
            if !object.children.iter().all(in_range) {
                return None;
            }
            let mut proxies = Vec::new();
            for group in &object.custom_nodes {
                collect_proxies(&group.nodes, &mut proxies);
            }
            if !proxies.iter().all(in_range) {
                return None;
            }
        }
        Some(Self {
            objects,
            root,
            dirty: false,
        })
    }

    /// Returns the id of the root object.
    pub fn root(&self) -> ObjectId {
        self.root
    }

    /// Returns the root object.
    pub fn root_object(&self) -> &TamlObject {
        &self.objects[self.root.index()]
    }

    /// Returns the object with the given id.
    pub fn get(&self, id: ObjectId) -> Option<&TamlObject> {
        self.objects.get(id.index())
    }

    /// Returns the object with the given id for modification.
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut TamlObject> {
        self.objects.get_mut(id.index())
    }

    /// Number of distinct objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns `true` if the graph holds no objects. A decoded graph never is.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Iterates every object with its id, in decode order.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &TamlObject)> {
        self.objects
            .iter()
            .enumerate()
            .map(|(index, object)| (ObjectId(index), object))
    }

    /// Finds the first object with the given instance name.
    pub fn find_by_name(&self, name: &str) -> Option<ObjectId> {
        self.iter()
            .find(|(_, object)| object.object_name.as_deref() == Some(name))
            .map(|(id, _)| id)
    }

    /// Returns `true` once a visitor has rewritten a property.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Rebuilds a write-node tree from the graph.
    ///
    /// The first time an object is reached it is emitted in full; every later
    /// occurrence, including a cycle back to an ancestor, becomes a pointer to
    /// its reference id. Lossy values are re-emitted as their text.
    pub fn to_write_node(&self) -> WriteNode {
        let mut emitted = HashSet::new();
        self.object_to_write_node(self.root, &mut emitted)
    }

    fn object_to_write_node(&self, id: ObjectId, emitted: &mut HashSet<ObjectId>) -> WriteNode {
        let object = &self[id];

        if !emitted.insert(id) {
            let mut node = WriteNode::reference(object.class_name.clone(), object.ref_id);
            node.object_name = object.object_name.clone();
            return node;
        }

        let mut node = WriteNode::new(object.class_name.clone()).with_ref_id(object.ref_id);
        node.object_name = object.object_name.clone();
        node.fields = object
            .fields
            .iter()
            .map(|field| FieldValuePair::new(field.name.clone(), field.value.as_str().to_owned()))
            .collect();

        for child in &object.children {
            let child_node = self.object_to_write_node(*child, emitted);
            node.add_child(child_node);
        }

        for group in &object.custom_nodes {
            let mut write_group = CustomNodeGroup::new(group.name.clone());
            for value in &group.nodes {
                write_group.add_node(self.custom_to_write_node(value, emitted));
            }
            node.custom_nodes.add_group(write_group);
        }

        node
    }

    fn custom_to_write_node(&self, value: &CustomValue, emitted: &mut HashSet<ObjectId>) -> CustomNode {
        match value {
            CustomValue::Proxy { object } => {
                CustomNode::proxy(self.object_to_write_node(*object, emitted))
            }
            CustomValue::Node(decoded) => {
                let mut node = CustomNode::new(decoded.name.clone());
                node.text_value = decoded.text.as_deref().map(str::to_owned);
                node.fields = decoded
                    .fields
                    .iter()
                    .map(|field| CustomField::new(field.name.clone(), field.value.as_str().to_owned()))
                    .collect();
                for child in &decoded.children {
                    let child_node = self.custom_to_write_node(child, emitted);
                    node.add_child(child_node);
                }
                node
            }
        }
    }
}

impl Index<ObjectId> for TamlGraph {
    type Output = TamlObject;

    fn index(&self, id: ObjectId) -> &TamlObject {
        &self.objects[id.index()]
    }
}

/// Collects the object ids of every proxy among `values`, recursively.
pub fn collect_proxies(values: &[CustomValue], out: &mut Vec<ObjectId>) {
    for value in values {
        match value {
            CustomValue::Proxy { object } => out.push(*object),
            CustomValue::Node(node) => collect_proxies(&node.children, out),
        }
    }
}
