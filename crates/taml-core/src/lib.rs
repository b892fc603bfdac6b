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

//! # Taml Core
//!
//! Foundational crate containing the data contracts shared by the Taml codec:
//! the write-node model handed over by the reflection layer, the binary wire
//! format constants and header, and the decoded object graph produced by readers.

#![warn(missing_docs)]

pub mod format;
pub mod graph;
pub mod node;
pub mod visitor;

pub use format::{HeaderError, TamlHeader, TAML_FORMAT_VERSION, TAML_SIGNATURE};
pub use graph::{
    CustomGroup, CustomValue, DecodedCustomNode, Field, ObjectId, TamlGraph, TamlObject, WireText,
};
pub use node::{
    CustomField, CustomNode, CustomNodeGroup, CustomNodes, FieldValuePair, WriteNode,
    MAX_ATTRIBUTE_VALUE_LENGTH, MAX_NODE_FIELD_VALUE_LENGTH,
};
pub use visitor::{PropertyState, TamlVisitor};
