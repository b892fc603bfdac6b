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

//! Property visitors over a decoded [`TamlGraph`].
//!
//! Tools that only care about attribute values (dependency scanners, asset
//! path rewriters) implement [`TamlVisitor`] instead of walking the graph by
//! hand. A visitor sees every field of every reachable object, can stop the
//! walk early, and can rewrite the value it is looking at.

use crate::graph::{collect_proxies, ObjectId, TamlGraph, WireText};
use std::collections::HashSet;

/// The property currently presented to a visitor.
#[derive(Debug, Clone, Default)]
pub struct PropertyState {
    class_name: String,
    object_name: Option<String>,
    is_root: bool,
    property_name: String,
    property_value: String,
    value_dirty: bool,
}

impl PropertyState {
    /// Class of the object owning the property.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Instance name of the object owning the property.
    pub fn object_name(&self) -> Option<&str> {
        self.object_name.as_deref()
    }

    /// Whether the owning object is the root of the graph.
    pub fn is_root(&self) -> bool {
        self.is_root
    }

    /// The property name.
    pub fn property_name(&self) -> &str {
        &self.property_name
    }

    /// The property value.
    pub fn property_value(&self) -> &str {
        &self.property_value
    }

    /// Replaces the property value; the graph is updated once the visit returns.
    pub fn update_property_value(&mut self, value: impl Into<String>) {
        self.property_value = value.into();
        self.value_dirty = true;
    }

    /// Whether the visitor replaced the value.
    pub fn is_value_dirty(&self) -> bool {
        self.value_dirty
    }

    fn set_object(&mut self, class_name: &str, object_name: Option<&str>, is_root: bool) {
        self.class_name = class_name.to_owned();
        self.object_name = object_name.map(str::to_owned);
        self.is_root = is_root;
    }

    fn set_property(&mut self, name: &str, value: &str) {
        self.property_name = name.to_owned();
        self.property_value = value.to_owned();
        self.value_dirty = false;
    }
}

/// A visitor over the properties of a decoded graph.
pub trait TamlVisitor {
    /// Return `true` to visit only the root object's properties.
    fn wants_root_only(&self) -> bool {
        false
    }

    /// Visits one property. Returning `false` stops the walk.
    fn visit(&mut self, state: &mut PropertyState) -> bool;
}

impl TamlGraph {
    /// Walks every reachable object depth-first (children, then proxy custom
    /// nodes) and presents each field to `visitor`.
    ///
    /// Returns `false` if the visitor stopped the walk. Each object is visited
    /// once even when it is shared or part of a cycle.
    pub fn accept<V: TamlVisitor + ?Sized>(&mut self, visitor: &mut V) -> bool {
        let mut visited = HashSet::new();
        let mut state = PropertyState::default();
        let root = self.root();
        self.accept_object(root, true, visitor, &mut state, &mut visited)
    }

    fn accept_object<V: TamlVisitor + ?Sized>(
        &mut self,
        id: ObjectId,
        is_root: bool,
        visitor: &mut V,
        state: &mut PropertyState,
        visited: &mut HashSet<ObjectId>,
    ) -> bool {
        if !visited.insert(id) {
            return true;
        }

        let Some(object) = self.get(id) else {
            return true;
        };
        state.set_object(&object.class_name, object.object_name.as_deref(), is_root);
        let field_count = object.fields.len();

        for index in 0..field_count {
            {
                let field = &self[id].fields[index];
                state.set_property(&field.name, &field.value);
            }

            let keep_going = visitor.visit(state);

            if state.is_value_dirty() {
                if let Some(object) = self.get_mut(id) {
                    object.fields[index].value = WireText::from(state.property_value());
                }
                self.mark_dirty();
            }

            if !keep_going {
                return false;
            }
        }

        if visitor.wants_root_only() {
            return false;
        }

        let object = &self[id];
        let mut next = object.children.clone();
        for group in &object.custom_nodes {
            collect_proxies(&group.nodes, &mut next);
        }

        for child in next {
            if !self.accept_object(child, false, visitor, state, visited) {
                return false;
            }
        }

        true
    }
}
