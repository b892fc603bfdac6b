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

//! Turns decoded objects back into live values.
//!
//! A decoded [`TamlGraph`] only knows class names. Applications register one
//! factory per class name; the registry dispatches each object to the factory
//! of its class, which reads the fields and children it needs from the graph.

use crate::serialization_agent::AgentError;
use std::any::Any;
use std::collections::HashMap;
use taml_core::{ObjectId, TamlGraph};

/// Builds a live value from the object `id` of a decoded graph.
pub type ClassFactory =
    Box<dyn Fn(&TamlGraph, ObjectId) -> anyhow::Result<Box<dyn Any>> + Send + Sync>;

/// A registry of class factories, keyed by class name.
#[derive(Default)]
pub struct ClassRegistry {
    factories: HashMap<String, ClassFactory>,
}

impl ClassRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `factory` for `class_name`, replacing any previous one.
    pub fn register<F>(&mut self, class_name: impl Into<String>, factory: F)
    where
        F: Fn(&TamlGraph, ObjectId) -> anyhow::Result<Box<dyn Any>> + Send + Sync + 'static,
    {
        let class_name = class_name.into();
        log::debug!("Registered factory for class '{class_name}'");
        self.factories.insert(class_name, Box::new(factory));
    }

    /// Returns `true` if a factory exists for `class_name`.
    pub fn is_registered(&self, class_name: &str) -> bool {
        self.factories.contains_key(class_name)
    }

    /// Instantiates the object `id` through the factory of its class.
    pub fn instantiate(&self, graph: &TamlGraph, id: ObjectId) -> Result<Box<dyn Any>, AgentError> {
        let object = graph.get(id).ok_or(AgentError::MissingObject(id))?;
        let factory = self
            .factories
            .get(&object.class_name)
            .ok_or_else(|| AgentError::UnknownClass(object.class_name.clone()))?;

        factory(graph, id).map_err(|err| AgentError::Factory {
            class_name: object.class_name.clone(),
            message: format!("{err:#}"),
        })
    }

    /// Instantiates the object `id` and downcasts it to `T`.
    pub fn instantiate_as<T: Any>(&self, graph: &TamlGraph, id: ObjectId) -> Result<T, AgentError> {
        let value = self.instantiate(graph, id)?;
        value
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|_| AgentError::TypeMismatch(graph[id].class_name.clone()))
    }

    /// Instantiates the root object of `graph`.
    pub fn instantiate_root(&self, graph: &TamlGraph) -> Result<Box<dyn Any>, AgentError> {
        self.instantiate(graph, graph.root())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use taml_core::{Field, TamlObject};

    #[derive(Debug, PartialEq)]
    struct Sprite {
        image: String,
    }

    fn sprite_graph(image: Option<&str>) -> TamlGraph {
        let mut sprite = TamlObject::new("Sprite", None, 0);
        if let Some(image) = image {
            sprite.fields.push(Field::new("Image", image));
        }
        TamlGraph::from_parts(vec![sprite], ObjectId::new(0)).unwrap()
    }

    fn registry() -> ClassRegistry {
        let mut registry = ClassRegistry::new();
        registry.register("Sprite", |graph, id| {
            let image = graph[id].field("Image").context("Sprite without an Image")?;
            let sprite: Box<dyn Any> = Box::new(Sprite {
                image: image.to_string(),
            });
            Ok(sprite)
        });
        registry
    }

    #[test]
    fn dispatches_on_class_name() {
        let graph = sprite_graph(Some("hero"));
        let sprite: Sprite = registry().instantiate_as(&graph, graph.root()).unwrap();
        assert_eq!(sprite.image, "hero");
    }

    #[test]
    fn factory_errors_keep_their_context() {
        let graph = sprite_graph(None);
        let result = registry().instantiate_root(&graph);
        assert!(matches!(
            result,
            Err(AgentError::Factory { ref class_name, ref message })
                if class_name == "Sprite" && message.contains("without an Image")
        ));
    }

    #[test]
    fn unknown_class_and_wrong_type() {
        let graph = sprite_graph(Some("hero"));
        assert!(matches!(
            ClassRegistry::new().instantiate_root(&graph),
            Err(AgentError::UnknownClass(name)) if name == "Sprite"
        ));
        assert!(matches!(
            registry().instantiate_as::<u32>(&graph, graph.root()),
            Err(AgentError::TypeMismatch(_))
        ));
        assert!(matches!(
            registry().instantiate(&graph, ObjectId::new(3)),
            Err(AgentError::MissingObject(_))
        ));
    }
}
