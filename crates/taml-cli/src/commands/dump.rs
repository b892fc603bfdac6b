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

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fmt::{self, Write};
use std::path::Path;
use taml_agents::TamlAgent;
use taml_core::{CustomValue, ObjectId, PropertyState, TamlGraph, TamlObject, TamlVisitor};

const INDENT: &str = "  ";

pub fn run(file: &Path, json: bool, root_only: bool) -> Result<()> {
    let mut graph = TamlAgent::new()
        .load_from_file(file)
        .with_context(|| format!("Failed to load '{}'", file.display()))?;

    let output = if json {
        serde_json::to_string_pretty(&graph).context("Failed to encode the graph as JSON")?
    } else if root_only {
        render_root_fields(&mut graph)
    } else {
        render_tree(&graph)?
    };

    println!("{output}");
    Ok(())
}

/// Collects the root object's fields through the visitor walk.
#[derive(Default)]
struct RootFields {
    lines: Vec<String>,
}

impl TamlVisitor for RootFields {
    fn wants_root_only(&self) -> bool {
        true
    }

    fn visit(&mut self, state: &mut PropertyState) -> bool {
        self.lines
            .push(format!("{} = {}", state.property_name(), state.property_value()));
        true
    }
}

fn render_root_fields(graph: &mut TamlGraph) -> String {
    let mut visitor = RootFields::default();
    graph.accept(&mut visitor);
    visitor.lines.join("\n")
}

/// Renders the graph as an indented tree.
///
/// Every object is expanded once; later occurrences print as `-> Class (ref N)`.
pub fn render_tree(graph: &TamlGraph) -> Result<String, fmt::Error> {
    let mut printer = TreePrinter {
        graph,
        out: String::new(),
        expanded: HashSet::new(),
    };
    printer.object(graph.root(), 0)?;
    Ok(printer.out.trim_end().to_string())
}

struct TreePrinter<'a> {
    graph: &'a TamlGraph,
    out: String,
    expanded: HashSet<ObjectId>,
}

impl TreePrinter<'_> {
    fn object(&mut self, id: ObjectId, depth: usize) -> fmt::Result {
        let graph = self.graph;
        let object = &graph[id];
        let pad = INDENT.repeat(depth);

        if !self.expanded.insert(id) {
            return writeln!(self.out, "{pad}-> {} (ref {})", label(object), object.ref_id);
        }

        if object.ref_id != 0 {
            writeln!(self.out, "{pad}{} [ref {}]", label(object), object.ref_id)?;
        } else {
            writeln!(self.out, "{pad}{}", label(object))?;
        }

        let inner = INDENT.repeat(depth + 1);
        for field in &object.fields {
            writeln!(self.out, "{inner}{} = {}", field.name, field.value)?;
        }
        for child in &object.children {
            self.object(*child, depth + 1)?;
        }
        for group in &object.custom_nodes {
            writeln!(self.out, "{inner}<{}>", group.name)?;
            for value in &group.nodes {
                self.custom(value, depth + 2)?;
            }
        }
        Ok(())
    }

    fn custom(&mut self, value: &CustomValue, depth: usize) -> fmt::Result {
        let node = match value {
            CustomValue::Proxy { object } => return self.object(*object, depth),
            CustomValue::Node(node) => node,
        };

        let pad = INDENT.repeat(depth);
        match &node.text {
            Some(text) => writeln!(self.out, "{pad}{}: {text}", node.name)?,
            None => writeln!(self.out, "{pad}{}", node.name)?,
        }
        let inner = INDENT.repeat(depth + 1);
        for field in &node.fields {
            writeln!(self.out, "{inner}{} = {}", field.name, field.value)?;
        }
        for child in &node.children {
            self.custom(child, depth + 1)?;
        }
        Ok(())
    }
}

fn label(object: &TamlObject) -> String {
    match &object.object_name {
        Some(name) => format!("{} \"{}\"", object.class_name, name),
        None => object.class_name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taml_core::{CustomNode, CustomNodeGroup, WriteNode};

    fn decode(root: &WriteNode) -> TamlGraph {
        let agent = TamlAgent::new();
        agent.load(&agent.save(root).unwrap()).unwrap()
    }

    #[test]
    fn tree_expands_shared_objects_once() {
        let graph = decode(
            &WriteNode::new("Scene")
                .with_child(WriteNode::new("ImageAsset").with_name("A").with_ref_id(7))
                .with_child(WriteNode::reference("ImageAsset", 7))
                .with_custom_group(
                    CustomNodeGroup::new("Shapes").with_node(
                        CustomNode::new("Circle")
                            .with_text("round")
                            .with_field("Radius", "1"),
                    ),
                ),
        );

        let expected = [
            "Scene",
            "  ImageAsset \"A\" [ref 7]",
            "  -> ImageAsset \"A\" (ref 7)",
            "  <Shapes>",
            "    Circle: round",
            "      Radius = 1",
        ]
        .join("\n");
        assert_eq!(render_tree(&graph).unwrap(), expected);
    }

    #[test]
    fn root_only_lists_root_fields() {
        let mut graph = decode(
            &WriteNode::new("Scene")
                .with_field("Gravity", "0 -9.8")
                .with_child(WriteNode::new("Sprite").with_field("Image", "hero")),
        );
        assert_eq!(render_root_fields(&mut graph), "Gravity = 0 -9.8");
    }
}
