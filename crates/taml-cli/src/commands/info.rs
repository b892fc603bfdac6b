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

use crate::helpers::print_entry;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use taml_agents::TamlAgent;
use taml_core::graph::collect_proxies;
use taml_core::{TamlGraph, TamlHeader};

/// Counts gathered from a decoded graph.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct GraphStats {
    pub objects: usize,
    pub referenced: usize,
    pub fields: usize,
    pub custom_groups: usize,
    pub proxies: usize,
}

impl GraphStats {
    pub fn of(graph: &TamlGraph) -> Self {
        let mut stats = Self {
            objects: graph.len(),
            ..Self::default()
        };
        for (_, object) in graph.iter() {
            if object.ref_id != 0 {
                stats.referenced += 1;
            }
            stats.fields += object.fields.len();
            stats.custom_groups += object.custom_nodes.len();

            let mut proxies = Vec::new();
            for group in &object.custom_nodes {
                collect_proxies(&group.nodes, &mut proxies);
            }
            stats.proxies += proxies.len();
        }
        stats
    }
}

pub fn run(file: &Path) -> Result<()> {
    let data = fs::read(file).with_context(|| format!("Failed to read '{}'", file.display()))?;
    let header = TamlHeader::from_bytes(&data)
        .with_context(|| format!("'{}' is not a binary Taml file", file.display()))?;
    let graph = TamlAgent::new()
        .load(&data)
        .with_context(|| format!("Failed to decode '{}'", file.display()))?;

    let root = graph.root_object();
    let stats = GraphStats::of(&graph);

    print_entry("File", file.display());
    print_entry("Size", format!("{} bytes", data.len()));
    print_entry("Version", header.version);
    print_entry("Compressed", header.compressed);
    print_entry(
        "Root",
        match &root.object_name {
            Some(name) => format!("{} \"{}\"", root.class_name, name),
            None => root.class_name.clone(),
        },
    );
    print_entry("Objects", stats.objects);
    print_entry("Referenced", stats.referenced);
    print_entry("Fields", stats.fields);
    print_entry(
        "Custom",
        format!("{} groups, {} proxies", stats.custom_groups, stats.proxies),
    );
    Ok(())
}
