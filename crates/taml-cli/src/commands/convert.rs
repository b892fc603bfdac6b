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

use crate::helpers::print_success;
use anyhow::{ensure, Context, Result};
use std::path::Path;
use taml_agents::{TamlAgent, TamlAgentConfig};
use taml_core::TAML_FORMAT_VERSION;

pub fn run(input: &Path, output: &Path, compress: bool, format_version: u32) -> Result<()> {
    ensure!(
        (1..=TAML_FORMAT_VERSION).contains(&format_version),
        "Format version {format_version} is not readable by this build (1..={TAML_FORMAT_VERSION})"
    );

    let graph = TamlAgent::new()
        .load_from_file(input)
        .with_context(|| format!("Failed to load '{}'", input.display()))?;

    let config = TamlAgentConfig::default()
        .with_compression(compress)
        .with_format_version(format_version);
    TamlAgent::with_config(config)
        .save_to_file(&graph.to_write_node(), output)
        .with_context(|| format!("Failed to write '{}'", output.display()))?;

    print_success(&format!(
        "Converted '{}' -> '{}' ({} objects, compressed: {})",
        input.display(),
        output.display(),
        graph.len(),
        compress
    ));
    Ok(())
}
