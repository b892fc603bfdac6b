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

//! Configuration of the [`TamlAgent`](super::TamlAgent).

use taml_core::TAML_FORMAT_VERSION;
use taml_lanes::BINARY_STRATEGY_ID;

/// Settings applied to every save performed by an agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TamlAgentConfig {
    /// Wrap element records in a compressed block.
    pub compressed: bool,
    /// Version id written into the header.
    pub format_version: u32,
    /// Strategy used for saving. Loading sniffs the payload instead.
    pub strategy_id: String,
}

impl TamlAgentConfig {
    /// Enables or disables compression.
    pub fn with_compression(mut self, compressed: bool) -> Self {
        self.compressed = compressed;
        self
    }

    /// Sets the format version written by saves.
    pub fn with_format_version(mut self, format_version: u32) -> Self {
        self.format_version = format_version;
        self
    }

    /// Selects the strategy used for saving.
    pub fn with_strategy(mut self, strategy_id: impl Into<String>) -> Self {
        self.strategy_id = strategy_id.into();
        self
    }
}

impl Default for TamlAgentConfig {
    fn default() -> Self {
        Self {
            compressed: false,
            format_version: TAML_FORMAT_VERSION,
            strategy_id: BINARY_STRATEGY_ID.to_string(),
        }
    }
}
