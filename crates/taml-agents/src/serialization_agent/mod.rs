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

//! The agent responsible for saving and loading Taml documents.
//!
//! This agent is the primary entry point for persistence. It holds a registry of
//! available [`SerializationStrategy`] `Lanes`, picks the configured one when
//! saving, and recognizes the payload when loading. File saves are atomic: the
//! payload is written to a temporary file next to the destination and renamed
//! over it only once every byte is on disk.

mod config;

pub use config::TamlAgentConfig;

use std::collections::HashMap;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use taml_core::{ObjectId, TamlGraph, WriteNode};
use taml_lanes::{BinarySerializationLane, DecodeError, EncodeError, SerializationStrategy};
use tempfile::NamedTempFile;
use thiserror::Error;

/// An error that can occur within the agents.
#[derive(Debug, Error)]
pub enum AgentError {
    /// No strategy is registered under the requested id.
    #[error("No serialization strategy registered under '{0}'")]
    StrategyNotFound(String),
    /// No registered strategy recognizes the payload.
    #[error("Payload is not in any registered format")]
    UnrecognizedFormat,
    /// Encoding failed.
    #[error(transparent)]
    Encode(#[from] EncodeError),
    /// Decoding failed.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// A file could not be read or written.
    #[error("I/O failure on '{}': {source}", path.display())]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },
    /// No factory is registered for the class.
    #[error("No factory registered for class '{0}'")]
    UnknownClass(String),
    /// A factory failed to build its object.
    #[error("Factory for class '{class_name}' failed: {message}")]
    Factory {
        /// The class being instantiated.
        class_name: String,
        /// The factory's error, with its context chain.
        message: String,
    },
    /// A factory produced a value of another type than the one requested.
    #[error("Factory for class '{0}' produced an unexpected type")]
    TypeMismatch(String),
    /// The id does not name an object of the graph.
    #[error("Object {0:?} is not part of the graph")]
    MissingObject(ObjectId),
}

/// The agent responsible for the whole save/load process.
pub struct TamlAgent {
    config: TamlAgentConfig,
    /// All available serialization strategies, keyed by their unique ID.
    strategies: HashMap<String, Box<dyn SerializationStrategy>>,
}

impl TamlAgent {
    /// Creates an agent with the default configuration.
    pub fn new() -> Self {
        Self::with_config(TamlAgentConfig::default())
    }

    /// Creates an agent and registers all built-in strategies.
    pub fn with_config(config: TamlAgentConfig) -> Self {
        let mut agent = Self {
            strategies: HashMap::new(),
            config,
        };
        agent.register_strategy(Box::new(BinarySerializationLane::with_version(
            agent.config.format_version,
        )));
        agent
    }

    /// Registers a strategy, replacing any previous one with the same id.
    pub fn register_strategy(&mut self, strategy: Box<dyn SerializationStrategy>) {
        let id = strategy.get_strategy_id().to_string();
        if self.strategies.insert(id.clone(), strategy).is_some() {
            log::debug!("Replaced serialization strategy '{id}'");
        }
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &TamlAgentConfig {
        &self.config
    }

    /// Encodes the tree rooted at `root` with the configured strategy.
    pub fn save(&self, root: &WriteNode) -> Result<Vec<u8>, AgentError> {
        let strategy = self
            .strategies
            .get(&self.config.strategy_id)
            .ok_or_else(|| AgentError::StrategyNotFound(self.config.strategy_id.clone()))?;

        Ok(strategy.serialize(root, self.config.compressed)?)
    }

    /// Encodes the tree and appends it to `writer`.
    ///
    /// The payload is fully encoded before the first byte reaches `writer`.
    pub fn save_to_writer<W: Write>(&self, root: &WriteNode, writer: &mut W) -> Result<(), AgentError> {
        let payload = self.save(root)?;
        writer.write_all(&payload).map_err(EncodeError::from)?;
        writer.flush().map_err(EncodeError::from)?;
        Ok(())
    }

    /// Encodes the tree and atomically replaces the file at `path` with it.
    ///
    /// On failure the destination is left untouched.
    pub fn save_to_file(&self, root: &WriteNode, path: impl AsRef<Path>) -> Result<(), AgentError> {
        let path = path.as_ref();
        let payload = self.save(root)?;

        let io_error = |source: io::Error| AgentError::Io {
            path: path.to_path_buf(),
            source,
        };

        let directory = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut staging = NamedTempFile::new_in(directory).map_err(io_error)?;
        staging.write_all(&payload).map_err(io_error)?;
        staging.as_file().sync_all().map_err(io_error)?;
        staging.persist(path).map_err(|e| io_error(e.error))?;

        log::info!(
            "Saved '{}' to '{}' ({} bytes)",
            root.class_name,
            path.display(),
            payload.len()
        );
        Ok(())
    }

    /// Decodes a payload with the first strategy that recognizes it.
    ///
    /// The strategy configured for saving is tried first.
    pub fn load(&self, data: &[u8]) -> Result<TamlGraph, AgentError> {
        let preferred = self.strategies.get(&self.config.strategy_id);
        let strategy = preferred
            .filter(|strategy| strategy.can_deserialize(data))
            .or_else(|| {
                self.strategies
                    .values()
                    .find(|strategy| strategy.can_deserialize(data))
            })
            .ok_or(AgentError::UnrecognizedFormat)?;

        Ok(strategy.deserialize(data)?)
    }

    /// Reads `reader` to the end and decodes it.
    pub fn load_from_reader<R: Read>(&self, reader: &mut R) -> Result<TamlGraph, AgentError> {
        let mut data = Vec::new();
        reader
            .read_to_end(&mut data)
            .map_err(|e| AgentError::Decode(DecodeError::from(e)))?;
        self.load(&data)
    }

    /// Reads and decodes the file at `path`.
    pub fn load_from_file(&self, path: impl AsRef<Path>) -> Result<TamlGraph, AgentError> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|source| AgentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let graph = self.load(&data)?;

        log::info!(
            "Loaded '{}' from '{}' ({} objects)",
            graph.root_object().class_name,
            path.display(),
            graph.len()
        );
        Ok(graph)
    }
}

impl Default for TamlAgent {
    fn default() -> Self {
        Self::new()
    }
}
