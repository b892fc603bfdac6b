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

//! # Taml Lanes
//!
//! The encode/decode pipelines of the Taml binary format. The [`binary`] module
//! holds the writer and reader proper; [`strategies`] wraps them behind the
//! [`SerializationStrategy`] contract used by agents.

#![warn(missing_docs)]

pub mod binary;
pub mod compression;
pub mod strategies;

pub use binary::{TamlBinaryReader, TamlBinaryWriter, MAX_NESTING_DEPTH};
pub use strategies::{
    BinarySerializationLane, BINARY_STRATEGY_ID, DecodeError, EncodeError, SerializationStrategy,
};
