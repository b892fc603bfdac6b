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

//! The binary Taml codec.
//!
//! ```text
//! Stream   := Signature Version:u32 Compressed:bool Element
//! Element  := ClassName ObjectName RefId:u32 PointsToId:u32 [Body]
//! Body     := AttrBlock ChildBlock CustomBlock      -- omitted when PointsToId != 0
//! ```
//!
//! Strings are NUL-terminated, integers little-endian. See [`custom`] for the
//! custom node grammar.

pub mod custom;
pub mod references;
pub mod wire;

mod reader;
mod writer;

pub use reader::{TamlBinaryReader, MAX_NESTING_DEPTH};
pub use references::{ReferenceResolver, ReferenceSummary, ReferenceTable};
pub use writer::TamlBinaryWriter;
