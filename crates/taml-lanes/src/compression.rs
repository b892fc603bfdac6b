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

//! LZ4 wrapping of compressed element payloads.
//!
//! A compressed stream keeps its header uncompressed; everything after it is a
//! single LZ4 block prefixed with the little-endian `u32` size of the raw bytes.

use crate::strategies::DecodeError;

/// Compresses raw element bytes into a size-prefixed LZ4 block.
pub fn compress(raw: &[u8]) -> Vec<u8> {
    lz4_flex::block::compress_prepend_size(raw)
}

/// Inflates a size-prefixed LZ4 block back into raw element bytes.
pub fn decompress(packed: &[u8]) -> Result<Vec<u8>, DecodeError> {
    lz4_flex::block::decompress_size_prepended(packed)
        .map_err(|e| DecodeError::Decompression(e.to_string()))
}
