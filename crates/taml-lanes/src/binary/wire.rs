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

//! Primitive reads and writes of the binary Taml format.
//!
//! Strings are written as their bytes followed by a single NUL. Writing stops at
//! the first interior NUL, exactly like the C-string writes of legacy files, so
//! no string content can make a write fail.

use crate::strategies::{DecodeError, EncodeError};
use std::io::{BufRead, Read, Write};
use taml_core::WireText;

/// Returns the bytes of `value` that reach the wire: everything before the first
/// NUL, cut to at most `max_len` bytes when a cap is given.
///
/// The cut is made at the byte boundary, so a multi-byte character straddling
/// it is split.
pub fn clamp_bytes(value: &str, max_len: Option<usize>) -> &[u8] {
    let bytes = value.as_bytes();
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    let end = max_len.map_or(end, |max| end.min(max));
    &bytes[..end]
}

pub(crate) fn write_u32<W: Write + ?Sized>(stream: &mut W, value: u32) -> Result<(), EncodeError> {
    stream.write_all(&value.to_le_bytes())?;
    Ok(())
}

pub(crate) fn write_count<W: Write + ?Sized>(stream: &mut W, count: usize) -> Result<(), EncodeError> {
    let count = u32::try_from(count).map_err(|_| {
        EncodeError::InvalidArgument(format!("collection of {count} entries exceeds u32 range"))
    })?;
    write_u32(stream, count)
}

pub(crate) fn write_bool<W: Write + ?Sized>(stream: &mut W, value: bool) -> Result<(), EncodeError> {
    stream.write_all(&[u8::from(value)])?;
    Ok(())
}

/// Writes a NUL-terminated string, truncated to `max_len` bytes when given.
pub(crate) fn write_str<W: Write + ?Sized>(
    stream: &mut W,
    value: &str,
    max_len: Option<usize>,
) -> Result<(), EncodeError> {
    let bytes = clamp_bytes(value, max_len);
    if bytes.len() < value.len() {
        log::trace!("Clamped value from {} to {} bytes", value.len(), bytes.len());
    }
    stream.write_all(bytes)?;
    stream.write_all(&[0])?;
    Ok(())
}

/// Writes exactly `width` bytes: the value, zero-padded or truncated.
pub(crate) fn write_fixed<W: Write + ?Sized>(
    stream: &mut W,
    value: Option<&str>,
    width: usize,
) -> Result<(), EncodeError> {
    let bytes = clamp_bytes(value.unwrap_or_default(), Some(width));
    stream.write_all(bytes)?;
    stream.write_all(&vec![0u8; width - bytes.len()])?;
    Ok(())
}

pub(crate) fn read_u32<R: Read + ?Sized>(stream: &mut R) -> Result<u32, DecodeError> {
    let mut bytes = [0u8; 4];
    stream.read_exact(&mut bytes)?;
    Ok(u32::from_le_bytes(bytes))
}

pub(crate) fn read_bool<R: Read + ?Sized>(stream: &mut R) -> Result<bool, DecodeError> {
    let mut byte = [0u8; 1];
    stream.read_exact(&mut byte)?;
    match byte[0] {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(DecodeError::InvalidBool(other)),
    }
}

/// Reads the bytes of a NUL-terminated string. A missing terminator means the
/// stream ended.
fn read_raw<R: BufRead + ?Sized>(stream: &mut R) -> Result<Vec<u8>, DecodeError> {
    let mut bytes = Vec::new();
    stream.read_until(0, &mut bytes)?;
    if bytes.pop() != Some(0) {
        return Err(DecodeError::Truncated);
    }
    Ok(bytes)
}

/// Reads a NUL-terminated name.
pub(crate) fn read_str<R: BufRead + ?Sized>(stream: &mut R) -> Result<String, DecodeError> {
    let bytes = read_raw(stream)?;
    Ok(String::from_utf8(bytes)
        .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned()))
}

/// Reads a NUL-terminated value, keeping its exact bytes.
pub(crate) fn read_text<R: BufRead + ?Sized>(stream: &mut R) -> Result<WireText, DecodeError> {
    Ok(WireText::from_bytes(read_raw(stream)?))
}

/// Reads a fixed-width, zero-padded value. Empty values decode as `None`.
pub(crate) fn read_fixed<R: Read + ?Sized>(
    stream: &mut R,
    width: usize,
) -> Result<Option<WireText>, DecodeError> {
    let mut bytes = vec![0u8; width];
    stream.read_exact(&mut bytes)?;
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(width);
    bytes.truncate(end);
    if bytes.is_empty() {
        return Ok(None);
    }
    Ok(Some(WireText::from_bytes(bytes)))
}

/// Caps up-front allocation for counts read from an untrusted stream.
pub(crate) fn bounded(count: u32) -> usize {
    (count as usize).min(1024)
}
