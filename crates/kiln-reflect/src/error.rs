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

//! The closed error taxonomy of the reflection and archive subsystem.
//!
//! Callers are expected to match on these variants: everything an archive or
//! registry operation can surface is listed here. Locally recoverable
//! conditions (an unknown field routed to `process_component`, an unknown
//! record class skipped by length) never reach this enum.

use std::fmt;

/// Why a stored CRC did not validate the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumFailure {
    /// The recomputed CRC differs from the stored one: the payload bytes
    /// changed after they were written.
    Mismatch {
        /// The CRC recorded in the file header.
        stored: u32,
        /// The CRC recomputed over the payload as read.
        computed: u32,
    },
    /// The stored CRC is still the invalid sentinel: the writer never
    /// finished, so the file tail cannot be trusted.
    IncompleteWrite,
}

/// An error surfaced by the reflection registry or the binary archive.
#[derive(Debug)]
pub enum ReflectError {
    /// Underlying I/O failure, an empty input stream, or a seek past end.
    Stream(String),
    /// The encoding byte in the header is neither ASCII nor UTF-16.
    UnknownEncoding(u8),
    /// The first two bytes are not a byte order mark in either orientation.
    UnknownByteOrder(u16),
    /// The stream was written by a newer version than this reader supports.
    UnsupportedVersion {
        /// Version recorded in the stream.
        found: u32,
        /// Highest version this implementation understands.
        current: u32,
    },
    /// The payload CRC did not validate; see [`ChecksumFailure`].
    Checksum(ChecksumFailure),
    /// Structural corruption: a missing terminator, a negative record
    /// length, or a container that claims more bytes than remain.
    DataFormat(String),
    /// The stream references a type hash the registry cannot resolve and no
    /// fallback handler consumed it.
    TypeInformation(String),
    /// Programmer misuse: duplicate registration, accessor type mismatch,
    /// serializing through an unopened archive.
    Logic(String),
}

impl fmt::Display for ChecksumFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChecksumFailure::Mismatch { stored, computed } => {
                write!(
                    f,
                    "Corruption detected: crc is {computed:#010x}, should be {stored:#010x}"
                )
            }
            ChecksumFailure::IncompleteWrite => {
                write!(f, "Corruption detected: file was not successfully written")
            }
        }
    }
}

impl fmt::Display for ReflectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReflectError::Stream(msg) => write!(f, "Stream error: {msg}"),
            ReflectError::UnknownEncoding(byte) => {
                write!(f, "Input stream contains an unknown character encoding: {byte}")
            }
            ReflectError::UnknownByteOrder(marker) => {
                write!(f, "Unknown byte order mark read from stream: {marker:#06x}")
            }
            ReflectError::UnsupportedVersion { found, current } => {
                write!(
                    f,
                    "Input stream version is higher than what is supported (input: {found}, current: {current})"
                )
            }
            ReflectError::Checksum(failure) => write!(f, "{failure}"),
            ReflectError::DataFormat(msg) => write!(f, "Data format error: {msg}"),
            ReflectError::TypeInformation(msg) => {
                write!(f, "Type information error: {msg}")
            }
            ReflectError::Logic(msg) => write!(f, "Logic error: {msg}"),
        }
    }
}

impl std::error::Error for ReflectError {}

impl From<std::io::Error> for ReflectError {
    fn from(err: std::io::Error) -> Self {
        ReflectError::Stream(err.to_string())
    }
}
