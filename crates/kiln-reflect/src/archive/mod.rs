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

//! The binary archive: a bidirectional binding of a record graph to a
//! byte stream.
//!
//! # Wire layout
//!
//! ```text
//! [BOM: u16 0xFEFF]            byte order of everything that follows
//! [encoding: u8]               0 = byte strings, 1 = UTF-16
//! [version: u32]               currently 7; readers refuse anything higher
//! [crc32: u32]                 IEEE CRC-32 of every byte after this field
//! [element-array block]        the spool
//!
//! element-array block:
//!   [count: i32]
//!   count records:
//!     [class-name-hash: u32]
//!     [record-length: u32]     bytes from the start of this field to the
//!                              record's end (the length field includes
//!                              itself, so a skip consumes length - 4)
//!     [field-count: u32]
//!     field-count fields:
//!       [field-name-hash: u32]
//!       [nested data record: class-hash, length, payload]
//!     [terminator: i32 = -1]
//!   [terminator: i32 = -1]
//! ```
//!
//! Two CRC values are reserved: [`CRC_INVALID`] is written first and only
//! survives if the writer dies mid-stream, and [`CRC_SKIP`] asks readers
//! to accept the payload unchecked.

pub mod binary;
pub mod stream;

pub use binary::{from_file, from_stream, from_stream_search, to_file, to_stream, BinaryArchive};
pub use stream::{ArchiveStream, Encoding, Endian};

/// The archive version this implementation writes.
pub const CURRENT_VERSION: u32 = 7;

/// Stored CRC requesting that readers skip the checksum pass.
pub const CRC_SKIP: u32 = 0x1010_1010;

/// CRC written before the payload; still present only in aborted writes.
pub const CRC_INVALID: u32 = 0xFFFF_FFFF;

/// Block size for the streaming CRC passes.
pub(crate) const CRC_BLOCK_SIZE: usize = 4096;

/// The byte order mark opening every archive.
pub(crate) const BOM: u16 = 0xFEFF;

/// Closes every element-array and field block.
pub(crate) const TERMINATOR: i32 = -1;

bitflags::bitflags! {
    /// Per-operation archive options.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ArchiveFlags: u32 {
        /// Raise per-record progress events on the status sink.
        const STATUS = 1 << 0;
        /// Keep a null spool entry for every skipped record, preserving
        /// index correspondence with the stream.
        const SPARSE = 1 << 1;
        /// Fail on unknown record classes instead of skipping them.
        const STRICT = 1 << 2;
        /// Downgrade checksum failures to a warning log.
        const OVERRIDE_CRC = 1 << 3;
    }
}

/// A caller-supplied observer for archive progress.
///
/// Events are raised synchronously on the calling thread. Returning `true`
/// from [`on_progress`](StatusSink::on_progress) requests an abort; the
/// reader honors it between records and returns the partial spool.
pub trait StatusSink {
    /// The operation is starting.
    fn on_start(&mut self) {}

    /// Progress, in whole percent. Return `true` to request an abort.
    fn on_progress(&mut self, _percent: u32) -> bool {
        false
    }

    /// The operation finished (or aborted on request).
    fn on_complete(&mut self) {}
}

/// A sink that ignores every event.
#[derive(Debug, Default)]
pub struct NullSink;

impl StatusSink for NullSink {}
