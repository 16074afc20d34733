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

//! Stable name hashing for wire identity.
//!
//! Types and fields are identified on the wire by the IEEE CRC-32 of their
//! canonical name. The hash of a name never changes across versions, which
//! is what makes renamed-type aliasing and removed-field fallback possible:
//! the stream carries hashes, and the registry decides what they mean today.

use std::fmt;

/// The 32-bit wire identity of a canonical type name.
///
/// Also used as the key type for `TypeID`-keyed element maps, where it must
/// be distinguishable from a plain `u32` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TypeHash(pub u32);

impl fmt::Display for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// Hashes a canonical name to its wire identity.
#[inline]
#[must_use]
pub fn name_hash(name: &str) -> TypeHash {
    TypeHash(crc32fast::hash(name.as_bytes()))
}
