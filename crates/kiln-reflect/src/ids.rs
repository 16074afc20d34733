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

//! Identifier primitives understood by the archive.
//!
//! A [`Guid`] is the 128-bit stable identity of an asset or record; a
//! [`Tuid`] is the legacy 64-bit tool identifier still carried by older
//! content; an [`EnginePath`] is an engine-relative path string. The path
//! is an identifier, not a filesystem handle: no existence checks, no
//! platform separators, no I/O.

use std::fmt;
use uuid::Uuid;

/// A 128-bit globally unique identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Guid(Uuid);

impl Guid {
    /// Creates a new random (version 4) identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an identifier from its raw big-endian bytes.
    #[inline]
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Returns the raw big-endian bytes of the identifier.
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }

    /// Returns `true` for the all-zero identifier.
    #[inline]
    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A 64-bit tool-unique identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Tuid(pub u64);

impl Tuid {
    /// The null identifier.
    pub const NULL: Self = Self(0);

    /// Returns `true` for the null identifier.
    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Tuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// An engine-relative path string, stored with forward slashes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct EnginePath(String);

impl EnginePath {
    /// Creates a path, normalizing backslashes to forward slashes.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into().replace('\\', "/"))
    }

    /// Returns the path text.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the path is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for EnginePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EnginePath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guid_round_trips_through_bytes() {
        let guid = Guid::generate();
        assert_eq!(Guid::from_bytes(*guid.as_bytes()), guid);
        assert!(!guid.is_nil());
        assert!(Guid::default().is_nil());
    }

    #[test]
    fn tuid_null_and_display() {
        assert!(Tuid::NULL.is_null());
        assert_eq!(format!("{}", Tuid(0xAB)), "0x00000000000000ab");
    }

    #[test]
    fn engine_path_normalizes_separators() {
        let path = EnginePath::new(r"art\characters\hero.entity");
        assert_eq!(path.as_str(), "art/characters/hero.entity");
    }
}
