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

//! # Kiln Reflect
//!
//! Runtime reflection and a version-tolerant binary archive for the Kiln
//! toolchain. Records register their classes and fields once; the archive
//! engine then round-trips whole record graphs through a self-describing,
//! checksummed stream that survives schema drift: added fields pick up
//! their defaults, removed fields fall back to a per-record component
//! handler, and renamed types keep resolving through aliases.
//!
//! The three layers, bottom up:
//!
//! - [`registry`] — the catalogue of type descriptors, keyed by the CRC-32
//!   of each canonical name.
//! - [`data`] — the closed set of value shapes the wire understands, and
//!   the [`FieldData`] bindings that connect them to record fields.
//! - [`archive`] — the binary reader/writer over the tagged,
//!   length-prefixed, CRC-covered stream.

#![warn(missing_docs)]

pub mod archive;
pub mod composite;
pub mod data;
pub mod document;
pub mod element;
pub mod error;
pub mod hash;
pub mod ids;
pub mod math;
pub mod registry;

pub use archive::{
    from_file, from_stream, from_stream_search, to_file, to_stream, ArchiveFlags, BinaryArchive,
    Encoding, Endian, NullSink, StatusSink, CRC_INVALID, CRC_SKIP, CURRENT_VERSION,
};
pub use composite::{Class, Compositor, Enumeration, Field, FieldFlags, StoreOutcome, TypeInfo};
pub use data::{
    cast_value, CastFlags, DataKind, DataValue, ElementMap, ElementSet, ElementVec, FieldData,
    Primitive, PrimitiveData, PrimitiveKind, TypeIdElementMap,
};
pub use document::{Document, DocumentAttribute, DocumentElement, DocumentNode, Version};
pub use element::{downcast_mut_chained, downcast_ref_chained, Element, ElementPtr};
pub use error::{ChecksumFailure, ReflectError};
pub use hash::{name_hash, TypeHash};
pub use ids::{EnginePath, Guid, Tuid};
pub use registry::Registry;
