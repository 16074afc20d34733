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

//! The data-binding layer: the closed set of value shapes the archive can
//! encode, and the adapters that move them in and out of record fields.
//!
//! Every shape in [`DataKind`] is registered in the type registry under a
//! canonical data-class name, and that name's hash is what tags the value
//! on the wire. A reader therefore decodes by the *stream's* tag, then
//! reconciles with the compiled field through the cast path.

pub mod cast;
pub(crate) mod codec;
pub mod value;

pub use cast::{cast_primitive, cast_value, CastFlags};
pub use value::{
    DataValue, ElementMap, ElementSet, ElementVec, FieldData, Primitive, PrimitiveData,
    TypeIdElementMap,
};

/// The leaf value kinds: scalars, identifiers, and math aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// A boolean.
    Bool,
    /// An unsigned 8-bit integer.
    U8,
    /// A signed 8-bit integer.
    I8,
    /// An unsigned 16-bit integer.
    U16,
    /// A signed 16-bit integer.
    I16,
    /// An unsigned 32-bit integer.
    U32,
    /// A signed 32-bit integer.
    I32,
    /// An unsigned 64-bit integer.
    U64,
    /// A signed 64-bit integer.
    I64,
    /// A 32-bit float.
    F32,
    /// A 64-bit float.
    F64,
    /// A length-prefixed string.
    String,
    /// A 128-bit globally unique identifier.
    Guid,
    /// A 64-bit tool-unique identifier.
    Tuid,
    /// An engine-relative path string.
    Path,
    /// A 2-component float vector.
    Vector2,
    /// A 3-component float vector.
    Vector3,
    /// A 4-component float vector.
    Vector4,
    /// A 3x3 float matrix.
    Matrix3,
    /// A 4x4 float matrix.
    Matrix4,
    /// An 8-bit-channel RGB color.
    Color3,
    /// An 8-bit-channel RGBA color.
    Color4,
    /// An HDR RGB color.
    HdrColor3,
    /// An HDR RGBA color.
    HdrColor4,
}

impl PrimitiveKind {
    /// Every primitive kind, in registration order.
    pub const ALL: [PrimitiveKind; 24] = [
        PrimitiveKind::String,
        PrimitiveKind::Bool,
        PrimitiveKind::U8,
        PrimitiveKind::I8,
        PrimitiveKind::U16,
        PrimitiveKind::I16,
        PrimitiveKind::U32,
        PrimitiveKind::I32,
        PrimitiveKind::U64,
        PrimitiveKind::I64,
        PrimitiveKind::F32,
        PrimitiveKind::F64,
        PrimitiveKind::Guid,
        PrimitiveKind::Tuid,
        PrimitiveKind::Path,
        PrimitiveKind::Vector2,
        PrimitiveKind::Vector3,
        PrimitiveKind::Vector4,
        PrimitiveKind::Matrix3,
        PrimitiveKind::Matrix4,
        PrimitiveKind::Color3,
        PrimitiveKind::Color4,
        PrimitiveKind::HdrColor3,
        PrimitiveKind::HdrColor4,
    ];

    /// The canonical data-class name of this kind.
    #[must_use]
    pub const fn canonical_name(self) -> &'static str {
        match self {
            PrimitiveKind::Bool => "Bool",
            PrimitiveKind::U8 => "U8",
            PrimitiveKind::I8 => "I8",
            PrimitiveKind::U16 => "U16",
            PrimitiveKind::I16 => "I16",
            PrimitiveKind::U32 => "U32",
            PrimitiveKind::I32 => "I32",
            PrimitiveKind::U64 => "U64",
            PrimitiveKind::I64 => "I64",
            PrimitiveKind::F32 => "F32",
            PrimitiveKind::F64 => "F64",
            PrimitiveKind::String => "String",
            PrimitiveKind::Guid => "GUID",
            PrimitiveKind::Tuid => "TUID",
            PrimitiveKind::Path => "Path",
            PrimitiveKind::Vector2 => "Vector2",
            PrimitiveKind::Vector3 => "Vector3",
            PrimitiveKind::Vector4 => "Vector4",
            PrimitiveKind::Matrix3 => "Matrix3",
            PrimitiveKind::Matrix4 => "Matrix4",
            PrimitiveKind::Color3 => "Color3",
            PrimitiveKind::Color4 => "Color4",
            PrimitiveKind::HdrColor3 => "HDRColor3",
            PrimitiveKind::HdrColor4 => "HDRColor4",
        }
    }

    /// The canonical name of the homogeneous vector over this kind.
    #[must_use]
    pub const fn vector_name(self) -> &'static str {
        match self {
            PrimitiveKind::Bool => "BoolStlVector",
            PrimitiveKind::U8 => "U8StlVector",
            PrimitiveKind::I8 => "I8StlVector",
            PrimitiveKind::U16 => "U16StlVector",
            PrimitiveKind::I16 => "I16StlVector",
            PrimitiveKind::U32 => "U32StlVector",
            PrimitiveKind::I32 => "I32StlVector",
            PrimitiveKind::U64 => "U64StlVector",
            PrimitiveKind::I64 => "I64StlVector",
            PrimitiveKind::F32 => "F32StlVector",
            PrimitiveKind::F64 => "F64StlVector",
            PrimitiveKind::String => "StringStlVector",
            PrimitiveKind::Guid => "GUIDStlVector",
            PrimitiveKind::Tuid => "TUIDStlVector",
            PrimitiveKind::Path => "PathStlVector",
            PrimitiveKind::Vector2 => "Vector2StlVector",
            PrimitiveKind::Vector3 => "Vector3StlVector",
            PrimitiveKind::Vector4 => "Vector4StlVector",
            PrimitiveKind::Matrix3 => "Matrix3StlVector",
            PrimitiveKind::Matrix4 => "Matrix4StlVector",
            PrimitiveKind::Color3 => "Color3StlVector",
            PrimitiveKind::Color4 => "Color4StlVector",
            PrimitiveKind::HdrColor3 => "HDRColor3StlVector",
            PrimitiveKind::HdrColor4 => "HDRColor4StlVector",
        }
    }

    /// The canonical name of the set keyed by this kind, if one exists.
    ///
    /// Only hashable scalars and identifiers key sets.
    #[must_use]
    pub const fn set_name(self) -> Option<&'static str> {
        match self {
            PrimitiveKind::String => Some("StrStlSet"),
            PrimitiveKind::U32 => Some("U32StlSet"),
            PrimitiveKind::U64 => Some("U64StlSet"),
            PrimitiveKind::F32 => Some("F32StlSet"),
            PrimitiveKind::Guid => Some("GUIDStlSet"),
            PrimitiveKind::Tuid => Some("TUIDStlSet"),
            PrimitiveKind::Path => Some("PathStlSet"),
            _ => None,
        }
    }

    /// The canonical name of the record map keyed by this kind, if any.
    #[must_use]
    pub const fn element_map_name(self) -> Option<&'static str> {
        match self {
            PrimitiveKind::String => Some("StringElementStlMap"),
            PrimitiveKind::U32 => Some("U32ElementStlMap"),
            PrimitiveKind::I32 => Some("I32ElementStlMap"),
            PrimitiveKind::U64 => Some("U64ElementStlMap"),
            PrimitiveKind::I64 => Some("I64ElementStlMap"),
            PrimitiveKind::Guid => Some("GUIDElementStlMap"),
            PrimitiveKind::Tuid => Some("TUIDElementStlMap"),
            _ => None,
        }
    }
}

/// The canonical name of the map with the given key and value kinds, if
/// that combination is part of the registered catalogue.
#[must_use]
pub const fn map_name(key: PrimitiveKind, value: PrimitiveKind) -> Option<&'static str> {
    use PrimitiveKind as K;
    match (key, value) {
        (K::String, K::String) => Some("StrStrStlMap"),
        (K::String, K::Bool) => Some("StrBoolStlMap"),
        (K::String, K::U32) => Some("StrU32StlMap"),
        (K::String, K::I32) => Some("StrI32StlMap"),
        (K::U32, K::String) => Some("U32StrStlMap"),
        (K::U32, K::U32) => Some("U32U32StlMap"),
        (K::U32, K::I32) => Some("U32I32StlMap"),
        (K::U32, K::U64) => Some("U32U64StlMap"),
        (K::I32, K::String) => Some("I32StrStlMap"),
        (K::I32, K::U32) => Some("I32U32StlMap"),
        (K::I32, K::I32) => Some("I32I32StlMap"),
        (K::I32, K::U64) => Some("I32U64StlMap"),
        (K::U64, K::String) => Some("U64StrStlMap"),
        (K::U64, K::U32) => Some("U64U32StlMap"),
        (K::U64, K::U64) => Some("U64U64StlMap"),
        (K::U64, K::Matrix4) => Some("U64Matrix4StlMap"),
        (K::Guid, K::U32) => Some("GUIDU32StlMap"),
        (K::Guid, K::Matrix4) => Some("GUIDMatrix4StlMap"),
        (K::Tuid, K::U32) => Some("TUIDU32StlMap"),
        (K::Tuid, K::Matrix4) => Some("TUIDMatrix4StlMap"),
        _ => None,
    }
}

/// Every value shape the archive can encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKind {
    /// A single primitive value.
    Primitive(PrimitiveKind),
    /// An ordered homogeneous sequence of primitives.
    Vector(PrimitiveKind),
    /// An unordered unique collection of primitives.
    Set(PrimitiveKind),
    /// An associative map between primitives.
    Map(PrimitiveKind, PrimitiveKind),
    /// A type hash referencing a registered type.
    TypeId,
    /// An optional nested record.
    Pointer,
    /// An enumeration value, carried by label for rename tolerance.
    Enumeration,
    /// A bitmask, carried as the list of set flag labels.
    Bitfield,
    /// An ordered sequence of records.
    ElementVector,
    /// An unordered collection of records.
    ElementSet,
    /// A map from primitive keys to records.
    ElementMap(PrimitiveKind),
    /// A map from type hashes to records.
    TypeIdElementMap,
}

impl DataKind {
    /// The canonical data-class name of this shape, if the shape is part
    /// of the registered catalogue.
    #[must_use]
    pub const fn canonical_name(self) -> Option<&'static str> {
        match self {
            DataKind::Primitive(kind) => Some(kind.canonical_name()),
            DataKind::Vector(kind) => Some(kind.vector_name()),
            DataKind::Set(kind) => kind.set_name(),
            DataKind::Map(key, value) => map_name(key, value),
            DataKind::TypeId => Some("TypeID"),
            DataKind::Pointer => Some("Pointer"),
            DataKind::Enumeration => Some("Enumeration"),
            DataKind::Bitfield => Some("Bitfield"),
            DataKind::ElementVector => Some("ElementStlVector"),
            DataKind::ElementSet => Some("ElementStlSet"),
            DataKind::ElementMap(key) => key.element_map_name(),
            DataKind::TypeIdElementMap => Some("TypeIDElementStlMap"),
        }
    }

    /// Whether values of this shape are containers subject to empty-elision.
    #[must_use]
    pub const fn is_container(self) -> bool {
        matches!(
            self,
            DataKind::Vector(_)
                | DataKind::Set(_)
                | DataKind::Map(_, _)
                | DataKind::ElementVector
                | DataKind::ElementSet
                | DataKind::ElementMap(_)
                | DataKind::TypeIdElementMap
        )
    }

    /// Whether values of this shape carry nested records.
    #[must_use]
    pub const fn holds_elements(self) -> bool {
        matches!(
            self,
            DataKind::Pointer
                | DataKind::ElementVector
                | DataKind::ElementSet
                | DataKind::ElementMap(_)
                | DataKind::TypeIdElementMap
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_names_match_the_original_seed_list() {
        assert_eq!(PrimitiveKind::String.canonical_name(), "String");
        assert_eq!(PrimitiveKind::String.vector_name(), "StringStlVector");
        assert_eq!(PrimitiveKind::String.set_name(), Some("StrStlSet"));
        assert_eq!(
            map_name(PrimitiveKind::String, PrimitiveKind::String),
            Some("StrStrStlMap")
        );
        assert_eq!(
            map_name(PrimitiveKind::U64, PrimitiveKind::Matrix4),
            Some("U64Matrix4StlMap")
        );
        assert_eq!(
            PrimitiveKind::String.element_map_name(),
            Some("StringElementStlMap")
        );
        assert_eq!(DataKind::TypeIdElementMap.canonical_name(), Some("TypeIDElementStlMap"));
    }

    #[test]
    fn unregistered_combinations_have_no_name() {
        assert_eq!(PrimitiveKind::Matrix3.set_name(), None);
        assert_eq!(map_name(PrimitiveKind::Bool, PrimitiveKind::Bool), None);
        assert_eq!(DataKind::Set(PrimitiveKind::I8).canonical_name(), None);
    }

    #[test]
    fn container_and_element_classification() {
        assert!(DataKind::Vector(PrimitiveKind::U32).is_container());
        assert!(!DataKind::Primitive(PrimitiveKind::U32).is_container());
        assert!(!DataKind::Pointer.is_container());
        assert!(DataKind::Pointer.holds_elements());
        assert!(DataKind::ElementMap(PrimitiveKind::U64).holds_elements());
        assert!(!DataKind::Map(PrimitiveKind::U32, PrimitiveKind::U32).holds_elements());
    }
}
