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

//! Runtime data values and the field-binding trait.
//!
//! A [`DataValue`] is a data object: standalone when it was decoded from a
//! stream, connected for the duration of one load/store through a field
//! accessor. [`FieldData`] is the compile-time side of the same contract:
//! it maps a concrete Rust field type onto its [`DataKind`] and converts
//! between the field and the runtime value.

use crate::data::{DataKind, PrimitiveKind};
use crate::element::ElementPtr;
use crate::hash::TypeHash;
use crate::ids::{EnginePath, Guid, Tuid};
use crate::math::{
    Color3, Color4, HdrColor3, HdrColor4, Matrix3, Matrix4, Vector2, Vector3, Vector4,
};
use std::collections::{BTreeMap, BTreeSet};

/// A single leaf value.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// A boolean.
    Bool(bool),
    /// An unsigned 8-bit integer.
    U8(u8),
    /// A signed 8-bit integer.
    I8(i8),
    /// An unsigned 16-bit integer.
    U16(u16),
    /// A signed 16-bit integer.
    I16(i16),
    /// An unsigned 32-bit integer.
    U32(u32),
    /// A signed 32-bit integer.
    I32(i32),
    /// An unsigned 64-bit integer.
    U64(u64),
    /// A signed 64-bit integer.
    I64(i64),
    /// A 32-bit float.
    F32(f32),
    /// A 64-bit float.
    F64(f64),
    /// A string.
    String(String),
    /// A 128-bit identifier.
    Guid(Guid),
    /// A 64-bit identifier.
    Tuid(Tuid),
    /// An engine path.
    Path(EnginePath),
    /// A 2-component vector.
    Vector2(Vector2),
    /// A 3-component vector.
    Vector3(Vector3),
    /// A 4-component vector.
    Vector4(Vector4),
    /// A 3x3 matrix.
    Matrix3(Matrix3),
    /// A 4x4 matrix.
    Matrix4(Matrix4),
    /// An RGB color.
    Color3(Color3),
    /// An RGBA color.
    Color4(Color4),
    /// An HDR RGB color.
    HdrColor3(HdrColor3),
    /// An HDR RGBA color.
    HdrColor4(HdrColor4),
}

impl Primitive {
    /// The kind of this value.
    #[must_use]
    pub const fn kind(&self) -> PrimitiveKind {
        match self {
            Primitive::Bool(_) => PrimitiveKind::Bool,
            Primitive::U8(_) => PrimitiveKind::U8,
            Primitive::I8(_) => PrimitiveKind::I8,
            Primitive::U16(_) => PrimitiveKind::U16,
            Primitive::I16(_) => PrimitiveKind::I16,
            Primitive::U32(_) => PrimitiveKind::U32,
            Primitive::I32(_) => PrimitiveKind::I32,
            Primitive::U64(_) => PrimitiveKind::U64,
            Primitive::I64(_) => PrimitiveKind::I64,
            Primitive::F32(_) => PrimitiveKind::F32,
            Primitive::F64(_) => PrimitiveKind::F64,
            Primitive::String(_) => PrimitiveKind::String,
            Primitive::Guid(_) => PrimitiveKind::Guid,
            Primitive::Tuid(_) => PrimitiveKind::Tuid,
            Primitive::Path(_) => PrimitiveKind::Path,
            Primitive::Vector2(_) => PrimitiveKind::Vector2,
            Primitive::Vector3(_) => PrimitiveKind::Vector3,
            Primitive::Vector4(_) => PrimitiveKind::Vector4,
            Primitive::Matrix3(_) => PrimitiveKind::Matrix3,
            Primitive::Matrix4(_) => PrimitiveKind::Matrix4,
            Primitive::Color3(_) => PrimitiveKind::Color3,
            Primitive::Color4(_) => PrimitiveKind::Color4,
            Primitive::HdrColor3(_) => PrimitiveKind::HdrColor3,
            Primitive::HdrColor4(_) => PrimitiveKind::HdrColor4,
        }
    }
}

/// A runtime data object: one value in any of the shapes the archive can
/// encode.
///
/// Equality is field-value equality for primitive-bearing shapes. Shapes
/// that carry nested records compare equal only when both sides are empty;
/// a populated record graph has no cheap identity, and default-elision only
/// ever needs the empty comparison.
#[derive(Debug)]
pub enum DataValue {
    /// A single primitive.
    Primitive(Primitive),
    /// An ordered homogeneous sequence.
    Vector(PrimitiveKind, Vec<Primitive>),
    /// An unordered unique collection.
    Set(PrimitiveKind, Vec<Primitive>),
    /// An associative primitive map, in key order.
    Map(PrimitiveKind, PrimitiveKind, Vec<(Primitive, Primitive)>),
    /// A type hash.
    TypeId(TypeHash),
    /// An optional nested record.
    Pointer(Option<ElementPtr>),
    /// An enumeration label.
    Enumeration(String),
    /// The labels of the set bits of a bitmask.
    Bitfield(Vec<String>),
    /// An ordered sequence of records.
    ElementVector(Vec<ElementPtr>),
    /// An unordered collection of records.
    ElementSet(Vec<ElementPtr>),
    /// A primitive-keyed record map, in key order.
    ElementMap(PrimitiveKind, Vec<(Primitive, ElementPtr)>),
    /// A type-hash-keyed record map, in key order.
    TypeIdElementMap(Vec<(TypeHash, ElementPtr)>),
}

impl DataValue {
    /// The shape of this value.
    #[must_use]
    pub fn kind(&self) -> DataKind {
        match self {
            DataValue::Primitive(p) => DataKind::Primitive(p.kind()),
            DataValue::Vector(kind, _) => DataKind::Vector(*kind),
            DataValue::Set(kind, _) => DataKind::Set(*kind),
            DataValue::Map(key, value, _) => DataKind::Map(*key, *value),
            DataValue::TypeId(_) => DataKind::TypeId,
            DataValue::Pointer(_) => DataKind::Pointer,
            DataValue::Enumeration(_) => DataKind::Enumeration,
            DataValue::Bitfield(_) => DataKind::Bitfield,
            DataValue::ElementVector(_) => DataKind::ElementVector,
            DataValue::ElementSet(_) => DataKind::ElementSet,
            DataValue::ElementMap(key, _) => DataKind::ElementMap(*key),
            DataValue::TypeIdElementMap(_) => DataKind::TypeIdElementMap,
        }
    }

    /// `true` for a container shape with no entries.
    #[must_use]
    pub fn is_empty_container(&self) -> bool {
        match self {
            DataValue::Vector(_, items) | DataValue::Set(_, items) => items.is_empty(),
            DataValue::Map(_, _, entries) => entries.is_empty(),
            DataValue::ElementVector(items) | DataValue::ElementSet(items) => items.is_empty(),
            DataValue::ElementMap(_, entries) => entries.is_empty(),
            DataValue::TypeIdElementMap(entries) => entries.is_empty(),
            _ => false,
        }
    }

    /// Clones the value without cloning nested records.
    ///
    /// Returns `None` when the value holds live records, which cannot be
    /// duplicated; empty record containers and vacant pointers clone fine.
    /// Default snapshots use this, so a populated record container simply
    /// registers no default.
    #[must_use]
    pub fn shallow_clone(&self) -> Option<DataValue> {
        match self {
            DataValue::Primitive(p) => Some(DataValue::Primitive(p.clone())),
            DataValue::Vector(kind, items) => Some(DataValue::Vector(*kind, items.clone())),
            DataValue::Set(kind, items) => Some(DataValue::Set(*kind, items.clone())),
            DataValue::Map(key, value, entries) => {
                Some(DataValue::Map(*key, *value, entries.clone()))
            }
            DataValue::TypeId(hash) => Some(DataValue::TypeId(*hash)),
            DataValue::Pointer(None) => Some(DataValue::Pointer(None)),
            DataValue::Enumeration(label) => Some(DataValue::Enumeration(label.clone())),
            DataValue::Bitfield(labels) => Some(DataValue::Bitfield(labels.clone())),
            DataValue::ElementVector(items) if items.is_empty() => {
                Some(DataValue::ElementVector(Vec::new()))
            }
            DataValue::ElementSet(items) if items.is_empty() => {
                Some(DataValue::ElementSet(Vec::new()))
            }
            DataValue::ElementMap(key, entries) if entries.is_empty() => {
                Some(DataValue::ElementMap(*key, Vec::new()))
            }
            DataValue::TypeIdElementMap(entries) if entries.is_empty() => {
                Some(DataValue::TypeIdElementMap(Vec::new()))
            }
            _ => None,
        }
    }
}

impl PartialEq for DataValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (DataValue::Primitive(a), DataValue::Primitive(b)) => a == b,
            (DataValue::Vector(ka, a), DataValue::Vector(kb, b)) => ka == kb && a == b,
            (DataValue::Set(ka, a), DataValue::Set(kb, b)) => ka == kb && a == b,
            (DataValue::Map(ka, va, a), DataValue::Map(kb, vb, b)) => {
                ka == kb && va == vb && a == b
            }
            (DataValue::TypeId(a), DataValue::TypeId(b)) => a == b,
            (DataValue::Pointer(a), DataValue::Pointer(b)) => a.is_none() && b.is_none(),
            (DataValue::Enumeration(a), DataValue::Enumeration(b)) => a == b,
            (DataValue::Bitfield(a), DataValue::Bitfield(b)) => a == b,
            (DataValue::ElementVector(a), DataValue::ElementVector(b))
            | (DataValue::ElementSet(a), DataValue::ElementSet(b)) => {
                a.is_empty() && b.is_empty()
            }
            (DataValue::ElementMap(ka, a), DataValue::ElementMap(kb, b)) => {
                ka == kb && a.is_empty() && b.is_empty()
            }
            (DataValue::TypeIdElementMap(a), DataValue::TypeIdElementMap(b)) => {
                a.is_empty() && b.is_empty()
            }
            _ => false,
        }
    }
}

/// A Rust type usable as a leaf inside vectors, sets, and maps.
pub trait PrimitiveData: Default + Clone + Sized + 'static {
    /// The kind this type binds to.
    const KIND: PrimitiveKind;

    /// Converts into the runtime leaf value.
    fn into_primitive(self) -> Primitive;

    /// Converts back from the runtime leaf value.
    fn from_primitive(primitive: Primitive) -> Option<Self>;
}

/// A Rust type usable as a reflected record field.
///
/// Moving rather than borrowing is deliberate: the archive takes the value
/// out of the record for the duration of one encode and puts it back after,
/// which is what lets record containers serialize without cloning records.
pub trait FieldData: Default + Sized + 'static {
    /// The shape this field binds to.
    fn data_kind() -> DataKind;

    /// Moves the field value into a runtime data object.
    fn into_value(self) -> DataValue;

    /// Moves a runtime data object back into a field value. `None` when
    /// the shape does not match.
    fn from_value(value: DataValue) -> Option<Self>;
}

macro_rules! impl_primitive_data {
    ($rust:ty, $variant:ident) => {
        impl PrimitiveData for $rust {
            const KIND: PrimitiveKind = PrimitiveKind::$variant;

            fn into_primitive(self) -> Primitive {
                Primitive::$variant(self)
            }

            fn from_primitive(primitive: Primitive) -> Option<Self> {
                match primitive {
                    Primitive::$variant(value) => Some(value),
                    _ => None,
                }
            }
        }

        impl FieldData for $rust {
            fn data_kind() -> DataKind {
                DataKind::Primitive(PrimitiveKind::$variant)
            }

            fn into_value(self) -> DataValue {
                DataValue::Primitive(self.into_primitive())
            }

            fn from_value(value: DataValue) -> Option<Self> {
                match value {
                    DataValue::Primitive(primitive) => Self::from_primitive(primitive),
                    _ => None,
                }
            }
        }
    };
}

impl_primitive_data!(bool, Bool);
impl_primitive_data!(u8, U8);
impl_primitive_data!(i8, I8);
impl_primitive_data!(u16, U16);
impl_primitive_data!(i16, I16);
impl_primitive_data!(u32, U32);
impl_primitive_data!(i32, I32);
impl_primitive_data!(u64, U64);
impl_primitive_data!(i64, I64);
impl_primitive_data!(f32, F32);
impl_primitive_data!(f64, F64);
impl_primitive_data!(String, String);
impl_primitive_data!(Guid, Guid);
impl_primitive_data!(Tuid, Tuid);
impl_primitive_data!(EnginePath, Path);
impl_primitive_data!(Vector2, Vector2);
impl_primitive_data!(Vector3, Vector3);
impl_primitive_data!(Vector4, Vector4);
impl_primitive_data!(Matrix3, Matrix3);
impl_primitive_data!(Matrix4, Matrix4);
impl_primitive_data!(Color3, Color3);
impl_primitive_data!(Color4, Color4);
impl_primitive_data!(HdrColor3, HdrColor3);
impl_primitive_data!(HdrColor4, HdrColor4);

impl<T: PrimitiveData> FieldData for Vec<T> {
    fn data_kind() -> DataKind {
        DataKind::Vector(T::KIND)
    }

    fn into_value(self) -> DataValue {
        DataValue::Vector(
            T::KIND,
            self.into_iter().map(PrimitiveData::into_primitive).collect(),
        )
    }

    fn from_value(value: DataValue) -> Option<Self> {
        match value {
            DataValue::Vector(kind, items) if kind == T::KIND => {
                items.into_iter().map(T::from_primitive).collect()
            }
            _ => None,
        }
    }
}

impl<T: PrimitiveData + Ord> FieldData for BTreeSet<T> {
    fn data_kind() -> DataKind {
        DataKind::Set(T::KIND)
    }

    fn into_value(self) -> DataValue {
        DataValue::Set(
            T::KIND,
            self.into_iter().map(PrimitiveData::into_primitive).collect(),
        )
    }

    fn from_value(value: DataValue) -> Option<Self> {
        match value {
            DataValue::Set(kind, items) if kind == T::KIND => {
                items.into_iter().map(T::from_primitive).collect()
            }
            _ => None,
        }
    }
}

impl<K: PrimitiveData + Ord, V: PrimitiveData> FieldData for BTreeMap<K, V> {
    fn data_kind() -> DataKind {
        DataKind::Map(K::KIND, V::KIND)
    }

    fn into_value(self) -> DataValue {
        DataValue::Map(
            K::KIND,
            V::KIND,
            self.into_iter()
                .map(|(key, value)| (key.into_primitive(), value.into_primitive()))
                .collect(),
        )
    }

    fn from_value(value: DataValue) -> Option<Self> {
        match value {
            DataValue::Map(key_kind, value_kind, entries)
                if key_kind == K::KIND && value_kind == V::KIND =>
            {
                entries
                    .into_iter()
                    .map(|(key, value)| {
                        Some((K::from_primitive(key)?, V::from_primitive(value)?))
                    })
                    .collect()
            }
            _ => None,
        }
    }
}

impl FieldData for TypeHash {
    fn data_kind() -> DataKind {
        DataKind::TypeId
    }

    fn into_value(self) -> DataValue {
        DataValue::TypeId(self)
    }

    fn from_value(value: DataValue) -> Option<Self> {
        match value {
            DataValue::TypeId(hash) => Some(hash),
            _ => None,
        }
    }
}

impl FieldData for Option<ElementPtr> {
    fn data_kind() -> DataKind {
        DataKind::Pointer
    }

    fn into_value(self) -> DataValue {
        DataValue::Pointer(self)
    }

    fn from_value(value: DataValue) -> Option<Self> {
        match value {
            DataValue::Pointer(element) => Some(element),
            _ => None,
        }
    }
}

/// An ordered sequence of owned records.
#[derive(Debug, Default)]
pub struct ElementVec(pub Vec<ElementPtr>);

/// An unordered collection of owned records.
///
/// Uniqueness is a wire-format property of the class, not something the
/// in-memory collection can check over type-erased records.
#[derive(Debug, Default)]
pub struct ElementSet(pub Vec<ElementPtr>);

/// A map from primitive keys to owned records.
#[derive(Debug)]
pub struct ElementMap<K: PrimitiveData + Ord>(pub BTreeMap<K, ElementPtr>);

/// A map from type hashes to owned records.
#[derive(Debug, Default)]
pub struct TypeIdElementMap(pub BTreeMap<TypeHash, ElementPtr>);

impl<K: PrimitiveData + Ord> Default for ElementMap<K> {
    fn default() -> Self {
        Self(BTreeMap::new())
    }
}

impl FieldData for ElementVec {
    fn data_kind() -> DataKind {
        DataKind::ElementVector
    }

    fn into_value(self) -> DataValue {
        DataValue::ElementVector(self.0)
    }

    fn from_value(value: DataValue) -> Option<Self> {
        match value {
            DataValue::ElementVector(items) => Some(Self(items)),
            _ => None,
        }
    }
}

impl FieldData for ElementSet {
    fn data_kind() -> DataKind {
        DataKind::ElementSet
    }

    fn into_value(self) -> DataValue {
        DataValue::ElementSet(self.0)
    }

    fn from_value(value: DataValue) -> Option<Self> {
        match value {
            DataValue::ElementSet(items) => Some(Self(items)),
            _ => None,
        }
    }
}

impl<K: PrimitiveData + Ord> FieldData for ElementMap<K> {
    fn data_kind() -> DataKind {
        DataKind::ElementMap(K::KIND)
    }

    fn into_value(self) -> DataValue {
        DataValue::ElementMap(
            K::KIND,
            self.0
                .into_iter()
                .map(|(key, element)| (key.into_primitive(), element))
                .collect(),
        )
    }

    fn from_value(value: DataValue) -> Option<Self> {
        match value {
            DataValue::ElementMap(kind, entries) if kind == K::KIND => entries
                .into_iter()
                .map(|(key, element)| Some((K::from_primitive(key)?, element)))
                .collect::<Option<BTreeMap<_, _>>>()
                .map(Self),
            _ => None,
        }
    }
}

impl FieldData for TypeIdElementMap {
    fn data_kind() -> DataKind {
        DataKind::TypeIdElementMap
    }

    fn into_value(self) -> DataValue {
        DataValue::TypeIdElementMap(self.0.into_iter().collect())
    }

    fn from_value(value: DataValue) -> Option<Self> {
        match value {
            DataValue::TypeIdElementMap(entries) => {
                Some(Self(entries.into_iter().collect()))
            }
            _ => None,
        }
    }
}

/// Declares a reflected enumeration.
///
/// Expands to the enum itself (first variant is the default) plus the
/// [`FieldData`] binding that serializes it by label, and a
/// `reflect_values` table for registering the enumeration descriptor.
///
/// ```
/// use kiln_reflect::reflect_enumeration;
///
/// reflect_enumeration! {
///     /// How normals are derived for a mesh.
///     pub enum ShadingMode {
///         Flat = 0,
///         Smooth = 1,
///     }
/// }
///
/// assert_eq!(ShadingMode::default(), ShadingMode::Flat);
/// assert_eq!(ShadingMode::Smooth.label(), "Smooth");
/// ```
#[macro_export]
macro_rules! reflect_enumeration {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $first:ident = $first_value:expr
            $(, $rest:ident = $rest_value:expr)* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        $vis enum $name {
            #[default]
            #[allow(missing_docs)]
            $first = $first_value,
            $(
                #[allow(missing_docs)]
                $rest = $rest_value,
            )*
        }

        impl $name {
            /// The label this variant serializes as.
            $vis fn label(&self) -> &'static str {
                match self {
                    Self::$first => stringify!($first),
                    $(Self::$rest => stringify!($rest),)*
                }
            }

            /// The label/value table for registering this enumeration.
            $vis fn reflect_values() -> Vec<(&'static str, u32)> {
                vec![
                    (stringify!($first), $first_value),
                    $((stringify!($rest), $rest_value),)*
                ]
            }

            /// Resolves a serialized label back to a variant.
            $vis fn from_label(label: &str) -> Option<Self> {
                match label {
                    stringify!($first) => Some(Self::$first),
                    $(stringify!($rest) => Some(Self::$rest),)*
                    _ => None,
                }
            }
        }

        impl $crate::FieldData for $name {
            fn data_kind() -> $crate::DataKind {
                $crate::DataKind::Enumeration
            }

            fn into_value(self) -> $crate::DataValue {
                $crate::DataValue::Enumeration(self.label().to_string())
            }

            fn from_value(value: $crate::DataValue) -> Option<Self> {
                match value {
                    $crate::DataValue::Enumeration(label) => Self::from_label(&label),
                    _ => None,
                }
            }
        }
    };
}

/// Binds an existing `bitflags!` type as a reflected bitfield.
///
/// The mask serializes as the list of set flag labels, so reordering or
/// renumbering flags does not invalidate existing archives. Unknown labels
/// read back from older content are dropped.
#[macro_export]
macro_rules! reflect_bitfield {
    ($name:ty) => {
        impl $crate::FieldData for $name {
            fn data_kind() -> $crate::DataKind {
                $crate::DataKind::Bitfield
            }

            fn into_value(self) -> $crate::DataValue {
                $crate::DataValue::Bitfield(
                    self.iter_names().map(|(label, _)| label.to_string()).collect(),
                )
            }

            fn from_value(value: $crate::DataValue) -> Option<Self> {
                match value {
                    $crate::DataValue::Bitfield(labels) => {
                        let mut flags = <$name>::empty();
                        for label in &labels {
                            if let Some(flag) = <$name>::from_name(label) {
                                flags |= flag;
                            }
                        }
                        Some(flags)
                    }
                    _ => None,
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_round_trips_through_field_data() {
        let value = 42u32.into_value();
        assert_eq!(value.kind(), DataKind::Primitive(PrimitiveKind::U32));
        assert_eq!(u32::from_value(value), Some(42));
        assert_eq!(u32::from_value(DataValue::Primitive(Primitive::I32(1))), None);
    }

    #[test]
    fn vector_round_trips_and_checks_element_kind() {
        let value = vec![1u16, 2, 3].into_value();
        assert_eq!(Vec::<u16>::from_value(value), Some(vec![1, 2, 3]));

        let wrong = DataValue::Vector(PrimitiveKind::U8, vec![Primitive::U8(1)]);
        assert_eq!(Vec::<u16>::from_value(wrong), None);
    }

    #[test]
    fn map_round_trips_in_key_order() {
        let mut map = BTreeMap::new();
        map.insert("b".to_string(), 2u32);
        map.insert("a".to_string(), 1u32);

        let value = map.clone().into_value();
        match &value {
            DataValue::Map(_, _, entries) => {
                assert_eq!(entries[0].0, Primitive::String("a".to_string()));
            }
            other => panic!("expected a map value, got {other:?}"),
        }
        assert_eq!(BTreeMap::<String, u32>::from_value(value), Some(map));
    }

    #[test]
    fn empty_container_detection() {
        assert!(Vec::<u32>::new().into_value().is_empty_container());
        assert!(!vec![1u32].into_value().is_empty_container());
        assert!(!5u32.into_value().is_empty_container());
        assert!(ElementVec::default().into_value().is_empty_container());
    }

    #[test]
    fn shallow_clone_refuses_populated_record_containers() {
        #[derive(Default)]
        struct Probe;
        crate::impl_element!(Probe, "ShallowCloneProbe");

        let empty = DataValue::ElementVector(Vec::new());
        assert!(empty.shallow_clone().is_some());

        let populated = DataValue::ElementVector(vec![Box::new(Probe)]);
        assert!(populated.shallow_clone().is_none());
        assert!(DataValue::Pointer(None).shallow_clone().is_some());
    }

    #[test]
    fn populated_element_values_never_compare_equal() {
        #[derive(Default)]
        struct Probe;
        crate::impl_element!(Probe, "ElementEqProbe");

        let a = DataValue::ElementVector(vec![Box::new(Probe)]);
        let b = DataValue::ElementVector(vec![Box::new(Probe)]);
        assert_ne!(a, b);
        assert_eq!(
            DataValue::ElementVector(Vec::new()),
            DataValue::ElementVector(Vec::new())
        );
    }

    reflect_enumeration! {
        /// Exercise enum for the macro.
        pub enum Winding {
            Clockwise = 0,
            CounterClockwise = 1,
        }
    }

    #[test]
    fn enumeration_serializes_by_label() {
        assert_eq!(Winding::default(), Winding::Clockwise);
        let value = Winding::CounterClockwise.into_value();
        assert_eq!(
            value,
            DataValue::Enumeration("CounterClockwise".to_string())
        );
        assert_eq!(Winding::from_value(value), Some(Winding::CounterClockwise));
        assert_eq!(
            Winding::from_value(DataValue::Enumeration("Sideways".to_string())),
            None
        );
        assert_eq!(Winding::reflect_values().len(), 2);
    }

    bitflags::bitflags! {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        struct ProbeFlags: u32 {
            const ALPHA = 1 << 0;
            const BETA = 1 << 1;
        }
    }
    reflect_bitfield!(ProbeFlags);

    #[test]
    fn bitfield_serializes_as_labels_and_drops_unknown() {
        let value = (ProbeFlags::ALPHA | ProbeFlags::BETA).into_value();
        assert_eq!(
            value,
            DataValue::Bitfield(vec!["ALPHA".to_string(), "BETA".to_string()])
        );

        let read = ProbeFlags::from_value(DataValue::Bitfield(vec![
            "BETA".to_string(),
            "RETIRED".to_string(),
        ]));
        assert_eq!(read, Some(ProbeFlags::BETA));
    }
}
