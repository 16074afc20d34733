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

//! Type descriptors: classes, enumerations, and their fields.
//!
//! A [`Class`] describes one registered record type: its name hash, its
//! optional base class, and the fields declared *at its own level*. The
//! effective serialization order is the base-first concatenation along the
//! base chain, which the registry assembles.
//!
//! Field access is a small vtable captured at registration time: a `load`
//! that takes the value out of a live record and a `store` that puts one
//! back. The archive engine never touches concrete record types.

use crate::data::{DataKind, DataValue, FieldData};
use crate::element::{downcast_mut_chained, Element, ElementPtr};
use crate::hash::{name_hash, TypeHash};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

bitflags::bitflags! {
    /// Per-field behavior flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct FieldFlags: u32 {
        /// Not shown in tool UI; still serialized.
        const HIDE = 1 << 0;
        /// Never serialized.
        const DISCARD = 1 << 1;
        /// Serialized even when equal to the registered default.
        const FORCE = 1 << 2;
    }
}

/// The result of pushing a decoded value into a record field.
#[derive(Debug)]
pub enum StoreOutcome {
    /// The value landed in the field.
    Stored,
    /// The value's shape does not match the field; the caller should offer
    /// it to the record's component fallback.
    Mismatch(DataValue),
    /// The shape matched but the value was not representable (for example
    /// an enumeration label the current schema no longer defines); the
    /// value is dropped.
    Dropped,
}

type LoadFn = Box<dyn Fn(&mut dyn Element) -> Option<DataValue> + Send + Sync>;
type StoreFn = Box<dyn Fn(&mut dyn Element, DataValue) -> StoreOutcome + Send + Sync>;

/// The creator thunk a class uses to allocate fresh records.
pub type CreateFn = fn() -> ElementPtr;

/// A named, typed slot within a class.
pub struct Field {
    name: String,
    name_hash: TypeHash,
    flags: FieldFlags,
    data_kind: DataKind,
    data_class: TypeHash,
    default: Option<DataValue>,
    ui_hint: Option<String>,
    load: LoadFn,
    store: StoreFn,
}

impl Field {
    /// The field's declared name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The hash of the field name; its wire identity.
    #[must_use]
    pub fn name_hash(&self) -> TypeHash {
        self.name_hash
    }

    /// The field's behavior flags.
    #[must_use]
    pub fn flags(&self) -> FieldFlags {
        self.flags
    }

    /// The shape of this field's values.
    #[must_use]
    pub fn data_kind(&self) -> DataKind {
        self.data_kind
    }

    /// The hash of the data class that codes this field.
    #[must_use]
    pub fn data_class(&self) -> TypeHash {
        self.data_class
    }

    /// The registered default value, if one was captured.
    #[must_use]
    pub fn default(&self) -> Option<&DataValue> {
        self.default.as_ref()
    }

    /// The opaque UI hint attached by the registrar, if any.
    #[must_use]
    pub fn ui_hint(&self) -> Option<&str> {
        self.ui_hint.as_deref()
    }

    /// Takes this field's value out of a record.
    ///
    /// The slot is left defaulted; the caller is expected to [`store`]
    /// the value back once it has been encoded. `None` means the record is
    /// not an instance of the owning class.
    ///
    /// [`store`]: Field::store
    pub fn load(&self, element: &mut dyn Element) -> Option<DataValue> {
        (self.load)(element)
    }

    /// Moves a value into this field of a record.
    pub fn store(&self, element: &mut dyn Element, value: DataValue) -> StoreOutcome {
        (self.store)(element, value)
    }

    pub(crate) fn set_default(&mut self, default: Option<DataValue>) {
        self.default = default;
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("name_hash", &self.name_hash)
            .field("flags", &self.flags)
            .field("data_kind", &self.data_kind)
            .finish_non_exhaustive()
    }
}

/// Mutable view over a freshly declared field, for flags and hints.
pub struct FieldBuilder<'a> {
    field: &'a mut Field,
}

impl FieldBuilder<'_> {
    /// Replaces the field's flags.
    pub fn flags(self, flags: FieldFlags) -> Self {
        self.field.flags = flags;
        self
    }

    /// Marks the field hidden from tool UI.
    pub fn hide(self) -> Self {
        self.field.flags |= FieldFlags::HIDE;
        self
    }

    /// Excludes the field from serialization.
    pub fn discard(self) -> Self {
        self.field.flags |= FieldFlags::DISCARD;
        self
    }

    /// Serializes the field even when it equals its default.
    pub fn force(self) -> Self {
        self.field.flags |= FieldFlags::FORCE;
        self
    }

    /// Attaches an opaque UI hint, e.g. `"slider{min=0;max=1}"`.
    pub fn ui_hint(self, hint: impl Into<String>) -> Self {
        self.field.ui_hint = Some(hint.into());
        self
    }
}

/// The registrar handed to a class's registration callback.
///
/// Each call to [`field`](Compositor::field) declares one field at this
/// class's level, inferring the data class from the Rust field type.
pub struct Compositor<T: Element> {
    fields: Vec<Field>,
    _marker: PhantomData<fn(T)>,
}

impl<T: Element> Compositor<T> {
    pub(crate) fn new() -> Self {
        Self {
            fields: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Declares a field, binding it through the given accessor.
    pub fn field<D: FieldData>(
        &mut self,
        name: &str,
        accessor: fn(&mut T) -> &mut D,
    ) -> FieldBuilder<'_> {
        let load: LoadFn = Box::new(move |element: &mut dyn Element| {
            let record = downcast_mut_chained::<T>(element)?;
            Some(std::mem::take(accessor(record)).into_value())
        });
        let store: StoreFn = Box::new(move |element: &mut dyn Element, value: DataValue| {
            if value.kind() != D::data_kind() {
                return StoreOutcome::Mismatch(value);
            }
            let Some(record) = downcast_mut_chained::<T>(element) else {
                return StoreOutcome::Mismatch(value);
            };
            match D::from_value(value) {
                Some(converted) => {
                    *accessor(record) = converted;
                    StoreOutcome::Stored
                }
                None => StoreOutcome::Dropped,
            }
        });

        let data_kind = D::data_kind();
        let data_class = data_kind
            .canonical_name()
            .map(name_hash)
            .unwrap_or_default();
        let index = self.fields.len();
        self.fields.push(Field {
            name: name.to_string(),
            name_hash: name_hash(name),
            flags: FieldFlags::empty(),
            data_kind,
            data_class,
            default: None,
            ui_hint: None,
            load,
            store,
        });
        FieldBuilder {
            field: &mut self.fields[index],
        }
    }

    pub(crate) fn into_fields(self) -> Vec<Field> {
        self.fields
    }
}

/// A reflected record type.
pub struct Class {
    name: String,
    hash: TypeHash,
    base: Option<TypeHash>,
    fields: Vec<Field>,
    field_lookup: HashMap<TypeHash, usize>,
    creator: Option<CreateFn>,
    data_kind: Option<DataKind>,
}

impl Class {
    pub(crate) fn new(
        name: String,
        base: Option<TypeHash>,
        fields: Vec<Field>,
        creator: Option<CreateFn>,
        data_kind: Option<DataKind>,
    ) -> Self {
        let hash = name_hash(&name);
        let field_lookup = fields
            .iter()
            .enumerate()
            .map(|(index, field)| (field.name_hash(), index))
            .collect();
        Self {
            name,
            hash,
            base,
            fields,
            field_lookup,
            creator,
            data_kind,
        }
    }

    /// The canonical name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The hash of the canonical name; the wire identity.
    #[must_use]
    pub fn hash(&self) -> TypeHash {
        self.hash
    }

    /// The base class hash, if this class derives from another.
    #[must_use]
    pub fn base(&self) -> Option<TypeHash> {
        self.base
    }

    /// The fields declared at this level, in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// O(1) lookup of a field declared at this level by name hash.
    #[must_use]
    pub fn find_field_by_name_hash(&self, hash: TypeHash) -> Option<&Field> {
        self.field_lookup.get(&hash).map(|&index| &self.fields[index])
    }

    /// The creator thunk, if this class is instantiable.
    #[must_use]
    pub fn creator(&self) -> Option<CreateFn> {
        self.creator
    }

    /// The data shape, when this class is a data class rather than a
    /// record class.
    #[must_use]
    pub fn data_kind(&self) -> Option<DataKind> {
        self.data_kind
    }

    pub(crate) fn fields_mut(&mut self) -> &mut [Field] {
        &mut self.fields
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.name)
            .field("hash", &self.hash)
            .field("base", &self.base)
            .field("fields", &self.fields.len())
            .field("data_kind", &self.data_kind)
            .finish()
    }
}

/// A reflected enumeration: ordered label/value pairs.
#[derive(Debug)]
pub struct Enumeration {
    name: String,
    hash: TypeHash,
    values: Vec<(String, u32)>,
}

impl Enumeration {
    pub(crate) fn new(name: String, values: Vec<(&'static str, u32)>) -> Self {
        let hash = name_hash(&name);
        Self {
            name,
            hash,
            values: values
                .into_iter()
                .map(|(label, value)| (label.to_string(), value))
                .collect(),
        }
    }

    /// The canonical name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The hash of the canonical name.
    #[must_use]
    pub fn hash(&self) -> TypeHash {
        self.hash
    }

    /// The label/value pairs in declaration order.
    #[must_use]
    pub fn values(&self) -> &[(String, u32)] {
        &self.values
    }

    /// Resolves a label to its numeric value.
    #[must_use]
    pub fn value_of(&self, label: &str) -> Option<u32> {
        self.values
            .iter()
            .find(|(candidate, _)| candidate == label)
            .map(|(_, value)| *value)
    }

    /// Resolves a numeric value back to its label.
    #[must_use]
    pub fn label_of(&self, value: u32) -> Option<&str> {
        self.values
            .iter()
            .find(|(_, candidate)| *candidate == value)
            .map(|(label, _)| label.as_str())
    }
}

/// A registered type: class or enumeration.
#[derive(Debug)]
pub enum TypeInfo {
    /// A record or data class.
    Class(Class),
    /// A label/value enumeration.
    Enumeration(Enumeration),
}

impl TypeInfo {
    /// The canonical name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            TypeInfo::Class(class) => class.name(),
            TypeInfo::Enumeration(enumeration) => enumeration.name(),
        }
    }

    /// The hash of the canonical name.
    #[must_use]
    pub fn hash(&self) -> TypeHash {
        match self {
            TypeInfo::Class(class) => class.hash(),
            TypeInfo::Enumeration(enumeration) => enumeration.hash(),
        }
    }

    /// This type as a class, if it is one.
    #[must_use]
    pub fn as_class(&self) -> Option<&Class> {
        match self {
            TypeInfo::Class(class) => Some(class),
            TypeInfo::Enumeration(_) => None,
        }
    }

    /// This type as an enumeration, if it is one.
    #[must_use]
    pub fn as_enumeration(&self) -> Option<&Enumeration> {
        match self {
            TypeInfo::Enumeration(enumeration) => Some(enumeration),
            TypeInfo::Class(_) => None,
        }
    }
}
