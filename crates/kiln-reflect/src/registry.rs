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

//! The process catalogue of reflected types.
//!
//! The [`Registry`] owns every type descriptor and resolves the hashes an
//! archive carries back to live classes. It is an explicit object the host
//! passes around, not a hidden global; `&mut self` on every mutator and
//! `&self` on every lookup gives the single-writer/many-reader discipline
//! at compile time. Readers on other threads simply share `&Registry`.
//!
//! `new()` seeds the full built-in catalogue: the record bases, every data
//! class, and the stock record types ([`Version`](crate::document::Version)
//! and the document family).

use crate::composite::{Class, Compositor, Enumeration, Field, TypeInfo};
use crate::data::{DataKind, DataValue, PrimitiveKind};
use crate::element::{Element, ElementPtr};
use crate::error::ReflectError;
use crate::hash::{name_hash, TypeHash};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// The process-wide catalogue of type descriptors, keyed by name hash.
pub struct Registry {
    types_by_hash: HashMap<TypeHash, Arc<TypeInfo>>,
}

impl Registry {
    /// Creates a registry seeded with the built-in catalogue.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self {
            types_by_hash: HashMap::new(),
        };
        registry.seed_builtins();
        crate::document::register_document_types(&mut registry);
        registry
    }

    /// Registers a record class.
    ///
    /// The registrar callback declares the class's own fields; inherited
    /// fields stay on the base class. A default-constructed instance is
    /// snapshotted to capture per-field defaults, which drive
    /// default-elision on write.
    pub fn register_class<T: Element + Default>(
        &mut self,
        name: &'static str,
        base: Option<&str>,
        build: impl FnOnce(&mut Compositor<T>),
    ) -> Result<(), ReflectError> {
        let base_hash = match base {
            Some(base_name) => {
                let hash = name_hash(base_name);
                if self.get_class(hash).is_none() {
                    return Err(ReflectError::Logic(format!(
                        "base class '{base_name}' of '{name}' is not registered"
                    )));
                }
                Some(hash)
            }
            None => None,
        };

        let mut compositor = Compositor::<T>::new();
        build(&mut compositor);
        let fields = compositor.into_fields();

        for field in &fields {
            if field.data_kind().canonical_name().is_none() {
                return Err(ReflectError::Logic(format!(
                    "field '{}' of '{name}' uses a data shape with no registered data class",
                    field.name()
                )));
            }
        }

        let creator = || -> ElementPtr { Box::new(T::default()) };
        let probe: ElementPtr = creator();
        if probe.class_name() != name {
            return Err(ReflectError::Logic(format!(
                "instances of '{name}' report class name '{}'",
                probe.class_name()
            )));
        }

        let mut class = Class::new(name.to_string(), base_hash, fields, Some(creator), None);
        let mut default_instance = creator();
        for field in class.fields_mut() {
            let default = field.load(default_instance.as_mut());
            field.set_default(default);
        }

        self.insert_type(TypeInfo::Class(class))
    }

    /// Registers an enumeration descriptor.
    pub fn register_enumeration(
        &mut self,
        name: &str,
        values: Vec<(&'static str, u32)>,
    ) -> Result<(), ReflectError> {
        self.insert_type(TypeInfo::Enumeration(Enumeration::new(
            name.to_string(),
            values,
        )))
    }

    /// Adds an additional hash entry pointing at an existing type, so
    /// archives written under the old name keep resolving.
    pub fn alias_type(&mut self, existing: &str, alias: &str) -> Result<(), ReflectError> {
        let Some(info) = self.types_by_hash.get(&name_hash(existing)).cloned() else {
            return Err(ReflectError::Logic(format!(
                "cannot alias unregistered type '{existing}'"
            )));
        };
        let alias_hash = name_hash(alias);
        if self.types_by_hash.contains_key(&alias_hash) {
            return Err(ReflectError::Logic(format!(
                "alias '{alias}' collides with a registered type"
            )));
        }
        self.types_by_hash.insert(alias_hash, info);
        Ok(())
    }

    /// Removes an alias, but only if it still points at the named type.
    pub fn unalias_type(&mut self, existing: &str, alias: &str) {
        let alias_hash = name_hash(alias);
        if let Some(info) = self.types_by_hash.get(&alias_hash) {
            if info.name() == existing {
                self.types_by_hash.remove(&alias_hash);
            }
        }
    }

    /// Looks up a type by hash.
    #[must_use]
    pub fn get_type(&self, hash: TypeHash) -> Option<&TypeInfo> {
        self.types_by_hash.get(&hash).map(Arc::as_ref)
    }

    /// Looks up a class by hash.
    #[must_use]
    pub fn get_class(&self, hash: TypeHash) -> Option<&Class> {
        self.get_type(hash).and_then(TypeInfo::as_class)
    }

    /// Looks up an enumeration by hash.
    #[must_use]
    pub fn get_enumeration(&self, hash: TypeHash) -> Option<&Enumeration> {
        self.get_type(hash).and_then(TypeInfo::as_enumeration)
    }

    /// Looks up a type by canonical name.
    #[must_use]
    pub fn find_type(&self, name: &str) -> Option<&TypeInfo> {
        self.get_type(name_hash(name))
    }

    /// Creates a fresh record of the class with the given hash.
    ///
    /// `None` when the hash is unknown, names a non-class, or the class
    /// has no creator (abstract bases).
    #[must_use]
    pub fn create_instance(&self, hash: TypeHash) -> Option<ElementPtr> {
        self.get_class(hash).and_then(|class| self.create_instance_of(class))
    }

    /// Creates a fresh record of the given class.
    #[must_use]
    pub fn create_instance_of(&self, class: &Class) -> Option<ElementPtr> {
        class.creator().map(|create| create())
    }

    /// Whether `class_hash` is, or derives from, `target_hash`.
    #[must_use]
    pub fn has_type(&self, class_hash: TypeHash, target_hash: TypeHash) -> bool {
        let mut visited = HashSet::new();
        let mut cursor = Some(class_hash);
        while let Some(hash) = cursor {
            if hash == target_hash {
                return true;
            }
            if !visited.insert(hash) {
                break;
            }
            cursor = self.get_class(hash).and_then(Class::base);
        }
        false
    }

    /// The base-first chain of classes ending at `class`.
    ///
    /// This is the effective field-declaration order for serialization.
    #[must_use]
    pub fn class_chain(&self, class: &Class) -> Vec<&Class> {
        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        let mut cursor = Some(class.hash());
        while let Some(hash) = cursor {
            if !visited.insert(hash) {
                break;
            }
            let Some(current) = self.get_class(hash) else {
                break;
            };
            chain.push(current);
            cursor = current.base();
        }
        chain.reverse();
        chain
    }

    /// Finds a field anywhere along `class`'s base chain by name hash.
    #[must_use]
    pub fn find_field<'a>(&'a self, class: &'a Class, hash: TypeHash) -> Option<&'a Field> {
        self.class_chain(class)
            .into_iter()
            .find_map(|current| current.find_field_by_name_hash(hash))
    }

    /// Field-wise reflective equality of two records.
    ///
    /// Both records must be instances of the same registered class; nested
    /// records compare recursively. Accessors move values in and out, which
    /// is why both sides are mutable.
    #[must_use]
    pub fn elements_equal(&self, a: &mut dyn Element, b: &mut dyn Element) -> bool {
        if a.class_name() != b.class_name() {
            return false;
        }
        let Some(class) = self.get_class(name_hash(a.class_name())) else {
            return false;
        };
        let chain: Vec<TypeHash> = self
            .class_chain(class)
            .into_iter()
            .map(Class::hash)
            .collect();

        for class_hash in chain {
            let Some(current) = self.get_class(class_hash) else {
                return false;
            };
            for field in current.fields() {
                let (Some(mut value_a), Some(mut value_b)) = (field.load(a), field.load(b)) else {
                    return false;
                };
                let equal = self.values_equal(&mut value_a, &mut value_b);
                field.store(a, value_a);
                field.store(b, value_b);
                if !equal {
                    return false;
                }
            }
        }
        true
    }

    fn values_equal(&self, a: &mut DataValue, b: &mut DataValue) -> bool {
        match (a, b) {
            (DataValue::Pointer(a), DataValue::Pointer(b)) => match (a, b) {
                (None, None) => true,
                (Some(a), Some(b)) => self.elements_equal(a.as_mut(), b.as_mut()),
                _ => false,
            },
            (DataValue::ElementVector(a), DataValue::ElementVector(b))
            | (DataValue::ElementSet(a), DataValue::ElementSet(b)) => {
                a.len() == b.len()
                    && a.iter_mut()
                        .zip(b.iter_mut())
                        .all(|(a, b)| self.elements_equal(a.as_mut(), b.as_mut()))
            }
            (DataValue::ElementMap(kind_a, a), DataValue::ElementMap(kind_b, b)) => {
                kind_a == kind_b
                    && a.len() == b.len()
                    && a.iter_mut().zip(b.iter_mut()).all(|(a, b)| {
                        a.0 == b.0 && self.elements_equal(a.1.as_mut(), b.1.as_mut())
                    })
            }
            (DataValue::TypeIdElementMap(a), DataValue::TypeIdElementMap(b)) => {
                a.len() == b.len()
                    && a.iter_mut().zip(b.iter_mut()).all(|(a, b)| {
                        a.0 == b.0 && self.elements_equal(a.1.as_mut(), b.1.as_mut())
                    })
            }
            (a, b) => a == b,
        }
    }

    fn insert_type(&mut self, info: TypeInfo) -> Result<(), ReflectError> {
        let hash = info.hash();
        if let Some(existing) = self.types_by_hash.get(&hash) {
            log::error!(
                "Re-registration of type '{}', could be ambiguous crc: {hash} (already owned by '{}')",
                info.name(),
                existing.name()
            );
            return Err(ReflectError::Logic(format!(
                "type hash {hash} of '{}' is already registered to '{}'",
                info.name(),
                existing.name()
            )));
        }
        self.types_by_hash.insert(hash, Arc::new(info));
        Ok(())
    }

    fn insert_builtin(&mut self, name: &str, base: Option<&str>, data_kind: Option<DataKind>) {
        let base_hash = base.map(name_hash);
        let class = Class::new(name.to_string(), base_hash, Vec::new(), None, data_kind);
        if let Err(err) = self.insert_type(TypeInfo::Class(class)) {
            log::error!("Failed to seed builtin type '{name}': {err}");
        }
    }

    fn seed_builtins(&mut self) {
        // Record bases.
        self.insert_builtin("Object", None, None);
        self.insert_builtin("Element", Some("Object"), None);

        // Data bases.
        self.insert_builtin("Data", Some("Element"), None);
        self.insert_builtin("Container", Some("Data"), None);
        self.insert_builtin("ElementContainer", Some("Container"), None);
        self.insert_builtin("TypeID", Some("Data"), Some(DataKind::TypeId));
        self.insert_builtin("Pointer", Some("Data"), Some(DataKind::Pointer));
        self.insert_builtin("Enumeration", Some("Data"), Some(DataKind::Enumeration));
        self.insert_builtin("Bitfield", Some("Enumeration"), Some(DataKind::Bitfield));
        self.insert_builtin(
            "Path",
            Some("Data"),
            Some(DataKind::Primitive(PrimitiveKind::Path)),
        );

        // Scalars.
        for kind in PrimitiveKind::ALL {
            if kind == PrimitiveKind::Path {
                continue; // seeded above with the data bases
            }
            self.insert_builtin(
                kind.canonical_name(),
                Some("Data"),
                Some(DataKind::Primitive(kind)),
            );
        }

        // Homogeneous vectors.
        self.insert_builtin("StlVector", Some("Container"), None);
        for kind in PrimitiveKind::ALL {
            self.insert_builtin(
                kind.vector_name(),
                Some("StlVector"),
                Some(DataKind::Vector(kind)),
            );
        }

        // Sets.
        self.insert_builtin("StlSet", Some("Container"), None);
        for kind in PrimitiveKind::ALL {
            if let Some(name) = kind.set_name() {
                self.insert_builtin(name, Some("StlSet"), Some(DataKind::Set(kind)));
            }
        }

        // Maps.
        self.insert_builtin("StlMap", Some("Container"), None);
        for key in PrimitiveKind::ALL {
            for value in PrimitiveKind::ALL {
                if let Some(name) = crate::data::map_name(key, value) {
                    self.insert_builtin(name, Some("StlMap"), Some(DataKind::Map(key, value)));
                }
            }
        }

        // Record containers.
        self.insert_builtin(
            "ElementStlVector",
            Some("ElementContainer"),
            Some(DataKind::ElementVector),
        );
        self.insert_builtin(
            "ElementStlSet",
            Some("ElementContainer"),
            Some(DataKind::ElementSet),
        );
        self.insert_builtin("ElementStlMap", Some("ElementContainer"), None);
        self.insert_builtin(
            "TypeIDElementStlMap",
            Some("ElementStlMap"),
            Some(DataKind::TypeIdElementMap),
        );
        for kind in PrimitiveKind::ALL {
            if let Some(name) = kind.element_map_name() {
                self.insert_builtin(
                    name,
                    Some("ElementStlMap"),
                    Some(DataKind::ElementMap(kind)),
                );
            }
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("types", &self.types_by_hash.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impl_element;

    #[derive(Default)]
    struct Mesh {
        vertex_count: u32,
        source: String,
    }
    impl_element!(Mesh, "Mesh");

    fn register_mesh(registry: &mut Registry) {
        registry
            .register_class::<Mesh>("Mesh", Some("Element"), |compositor| {
                compositor.field("vertex_count", |m| &mut m.vertex_count);
                compositor.field("source", |m| &mut m.source);
            })
            .expect("registration should succeed");
    }

    #[test]
    fn builtin_catalogue_is_seeded() {
        let registry = Registry::new();
        for name in [
            "Object",
            "Element",
            "Data",
            "Container",
            "ElementContainer",
            "TypeID",
            "Pointer",
            "Enumeration",
            "Bitfield",
            "Path",
            "U32",
            "String",
            "HDRColor4",
            "U32StlVector",
            "StrStlSet",
            "StrStrStlMap",
            "U64Matrix4StlMap",
            "ElementStlVector",
            "TypeIDElementStlMap",
            "GUIDElementStlMap",
            "Version",
            "Document",
        ] {
            assert!(registry.find_type(name).is_some(), "missing builtin {name}");
        }
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = Registry::new();
        register_mesh(&mut registry);
        let err = registry
            .register_class::<Mesh>("Mesh", None, |_| {})
            .unwrap_err();
        assert!(matches!(err, ReflectError::Logic(_)));
    }

    #[test]
    fn create_instance_uses_the_creator_thunk() {
        let mut registry = Registry::new();
        register_mesh(&mut registry);

        let instance = registry.create_instance(name_hash("Mesh"));
        assert_eq!(instance.map(|i| i.class_name()), Some("Mesh"));

        // Abstract bases have no creator.
        assert!(registry.create_instance(name_hash("Element")).is_none());
    }

    #[test]
    fn defaults_are_snapshotted_at_registration() {
        let mut registry = Registry::new();
        register_mesh(&mut registry);

        let class = registry.get_class(name_hash("Mesh")).unwrap();
        let field = class.find_field_by_name_hash(name_hash("vertex_count")).unwrap();
        assert_eq!(field.default(), Some(&crate::data::FieldData::into_value(0u32)));
    }

    #[test]
    fn alias_resolves_to_the_same_type() {
        let mut registry = Registry::new();
        register_mesh(&mut registry);
        registry.alias_type("Mesh", "LegacyMesh").unwrap();

        assert_eq!(
            registry.find_type("LegacyMesh").map(TypeInfo::name),
            Some("Mesh")
        );

        registry.unalias_type("Mesh", "LegacyMesh");
        assert!(registry.find_type("LegacyMesh").is_none());

        // Unalias refuses to remove a primary entry of another type.
        registry.unalias_type("Element", "Mesh");
        assert!(registry.find_type("Mesh").is_some());
    }

    #[test]
    fn has_type_walks_the_base_chain() {
        let registry = Registry::new();
        assert!(registry.has_type(name_hash("U32StlVector"), name_hash("Container")));
        assert!(registry.has_type(name_hash("U32StlVector"), name_hash("Data")));
        assert!(!registry.has_type(name_hash("U32"), name_hash("Container")));
    }

    #[test]
    fn registry_lookups_are_shareable_across_threads() {
        fn assert_shareable<T: Send + Sync>() {}
        assert_shareable::<Registry>();
    }

    #[test]
    fn elements_equal_compares_field_wise() {
        let mut registry = Registry::new();
        register_mesh(&mut registry);

        let mut a = Mesh {
            vertex_count: 3,
            source: "a.obj".to_string(),
        };
        let mut b = Mesh {
            vertex_count: 3,
            source: "a.obj".to_string(),
        };
        assert!(registry.elements_equal(&mut a, &mut b));

        b.vertex_count = 4;
        assert!(!registry.elements_equal(&mut a, &mut b));
        // Comparison restores the values it takes.
        assert_eq!(a.vertex_count, 3);
        assert_eq!(a.source, "a.obj");
    }
}
