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

//! The record trait every reflected type implements.
//!
//! An [`Element`] is a live instance of a registered class. The archive
//! engine drives it exclusively through this trait: downcasting for field
//! access, the serialize/deserialize hooks, and the component fallback for
//! fields the current schema no longer declares.
//!
//! Single inheritance is modeled by embedding: a derived record owns its
//! base record as a field and exposes it through [`Element::base`]. Field
//! accessors resolve through that chain, so a field declared on a base
//! class reads and writes correctly through a derived instance.

use crate::data::DataValue;
use std::any::Any;
use std::fmt;

/// An owned, type-erased record.
///
/// Each record is emitted once by value in an archive spool; ownership is
/// the graph. Shared handles are reserved for the registry's immutable type
/// descriptors.
pub type ElementPtr = Box<dyn Element>;

/// A live instance of a registered class.
///
/// Records are `Send + Sync` so a populated [`Registry`] can be shared
/// across reader threads; mutation stays single-threaded per archive.
///
/// [`Registry`]: crate::registry::Registry
pub trait Element: Any + Send + Sync {
    /// The canonical name this record's class was registered under.
    fn class_name(&self) -> &'static str;

    /// Upcasts to [`Any`] for field access.
    fn as_any(&self) -> &dyn Any;

    /// Upcasts to [`Any`] for mutable field access.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// The embedded base record, if this class derives from another.
    fn base(&self) -> Option<&dyn Element> {
        None
    }

    /// Mutable access to the embedded base record.
    fn base_mut(&mut self) -> Option<&mut dyn Element> {
        None
    }

    /// Invoked immediately before this record's fields are written.
    fn pre_serialize(&mut self) {}

    /// Invoked after this record has been fully written.
    fn post_serialize(&mut self) {}

    /// Invoked after allocation, before any field is stored.
    fn pre_deserialize(&mut self) {}

    /// Invoked after all fields are stored. Returning `false` vetoes the
    /// record: the reader discards it as if it had not been present.
    fn post_deserialize(&mut self) -> bool {
        true
    }

    /// Offered a value the schema could not place: an unknown field name,
    /// or a field whose stream type could not be cast to the compiled type.
    /// Return `true` to consume the value; `false` discards it.
    fn process_component(&mut self, _name: &str, _value: DataValue) -> bool {
        false
    }
}

impl fmt::Debug for dyn Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Element({})", self.class_name())
    }
}

/// Walks the base chain looking for the concrete type `T`.
///
/// Returns the record itself if it is a `T`, otherwise the first embedded
/// base that is.
#[must_use]
pub fn downcast_ref_chained<T: Element>(element: &dyn Element) -> Option<&T> {
    if let Some(concrete) = element.as_any().downcast_ref::<T>() {
        return Some(concrete);
    }
    element.base().and_then(|base| downcast_ref_chained::<T>(base))
}

/// Mutable variant of [`downcast_ref_chained`].
#[must_use]
pub fn downcast_mut_chained<T: Element>(element: &mut dyn Element) -> Option<&mut T> {
    if element.as_any().is::<T>() {
        return element.as_any_mut().downcast_mut::<T>();
    }
    element.base_mut().and_then(|base| downcast_mut_chained::<T>(base))
}

/// Implements the boilerplate half of [`Element`] for a record without
/// hooks or a base class.
///
/// ```
/// use kiln_reflect::{impl_element, Element};
///
/// #[derive(Default)]
/// struct Probe {
///     value: i32,
/// }
/// impl_element!(Probe, "Probe");
///
/// let probe = Probe { value: 3 };
/// assert_eq!(Element::class_name(&probe), "Probe");
/// # let _ = probe.value;
/// ```
///
/// The optional third argument names the field holding the embedded base
/// record: `impl_element!(Derived, "Derived", base);`.
#[macro_export]
macro_rules! impl_element {
    ($record:ty, $name:literal) => {
        impl $crate::Element for $record {
            fn class_name(&self) -> &'static str {
                $name
            }
            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }
            fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
                self
            }
        }
    };
    ($record:ty, $name:literal, $base:ident) => {
        impl $crate::Element for $record {
            fn class_name(&self) -> &'static str {
                $name
            }
            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }
            fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
                self
            }
            fn base(&self) -> Option<&dyn $crate::Element> {
                Some(&self.$base)
            }
            fn base_mut(&mut self) -> Option<&mut dyn $crate::Element> {
                Some(&mut self.$base)
            }
        }
    };
}
