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

//! Stock record types seeded into every registry.
//!
//! [`Version`] stamps an archive with the tool that produced it, so a
//! reader can tell where content came from before trusting it. The
//! document family is the generic attributed-tree record set tool-side
//! code uses for structured documents; it also exercises every base-chain
//! path in the engine, since `Document` derives through `DocumentElement`
//! and `DocumentNode`.

use crate::data::ElementVec;
use crate::element::ElementPtr;
use crate::impl_element;
use crate::registry::Registry;

/// A tool/version stamp, conventionally the first record in a spool.
#[derive(Debug, Default)]
pub struct Version {
    /// The tool that produced the archive.
    pub source: String,
    /// The tool's data revision.
    pub source_version: u32,
}
impl_element!(Version, "Version");

impl Version {
    /// Creates a stamp for the given tool and revision.
    #[must_use]
    pub fn new(source: impl Into<String>, source_version: u32) -> Self {
        Self {
            source: source.into(),
            source_version,
        }
    }
}

/// The abstract base of the document tree.
#[derive(Debug, Default)]
pub struct DocumentNode {}
impl_element!(DocumentNode, "DocumentNode");

/// A named attribute on a document element.
#[derive(Debug, Default)]
pub struct DocumentAttribute {
    node: DocumentNode,
    /// The attribute name.
    pub name: String,
    /// The attribute value.
    pub value: String,
}
impl_element!(DocumentAttribute, "DocumentAttribute", node);

impl DocumentAttribute {
    /// Creates an attribute.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            node: DocumentNode::default(),
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A tagged element in a document tree.
#[derive(Debug, Default)]
pub struct DocumentElement {
    node: DocumentNode,
    /// The element tag.
    pub tag: String,
    /// Attributes, as [`DocumentAttribute`] records.
    pub attributes: ElementVec,
    /// Child elements, as [`DocumentElement`] records.
    pub children: ElementVec,
    /// Text content.
    pub text: String,
}
impl_element!(DocumentElement, "DocumentElement", node);

impl DocumentElement {
    /// Creates an element with the given tag.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Appends an attribute record.
    pub fn add_attribute(&mut self, attribute: DocumentAttribute) {
        self.attributes.0.push(Box::new(attribute) as ElementPtr);
    }

    /// Appends a child element record.
    pub fn add_child(&mut self, child: DocumentElement) {
        self.children.0.push(Box::new(child) as ElementPtr);
    }
}

/// A whole document: the root element of a tree.
#[derive(Debug, Default)]
pub struct Document {
    root: DocumentElement,
}
impl_element!(Document, "Document", root);

impl Document {
    /// The root element.
    #[must_use]
    pub fn root(&self) -> &DocumentElement {
        &self.root
    }

    /// Mutable access to the root element.
    pub fn root_mut(&mut self) -> &mut DocumentElement {
        &mut self.root
    }
}

pub(crate) fn register_document_types(registry: &mut Registry) {
    let results = [
        registry.register_class::<Version>("Version", Some("Element"), |compositor| {
            compositor.field("Source", |v: &mut Version| &mut v.source);
            compositor.field("SourceVersion", |v: &mut Version| &mut v.source_version);
        }),
        registry.register_class::<DocumentNode>("DocumentNode", Some("Element"), |_| {}),
        registry.register_class::<DocumentAttribute>(
            "DocumentAttribute",
            Some("DocumentNode"),
            |compositor| {
                compositor.field("Name", |a: &mut DocumentAttribute| &mut a.name);
                compositor.field("Value", |a: &mut DocumentAttribute| &mut a.value);
            },
        ),
        registry.register_class::<DocumentElement>(
            "DocumentElement",
            Some("DocumentNode"),
            |compositor| {
                compositor.field("Tag", |e: &mut DocumentElement| &mut e.tag);
                compositor.field("Attributes", |e: &mut DocumentElement| &mut e.attributes);
                compositor.field("Children", |e: &mut DocumentElement| &mut e.children);
                compositor.field("Text", |e: &mut DocumentElement| &mut e.text);
            },
        ),
        registry.register_class::<Document>("Document", Some("DocumentElement"), |_| {}),
    ];
    for result in results {
        if let Err(err) = result {
            log::error!("Failed to seed a stock record type: {err}");
        }
    }
}
