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

//! Whole-archive round trips: wire structure, default and empty-container
//! elision, endianness symmetry, nested records, and search mode.

use kiln_reflect::math::Vector3;
use kiln_reflect::{
    from_stream, from_stream_search, impl_element, name_hash, reflect_enumeration, to_stream,
    ArchiveFlags, BinaryArchive, Element, ElementPtr, ElementVec, Endian, EnginePath, Guid,
    Registry, StatusSink, Tuid, Version,
};
use std::collections::{BTreeMap, BTreeSet};
use std::io::Cursor;

/// Byte offsets of the fixed header:
/// BOM (2) + encoding (1) + version (4) + crc (4) = 11, then the spool
/// count, then the first record's class hash, length, and field count.
const SPOOL_COUNT_OFFSET: usize = 11;
const FIRST_CLASS_OFFSET: usize = 15;
const FIRST_LENGTH_OFFSET: usize = 19;
const FIRST_FIELD_COUNT_OFFSET: usize = 23;
const FIRST_FIELD_NAME_OFFSET: usize = 27;

fn u32_le(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
}

#[derive(Default)]
struct Pt {
    x: i32,
    y: i32,
}
impl_element!(Pt, "Pt");

fn registry_with_pt() -> Registry {
    let mut registry = Registry::new();
    registry
        .register_class::<Pt>("Pt", Some("Element"), |compositor| {
            compositor.field("x", |p| &mut p.x);
            compositor.field("y", |p| &mut p.y);
        })
        .unwrap();
    registry
}

#[test]
fn point_round_trips_with_two_field_records() {
    let registry = registry_with_pt();
    let mut spool: Vec<ElementPtr> = vec![Box::new(Pt { x: 3, y: 4 })];

    let stream = to_stream(&registry, &mut spool, Cursor::new(Vec::new())).unwrap();
    let bytes = stream.into_inner();

    assert_eq!(u32_le(&bytes, SPOOL_COUNT_OFFSET), 1);
    assert_eq!(u32_le(&bytes, FIRST_CLASS_OFFSET), name_hash("Pt").0);
    assert_eq!(u32_le(&bytes, FIRST_FIELD_COUNT_OFFSET), 2);
    // Each field record: name hash + (class hash, length, 4-byte payload).
    assert_eq!(u32_le(&bytes, FIRST_LENGTH_OFFSET), 4 + 4 + 2 * 16 + 4);

    let mut read = from_stream(&registry, Cursor::new(bytes)).unwrap();
    assert_eq!(read.len(), 1);
    let mut original: ElementPtr = Box::new(Pt { x: 3, y: 4 });
    assert!(registry.elements_equal(read[0].as_mut(), original.as_mut()));

    // The write pass put the values back into the caller's records.
    let written = spool[0].as_any().downcast_ref::<Pt>().unwrap();
    assert_eq!((written.x, written.y), (3, 4));
}

#[test]
fn default_fields_are_elided() {
    let registry = registry_with_pt();
    let mut spool: Vec<ElementPtr> = vec![Box::new(Pt { x: 0, y: 0 })];

    let stream = to_stream(&registry, &mut spool, Cursor::new(Vec::new())).unwrap();
    let bytes = stream.into_inner();

    assert_eq!(u32_le(&bytes, FIRST_FIELD_COUNT_OFFSET), 0);

    // The field name hashes appear nowhere in the stream.
    let x_hash = name_hash("x").0.to_le_bytes();
    assert!(!bytes.windows(4).any(|window| window == x_hash));

    let mut read = from_stream(&registry, Cursor::new(bytes)).unwrap();
    let mut original: ElementPtr = Box::new(Pt::default());
    assert!(registry.elements_equal(read[0].as_mut(), original.as_mut()));
}

#[test]
fn forced_fields_are_written_even_at_default() {
    let mut registry = Registry::new();
    registry
        .register_class::<Pt>("Pt", Some("Element"), |compositor| {
            compositor.field("x", |p: &mut Pt| &mut p.x).force();
            compositor.field("y", |p: &mut Pt| &mut p.y);
        })
        .unwrap();

    let mut spool: Vec<ElementPtr> = vec![Box::new(Pt { x: 0, y: 0 })];
    let stream = to_stream(&registry, &mut spool, Cursor::new(Vec::new())).unwrap();
    let bytes = stream.into_inner();

    assert_eq!(u32_le(&bytes, FIRST_FIELD_COUNT_OFFSET), 1);
    assert_eq!(u32_le(&bytes, FIRST_FIELD_NAME_OFFSET), name_hash("x").0);
}

#[test]
fn both_byte_orders_read_back_identically() {
    let registry = registry_with_pt();

    for endian in [Endian::Little, Endian::Big] {
        let mut spool: Vec<ElementPtr> = vec![Box::new(Pt { x: -7, y: 40_000 })];
        let mut archive = BinaryArchive::create(Cursor::new(Vec::new()), endian);
        archive.write(&registry, &mut spool).unwrap();
        let mut bytes = archive.into_stream();
        bytes.set_position(0);

        let mut read = from_stream(&registry, bytes).unwrap();
        let mut original: ElementPtr = Box::new(Pt { x: -7, y: 40_000 });
        assert!(
            registry.elements_equal(read[0].as_mut(), original.as_mut()),
            "{endian:?} round trip diverged"
        );
    }
}

reflect_enumeration! {
    /// How a prop reacts to damage.
    pub enum DamageModel {
        Indestructible = 0,
        Breakable = 1,
        Deformable = 2,
    }
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PropFlags: u32 {
        const CAST_SHADOWS = 1 << 0;
        const OCCLUDER = 1 << 1;
        const NAVMESH_BLOCKER = 1 << 2;
    }
}
kiln_reflect::reflect_bitfield!(PropFlags);

/// One record exercising every family of data binding.
struct Prop {
    name: String,
    asset: EnginePath,
    id: Guid,
    legacy_id: Tuid,
    position: Vector3,
    lod_distances: Vec<f32>,
    tags: BTreeSet<String>,
    named_counts: BTreeMap<String, u32>,
    damage: DamageModel,
    flags: PropFlags,
}
impl_element!(Prop, "Prop");

impl Default for Prop {
    fn default() -> Self {
        Self {
            name: String::new(),
            asset: EnginePath::default(),
            id: Guid::default(),
            legacy_id: Tuid::NULL,
            position: Vector3::ZERO,
            lod_distances: Vec::new(),
            tags: BTreeSet::new(),
            named_counts: BTreeMap::new(),
            damage: DamageModel::Indestructible,
            flags: PropFlags::empty(),
        }
    }
}

fn registry_with_prop() -> Registry {
    let mut registry = Registry::new();
    registry
        .register_enumeration("DamageModel", DamageModel::reflect_values())
        .unwrap();
    registry
        .register_class::<Prop>("Prop", Some("Element"), |compositor| {
            compositor.field("Name", |p| &mut p.name);
            compositor.field("Asset", |p| &mut p.asset);
            compositor.field("Id", |p| &mut p.id);
            compositor.field("LegacyId", |p| &mut p.legacy_id).hide();
            compositor.field("Position", |p| &mut p.position);
            compositor
                .field("LodDistances", |p| &mut p.lod_distances)
                .ui_hint("slider{min=0;max=1000}");
            compositor.field("Tags", |p| &mut p.tags);
            compositor.field("NamedCounts", |p| &mut p.named_counts);
            compositor.field("Damage", |p| &mut p.damage);
            compositor.field("Flags", |p| &mut p.flags);
        })
        .unwrap();
    registry
}

fn sample_prop() -> Prop {
    Prop {
        name: "barrel".to_string(),
        asset: EnginePath::new("props/barrel.mesh"),
        id: Guid::generate(),
        legacy_id: Tuid(0xBEEF),
        position: Vector3::new(1.0, 2.0, 3.0),
        lod_distances: vec![10.0, 50.0, 200.0],
        tags: ["explosive", "wooden"].iter().map(|s| s.to_string()).collect(),
        named_counts: [("hits".to_string(), 3u32)].into_iter().collect(),
        damage: DamageModel::Breakable,
        flags: PropFlags::CAST_SHADOWS | PropFlags::NAVMESH_BLOCKER,
    }
}

#[test]
fn kitchen_sink_record_round_trips() {
    let registry = registry_with_prop();
    let sample = sample_prop();
    let id = sample.id;

    let mut spool: Vec<ElementPtr> = vec![Box::new(sample)];
    let stream = to_stream(&registry, &mut spool, Cursor::new(Vec::new())).unwrap();
    let mut bytes = stream;
    bytes.set_position(0);

    let mut read = from_stream(&registry, bytes).unwrap();
    assert_eq!(read.len(), 1);

    let mut original: ElementPtr = Box::new(sample_prop());
    // The GUID is random per construction; pin it to the written one.
    original.as_any_mut().downcast_mut::<Prop>().unwrap().id = id;
    assert!(registry.elements_equal(read[0].as_mut(), original.as_mut()));

    let prop = read[0].as_any().downcast_ref::<Prop>().unwrap();
    assert_eq!(prop.damage, DamageModel::Breakable);
    assert_eq!(prop.flags, PropFlags::CAST_SHADOWS | PropFlags::NAVMESH_BLOCKER);
    assert_eq!(prop.tags.len(), 2);
    assert_eq!(prop.named_counts.get("hits"), Some(&3));
}

#[test]
fn empty_containers_are_elided() {
    let registry = registry_with_prop();
    let mut prop = sample_prop();
    prop.lod_distances.clear();
    prop.tags.clear();
    prop.named_counts.clear();

    let mut spool: Vec<ElementPtr> = vec![Box::new(prop)];
    let stream = to_stream(&registry, &mut spool, Cursor::new(Vec::new())).unwrap();
    let bytes = stream.into_inner();

    for elided in ["LodDistances", "Tags", "NamedCounts"] {
        let hash = name_hash(elided).0.to_le_bytes();
        assert!(
            !bytes.windows(4).any(|window| window == hash),
            "field '{elided}' should not appear in the stream"
        );
    }
    // Populated fields still do.
    let name_field = name_hash("Name").0.to_le_bytes();
    assert!(bytes.windows(4).any(|window| window == name_field));
}

#[derive(Default)]
struct Rig {
    root_name: String,
    ik_target: Option<ElementPtr>,
    bones: ElementVec,
}
impl_element!(Rig, "Rig");

#[derive(Default)]
struct Bone {
    name: String,
    length: f32,
}
impl_element!(Bone, "Bone");

fn registry_with_rig() -> Registry {
    let mut registry = Registry::new();
    registry
        .register_class::<Bone>("Bone", Some("Element"), |compositor| {
            compositor.field("Name", |b| &mut b.name);
            compositor.field("Length", |b| &mut b.length);
        })
        .unwrap();
    registry
        .register_class::<Rig>("Rig", Some("Element"), |compositor| {
            compositor.field("RootName", |r| &mut r.root_name);
            compositor.field("IkTarget", |r| &mut r.ik_target);
            compositor.field("Bones", |r| &mut r.bones);
        })
        .unwrap();
    registry
}

fn sample_rig() -> Rig {
    let mut rig = Rig {
        root_name: "pelvis".to_string(),
        ik_target: Some(Box::new(Bone {
            name: "hand_l".to_string(),
            length: 0.0,
        })),
        bones: ElementVec::default(),
    };
    rig.bones.0.push(Box::new(Bone {
        name: "spine".to_string(),
        length: 0.4,
    }));
    rig.bones.0.push(Box::new(Bone {
        name: "neck".to_string(),
        length: 0.1,
    }));
    rig
}

#[test]
fn nested_records_round_trip() {
    let registry = registry_with_rig();
    let mut spool: Vec<ElementPtr> = vec![Box::new(sample_rig())];

    let mut stream = to_stream(&registry, &mut spool, Cursor::new(Vec::new())).unwrap();
    stream.set_position(0);
    let mut read = from_stream(&registry, stream).unwrap();

    let mut original: ElementPtr = Box::new(sample_rig());
    assert!(registry.elements_equal(read[0].as_mut(), original.as_mut()));

    let rig = read[0].as_any().downcast_ref::<Rig>().unwrap();
    assert_eq!(rig.bones.0.len(), 2);
    let target = rig.ik_target.as_ref().unwrap();
    assert_eq!(target.as_any().downcast_ref::<Bone>().unwrap().name, "hand_l");
}

#[test]
fn vacant_pointer_round_trips() {
    let registry = registry_with_rig();
    let mut rig = sample_rig();
    rig.ik_target = None;

    let mut spool: Vec<ElementPtr> = vec![Box::new(rig)];
    let mut stream = to_stream(&registry, &mut spool, Cursor::new(Vec::new())).unwrap();
    stream.set_position(0);
    let read = from_stream(&registry, stream).unwrap();

    let rig = read[0].as_any().downcast_ref::<Rig>().unwrap();
    assert!(rig.ik_target.is_none());
}

#[test]
fn search_mode_returns_the_first_matching_record() {
    let registry = registry_with_pt();
    let mut spool: Vec<ElementPtr> = vec![
        Box::new(Version::new("kiln-test", 1)),
        Box::new(Pt { x: 9, y: 9 }),
    ];

    let mut stream = to_stream(&registry, &mut spool, Cursor::new(Vec::new())).unwrap();
    stream.set_position(0);
    let found = from_stream_search(&registry, stream, "Pt").unwrap();

    let found = found.expect("a Pt record should be found");
    let pt = found.as_any().downcast_ref::<Pt>().unwrap();
    assert_eq!((pt.x, pt.y), (9, 9));
}

#[test]
fn sparse_mode_keeps_index_correspondence() {
    // Write with a registry that knows Pt; read with one that doesn't.
    let full = registry_with_pt();
    let mut spool: Vec<ElementPtr> = vec![
        Box::new(Pt { x: 1, y: 2 }),
        Box::new(Version::new("kiln-test", 1)),
    ];
    let mut stream = to_stream(&full, &mut spool, Cursor::new(Vec::new())).unwrap();
    stream.set_position(0);

    let bare = Registry::new();
    let mut archive = BinaryArchive::open(stream);
    archive.set_flags(ArchiveFlags::SPARSE);
    archive.read(&bare).unwrap();
    let sparse = archive.sparse_elements();

    assert_eq!(sparse.len(), 2);
    assert!(sparse[0].is_none(), "unknown Pt should leave a null entry");
    assert_eq!(
        sparse[1].as_ref().map(|e| e.class_name()),
        Some("Version")
    );
}

struct AbortAfterFirst {
    progress_events: u32,
}

impl StatusSink for AbortAfterFirst {
    fn on_progress(&mut self, _percent: u32) -> bool {
        self.progress_events += 1;
        self.progress_events == 1
    }
}

#[test]
fn a_listener_can_abort_between_records() {
    let registry = registry_with_pt();
    let mut spool: Vec<ElementPtr> = vec![
        Box::new(Pt { x: 1, y: 1 }),
        Box::new(Pt { x: 2, y: 2 }),
        Box::new(Pt { x: 3, y: 3 }),
    ];
    let mut stream = to_stream(&registry, &mut spool, Cursor::new(Vec::new())).unwrap();
    stream.set_position(0);

    let mut sink = AbortAfterFirst { progress_events: 0 };
    let mut archive = BinaryArchive::open(stream);
    archive.set_flags(ArchiveFlags::STATUS);
    archive.read_with_status(&registry, &mut sink).unwrap();

    let partial = archive.elements();
    assert_eq!(partial.len(), 1, "abort should leave a partial spool");
}

#[test]
fn document_tree_round_trips_through_its_base_chain() {
    let registry = Registry::new();

    let mut document = kiln_reflect::Document::default();
    document.root_mut().tag = "scene".to_string();
    document
        .root_mut()
        .add_attribute(kiln_reflect::DocumentAttribute::new("version", "7"));
    let mut child = kiln_reflect::DocumentElement::new("node");
    child.text = "hero".to_string();
    document.root_mut().add_child(child);

    let mut spool: Vec<ElementPtr> = vec![Box::new(document)];
    let mut stream = to_stream(&registry, &mut spool, Cursor::new(Vec::new())).unwrap();
    stream.set_position(0);
    let read = from_stream(&registry, stream).unwrap();

    let document = read[0]
        .as_any()
        .downcast_ref::<kiln_reflect::Document>()
        .unwrap();
    assert_eq!(document.root().tag, "scene");
    assert_eq!(document.root().attributes.0.len(), 1);
    assert_eq!(document.root().children.0.len(), 1);
    let child = document.root().children.0[0]
        .as_any()
        .downcast_ref::<kiln_reflect::DocumentElement>()
        .unwrap();
    assert_eq!(child.text, "hero");
}
