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

//! What happens when streams lie: corruption, truncation, unknown types,
//! and schema drift in both directions.

use kiln_reflect::{
    from_file, from_stream, impl_element, name_hash, to_file, to_stream, ArchiveFlags,
    BinaryArchive, ChecksumFailure, DataValue, Element, ElementPtr, Primitive, ReflectError,
    Registry, CRC_SKIP,
};
use std::io::Cursor;

/// Offset of the stored CRC in the fixed header.
const CRC_OFFSET: usize = 7;
/// Offset of the version field in the fixed header.
const VERSION_OFFSET: usize = 3;
/// Offset of the first field's value payload for a one-field i32 record:
/// header (11) + spool count (4) + class hash (4) + record length (4) +
/// field count (4) + field name hash (4) + data class hash (4) +
/// data length (4) = 39.
const FIRST_VALUE_OFFSET: usize = 39;

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

fn written_point_bytes(registry: &Registry, x: i32, y: i32) -> Vec<u8> {
    let mut spool: Vec<ElementPtr> = vec![Box::new(Pt { x, y })];
    to_stream(registry, &mut spool, Cursor::new(Vec::new()))
        .unwrap()
        .into_inner()
}

#[test]
fn flipping_a_payload_byte_fails_the_checksum() {
    let registry = registry_with_pt();
    let mut bytes = written_point_bytes(&registry, 3, 4);

    bytes[FIRST_VALUE_OFFSET] ^= 0xFF;

    let err = from_stream(&registry, Cursor::new(bytes)).unwrap_err();
    match err {
        ReflectError::Checksum(ChecksumFailure::Mismatch { stored, computed }) => {
            assert_ne!(stored, computed);
        }
        other => panic!("expected a checksum mismatch, got {other}"),
    }
}

#[test]
fn the_skip_sentinel_bypasses_the_checksum() {
    let registry = registry_with_pt();
    let mut bytes = written_point_bytes(&registry, 3, 4);

    bytes[CRC_OFFSET..CRC_OFFSET + 4].copy_from_slice(&CRC_SKIP.to_le_bytes());
    bytes[FIRST_VALUE_OFFSET] ^= 0x01; // still structurally valid

    let read = from_stream(&registry, Cursor::new(bytes)).unwrap();
    let pt = read[0].as_any().downcast_ref::<Pt>().unwrap();
    assert_ne!(pt.x, 3, "the mutated value should read back unchecked");
}

#[test]
fn an_aborted_write_reads_as_incomplete() {
    let registry = registry_with_pt();
    let mut bytes = written_point_bytes(&registry, 3, 4);

    bytes[CRC_OFFSET..CRC_OFFSET + 4].copy_from_slice(&0xFFFF_FFFFu32.to_le_bytes());

    let err = from_stream(&registry, Cursor::new(bytes)).unwrap_err();
    assert!(matches!(
        err,
        ReflectError::Checksum(ChecksumFailure::IncompleteWrite)
    ));
}

#[test]
fn the_override_flag_downgrades_checksum_failures() {
    let registry = registry_with_pt();
    let mut bytes = written_point_bytes(&registry, 3, 4);
    bytes[FIRST_VALUE_OFFSET] ^= 0x01;

    let mut archive = BinaryArchive::open(Cursor::new(bytes));
    archive.set_flags(ArchiveFlags::OVERRIDE_CRC);
    archive.read(&registry).unwrap();
    assert_eq!(archive.elements().len(), 1);
}

#[test]
fn truncation_fails_the_checksum() {
    let registry = registry_with_pt();
    let mut bytes = written_point_bytes(&registry, 3, 4);
    bytes.truncate(bytes.len() - 8);

    let err = from_stream(&registry, Cursor::new(bytes)).unwrap_err();
    assert!(matches!(err, ReflectError::Checksum(_)));
}

#[test]
fn header_errors_are_reported_precisely() {
    let registry = registry_with_pt();
    let good = written_point_bytes(&registry, 1, 2);

    let err = from_stream(&registry, Cursor::new(Vec::<u8>::new())).unwrap_err();
    assert!(matches!(err, ReflectError::Stream(_)));

    let mut bad_bom = good.clone();
    bad_bom[0] = 0x12;
    bad_bom[1] = 0x34;
    let err = from_stream(&registry, Cursor::new(bad_bom)).unwrap_err();
    assert!(matches!(err, ReflectError::UnknownByteOrder(0x3412)));

    let mut bad_encoding = good.clone();
    bad_encoding[2] = 9;
    let err = from_stream(&registry, Cursor::new(bad_encoding)).unwrap_err();
    assert!(matches!(err, ReflectError::UnknownEncoding(9)));

    let mut future_version = good;
    future_version[VERSION_OFFSET..VERSION_OFFSET + 4].copy_from_slice(&8u32.to_le_bytes());
    let err = from_stream(&registry, Cursor::new(future_version)).unwrap_err();
    assert!(matches!(
        err,
        ReflectError::UnsupportedVersion { found: 8, current: 7 }
    ));
}

#[test]
fn unknown_record_classes_are_skipped_or_strict() {
    let writing = registry_with_pt();
    let mut spool: Vec<ElementPtr> = vec![
        Box::new(Pt { x: 5, y: 6 }),
        Box::new(kiln_reflect::Version::new("kiln-test", 2)),
    ];
    let bytes = to_stream(&writing, &mut spool, Cursor::new(Vec::new()))
        .unwrap()
        .into_inner();

    // A bare registry has no Pt: the record is skipped by length.
    let bare = Registry::new();
    let read = from_stream(&bare, Cursor::new(bytes.clone())).unwrap();
    assert_eq!(read.len(), 1);
    assert_eq!(read[0].class_name(), "Version");

    // Under STRICT the same stream is an error.
    let mut archive = BinaryArchive::open(Cursor::new(bytes));
    archive.set_flags(ArchiveFlags::STRICT);
    let err = archive.read(&bare).unwrap_err();
    assert!(matches!(err, ReflectError::TypeInformation(_)));
}

// Schema drift: the same class name bound to different Rust types in
// different registries stands in for older and newer builds of the tool.

#[derive(Default)]
struct ActorV1 {
    health: u32,
}
impl_element!(ActorV1, "Actor");

struct ActorV2 {
    health: u32,
    armor: u32,
}
impl_element!(ActorV2, "Actor");

impl Default for ActorV2 {
    fn default() -> Self {
        Self { health: 0, armor: 25 }
    }
}

#[test]
fn new_fields_pick_up_their_defaults_from_old_streams() {
    let mut old_build = Registry::new();
    old_build
        .register_class::<ActorV1>("Actor", Some("Element"), |compositor| {
            compositor.field("Health", |a| &mut a.health);
        })
        .unwrap();

    let mut spool: Vec<ElementPtr> = vec![Box::new(ActorV1 { health: 80 })];
    let mut stream = to_stream(&old_build, &mut spool, Cursor::new(Vec::new())).unwrap();
    stream.set_position(0);

    let mut new_build = Registry::new();
    new_build
        .register_class::<ActorV2>("Actor", Some("Element"), |compositor| {
            compositor.field("Health", |a| &mut a.health);
            compositor.field("Armor", |a| &mut a.armor);
        })
        .unwrap();

    let read = from_stream(&new_build, stream).unwrap();
    let actor = read[0].as_any().downcast_ref::<ActorV2>().unwrap();
    assert_eq!(actor.health, 80);
    assert_eq!(actor.armor, 25, "missing field should keep its default");
}

/// A build that dropped the Armor field but wants to salvage it.
#[derive(Default)]
struct ActorV3 {
    health: u32,
    salvaged: Vec<(String, u32)>,
}
impl Element for ActorV3 {
    fn class_name(&self) -> &'static str {
        "Actor"
    }
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
    fn process_component(&mut self, name: &str, value: DataValue) -> bool {
        if let DataValue::Primitive(Primitive::U32(armor)) = value {
            self.salvaged.push((name.to_string(), armor));
            return true;
        }
        false
    }
}

#[test]
fn removed_fields_are_offered_to_the_component_fallback() {
    let mut new_build = Registry::new();
    new_build
        .register_class::<ActorV2>("Actor", Some("Element"), |compositor| {
            compositor.field("Health", |a| &mut a.health);
            compositor.field("Armor", |a| &mut a.armor);
        })
        .unwrap();

    let mut spool: Vec<ElementPtr> = vec![Box::new(ActorV2 { health: 70, armor: 40 })];
    let mut stream = to_stream(&new_build, &mut spool, Cursor::new(Vec::new())).unwrap();
    stream.set_position(0);

    let mut narrow_build = Registry::new();
    narrow_build
        .register_class::<ActorV3>("Actor", Some("Element"), |compositor| {
            compositor.field("Health", |a| &mut a.health);
        })
        .unwrap();

    let read = from_stream(&narrow_build, stream).unwrap();
    let actor = read[0].as_any().downcast_ref::<ActorV3>().unwrap();
    assert_eq!(actor.health, 70);
    // The unknown field arrives by hash, not by name.
    let armor_hash = format!("{}", name_hash("Armor"));
    assert_eq!(actor.salvaged, vec![(armor_hash, 40)]);
}

struct ActorWide {
    health: u64,
}
impl_element!(ActorWide, "Actor");

impl Default for ActorWide {
    fn default() -> Self {
        Self { health: 1 }
    }
}

#[test]
fn a_widened_field_type_reads_old_streams_through_the_cast_path() {
    let mut old_build = Registry::new();
    old_build
        .register_class::<ActorV1>("Actor", Some("Element"), |compositor| {
            compositor.field("Health", |a| &mut a.health);
        })
        .unwrap();
    let mut spool: Vec<ElementPtr> = vec![Box::new(ActorV1 { health: 90 })];
    let mut stream = to_stream(&old_build, &mut spool, Cursor::new(Vec::new())).unwrap();
    stream.set_position(0);

    let mut widened_build = Registry::new();
    widened_build
        .register_class::<ActorWide>("Actor", Some("Element"), |compositor| {
            compositor.field("Health", |a| &mut a.health);
        })
        .unwrap();

    let read = from_stream(&widened_build, stream).unwrap();
    let actor = read[0].as_any().downcast_ref::<ActorWide>().unwrap();
    assert_eq!(actor.health, 90, "u32 on the wire should widen into u64");
}

#[test]
fn vetoed_records_are_discarded() {
    #[derive(Default)]
    struct Unstable {
        value: u32,
    }
    impl Element for Unstable {
        fn class_name(&self) -> &'static str {
            "Unstable"
        }
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }
        fn post_deserialize(&mut self) -> bool {
            self.value < 100
        }
    }

    let mut registry = Registry::new();
    registry
        .register_class::<Unstable>("Unstable", Some("Element"), |compositor| {
            compositor.field("Value", |u| &mut u.value);
        })
        .unwrap();

    let mut spool: Vec<ElementPtr> = vec![
        Box::new(Unstable { value: 10 }),
        Box::new(Unstable { value: 900 }),
    ];
    let mut stream = to_stream(&registry, &mut spool, Cursor::new(Vec::new())).unwrap();
    stream.set_position(0);

    let read = from_stream(&registry, stream).unwrap();
    assert_eq!(read.len(), 1, "the vetoing record should be discarded");
    assert_eq!(read[0].as_any().downcast_ref::<Unstable>().unwrap().value, 10);
}

#[test]
fn archives_round_trip_through_files() {
    let registry = registry_with_pt();
    let directory = tempfile::tempdir().unwrap();
    let path = directory.path().join("points.kiln");

    let mut spool: Vec<ElementPtr> = vec![Box::new(Pt { x: 21, y: -9 })];
    to_file(&registry, &mut spool, &path).unwrap();

    let read = from_file(&registry, &path).unwrap();
    let pt = read[0].as_any().downcast_ref::<Pt>().unwrap();
    assert_eq!((pt.x, pt.y), (21, -9));
}

#[test]
fn aliases_keep_renamed_types_readable() {
    let mut writing = Registry::new();
    writing
        .register_class::<ActorV1>("Actor", Some("Element"), |compositor| {
            compositor.field("Health", |a| &mut a.health);
        })
        .unwrap();
    let mut spool: Vec<ElementPtr> = vec![Box::new(ActorV1 { health: 55 })];
    let mut stream = to_stream(&writing, &mut spool, Cursor::new(Vec::new())).unwrap();
    stream.set_position(0);

    // The new build renamed the class but aliases the old name.
    #[derive(Default)]
    struct Pawn {
        health: u32,
    }
    impl_element!(Pawn, "Pawn");

    let mut renamed = Registry::new();
    renamed
        .register_class::<Pawn>("Pawn", Some("Element"), |compositor| {
            compositor.field("Health", |p| &mut p.health);
        })
        .unwrap();
    renamed.alias_type("Pawn", "Actor").unwrap();

    let read = from_stream(&renamed, stream).unwrap();
    let pawn = read[0].as_any().downcast_ref::<Pawn>().unwrap();
    assert_eq!(pawn.health, 55);
}
