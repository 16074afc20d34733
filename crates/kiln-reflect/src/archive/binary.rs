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

//! The binary archive engine: the write and read pipelines over the wire
//! layout documented on the [parent module](crate::archive).

use crate::archive::stream::{ArchiveStream, Encoding, Endian};
use crate::archive::{
    ArchiveFlags, NullSink, StatusSink, BOM, CRC_BLOCK_SIZE, CRC_INVALID, CRC_SKIP,
    CURRENT_VERSION, TERMINATOR,
};
use crate::composite::{Field, FieldFlags, StoreOutcome};
use crate::data::{cast_value, codec, CastFlags, DataKind, DataValue};
use crate::element::{Element, ElementPtr};
use crate::error::{ChecksumFailure, ReflectError};
use crate::hash::{name_hash, TypeHash};
use crate::registry::Registry;
use std::io::{Read, Seek, Write};
use std::path::Path;

/// A binary archive bound to one stream.
///
/// Create one with [`create`](BinaryArchive::create) to write or
/// [`open`](BinaryArchive::open) to read, or use the free functions
/// ([`to_stream`], [`from_stream`], [`to_file`], [`from_file`]) for the
/// common one-shot cases.
pub struct BinaryArchive<S> {
    stream: ArchiveStream<S>,
    version: u32,
    flags: ArchiveFlags,
    search_class: Option<TypeHash>,
    spool: Vec<Option<ElementPtr>>,
    abort: bool,
    payload_start: u64,
    payload_size: u64,
}

impl<S> BinaryArchive<S> {
    /// Creates a writing archive over a stream, fixing its byte order.
    pub fn create(stream: S, endian: Endian) -> Self {
        Self::with_stream(ArchiveStream::new(stream, endian))
    }

    /// Opens a reading archive; byte order is taken from the BOM.
    pub fn open(stream: S) -> Self {
        Self::with_stream(ArchiveStream::new(stream, Endian::Little))
    }

    fn with_stream(stream: ArchiveStream<S>) -> Self {
        Self {
            stream,
            version: CURRENT_VERSION,
            flags: ArchiveFlags::empty(),
            search_class: None,
            spool: Vec::new(),
            abort: false,
            payload_start: 0,
            payload_size: 0,
        }
    }

    /// Replaces the archive's option flags.
    pub fn set_flags(&mut self, flags: ArchiveFlags) {
        self.flags = flags;
    }

    /// Restricts the reader to records deriving from the given class;
    /// everything else is skipped by length.
    pub fn set_search_class(&mut self, search_class: Option<TypeHash>) {
        self.search_class = search_class;
    }

    /// The archive version (the stream's version after a read).
    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Consumes the archive, returning the decoded spool with skipped
    /// entries compacted away.
    #[must_use]
    pub fn elements(self) -> Vec<ElementPtr> {
        self.spool.into_iter().flatten().collect()
    }

    /// Consumes the archive, returning the spool with a `None` for every
    /// skipped record (meaningful under [`ArchiveFlags::SPARSE`]).
    #[must_use]
    pub fn sparse_elements(self) -> Vec<Option<ElementPtr>> {
        self.spool
    }

    /// Releases the underlying stream.
    pub fn into_stream(self) -> S {
        self.stream.into_inner()
    }
}

impl<S: Read + Write + Seek> BinaryArchive<S> {
    /// Writes the spool to the stream.
    pub fn write(
        &mut self,
        registry: &Registry,
        spool: &mut [ElementPtr],
    ) -> Result<(), ReflectError> {
        self.write_with_status(registry, spool, &mut NullSink)
    }

    /// Writes the spool, raising progress events on the sink.
    pub fn write_with_status(
        &mut self,
        registry: &Registry,
        spool: &mut [ElementPtr],
        sink: &mut dyn StatusSink,
    ) -> Result<(), ReflectError> {
        sink.on_start();

        self.stream.write_u16(BOM)?;
        self.stream.write_u8(self.stream.encoding().as_byte())?;
        self.stream.write_u32(self.version)?;

        // Start with the invalid CRC, in case we don't make it to the end.
        let crc_offset = self.stream.position()?;
        self.stream.write_u32(CRC_INVALID)?;

        self.serialize_spool(registry, spool, sink)?;

        // Re-read everything past the CRC slot and back-patch the real value.
        self.stream.flush()?;
        self.stream.seek_to(crc_offset + 4)?;
        let mut hasher = crc32fast::Hasher::new();
        let mut block = [0u8; CRC_BLOCK_SIZE];
        loop {
            let got = self.stream.read_block(&mut block)?;
            if got == 0 {
                break;
            }
            hasher.update(&block[..got]);
        }
        let mut crc = hasher.finalize();
        if crc == CRC_INVALID {
            // The real checksum collided with the abort sentinel; fall back
            // to the skip sentinel so readers accept the file.
            crc = CRC_SKIP;
        }
        self.stream.seek_to(crc_offset)?;
        self.stream.write_u32(crc)?;
        self.stream.seek_end()?;
        self.stream.flush()?;

        sink.on_complete();
        Ok(())
    }

    fn serialize_spool(
        &mut self,
        registry: &Registry,
        elements: &mut [ElementPtr],
        sink: &mut dyn StatusSink,
    ) -> Result<(), ReflectError> {
        self.stream.write_i32(elements.len() as i32)?;
        let total = elements.len();
        for (index, element) in elements.iter_mut().enumerate() {
            self.serialize_element(registry, element.as_mut())?;
            if self.flags.contains(ArchiveFlags::STATUS) {
                let percent = (index as f64 / total as f64 * 100.0) as u32;
                sink.on_progress(percent);
            }
        }
        if self.flags.contains(ArchiveFlags::STATUS) {
            sink.on_progress(100);
        }
        self.stream.write_i32(TERMINATOR)?;
        Ok(())
    }

    fn serialize_element_block(
        &mut self,
        registry: &Registry,
        elements: &mut [ElementPtr],
    ) -> Result<(), ReflectError> {
        self.stream.write_i32(elements.len() as i32)?;
        for element in elements.iter_mut() {
            self.serialize_element(registry, element.as_mut())?;
        }
        self.stream.write_i32(TERMINATOR)?;
        Ok(())
    }

    fn serialize_element(
        &mut self,
        registry: &Registry,
        element: &mut dyn Element,
    ) -> Result<(), ReflectError> {
        let class_hash = name_hash(element.class_name());
        if registry.get_class(class_hash).is_none() {
            return Err(ReflectError::TypeInformation(format!(
                "class '{}' is not registered",
                element.class_name()
            )));
        }

        self.stream.write_u32(class_hash.0)?;
        let length_offset = self.stream.position()?;
        self.stream.write_u32(0)?;

        element.pre_serialize();

        let count_offset = self.stream.position()?;
        self.stream.write_u32(0)?;
        let mut field_count: u32 = 0;

        let chain: Vec<TypeHash> = registry
            .class_chain(
                registry
                    .get_class(class_hash)
                    .ok_or_else(|| ReflectError::Logic("class vanished mid-write".to_string()))?,
            )
            .iter()
            .map(|class| class.hash())
            .collect();

        for link in chain {
            let Some(current) = registry.get_class(link) else {
                continue;
            };
            for field in current.fields() {
                if field.flags().contains(FieldFlags::DISCARD) {
                    continue;
                }
                let Some(mut value) = field.load(element) else {
                    return Err(ReflectError::Logic(format!(
                        "field '{}' of '{}' does not bind to this record",
                        field.name(),
                        current.name()
                    )));
                };

                let mut serialize = true;
                if !field.flags().contains(FieldFlags::FORCE) {
                    if let Some(default) = field.default() {
                        if *default == value {
                            serialize = false;
                        }
                    }
                }
                if serialize && value.is_empty_container() {
                    serialize = false;
                }

                let written = if serialize {
                    let result = self
                        .stream
                        .write_u32(field.name_hash().0)
                        .and_then(|()| self.serialize_data(registry, field.data_class(), &mut value));
                    field_count += 1;
                    result
                } else {
                    Ok(())
                };

                // Put the value back whether or not the write succeeded.
                field.store(element, value);
                written?;
            }
        }

        self.stream.write_i32(TERMINATOR)?;

        let end = self.stream.position()?;
        self.stream.seek_to(count_offset)?;
        self.stream.write_u32(field_count)?;
        self.stream.seek_to(length_offset)?;
        self.stream.write_u32((end - length_offset) as u32)?;
        self.stream.seek_to(end)?;

        element.post_serialize();
        Ok(())
    }

    /// Writes one data record: data-class hash, length, payload.
    fn serialize_data(
        &mut self,
        registry: &Registry,
        data_class: TypeHash,
        value: &mut DataValue,
    ) -> Result<(), ReflectError> {
        self.stream.write_u32(data_class.0)?;
        let length_offset = self.stream.position()?;
        self.stream.write_u32(0)?;

        match value {
            DataValue::Pointer(target) => match target {
                Some(element) => self.serialize_element(registry, element.as_mut())?,
                None => self.stream.write_u32(0)?,
            },
            DataValue::ElementVector(items) | DataValue::ElementSet(items) => {
                self.serialize_element_block(registry, items)?;
            }
            DataValue::ElementMap(_, entries) => {
                self.stream.write_i32(entries.len() as i32)?;
                for (key, element) in entries.iter_mut() {
                    codec::encode_primitive(&mut self.stream, key)?;
                    self.serialize_element(registry, element.as_mut())?;
                }
            }
            DataValue::TypeIdElementMap(entries) => {
                self.stream.write_i32(entries.len() as i32)?;
                for (key, element) in entries.iter_mut() {
                    self.stream.write_u32(key.0)?;
                    self.serialize_element(registry, element.as_mut())?;
                }
            }
            other => codec::encode_value(&mut self.stream, other)?,
        }

        let end = self.stream.position()?;
        self.stream.seek_to(length_offset)?;
        self.stream.write_u32((end - length_offset) as u32)?;
        self.stream.seek_to(end)?;
        Ok(())
    }
}

impl<S: Read + Seek> BinaryArchive<S> {
    /// Reads the stream into the archive's spool.
    pub fn read(&mut self, registry: &Registry) -> Result<(), ReflectError> {
        self.read_with_status(registry, &mut NullSink)
    }

    /// Reads the stream, raising progress events on the sink.
    pub fn read_with_status(
        &mut self,
        registry: &Registry,
        sink: &mut dyn StatusSink,
    ) -> Result<(), ReflectError> {
        sink.on_start();
        self.abort = false;

        let total = self.stream.seek_end()?;
        if total == 0 {
            return Err(ReflectError::Stream("input stream is empty".to_string()));
        }
        self.stream.seek_to(0)?;

        // The BOM tells us the byte order of everything that follows.
        self.stream.set_endian(Endian::Little);
        match self.stream.read_u16()? {
            BOM => {}
            0xFFFE => self.stream.set_endian(Endian::Big),
            other => return Err(ReflectError::UnknownByteOrder(other)),
        }

        let encoding_byte = self.stream.read_u8()?;
        let encoding = Encoding::from_byte(encoding_byte)
            .ok_or(ReflectError::UnknownEncoding(encoding_byte))?;
        self.stream.set_encoding(encoding);

        self.version = self.stream.read_u32()?;
        if self.version > CURRENT_VERSION {
            return Err(ReflectError::UnsupportedVersion {
                found: self.version,
                current: CURRENT_VERSION,
            });
        }

        let stored_crc = self.stream.read_u32()?;
        let payload_start = self.stream.position()?;

        if stored_crc != CRC_SKIP {
            let mut hasher = crc32fast::Hasher::new();
            let mut block = [0u8; CRC_BLOCK_SIZE];
            loop {
                let got = self.stream.read_block(&mut block)?;
                if got == 0 {
                    break;
                }
                hasher.update(&block[..got]);
            }
            let computed = hasher.finalize();
            if computed != stored_crc {
                let failure = if stored_crc == CRC_INVALID {
                    ChecksumFailure::IncompleteWrite
                } else {
                    ChecksumFailure::Mismatch {
                        stored: stored_crc,
                        computed,
                    }
                };
                if self.flags.contains(ArchiveFlags::OVERRIDE_CRC) {
                    log::warn!("Checksum override enabled, continuing despite: {failure}");
                } else {
                    return Err(ReflectError::Checksum(failure));
                }
            }
            self.stream.seek_to(payload_start)?;
        }

        self.payload_start = payload_start;
        self.payload_size = total - payload_start;

        self.deserialize_spool(registry, sink)?;

        sink.on_complete();
        Ok(())
    }

    fn deserialize_spool(
        &mut self,
        registry: &Registry,
        sink: &mut dyn StatusSink,
    ) -> Result<(), ReflectError> {
        let count = self.stream.read_i32()?;
        if count < 0 {
            return Err(ReflectError::DataFormat(format!(
                "negative element count: {count}"
            )));
        }

        self.spool = Vec::with_capacity(count as usize);
        for _ in 0..count {
            if self.abort {
                break;
            }
            let element = self.deserialize_element(registry)?;
            match element {
                Some(element) => self.spool.push(Some(element)),
                None if self.flags.contains(ArchiveFlags::SPARSE) => self.spool.push(None),
                None => {}
            }
            if self.flags.contains(ArchiveFlags::STATUS) {
                let position = self.stream.position()?;
                let percent = if self.payload_size == 0 {
                    100
                } else {
                    ((position - self.payload_start) as f64 / self.payload_size as f64 * 100.0)
                        as u32
                };
                if sink.on_progress(percent) {
                    self.abort = true;
                }
            }
        }

        if !self.abort {
            let terminator = self.stream.read_i32()?;
            if terminator != TERMINATOR {
                return Err(ReflectError::DataFormat(
                    "unterminated element array block".to_string(),
                ));
            }
        }

        if self.flags.contains(ArchiveFlags::STATUS) {
            sink.on_progress(100);
        }
        Ok(())
    }

    fn deserialize_element_block(
        &mut self,
        registry: &Registry,
    ) -> Result<Vec<ElementPtr>, ReflectError> {
        let count = self.stream.read_i32()?;
        if count < 0 {
            return Err(ReflectError::DataFormat(format!(
                "negative element count: {count}"
            )));
        }
        let mut elements = Vec::with_capacity(count as usize);
        for _ in 0..count {
            if let Some(element) = self.deserialize_element(registry)? {
                elements.push(element);
            }
        }
        let terminator = self.stream.read_i32()?;
        if terminator != TERMINATOR {
            return Err(ReflectError::DataFormat(
                "unterminated element array block".to_string(),
            ));
        }
        Ok(elements)
    }

    fn deserialize_element(
        &mut self,
        registry: &Registry,
    ) -> Result<Option<ElementPtr>, ReflectError> {
        let class_hash = TypeHash(self.stream.read_u32()?);
        self.deserialize_element_with_hash(registry, class_hash)
    }

    /// Decodes one record whose class hash has already been consumed.
    fn deserialize_element_with_hash(
        &mut self,
        registry: &Registry,
        class_hash: TypeHash,
    ) -> Result<Option<ElementPtr>, ReflectError> {
        let length_offset = self.stream.position()?;
        let length = u64::from(self.stream.read_u32()?);
        if length < 4 {
            return Err(ReflectError::DataFormat(format!(
                "record length {length} is smaller than its own length field"
            )));
        }
        let record_end = length_offset + length;
        if record_end > self.payload_start + self.payload_size {
            return Err(ReflectError::DataFormat(format!(
                "record of {length} bytes runs past the end of the stream"
            )));
        }

        let class = registry.get_class(class_hash);

        let skip_reason = match class {
            None => {
                if self.flags.contains(ArchiveFlags::STRICT) {
                    return Err(ReflectError::TypeInformation(format!(
                        "stream references unregistered type {class_hash}"
                    )));
                }
                Some("type is not registered")
            }
            Some(class) if class.data_kind().is_some() => {
                // A bare data object is not a record; nothing to bind it to.
                Some("type is a data class")
            }
            Some(class) => {
                let excluded_by_search = self
                    .search_class
                    .is_some_and(|target| !registry.has_type(class.hash(), target));
                if excluded_by_search {
                    Some("record does not match the search class")
                } else if class.creator().is_none() {
                    Some("class has no creator")
                } else {
                    None
                }
            }
        };

        if let Some(reason) = skip_reason {
            log::debug!(
                "Unable to create object of type {class_hash}, size {length}, skipping ({reason})"
            );
            // The length field was already consumed.
            self.stream.seek_by(length as i64 - 4)?;
            return Ok(None);
        }

        let mut element = registry
            .create_instance(class_hash)
            .ok_or_else(|| ReflectError::Logic("creator vanished mid-read".to_string()))?;

        element.pre_deserialize();
        self.deserialize_fields(registry, class_hash, element.as_mut(), record_end)?;

        if !element.post_deserialize() {
            log::debug!("{class_hash} vetoed itself in post_deserialize, discarding");
            return Ok(None);
        }
        Ok(Some(element))
    }

    fn deserialize_fields(
        &mut self,
        registry: &Registry,
        class_hash: TypeHash,
        element: &mut dyn Element,
        record_end: u64,
    ) -> Result<(), ReflectError> {
        let field_count = self.stream.read_i32()?;
        if field_count < 0 {
            return Err(ReflectError::DataFormat(format!(
                "negative field count: {field_count}"
            )));
        }

        for _ in 0..field_count {
            let field_name_hash = TypeHash(self.stream.read_u32()?);

            // The nested data record, tagged with the *stream's* data class.
            let data_class_hash = TypeHash(self.stream.read_u32()?);
            let data_length_offset = self.stream.position()?;
            let data_length = u64::from(self.stream.read_u32()?);
            if data_length < 4 {
                return Err(ReflectError::DataFormat(format!(
                    "data record length {data_length} is smaller than its own length field"
                )));
            }
            let data_end = data_length_offset + data_length;
            if data_end > record_end {
                return Err(ReflectError::DataFormat(
                    "data record runs past its enclosing record".to_string(),
                ));
            }

            let stream_kind = registry
                .get_class(data_class_hash)
                .and_then(|class| class.data_kind());
            let Some(stream_kind) = stream_kind else {
                return Err(ReflectError::TypeInformation(format!(
                    "unknown data class {data_class_hash} for field {field_name_hash}"
                )));
            };

            let value = self.deserialize_data(registry, stream_kind, data_end)?;

            // Never trust a payload decoder with the cursor.
            self.stream.seek_to(data_end)?;

            let class = registry
                .get_class(class_hash)
                .ok_or_else(|| ReflectError::Logic("class vanished mid-read".to_string()))?;

            match registry.find_field(class, field_name_hash) {
                Some(field) => {
                    if data_class_hash == field.data_class() {
                        self.place_value(element, field, value);
                    } else {
                        // The stream's type no longer matches the compiled
                        // field; try a shallow cast before giving up.
                        match cast_value(value, field.data_kind(), CastFlags::SHALLOW) {
                            Ok(converted) => self.place_value(element, field, converted),
                            Err(original) => {
                                self.offer_component(element, field.name().to_string(), original);
                            }
                        }
                    }
                }
                None => {
                    self.offer_component(element, format!("{field_name_hash}"), value);
                }
            }
        }

        let terminator = self.stream.read_i32()?;
        if terminator != TERMINATOR {
            return Err(ReflectError::DataFormat(
                "unterminated field array block".to_string(),
            ));
        }
        Ok(())
    }

    fn place_value(&mut self, element: &mut dyn Element, field: &Field, value: DataValue) {
        match field.store(element, value) {
            StoreOutcome::Stored => {}
            StoreOutcome::Mismatch(value) => {
                self.offer_component(element, field.name().to_string(), value);
            }
            StoreOutcome::Dropped => {
                log::debug!(
                    "field '{}' matched its shape but rejected the value, discarding",
                    field.name()
                );
            }
        }
    }

    fn offer_component(&mut self, element: &mut dyn Element, name: String, value: DataValue) {
        let kind = value.kind();
        if !element.process_component(&name, value) {
            log::debug!(
                "{} did not process component '{name}' ({kind:?}), discarding",
                element.class_name()
            );
        }
    }

    fn deserialize_data(
        &mut self,
        registry: &Registry,
        kind: DataKind,
        data_end: u64,
    ) -> Result<DataValue, ReflectError> {
        match kind {
            DataKind::Pointer => {
                let target_hash = self.stream.read_u32()?;
                if target_hash == 0 {
                    return Ok(DataValue::Pointer(None));
                }
                let element =
                    self.deserialize_element_with_hash(registry, TypeHash(target_hash))?;
                Ok(DataValue::Pointer(element))
            }
            DataKind::ElementVector => Ok(DataValue::ElementVector(
                self.deserialize_element_block(registry)?,
            )),
            DataKind::ElementSet => Ok(DataValue::ElementSet(
                self.deserialize_element_block(registry)?,
            )),
            DataKind::ElementMap(key_kind) => {
                let count = self.stream.read_i32()?;
                if count < 0 {
                    return Err(ReflectError::DataFormat(format!(
                        "negative map count: {count}"
                    )));
                }
                let mut entries = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    let limit = data_end.saturating_sub(self.stream.position()?);
                    let key = codec::decode_primitive(&mut self.stream, key_kind, limit)?;
                    if let Some(element) = self.deserialize_element(registry)? {
                        entries.push((key, element));
                    }
                }
                Ok(DataValue::ElementMap(key_kind, entries))
            }
            DataKind::TypeIdElementMap => {
                let count = self.stream.read_i32()?;
                if count < 0 {
                    return Err(ReflectError::DataFormat(format!(
                        "negative map count: {count}"
                    )));
                }
                let mut entries = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    let key = TypeHash(self.stream.read_u32()?);
                    if let Some(element) = self.deserialize_element(registry)? {
                        entries.push((key, element));
                    }
                }
                Ok(DataValue::TypeIdElementMap(entries))
            }
            other => {
                let limit = data_end.saturating_sub(self.stream.position()?);
                codec::decode_value(&mut self.stream, other, limit)
            }
        }
    }
}

/// Writes a spool to a fresh stream with the platform byte order.
pub fn to_stream<S: Read + Write + Seek>(
    registry: &Registry,
    spool: &mut [ElementPtr],
    stream: S,
) -> Result<S, ReflectError> {
    let mut archive = BinaryArchive::create(stream, Endian::Little);
    archive.write(registry, spool)?;
    Ok(archive.into_stream())
}

/// Reads a whole spool from a stream.
pub fn from_stream<S: Read + Seek>(
    registry: &Registry,
    stream: S,
) -> Result<Vec<ElementPtr>, ReflectError> {
    let mut archive = BinaryArchive::open(stream);
    archive.read(registry)?;
    Ok(archive.elements())
}

/// Reads a stream decoding only records of the named class (or its
/// derivatives), returning the first match.
pub fn from_stream_search<S: Read + Seek>(
    registry: &Registry,
    stream: S,
    class_name: &str,
) -> Result<Option<ElementPtr>, ReflectError> {
    let mut archive = BinaryArchive::open(stream);
    archive.set_search_class(Some(name_hash(class_name)));
    archive.read(registry)?;
    Ok(archive.elements().into_iter().next())
}

/// Writes a spool to a file.
pub fn to_file(
    registry: &Registry,
    spool: &mut [ElementPtr],
    path: impl AsRef<Path>,
) -> Result<(), ReflectError> {
    let file = std::fs::OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;
    let mut archive = BinaryArchive::create(file, Endian::Little);
    archive.write(registry, spool)
}

/// Reads a whole spool from a file.
pub fn from_file(
    registry: &Registry,
    path: impl AsRef<Path>,
) -> Result<Vec<ElementPtr>, ReflectError> {
    let file = std::fs::File::open(path)?;
    from_stream(registry, file)
}
