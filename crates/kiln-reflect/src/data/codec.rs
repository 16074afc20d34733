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

//! Wire codecs for the non-record data shapes.
//!
//! Primitives are raw bytes in the archive's byte order; strings are
//! length-prefixed in the archive's encoding; containers are
//! count-prefixed. Shapes that hold nested records are framed by the
//! archive engine itself, because each record carries its own class tag
//! and length; this module never sees them.

use crate::archive::stream::ArchiveStream;
use crate::data::value::{DataValue, Primitive};
use crate::data::{DataKind, PrimitiveKind};
use crate::error::ReflectError;
use crate::ids::{Guid, Tuid};
use crate::math::{
    Color3, Color4, HdrColor3, HdrColor4, Matrix3, Matrix4, Vector2, Vector3, Vector4,
};
use std::io::{Read, Write};

/// The minimum encoded size of one value of a kind, used to sanity-check
/// container counts against the bytes actually remaining in a record.
const fn min_encoded_size(kind: PrimitiveKind) -> u64 {
    match kind {
        PrimitiveKind::Bool | PrimitiveKind::U8 | PrimitiveKind::I8 => 1,
        PrimitiveKind::U16 | PrimitiveKind::I16 => 2,
        PrimitiveKind::U32
        | PrimitiveKind::I32
        | PrimitiveKind::F32
        | PrimitiveKind::String
        | PrimitiveKind::Path => 4,
        PrimitiveKind::U64 | PrimitiveKind::I64 | PrimitiveKind::F64 | PrimitiveKind::Tuid => 8,
        PrimitiveKind::Guid => 16,
        PrimitiveKind::Vector2 => 8,
        PrimitiveKind::Vector3 => 12,
        PrimitiveKind::Vector4 => 16,
        PrimitiveKind::Matrix3 => 36,
        PrimitiveKind::Matrix4 => 64,
        PrimitiveKind::Color3 => 3,
        PrimitiveKind::Color4 => 4,
        PrimitiveKind::HdrColor3 => 7,
        PrimitiveKind::HdrColor4 => 8,
    }
}

/// Reads a container count and validates it against the remaining bytes.
fn read_count<S: Read>(
    stream: &mut ArchiveStream<S>,
    per_entry: u64,
    limit: u64,
) -> Result<usize, ReflectError> {
    let count = stream.read_i32()?;
    if count < 0 {
        return Err(ReflectError::DataFormat(format!(
            "negative container count: {count}"
        )));
    }
    let count = count as u64;
    if count.saturating_mul(per_entry) > limit.saturating_sub(4) {
        return Err(ReflectError::DataFormat(format!(
            "container of {count} entries exceeds the {limit} bytes remaining"
        )));
    }
    Ok(count as usize)
}

/// Writes one primitive.
pub(crate) fn encode_primitive<S: Write>(
    stream: &mut ArchiveStream<S>,
    value: &Primitive,
) -> Result<(), ReflectError> {
    match value {
        Primitive::Bool(v) => stream.write_u8(u8::from(*v)),
        Primitive::U8(v) => stream.write_u8(*v),
        Primitive::I8(v) => stream.write_u8(*v as u8),
        Primitive::U16(v) => stream.write_u16(*v),
        Primitive::I16(v) => stream.write_u16(*v as u16),
        Primitive::U32(v) => stream.write_u32(*v),
        Primitive::I32(v) => stream.write_i32(*v),
        Primitive::U64(v) => stream.write_u64(*v),
        Primitive::I64(v) => stream.write_i64(*v),
        Primitive::F32(v) => stream.write_f32(*v),
        Primitive::F64(v) => stream.write_f64(*v),
        Primitive::String(v) => stream.write_string(v),
        Primitive::Path(v) => stream.write_string(v.as_str()),
        Primitive::Guid(v) => stream.write_all(v.as_bytes()),
        Primitive::Tuid(v) => stream.write_u64(v.0),
        Primitive::Vector2(v) => encode_f32s(stream, &[v.x, v.y]),
        Primitive::Vector3(v) => encode_f32s(stream, &[v.x, v.y, v.z]),
        Primitive::Vector4(v) => encode_f32s(stream, &[v.x, v.y, v.z, v.w]),
        Primitive::Matrix3(v) => encode_f32s(stream, &v.elements),
        Primitive::Matrix4(v) => encode_f32s(stream, &v.elements),
        Primitive::Color3(v) => stream.write_all(&[v.r, v.g, v.b]),
        Primitive::Color4(v) => stream.write_all(&[v.r, v.g, v.b, v.a]),
        Primitive::HdrColor3(v) => {
            stream.write_all(&[v.color.r, v.color.g, v.color.b])?;
            stream.write_f32(v.intensity)
        }
        Primitive::HdrColor4(v) => {
            stream.write_all(&[v.color.r, v.color.g, v.color.b, v.color.a])?;
            stream.write_f32(v.intensity)
        }
    }
}

fn encode_f32s<S: Write>(
    stream: &mut ArchiveStream<S>,
    values: &[f32],
) -> Result<(), ReflectError> {
    for value in values {
        stream.write_f32(*value)?;
    }
    Ok(())
}

/// Reads one primitive of a known kind.
pub(crate) fn decode_primitive<S: Read>(
    stream: &mut ArchiveStream<S>,
    kind: PrimitiveKind,
    limit: u64,
) -> Result<Primitive, ReflectError> {
    Ok(match kind {
        PrimitiveKind::Bool => match stream.read_u8()? {
            0 => Primitive::Bool(false),
            1 => Primitive::Bool(true),
            other => {
                return Err(ReflectError::DataFormat(format!(
                    "invalid boolean byte: {other}"
                )))
            }
        },
        PrimitiveKind::U8 => Primitive::U8(stream.read_u8()?),
        PrimitiveKind::I8 => Primitive::I8(stream.read_u8()? as i8),
        PrimitiveKind::U16 => Primitive::U16(stream.read_u16()?),
        PrimitiveKind::I16 => Primitive::I16(stream.read_u16()? as i16),
        PrimitiveKind::U32 => Primitive::U32(stream.read_u32()?),
        PrimitiveKind::I32 => Primitive::I32(stream.read_i32()?),
        PrimitiveKind::U64 => Primitive::U64(stream.read_u64()?),
        PrimitiveKind::I64 => Primitive::I64(stream.read_i64()?),
        PrimitiveKind::F32 => Primitive::F32(stream.read_f32()?),
        PrimitiveKind::F64 => Primitive::F64(stream.read_f64()?),
        PrimitiveKind::String => Primitive::String(stream.read_string(limit)?),
        PrimitiveKind::Path => Primitive::Path(stream.read_string(limit)?.as_str().into()),
        PrimitiveKind::Guid => {
            let mut bytes = [0u8; 16];
            stream.read_exact(&mut bytes)?;
            Primitive::Guid(Guid::from_bytes(bytes))
        }
        PrimitiveKind::Tuid => Primitive::Tuid(Tuid(stream.read_u64()?)),
        PrimitiveKind::Vector2 => {
            Primitive::Vector2(Vector2::new(stream.read_f32()?, stream.read_f32()?))
        }
        PrimitiveKind::Vector3 => Primitive::Vector3(Vector3::new(
            stream.read_f32()?,
            stream.read_f32()?,
            stream.read_f32()?,
        )),
        PrimitiveKind::Vector4 => Primitive::Vector4(Vector4::new(
            stream.read_f32()?,
            stream.read_f32()?,
            stream.read_f32()?,
            stream.read_f32()?,
        )),
        PrimitiveKind::Matrix3 => {
            let mut elements = [0.0f32; 9];
            for element in &mut elements {
                *element = stream.read_f32()?;
            }
            Primitive::Matrix3(Matrix3::from_elements(elements))
        }
        PrimitiveKind::Matrix4 => {
            let mut elements = [0.0f32; 16];
            for element in &mut elements {
                *element = stream.read_f32()?;
            }
            Primitive::Matrix4(Matrix4::from_elements(elements))
        }
        PrimitiveKind::Color3 => {
            let mut channels = [0u8; 3];
            stream.read_exact(&mut channels)?;
            Primitive::Color3(Color3::new(channels[0], channels[1], channels[2]))
        }
        PrimitiveKind::Color4 => {
            let mut channels = [0u8; 4];
            stream.read_exact(&mut channels)?;
            Primitive::Color4(Color4::new(
                channels[0],
                channels[1],
                channels[2],
                channels[3],
            ))
        }
        PrimitiveKind::HdrColor3 => {
            let mut channels = [0u8; 3];
            stream.read_exact(&mut channels)?;
            let intensity = stream.read_f32()?;
            Primitive::HdrColor3(HdrColor3::new(
                channels[0],
                channels[1],
                channels[2],
                intensity,
            ))
        }
        PrimitiveKind::HdrColor4 => {
            let mut channels = [0u8; 4];
            stream.read_exact(&mut channels)?;
            let intensity = stream.read_f32()?;
            Primitive::HdrColor4(HdrColor4::new(
                channels[0],
                channels[1],
                channels[2],
                channels[3],
                intensity,
            ))
        }
    })
}

/// Writes one non-record data object's payload.
///
/// Record-bearing shapes are framed by the archive engine; passing one
/// here is a programming error inside the crate.
pub(crate) fn encode_value<S: Write>(
    stream: &mut ArchiveStream<S>,
    value: &DataValue,
) -> Result<(), ReflectError> {
    match value {
        DataValue::Primitive(primitive) => encode_primitive(stream, primitive),
        DataValue::Vector(_, items) | DataValue::Set(_, items) => {
            stream.write_i32(items.len() as i32)?;
            for item in items {
                encode_primitive(stream, item)?;
            }
            Ok(())
        }
        DataValue::Map(_, _, entries) => {
            stream.write_i32(entries.len() as i32)?;
            for (key, entry) in entries {
                encode_primitive(stream, key)?;
                encode_primitive(stream, entry)?;
            }
            Ok(())
        }
        DataValue::TypeId(hash) => stream.write_u32(hash.0),
        DataValue::Enumeration(label) => stream.write_string(label),
        DataValue::Bitfield(labels) => {
            stream.write_i32(labels.len() as i32)?;
            for label in labels {
                stream.write_string(label)?;
            }
            Ok(())
        }
        other => Err(ReflectError::Logic(format!(
            "record-bearing value {:?} routed to the primitive codec",
            other.kind()
        ))),
    }
}

/// Reads one non-record data object's payload, given the shape the stream
/// declared and the bytes remaining in the enclosing record.
pub(crate) fn decode_value<S: Read>(
    stream: &mut ArchiveStream<S>,
    kind: DataKind,
    limit: u64,
) -> Result<DataValue, ReflectError> {
    match kind {
        DataKind::Primitive(primitive_kind) => Ok(DataValue::Primitive(decode_primitive(
            stream,
            primitive_kind,
            limit,
        )?)),
        DataKind::Vector(element_kind) | DataKind::Set(element_kind) => {
            let count = read_count(stream, min_encoded_size(element_kind), limit)?;
            let mut items = Vec::with_capacity(count);
            let mut remaining = limit.saturating_sub(4);
            for _ in 0..count {
                items.push(decode_primitive(stream, element_kind, remaining)?);
                remaining = remaining.saturating_sub(min_encoded_size(element_kind));
            }
            Ok(match kind {
                DataKind::Set(_) => DataValue::Set(element_kind, items),
                _ => DataValue::Vector(element_kind, items),
            })
        }
        DataKind::Map(key_kind, value_kind) => {
            let per_entry = min_encoded_size(key_kind) + min_encoded_size(value_kind);
            let count = read_count(stream, per_entry, limit)?;
            let mut entries = Vec::with_capacity(count);
            let mut remaining = limit.saturating_sub(4);
            for _ in 0..count {
                let key = decode_primitive(stream, key_kind, remaining)?;
                let value = decode_primitive(stream, value_kind, remaining)?;
                remaining = remaining.saturating_sub(per_entry);
                entries.push((key, value));
            }
            Ok(DataValue::Map(key_kind, value_kind, entries))
        }
        DataKind::TypeId => Ok(DataValue::TypeId(crate::hash::TypeHash(stream.read_u32()?))),
        DataKind::Enumeration => Ok(DataValue::Enumeration(stream.read_string(limit)?)),
        DataKind::Bitfield => {
            let count = read_count(stream, 4, limit)?;
            let mut labels = Vec::with_capacity(count);
            for _ in 0..count {
                labels.push(stream.read_string(limit)?);
            }
            Ok(DataValue::Bitfield(labels))
        }
        other => Err(ReflectError::Logic(format!(
            "record-bearing shape {other:?} routed to the primitive codec"
        ))),
    }
}
