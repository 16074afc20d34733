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

//! Value casts between data shapes.
//!
//! A cast succeeds when the *value* is representable in the destination
//! type: a `u32` holding 200 casts to `u8`, one holding 70000 does not.
//! This is what lets a schema widen or narrow a field's type and keep
//! reading old archives. The read path always uses [`CastFlags::SHALLOW`],
//! which limits conversion to single primitives; deep casts additionally
//! convert containers element-wise.

use crate::data::value::{DataValue, Primitive};
use crate::data::{DataKind, PrimitiveKind};

bitflags::bitflags! {
    /// Options controlling [`cast_value`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct CastFlags: u32 {
        /// Restrict to primitive-to-primitive casts; containers only pass
        /// through when their kinds already match.
        const SHALLOW = 1 << 0;
    }
}

/// Casts a single primitive to another kind, if the value is representable.
#[must_use]
pub fn cast_primitive(value: Primitive, dest: PrimitiveKind) -> Option<Primitive> {
    if value.kind() == dest {
        return Some(value);
    }
    match value {
        Primitive::U8(v) => cast_unsigned(u64::from(v), dest),
        Primitive::U16(v) => cast_unsigned(u64::from(v), dest),
        Primitive::U32(v) => cast_unsigned(u64::from(v), dest),
        Primitive::U64(v) => cast_unsigned(v, dest),
        Primitive::I8(v) => cast_signed(i64::from(v), dest),
        Primitive::I16(v) => cast_signed(i64::from(v), dest),
        Primitive::I32(v) => cast_signed(i64::from(v), dest),
        Primitive::I64(v) => cast_signed(v, dest),
        Primitive::F32(v) => cast_float(f64::from(v), dest),
        Primitive::F64(v) => cast_float(v, dest),
        Primitive::String(v) => match dest {
            PrimitiveKind::Path => Some(Primitive::Path(v.as_str().into())),
            _ => None,
        },
        Primitive::Path(v) => match dest {
            PrimitiveKind::String => Some(Primitive::String(v.as_str().to_string())),
            _ => None,
        },
        _ => None,
    }
}

fn cast_signed(value: i64, dest: PrimitiveKind) -> Option<Primitive> {
    if value >= 0 {
        // Non-negative values share the unsigned lattice.
        return cast_unsigned(value as u64, dest);
    }
    match dest {
        PrimitiveKind::I8 => i8::try_from(value).ok().map(Primitive::I8),
        PrimitiveKind::I16 => i16::try_from(value).ok().map(Primitive::I16),
        PrimitiveKind::I32 => i32::try_from(value).ok().map(Primitive::I32),
        PrimitiveKind::I64 => Some(Primitive::I64(value)),
        PrimitiveKind::F32 => exact_f32(value as f64).map(Primitive::F32),
        PrimitiveKind::F64 => exact_int_to_f64(value).map(Primitive::F64),
        _ => None,
    }
}

fn cast_unsigned(value: u64, dest: PrimitiveKind) -> Option<Primitive> {
    match dest {
        PrimitiveKind::U8 => u8::try_from(value).ok().map(Primitive::U8),
        PrimitiveKind::I8 => i8::try_from(value).ok().map(Primitive::I8),
        PrimitiveKind::U16 => u16::try_from(value).ok().map(Primitive::U16),
        PrimitiveKind::I16 => i16::try_from(value).ok().map(Primitive::I16),
        PrimitiveKind::U32 => u32::try_from(value).ok().map(Primitive::U32),
        PrimitiveKind::I32 => i32::try_from(value).ok().map(Primitive::I32),
        PrimitiveKind::U64 => Some(Primitive::U64(value)),
        PrimitiveKind::I64 => i64::try_from(value).ok().map(Primitive::I64),
        PrimitiveKind::F32 => exact_f32(value as f64).map(Primitive::F32),
        PrimitiveKind::F64 => exact_uint_to_f64(value).map(Primitive::F64),
        _ => None,
    }
}

fn cast_float(value: f64, dest: PrimitiveKind) -> Option<Primitive> {
    match dest {
        PrimitiveKind::F32 => exact_f32(value).map(Primitive::F32),
        PrimitiveKind::F64 => Some(Primitive::F64(value)),
        PrimitiveKind::U8
        | PrimitiveKind::I8
        | PrimitiveKind::U16
        | PrimitiveKind::I16
        | PrimitiveKind::U32
        | PrimitiveKind::I32
        | PrimitiveKind::U64
        | PrimitiveKind::I64 => {
            if !value.is_finite() || value.fract() != 0.0 {
                return None;
            }
            if value < 0.0 {
                if value < i64::MIN as f64 {
                    return None;
                }
                cast_signed(value as i64, dest)
            } else {
                if value > u64::MAX as f64 {
                    return None;
                }
                cast_unsigned(value as u64, dest)
            }
        }
        _ => None,
    }
}

fn exact_f32(value: f64) -> Option<f32> {
    let narrowed = value as f32;
    if f64::from(narrowed) == value {
        Some(narrowed)
    } else {
        None
    }
}

fn exact_int_to_f64(value: i64) -> Option<f64> {
    let widened = value as f64;
    if widened as i64 == value {
        Some(widened)
    } else {
        None
    }
}

fn exact_uint_to_f64(value: u64) -> Option<f64> {
    let widened = value as f64;
    if widened as u64 == value {
        Some(widened)
    } else {
        None
    }
}

/// Casts a data object to the destination shape.
///
/// Returns the original value in `Err` when the cast is not possible, so
/// the caller can route it on to the component fallback untouched.
pub fn cast_value(
    value: DataValue,
    dest: DataKind,
    flags: CastFlags,
) -> Result<DataValue, DataValue> {
    if value.kind() == dest {
        return Ok(value);
    }

    match value {
        DataValue::Primitive(primitive) => match dest {
            DataKind::Primitive(dest_kind) => {
                match cast_primitive(primitive.clone(), dest_kind) {
                    Some(converted) => Ok(DataValue::Primitive(converted)),
                    None => Err(DataValue::Primitive(primitive)),
                }
            }
            _ => Err(DataValue::Primitive(primitive)),
        },
        value if flags.contains(CastFlags::SHALLOW) => Err(value),
        DataValue::Vector(kind, items) => match dest {
            DataKind::Vector(dest_kind) => cast_items(items, dest_kind)
                .map(|converted| DataValue::Vector(dest_kind, converted))
                .map_err(|original| DataValue::Vector(kind, original)),
            DataKind::Set(dest_kind) => cast_items(items, dest_kind)
                .map(|converted| DataValue::Set(dest_kind, converted))
                .map_err(|original| DataValue::Vector(kind, original)),
            _ => Err(DataValue::Vector(kind, items)),
        },
        DataValue::Set(kind, items) => match dest {
            DataKind::Set(dest_kind) => cast_items(items, dest_kind)
                .map(|converted| DataValue::Set(dest_kind, converted))
                .map_err(|original| DataValue::Set(kind, original)),
            DataKind::Vector(dest_kind) => cast_items(items, dest_kind)
                .map(|converted| DataValue::Vector(dest_kind, converted))
                .map_err(|original| DataValue::Set(kind, original)),
            _ => Err(DataValue::Set(kind, items)),
        },
        DataValue::Map(key_kind, value_kind, entries) => match dest {
            DataKind::Map(dest_key, dest_value) => {
                let mut converted = Vec::with_capacity(entries.len());
                for (key, value) in &entries {
                    let Some(new_key) = cast_primitive(key.clone(), dest_key) else {
                        return Err(DataValue::Map(key_kind, value_kind, entries));
                    };
                    let Some(new_value) = cast_primitive(value.clone(), dest_value) else {
                        return Err(DataValue::Map(key_kind, value_kind, entries));
                    };
                    converted.push((new_key, new_value));
                }
                Ok(DataValue::Map(dest_key, dest_value, converted))
            }
            _ => Err(DataValue::Map(key_kind, value_kind, entries)),
        },
        value => Err(value),
    }
}

fn cast_items(
    items: Vec<Primitive>,
    dest: PrimitiveKind,
) -> Result<Vec<Primitive>, Vec<Primitive>> {
    let mut converted = Vec::with_capacity(items.len());
    for item in &items {
        match cast_primitive(item.clone(), dest) {
            Some(value) => converted.push(value),
            None => return Err(items),
        }
    }
    Ok(converted)
}
