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

//! Endianness- and encoding-aware primitive I/O over a byte stream.
//!
//! Every multi-byte field in an archive honors the byte order fixed at open
//! time by the BOM, and every string honors the declared character
//! encoding. [`ArchiveStream`] is the single place those two decisions
//! live; everything above it reads and writes typed values.

use crate::error::ReflectError;
use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Seek, SeekFrom, Write};

/// The byte order of an archive, fixed when the stream is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endian {
    /// Least-significant byte first.
    #[default]
    Little,
    /// Most-significant byte first.
    Big,
}

/// The character encoding of an archive's strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// One byte per unit; the writer's native encoding.
    #[default]
    Ascii,
    /// Two bytes per unit, in the archive's byte order.
    Utf16,
}

impl Encoding {
    /// Decodes the header byte.
    #[must_use]
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Encoding::Ascii),
            1 => Some(Encoding::Utf16),
            _ => None,
        }
    }

    /// The header byte for this encoding.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        match self {
            Encoding::Ascii => 0,
            Encoding::Utf16 => 1,
        }
    }
}

macro_rules! impl_stream_read {
    ($name:ident, $ty:ty, $method:ident) => {
        /// Reads one value in the stream's byte order.
        pub fn $name(&mut self) -> Result<$ty, ReflectError> {
            let value = match self.endian {
                Endian::Little => self.inner.$method::<LittleEndian>()?,
                Endian::Big => self.inner.$method::<BigEndian>()?,
            };
            Ok(value)
        }
    };
}

macro_rules! impl_stream_write {
    ($name:ident, $ty:ty, $method:ident) => {
        /// Writes one value in the stream's byte order.
        pub fn $name(&mut self, value: $ty) -> Result<(), ReflectError> {
            match self.endian {
                Endian::Little => self.inner.$method::<LittleEndian>(value)?,
                Endian::Big => self.inner.$method::<BigEndian>(value)?,
            }
            Ok(())
        }
    };
}

/// A byte stream with a fixed byte order and string encoding.
#[derive(Debug)]
pub struct ArchiveStream<S> {
    inner: S,
    endian: Endian,
    encoding: Encoding,
}

impl<S> ArchiveStream<S> {
    /// Wraps a stream with the given byte order and the default encoding.
    pub fn new(inner: S, endian: Endian) -> Self {
        Self {
            inner,
            endian,
            encoding: Encoding::Ascii,
        }
    }

    /// The stream's byte order.
    #[must_use]
    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Switches byte order; used when a reversed BOM is read.
    pub fn set_endian(&mut self, endian: Endian) {
        self.endian = endian;
    }

    /// The stream's string encoding.
    #[must_use]
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Switches string encoding; set from the header on read.
    pub fn set_encoding(&mut self, encoding: Encoding) {
        self.encoding = encoding;
    }

    /// Releases the underlying stream.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: Read> ArchiveStream<S> {
    /// Reads one byte.
    pub fn read_u8(&mut self) -> Result<u8, ReflectError> {
        Ok(self.inner.read_u8()?)
    }

    impl_stream_read!(read_u16, u16, read_u16);
    impl_stream_read!(read_u32, u32, read_u32);
    impl_stream_read!(read_i32, i32, read_i32);
    impl_stream_read!(read_u64, u64, read_u64);
    impl_stream_read!(read_i64, i64, read_i64);

    /// Reads one `f32` by bit pattern.
    pub fn read_f32(&mut self) -> Result<f32, ReflectError> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    /// Reads one `f64` by bit pattern.
    pub fn read_f64(&mut self) -> Result<f64, ReflectError> {
        Ok(f64::from_bits(self.read_u64()?))
    }

    /// Fills `buf` exactly.
    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), ReflectError> {
        Ok(self.inner.read_exact(buf)?)
    }

    /// Reads up to `buf.len()` bytes, returning 0 at end of stream.
    pub fn read_block(&mut self, buf: &mut [u8]) -> Result<usize, ReflectError> {
        Ok(self.inner.read(buf)?)
    }

    /// Reads a length-prefixed string in the stream's encoding.
    ///
    /// `limit` bounds the number of payload bytes the string may claim;
    /// a longer prefix is structural corruption.
    pub fn read_string(&mut self, limit: u64) -> Result<String, ReflectError> {
        let count = self.read_u32()? as u64;
        let unit = match self.encoding {
            Encoding::Ascii => 1,
            Encoding::Utf16 => 2,
        };
        if count.saturating_mul(unit) > limit {
            return Err(ReflectError::DataFormat(format!(
                "string length {count} exceeds the {limit} bytes remaining"
            )));
        }
        match self.encoding {
            Encoding::Ascii => {
                let mut bytes = vec![0u8; count as usize];
                self.read_exact(&mut bytes)?;
                String::from_utf8(bytes).map_err(|err| {
                    ReflectError::DataFormat(format!("string payload is not valid UTF-8: {err}"))
                })
            }
            Encoding::Utf16 => {
                let mut units = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    units.push(self.read_u16()?);
                }
                String::from_utf16(&units).map_err(|err| {
                    ReflectError::DataFormat(format!("string payload is not valid UTF-16: {err}"))
                })
            }
        }
    }
}

impl<S: Write> ArchiveStream<S> {
    /// Writes one byte.
    pub fn write_u8(&mut self, value: u8) -> Result<(), ReflectError> {
        Ok(self.inner.write_u8(value)?)
    }

    impl_stream_write!(write_u16, u16, write_u16);
    impl_stream_write!(write_u32, u32, write_u32);
    impl_stream_write!(write_i32, i32, write_i32);
    impl_stream_write!(write_u64, u64, write_u64);
    impl_stream_write!(write_i64, i64, write_i64);

    /// Writes one `f32` by bit pattern.
    pub fn write_f32(&mut self, value: f32) -> Result<(), ReflectError> {
        self.write_u32(value.to_bits())
    }

    /// Writes one `f64` by bit pattern.
    pub fn write_f64(&mut self, value: f64) -> Result<(), ReflectError> {
        self.write_u64(value.to_bits())
    }

    /// Writes raw bytes.
    pub fn write_all(&mut self, bytes: &[u8]) -> Result<(), ReflectError> {
        Ok(self.inner.write_all(bytes)?)
    }

    /// Writes a length-prefixed string in the stream's encoding.
    pub fn write_string(&mut self, text: &str) -> Result<(), ReflectError> {
        match self.encoding {
            Encoding::Ascii => {
                let bytes = text.as_bytes();
                self.write_u32(bytes.len() as u32)?;
                self.write_all(bytes)
            }
            Encoding::Utf16 => {
                let units: Vec<u16> = text.encode_utf16().collect();
                self.write_u32(units.len() as u32)?;
                for unit in units {
                    self.write_u16(unit)?;
                }
                Ok(())
            }
        }
    }

    /// Flushes the underlying stream.
    pub fn flush(&mut self) -> Result<(), ReflectError> {
        Ok(self.inner.flush()?)
    }
}

impl<S: Seek> ArchiveStream<S> {
    /// The current stream position.
    pub fn position(&mut self) -> Result<u64, ReflectError> {
        Ok(self.inner.stream_position()?)
    }

    /// Seeks to an absolute position.
    pub fn seek_to(&mut self, position: u64) -> Result<(), ReflectError> {
        self.inner.seek(SeekFrom::Start(position))?;
        Ok(())
    }

    /// Seeks relative to the current position.
    pub fn seek_by(&mut self, offset: i64) -> Result<(), ReflectError> {
        self.inner.seek(SeekFrom::Current(offset))?;
        Ok(())
    }

    /// Seeks to the end of the stream, returning its length.
    pub fn seek_end(&mut self) -> Result<u64, ReflectError> {
        Ok(self.inner.seek(SeekFrom::End(0))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn values_round_trip_in_both_byte_orders() {
        for endian in [Endian::Little, Endian::Big] {
            let mut stream = ArchiveStream::new(Cursor::new(Vec::new()), endian);
            stream.write_u16(0xFEFF).unwrap();
            stream.write_u32(0x1234_5678).unwrap();
            stream.write_i32(-42).unwrap();
            stream.write_f64(6.25).unwrap();
            stream.write_string("kiln").unwrap();

            let mut buffer = stream.into_inner();
            buffer.set_position(0);
            let mut reader = ArchiveStream::new(buffer, endian);
            assert_eq!(reader.read_u16().unwrap(), 0xFEFF);
            assert_eq!(reader.read_u32().unwrap(), 0x1234_5678);
            assert_eq!(reader.read_i32().unwrap(), -42);
            assert_eq!(reader.read_f64().unwrap(), 6.25);
            assert_eq!(reader.read_string(64).unwrap(), "kiln");
        }
    }

    #[test]
    fn byte_orders_produce_mirrored_bytes() {
        let mut little = ArchiveStream::new(Cursor::new(Vec::new()), Endian::Little);
        little.write_u32(0x0102_0304).unwrap();
        let mut big = ArchiveStream::new(Cursor::new(Vec::new()), Endian::Big);
        big.write_u32(0x0102_0304).unwrap();

        assert_eq!(little.into_inner().into_inner(), vec![4, 3, 2, 1]);
        assert_eq!(big.into_inner().into_inner(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn oversized_string_prefix_is_a_format_error() {
        let mut stream = ArchiveStream::new(Cursor::new(Vec::new()), Endian::Little);
        stream.write_u32(1_000_000).unwrap();
        let mut buffer = stream.into_inner();
        buffer.set_position(0);

        let mut reader = ArchiveStream::new(buffer, Endian::Little);
        let err = reader.read_string(16).unwrap_err();
        assert!(matches!(err, ReflectError::DataFormat(_)));
    }

    #[test]
    fn utf16_strings_round_trip() {
        let mut stream = ArchiveStream::new(Cursor::new(Vec::new()), Endian::Big);
        stream.set_encoding(Encoding::Utf16);
        stream.write_string("naïve").unwrap();

        let mut buffer = stream.into_inner();
        buffer.set_position(0);
        let mut reader = ArchiveStream::new(buffer, Endian::Big);
        reader.set_encoding(Encoding::Utf16);
        assert_eq!(reader.read_string(64).unwrap(), "naïve");
    }
}
