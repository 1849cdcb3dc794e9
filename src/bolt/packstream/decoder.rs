//! PackStream decoder.

use bytes::Buf;
use std::collections::HashMap;

use super::marker::{Marker, Width};
use super::types::{PackStreamStructure, PackStreamValue};
use super::PackStreamError;

/// Default nesting limit for lists, maps and structures.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// PackStream decoder that reads values from a byte buffer.
///
/// Nesting is bounded by `max_depth` so corrupt or hostile input fails with
/// [`PackStreamError::DepthExceeded`] instead of exhausting the stack.
pub struct PackStreamDecoder<'a> {
    data: &'a [u8],
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl<'a> PackStreamDecoder<'a> {
    /// Create a new decoder for the given bytes.
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_max_depth(data, DEFAULT_MAX_DEPTH)
    }

    /// Create a decoder with a custom nesting limit.
    pub fn with_max_depth(data: &'a [u8], max_depth: usize) -> Self {
        Self {
            data,
            pos: 0,
            depth: 0,
            max_depth,
        }
    }

    /// Get the current position.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Get remaining bytes count.
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Check if all data has been consumed.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Decode the next value.
    pub fn decode(&mut self) -> Result<PackStreamValue, PackStreamError> {
        let marker = self.read_u8()?;

        match Marker::classify(marker) {
            Marker::Null => Ok(PackStreamValue::Null),
            Marker::Boolean(b) => Ok(PackStreamValue::Boolean(b)),
            Marker::Float => Ok(PackStreamValue::Float(self.read_f64()?)),
            Marker::TinyInt(i) => Ok(PackStreamValue::Integer(i as i64)),
            Marker::Int(width) => Ok(PackStreamValue::Integer(self.read_int(width)?)),
            Marker::Bytes(width) => {
                let len = self.read_size(width)?;
                Ok(PackStreamValue::Bytes(self.read_bytes(len)?.to_vec()))
            }
            Marker::TinyString(len) => self.read_string_data(len),
            Marker::String(width) => {
                let len = self.read_size(width)?;
                self.read_string_data(len)
            }
            Marker::TinyList(len) => self.nested(|d| d.read_list_data(len)),
            Marker::List(width) => {
                let len = self.read_size(width)?;
                self.nested(|d| d.read_list_data(len))
            }
            Marker::TinyMap(len) => self.nested(|d| d.read_map_data(len)),
            Marker::Map(width) => {
                let len = self.read_size(width)?;
                self.nested(|d| d.read_map_data(len))
            }
            Marker::TinyStruct(len) => self.nested(|d| d.read_struct_data(len)),
            Marker::Struct(width) => {
                let len = self.read_size(width)?;
                self.nested(|d| d.read_struct_data(len))
            }
            Marker::Reserved(m) => Err(PackStreamError::UnknownMarker(m)),
        }
    }

    /// Run a container read one level deeper, enforcing the depth limit.
    fn nested<F>(&mut self, read: F) -> Result<PackStreamValue, PackStreamError>
    where
        F: FnOnce(&mut Self) -> Result<PackStreamValue, PackStreamError>,
    {
        if self.depth >= self.max_depth {
            return Err(PackStreamError::DepthExceeded(self.max_depth));
        }
        self.depth += 1;
        let result = read(self);
        self.depth -= 1;
        result
    }

    fn read_string_data(&mut self, len: usize) -> Result<PackStreamValue, PackStreamError> {
        let bytes = self.read_bytes(len)?;
        let s = std::str::from_utf8(bytes)
            .map_err(|e| PackStreamError::InvalidUtf8(e.to_string()))?;
        Ok(PackStreamValue::String(s.to_string()))
    }

    fn read_list_data(&mut self, len: usize) -> Result<PackStreamValue, PackStreamError> {
        // Every element takes at least one byte; a larger count is truncated input.
        self.ensure(len)?;
        let mut items = Vec::with_capacity(len);
        for _ in 0..len {
            items.push(self.decode()?);
        }
        Ok(PackStreamValue::List(items))
    }

    fn read_map_data(&mut self, len: usize) -> Result<PackStreamValue, PackStreamError> {
        self.ensure(len.saturating_mul(2))?;
        let mut map = HashMap::with_capacity(len);
        for _ in 0..len {
            let key = match self.decode()? {
                PackStreamValue::String(s) => s,
                _ => return Err(PackStreamError::InvalidMapKey),
            };
            let value = self.decode()?;
            map.insert(key, value);
        }
        Ok(PackStreamValue::Map(map))
    }

    fn read_struct_data(&mut self, field_count: usize) -> Result<PackStreamValue, PackStreamError> {
        let tag = self.read_u8()?;
        self.ensure(field_count)?;
        let mut fields = Vec::with_capacity(field_count);
        for _ in 0..field_count {
            fields.push(self.decode()?);
        }
        Ok(PackStreamValue::Structure(PackStreamStructure::new(tag, fields)))
    }

    // Low-level read methods

    fn ensure(&self, n: usize) -> Result<(), PackStreamError> {
        if self.remaining() < n {
            Err(PackStreamError::UnexpectedEof)
        } else {
            Ok(())
        }
    }

    fn read_int(&mut self, width: Width) -> Result<i64, PackStreamError> {
        let value = match width {
            Width::W8 => self.read_bytes(1)?.get_i8() as i64,
            Width::W16 => self.read_bytes(2)?.get_i16() as i64,
            Width::W32 => self.read_bytes(4)?.get_i32() as i64,
            Width::W64 => self.read_bytes(8)?.get_i64(),
        };
        Ok(value)
    }

    fn read_size(&mut self, width: Width) -> Result<usize, PackStreamError> {
        let size = match width {
            Width::W8 => self.read_u8()? as usize,
            Width::W16 => self.read_bytes(2)?.get_u16() as usize,
            Width::W32 => self.read_bytes(4)?.get_u32() as usize,
            Width::W64 => return Err(PackStreamError::InvalidStructure("64-bit size".into())),
        };
        Ok(size)
    }

    fn read_u8(&mut self) -> Result<u8, PackStreamError> {
        self.ensure(1)?;
        let value = self.data[self.pos];
        self.pos += 1;
        Ok(value)
    }

    fn read_f64(&mut self) -> Result<f64, PackStreamError> {
        Ok(self.read_bytes(8)?.get_f64())
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], PackStreamError> {
        self.ensure(len)?;
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }
}

/// Convenience function to decode a single value from bytes.
pub fn decode(data: &[u8]) -> Result<PackStreamValue, PackStreamError> {
    let mut decoder = PackStreamDecoder::new(data);
    decoder.decode()
}

/// Decode exactly one value spanning the whole buffer.
///
/// A reassembled message holds one value; leftover bytes mean the stream is
/// out of alignment.
pub fn decode_message(data: &[u8], max_depth: usize) -> Result<PackStreamValue, PackStreamError> {
    let mut decoder = PackStreamDecoder::with_max_depth(data, max_depth);
    let value = decoder.decode()?;
    if !decoder.is_empty() {
        return Err(PackStreamError::TrailingBytes(decoder.remaining()));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_null_and_bool() {
        assert!(decode(&[0xC0]).unwrap().is_null());
        assert_eq!(decode(&[0xC3]).unwrap(), PackStreamValue::Boolean(true));
        assert_eq!(decode(&[0xC2]).unwrap(), PackStreamValue::Boolean(false));
    }

    #[test]
    fn test_decode_tiny_int() {
        assert_eq!(decode(&[0x00]).unwrap(), PackStreamValue::Integer(0));
        assert_eq!(decode(&[0x7F]).unwrap(), PackStreamValue::Integer(127));
        assert_eq!(decode(&[0xF0]).unwrap(), PackStreamValue::Integer(-16));
        assert_eq!(decode(&[0xFF]).unwrap(), PackStreamValue::Integer(-1));
    }

    #[test]
    fn test_decode_sized_ints() {
        assert_eq!(decode(&[0xC8, 0xEF]).unwrap(), PackStreamValue::Integer(-17));
        assert_eq!(decode(&[0xC9, 0x03, 0xE8]).unwrap(), PackStreamValue::Integer(1000));
        assert_eq!(
            decode(&[0xCA, 0x00, 0x01, 0x86, 0xA0]).unwrap(),
            PackStreamValue::Integer(100000)
        );
        let data = [0xCB, 0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];
        assert_eq!(decode(&data).unwrap(), PackStreamValue::Integer(i64::MAX));
    }

    #[test]
    fn test_decode_non_minimal_int() {
        // Writers should pick the narrowest width but readers accept any.
        assert_eq!(
            decode(&[0xCB, 0, 0, 0, 0, 0, 0, 0, 0x01]).unwrap(),
            PackStreamValue::Integer(1)
        );
    }

    #[test]
    fn test_decode_float() {
        let data = [0xC1, 0x3F, 0xF1, 0x99, 0x99, 0x99, 0x99, 0x99, 0x9A];
        assert_eq!(decode(&data).unwrap(), PackStreamValue::Float(1.1));
    }

    #[test]
    fn test_decode_strings() {
        assert_eq!(decode(&[0x80]).unwrap(), PackStreamValue::String(String::new()));

        let data = [0x85, b'h', b'e', b'l', b'l', b'o'];
        assert_eq!(decode(&data).unwrap(), PackStreamValue::String("hello".into()));

        let mut data = vec![0xD0, 20];
        data.extend_from_slice(&[b'a'; 20]);
        assert_eq!(decode(&data).unwrap(), PackStreamValue::String("a".repeat(20)));
    }

    #[test]
    fn test_decode_bytes() {
        assert_eq!(
            decode(&[0xCC, 0x03, 1, 2, 3]).unwrap(),
            PackStreamValue::Bytes(vec![1, 2, 3])
        );
    }

    #[test]
    fn test_decode_containers() {
        let value = decode(&[0x93, 1, 2, 3]).unwrap();
        assert_eq!(
            value,
            PackStreamValue::List(vec![
                PackStreamValue::Integer(1),
                PackStreamValue::Integer(2),
                PackStreamValue::Integer(3),
            ])
        );

        let value = decode(&[0xA1, 0x81, b'a', 1]).unwrap();
        assert_eq!(value.as_map().unwrap().get("a"), Some(&PackStreamValue::Integer(1)));

        assert_eq!(decode(&[0x90]).unwrap(), PackStreamValue::List(vec![]));
        assert!(decode(&[0xA0]).unwrap().as_map().unwrap().is_empty());
    }

    #[test]
    fn test_decode_unknown_struct_tag() {
        // Tag 0x01 means nothing to this decoder; the struct still comes back.
        let value = decode(&[0xB2, 0x01, 0x81, b'z', 0x05]).unwrap();
        let s = value.as_structure().unwrap();
        assert_eq!(s.tag, 0x01);
        assert_eq!(
            s.fields,
            vec![PackStreamValue::String("z".into()), PackStreamValue::Integer(5)]
        );
    }

    #[test]
    fn test_decode_struct_8() {
        let mut data = vec![0xDC, 16, 0x7A];
        data.extend_from_slice(&[0xC0; 16]);
        let value = decode(&data).unwrap();
        assert_eq!(value.as_structure().unwrap().len(), 16);
    }

    #[test]
    fn test_decode_unexpected_eof() {
        assert!(matches!(decode(&[0xC9]), Err(PackStreamError::UnexpectedEof)));
        assert!(matches!(decode(&[0x85, b'a']), Err(PackStreamError::UnexpectedEof)));
        assert!(matches!(decode(&[]), Err(PackStreamError::UnexpectedEof)));
        // Size field claims far more elements than bytes present.
        assert!(matches!(
            decode(&[0xD6, 0xFF, 0xFF, 0xFF, 0xFF]),
            Err(PackStreamError::UnexpectedEof)
        ));
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let err = decode(&[0x82, 0xFF, 0xFE]).unwrap_err();
        assert!(matches!(err, PackStreamError::InvalidUtf8(_)));
    }

    #[test]
    fn test_decode_reserved_marker() {
        let err = decode(&[0xC4]).unwrap_err();
        assert!(matches!(err, PackStreamError::UnknownMarker(0xC4)));
    }

    #[test]
    fn test_decode_non_string_map_key() {
        let err = decode(&[0xA1, 0x01, 0x02]).unwrap_err();
        assert!(matches!(err, PackStreamError::InvalidMapKey));
    }

    #[test]
    fn test_depth_limit() {
        // 100 nested single-element lists around a null
        let mut data = vec![0x91; 100];
        data.push(0xC0);
        let err = decode(&data).unwrap_err();
        assert!(matches!(err, PackStreamError::DepthExceeded(DEFAULT_MAX_DEPTH)));

        let mut decoder = PackStreamDecoder::with_max_depth(&data, 128);
        assert!(decoder.decode().is_ok());
    }

    #[test]
    fn test_decode_message_trailing_bytes() {
        assert_eq!(decode_message(&[0x01], 8).unwrap(), PackStreamValue::Integer(1));
        let err = decode_message(&[0x01, 0x02], 8).unwrap_err();
        assert!(matches!(err, PackStreamError::TrailingBytes(1)));
    }

    #[test]
    fn test_decoder_position() {
        let data = [0x01, 0x02, 0x03];
        let mut decoder = PackStreamDecoder::new(&data);
        assert_eq!(decoder.position(), 0);
        assert_eq!(decoder.remaining(), 3);

        decoder.decode().unwrap();
        assert_eq!(decoder.position(), 1);
        assert_eq!(decoder.remaining(), 2);
    }
}
