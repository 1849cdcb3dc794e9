//! PackStream marker bytes.
//!
//! Every encoded value starts with one marker byte. Small integers and short
//! containers fold their value or size into the marker itself; everything else
//! is followed by an explicit 8/16/32-bit size field.

/// Null marker
pub const NULL: u8 = 0xC0;

/// Float marker (64-bit IEEE 754, big-endian)
pub const FLOAT_64: u8 = 0xC1;

/// Boolean markers
pub const FALSE: u8 = 0xC2;
pub const TRUE: u8 = 0xC3;

/// Integer markers.
/// Tiny integers (-16 to 127) are the marker byte itself.
pub const TINY_INT_MIN: i64 = -16;
pub const TINY_INT_MAX: i64 = 127;
pub const INT_8: u8 = 0xC8;
pub const INT_16: u8 = 0xC9;
pub const INT_32: u8 = 0xCA;
pub const INT_64: u8 = 0xCB;

/// Bytes markers
pub const BYTES_8: u8 = 0xCC;
pub const BYTES_16: u8 = 0xCD;
pub const BYTES_32: u8 = 0xCE;

/// String markers.
/// Tiny strings (0-15 bytes) use 0x80-0x8F.
pub const TINY_STRING_BASE: u8 = 0x80;
pub const STRING_8: u8 = 0xD0;
pub const STRING_16: u8 = 0xD1;
pub const STRING_32: u8 = 0xD2;

/// List markers.
/// Tiny lists (0-15 elements) use 0x90-0x9F.
pub const TINY_LIST_BASE: u8 = 0x90;
pub const LIST_8: u8 = 0xD4;
pub const LIST_16: u8 = 0xD5;
pub const LIST_32: u8 = 0xD6;

/// Map markers.
/// Tiny maps (0-15 entries) use 0xA0-0xAF.
pub const TINY_MAP_BASE: u8 = 0xA0;
pub const MAP_8: u8 = 0xD8;
pub const MAP_16: u8 = 0xD9;
pub const MAP_32: u8 = 0xDA;

/// Structure markers.
/// Tiny structures (0-15 fields) use 0xB0-0xBF.
pub const TINY_STRUCT_BASE: u8 = 0xB0;
pub const STRUCT_8: u8 = 0xDC;
pub const STRUCT_16: u8 = 0xDD;

/// Largest size that fits in a tiny marker's low nibble.
pub const TINY_MAX_LEN: usize = 15;

/// The marker family a byte belongs to.
///
/// Tiny families carry their inline size; the sized families say how wide
/// the explicit size field that follows is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Null,
    Boolean(bool),
    Float,
    TinyInt(i8),
    Int(Width),
    Bytes(Width),
    TinyString(usize),
    String(Width),
    TinyList(usize),
    List(Width),
    TinyMap(usize),
    Map(Width),
    TinyStruct(usize),
    Struct(Width),
    Reserved(u8),
}

/// Width of an explicit integer or size field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    W8,
    W16,
    W32,
    W64,
}

impl Marker {
    /// Classify a marker byte.
    pub fn classify(byte: u8) -> Self {
        match byte {
            0x00..=0x7F | 0xF0..=0xFF => Marker::TinyInt(byte as i8),
            0x80..=0x8F => Marker::TinyString(low_nibble(byte)),
            0x90..=0x9F => Marker::TinyList(low_nibble(byte)),
            0xA0..=0xAF => Marker::TinyMap(low_nibble(byte)),
            0xB0..=0xBF => Marker::TinyStruct(low_nibble(byte)),
            NULL => Marker::Null,
            FLOAT_64 => Marker::Float,
            FALSE => Marker::Boolean(false),
            TRUE => Marker::Boolean(true),
            INT_8 => Marker::Int(Width::W8),
            INT_16 => Marker::Int(Width::W16),
            INT_32 => Marker::Int(Width::W32),
            INT_64 => Marker::Int(Width::W64),
            BYTES_8 => Marker::Bytes(Width::W8),
            BYTES_16 => Marker::Bytes(Width::W16),
            BYTES_32 => Marker::Bytes(Width::W32),
            STRING_8 => Marker::String(Width::W8),
            STRING_16 => Marker::String(Width::W16),
            STRING_32 => Marker::String(Width::W32),
            LIST_8 => Marker::List(Width::W8),
            LIST_16 => Marker::List(Width::W16),
            LIST_32 => Marker::List(Width::W32),
            MAP_8 => Marker::Map(Width::W8),
            MAP_16 => Marker::Map(Width::W16),
            MAP_32 => Marker::Map(Width::W32),
            STRUCT_8 => Marker::Struct(Width::W8),
            STRUCT_16 => Marker::Struct(Width::W16),
            other => Marker::Reserved(other),
        }
    }
}

#[inline]
fn low_nibble(byte: u8) -> usize {
    (byte & 0x0F) as usize
}

/// Check if an integer can be encoded as a tiny int
#[inline]
pub fn can_encode_tiny_int(value: i64) -> bool {
    (TINY_INT_MIN..=TINY_INT_MAX).contains(&value)
}
