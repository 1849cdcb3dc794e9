//! PackStream serialization format.
//!
//! PackStream is the binary serialization format used by the Bolt protocol
//! to encode values for transmission between client and server.
//!
//! # Supported Types
//!
//! - **Null**: Single byte marker
//! - **Boolean**: True/False markers
//! - **Integer**: Variable-length encoding (-2^63 to 2^63-1)
//! - **Float**: 64-bit IEEE 754
//! - **String**: UTF-8 encoded, variable length prefix
//! - **Bytes**: Raw bytes, variable length prefix
//! - **List**: Heterogeneous collections
//! - **Map**: String keys to arbitrary values
//! - **Structure**: Tag byte plus fields, the extension point for richer types
//!
//! Interpreting structures is left to [`crate::bolt::hydration`]; this layer
//! decodes any tag it is given.

pub mod decoder;
pub mod encoder;
pub mod marker;
pub mod types;

pub use decoder::{decode, decode_message, PackStreamDecoder, DEFAULT_MAX_DEPTH};
pub use encoder::{encode, PackStreamEncoder};
pub use types::{PackStreamStructure, PackStreamValue};

use thiserror::Error;

/// PackStream errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PackStreamError {
    /// Unexpected end of input
    #[error("Unexpected end of PackStream data")]
    UnexpectedEof,
    /// Unknown marker byte
    #[error("Unknown PackStream marker: 0x{0:02X}")]
    UnknownMarker(u8),
    /// Invalid UTF-8 in string
    #[error("Invalid UTF-8 in string: {0}")]
    InvalidUtf8(String),
    /// Invalid map key (must be string)
    #[error("Map keys must be strings")]
    InvalidMapKey,
    /// Value too large to encode
    #[error("{0} too large: {1} entries")]
    ValueTooLarge(&'static str, usize),
    /// Invalid structure format
    #[error("Invalid structure: {0}")]
    InvalidStructure(String),
    /// Nesting deeper than the configured limit
    #[error("Nesting exceeds maximum depth of {0}")]
    DepthExceeded(usize),
    /// Bytes left over after the message value
    #[error("{0} trailing bytes after message value")]
    TrailingBytes(usize),
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn roundtrip(value: &PackStreamValue) -> PackStreamValue {
        let bytes = encode(value).unwrap();
        decode_message(&bytes, DEFAULT_MAX_DEPTH).unwrap()
    }

    #[test]
    fn test_roundtrip_scalars() {
        for value in [
            PackStreamValue::Null,
            PackStreamValue::Boolean(true),
            PackStreamValue::Boolean(false),
            PackStreamValue::Float(-0.5),
            PackStreamValue::Float(f64::MAX),
            PackStreamValue::String(String::new()),
            PackStreamValue::String("y".repeat(70_000)),
            PackStreamValue::Bytes(vec![0u8; 300]),
        ] {
            assert_eq!(roundtrip(&value), value);
        }
    }

    #[test]
    fn test_roundtrip_int_boundaries() {
        for v in [
            0i64, -1, -16, -17, 127, 128, -128, -129, 32767, 32768, -32768, -32769,
            2147483647, 2147483648, -2147483648, -2147483649, i64::MAX, i64::MIN,
        ] {
            let value = PackStreamValue::Integer(v);
            assert_eq!(roundtrip(&value), value, "Failed for {}", v);
        }
    }

    #[test]
    fn test_roundtrip_nested() {
        let mut inner_map = HashMap::new();
        inner_map.insert(
            "items".to_string(),
            PackStreamValue::List(vec![PackStreamValue::Integer(1), PackStreamValue::Null]),
        );
        inner_map.insert(
            "point".to_string(),
            PackStreamValue::Structure(PackStreamStructure::new(
                0x58,
                vec![
                    PackStreamValue::Integer(7203),
                    PackStreamValue::Float(1.0),
                    PackStreamValue::Float(2.0),
                ],
            )),
        );

        let value = PackStreamValue::List(vec![
            PackStreamValue::Map(inner_map.clone()),
            PackStreamValue::Map(inner_map),
            PackStreamValue::List((0..300).map(PackStreamValue::Integer).collect()),
        ]);

        assert_eq!(roundtrip(&value), value);
    }

    fn arb_value() -> impl Strategy<Value = PackStreamValue> {
        let leaf = prop_oneof![
            Just(PackStreamValue::Null),
            any::<bool>().prop_map(PackStreamValue::Boolean),
            any::<i64>().prop_map(PackStreamValue::Integer),
            // NaN never compares equal, so keep to finite floats
            (-1.0e12f64..1.0e12).prop_map(PackStreamValue::Float),
            ".{0,40}".prop_map(PackStreamValue::String),
            proptest::collection::vec(any::<u8>(), 0..64).prop_map(PackStreamValue::Bytes),
        ];
        leaf.prop_recursive(4, 64, 20, |inner| {
            prop_oneof![
                proptest::collection::vec(inner.clone(), 0..20).prop_map(PackStreamValue::List),
                proptest::collection::hash_map(".{0,8}", inner.clone(), 0..20)
                    .prop_map(PackStreamValue::Map),
                (any::<u8>(), proptest::collection::vec(inner, 0..17)).prop_map(
                    |(tag, fields)| {
                        PackStreamValue::Structure(PackStreamStructure::new(tag, fields))
                    }
                ),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_value_roundtrip(value in arb_value()) {
            prop_assert_eq!(roundtrip(&value), value);
        }
    }
}
