//! Struct hydration.
//!
//! Converts decoded PackStream values into domain values and back. Structs
//! with a temporal or spatial tag become typed values; other tags pass
//! through as [`Structure`] with their fields hydrated. A known tag whose
//! fields do not match its layout is kept as [`Unhydratable`] by
//! [`Hydrator::hydrate`], or reported by [`Hydrator::try_hydrate`].

pub mod spatial;
pub mod temporal;
pub mod value;

pub use spatial::{Point, Point2D, Point3D, POINT_2D_TAG, POINT_3D_TAG};
pub use temporal::{Duration, OffsetTime, TemporalValue, Zone};
pub use value::{Structure, Unhydratable, Value};

use std::convert::Infallible;

use thiserror::Error;
use tracing::debug;

use super::config::{BoltConfig, DateTimeEncoding};
use super::packstream::{PackStreamStructure, PackStreamValue};

/// Hydration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HydrationError {
    /// Tag is not handled by the parser it was given to
    #[error("Unknown structure tag: {0}")]
    UnknownTag(String),
    /// Wrong number of fields
    #[error("{type_name} expects {expected} fields, got {actual}")]
    FieldCount {
        type_name: &'static str,
        expected: usize,
        actual: usize,
    },
    /// Field has the wrong PackStream type
    #[error("{type_name} field {index} must be {expected}")]
    FieldType {
        type_name: &'static str,
        index: usize,
        expected: &'static str,
    },
    /// Field value outside the representable range
    #[error("{type_name} out of range: {detail}")]
    OutOfRange {
        type_name: &'static str,
        detail: String,
    },
    /// Zone id not in the IANA database
    #[error("Unknown time zone: {0}")]
    UnknownZone(String),
}

fn is_known_tag(tag: u8) -> bool {
    temporal::is_temporal_tag(tag) || tag == POINT_2D_TAG || tag == POINT_3D_TAG
}

/// Converts between wire values and domain values.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hydrator {
    encoding: DateTimeEncoding,
}

impl Hydrator {
    /// Create a hydrator that writes date-times with `encoding`.
    pub fn new(encoding: DateTimeEncoding) -> Self {
        Self { encoding }
    }

    /// Create from a connection config.
    pub fn from_config(config: &BoltConfig) -> Self {
        Self::new(config.date_time_encoding)
    }

    /// Date-time layout used by [`Self::dehydrate`].
    pub fn date_time_encoding(&self) -> DateTimeEncoding {
        self.encoding
    }

    /// Hydrate, keeping malformed known-tag structs as [`Value::Unhydratable`].
    pub fn hydrate(&self, value: PackStreamValue) -> Value {
        let keep = |raw: PackStreamStructure, error: HydrationError| {
            debug!(tag = %raw.tag_display(), error = %error, "Keeping unhydratable structure");
            Ok::<_, Infallible>(Value::Unhydratable(Unhydratable { raw, error }))
        };
        match self.convert(value, &keep) {
            Ok(v) => v,
            Err(never) => match never {},
        }
    }

    /// Hydrate, failing on the first malformed known-tag struct.
    pub fn try_hydrate(&self, value: PackStreamValue) -> Result<Value, HydrationError> {
        self.convert(value, &|_: PackStreamStructure, error: HydrationError| Err(error))
    }

    fn convert<E, F>(&self, value: PackStreamValue, on_malformed: &F) -> Result<Value, E>
    where
        F: Fn(PackStreamStructure, HydrationError) -> Result<Value, E>,
    {
        Ok(match value {
            PackStreamValue::Null => Value::Null,
            PackStreamValue::Boolean(b) => Value::Boolean(b),
            PackStreamValue::Integer(i) => Value::Integer(i),
            PackStreamValue::Float(f) => Value::Float(f),
            PackStreamValue::Bytes(b) => Value::Bytes(b),
            PackStreamValue::String(s) => Value::String(s),
            PackStreamValue::List(items) => Value::List(
                items
                    .into_iter()
                    .map(|v| self.convert(v, on_malformed))
                    .collect::<Result<_, _>>()?,
            ),
            PackStreamValue::Map(entries) => Value::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| Ok((k, self.convert(v, on_malformed)?)))
                    .collect::<Result<_, E>>()?,
            ),
            PackStreamValue::Structure(s) => self.convert_structure(s, on_malformed)?,
        })
    }

    fn convert_structure<E, F>(&self, s: PackStreamStructure, on_malformed: &F) -> Result<Value, E>
    where
        F: Fn(PackStreamStructure, HydrationError) -> Result<Value, E>,
    {
        if !is_known_tag(s.tag) {
            let fields = s
                .fields
                .into_iter()
                .map(|v| self.convert(v, on_malformed))
                .collect::<Result<_, _>>()?;
            return Ok(Value::Structure(Structure::new(s.tag, fields)));
        }

        let parsed = if temporal::is_temporal_tag(s.tag) {
            TemporalValue::from_structure(&s).map(Value::Temporal)
        } else {
            Point::from_structure(&s).map(Value::Point)
        };

        match parsed {
            Ok(v) => Ok(v),
            Err(e) => on_malformed(s, e),
        }
    }

    /// Convert a domain value to its wire form.
    pub fn dehydrate(&self, value: &Value) -> PackStreamValue {
        match value {
            Value::Null => PackStreamValue::Null,
            Value::Boolean(b) => PackStreamValue::Boolean(*b),
            Value::Integer(i) => PackStreamValue::Integer(*i),
            Value::Float(f) => PackStreamValue::Float(*f),
            Value::Bytes(b) => PackStreamValue::Bytes(b.clone()),
            Value::String(s) => PackStreamValue::String(s.clone()),
            Value::List(items) => {
                PackStreamValue::List(items.iter().map(|v| self.dehydrate(v)).collect())
            }
            Value::Map(entries) => PackStreamValue::Map(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), self.dehydrate(v)))
                    .collect(),
            ),
            Value::Temporal(t) => PackStreamValue::Structure(t.to_structure(self.encoding)),
            Value::Point(p) => PackStreamValue::Structure(p.to_structure()),
            Value::Structure(s) => PackStreamValue::Structure(PackStreamStructure::new(
                s.tag,
                s.fields.iter().map(|v| self.dehydrate(v)).collect(),
            )),
            Value::Unhydratable(u) => PackStreamValue::Structure(u.raw.clone()),
        }
    }
}
