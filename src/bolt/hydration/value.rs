//! Hydrated value model.

use std::collections::HashMap;
use std::fmt;

use super::spatial::Point;
use super::temporal::TemporalValue;
use super::HydrationError;
use crate::bolt::packstream::PackStreamStructure;

// ============================================================================
// Value
// ============================================================================

/// A value after struct hydration.
///
/// Equality follows [`TemporalValue`]: date-times compare by instant, so two
/// values at the same moment in different zones are equal. Match on the
/// variant to compare offsets or zones.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null
    Null,
    /// Boolean
    Boolean(bool),
    /// Integer (i64)
    Integer(i64),
    /// Float (f64)
    Float(f64),
    /// Bytes
    Bytes(Vec<u8>),
    /// String
    String(String),
    /// List
    List(Vec<Value>),
    /// Map
    Map(HashMap<String, Value>),
    /// Date, time, date-time or duration
    Temporal(TemporalValue),
    /// Point (2D/3D)
    Point(Point),
    /// Struct with a tag this reader does not interpret
    Structure(Structure),
    /// Struct with a known tag whose fields do not fit the layout
    Unhydratable(Unhydratable),
}

/// A struct kept as tag plus hydrated fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Structure {
    /// Struct tag
    pub tag: u8,
    /// Fields
    pub fields: Vec<Value>,
}

impl Structure {
    /// Create a new structure.
    pub fn new(tag: u8, fields: Vec<Value>) -> Self {
        Self { tag, fields }
    }
}

/// A known-tag struct that failed hydration, kept verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct Unhydratable {
    /// The raw struct, written back unchanged
    pub raw: PackStreamStructure,
    /// Why hydration failed
    pub error: HydrationError,
}

impl Value {
    /// Check for null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get as bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as float. Integers are widened.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Get as string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    /// Get as map.
    pub fn as_map(&self) -> Option<&HashMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Get as temporal value.
    pub fn as_temporal(&self) -> Option<&TemporalValue> {
        match self {
            Value::Temporal(t) => Some(t),
            _ => None,
        }
    }

    /// Get as point.
    pub fn as_point(&self) -> Option<&Point> {
        match self {
            Value::Point(p) => Some(p),
            _ => None,
        }
    }

    /// Get as uninterpreted structure.
    pub fn as_structure(&self) -> Option<&Structure> {
        match self {
            Value::Structure(s) => Some(s),
            _ => None,
        }
    }

    /// Type name for messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Boolean(_) => "Boolean",
            Value::Integer(_) => "Integer",
            Value::Float(_) => "Float",
            Value::Bytes(_) => "Bytes",
            Value::String(_) => "String",
            Value::List(_) => "List",
            Value::Map(_) => "Map",
            Value::Temporal(t) => t.type_name(),
            Value::Point(_) => "Point",
            Value::Structure(_) => "Structure",
            Value::Unhydratable(_) => "Unhydratable",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::List(l) => write!(f, "[{} items]", l.len()),
            Value::Map(m) => write!(f, "{{{} entries}}", m.len()),
            Value::Temporal(t) => match t {
                TemporalValue::Date(d) => write!(f, "{}", d),
                TemporalValue::LocalTime(t) => write!(f, "{}", t),
                TemporalValue::LocalDateTime(dt) => write!(f, "{}", dt),
                TemporalValue::Time(t) => write!(f, "{}", t),
                TemporalValue::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
                TemporalValue::ZonedDateTime(dt) => {
                    write!(f, "{}[{}]", dt.to_rfc3339(), dt.timezone().name())
                }
                TemporalValue::Duration(d) => write!(f, "{}", d),
            },
            Value::Point(p) => write!(f, "Point(srid={})", p.srid()),
            Value::Structure(s) => {
                write!(f, "Structure(0x{:02X}, {} fields)", s.tag, s.fields.len())
            }
            Value::Unhydratable(u) => write!(f, "Unhydratable({})", u.raw.tag_display()),
        }
    }
}

// From implementations
impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<TemporalValue> for Value {
    fn from(v: TemporalValue) -> Self {
        Value::Temporal(v)
    }
}

impl From<Point> for Value {
    fn from(v: Point) -> Self {
        Value::Point(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}
