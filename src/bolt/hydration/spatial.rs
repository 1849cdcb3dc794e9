//! Spatial structures.

use super::temporal::Fields;
use super::HydrationError;
use crate::bolt::packstream::{PackStreamStructure, PackStreamValue};

/// 2D point: srid, x, y
pub const POINT_2D_TAG: u8 = 0x58; // 'X'
/// 3D point: srid, x, y, z
pub const POINT_3D_TAG: u8 = 0x59; // 'Y'

/// 2D point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2D {
    /// Spatial Reference System Identifier
    pub srid: u32,
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

/// 3D point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point3D {
    /// Spatial Reference System Identifier
    pub srid: u32,
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
    /// Z coordinate
    pub z: f64,
}

/// A point in either dimension.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Point {
    /// Two coordinates
    TwoD(Point2D),
    /// Three coordinates
    ThreeD(Point3D),
}

impl Point {
    /// Spatial reference id.
    pub fn srid(&self) -> u32 {
        match self {
            Point::TwoD(p) => p.srid,
            Point::ThreeD(p) => p.srid,
        }
    }

    /// Convert to the wire structure.
    pub fn to_structure(&self) -> PackStreamStructure {
        match self {
            Point::TwoD(p) => PackStreamStructure::new(
                POINT_2D_TAG,
                vec![
                    PackStreamValue::Integer(p.srid as i64),
                    PackStreamValue::Float(p.x),
                    PackStreamValue::Float(p.y),
                ],
            ),
            Point::ThreeD(p) => PackStreamStructure::new(
                POINT_3D_TAG,
                vec![
                    PackStreamValue::Integer(p.srid as i64),
                    PackStreamValue::Float(p.x),
                    PackStreamValue::Float(p.y),
                    PackStreamValue::Float(p.z),
                ],
            ),
        }
    }

    /// Parse from a wire structure.
    pub fn from_structure(s: &PackStreamStructure) -> Result<Self, HydrationError> {
        match s.tag {
            POINT_2D_TAG => {
                let f = Fields::new(s, "Point2D", 3)?;
                Ok(Point::TwoD(Point2D {
                    srid: srid(f.int(0)?)?,
                    x: f.float(1)?,
                    y: f.float(2)?,
                }))
            }
            POINT_3D_TAG => {
                let f = Fields::new(s, "Point3D", 4)?;
                Ok(Point::ThreeD(Point3D {
                    srid: srid(f.int(0)?)?,
                    x: f.float(1)?,
                    y: f.float(2)?,
                    z: f.float(3)?,
                }))
            }
            _ => Err(HydrationError::UnknownTag(s.tag_display())),
        }
    }
}

fn srid(value: i64) -> Result<u32, HydrationError> {
    u32::try_from(value).map_err(|_| HydrationError::OutOfRange {
        type_name: "Point",
        detail: format!("srid {}", value),
    })
}
