//! Geometry kinds stored in spatial columns.

use crate::error::{CodecError, Result};
use geo_types::Geometry;
use std::fmt;
use std::str::FromStr;

/// Declared geometry type of a spatial column.
///
/// Assigned once per column when the table is created and recorded in the
/// metadata catalog under its [`name`](GeometryKind::name).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GeometryKind {
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
    /// Any geometry; the column accepts every kind.
    Geometry,
    GeometryCollection,
}

/// Misspelled collection name written by older catalogs.
const LEGACY_COLLECTION_NAME: &str = "GEOMETRYCOLLETION";

impl GeometryKind {
    /// All kinds, in type-code order.
    pub const ALL: [GeometryKind; 8] = [
        GeometryKind::Point,
        GeometryKind::MultiPoint,
        GeometryKind::LineString,
        GeometryKind::MultiLineString,
        GeometryKind::Polygon,
        GeometryKind::MultiPolygon,
        GeometryKind::Geometry,
        GeometryKind::GeometryCollection,
    ];

    /// Classify a geo-types geometry.
    ///
    /// Primitives with no independent wire form are reported as the kind
    /// they are written as: `Line` is a line string, `Rect` and `Triangle`
    /// are polygons.
    pub fn of(geom: &Geometry<f64>) -> Self {
        match geom {
            Geometry::Point(_) => GeometryKind::Point,
            Geometry::Line(_) | Geometry::LineString(_) => GeometryKind::LineString,
            Geometry::Polygon(_) | Geometry::Rect(_) | Geometry::Triangle(_) => {
                GeometryKind::Polygon
            }
            Geometry::MultiPoint(_) => GeometryKind::MultiPoint,
            Geometry::MultiLineString(_) => GeometryKind::MultiLineString,
            Geometry::MultiPolygon(_) => GeometryKind::MultiPolygon,
            Geometry::GeometryCollection(_) => GeometryKind::GeometryCollection,
        }
    }

    /// Upper-case type name as written in DDL and the catalog.
    pub fn name(&self) -> &'static str {
        match self {
            GeometryKind::Point => "POINT",
            GeometryKind::LineString => "LINESTRING",
            GeometryKind::Polygon => "POLYGON",
            GeometryKind::MultiPoint => "MULTIPOINT",
            GeometryKind::MultiLineString => "MULTILINESTRING",
            GeometryKind::MultiPolygon => "MULTIPOLYGON",
            GeometryKind::Geometry => "GEOMETRY",
            GeometryKind::GeometryCollection => "GEOMETRYCOLLECTION",
        }
    }

    /// Look up a kind by type name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.eq_ignore_ascii_case(LEGACY_COLLECTION_NAME) {
            return Some(GeometryKind::GeometryCollection);
        }
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }

    /// Whether a value of this geometry may be stored in a column of this kind.
    pub fn accepts(&self, geom: &Geometry<f64>) -> bool {
        match self {
            GeometryKind::Geometry => true,
            // Multi* geometries are collections too.
            GeometryKind::GeometryCollection => GeometryKind::of(geom).is_multi(),
            kind => *kind == GeometryKind::of(geom),
        }
    }

    /// Check if this is a collection kind.
    pub fn is_multi(&self) -> bool {
        matches!(
            self,
            GeometryKind::MultiPoint
                | GeometryKind::MultiLineString
                | GeometryKind::MultiPolygon
                | GeometryKind::GeometryCollection
        )
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GeometryKind {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s).ok_or_else(|| CodecError::unsupported(format!("type name {s:?}")))
    }
}
