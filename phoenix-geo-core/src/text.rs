//! Well-Known Text reading and writing.
//!
//! Parsing goes through the `wkt` crate. Writing is done here so the output
//! matches the layout the engine-side functions expect: a keyword, one space,
//! then the parenthesised coordinate list (`POINT (1 1)`,
//! `POLYGON ((0 0, 1 0, 1 1, 0 0))`).
//!
//! # Ring normalisation
//!
//! Rings have no independent wire form. A `LINEARRING` literal is read back
//! as a line string, and geo-types primitives without a WKT tag (`Line`,
//! `Rect`, `Triangle`) are rewritten as line strings or polygons before
//! they are emitted (see [`normalize`]).

use crate::error::{CodecError, Result};
use geo_types::{
    Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon,
    Polygon,
};
use std::fmt;
use std::str::FromStr;

const LINEAR_RING: &str = "LINEARRING";

/// Parse WKT string to geo-types Geometry.
///
/// Returns `Ok(None)` for blank text and for top-level `EMPTY` geometries.
pub fn parse_wkt(text: &str) -> Result<Option<Geometry<f64>>> {
    let trimmed = text.trim();
    if trimmed.is_empty() || is_empty_literal(trimmed) {
        return Ok(None);
    }

    let normalized;
    let source = if starts_with_ignore_case(trimmed, LINEAR_RING) {
        normalized = format!("LINESTRING{}", &trimmed[LINEAR_RING.len()..]);
        normalized.as_str()
    } else {
        trimmed
    };

    wkt::Wkt::<f64>::from_str(source)
        .map_err(|e| CodecError::WktParse(format!("{:?}", e)))
        .and_then(|w| {
            w.try_into()
                .map_err(|e: wkt::conversion::Error| CodecError::WktParse(format!("{:?}", e)))
        })
        .map(Some)
}

/// Render a geometry as WKT.
pub fn to_wkt(geom: &Geometry<f64>) -> String {
    WktDisplay(geom).to_string()
}

/// `Display` adapter writing a geometry as WKT.
pub struct WktDisplay<'a>(pub &'a Geometry<f64>);

impl fmt::Display for WktDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_geometry(f, self.0)
    }
}

/// Rewrite primitives that have no wire form into their encodable equivalent.
pub fn normalize(geom: Geometry<f64>) -> Geometry<f64> {
    match geom {
        Geometry::Line(line) => Geometry::LineString(LineString::new(vec![line.start, line.end])),
        Geometry::Rect(rect) => Geometry::Polygon(rect.to_polygon()),
        Geometry::Triangle(tri) => Geometry::Polygon(tri.to_polygon()),
        Geometry::GeometryCollection(gc) => Geometry::GeometryCollection(GeometryCollection::new_from(
            gc.0.into_iter().map(normalize).collect(),
        )),
        other => other,
    }
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.len() >= prefix.len()
        && text.is_char_boundary(prefix.len())
        && text[..prefix.len()].eq_ignore_ascii_case(prefix)
}

fn is_empty_literal(text: &str) -> bool {
    !text.contains('(')
        && text
            .rsplit(char::is_whitespace)
            .next()
            .is_some_and(|word| word.eq_ignore_ascii_case("EMPTY"))
}

fn write_geometry(f: &mut fmt::Formatter<'_>, geom: &Geometry<f64>) -> fmt::Result {
    match geom {
        Geometry::Point(p) => {
            f.write_str("POINT (")?;
            write_coord(f, &p.0)?;
            f.write_str(")")
        }
        Geometry::Line(line) => {
            f.write_str("LINESTRING")?;
            write_coord_list(f, &[line.start, line.end])
        }
        Geometry::LineString(ls) => {
            f.write_str("LINESTRING")?;
            write_coord_list(f, &ls.0)
        }
        Geometry::Polygon(poly) => {
            f.write_str("POLYGON")?;
            write_polygon_body(f, poly)
        }
        Geometry::Rect(rect) => {
            f.write_str("POLYGON")?;
            write_polygon_body(f, &rect.to_polygon())
        }
        Geometry::Triangle(tri) => {
            f.write_str("POLYGON")?;
            write_polygon_body(f, &tri.to_polygon())
        }
        Geometry::MultiPoint(mp) => {
            f.write_str("MULTIPOINT")?;
            write_multi_point_body(f, mp)
        }
        Geometry::MultiLineString(mls) => {
            f.write_str("MULTILINESTRING")?;
            write_multi_line_string_body(f, mls)
        }
        Geometry::MultiPolygon(mpoly) => {
            f.write_str("MULTIPOLYGON")?;
            write_multi_polygon_body(f, mpoly)
        }
        Geometry::GeometryCollection(gc) => {
            f.write_str("GEOMETRYCOLLECTION")?;
            if gc.0.is_empty() {
                return f.write_str(" EMPTY");
            }
            f.write_str(" (")?;
            for (i, member) in gc.0.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write_geometry(f, member)?;
            }
            f.write_str(")")
        }
    }
}

fn write_coord(f: &mut fmt::Formatter<'_>, c: &Coord<f64>) -> fmt::Result {
    write!(f, "{} {}", c.x, c.y)
}

fn write_coord_list(f: &mut fmt::Formatter<'_>, coords: &[Coord<f64>]) -> fmt::Result {
    if coords.is_empty() {
        return f.write_str(" EMPTY");
    }
    f.write_str(" ")?;
    write_coord_seq(f, coords)
}

fn write_coord_seq(f: &mut fmt::Formatter<'_>, coords: &[Coord<f64>]) -> fmt::Result {
    f.write_str("(")?;
    for (i, c) in coords.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write_coord(f, c)?;
    }
    f.write_str(")")
}

fn write_polygon_body(f: &mut fmt::Formatter<'_>, poly: &Polygon<f64>) -> fmt::Result {
    if poly.exterior().0.is_empty() {
        return f.write_str(" EMPTY");
    }
    f.write_str(" ")?;
    write_rings(f, poly)
}

fn write_rings(f: &mut fmt::Formatter<'_>, poly: &Polygon<f64>) -> fmt::Result {
    f.write_str("(")?;
    write_coord_seq(f, &poly.exterior().0)?;
    for ring in poly.interiors() {
        f.write_str(", ")?;
        write_coord_seq(f, &ring.0)?;
    }
    f.write_str(")")
}

fn write_multi_point_body(f: &mut fmt::Formatter<'_>, mp: &MultiPoint<f64>) -> fmt::Result {
    if mp.0.is_empty() {
        return f.write_str(" EMPTY");
    }
    f.write_str(" (")?;
    for (i, p) in mp.0.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        f.write_str("(")?;
        write_coord(f, &p.0)?;
        f.write_str(")")?;
    }
    f.write_str(")")
}

fn write_multi_line_string_body(
    f: &mut fmt::Formatter<'_>,
    mls: &MultiLineString<f64>,
) -> fmt::Result {
    if mls.0.is_empty() {
        return f.write_str(" EMPTY");
    }
    f.write_str(" (")?;
    for (i, ls) in mls.0.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write_coord_seq(f, &ls.0)?;
    }
    f.write_str(")")
}

fn write_multi_polygon_body(f: &mut fmt::Formatter<'_>, mpoly: &MultiPolygon<f64>) -> fmt::Result {
    if mpoly.0.is_empty() {
        return f.write_str(" EMPTY");
    }
    f.write_str(" (")?;
    for (i, poly) in mpoly.0.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write_rings(f, poly)?;
    }
    f.write_str(")")
}
