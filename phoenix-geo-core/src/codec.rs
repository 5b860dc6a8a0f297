//! Geometry codec: converts between in-memory geometries and the stored
//! column representation.
//!
//! Two wire forms are supported. [`GeometryEncoding::Wkt`] stores text and
//! renders values inline as quoted SQL literals; [`GeometryEncoding::Wkb`]
//! stores bytes and renders values as bind parameters. Null and empty
//! geometries are stored as SQL `NULL` and decode back to no value.

use crate::binary::{read_wkb, write_wkb, WkbByteOrder};
use crate::envelope::Envelope;
use crate::error::Result;
use crate::text::{parse_wkt, WktDisplay};
use geo::HasDimensions;
use geo_types::Geometry;
use serde::{Deserialize, Serialize};

/// Wire form of stored geometries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GeometryEncoding {
    /// Well-Known Text in a `VARCHAR` column.
    #[default]
    Wkt,
    /// Well-Known Binary in a `VARBINARY` column.
    Wkb,
}

impl GeometryEncoding {
    /// Native column type holding values of this encoding.
    pub fn storage_type_name(&self) -> &'static str {
        match self {
            GeometryEncoding::Wkt => "VARCHAR",
            GeometryEncoding::Wkb => "VARBINARY",
        }
    }
}

/// An encoded geometry, ready to be placed in a SQL statement.
#[derive(Debug, Clone, PartialEq)]
pub enum EncodedGeometry {
    Null,
    /// Quoted WKT literal, e.g. `'POINT (1 1)'`.
    Text(String),
    /// WKB bytes, bound as a statement parameter.
    Binary(Vec<u8>),
}

impl EncodedGeometry {
    pub fn is_null(&self) -> bool {
        matches!(self, EncodedGeometry::Null)
    }

    /// SQL fragment standing in for the value: the literal itself, `NULL`,
    /// or a `?` placeholder for binary values.
    pub fn to_sql(&self) -> &str {
        match self {
            EncodedGeometry::Null => "NULL",
            EncodedGeometry::Text(literal) => literal,
            EncodedGeometry::Binary(_) => "?",
        }
    }

    pub fn as_literal(&self) -> Option<&str> {
        match self {
            EncodedGeometry::Text(literal) => Some(literal),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            EncodedGeometry::Binary(bytes) => Some(bytes),
            _ => None,
        }
    }
}

/// A stored geometry value as read back from a result row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawGeometry<'a> {
    Text(&'a str),
    Binary(&'a [u8]),
}

/// Encoder/decoder for one configured wire form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GeometryCodec {
    encoding: GeometryEncoding,
    byte_order: WkbByteOrder,
}

impl GeometryCodec {
    pub fn new(encoding: GeometryEncoding) -> Self {
        Self {
            encoding,
            byte_order: WkbByteOrder::default(),
        }
    }

    /// Set the byte order used when writing WKB.
    pub fn with_byte_order(mut self, byte_order: WkbByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    pub fn encoding(&self) -> GeometryEncoding {
        self.encoding
    }

    pub fn byte_order(&self) -> WkbByteOrder {
        self.byte_order
    }

    /// Encode a geometry for storage.
    ///
    /// `dimension` and `srid` describe the target column. Coordinates are
    /// written in two dimensions and the SRID is kept in the metadata
    /// catalog rather than in the value.
    pub fn encode(
        &self,
        geometry: Option<&Geometry<f64>>,
        dimension: u32,
        srid: i32,
    ) -> Result<EncodedGeometry> {
        let Some(geom) = geometry.filter(|g| !g.is_empty()) else {
            return Ok(EncodedGeometry::Null);
        };
        tracing::trace!(
            encoding = ?self.encoding,
            dimension,
            srid,
            "encoding geometry value"
        );

        match self.encoding {
            GeometryEncoding::Wkt => Ok(EncodedGeometry::Text(quote_literal(geom))),
            GeometryEncoding::Wkb => Ok(EncodedGeometry::Binary(write_wkb(geom, self.byte_order)?)),
        }
    }

    /// Decode a stored value. `None`, blank text, zero-length bytes and empty
    /// geometries all decode to `Ok(None)`.
    pub fn decode(&self, raw: Option<RawGeometry<'_>>) -> Result<Option<Geometry<f64>>> {
        let decoded = match raw {
            None => None,
            Some(RawGeometry::Text(text)) => parse_wkt(text)?,
            Some(RawGeometry::Binary(bytes)) => read_wkb(bytes)?,
        };
        Ok(decoded.filter(|g| !g.is_empty()))
    }

    /// Bounding rectangle of a single stored value.
    pub fn decode_envelope(&self, raw: Option<RawGeometry<'_>>) -> Result<Option<Envelope>> {
        Ok(self
            .decode(raw)?
            .as_ref()
            .and_then(Envelope::from_geometry))
    }
}

/// Quote a geometry as a SQL string literal.
fn quote_literal(geom: &Geometry<f64>) -> String {
    format!("'{}'", WktDisplay(geom))
}
