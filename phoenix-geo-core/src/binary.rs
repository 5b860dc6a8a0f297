//! Well-Known Binary reading and writing.

use crate::error::{CodecError, Result};
use crate::text::normalize;
use geo_traits::to_geo::ToGeoGeometry;
use geo_types::Geometry;
use serde::{Deserialize, Serialize};

/// Byte order used when writing WKB. Reading accepts either order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WkbByteOrder {
    #[default]
    LittleEndian,
    BigEndian,
}

impl From<WkbByteOrder> for wkb::Endianness {
    fn from(order: WkbByteOrder) -> Self {
        match order {
            WkbByteOrder::LittleEndian => wkb::Endianness::LittleEndian,
            WkbByteOrder::BigEndian => wkb::Endianness::BigEndian,
        }
    }
}

/// Write a geometry as WKB.
pub fn write_wkb(geom: &Geometry<f64>, order: WkbByteOrder) -> Result<Vec<u8>> {
    let geom = normalize(geom.clone());
    let mut buf = Vec::new();
    let options = wkb::writer::WriteOptions {
        endianness: order.into(),
    };
    wkb::writer::write_geometry(&mut buf, &geom, &options)
        .map_err(|e| CodecError::WkbWrite(format!("{:?}", e)))?;
    Ok(buf)
}

/// Parse WKB bytes. Empty input and empty geometries yield `Ok(None)`.
pub fn read_wkb(bytes: &[u8]) -> Result<Option<Geometry<f64>>> {
    if bytes.is_empty() {
        return Ok(None);
    }
    let wkb = wkb::reader::read_wkb(bytes).map_err(|e| CodecError::WkbParse(format!("{:?}", e)))?;
    Ok(wkb.try_to_geometry())
}
