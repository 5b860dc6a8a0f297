//! Geometry value codecs for the Phoenix spatial dialect.
//!
//! Phoenix has no native geometry type. Spatial columns are plain `VARCHAR`
//! or `VARBINARY` columns holding Well-Known Text or Well-Known Binary, and
//! point locations may additionally be indexed by an integer geohash. This
//! crate converts between `geo-types` geometries and those stored forms.
//!
//! ```text
//!   Geometry ──encode──► EncodedGeometry ──► SQL literal / bind parameter
//!       ▲                                           │
//!       └──────decode◄──── RawGeometry ◄──── result row
//! ```
//!
//! # Modules
//!
//! - [`codec`]: [`GeometryCodec`] and the encoded/raw value types
//! - [`text`]: WKT parsing and writing, ring normalisation
//! - [`binary`]: WKB parsing and writing
//! - [`geohash`]: 60-bit integer geohash and its base-32 text form
//! - [`kind`]: declared column geometry kinds
//! - [`envelope`]: bounding rectangles
//! - [`error`]: Error types

pub mod binary;
pub mod codec;
pub mod envelope;
pub mod error;
pub mod geohash;
pub mod kind;
pub mod text;

// Re-export key types
pub use binary::WkbByteOrder;
pub use codec::{EncodedGeometry, GeometryCodec, GeometryEncoding, RawGeometry};
pub use envelope::Envelope;
pub use error::{CodecError, Result};
pub use kind::GeometryKind;
pub use text::{normalize, parse_wkt, to_wkt};

pub use geo_types::Geometry;
