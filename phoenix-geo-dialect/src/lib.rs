//! # Phoenix Geo Dialect
//!
//! Stores and queries geometries in Apache Phoenix, which has no native
//! spatial types.
//!
//! This crate provides:
//! - [`DialectTranslator`]: DDL and DML generation, `INSERT` to `UPSERT`
//!   rewriting, pagination, index management and geometry value encoding
//! - [`MetadataCatalog`]: the `GEOMETRY_COLUMNS` relation recording the
//!   kind, SRID and dimension of every spatial column
//! - [`TypeRegistry`]: geometry type codes and names
//! - [`SpatialPredicateCompiler`]: spatial filter trees lowered to `ST_*`
//!   SQL functions
//! - [`DataStoreParams`]: connection parameters and JDBC URL
//! - [`MemoryConnection`]: a recording connection for tests
//!
//! ## Quick Start
//!
//! ```
//! use phoenix_geo_core::GeometryKind;
//! use phoenix_geo_dialect::{
//!     AttributeDescriptor, Crs, DialectConfig, DialectTranslator, FeatureType,
//!     MemoryConnection,
//! };
//!
//! let translator = DialectTranslator::new(DialectConfig::text()).unwrap();
//! let roads = FeatureType::new("ROADS").with_attribute(
//!     AttributeDescriptor::geometry("GEOM", GeometryKind::LineString)
//!         .with_crs(Crs::epsg(4326))
//!         .not_null(),
//! );
//!
//! assert_eq!(
//!     translator.create_table_sql(None, &roads),
//!     "CREATE TABLE ROADS(FID INTEGER PRIMARY KEY DESC, GEOM VARCHAR NOT NULL) IMMUTABLE_ROWS = true"
//! );
//!
//! let conn = MemoryConnection::new();
//! translator.post_create_table(&conn, None, &roads).unwrap();
//! assert_eq!(
//!     translator.geometry_dimension(&conn, None, "ROADS", "GEOM").unwrap(),
//!     2
//! );
//! ```

pub mod catalog;
pub mod config;
pub mod connection;
pub mod error;
pub mod filter;
pub mod memory;
pub mod schema;
pub mod translator;
pub mod types;

pub use catalog::{MetadataCatalog, CATALOG_TABLE};
pub use config::{
    ConfigValue, DataStoreParamSources, DataStoreParams, DialectConfig, UniqueIndexPolicy,
    UpsertRewriteOrder,
};
pub use connection::{Connection, ResultSet, SqlError, SqlErrorKind, SqlValue, Statement};
pub use error::{DialectError, Result};
pub use filter::{
    Expression, Filter, SpatialFilter, SpatialOperator, SpatialPredicateCompiler,
    SUPPORTED_OPERATORS,
};
pub use memory::MemoryConnection;
pub use schema::{
    AttributeDescriptor, AttributeType, ColumnMetadata, Crs, FeatureType, IndexDescriptor,
    SpatialColumnDescriptor, SqlType,
};
pub use translator::{rewrite_insert_to_upsert, DialectCapabilities, DialectTranslator};
pub use types::TypeRegistry;
