//! Shared fixtures for dialect integration tests.

#![allow(dead_code)]

use phoenix_geo_core::GeometryKind;
use phoenix_geo_dialect::{
    AttributeDescriptor, Crs, DialectConfig, DialectTranslator, FeatureType, SqlType,
};
use std::sync::Once;

static TRACING: Once = Once::new();

/// Route dialect logs to the test output. Set `RUST_LOG=debug` to see SQL.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn text_translator() -> DialectTranslator {
    init_tracing();
    DialectTranslator::new(DialectConfig::text()).expect("default text config")
}

pub fn binary_translator() -> DialectTranslator {
    init_tracing();
    DialectTranslator::new(DialectConfig::binary()).expect("default binary config")
}

/// `ROADS(NAME VARCHAR, LANES INTEGER, GEOM LINESTRING NOT NULL EPSG:4326,
/// CENTROID POINT)`
pub fn roads() -> FeatureType {
    FeatureType::new("ROADS")
        .with_attribute(AttributeDescriptor::scalar("NAME", SqlType::Varchar))
        .with_attribute(AttributeDescriptor::scalar("LANES", SqlType::Integer))
        .with_attribute(
            AttributeDescriptor::geometry("GEOM", GeometryKind::LineString)
                .with_crs(Crs::epsg(4326))
                .not_null(),
        )
        .with_attribute(AttributeDescriptor::geometry("CENTROID", GeometryKind::Point))
}
