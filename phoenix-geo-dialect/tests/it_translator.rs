//! Translator integration tests: table lifecycle, value encoding and
//! pagination against a recording connection.

mod support;

use geo_types::{point, Geometry};
use phoenix_geo_core::{EncodedGeometry, Envelope, GeometryKind};
use phoenix_geo_dialect::connection::{execute, execute_with_params};
use phoenix_geo_dialect::{
    ColumnMetadata, DialectConfig, DialectError, DialectTranslator, Filter, MemoryConnection,
    ResultSet, SpatialOperator, SqlError, SqlErrorKind, SqlValue, UpsertRewriteOrder,
    CATALOG_TABLE,
};
use pretty_assertions::assert_eq;
use support::{binary_translator, roads, text_translator};

#[test]
fn create_table_registers_geometry_columns() {
    let translator = text_translator();
    let conn = MemoryConnection::new();
    let roads = roads();

    let ddl = translator.create_table_sql(None, &roads);
    assert_eq!(
        ddl,
        "CREATE TABLE ROADS(FID INTEGER PRIMARY KEY DESC, NAME VARCHAR, LANES INTEGER, \
         GEOM VARCHAR NOT NULL, CENTROID VARCHAR) IMMUTABLE_ROWS = true"
    );
    execute(&conn, &ddl).unwrap();
    translator.post_create_table(&conn, None, &roads).unwrap();

    assert!(conn.has_table(None, CATALOG_TABLE));
    assert_eq!(
        conn.executed_starting_with("CREATE INDEX"),
        vec!["CREATE INDEX IF NOT EXISTS ROADS_GEOM_idx ON ROADS(GEOM)".to_string()]
    );

    let upserts = conn.executed_starting_with("UPSERT");
    assert_eq!(upserts.len(), 2);
    assert!(upserts[0].ends_with("NULL, 'ROADS', 'GEOM', 2, 4326, 'LINESTRING')"));
    assert!(upserts[1].ends_with("NULL, 'ROADS', 'CENTROID', 2, -1, 'POINT')"));
    assert_eq!(conn.open_statements(), 0);
}

#[test]
fn catalog_is_created_once_across_tables() {
    let translator = text_translator();
    let conn = MemoryConnection::new();

    translator.post_create_table(&conn, Some("gis"), &roads()).unwrap();
    let mut rivers = roads();
    rivers.name = "RIVERS".to_string();
    translator.post_create_table(&conn, Some("gis"), &rivers).unwrap();

    let catalog_ddl: Vec<_> = conn
        .executed_starting_with("CREATE TABLE")
        .into_iter()
        .filter(|sql| sql.contains(CATALOG_TABLE))
        .collect();
    assert_eq!(catalog_ddl.len(), 1);
    assert_eq!(
        conn.executed_starting_with("CREATE INDEX"),
        vec![
            "CREATE INDEX IF NOT EXISTS gis.ROADS_GEOM_idx ON gis.ROADS(GEOM)".to_string(),
            "CREATE INDEX IF NOT EXISTS gis.RIVERS_GEOM_idx ON gis.RIVERS(GEOM)".to_string(),
        ]
    );
    assert!(conn.executed_starting_with("UPSERT")[3].contains("'GIS', 'RIVERS', 'CENTROID'"));
}

#[test]
fn geometry_indexes_are_named_per_table() {
    let translator = text_translator();
    let conn = MemoryConnection::new();

    let mut rivers = roads();
    rivers.name = "RIVERS".to_string();
    for table in [roads(), rivers] {
        translator.post_create_table(&conn, Some("gis"), &table).unwrap();
    }

    let names: Vec<String> = conn
        .executed_starting_with("CREATE INDEX")
        .iter()
        .filter_map(|sql| sql.split_whitespace().nth(5).map(str::to_string))
        .collect();
    assert_eq!(names, vec!["gis.ROADS_GEOM_idx", "gis.RIVERS_GEOM_idx"]);
    assert_ne!(names[0], names[1]);
}

#[test]
fn failed_index_creation_propagates() {
    let translator = text_translator();
    let conn = MemoryConnection::new();
    conn.fail_on(
        "CREATE INDEX",
        SqlError::new(SqlErrorKind::Syntax, "index on nullable column"),
    );

    let err = translator
        .post_create_table(&conn, None, &roads())
        .unwrap_err();
    match err {
        DialectError::Sql(sql) => assert_eq!(sql.kind, SqlErrorKind::Syntax),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(conn.executed_starting_with("UPSERT").is_empty());
    assert_eq!(conn.open_statements(), 0);
}

#[test]
fn drop_table_forgets_catalog_rows() {
    let translator = text_translator();
    let conn = MemoryConnection::new();
    translator.post_drop_table(&conn, None, &roads()).unwrap();

    let conn = conn.with_table(None, CATALOG_TABLE);
    translator.post_drop_table(&conn, Some("gis"), &roads()).unwrap();
    assert_eq!(
        conn.executed_starting_with("DELETE").last().unwrap(),
        "DELETE FROM GEOMETRY_COLUMNS WHERE F_TABLE_SCHEMA = 'GIS' AND F_TABLE_NAME = 'ROADS'"
    );
}

#[test]
fn point_end_to_end_wkt() {
    let translator = text_translator();
    let point: Geometry<f64> = point! { x: 1.0, y: 1.0 }.into();

    let encoded = translator
        .encode_geometry_value(Some(&point), 2, 4326)
        .unwrap();
    assert_eq!(encoded, EncodedGeometry::Text("'POINT (1 1)'".to_string()));

    let mut rs = ResultSet::from_rows(["FID", "GEOM"], vec![vec![
        SqlValue::Integer(1),
        SqlValue::from("POINT (1 1)"),
    ]]);
    assert!(rs.next());
    assert_eq!(
        translator.decode_geometry_value(&rs, "geom").unwrap(),
        Some(point)
    );
}

#[test]
fn point_end_to_end_wkb() {
    let translator = binary_translator();
    let conn = MemoryConnection::new().with_table(None, "ROADS");
    let point: Geometry<f64> = point! { x: 1.0, y: 1.0 }.into();

    let encoded = translator
        .encode_geometry_value(Some(&point), 2, 4326)
        .unwrap();
    let bytes = encoded.as_bytes().unwrap().to_vec();
    assert_eq!(
        bytes,
        vec![
            0x01, 0x01, 0x00, 0x00, 0x00, // little endian, point
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xf0, 0x3f, // x = 1.0
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xf0, 0x3f, // y = 1.0
        ]
    );
    assert_eq!(encoded.to_sql(), "?");

    let sql = translator.insert_statement_sql(None, "ROADS", &["FID", "CENTROID"]);
    assert_eq!(sql, "UPSERT INTO ROADS (FID, CENTROID) VALUES (?, ?)");
    execute_with_params(
        &conn,
        &sql,
        &[SqlValue::Integer(7), SqlValue::Binary(bytes.clone())],
    )
    .unwrap();
    assert_eq!(conn.bound_params()[0].1[1], SqlValue::Binary(bytes.clone()));

    let mut rs = ResultSet::from_rows(["CENTROID"], vec![vec![bytes]]);
    assert!(rs.next());
    assert_eq!(
        translator.decode_geometry_value(&rs, "CENTROID").unwrap(),
        Some(point)
    );
}

#[test]
fn null_and_empty_values() {
    let translator = text_translator();
    let empty: Geometry<f64> = geo_types::MultiPoint::<f64>::new(vec![]).into();
    assert!(translator.encode_geometry_value(None, 2, -1).unwrap().is_null());
    assert_eq!(
        translator.encode_geometry_value(Some(&empty), 2, -1).unwrap().to_sql(),
        "NULL"
    );

    let mut rs = ResultSet::from_rows(["GEOM", "BLOB"], vec![vec![
        SqlValue::Null,
        SqlValue::Binary(Vec::new()),
    ]]);
    assert!(rs.next());
    assert_eq!(translator.decode_geometry_value(&rs, "GEOM").unwrap(), None);
    assert_eq!(translator.decode_geometry_value(&rs, "BLOB").unwrap(), None);
    assert_eq!(translator.decode_geometry_value(&rs, "MISSING").unwrap(), None);
}

#[test]
fn malformed_values_fail_only_that_value() {
    let translator = text_translator();
    let mut rs = ResultSet::from_rows(["GEOM"], vec![
        vec!["POINT (1"],
        vec!["POINT (2 2)"],
    ]);
    assert!(rs.next());
    assert!(matches!(
        translator.decode_geometry_value(&rs, "GEOM"),
        Err(DialectError::Codec(_))
    ));
    assert!(rs.next());
    assert!(translator.decode_geometry_value(&rs, "GEOM").unwrap().is_some());
}

#[test]
fn envelope_reads_only_its_column() {
    let translator = text_translator();
    let mut rs = ResultSet::from_rows(["BAD", "EXTENT"], vec![vec![
        "not a geometry",
        "POLYGON ((0 0, 4 0, 4 3, 0 3, 0 0))",
    ]]);
    assert!(rs.next());
    assert_eq!(
        translator.decode_geometry_envelope(&rs, 2).unwrap(),
        Some(Envelope::new(0.0, 0.0, 4.0, 3.0))
    );

    let mut sql = String::from("SELECT ");
    translator.encode_geometry_envelope("GEOM", &mut sql);
    sql.push_str(", ");
    translator.encode_geometry_column(Some("r"), "GEOM", &mut sql);
    assert_eq!(sql, "SELECT GEOM, r.GEOM");
}

#[test]
fn pagination() {
    let translator = text_translator();
    let mut sql = String::from("SELECT * FROM ROADS");
    translator.apply_limit_offset(&mut sql, Some(10), 0);
    assert_eq!(sql, "SELECT * FROM ROADS LIMIT 10 OFFSET 0");

    let mut sql = String::from("SELECT * FROM ROADS");
    translator.apply_limit_offset(&mut sql, Some(10), 20);
    assert_eq!(sql, "SELECT * FROM ROADS LIMIT 10 OFFSET 20");

    let mut sql = String::from("SELECT * FROM ROADS");
    translator.apply_limit_offset(&mut sql, None, 5);
    assert_eq!(sql, "SELECT * FROM ROADS LIMIT 9223372036854775807 OFFSET 5");
}

#[test]
fn upsert_rewrite_is_case_insensitive() {
    for order in [UpsertRewriteOrder::BeforeEncode, UpsertRewriteOrder::AfterEncode] {
        let translator =
            DialectTranslator::new(DialectConfig::text().with_upsert_rewrite(order)).unwrap();
        let mut sql = String::from("insert into ");
        translator.encode_table_name("ROADS", &mut sql);
        assert_eq!(sql, "UPSERT into ROADS", "{order:?}");
        assert!(!sql.to_ascii_uppercase().contains("INSERT"));
    }
}

#[test]
fn escaped_names() {
    let translator =
        DialectTranslator::new(DialectConfig::text().with_name_escape("\"")).unwrap();
    assert_eq!(
        translator.insert_statement_sql(Some("gis"), "roads", &["geom"]),
        "UPSERT INTO \"gis\".\"roads\" (\"geom\") VALUES (?)"
    );
    assert_eq!(
        translator.drop_index_sql(None, "roads", "geom_idx"),
        "DROP INDEX \"geom_idx\" ON \"roads\""
    );
}

#[test]
fn classify_and_lookups_use_catalog() {
    let translator = text_translator();
    let conn = MemoryConnection::new().with_table(None, CATALOG_TABLE);
    conn.on_query("SELECT TYPE FROM", ResultSet::from_rows(["TYPE"], vec![vec!["MULTIPOLYGON"]]));
    conn.on_query("SELECT SRID FROM", ResultSet::from_rows(["SRID"], vec![vec![3857i64]]));

    let geom = ColumnMetadata::new(None, "parcels", "shape", "varchar");
    assert_eq!(
        translator.classify_column(&conn, &geom).unwrap(),
        Some(GeometryKind::MultiPolygon)
    );
    let scalar = ColumnMetadata::new(None, "parcels", "area", "DOUBLE");
    assert_eq!(translator.classify_column(&conn, &scalar).unwrap(), None);

    let srid = translator
        .geometry_srid(&conn, None, "parcels", "shape")
        .unwrap();
    assert_eq!(srid, Some(3857));
    let sql = translator
        .filter_compiler(srid)
        .compile(&Filter::on_property(
            SpatialOperator::Within,
            "SHAPE",
            point! { x: 5.0, y: 6.0 },
        ))
        .unwrap();
    assert!(sql.ends_with("ST_WITHIN(SHAPE, ST_GEOFROMTEXT('POINT (5 6)', 3857))"));
}

#[test]
fn capabilities_and_type_names() {
    let translator = binary_translator();
    let caps = translator.capabilities();
    assert!(caps.limit_offset && caps.auto_commit_query);
    assert!(caps.generated_values_post_insert && caps.schema_for_index);
    assert_eq!(translator.geometry_type_name(3008), Some("GEOMETRYCOLLECTION"));
    assert_eq!(translator.geometry_type_name(-3), Some("VARBINARY"));
    assert!(!translator.include_table(Some("gis"), CATALOG_TABLE));
}

#[test]
fn invalid_config_is_rejected() {
    assert!(matches!(
        DialectTranslator::new(DialectConfig::text().with_index_suffix("")),
        Err(DialectError::Config(_))
    ));
}
