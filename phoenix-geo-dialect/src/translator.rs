//! SQL generation policy for the Phoenix dialect.
//!
//! [`DialectTranslator`] owns the geometry codec, the type registry and the
//! metadata catalog, and turns table, attribute and index descriptors into
//! the engine's SQL. The engine has no `INSERT` statement, stores
//! geometries in plain `VARCHAR`/`VARBINARY` columns and cannot declare
//! unique indexes; this module is where those differences are absorbed.

use crate::catalog::{MetadataCatalog, CATALOG_TABLE};
use crate::config::{DialectConfig, UniqueIndexPolicy, UpsertRewriteOrder};
use crate::connection::{self, Connection, ResultSet, SqlValue};
use crate::error::{DialectError, Result};
use crate::filter::SpatialPredicateCompiler;
use crate::schema::{
    AttributeDescriptor, AttributeType, ColumnMetadata, FeatureType, IndexDescriptor,
    SpatialColumnDescriptor, UNKNOWN_SRID,
};
use crate::types::TypeRegistry;
use geo_types::Geometry;
use phoenix_geo_core::{
    CodecError, EncodedGeometry, Envelope, GeometryCodec, GeometryKind, RawGeometry,
};

/// Largest row count accepted by `LIMIT`, used when only an offset is set.
pub const MAX_LIMIT: i64 = i64::MAX;

/// Features the dialect supports on top of plain SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialectCapabilities {
    pub limit_offset: bool,
    pub auto_commit_query: bool,
    pub generated_values_post_insert: bool,
    pub schema_for_index: bool,
}

/// Replace the first `INSERT` keyword (any case) with `UPSERT`.
pub fn rewrite_insert_to_upsert(fragment: &str) -> String {
    match fragment.to_ascii_uppercase().find("INSERT") {
        Some(at) => {
            let mut rewritten = String::with_capacity(fragment.len());
            rewritten.push_str(&fragment[..at]);
            rewritten.push_str("UPSERT");
            rewritten.push_str(&fragment[at + "INSERT".len()..]);
            rewritten
        }
        None => fragment.to_string(),
    }
}

/// Translates descriptors and values to and from the engine's SQL.
///
/// Immutable once built; share it freely across threads and connections.
#[derive(Debug, Clone)]
pub struct DialectTranslator {
    config: DialectConfig,
    codec: GeometryCodec,
    registry: TypeRegistry,
    catalog: MetadataCatalog,
}

impl DialectTranslator {
    pub fn new(config: DialectConfig) -> Result<Self> {
        config.validate()?;
        let codec = GeometryCodec::new(config.encoding).with_byte_order(config.wkb_byte_order);
        let registry = TypeRegistry::new(config.encoding);
        let catalog = MetadataCatalog::new(config.name_escape.clone());
        Ok(Self {
            config,
            codec,
            registry,
            catalog,
        })
    }

    pub fn config(&self) -> &DialectConfig {
        &self.config
    }

    pub fn codec(&self) -> &GeometryCodec {
        &self.codec
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn catalog(&self) -> &MetadataCatalog {
        &self.catalog
    }

    pub fn capabilities(&self) -> DialectCapabilities {
        DialectCapabilities {
            limit_offset: true,
            auto_commit_query: true,
            generated_values_post_insert: true,
            schema_for_index: true,
        }
    }

    // === Names ===

    fn push_escaped(&self, raw: &str, sql: &mut String) {
        sql.push_str(&self.config.name_escape);
        sql.push_str(raw);
        sql.push_str(&self.config.name_escape);
    }

    fn push_qualified_table(&self, schema: Option<&str>, table: &str, sql: &mut String) {
        if let Some(schema) = schema {
            self.encode_schema_name(schema, sql);
            sql.push('.');
        }
        self.push_escaped(table, sql);
    }

    /// Append a table name to a statement being built.
    ///
    /// Statements handed in as `INSERT ...` come out as `UPSERT ...`. With
    /// [`UpsertRewriteOrder::BeforeEncode`] only the text already in `sql`
    /// is rewritten; with [`UpsertRewriteOrder::AfterEncode`] the rewrite
    /// runs over the buffer including the appended name.
    pub fn encode_table_name(&self, raw: &str, sql: &mut String) {
        match self.config.upsert_rewrite {
            UpsertRewriteOrder::BeforeEncode => {
                *sql = rewrite_insert_to_upsert(sql);
                self.push_escaped(raw, sql);
            }
            UpsertRewriteOrder::AfterEncode => {
                self.push_escaped(raw, sql);
                *sql = rewrite_insert_to_upsert(sql);
            }
        }
    }

    pub fn encode_column_name(&self, prefix: Option<&str>, raw: &str, sql: &mut String) {
        if let Some(prefix) = prefix {
            self.push_escaped(prefix, sql);
            sql.push('.');
        }
        self.push_escaped(raw, sql);
    }

    pub fn encode_schema_name(&self, raw: &str, sql: &mut String) {
        self.push_escaped(raw, sql);
    }

    // === DDL ===

    /// Column definition for `CREATE TABLE`.
    ///
    /// Geometry columns take the storage type of the active encoding and are
    /// declared `NOT NULL` when not nullable, which indexing requires.
    pub fn column_ddl(&self, attribute: &AttributeDescriptor) -> String {
        let mut sql = String::new();
        self.encode_column_name(None, &attribute.name, &mut sql);
        sql.push(' ');
        let hint = match &attribute.binding {
            AttributeType::Scalar(ty) => {
                sql.push_str(ty.name());
                None
            }
            AttributeType::Geometry { kind, .. } => {
                sql.push_str(self.registry.storage_type().name());
                self.config.geometry_type_hints.then_some(kind.name())
            }
        };
        if !attribute.nullable {
            sql.push_str(" NOT NULL");
        }
        if let Some(kind) = hint {
            sql.push_str(" /* ");
            sql.push_str(kind);
            sql.push_str(" */");
        }
        sql
    }

    pub fn encode_primary_key(&self, column: &str, sql: &mut String) {
        self.encode_column_name(None, column, sql);
        sql.push_str(" INTEGER PRIMARY KEY DESC");
    }

    /// Table options appended after the column list.
    pub fn encode_post_create_table(&self, sql: &mut String) {
        if self.config.immutable_rows {
            sql.push_str(" IMMUTABLE_ROWS = true");
        }
    }

    pub fn create_table_sql(&self, schema: Option<&str>, feature_type: &FeatureType) -> String {
        let mut sql = String::from("CREATE TABLE ");
        self.push_qualified_table(schema, &feature_type.name, &mut sql);
        sql.push('(');
        self.encode_primary_key(&feature_type.primary_key, &mut sql);
        for attribute in feature_type
            .attributes
            .iter()
            .filter(|a| !a.name.eq_ignore_ascii_case(&feature_type.primary_key))
        {
            sql.push_str(", ");
            sql.push_str(&self.column_ddl(attribute));
        }
        sql.push(')');
        self.encode_post_create_table(&mut sql);
        sql
    }

    /// Parameterised write of the given columns, one `?` per column.
    pub fn insert_statement_sql(
        &self,
        schema: Option<&str>,
        table: &str,
        columns: &[&str],
    ) -> String {
        let mut sql = String::from("INSERT INTO ");
        if let Some(schema) = schema {
            self.encode_schema_name(schema, &mut sql);
            sql.push('.');
        }
        self.encode_table_name(table, &mut sql);
        sql.push_str(" (");
        for (i, column) in columns.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            self.encode_column_name(None, column, &mut sql);
        }
        sql.push_str(") VALUES (");
        sql.push_str(&vec!["?"; columns.len()].join(", "));
        sql.push(')');
        sql
    }

    /// Register the geometry columns of a freshly created table.
    ///
    /// Creates the catalog relation when missing, indexes every non-nullable
    /// geometry column as `<table>_<column><suffix>` and records one catalog
    /// row per geometry column. Index names share the schema namespace, so
    /// the table name keeps them distinct. A
    /// reference system with no recognisable EPSG code is recorded as SRID
    /// -1.
    pub fn post_create_table(
        &self,
        conn: &dyn Connection,
        schema: Option<&str>,
        feature_type: &FeatureType,
    ) -> Result<()> {
        self.catalog.ensure_catalog_table(conn)?;

        for attribute in feature_type.geometry_attributes() {
            let Some(kind) = attribute.geometry_kind() else {
                continue;
            };

            if !attribute.nullable {
                let index = IndexDescriptor::new(
                    feature_type.name.as_str(),
                    format!(
                        "{}_{}{}",
                        feature_type.name, attribute.name, self.config.index_suffix
                    ),
                    [attribute.name.as_str()],
                );
                self.create_index(conn, schema, &index)?;
            }

            let srid = match attribute.crs() {
                Some(crs) => crs.epsg_code().unwrap_or_else(|| {
                    tracing::debug!(
                        crs = crs.identifier(),
                        column = %attribute.name,
                        "could not determine EPSG code"
                    );
                    UNKNOWN_SRID
                }),
                None => UNKNOWN_SRID,
            };

            let descriptor =
                SpatialColumnDescriptor::new(feature_type.name.as_str(), attribute.name.as_str(), kind)
                    .with_schema(schema)
                    .with_srid(srid)
                    .with_nullable(attribute.nullable);
            self.catalog.record_column(conn, &descriptor)?;
        }
        Ok(())
    }

    /// Remove the catalog rows of a dropped table.
    pub fn post_drop_table(
        &self,
        conn: &dyn Connection,
        schema: Option<&str>,
        feature_type: &FeatureType,
    ) -> Result<()> {
        self.catalog.forget_table(conn, schema, &feature_type.name)
    }

    /// Whether a table is exposed as a feature type. The catalog relation
    /// is not.
    pub fn include_table(&self, _schema: Option<&str>, table: &str) -> bool {
        !table.eq_ignore_ascii_case(CATALOG_TABLE)
    }

    // === Indexes ===

    /// `CREATE INDEX IF NOT EXISTS [schema.]name ON [schema.]table(col, ...)`.
    ///
    /// Unique requests become plain indexes, or fail under
    /// [`UniqueIndexPolicy::Reject`].
    pub fn create_index_sql(&self, schema: Option<&str>, index: &IndexDescriptor) -> Result<String> {
        if index.unique {
            match self.config.unique_index_policy {
                UniqueIndexPolicy::Downgrade => tracing::warn!(
                    index = %index.name,
                    table = %index.table,
                    "unique indexes are not supported, creating a plain index"
                ),
                UniqueIndexPolicy::Reject => {
                    return Err(DialectError::UniqueIndexUnsupported {
                        index: index.name.clone(),
                    })
                }
            }
        }
        if index.attributes.is_empty() {
            return Err(DialectError::invalid_config(format!(
                "index {} has no columns",
                index.name
            )));
        }

        let mut sql = String::from("CREATE INDEX IF NOT EXISTS ");
        self.push_qualified_table(schema, &index.name, &mut sql);
        sql.push_str(" ON ");
        self.push_qualified_table(schema, &index.table, &mut sql);
        sql.push('(');
        for (i, attribute) in index.attributes.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            self.push_escaped(attribute, &mut sql);
        }
        sql.push(')');
        Ok(sql)
    }

    pub fn create_index(
        &self,
        conn: &dyn Connection,
        schema: Option<&str>,
        index: &IndexDescriptor,
    ) -> Result<()> {
        let sql = self.create_index_sql(schema, index)?;
        self.execute_and_commit(conn, &sql)
    }

    /// `DROP INDEX name ON [schema.]table`.
    pub fn drop_index_sql(&self, schema: Option<&str>, table: &str, index_name: &str) -> String {
        let mut sql = String::from("DROP INDEX ");
        self.push_escaped(index_name, &mut sql);
        sql.push_str(" ON ");
        self.push_qualified_table(schema, table, &mut sql);
        sql
    }

    pub fn drop_index(
        &self,
        conn: &dyn Connection,
        schema: Option<&str>,
        table: &str,
        index_name: &str,
    ) -> Result<()> {
        let sql = self.drop_index_sql(schema, table, index_name);
        self.execute_and_commit(conn, &sql)
    }

    fn execute_and_commit(&self, conn: &dyn Connection, sql: &str) -> Result<()> {
        tracing::debug!(sql = %sql, "executing index DDL");
        connection::execute(conn, sql)?;
        if !conn.auto_commit() {
            conn.commit()?;
        }
        Ok(())
    }

    // === Queries ===

    /// Append pagination.
    ///
    /// A bounded limit always comes with an `OFFSET`; an offset alone uses
    /// [`MAX_LIMIT`]; neither appends nothing.
    pub fn apply_limit_offset(&self, sql: &mut String, limit: Option<u32>, offset: u32) {
        match limit {
            Some(limit) => sql.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset)),
            None if offset > 0 => sql.push_str(&format!(" LIMIT {} OFFSET {}", MAX_LIMIT, offset)),
            None => {}
        }
    }

    /// Select-list expression for a geometry column. Values are read as
    /// stored, so this is the column name.
    pub fn encode_geometry_column(&self, prefix: Option<&str>, column: &str, sql: &mut String) {
        self.encode_column_name(prefix, column, sql);
    }

    /// Select-list expression for the extent of a geometry column.
    pub fn encode_geometry_envelope(&self, column: &str, sql: &mut String) {
        self.encode_column_name(None, column, sql);
    }

    /// Compiler for filters over a column with the given SRID.
    pub fn filter_compiler(&self, srid: Option<i32>) -> SpatialPredicateCompiler {
        SpatialPredicateCompiler::new()
            .with_srid(srid.unwrap_or(UNKNOWN_SRID))
            .with_name_escape(self.config.name_escape.clone())
    }

    // === Values ===

    pub fn encode_geometry_value(
        &self,
        geometry: Option<&Geometry<f64>>,
        dimension: u32,
        srid: i32,
    ) -> Result<EncodedGeometry> {
        Ok(self.codec.encode(geometry, dimension, srid)?)
    }

    /// Decode the named geometry column of the current row.
    pub fn decode_geometry_value(
        &self,
        rs: &ResultSet,
        column: &str,
    ) -> Result<Option<Geometry<f64>>> {
        let raw = raw_geometry(rs.get_by_name(column), column)?;
        Ok(self.codec.decode(raw)?)
    }

    /// Decode the extent at a 1-based column of the current row. No other
    /// column is read.
    pub fn decode_geometry_envelope(&self, rs: &ResultSet, column: usize) -> Result<Option<Envelope>> {
        let raw = raw_geometry(rs.get(column), &column.to_string())?;
        Ok(self.codec.decode_envelope(raw)?)
    }

    // === Types and metadata ===

    pub fn geometry_type_name(&self, code: i32) -> Option<&'static str> {
        self.registry.type_name(code)
    }

    /// Geometry kind of an introspected column, `None` for scalar columns.
    pub fn classify_column(
        &self,
        conn: &dyn Connection,
        column: &ColumnMetadata,
    ) -> Result<Option<GeometryKind>> {
        self.registry.classify(conn, &self.catalog, column)
    }

    pub fn geometry_srid(
        &self,
        conn: &dyn Connection,
        schema: Option<&str>,
        table: &str,
        column: &str,
    ) -> Result<Option<i32>> {
        self.catalog.lookup_srid(conn, schema, table, column)
    }

    pub fn geometry_dimension(
        &self,
        conn: &dyn Connection,
        schema: Option<&str>,
        table: &str,
        column: &str,
    ) -> Result<u32> {
        self.catalog.lookup_dimension(conn, schema, table, column)
    }

    // === Feature ids ===

    /// Feature id of a row: `<type name>.<primary key>`.
    pub fn encode_fid(&self, type_name: &str, key: i64) -> String {
        format!("{}.{}", type_name, key)
    }

    /// Primary key of a feature id. A bare integer is accepted as the key
    /// itself.
    pub fn decode_fid(&self, type_name: &str, fid: &str) -> Result<i64> {
        let key = fid
            .strip_prefix(type_name)
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or(fid);
        key.parse::<i64>()
            .map_err(|_| DialectError::invalid_fid(fid))
    }
}

fn raw_geometry<'a>(value: Option<&'a SqlValue>, column: &str) -> Result<Option<RawGeometry<'a>>> {
    match value {
        None | Some(SqlValue::Null) => Ok(None),
        Some(SqlValue::Text(text)) => Ok(Some(RawGeometry::Text(text))),
        Some(SqlValue::Binary(bytes)) => Ok(Some(RawGeometry::Binary(bytes))),
        Some(other) => Err(CodecError::unsupported(format!(
            "column {} holds {:?}, not a geometry",
            column, other
        ))
        .into()),
    }
}
