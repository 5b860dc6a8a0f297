//! The `GEOMETRY_COLUMNS` metadata relation.
//!
//! Phoenix stores geometries in plain columns, so the geometry kind, SRID
//! and coordinate dimension of each spatial column are kept in an
//! auxiliary table with one row per column:
//!
//! ```text
//! GEOMETRY_COLUMNS(ID VARCHAR(200) NOT NULL PRIMARY KEY,
//!                  F_TABLE_SCHEMA VARCHAR(255), F_TABLE_NAME VARCHAR(255),
//!                  F_GEOMETRY_COLUMN VARCHAR(255), COORD_DIMENSION INTEGER,
//!                  SRID INTEGER, TYPE VARCHAR(32))
//! ```
//!
//! Schema, table and column names are stored upper-cased to match the
//! engine's identifier folding. The table may not exist yet on a fresh
//! database; lookups then report no metadata instead of failing.

use crate::connection::{self, Connection, ResultSet, SqlResult};
use crate::error::Result;
use crate::schema::{SpatialColumnDescriptor, DEFAULT_DIMENSION, UNKNOWN_SRID};
use phoenix_geo_core::GeometryKind;

/// Name of the metadata relation.
pub const CATALOG_TABLE: &str = "GEOMETRY_COLUMNS";

const COL_ID: &str = "ID";
const COL_SCHEMA: &str = "F_TABLE_SCHEMA";
const COL_TABLE: &str = "F_TABLE_NAME";
const COL_COLUMN: &str = "F_GEOMETRY_COLUMN";
const COL_DIMENSION: &str = "COORD_DIMENSION";
const COL_SRID: &str = "SRID";
const COL_TYPE: &str = "TYPE";

/// Reads and writes spatial column metadata.
#[derive(Debug, Clone, Default)]
pub struct MetadataCatalog {
    escape: String,
}

impl MetadataCatalog {
    pub fn new(name_escape: impl Into<String>) -> Self {
        Self {
            escape: name_escape.into(),
        }
    }

    fn name(&self, raw: &str) -> String {
        format!("{}{}{}", self.escape, raw, self.escape)
    }

    /// DDL creating the relation.
    pub fn create_table_sql(&self) -> String {
        format!(
            "CREATE TABLE {}({} VARCHAR(200) NOT NULL PRIMARY KEY, {} VARCHAR(255), {} VARCHAR(255), {} VARCHAR(255), {} INTEGER, {} INTEGER, {} VARCHAR(32))",
            self.name(CATALOG_TABLE),
            self.name(COL_ID),
            self.name(COL_SCHEMA),
            self.name(COL_TABLE),
            self.name(COL_COLUMN),
            self.name(COL_DIMENSION),
            self.name(COL_SRID),
            self.name(COL_TYPE),
        )
    }

    /// Create the relation unless it already exists.
    ///
    /// Returns `true` when the table was created by this call.
    pub fn ensure_catalog_table(&self, conn: &dyn Connection) -> Result<bool> {
        if conn.table_exists(None, CATALOG_TABLE)? {
            tracing::trace!("geometry catalog already present");
            return Ok(false);
        }
        let sql = self.create_table_sql();
        tracing::debug!(sql = %sql, "creating geometry catalog");
        connection::execute(conn, &sql)?;
        Ok(true)
    }

    /// Upsert the row describing one spatial column.
    ///
    /// An existing row for the same (schema, table, column) keeps its id, so
    /// each column is described at most once. Returns the row id.
    pub fn record_column(
        &self,
        conn: &dyn Connection,
        column: &SpatialColumnDescriptor,
    ) -> Result<String> {
        let schema = present(column.schema.as_deref());
        let existing = self.query_recovering(
            conn,
            &self.select_sql(&[COL_ID], schema, &column.table, Some(&column.column)),
        )?;
        let id = existing
            .and_then(|mut rs| {
                if rs.next() {
                    rs.get_string(1).map(str::to_string)
                } else {
                    None
                }
            })
            .unwrap_or_else(new_row_id);

        let sql = format!(
            "UPSERT INTO {} VALUES ({}, {}, {}, {}, {}, {}, {})",
            self.name(CATALOG_TABLE),
            quote(&id),
            quote_upper_or_null(schema),
            quote(&column.table.to_uppercase()),
            quote(&column.column.to_uppercase()),
            column.dimension,
            column.srid,
            quote(column.kind.name()),
        );
        tracing::debug!(sql = %sql, "recording geometry column");
        connection::execute(conn, &sql)?;
        Ok(id)
    }

    /// SRID of a spatial column, if recorded.
    pub fn lookup_srid(
        &self,
        conn: &dyn Connection,
        schema: Option<&str>,
        table: &str,
        column: &str,
    ) -> Result<Option<i32>> {
        self.lookup_value(conn, COL_SRID, schema, table, column, |rs| {
            rs.get_i64(1).and_then(|v| i32::try_from(v).ok())
        })
    }

    /// Coordinate dimension of a spatial column, 2 when unknown.
    pub fn lookup_dimension(
        &self,
        conn: &dyn Connection,
        schema: Option<&str>,
        table: &str,
        column: &str,
    ) -> Result<u32> {
        let dimension = self.lookup_value(conn, COL_DIMENSION, schema, table, column, |rs| {
            rs.get_i64(1).and_then(|v| u32::try_from(v).ok())
        })?;
        Ok(dimension.unwrap_or(DEFAULT_DIMENSION))
    }

    /// Recorded type name of a spatial column, as stored.
    pub fn lookup_type_name(
        &self,
        conn: &dyn Connection,
        schema: Option<&str>,
        table: &str,
        column: &str,
    ) -> Result<Option<String>> {
        self.lookup_value(conn, COL_TYPE, schema, table, column, |rs| {
            rs.get_string(1).map(str::to_string)
        })
    }

    /// Recorded geometry kind of a spatial column.
    pub fn lookup_geometry_kind(
        &self,
        conn: &dyn Connection,
        schema: Option<&str>,
        table: &str,
        column: &str,
    ) -> Result<Option<GeometryKind>> {
        Ok(self
            .lookup_type_name(conn, schema, table, column)?
            .and_then(|name| GeometryKind::from_name(&name)))
    }

    /// All recorded spatial columns of a table.
    pub fn columns_for_table(
        &self,
        conn: &dyn Connection,
        schema: Option<&str>,
        table: &str,
    ) -> Result<Vec<SpatialColumnDescriptor>> {
        let sql = self.select_sql(
            &[COL_COLUMN, COL_DIMENSION, COL_SRID, COL_TYPE],
            schema,
            table,
            None,
        );
        let Some(mut rs) = self.query_recovering(conn, &sql)? else {
            return Ok(Vec::new());
        };

        let mut columns = Vec::with_capacity(rs.len());
        while rs.next() {
            let Some(name) = rs.get_string(1) else {
                continue;
            };
            let kind = match rs.get_string(4).and_then(GeometryKind::from_name) {
                Some(kind) => kind,
                None => {
                    tracing::debug!(
                        table,
                        column = name,
                        "unknown geometry type in catalog, treating as GEOMETRY"
                    );
                    GeometryKind::Geometry
                }
            };
            let dimension = rs
                .get_i64(2)
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(DEFAULT_DIMENSION);
            let srid = rs
                .get_i64(3)
                .and_then(|v| i32::try_from(v).ok())
                .unwrap_or(UNKNOWN_SRID);
            columns.push(
                SpatialColumnDescriptor::new(table.to_uppercase(), name, kind)
                    .with_schema(present(schema).map(str::to_uppercase).as_deref())
                    .with_dimension(dimension)
                    .with_srid(srid),
            );
        }
        Ok(columns)
    }

    /// Delete the rows of a dropped table. A missing catalog is not an error.
    pub fn forget_table(
        &self,
        conn: &dyn Connection,
        schema: Option<&str>,
        table: &str,
    ) -> Result<()> {
        let sql = format!(
            "DELETE FROM {} WHERE {}",
            self.name(CATALOG_TABLE),
            self.where_clause(schema, table, None)
        );
        tracing::debug!(sql = %sql, "forgetting geometry columns");
        recover_missing(connection::execute(conn, &sql))?;
        Ok(())
    }

    fn lookup_value<T>(
        &self,
        conn: &dyn Connection,
        value_column: &str,
        schema: Option<&str>,
        table: &str,
        column: &str,
        read: impl FnOnce(&ResultSet) -> Option<T>,
    ) -> Result<Option<T>> {
        let sql = self.select_sql(&[value_column], schema, table, Some(column));
        let Some(mut rs) = self.query_recovering(conn, &sql)? else {
            return Ok(None);
        };
        if rs.next() {
            Ok(read(&rs))
        } else {
            Ok(None)
        }
    }

    fn query_recovering(&self, conn: &dyn Connection, sql: &str) -> Result<Option<ResultSet>> {
        tracing::debug!(sql = %sql, "geometry catalog lookup");
        Ok(recover_missing(connection::query(conn, sql))?)
    }

    fn select_sql(
        &self,
        columns: &[&str],
        schema: Option<&str>,
        table: &str,
        column: Option<&str>,
    ) -> String {
        let selected: Vec<String> = columns.iter().map(|c| self.name(c)).collect();
        format!(
            "SELECT {} FROM {} WHERE {}",
            selected.join(", "),
            self.name(CATALOG_TABLE),
            self.where_clause(schema, table, column)
        )
    }

    fn where_clause(&self, schema: Option<&str>, table: &str, column: Option<&str>) -> String {
        let mut clause = self.name(COL_SCHEMA);
        match present(schema) {
            Some(schema) => {
                clause.push_str(" = ");
                clause.push_str(&quote(&schema.to_uppercase()));
            }
            None => clause.push_str(" IS NULL"),
        }
        clause.push_str(&format!(
            " AND {} = {}",
            self.name(COL_TABLE),
            quote(&table.to_uppercase())
        ));
        if let Some(column) = column {
            clause.push_str(&format!(
                " AND {} = {}",
                self.name(COL_COLUMN),
                quote(&column.to_uppercase())
            ));
        }
        clause
    }
}

/// Treat a missing catalog table as "no metadata".
fn recover_missing<T>(result: SqlResult<T>) -> SqlResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_table_not_found() => {
            tracing::trace!(error = %err, "geometry catalog not present");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

fn new_row_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Quote a SQL string literal.
pub(crate) fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// A blank schema name means no schema.
fn present(schema: Option<&str>) -> Option<&str> {
    schema.filter(|s| !s.trim().is_empty())
}

fn quote_upper_or_null(value: Option<&str>) -> String {
    match value {
        Some(v) => quote(&v.to_uppercase()),
        None => "NULL".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{SqlError, SqlErrorKind, SqlValue};
    use crate::memory::MemoryConnection;
    use pretty_assertions::assert_eq;

    fn catalog_rows(rows: Vec<Vec<SqlValue>>) -> ResultSet {
        ResultSet::from_rows(
            [COL_COLUMN, COL_DIMENSION, COL_SRID, COL_TYPE],
            rows,
        )
    }

    #[test]
    fn test_create_table_sql() {
        assert_eq!(
            MetadataCatalog::default().create_table_sql(),
            "CREATE TABLE GEOMETRY_COLUMNS(ID VARCHAR(200) NOT NULL PRIMARY KEY, \
             F_TABLE_SCHEMA VARCHAR(255), F_TABLE_NAME VARCHAR(255), \
             F_GEOMETRY_COLUMN VARCHAR(255), COORD_DIMENSION INTEGER, SRID INTEGER, \
             TYPE VARCHAR(32))"
        );
    }

    #[test]
    fn test_ensure_is_idempotent() {
        let conn = MemoryConnection::new();
        let catalog = MetadataCatalog::default();
        assert!(catalog.ensure_catalog_table(&conn).unwrap());
        assert!(!catalog.ensure_catalog_table(&conn).unwrap());
        assert_eq!(conn.executed_starting_with("CREATE TABLE").len(), 1);
        assert_eq!(conn.open_statements(), 0);
    }

    #[test]
    fn test_record_column_new_row() {
        let conn = MemoryConnection::new().with_table(None, CATALOG_TABLE);
        let catalog = MetadataCatalog::default();
        let column = SpatialColumnDescriptor::new("roads", "geom", GeometryKind::LineString)
            .with_schema(Some("gis"))
            .with_srid(4326);
        let id = catalog.record_column(&conn, &column).unwrap();

        assert_eq!(id.len(), 32);
        assert!(!id.contains('-'));
        let upserts = conn.executed_starting_with("UPSERT");
        assert_eq!(
            upserts,
            vec![format!(
                "UPSERT INTO GEOMETRY_COLUMNS VALUES ('{}', 'GIS', 'ROADS', 'GEOM', 2, 4326, 'LINESTRING')",
                id
            )]
        );
    }

    #[test]
    fn test_record_column_reuses_id() {
        let conn = MemoryConnection::new().with_table(None, CATALOG_TABLE);
        conn.on_query(
            "SELECT ID FROM",
            ResultSet::from_rows([COL_ID], vec![vec!["abc123"]]),
        );
        let catalog = MetadataCatalog::default();
        let column = SpatialColumnDescriptor::new("roads", "geom", GeometryKind::Point);
        assert_eq!(catalog.record_column(&conn, &column).unwrap(), "abc123");
        assert!(conn.executed_starting_with("UPSERT")[0].contains("('abc123', NULL, 'ROADS'"));
    }

    #[test]
    fn test_lookups_without_catalog() {
        let conn = MemoryConnection::new();
        let catalog = MetadataCatalog::default();
        assert_eq!(catalog.lookup_srid(&conn, None, "roads", "geom").unwrap(), None);
        assert_eq!(catalog.lookup_dimension(&conn, None, "roads", "geom").unwrap(), 2);
        assert_eq!(
            catalog.lookup_geometry_kind(&conn, None, "roads", "geom").unwrap(),
            None
        );
        assert!(catalog.columns_for_table(&conn, None, "roads").unwrap().is_empty());
        catalog.forget_table(&conn, None, "roads").unwrap();
        assert_eq!(conn.open_statements(), 0);
    }

    #[test]
    fn test_lookup_propagates_other_failures() {
        let conn = MemoryConnection::new().with_table(None, CATALOG_TABLE);
        conn.fail_on(
            "SELECT SRID",
            SqlError::new(SqlErrorKind::Connection, "connection reset"),
        );
        let catalog = MetadataCatalog::default();
        assert!(catalog.lookup_srid(&conn, None, "roads", "geom").is_err());
        assert_eq!(conn.open_statements(), 0);
    }

    #[test]
    fn test_lookup_sql_and_values() {
        let conn = MemoryConnection::new().with_table(None, CATALOG_TABLE);
        conn.on_query(
            "SELECT SRID FROM",
            ResultSet::from_rows([COL_SRID], vec![vec![3857i64]]),
        );
        let catalog = MetadataCatalog::default();
        assert_eq!(
            catalog.lookup_srid(&conn, Some("gis"), "roads", "geom").unwrap(),
            Some(3857)
        );
        assert_eq!(
            conn.executed().last().unwrap(),
            "SELECT SRID FROM GEOMETRY_COLUMNS WHERE F_TABLE_SCHEMA = 'GIS' \
             AND F_TABLE_NAME = 'ROADS' AND F_GEOMETRY_COLUMN = 'GEOM'"
        );
    }

    #[test]
    fn test_columns_for_table() {
        let conn = MemoryConnection::new().with_table(None, CATALOG_TABLE);
        conn.on_query(
            "SELECT F_GEOMETRY_COLUMN",
            catalog_rows(vec![
                vec!["GEOM".into(), 2i64.into(), 4326i64.into(), "POINT".into()],
                vec!["AREA".into(), SqlValue::Null, SqlValue::Null, "GEOMETRYCOLLETION".into()],
            ]),
        );
        let columns = MetadataCatalog::default()
            .columns_for_table(&conn, None, "parcels")
            .unwrap();
        assert_eq!(columns.len(), 2);
        assert_eq!(
            columns[0],
            SpatialColumnDescriptor::new("PARCELS", "GEOM", GeometryKind::Point).with_srid(4326)
        );
        assert_eq!(columns[1].kind, GeometryKind::GeometryCollection);
        assert_eq!(columns[1].srid, UNKNOWN_SRID);
        assert_eq!(columns[1].dimension, 2);
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("O'Hare"), "'O''Hare'");
    }
}
