//! SQL connection interfaces consumed by the dialect.
//!
//! The dialect never opens connections itself. Callers hand it a
//! [`Connection`]; every statement the dialect creates on it is dropped
//! before the call returns, on success and error paths alike.

use thiserror::Error;

/// A single SQL value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Double(f64),
    Text(String),
    Binary(Vec<u8>),
    Boolean(bool),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Integer(v) => Some(*v),
            SqlValue::Double(v) => Some(*v as i64),
            SqlValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SqlValue::Integer(v) => Some(*v as f64),
            SqlValue::Double(v) => Some(*v),
            SqlValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            SqlValue::Binary(b) => Some(b),
            _ => None,
        }
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Integer(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Integer(v as i64)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Double(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(v: Vec<u8>) -> Self {
        SqlValue::Binary(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

/// Classification of a failed statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlErrorKind {
    /// Referenced table does not exist.
    TableNotFound,
    Syntax,
    Constraint,
    /// Connection lost or refused.
    Connection,
    Other,
}

/// Error reported by the underlying connection.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("SQL error ({kind:?}): {message}")]
pub struct SqlError {
    pub kind: SqlErrorKind,
    pub message: String,
}

impl SqlError {
    pub fn new(kind: SqlErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Create a table-not-found error
    pub fn table_not_found(table: impl Into<String>) -> Self {
        Self::new(SqlErrorKind::TableNotFound, table)
    }

    pub fn is_table_not_found(&self) -> bool {
        self.kind == SqlErrorKind::TableNotFound
    }
}

/// Result type for connection operations
pub type SqlResult<T> = std::result::Result<T, SqlError>;

/// Fully materialised query result with a forward-only cursor.
///
/// Column indexes passed to the getters are 1-based.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    columns: Vec<String>,
    rows: Vec<Vec<SqlValue>>,
    cursor: Option<usize>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<SqlValue>>) -> Self {
        Self {
            columns,
            rows,
            cursor: None,
        }
    }

    /// Build from column names and rows of convertible values.
    pub fn from_rows<C, R, V>(columns: C, rows: R) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        R: IntoIterator<Item = Vec<V>>,
        V: Into<SqlValue>,
    {
        Self::new(
            columns.into_iter().map(Into::into).collect(),
            rows.into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        )
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Advance to the next row. Returns `false` once the rows are exhausted.
    pub fn next(&mut self) -> bool {
        let next = self.cursor.map_or(0, |c| c + 1);
        if next < self.rows.len() {
            self.cursor = Some(next);
            true
        } else {
            self.cursor = Some(self.rows.len());
            false
        }
    }

    /// Value at a 1-based column index in the current row.
    pub fn get(&self, column: usize) -> Option<&SqlValue> {
        let row = self.rows.get(self.cursor?)?;
        row.get(column.checked_sub(1)?)
    }

    /// Value of the named column (case-insensitive) in the current row.
    pub fn get_by_name(&self, name: &str) -> Option<&SqlValue> {
        let idx = self
            .columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))?;
        self.get(idx + 1)
    }

    pub fn get_i64(&self, column: usize) -> Option<i64> {
        self.get(column).and_then(SqlValue::as_i64)
    }

    pub fn get_string(&self, column: usize) -> Option<&str> {
        self.get(column).and_then(SqlValue::as_str)
    }

    pub fn get_bytes(&self, column: usize) -> Option<&[u8]> {
        self.get(column).and_then(SqlValue::as_bytes)
    }
}

/// A statement created on a [`Connection`]. Released when dropped.
pub trait Statement {
    /// Execute DDL or DML.
    fn execute(&mut self, sql: &str) -> SqlResult<()>;

    /// Execute DML with positional `?` parameters.
    fn execute_with_params(&mut self, sql: &str, params: &[SqlValue]) -> SqlResult<()>;

    /// Run a query and materialise its rows.
    fn query(&mut self, sql: &str) -> SqlResult<ResultSet>;
}

/// An open database connection.
pub trait Connection: Send + Sync {
    fn create_statement(&self) -> SqlResult<Box<dyn Statement + '_>>;

    /// Schema introspection: whether a table exists.
    fn table_exists(&self, schema: Option<&str>, table: &str) -> SqlResult<bool>;

    fn auto_commit(&self) -> bool {
        true
    }

    fn commit(&self) -> SqlResult<()> {
        Ok(())
    }
}

/// Execute one statement, releasing it before returning.
pub fn execute(conn: &dyn Connection, sql: &str) -> SqlResult<()> {
    let mut statement = conn.create_statement()?;
    statement.execute(sql)
}

/// Execute one parameterised statement, releasing it before returning.
pub fn execute_with_params(conn: &dyn Connection, sql: &str, params: &[SqlValue]) -> SqlResult<()> {
    let mut statement = conn.create_statement()?;
    statement.execute_with_params(sql, params)
}

/// Run one query, releasing the statement before returning.
pub fn query(conn: &dyn Connection, sql: &str) -> SqlResult<ResultSet> {
    let mut statement = conn.create_statement()?;
    statement.query(sql)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_set_cursor() {
        let mut rs = ResultSet::from_rows(["ID", "SRID"], vec![
            vec![SqlValue::from("a"), SqlValue::from(4326)],
            vec![SqlValue::from("b"), SqlValue::Null],
        ]);
        assert!(rs.get(1).is_none(), "no current row before next()");
        assert!(rs.next());
        assert_eq!(rs.get_string(1), Some("a"));
        assert_eq!(rs.get_i64(2), Some(4326));
        assert_eq!(rs.get_by_name("srid"), Some(&SqlValue::Integer(4326)));
        assert!(rs.next());
        assert_eq!(rs.get_i64(2), None);
        assert!(!rs.next());
        assert!(!rs.next());
        assert!(rs.get(1).is_none());
    }

    #[test]
    fn test_zero_column_index() {
        let mut rs = ResultSet::from_rows(["X"], vec![vec![1i64]]);
        assert!(rs.next());
        assert!(rs.get(0).is_none());
    }

    #[test]
    fn test_value_conversions() {
        assert_eq!(SqlValue::from(None::<i64>), SqlValue::Null);
        assert_eq!(SqlValue::Text(" 7 ".into()).as_i64(), Some(7));
        assert_eq!(SqlValue::Integer(2).as_f64(), Some(2.0));
        assert!(SqlError::table_not_found("GEOMETRY_COLUMNS").is_table_not_found());
    }
}
