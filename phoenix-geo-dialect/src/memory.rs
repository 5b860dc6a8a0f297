//! In-memory connection for tests.
//!
//! `MemoryConnection` understands just enough SQL to keep a table list:
//! `CREATE TABLE` and `DROP TABLE` maintain it, and statements that read or
//! write a table not on the list fail with [`SqlErrorKind::TableNotFound`]
//! like the real engine. Query rows are scripted by substring match.

use crate::connection::{Connection, ResultSet, SqlError, SqlResult, SqlValue, Statement};
use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use std::sync::Arc;

#[derive(Debug)]
struct MemoryState {
    tables: FxHashSet<String>,
    executed: Vec<String>,
    bound: Vec<(String, Vec<SqlValue>)>,
    scripted: Vec<(String, ResultSet)>,
    failures: Vec<(String, SqlError)>,
    open_statements: usize,
    commits: usize,
    auto_commit: bool,
}

impl Default for MemoryState {
    fn default() -> Self {
        Self {
            tables: FxHashSet::default(),
            executed: Vec::new(),
            bound: Vec::new(),
            scripted: Vec::new(),
            failures: Vec::new(),
            open_statements: 0,
            commits: 0,
            auto_commit: true,
        }
    }
}

/// A recording in-memory connection
///
/// Clones share state, so a test can hand one clone to the dialect and
/// inspect the other.
#[derive(Debug, Clone, Default)]
pub struct MemoryConnection {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryConnection {
    /// Create a new empty connection
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an existing table.
    pub fn with_table(self, schema: Option<&str>, table: &str) -> Self {
        self.state.lock().tables.insert(table_key(schema, table));
        self
    }

    /// Serve `rows` for every query containing `pattern`.
    pub fn on_query(&self, pattern: impl Into<String>, rows: ResultSet) {
        self.state.lock().scripted.push((pattern.into(), rows));
    }

    /// Fail every statement containing `pattern` with `error`.
    pub fn fail_on(&self, pattern: impl Into<String>, error: SqlError) {
        self.state.lock().failures.push((pattern.into(), error));
    }

    pub fn set_auto_commit(&self, auto_commit: bool) {
        self.state.lock().auto_commit = auto_commit;
    }

    pub fn has_table(&self, schema: Option<&str>, table: &str) -> bool {
        self.state.lock().tables.contains(&table_key(schema, table))
    }

    /// Every statement text executed or queried so far, in order.
    pub fn executed(&self) -> Vec<String> {
        self.state.lock().executed.clone()
    }

    /// Executed statements starting with `prefix` (case-insensitive).
    pub fn executed_starting_with(&self, prefix: &str) -> Vec<String> {
        self.state
            .lock()
            .executed
            .iter()
            .filter(|sql| {
                sql.len() >= prefix.len() && sql[..prefix.len()].eq_ignore_ascii_case(prefix)
            })
            .cloned()
            .collect()
    }

    /// Parameters bound to parameterised statements, in order.
    pub fn bound_params(&self) -> Vec<(String, Vec<SqlValue>)> {
        self.state.lock().bound.clone()
    }

    /// Statements created and not yet dropped.
    pub fn open_statements(&self) -> usize {
        self.state.lock().open_statements
    }

    pub fn commits(&self) -> usize {
        self.state.lock().commits
    }

    pub fn clear_executed(&self) {
        let mut state = self.state.lock();
        state.executed.clear();
        state.bound.clear();
    }
}

impl Connection for MemoryConnection {
    fn create_statement(&self) -> SqlResult<Box<dyn Statement + '_>> {
        self.state.lock().open_statements += 1;
        Ok(Box::new(MemoryStatement {
            state: Arc::clone(&self.state),
        }))
    }

    fn table_exists(&self, schema: Option<&str>, table: &str) -> SqlResult<bool> {
        Ok(self.has_table(schema, table))
    }

    fn auto_commit(&self) -> bool {
        self.state.lock().auto_commit
    }

    fn commit(&self) -> SqlResult<()> {
        self.state.lock().commits += 1;
        Ok(())
    }
}

struct MemoryStatement {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStatement {
    fn record(&self, sql: &str) -> SqlResult<()> {
        let mut state = self.state.lock();
        state.executed.push(sql.to_string());
        match state.failures.iter().find(|(pattern, _)| sql.contains(pattern.as_str())) {
            Some((_, err)) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn apply(&self, sql: &str) -> SqlResult<()> {
        let upper = sql.trim_start().to_ascii_uppercase();
        let mut state = self.state.lock();

        if let Some(rest) = upper.strip_prefix("CREATE TABLE ") {
            let (if_clause, name) = split_if_clause(rest, "IF NOT EXISTS ");
            if !state.tables.insert(name.clone()) && !if_clause {
                return Err(SqlError::new(
                    crate::connection::SqlErrorKind::Constraint,
                    format!("table {} already exists", name),
                ));
            }
            return Ok(());
        }

        if let Some(rest) = upper.strip_prefix("DROP TABLE ") {
            let (if_clause, name) = split_if_clause(rest, "IF EXISTS ");
            if !state.tables.remove(&name) && !if_clause {
                return Err(SqlError::table_not_found(name));
            }
            return Ok(());
        }

        for keyword in ["UPSERT INTO ", "DELETE FROM "] {
            if let Some(rest) = upper.strip_prefix(keyword) {
                let name = leading_name(rest);
                if !state.tables.contains(&name) {
                    return Err(SqlError::table_not_found(name));
                }
            }
        }
        Ok(())
    }
}

impl Statement for MemoryStatement {
    fn execute(&mut self, sql: &str) -> SqlResult<()> {
        self.record(sql)?;
        self.apply(sql)
    }

    fn execute_with_params(&mut self, sql: &str, params: &[SqlValue]) -> SqlResult<()> {
        self.record(sql)?;
        self.state
            .lock()
            .bound
            .push((sql.to_string(), params.to_vec()));
        self.apply(sql)
    }

    fn query(&mut self, sql: &str) -> SqlResult<ResultSet> {
        self.record(sql)?;
        let state = self.state.lock();

        let upper = sql.to_ascii_uppercase();
        if let Some(pos) = upper.find(" FROM ") {
            let name = leading_name(&upper[pos + " FROM ".len()..]);
            if !state.tables.contains(&name) {
                return Err(SqlError::table_not_found(name));
            }
        }

        Ok(state
            .scripted
            .iter()
            .find(|(pattern, _)| sql.contains(pattern.as_str()))
            .map(|(_, rows)| rows.clone())
            .unwrap_or_default())
    }
}

impl Drop for MemoryStatement {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        state.open_statements = state.open_statements.saturating_sub(1);
    }
}

fn table_key(schema: Option<&str>, table: &str) -> String {
    match schema {
        Some(schema) => format!("{}.{}", schema, table).to_ascii_uppercase(),
        None => table.to_ascii_uppercase(),
    }
}

fn split_if_clause(rest: &str, clause: &str) -> (bool, String) {
    match rest.trim_start().strip_prefix(clause) {
        Some(after) => (true, leading_name(after)),
        None => (false, leading_name(rest)),
    }
}

fn leading_name(text: &str) -> String {
    text.trim_start()
        .split(|c: char| c.is_whitespace() || c == '(' || c == ';')
        .next()
        .unwrap_or_default()
        .replace('"', "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{execute, query, SqlErrorKind};

    #[test]
    fn test_create_and_drop_tables() {
        let conn = MemoryConnection::new();
        execute(&conn, "CREATE TABLE roads (FID INTEGER PRIMARY KEY DESC)").unwrap();
        assert!(conn.has_table(None, "ROADS"));

        let err = execute(&conn, "CREATE TABLE ROADS (FID INTEGER)").unwrap_err();
        assert_eq!(err.kind, SqlErrorKind::Constraint);
        execute(&conn, "CREATE TABLE IF NOT EXISTS ROADS (FID INTEGER)").unwrap();

        execute(&conn, "DROP TABLE roads").unwrap();
        assert!(!conn.has_table(None, "roads"));
        assert!(execute(&conn, "DROP TABLE roads").unwrap_err().is_table_not_found());
    }

    #[test]
    fn test_unknown_table_is_not_found() {
        let conn = MemoryConnection::new();
        let err = query(&conn, "SELECT SRID FROM GEOMETRY_COLUMNS WHERE 1 = 1").unwrap_err();
        assert!(err.is_table_not_found());
        assert!(execute(&conn, "UPSERT INTO T VALUES (1)").unwrap_err().is_table_not_found());
    }

    #[test]
    fn test_scripted_rows_and_failures() {
        let conn = MemoryConnection::new().with_table(Some("gis"), "roads");
        conn.on_query("FROM GIS.ROADS", ResultSet::from_rows(["N"], vec![vec![3i64]]));
        let mut rs = query(&conn, "SELECT N FROM GIS.ROADS").unwrap();
        assert!(rs.next());
        assert_eq!(rs.get_i64(1), Some(3));

        conn.fail_on("ROADS", SqlError::new(SqlErrorKind::Connection, "lost"));
        assert_eq!(
            query(&conn, "SELECT N FROM GIS.ROADS").unwrap_err().kind,
            SqlErrorKind::Connection
        );
    }

    #[test]
    fn test_statements_released() {
        let conn = MemoryConnection::new();
        {
            let _a = conn.create_statement().unwrap();
            let _b = conn.create_statement().unwrap();
            assert_eq!(conn.open_statements(), 2);
        }
        assert_eq!(conn.open_statements(), 0);
        let _ = query(&conn, "SELECT * FROM MISSING");
        assert_eq!(conn.open_statements(), 0);
    }
}
