use std::{fs, path::Path};

use duckdb::Connection;
use log::warn;

use crate::error::TripDataError;

/// Open the DuckDB file at `duckdb_path`, run `f` with the connection and
/// close it again, whether `f` succeeded or not.  The parent directory of the
/// database file is created if needed.
pub fn with_connection<T, F>(duckdb_path: &Path, f: F) -> Result<T, TripDataError>
where
    F: FnOnce(&mut Connection) -> Result<T, TripDataError>,
{
    if let Some(dir) = duckdb_path.parent().filter(|e| !e.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let mut conn = Connection::open(duckdb_path)?;
    let res = f(&mut conn);
    match (conn.close(), res) {
        (Ok(()), res) => res,
        (Err((_, e)), Ok(_)) => Err(e.into()),
        (Err((_, e)), Err(err)) => {
            warn!("Failed to close {}: {}", duckdb_path.display(), e);
            Err(err)
        }
    }
}

/// Quote a string as a SQL literal, e.g. a file path inside `read_parquet('...')`.
pub fn quote_literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

pub fn count_rows(conn: &Connection, table: &str) -> Result<u64, duckdb::Error> {
    let n: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
        row.get(0)
    })?;
    Ok(n as u64)
}

pub fn table_exists(conn: &Connection, table: &str) -> Result<bool, duckdb::Error> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM information_schema.tables WHERE table_name = ?",
        duckdb::params![table],
        |row| row.get(0),
    )?;
    Ok(n > 0)
}
