use std::path::Path;

use rusqlite::Connection;

use crate::error::{ImportError, Result};
use crate::models::TellerTotal;

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS teller_totals (
    id INTEGER PRIMARY KEY,
    process_date INTEGER NOT NULL,
    branch INTEGER NOT NULL,
    user INTEGER NOT NULL,
    tx_count INTEGER NOT NULL,
    created_at TEXT DEFAULT (datetime('now')),
    UNIQUE (process_date, branch, user)
);

CREATE TABLE IF NOT EXISTS imports (
    id INTEGER PRIMARY KEY,
    filename TEXT NOT NULL,
    import_date TEXT DEFAULT (datetime('now')),
    record_count INTEGER,
    process_date INTEGER,
    checksum TEXT
);
";

/// Backends this build can actually open.
const SUPPORTED_DRIVERS: &[&str] = &["sqlite3", "sqlite"];

/// Resolve the first configured driver this build supports. Runs once per
/// run, before any file is touched.
pub fn resolve_driver(preference: &[String]) -> Result<&'static str> {
    for want in preference {
        if let Some(found) = SUPPORTED_DRIVERS
            .iter()
            .find(|d| d.eq_ignore_ascii_case(want))
        {
            return Ok(found);
        }
    }
    Err(ImportError::DriverUnavailable(preference.join(", ")))
}

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Insert one observation and report affected rows. The unique key over
/// (process_date, branch, user) makes a replayed record report zero rows.
pub fn insert_total(conn: &Connection, total: &TellerTotal) -> Result<usize> {
    let affected = conn.execute(
        "INSERT OR IGNORE INTO teller_totals (process_date, branch, user, tx_count) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![total.process_date, total.branch, total.user, total.tx_count],
    )?;
    Ok(affected)
}

pub fn record_import(
    conn: &Connection,
    filename: &str,
    record_count: usize,
    process_date: u32,
    checksum: &str,
) -> Result<()> {
    conn.execute(
        "INSERT INTO imports (filename, record_count, process_date, checksum) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![filename, record_count as i64, process_date, checksum],
    )?;
    Ok(())
}

pub fn is_known_checksum(conn: &Connection, checksum: &str) -> Result<bool> {
    let mut stmt = conn.prepare("SELECT 1 FROM imports WHERE checksum = ?1")?;
    Ok(stmt.exists([checksum])?)
}
