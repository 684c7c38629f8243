use std::path::{Path, PathBuf};

use rusqlite::Connection;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::db::{insert_total, is_known_checksum, record_import};
use crate::error::{ImportError, Result};
use crate::models::{ImportOutcome, TellerTotal};

// ---------------------------------------------------------------------------
// Line parsing
// ---------------------------------------------------------------------------

/// Parse `MM/DD/YYYY` into an 8-digit YYYYMMDD integer. The year must be
/// four digits and the whole thing a real calendar date.
pub fn parse_date_mdy(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    let parts: Vec<&str> = raw.split('/').collect();
    if parts.len() != 3 || parts[2].len() != 4 {
        return None;
    }
    let m: u32 = parts[0].parse().ok()?;
    let d: u32 = parts[1].parse().ok()?;
    let y: i32 = parts[2].parse().ok()?;
    chrono::NaiveDate::from_ymd_opt(y, m, d)?;
    Some(y as u32 * 10_000 + m * 100 + d)
}

fn parse_err(path: &Path, line: u64, reason: impl Into<String>) -> ImportError {
    ImportError::Parse {
        path: path.display().to_string(),
        line: line as usize,
        reason: reason.into(),
    }
}

fn parse_record(path: &Path, line: u64, record: &csv::StringRecord) -> Result<TellerTotal> {
    if record.len() != 4 {
        return Err(parse_err(
            path,
            line,
            format!("expected 4 comma-separated fields, got {}", record.len()),
        ));
    }
    let int_field = |idx: usize, name: &str| -> Result<i64> {
        record[idx]
            .parse()
            .map_err(|_| parse_err(path, line, format!("{name} is not an integer: '{}'", &record[idx])))
    };
    let branch = int_field(0, "branch")?;
    let user = int_field(1, "user")?;
    let tx_count = int_field(2, "tx_count")?;
    let process_date = parse_date_mdy(&record[3])
        .ok_or_else(|| parse_err(path, line, format!("invalid date '{}': expected MM/DD/YYYY", &record[3])))?;
    Ok(TellerTotal {
        process_date,
        branch,
        user,
        tx_count,
    })
}

// ---------------------------------------------------------------------------
// Batch loading
// ---------------------------------------------------------------------------

/// Enumerate inbound `*.txt` files in directory-listing order (unsorted).
pub fn discover_files(inbound_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(inbound_dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if path
            .extension()
            .map_or(false, |e| e.eq_ignore_ascii_case("txt"))
        {
            files.push(path);
        }
    }
    Ok(files)
}

/// Read every line of one inbound file into an ordered batch. The first bad
/// line fails the whole file; no partial batch is ever queued.
pub fn read_batch(path: &Path) -> Result<Vec<TellerTotal>> {
    let file = std::fs::File::open(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(std::io::BufReader::new(file));
    let mut batch = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result?;
        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(idx as u64 + 1);
        batch.push(parse_record(path, line, &record)?);
    }
    if batch.is_empty() {
        return Err(parse_err(path, 1, "file contains no records"));
    }
    Ok(batch)
}

fn compute_checksum(file_path: &Path) -> Result<String> {
    let data = std::fs::read(file_path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}

// ---------------------------------------------------------------------------
// import_file
// ---------------------------------------------------------------------------

/// Import one inbound file inside a single all-or-nothing transaction.
///
/// Every insert must report at least one affected row; a zero-row insert or
/// any database error rolls the whole batch back (the transaction rolls back
/// on drop). Commit also writes the imports ledger entry, so a file is in the
/// ledger iff its batch is in the database.
pub fn import_file(conn: &mut Connection, path: &Path) -> Result<ImportOutcome> {
    let checksum = compute_checksum(path)?;
    if is_known_checksum(conn, &checksum)? {
        warn!(
            "{} already imported (checksum match); queueing for archive only",
            path.display()
        );
        return Ok(ImportOutcome::AlreadyImported);
    }

    let batch = read_batch(path)?;
    let process_date = batch.last().map(|t| t.process_date).unwrap_or(0);

    let tx = conn.transaction()?;
    for total in &batch {
        let affected = insert_total(&tx, total)?;
        if affected == 0 {
            return Err(ImportError::InsertRejected(total.to_string()));
        }
        debug!("record inserted: {total}");
    }
    let filename = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    record_import(&tx, filename, batch.len(), process_date, &checksum)?;
    tx.commit()?;

    Ok(ImportOutcome::Committed {
        records: batch.len(),
        process_date,
    })
}
