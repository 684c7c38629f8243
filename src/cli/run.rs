use std::path::{Path, PathBuf};

use colored::Colorize;
use tracing::{error, info};

use crate::archiver::{archive_file, prune_archive};
use crate::db::{get_connection, init_db, resolve_driver};
use crate::error::Result;
use crate::importer::{discover_files, import_file};
use crate::logger::init_logging;
use crate::models::ImportOutcome;
use crate::settings::load_settings;

/// One full import pass: discover inbound files, import each inside its own
/// failure boundary, archive what committed, prune the archive.
///
/// Per-file errors are logged and do not affect the exit code; only setup
/// failures (driver unavailable, unreadable inbound directory) propagate.
pub fn run() -> Result<()> {
    let settings = load_settings();
    let _guard = init_logging(Path::new(&settings.log_dir), settings.log_retention);

    let driver = match resolve_driver(&settings.drivers) {
        Ok(d) => d,
        Err(e) => {
            error!("{e}");
            return Err(e);
        }
    };
    info!("using database driver {driver}");

    let db_path = PathBuf::from(&settings.db_path);
    {
        let conn = get_connection(&db_path)?;
        init_db(&conn)?;
    }

    let inbound_dir = Path::new(&settings.inbound_dir);
    let files = match discover_files(inbound_dir) {
        Ok(f) => f,
        Err(e) => {
            error!("cannot read inbound directory {}: {e}", inbound_dir.display());
            return Err(e);
        }
    };
    info!("{} inbound file(s) in {}", files.len(), inbound_dir.display());

    // Each file gets its own connection, transaction, and failure boundary;
    // one bad file never affects the others.
    let mut to_archive: Vec<PathBuf> = Vec::new();
    let mut imported = 0usize;
    let mut failed = 0usize;
    for path in &files {
        let outcome = get_connection(&db_path).and_then(|mut conn| import_file(&mut conn, path));
        match outcome {
            Ok(ImportOutcome::Committed {
                records,
                process_date,
            }) => {
                info!(
                    "successfully imported {} ({records} records, process_date={process_date})",
                    path.display()
                );
                imported += 1;
                to_archive.push(path.clone());
            }
            Ok(ImportOutcome::AlreadyImported) => {
                to_archive.push(path.clone());
            }
            Err(e) => {
                error!("import of {} failed: {e}", path.display());
                failed += 1;
            }
        }
    }

    let archive_dir = Path::new(&settings.archive_dir);
    let mut archived = 0usize;
    for path in &to_archive {
        match archive_file(path, archive_dir) {
            Ok(dest) => {
                info!("archived {}", dest.display());
                archived += 1;
            }
            // File stays inbound; the checksum ledger stops a reinsert on
            // the next run.
            Err(e) => error!("{e}"),
        }
    }

    let pruned = if archive_dir.exists() {
        match prune_archive(archive_dir, settings.archive_retention) {
            Ok(n) => n,
            Err(e) => {
                error!("archive prune failed: {e}");
                0
            }
        }
    } else {
        0
    };

    let imported_part = format!("{imported} imported").green().to_string();
    let failed_part = if failed > 0 {
        format!("{failed} failed").red().to_string()
    } else {
        format!("{failed} failed")
    };
    println!("{imported_part}, {failed_part}, {archived} archived, {pruned} pruned");
    Ok(())
}
