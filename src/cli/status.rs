use std::path::{Path, PathBuf};

use comfy_table::Table;

use crate::db::get_connection;
use crate::error::Result;
use crate::importer::discover_files;
use crate::settings::load_settings;

pub fn run() -> Result<()> {
    let settings = load_settings();

    println!("Inbound:   {}", settings.inbound_dir);
    println!(
        "Archive:   {} (cap {})",
        settings.archive_dir, settings.archive_retention
    );
    println!(
        "Logs:      {} ({} rotations kept)",
        settings.log_dir, settings.log_retention
    );
    println!("Database:  {}", settings.db_path);

    let inbound = Path::new(&settings.inbound_dir);
    if inbound.exists() {
        println!("Pending:   {} file(s)", discover_files(inbound)?.len());
    }
    let archive = Path::new(&settings.archive_dir);
    if archive.exists() {
        let count = std::fs::read_dir(archive)?
            .filter(|e| e.as_ref().map(|e| e.path().is_file()).unwrap_or(false))
            .count();
        println!("Archived:  {count} of {} max", settings.archive_retention);
    }

    let db_path = PathBuf::from(&settings.db_path);
    if !db_path.exists() {
        println!();
        println!("Database not found. Run `teller-totals init` to set up.");
        return Ok(());
    }

    let conn = get_connection(&db_path)?;
    let totals: i64 = conn.query_row("SELECT count(*) FROM teller_totals", [], |r| r.get(0))?;
    let imports: i64 = conn.query_row("SELECT count(*) FROM imports", [], |r| r.get(0))?;
    println!();
    println!("Observations: {totals}");
    println!("Imports:      {imports}");

    let mut stmt = conn.prepare(
        "SELECT filename, record_count, process_date, import_date FROM imports ORDER BY id DESC LIMIT 10",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, i64>(1)?,
            r.get::<_, i64>(2)?,
            r.get::<_, String>(3)?,
        ))
    })?;

    let mut table = Table::new();
    table.set_header(vec!["File", "Records", "Process date", "Imported at"]);
    let mut any = false;
    for row in rows {
        let (filename, records, process_date, import_date) = row?;
        table.add_row(vec![
            filename,
            records.to_string(),
            process_date.to_string(),
            import_date,
        ]);
        any = true;
    }
    if any {
        println!();
        println!("Recent imports\n{table}");
    }
    Ok(())
}
