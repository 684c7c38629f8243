use std::path::PathBuf;

use crate::db::{get_connection, init_db};
use crate::error::Result;
use crate::settings::{load_settings, save_settings, shellexpand_path, Settings};

pub fn run(data_dir: Option<String>) -> Result<()> {
    let settings = match data_dir {
        Some(dir) => Settings::rooted_at(&PathBuf::from(shellexpand_path(&dir))),
        None => load_settings(),
    };
    save_settings(&settings)?;

    std::fs::create_dir_all(&settings.inbound_dir)?;
    std::fs::create_dir_all(&settings.archive_dir)?;
    std::fs::create_dir_all(&settings.log_dir)?;

    let db_path = PathBuf::from(&settings.db_path);
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let conn = get_connection(&db_path)?;
    init_db(&conn)?;

    println!("Initialized teller-totals");
    println!("  inbound:  {}", settings.inbound_dir);
    println!("  archive:  {}", settings.archive_dir);
    println!("  logs:     {}", settings.log_dir);
    println!("  database: {}", settings.db_path);
    Ok(())
}
