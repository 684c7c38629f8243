pub mod init;
pub mod run;
pub mod status;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "teller-totals",
    about = "Daily teller-totals batch importer for branch operations."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up teller-totals: write settings, create directories, initialize the database.
    Init {
        /// Root directory for inbound/, archive/, logs/ and the database
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Run one import pass: discover inbound files, import, archive, prune.
    Run,
    /// Show configuration, pending inbound files, and recent imports.
    Status,
}
