use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("No compatible database driver (tried: {0})")]
    DriverUnavailable(String),

    #[error("{path}:{line}: {reason}")]
    Parse {
        path: String,
        line: usize,
        reason: String,
    },

    #[error("Insert affected no rows: {0}")]
    InsertRejected(String),

    #[error("Archive move failed: {0}")]
    Archive(String),

    #[error("Settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, ImportError>;
