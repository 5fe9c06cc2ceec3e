pub mod repository;
pub mod sqlite;

pub use repository::*;
pub use sqlite::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Stored document is corrupt: {0}")]
    CorruptDocument(String),

    #[error("Database directory error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Document serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
