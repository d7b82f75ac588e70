pub mod memory;
pub mod sqlite;
pub mod store;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use store::{load_collection, save_collection, CollectionStore};

use thiserror::Error;

/// Persisted collection names (one durable key per collection).
pub const MEDICATIONS: &str = "medications";
pub const MEDICATION_SCHEDULE: &str = "medication_schedule";
pub const MEDICATION_HISTORY: &str = "medication_history";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Store lock poisoned")]
    LockPoisoned,
}
