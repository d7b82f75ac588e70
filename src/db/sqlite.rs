//! Durable collection store backed by SQLite: one `collections` table
//! keyed by collection name, payload replaced in full per write.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};

use super::store::CollectionStore;
use super::StoreError;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the store at the given path and run migrations.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        configure_pragmas(&conn)?;
        run_migrations(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        configure_pragmas(&conn)?;
        run_migrations(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }
}

impl CollectionStore for SqliteStore {
    fn read(&self, name: &str) -> Result<Option<String>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        let payload = conn
            .query_row(
                "SELECT payload FROM collections WHERE name = ?1",
                params![name],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(payload)
    }

    fn write(&self, name: &str, payload: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        conn.execute(
            "INSERT OR REPLACE INTO collections (name, payload) VALUES (?1, ?2)",
            params![name, payload],
        )?;
        Ok(())
    }
}

fn configure_pragmas(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "PRAGMA journal_mode=DELETE;
         PRAGMA foreign_keys=ON;",
    )?;
    Ok(())
}

/// Run all pending migrations.
pub fn run_migrations(conn: &Connection) -> Result<(), StoreError> {
    let current_version = get_current_version(conn);

    let migrations: Vec<(i64, &str)> = vec![
        (1, include_str!("../../resources/migrations/001_initial.sql")),
    ];

    for (version, sql) in migrations {
        if version > current_version {
            tracing::info!("Running migration v{version}");
            conn.execute_batch(sql).map_err(|e| StoreError::MigrationFailed {
                version,
                reason: e.to_string(),
            })?;
        }
    }

    Ok(())
}

/// Get the current schema version (0 if no schema exists yet).
fn get_current_version(conn: &Connection) -> i64 {
    conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
        row.get::<_, i64>(0)
    })
    .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_version_is_current() {
        let store = SqliteStore::open_in_memory().unwrap();
        let conn = store.conn.lock().unwrap();
        let version: i64 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, 1);
    }

    #[test]
    fn migration_idempotent() {
        let store = SqliteStore::open_in_memory().unwrap();
        let conn = store.conn.lock().unwrap();
        assert!(run_migrations(&conn).is_ok());
    }

    #[test]
    fn missing_collection_reads_none() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.read("medications").unwrap().is_none());
    }

    #[test]
    fn write_then_read_round_trips() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.write("medications", "[]").unwrap();
        assert_eq!(store.read("medications").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn write_replaces_existing_payload() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.write("medications", "[1]").unwrap();
        store.write("medications", "[1,2]").unwrap();
        assert_eq!(store.read("medications").unwrap().as_deref(), Some("[1,2]"));
    }

    #[test]
    fn payload_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("adhera.db");
        {
            let store = SqliteStore::open(&path).unwrap();
            store.write("medication_history", r#"[{"kept":true}]"#).unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(
            store.read("medication_history").unwrap().as_deref(),
            Some(r#"[{"kept":true}]"#)
        );
    }
}
