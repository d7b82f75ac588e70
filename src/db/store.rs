//! Collection store seam and typed load/save helpers.
//!
//! The engine persists three named collections, each a JSON array payload
//! under a single key. The trait keeps the durable backend swappable
//! (SQLite for the app, in-memory for tests and embedding UIs).

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::StoreError;

/// A durable mapping from collection name to serialized record list.
/// Reads and writes are atomic per key; there is no cross-key transaction.
pub trait CollectionStore: Send + Sync {
    /// Read a collection payload. `Ok(None)` means the key has never been
    /// written, which callers treat as an empty collection.
    fn read(&self, name: &str) -> Result<Option<String>, StoreError>;

    /// Replace a collection payload in full (last writer wins).
    fn write(&self, name: &str, payload: &str) -> Result<(), StoreError>;
}

/// Load a collection, decoding records leniently: a payload that is not a
/// JSON array is a persistence failure, but individual records that fail
/// typed decode are dropped with a warning rather than failing the load.
pub fn load_collection<T: DeserializeOwned>(
    store: &dyn CollectionStore,
    name: &str,
) -> Result<Vec<T>, StoreError> {
    let Some(payload) = store.read(name)? else {
        return Ok(Vec::new());
    };

    let values: Vec<serde_json::Value> = serde_json::from_str(&payload)?;

    let mut records = Vec::with_capacity(values.len());
    for (index, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<T>(value) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!(collection = name, index, error = %e, "Dropping malformed record");
            }
        }
    }
    Ok(records)
}

/// Serialize and write a full collection.
pub fn save_collection<T: Serialize>(
    store: &dyn CollectionStore,
    name: &str,
    records: &[T],
) -> Result<(), StoreError> {
    let payload = serde_json::to_string(records)?;
    store.write(name, &payload)
}
