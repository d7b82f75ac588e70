//! In-memory collection store — tests and UI prototyping without a file.

use std::collections::HashMap;
use std::sync::Mutex;

use super::store::CollectionStore;
use super::StoreError;

#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CollectionStore for MemoryStore {
    fn read(&self, name: &str) -> Result<Option<String>, StoreError> {
        let map = self.collections.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(map.get(name).cloned())
    }

    fn write(&self, name: &str, payload: &str) -> Result<(), StoreError> {
        let mut map = self.collections.lock().map_err(|_| StoreError::LockPoisoned)?;
        map.insert(name.to_string(), payload.to_string());
        Ok(())
    }
}
