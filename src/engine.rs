use crate::collection::Collection;
use crate::errors::DbError;
use crate::types::CollectionName;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Process-wide registry of named collections.
pub struct Engine {
    collections: RwLock<HashMap<CollectionName, Arc<Collection>>>,
}

impl Engine {
    #[must_use]
    pub fn new() -> Self {
        Self { collections: RwLock::new(HashMap::new()) }
    }

    /// Creates the collection if absent and returns it.
    pub fn create_collection(&self, name: String) -> Arc<Collection> {
        let mut cols = self.collections.write();
        cols.entry(name.clone()).or_insert_with(|| Arc::new(Collection::new(name))).clone()
    }

    #[must_use]
    pub fn get_collection(&self, name: &str) -> Option<Arc<Collection>> {
        self.collections.read().get(name).cloned()
    }

    pub fn delete_collection(&self, name: &str) -> bool {
        self.collections.write().remove(name).is_some()
    }

    #[must_use]
    pub fn list_collection_names(&self) -> Vec<String> {
        self.collections.read().keys().cloned().collect()
    }

    /// Rename a collection.
    ///
    /// # Errors
    /// Returns an error when `old` does not exist or `new` already does.
    pub fn rename_collection(&self, old: &str, new: &str) -> Result<(), DbError> {
        let mut cols = self.collections.write();
        if cols.contains_key(new) {
            return Err(DbError::CollectionAlreadyExists(new.to_string()));
        }
        match cols.remove(old) {
            Some(col) => {
                col.set_name(new.to_string());
                cols.insert(new.to_string(), col);
                Ok(())
            }
            None => Err(DbError::NoSuchCollection(old.to_string())),
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
