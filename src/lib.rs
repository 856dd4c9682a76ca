pub mod collection;
pub mod document;
pub mod engine;
pub mod errors;
pub mod logger;
pub mod query;
pub mod shelter;
pub mod store;
pub mod types;

use crate::collection::Collection;
use crate::engine::Engine;
use crate::errors::DbError;
use crate::shelter::AnimalShelter;
use std::sync::Arc;

/// The main database struct: an in-process document store plus the shelter
/// service layered on top of it.
pub struct Database {
    engine: Arc<Engine>,
}

impl Database {
    /// Creates a new in-memory database instance.
    #[must_use]
    pub fn new() -> Self {
        Self { engine: Arc::new(Engine::new()) }
    }

    /// Creates a new collection with the given name.
    pub fn create_collection(&self, name: &str) -> Arc<Collection> {
        self.engine.create_collection(name.to_string())
    }

    /// Retrieves a collection by its name.
    #[must_use]
    pub fn get_collection(&self, name: &str) -> Option<Arc<Collection>> {
        self.engine.get_collection(name)
    }

    /// Deletes a collection by its name.
    pub fn delete_collection(&self, name: &str) -> bool {
        self.engine.delete_collection(name)
    }

    /// Lists the names of all collections.
    #[must_use]
    pub fn list_collection_names(&self) -> Vec<String> {
        self.engine.list_collection_names()
    }

    /// Rename a collection.
    ///
    /// # Errors
    /// Returns an error when the source is missing or the target exists.
    pub fn rename_collection(&self, old: &str, new: &str) -> Result<(), DbError> {
        self.engine.rename_collection(old, new)
    }

    /// Opens the shelter service over the named collection, creating the
    /// collection if absent.
    #[must_use]
    pub fn shelter(&self, collection: &str) -> AnimalShelter {
        AnimalShelter::open(&self.engine, collection)
    }
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}

/// Initializes the database system.
///
/// This function should be called before any other database operations.
/// It sets up the logger.
///
/// # Errors
/// Propagates logger initialization failures.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    logger::init()?;
    Ok(())
}
