use crate::collection::Collection;
use crate::document::Document;
use crate::errors::DbError;
use crate::query::{self, Filter, FindOptions, Stage, UpdateDoc};
use crate::types::DocumentId;
use bson::Document as BsonDocument;
use std::sync::Arc;

/// The store-adapter boundary the shelter service talks through.
///
/// Every method returns a `DbError` union so callers can apply a uniform
/// degrade-on-failure policy; no store-specific error type leaks past here.
pub trait DataStore: Send + Sync {
    /// Persists one record and returns the newly assigned identity.
    fn insert_one(&self, data: BsonDocument) -> Result<DocumentId, DbError>;

    /// Number of records matching the filter.
    fn count(&self, filter: &Filter) -> Result<u64, DbError>;

    /// Matching records with sort/skip/limit applied.
    fn find(&self, filter: &Filter, opts: &FindOptions) -> Result<Vec<Document>, DbError>;

    /// `$set`-merges the update into every match; returns modified count.
    fn update_many(&self, filter: &Filter, update: &UpdateDoc) -> Result<u64, DbError>;

    /// Removes every match; returns deleted count.
    fn delete_many(&self, filter: &Filter) -> Result<u64, DbError>;

    /// Runs an aggregation pipeline and returns its result documents.
    fn aggregate(&self, stages: &[Stage]) -> Result<Vec<BsonDocument>, DbError>;
}

/// `DataStore` over an in-process [`Collection`].
pub struct CollectionStore {
    col: Arc<Collection>,
}

impl CollectionStore {
    #[must_use]
    pub fn new(col: Arc<Collection>) -> Self {
        Self { col }
    }

    #[must_use]
    pub fn collection(&self) -> &Arc<Collection> {
        &self.col
    }
}

impl DataStore for CollectionStore {
    fn insert_one(&self, data: BsonDocument) -> Result<DocumentId, DbError> {
        Ok(self.col.insert_document(Document::new(data)))
    }

    fn count(&self, filter: &Filter) -> Result<u64, DbError> {
        Ok(query::count_docs(&self.col, filter) as u64)
    }

    fn find(&self, filter: &Filter, opts: &FindOptions) -> Result<Vec<Document>, DbError> {
        Ok(query::find_docs(&self.col, filter, opts))
    }

    fn update_many(&self, filter: &Filter, update: &UpdateDoc) -> Result<u64, DbError> {
        Ok(query::update_many(&self.col, filter, update).modified)
    }

    fn delete_many(&self, filter: &Filter) -> Result<u64, DbError> {
        Ok(query::delete_many(&self.col, filter).deleted)
    }

    fn aggregate(&self, stages: &[Stage]) -> Result<Vec<BsonDocument>, DbError> {
        Ok(query::run_pipeline(&self.col, stages))
    }
}
