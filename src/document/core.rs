use crate::document::types::Metadata;
use crate::types::DocumentId;
use bson::Document as BsonDocument;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// A stored record: schemaless BSON body plus store-assigned identity.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Document {
    pub id: DocumentId,
    pub data: BsonDocument,
    pub metadata: Metadata,
}

impl Document {
    #[must_use]
    pub fn new(data: BsonDocument) -> Self {
        Self { id: DocumentId::new(), data, metadata: Metadata::new() }
    }

    /// Replaces the record body and bumps the updated timestamp.
    pub fn update(&mut self, new_data: BsonDocument) {
        self.data = new_data;
        self.metadata.updated_at = Utc::now();
    }
}
