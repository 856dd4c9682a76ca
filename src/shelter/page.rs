use bson::Document as BsonDocument;
use serde::{Deserialize, Serialize};

/// One bounded slice of read results plus pagination counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub data: Vec<BsonDocument>,
    pub metadata: PageMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    pub total_documents: u64,
    pub total_pages: u64,
    pub current_page: u64,
    pub page_size: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Page {
    /// The safe default a read degrades to when the store fails: an empty
    /// first-of-one page, so a caller-facing listing never crashes.
    #[must_use]
    pub fn degraded(page_size: usize) -> Self {
        Self {
            data: Vec::new(),
            metadata: PageMetadata {
                total_documents: 0,
                total_pages: 1,
                current_page: 1,
                page_size,
                has_next: false,
                has_prev: false,
            },
        }
    }
}
