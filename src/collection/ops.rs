use super::core::Collection;
use crate::document::Document;
use crate::types::DocumentId;
use bson::Document as BsonDocument;

impl Collection {
    /// Inserts a document and returns its store-assigned identity.
    pub fn insert_document(&self, document: Document) -> DocumentId {
        let doc_id = document.id.clone();
        self.docs.write().push(document);
        log::debug!("insert into {}: {doc_id}", self.name_str());
        doc_id
    }

    #[must_use]
    pub fn find_document(&self, id: &DocumentId) -> Option<Document> {
        self.docs.read().iter().find(|d| &d.id == id).cloned()
    }

    /// Replaces the body of the document with `id`, keeping identity and
    /// bumping `updated_at`. Returns false when the id is unknown.
    pub fn update_document(&self, id: &DocumentId, new_data: BsonDocument) -> bool {
        let mut docs = self.docs.write();
        match docs.iter_mut().find(|d| &d.id == id) {
            Some(doc) => {
                doc.update(new_data);
                true
            }
            None => false,
        }
    }

    pub fn delete_document(&self, id: &DocumentId) -> bool {
        let mut docs = self.docs.write();
        let before = docs.len();
        docs.retain(|d| &d.id != id);
        docs.len() < before
    }

    /// Document identities in insertion order.
    #[must_use]
    pub fn list_ids(&self) -> Vec<DocumentId> {
        self.docs.read().iter().map(|d| d.id.clone()).collect()
    }

    /// Snapshot of all documents in insertion order.
    #[must_use]
    pub fn get_all_documents(&self) -> Vec<Document> {
        self.docs.read().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }
}
