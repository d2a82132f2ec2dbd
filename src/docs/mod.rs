pub mod chunk;
pub mod ingest;
pub mod types;

use tracing::debug;

use types::{DocId, Document};

/// Session-scoped document collection. Insertion order is preserved; the
/// relevance selector walks documents in this order.
#[derive(Debug, Default)]
pub struct DocumentCollection {
    docs: Vec<Document>,
}

impl DocumentCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a document. Idempotent: a document with the same content hash is
    /// not stored twice.
    pub fn add(&mut self, doc: Document) -> bool {
        if self.docs.iter().any(|d| d.id == doc.id) {
            debug!(doc_id = %doc.id, name = %doc.name, "duplicate document skipped");
            return false;
        }
        debug!(doc_id = %doc.id, name = %doc.name, "document stored");
        self.docs.push(doc);
        true
    }

    /// Delete a document by ID. Returns the removed document if found.
    pub fn remove(&mut self, id: &DocId) -> Option<Document> {
        let idx = self.docs.iter().position(|d| &d.id == id)?;
        let doc = self.docs.remove(idx);
        debug!(doc_id = %doc.id, "document deleted");
        Some(doc)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Document> {
        self.docs.iter().find(|d| d.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.docs.iter()
    }

    pub fn as_slice(&self) -> &[Document] {
        &self.docs
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn clear(&mut self) {
        self.docs.clear();
    }
}
