//! Result types for query execution

use crate::value::Document;

/// Result of query execution
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Matching documents in backend order
    pub documents: Vec<Document>,
    /// Number of rows the backend returned
    pub scanned_count: usize,
    /// Number of documents returned to the caller
    pub returned_count: usize,
    /// Whether the filter was applied by the backend
    pub filter_pushdown: bool,
}

impl ExecutionResult {
    pub fn empty() -> Self {
        Self {
            documents: Vec::new(),
            scanned_count: 0,
            returned_count: 0,
            filter_pushdown: false,
        }
    }

    /// Returns true if no documents matched
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter()
    }
}
