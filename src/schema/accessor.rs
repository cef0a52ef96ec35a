//! Primary-key lookup consumed by the pushdown analyzer
//!
//! Implementations may perform I/O. The analyzer calls the accessor once per
//! query and never retries.

use std::sync::Arc;

use super::errors::SchemaResult;

/// Supplies primary-key field names per collection
pub trait SchemaAccessor {
    /// Returns the ordered primary-key field names of a collection.
    ///
    /// Empty means no primary key is declared; more than one name is a
    /// composite key. Lookup failures are errors, never an empty list.
    fn primary_key_fields(&self, collection: &str) -> SchemaResult<Vec<String>>;
}

impl<T: SchemaAccessor + ?Sized> SchemaAccessor for &T {
    fn primary_key_fields(&self, collection: &str) -> SchemaResult<Vec<String>> {
        (**self).primary_key_fields(collection)
    }
}

impl<T: SchemaAccessor + ?Sized> SchemaAccessor for Arc<T> {
    fn primary_key_fields(&self, collection: &str) -> SchemaResult<Vec<String>> {
        (**self).primary_key_fields(collection)
    }
}
