//! Schema accessor for primary-key metadata
//!
//! The pushdown analyzer only ever asks one question of the schema: which
//! fields form the primary key of a collection. [`SchemaAccessor`] is that
//! seam; [`Catalog`] is a file-backed implementation.

mod accessor;
mod catalog;
mod errors;

pub use accessor::SchemaAccessor;
pub use catalog::{Catalog, CollectionMeta};
pub use errors::{SchemaError, SchemaResult, Severity};
