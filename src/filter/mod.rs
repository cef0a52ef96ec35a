//! Filter AST
//!
//! Parsed, read-only representation of a document filter. Built once per
//! query from the decoded filter document and shared by the analyzer, the
//! predicate compiler and the in-memory evaluator.

mod ast;
mod errors;
mod parse;

pub use ast::{
    ElemMatch, FieldPath, Filter, FilterEntry, LogicalClause, LogicalOperator, Operator, Predicate,
    TypeCode,
};
pub use errors::{FilterError, FilterResult, Severity};
