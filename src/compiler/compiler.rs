//! Predicate compiler
//!
//! Turns an eligible primary-key equality into a parameterized predicate.
//! The operand is encoded by a [`LiteralEncoder`] and travels as the single
//! bound parameter; the template never contains it.
//!
//! Storage contract: rows hold documents as canonical extended JSON in the
//! dialect's JSON column. Under that contract a JSON equality against
//! `{"$oid": "<hex>"}` selects exactly the rows whose field is that object
//! id, and never a string with the same hex digits.

use std::fmt;

use crate::value::{extjson, ObjectId, Value};

use super::dialect::SqlDialect;

/// Encodes a value into the text bound as a predicate parameter
pub trait LiteralEncoder: fmt::Debug + Send + Sync {
    fn encode(&self, value: &Value) -> String;
}

/// Canonical extended JSON encoder
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtJsonEncoder;

impl LiteralEncoder for ExtJsonEncoder {
    fn encode(&self, value: &Value) -> String {
        extjson::to_canonical_string(value)
    }
}

/// Backend predicate with its bound parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPredicate {
    field: String,
    template: String,
    params: Vec<String>,
}

impl CompiledPredicate {
    /// Document field the predicate targets
    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// `" WHERE <template>"`, ready to append to a SELECT
    pub fn where_clause(&self) -> String {
        format!(" WHERE {}", self.template)
    }
}

/// Compiles eligible filters for one backend dialect
#[derive(Debug)]
pub struct PredicateCompiler {
    dialect: Box<dyn SqlDialect>,
    encoder: Box<dyn LiteralEncoder>,
}

impl PredicateCompiler {
    /// Compiler using the canonical extended JSON encoder
    pub fn new(dialect: Box<dyn SqlDialect>) -> Self {
        Self::with_encoder(dialect, Box::new(ExtJsonEncoder))
    }

    pub fn with_encoder(dialect: Box<dyn SqlDialect>, encoder: Box<dyn LiteralEncoder>) -> Self {
        Self { dialect, encoder }
    }

    pub fn dialect(&self) -> &dyn SqlDialect {
        self.dialect.as_ref()
    }

    /// Equality between the document's `field` and a decoded object id
    pub fn object_id_equality(&self, field: &str, id: &ObjectId) -> CompiledPredicate {
        let param = self.encoder.encode(&Value::ObjectId(id.clone()));
        CompiledPredicate {
            field: field.to_string(),
            template: self.dialect.json_field_equality(field),
            params: vec![param],
        }
    }
}
