//! Query executor
//!
//! Execution flow (strict order):
//! 1. Analyze the filter (eligible, fallback or hard error)
//! 2. Eligible: fetch with the compiled predicate; rows are returned as-is
//! 3. Fallback: fetch every row, keep those the in-memory evaluator accepts
//! 4. Record counters and return

use std::collections::HashMap;

use serde_json::Value as Json;
use tracing::debug;

use crate::compiler::CompiledPredicate;
use crate::filter::Filter;
use crate::observability::{Event, MetricsRegistry};
use crate::planner::{PushdownAnalyzer, PushdownPlan};
use crate::schema::SchemaAccessor;
use crate::value::{extjson, Document, Value};

use super::errors::{ExecutorError, ExecutorResult};
use super::filters::PredicateFilter;
use super::result::ExecutionResult;

/// Backend that returns rows for a collection, optionally filtered
pub trait BackendExecutor {
    /// Returns every row when `predicate` is `None`, otherwise only rows the
    /// predicate selects
    fn fetch(&self, collection: &str, predicate: Option<&CompiledPredicate>)
        -> ExecutorResult<Vec<Document>>;
}

impl<B: BackendExecutor + ?Sized> BackendExecutor for &B {
    fn fetch(
        &self,
        collection: &str,
        predicate: Option<&CompiledPredicate>,
    ) -> ExecutorResult<Vec<Document>> {
        (**self).fetch(collection, predicate)
    }
}

/// Runs filters through the analyzer and a backend
pub struct QueryExecutor<'a, S, B> {
    analyzer: &'a PushdownAnalyzer<S>,
    backend: &'a B,
    metrics: Option<&'a MetricsRegistry>,
}

impl<'a, S: SchemaAccessor, B: BackendExecutor> QueryExecutor<'a, S, B> {
    pub fn new(analyzer: &'a PushdownAnalyzer<S>, backend: &'a B) -> Self {
        Self {
            analyzer,
            backend,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: &'a MetricsRegistry) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Executes a filter against a collection
    pub fn execute(&self, collection: &str, filter: &Filter) -> ExecutorResult<ExecutionResult> {
        let result = self.run(collection, filter);

        match &result {
            Ok(res) => {
                if let Some(metrics) = self.metrics {
                    if res.filter_pushdown {
                        metrics.increment_pushdown_eligible();
                    } else {
                        metrics.increment_pushdown_fallback();
                    }
                    metrics.add_documents(res.scanned_count as u64, res.returned_count as u64);
                }
                debug!(
                    event = Event::QueryExecuted.as_str(),
                    collection,
                    pushdown = res.filter_pushdown,
                    scanned = res.scanned_count,
                    returned = res.returned_count,
                    "query executed"
                );
            }
            Err(err) => {
                if let Some(metrics) = self.metrics {
                    metrics.increment_queries_rejected();
                }
                debug!(
                    event = Event::QueryRejected.as_str(),
                    collection,
                    code = err.code(),
                    error = %err,
                    "query rejected"
                );
            }
        }

        result
    }

    fn run(&self, collection: &str, filter: &Filter) -> ExecutorResult<ExecutionResult> {
        let plan = self.analyzer.analyze(collection, filter)?;

        match plan {
            PushdownPlan::Eligible(eligible) => {
                let documents = self.backend.fetch(collection, Some(&eligible.predicate))?;
                Ok(ExecutionResult {
                    scanned_count: documents.len(),
                    returned_count: documents.len(),
                    filter_pushdown: true,
                    documents,
                })
            }
            PushdownPlan::Fallback { .. } => {
                let rows = self.backend.fetch(collection, None)?;
                let scanned_count = rows.len();
                let documents: Vec<Document> = rows
                    .into_iter()
                    .filter(|doc| PredicateFilter::matches(doc, filter))
                    .collect();
                Ok(ExecutionResult {
                    scanned_count,
                    returned_count: documents.len(),
                    filter_pushdown: false,
                    documents,
                })
            }
        }
    }
}

/// In-memory backend storing rows as canonical extended JSON
///
/// Predicates are applied the way the dialect templates compare JSON columns:
/// the row's JSON value at the predicate field must equal the bound parameter,
/// or be an array holding it as a top-level element.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    tables: HashMap<String, Vec<Json>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a document to a collection
    pub fn insert(&mut self, collection: &str, document: &Document) -> ExecutorResult<()> {
        let row = extjson::encode(&Value::Document(document.clone()))
            .map_err(|e| ExecutorError::invalid_row(collection, e.to_string()))?;
        self.tables.entry(collection.to_string()).or_default().push(row);
        Ok(())
    }

    /// Appends a raw JSON row, bypassing encoding
    pub fn insert_raw(&mut self, collection: &str, row: Json) {
        self.tables.entry(collection.to_string()).or_default().push(row);
    }

    pub fn row_count(&self, collection: &str) -> usize {
        self.tables.get(collection).map_or(0, Vec::len)
    }

    fn row_selected(
        collection: &str,
        row: &Json,
        predicate: &CompiledPredicate,
    ) -> ExecutorResult<bool> {
        let [param] = predicate.params() else {
            return Err(ExecutorError::backend(
                collection,
                format!("expected 1 bound parameter, got {}", predicate.params().len()),
            ));
        };
        let expected: Json = serde_json::from_str(param)
            .map_err(|e| ExecutorError::backend(collection, format!("bad parameter: {}", e)))?;
        Ok(match row.get(predicate.field()) {
            Some(Json::Array(items)) => items.contains(&expected),
            Some(value) => value == &expected,
            None => false,
        })
    }
}

impl BackendExecutor for MemoryBackend {
    fn fetch(
        &self,
        collection: &str,
        predicate: Option<&CompiledPredicate>,
    ) -> ExecutorResult<Vec<Document>> {
        let Some(rows) = self.tables.get(collection) else {
            return Ok(Vec::new());
        };

        let mut documents = Vec::new();
        for row in rows {
            if let Some(predicate) = predicate {
                if !Self::row_selected(collection, row, predicate)? {
                    continue;
                }
            }
            let doc = extjson::document_from_json(row)
                .map_err(|e| ExecutorError::invalid_row(collection, e.to_string()))?;
            documents.push(doc);
        }
        Ok(documents)
    }
}
