//! Pushdown eligibility analyzer
//!
//! Runs the rule chain for one `(collection, filter)` pair and, when every
//! rule passes, hands the resolved key and identifier to the compiler.
//! Unproven shapes always fall back.

use tracing::{debug, warn};

use crate::compiler::PredicateCompiler;
use crate::config::PushdownConfig;
use crate::filter::Filter;
use crate::observability::Event;
use crate::schema::SchemaAccessor;

use super::errors::{PushdownError, PushdownResult};
use super::plan::{EligiblePlan, FallbackReason, PushdownPlan};
use super::rules::{RuleContext, Verdict, RULES};

/// Decides per query whether a filter is pushed to the backend
#[derive(Debug)]
pub struct PushdownAnalyzer<S> {
    accessor: S,
    compiler: PredicateCompiler,
    pushdown_disabled: bool,
}

impl<S: SchemaAccessor> PushdownAnalyzer<S> {
    pub fn new(accessor: S, compiler: PredicateCompiler) -> Self {
        Self {
            accessor,
            compiler,
            pushdown_disabled: false,
        }
    }

    /// Analyzer for the configured backend dialect
    pub fn from_config(config: &PushdownConfig, accessor: S) -> Self {
        Self::new(accessor, PredicateCompiler::new(config.dialect()))
            .with_pushdown_disabled(config.disable_filter_pushdown)
    }

    pub fn with_pushdown_disabled(mut self, disabled: bool) -> Self {
        self.pushdown_disabled = disabled;
        self
    }

    pub fn compiler(&self) -> &PredicateCompiler {
        &self.compiler
    }

    pub fn accessor(&self) -> &S {
        &self.accessor
    }

    /// Classifies a filter.
    ///
    /// Fails only for corrupted operands and schema accessor errors.
    pub fn analyze(&self, collection: &str, filter: &Filter) -> PushdownResult<PushdownPlan> {
        let mut ctx = RuleContext::new(collection, filter, self.pushdown_disabled, &self.accessor);

        for rule in RULES {
            match (rule.check)(&mut ctx) {
                Ok(Verdict::Continue) => {}
                Ok(Verdict::Fallback(reason)) => {
                    debug!(
                        event = Event::PushdownFallback.as_str(),
                        collection,
                        rule = rule.name,
                        reason = reason.as_str(),
                        "filter pushdown skipped"
                    );
                    return Ok(PushdownPlan::fallback(reason));
                }
                Err(err) => {
                    if let PushdownError::CorruptedValue { field, source } = &err {
                        warn!(
                            event = Event::PushdownCorruptedValue.as_str(),
                            collection,
                            field = field.as_str(),
                            error = %source,
                            "corrupted equality operand"
                        );
                    }
                    return Err(err);
                }
            }
        }

        let (Some(primary_key), Some(object_id)) = (ctx.primary_key, ctx.object_id) else {
            // chain completed without resolving its target; never push down blind
            return Ok(PushdownPlan::fallback(FallbackReason::UnsupportedValueType));
        };

        let predicate = self.compiler.object_id_equality(&primary_key, &object_id);
        debug!(
            event = Event::PushdownEligible.as_str(),
            collection,
            field = primary_key.as_str(),
            backend = self.compiler.dialect().name(),
            template = predicate.template(),
            "filter pushed down"
        );

        Ok(PushdownPlan::Eligible(EligiblePlan {
            primary_key,
            object_id,
            predicate,
        }))
    }

    /// Parses an extended JSON filter, then analyzes it
    pub fn analyze_json(
        &self,
        collection: &str,
        filter: &serde_json::Value,
    ) -> PushdownResult<PushdownPlan> {
        let filter = Filter::from_json(filter)?;
        self.analyze(collection, &filter)
    }
}
