//! Pushdown decision types

use std::fmt;

use crate::compiler::CompiledPredicate;
use crate::value::ObjectId;

/// Why a filter was not pushed down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FallbackReason {
    /// Pushdown switched off in configuration
    Disabled,
    /// Filter has no entries
    EmptyFilter,
    /// More than one entry; only single-entry filters are pushed down
    MultipleEntries,
    /// Collection declares no primary key
    NoPrimaryKey,
    /// Primary key spans several fields
    CompositePrimaryKey,
    /// Entry path is not the primary-key field
    UnsupportedFieldPath,
    /// Predicate is not equality
    UnsupportedOperator,
    /// Equality operand is not an object id
    UnsupportedValueType,
}

impl FallbackReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackReason::Disabled => "pushdown disabled",
            FallbackReason::EmptyFilter => "empty filter",
            FallbackReason::MultipleEntries => "multiple entries",
            FallbackReason::NoPrimaryKey => "no primary key",
            FallbackReason::CompositePrimaryKey => "composite primary key",
            FallbackReason::UnsupportedFieldPath => "unsupported field path",
            FallbackReason::UnsupportedOperator => "unsupported operator",
            FallbackReason::UnsupportedValueType => "unsupported value type",
        }
    }
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An eligible filter, resolved and compiled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligiblePlan {
    /// Sole primary-key field the filter targets
    pub primary_key: String,
    /// Re-decoded, well-formed identifier
    pub object_id: ObjectId,
    /// Backend predicate and bound parameter
    pub predicate: CompiledPredicate,
}

/// Result of pushdown analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushdownPlan {
    /// Backend applies the predicate; rows are not re-filtered
    Eligible(EligiblePlan),
    /// Full scan plus in-memory filtering
    Fallback { reason: FallbackReason },
}

impl PushdownPlan {
    pub fn fallback(reason: FallbackReason) -> Self {
        PushdownPlan::Fallback { reason }
    }

    pub fn is_eligible(&self) -> bool {
        matches!(self, PushdownPlan::Eligible(_))
    }

    /// Compiled predicate, if eligible
    pub fn predicate(&self) -> Option<&CompiledPredicate> {
        match self {
            PushdownPlan::Eligible(plan) => Some(&plan.predicate),
            PushdownPlan::Fallback { .. } => None,
        }
    }

    pub fn fallback_reason(&self) -> Option<FallbackReason> {
        match self {
            PushdownPlan::Eligible(_) => None,
            PushdownPlan::Fallback { reason } => Some(*reason),
        }
    }
}
