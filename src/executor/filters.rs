//! In-memory filter evaluation
//!
//! The reference semantics every pushed-down predicate must agree with.
//!
//! - Entries and logical clauses are ANDed
//! - Equality matches a terminal value, or any element of a terminal array
//! - A missing field equals only null
//! - Range operators compare within the operand's type bracket only
//! - `$ne`, `$nin` and `$not` are exact negations of what they wrap

use std::cmp::Ordering;

use crate::filter::{
    ElemMatch, Filter, FilterEntry, LogicalClause, LogicalOperator, Predicate, TypeCode,
};
use crate::value::{compare, values_equal, Document, Value};

use super::path::{resolve, Resolved};

/// Evaluates filters against documents
pub struct PredicateFilter;

impl PredicateFilter {
    /// Checks if a document matches every entry and logical clause of the filter
    pub fn matches(document: &Document, filter: &Filter) -> bool {
        filter
            .entries()
            .iter()
            .all(|entry| Self::matches_entry(document, entry))
            && filter
                .logical()
                .iter()
                .all(|clause| Self::matches_clause(document, clause))
    }

    /// Checks a single entry
    pub fn matches_entry(document: &Document, entry: &FilterEntry) -> bool {
        let resolved = resolve(document, entry.path());
        predicate_match(&resolved, entry.predicate())
    }

    /// Checks a `$and`/`$or`/`$nor` clause
    pub fn matches_clause(document: &Document, clause: &LogicalClause) -> bool {
        let mut branches = clause.branches().iter();
        match clause.operator() {
            LogicalOperator::And => branches.all(|f| Self::matches(document, f)),
            LogicalOperator::Or => branches.any(|f| Self::matches(document, f)),
            LogicalOperator::Nor => !branches.any(|f| Self::matches(document, f)),
        }
    }
}

/// Shorthand for [`PredicateFilter::matches`]
pub fn matches(document: &Document, filter: &Filter) -> bool {
    PredicateFilter::matches(document, filter)
}

fn predicate_match(resolved: &Resolved<'_>, predicate: &Predicate) -> bool {
    match predicate {
        Predicate::Eq(operand) => eq_match(resolved, operand),
        Predicate::Ne(operand) => !eq_match(resolved, operand),
        Predicate::Gt(bound) => range_match(resolved, bound, Ordering::is_gt),
        Predicate::Gte(bound) => range_match(resolved, bound, Ordering::is_ge),
        Predicate::Lt(bound) => range_match(resolved, bound, Ordering::is_lt),
        Predicate::Lte(bound) => range_match(resolved, bound, Ordering::is_le),
        Predicate::In(operands) => in_match(resolved, operands),
        Predicate::Nin(operands) => !in_match(resolved, operands),
        Predicate::Exists(expected) => !resolved.is_absent() == *expected,
        Predicate::Size(len) => size_match(resolved, *len),
        Predicate::Type(codes) => type_match(resolved, codes),
        Predicate::Not(inner) => !inner.iter().all(|p| predicate_match(resolved, p)),
        Predicate::ElemMatch(condition) => elem_match(resolved, condition),
        Predicate::All(operands) => {
            !operands.is_empty() && operands.iter().all(|operand| eq_match(resolved, operand))
        }
        Predicate::Mod { divisor, remainder } => mod_match(resolved, *divisor, *remainder),
    }
}

/// Each terminal value, plus the elements of terminal arrays
fn candidates<'a>(resolved: &'a Resolved<'a>) -> impl Iterator<Item = &'a Value> + 'a {
    resolved.values.iter().flat_map(|value| {
        let elements = value.as_array().unwrap_or(&[]);
        std::iter::once(*value).chain(elements.iter())
    })
}

fn eq_match(resolved: &Resolved<'_>, operand: &Value) -> bool {
    if operand.is_null() && resolved.missing {
        return true;
    }
    candidates(resolved).any(|value| values_equal(value, operand))
}

fn in_match(resolved: &Resolved<'_>, operands: &[Value]) -> bool {
    operands.iter().any(|operand| eq_match(resolved, operand))
}

/// Missing counts as null; values outside the operand's bracket never match
fn range_match(resolved: &Resolved<'_>, bound: &Value, accept: fn(Ordering) -> bool) -> bool {
    let rank = bound.type_rank();
    let in_bracket = |value: &Value| value.type_rank() == rank && accept(compare(value, bound));

    if resolved.missing && in_bracket(&Value::Null) {
        return true;
    }
    candidates(resolved).any(in_bracket)
}

fn size_match(resolved: &Resolved<'_>, len: i64) -> bool {
    resolved
        .values
        .iter()
        .filter_map(|value| value.as_array())
        .any(|items| i64::try_from(items.len()).map_or(false, |n| n == len))
}

fn type_match(resolved: &Resolved<'_>, codes: &[TypeCode]) -> bool {
    candidates(resolved).any(|value| codes.iter().any(|code| code.matches(value)))
}

/// Only terminal arrays qualify; a scalar field never matches
fn elem_match(resolved: &Resolved<'_>, condition: &ElemMatch) -> bool {
    resolved
        .values
        .iter()
        .filter_map(|value| value.as_array())
        .flatten()
        .any(|element| match condition {
            ElemMatch::Operators(predicates) => {
                let single = Resolved {
                    values: vec![element],
                    missing: false,
                };
                predicates.iter().all(|p| predicate_match(&single, p))
            }
            ElemMatch::Query(filter) => element
                .as_document()
                .map_or(false, |doc| PredicateFilter::matches(doc, filter)),
        })
}

fn mod_match(resolved: &Resolved<'_>, divisor: i64, remainder: i64) -> bool {
    candidates(resolved)
        .filter_map(Value::truncated)
        .any(|n| n.wrapping_rem(divisor) == remainder)
}
