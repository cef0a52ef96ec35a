//! Ordered eligibility rules
//!
//! Each rule inspects the shared context and either lets analysis continue
//! or names the reason for falling back. The first non-`Continue` verdict
//! wins. New rules are inserted into [`RULES`] without touching the others.
//!
//! Order:
//! 1. pushdown enabled
//! 2. non-empty filter
//! 3. single entry
//! 4. the entry is a field predicate, not a `$and`/`$or`/`$nor` clause
//! 5. single-field primary key (schema lookup)
//! 6. entry path is the primary key
//! 7. equality operator
//! 8. object id operand
//! 9. object id decodes (hard error on corruption)

use crate::filter::{Filter, FilterEntry, Predicate};
use crate::schema::SchemaAccessor;
use crate::value::{ObjectId, Value};

use super::errors::{PushdownError, PushdownResult};
use super::plan::FallbackReason;

/// Outcome of one rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Continue,
    Fallback(FallbackReason),
}

/// State shared along the chain
pub struct RuleContext<'a> {
    pub collection: &'a str,
    pub filter: &'a Filter,
    pub pushdown_disabled: bool,
    pub accessor: &'a dyn SchemaAccessor,
    /// Set by the primary-key rule
    pub primary_key: Option<String>,
    /// Set by the decode rule
    pub object_id: Option<ObjectId>,
}

impl<'a> RuleContext<'a> {
    pub fn new(
        collection: &'a str,
        filter: &'a Filter,
        pushdown_disabled: bool,
        accessor: &'a dyn SchemaAccessor,
    ) -> Self {
        Self {
            collection,
            filter,
            pushdown_disabled,
            accessor,
            primary_key: None,
            object_id: None,
        }
    }

    /// The single entry; only meaningful once `single_entry` has passed
    fn entry(&self) -> Option<&'a FilterEntry> {
        match self.filter.entries() {
            [entry] => Some(entry),
            _ => None,
        }
    }

    fn operand(&self) -> Option<&'a Value> {
        match self.entry()?.predicate() {
            Predicate::Eq(value) => Some(value),
            _ => None,
        }
    }
}

/// A named eligibility check
pub struct Rule {
    pub name: &'static str,
    pub check: fn(&mut RuleContext<'_>) -> PushdownResult<Verdict>,
}

/// The chain, in evaluation order
pub static RULES: &[Rule] = &[
    Rule {
        name: "pushdown_enabled",
        check: pushdown_enabled,
    },
    Rule {
        name: "non_empty_filter",
        check: non_empty_filter,
    },
    Rule {
        name: "single_entry",
        check: single_entry,
    },
    Rule {
        name: "field_entry",
        check: field_entry,
    },
    Rule {
        name: "single_field_primary_key",
        check: single_field_primary_key,
    },
    Rule {
        name: "path_is_primary_key",
        check: path_is_primary_key,
    },
    Rule {
        name: "equality_operator",
        check: equality_operator,
    },
    Rule {
        name: "object_id_operand",
        check: object_id_operand,
    },
    Rule {
        name: "object_id_decodes",
        check: object_id_decodes,
    },
];

fn verdict(pass: bool, reason: FallbackReason) -> PushdownResult<Verdict> {
    Ok(if pass {
        Verdict::Continue
    } else {
        Verdict::Fallback(reason)
    })
}

fn pushdown_enabled(ctx: &mut RuleContext<'_>) -> PushdownResult<Verdict> {
    verdict(!ctx.pushdown_disabled, FallbackReason::Disabled)
}

fn non_empty_filter(ctx: &mut RuleContext<'_>) -> PushdownResult<Verdict> {
    verdict(!ctx.filter.is_empty(), FallbackReason::EmptyFilter)
}

fn single_entry(ctx: &mut RuleContext<'_>) -> PushdownResult<Verdict> {
    verdict(ctx.filter.len() == 1, FallbackReason::MultipleEntries)
}

fn field_entry(ctx: &mut RuleContext<'_>) -> PushdownResult<Verdict> {
    verdict(ctx.entry().is_some(), FallbackReason::UnsupportedOperator)
}

/// Accessor errors propagate; they are never read as "no primary key"
fn single_field_primary_key(ctx: &mut RuleContext<'_>) -> PushdownResult<Verdict> {
    let mut fields = ctx.accessor.primary_key_fields(ctx.collection)?;
    match fields.len() {
        0 => Ok(Verdict::Fallback(FallbackReason::NoPrimaryKey)),
        1 => {
            ctx.primary_key = fields.pop();
            Ok(Verdict::Continue)
        }
        _ => Ok(Verdict::Fallback(FallbackReason::CompositePrimaryKey)),
    }
}

fn path_is_primary_key(ctx: &mut RuleContext<'_>) -> PushdownResult<Verdict> {
    let pass = match (ctx.entry(), ctx.primary_key.as_deref()) {
        (Some(entry), Some(pk)) => entry.path().is_field(pk),
        _ => false,
    };
    verdict(pass, FallbackReason::UnsupportedFieldPath)
}

fn equality_operator(ctx: &mut RuleContext<'_>) -> PushdownResult<Verdict> {
    let pass = ctx.entry().is_some_and(|e| e.predicate().is_equality());
    verdict(pass, FallbackReason::UnsupportedOperator)
}

fn object_id_operand(ctx: &mut RuleContext<'_>) -> PushdownResult<Verdict> {
    let pass = matches!(ctx.operand(), Some(Value::ObjectId(_)));
    verdict(pass, FallbackReason::UnsupportedValueType)
}

/// A wrong-length identifier is a hard error
fn object_id_decodes(ctx: &mut RuleContext<'_>) -> PushdownResult<Verdict> {
    let Some(Value::ObjectId(id)) = ctx.operand() else {
        return Ok(Verdict::Fallback(FallbackReason::UnsupportedValueType));
    };

    let bytes = id.decode().map_err(|source| PushdownError::CorruptedValue {
        field: ctx.primary_key.clone().unwrap_or_default(),
        source,
    })?;
    ctx.object_id = Some(ObjectId::new(bytes));
    Ok(Verdict::Continue)
}
