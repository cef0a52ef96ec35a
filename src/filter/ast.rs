//! Filter AST structures
//!
//! A filter is an ordered list of entries, implicitly ANDed. Each entry binds
//! a field path to a single predicate. Top-level `$and`/`$or`/`$nor` clauses
//! are kept beside the entries and ANDed with them.

use std::fmt;

use crate::value::Value;

use super::errors::{FilterError, FilterResult};

/// Dotted field path, e.g. `a.b.0.c`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Parses a dotted path. Empty segments are rejected.
    pub fn parse(dotted: &str) -> FilterResult<Self> {
        let segments: Vec<String> = dotted.split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(FilterError::EmptyPathSegment(dotted.to_string()));
        }
        Ok(Self { segments })
    }

    /// Builds a path from pre-split segments
    pub fn from_segments<S: Into<String>>(segments: impl IntoIterator<Item = S>) -> FilterResult<Self> {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() || segments.iter().any(String::is_empty) {
            return Err(FilterError::EmptyPathSegment(segments.join(".")));
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns true if the path is exactly the given top-level field
    pub fn is_field(&self, name: &str) -> bool {
        self.segments.len() == 1 && self.segments[0] == name
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

/// Operator names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    Nin,
    Exists,
    Size,
    Type,
    Not,
    ElemMatch,
    All,
    Mod,
}

impl Operator {
    /// Parses an operator name including the `$` prefix
    pub fn from_name(name: &str) -> Option<Self> {
        let op = match name {
            "$eq" => Operator::Eq,
            "$ne" => Operator::Ne,
            "$gt" => Operator::Gt,
            "$gte" => Operator::Gte,
            "$lt" => Operator::Lt,
            "$lte" => Operator::Lte,
            "$in" => Operator::In,
            "$nin" => Operator::Nin,
            "$exists" => Operator::Exists,
            "$size" => Operator::Size,
            "$type" => Operator::Type,
            "$not" => Operator::Not,
            "$elemMatch" => Operator::ElemMatch,
            "$all" => Operator::All,
            "$mod" => Operator::Mod,
            _ => return None,
        };
        Some(op)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operator::Eq => "$eq",
            Operator::Ne => "$ne",
            Operator::Gt => "$gt",
            Operator::Gte => "$gte",
            Operator::Lt => "$lt",
            Operator::Lte => "$lte",
            Operator::In => "$in",
            Operator::Nin => "$nin",
            Operator::Exists => "$exists",
            Operator::Size => "$size",
            Operator::Type => "$type",
            Operator::Not => "$not",
            Operator::ElemMatch => "$elemMatch",
            Operator::All => "$all",
            Operator::Mod => "$mod",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Top-level logical operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOperator {
    And,
    Or,
    Nor,
}

impl LogicalOperator {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "$and" => Some(LogicalOperator::And),
            "$or" => Some(LogicalOperator::Or),
            "$nor" => Some(LogicalOperator::Nor),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LogicalOperator::And => "$and",
            LogicalOperator::Or => "$or",
            LogicalOperator::Nor => "$nor",
        }
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `$and`/`$or`/`$nor` over a non-empty list of sub-filters
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalClause {
    operator: LogicalOperator,
    branches: Vec<Filter>,
}

impl LogicalClause {
    pub fn new(operator: LogicalOperator, branches: Vec<Filter>) -> Self {
        Self { operator, branches }
    }

    pub fn operator(&self) -> LogicalOperator {
        self.operator
    }

    pub fn branches(&self) -> &[Filter] {
        &self.branches
    }
}

/// Condition applied to each array element by `$elemMatch`
#[derive(Debug, Clone, PartialEq)]
pub enum ElemMatch {
    /// `{$elemMatch: {$gt: 1, $lt: 5}}`: the element itself satisfies every predicate
    Operators(Vec<Predicate>),
    /// `{$elemMatch: {a: 1}}`: the element is a document matching the sub-filter
    Query(Box<Filter>),
}

/// Type selector accepted by `$type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeCode {
    Double,
    String,
    Object,
    Array,
    Binary,
    ObjectId,
    Bool,
    Null,
    Int,
    Timestamp,
    Long,
    /// Any of int, long, double
    Number,
}

impl TypeCode {
    pub fn from_alias(alias: &str) -> Option<Self> {
        let code = match alias {
            "double" => TypeCode::Double,
            "string" => TypeCode::String,
            "object" => TypeCode::Object,
            "array" => TypeCode::Array,
            "binData" => TypeCode::Binary,
            "objectId" => TypeCode::ObjectId,
            "bool" => TypeCode::Bool,
            "null" => TypeCode::Null,
            "int" => TypeCode::Int,
            "timestamp" => TypeCode::Timestamp,
            "long" => TypeCode::Long,
            "number" => TypeCode::Number,
            _ => return None,
        };
        Some(code)
    }

    pub fn from_code(code: i64) -> Option<Self> {
        let code = match code {
            1 => TypeCode::Double,
            2 => TypeCode::String,
            3 => TypeCode::Object,
            4 => TypeCode::Array,
            5 => TypeCode::Binary,
            7 => TypeCode::ObjectId,
            8 => TypeCode::Bool,
            10 => TypeCode::Null,
            16 => TypeCode::Int,
            17 => TypeCode::Timestamp,
            18 => TypeCode::Long,
            _ => return None,
        };
        Some(code)
    }

    pub fn alias(&self) -> &'static str {
        match self {
            TypeCode::Double => "double",
            TypeCode::String => "string",
            TypeCode::Object => "object",
            TypeCode::Array => "array",
            TypeCode::Binary => "binData",
            TypeCode::ObjectId => "objectId",
            TypeCode::Bool => "bool",
            TypeCode::Null => "null",
            TypeCode::Int => "int",
            TypeCode::Timestamp => "timestamp",
            TypeCode::Long => "long",
            TypeCode::Number => "number",
        }
    }

    /// Returns true if the value itself (not its elements) has this type
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            TypeCode::Number => value.is_number(),
            code => code.alias() == value.type_alias(),
        }
    }
}

/// Predicate bound to a field path
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Equality: field == value
    Eq(Value),
    /// Inequality: field != value
    Ne(Value),
    /// Greater than, same type bracket only
    Gt(Value),
    /// Greater than or equal, same type bracket only
    Gte(Value),
    /// Less than, same type bracket only
    Lt(Value),
    /// Less than or equal, same type bracket only
    Lte(Value),
    /// Membership
    In(Vec<Value>),
    /// Non-membership
    Nin(Vec<Value>),
    /// Field presence
    Exists(bool),
    /// Array length
    Size(i64),
    /// Value type, any of the listed selectors
    Type(Vec<TypeCode>),
    /// Negation of the ANDed inner predicates; also matches a missing field
    Not(Vec<Predicate>),
    /// Some element of an array satisfies the condition
    ElemMatch(ElemMatch),
    /// Every listed value is matched by equality; an empty list matches nothing
    All(Vec<Value>),
    /// Numeric value truncated toward zero, `value % divisor == remainder`
    Mod { divisor: i64, remainder: i64 },
}

impl Predicate {
    pub fn operator(&self) -> Operator {
        match self {
            Predicate::Eq(_) => Operator::Eq,
            Predicate::Ne(_) => Operator::Ne,
            Predicate::Gt(_) => Operator::Gt,
            Predicate::Gte(_) => Operator::Gte,
            Predicate::Lt(_) => Operator::Lt,
            Predicate::Lte(_) => Operator::Lte,
            Predicate::In(_) => Operator::In,
            Predicate::Nin(_) => Operator::Nin,
            Predicate::Exists(_) => Operator::Exists,
            Predicate::Size(_) => Operator::Size,
            Predicate::Type(_) => Operator::Type,
            Predicate::Not(_) => Operator::Not,
            Predicate::ElemMatch(_) => Operator::ElemMatch,
            Predicate::All(_) => Operator::All,
            Predicate::Mod { .. } => Operator::Mod,
        }
    }

    pub fn is_equality(&self) -> bool {
        matches!(self, Predicate::Eq(_))
    }

    /// Returns the single comparison operand, if the predicate has one
    pub fn operand(&self) -> Option<&Value> {
        match self {
            Predicate::Eq(v)
            | Predicate::Ne(v)
            | Predicate::Gt(v)
            | Predicate::Gte(v)
            | Predicate::Lt(v)
            | Predicate::Lte(v) => Some(v),
            _ => None,
        }
    }
}

/// A single `path: predicate` entry
#[derive(Debug, Clone, PartialEq)]
pub struct FilterEntry {
    path: FieldPath,
    predicate: Predicate,
}

impl FilterEntry {
    pub fn new(path: FieldPath, predicate: Predicate) -> Self {
        Self { path, predicate }
    }

    /// Equality entry on a dotted path
    pub fn eq(dotted: &str, value: impl Into<Value>) -> FilterResult<Self> {
        Ok(Self::new(FieldPath::parse(dotted)?, Predicate::Eq(value.into())))
    }

    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }
}

/// Parsed filter (entries and logical clauses combined with AND)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pub(super) entries: Vec<FilterEntry>,
    pub(super) logical: Vec<LogicalClause>,
    pub(super) comment: Option<String>,
}

impl Filter {
    /// Empty filter, matches every document
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<FilterEntry>) -> Self {
        Self {
            entries,
            logical: Vec::new(),
            comment: None,
        }
    }

    /// Appends an entry
    pub fn with_entry(mut self, entry: FilterEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Appends a logical clause
    pub fn with_clause(mut self, clause: LogicalClause) -> Self {
        self.logical.push(clause);
        self
    }

    pub fn entries(&self) -> &[FilterEntry] {
        &self.entries
    }

    /// Top-level `$and`/`$or`/`$nor` clauses, in document order
    pub fn logical(&self) -> &[LogicalClause] {
        &self.logical
    }

    /// Number of field entries plus logical clauses
    pub fn len(&self) -> usize {
        self.entries.len() + self.logical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.logical.is_empty()
    }

    /// Value of the top-level `$comment`, if any
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }
}
