//! Observable events
//!
//! Every tracing record emitted by the crate carries one of these names in
//! its `event` field.

use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration loaded
    ConfigLoaded,
    /// Collection catalog loaded
    CatalogLoaded,

    // Pushdown decisions
    /// Filter translated to a backend predicate
    PushdownEligible,
    /// Filter left to in-memory evaluation
    PushdownFallback,
    /// Equality operand failed to decode (hard error)
    PushdownCorruptedValue,

    // Query operations
    /// Query executed successfully
    QueryExecuted,
    /// Query rejected
    QueryRejected,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::CatalogLoaded => "CATALOG_LOADED",

            Event::PushdownEligible => "PUSHDOWN_ELIGIBLE",
            Event::PushdownFallback => "PUSHDOWN_FALLBACK",
            Event::PushdownCorruptedValue => "PUSHDOWN_CORRUPTED_VALUE",

            Event::QueryExecuted => "QUERY_EXECUTED",
            Event::QueryRejected => "QUERY_REJECTED",
        }
    }

    /// Returns true if this event reports a client data problem
    pub fn is_error(&self) -> bool {
        matches!(self, Event::PushdownCorruptedValue | Event::QueryRejected)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
