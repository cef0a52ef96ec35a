//! SQL dialects for JSON-column predicates
//!
//! Each dialect renders a template over one JSON column with exactly one
//! bound parameter. A row is selected when the field equals the parameter or
//! is an array holding it as a top-level element, matching the in-memory
//! evaluator. Identifiers are quoted, field names are escaped, and the
//! compared value is always bound, never inlined.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Renders backend-specific predicate templates
pub trait SqlDialect: fmt::Debug + Send + Sync {
    /// Backend name as used in configuration
    fn name(&self) -> &'static str;

    /// JSON column holding the document
    fn json_column(&self) -> &str;

    /// Template selecting rows whose document value at `field` equals the
    /// single bound JSON parameter, or is an array with an element equal to it
    fn json_field_equality(&self, field: &str) -> String;
}

/// Supported backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Postgresql,
    Sqlite,
    Mysql,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Postgresql => "postgresql",
            Backend::Sqlite => "sqlite",
            Backend::Mysql => "mysql",
        }
    }

    /// Column used when none is configured
    pub fn default_json_column(&self) -> &'static str {
        match self {
            Backend::Postgresql => "_jsonb",
            Backend::Sqlite | Backend::Mysql => "_ferretdb_sjson",
        }
    }

    /// Builds the dialect, optionally overriding the JSON column
    pub fn dialect(&self, json_column: Option<&str>) -> Box<dyn SqlDialect> {
        let column = json_column
            .unwrap_or_else(|| self.default_json_column())
            .to_string();
        match self {
            Backend::Postgresql => Box::new(PostgresDialect { column }),
            Backend::Sqlite => Box::new(SqliteDialect { column }),
            Backend::Mysql => Box::new(MysqlDialect { column }),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backend name not recognized
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown backend '{0}' (expected postgresql, sqlite or mysql)")]
pub struct UnknownBackend(pub String);

impl FromStr for Backend {
    type Err = UnknownBackend;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgresql" | "postgres" | "pg" => Ok(Backend::Postgresql),
            "sqlite" => Ok(Backend::Sqlite),
            "mysql" => Ok(Backend::Mysql),
            _ => Err(UnknownBackend(s.to_string())),
        }
    }
}

/// `"<col>"->'<field>' = $1::jsonb`, or an element of it equals `$1`
#[derive(Debug, Clone)]
pub struct PostgresDialect {
    column: String,
}

impl SqlDialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgresql"
    }

    fn json_column(&self) -> &str {
        &self.column
    }

    fn json_field_equality(&self, field: &str) -> String {
        let value = format!(
            "{}->{}",
            quote_ident(&self.column, '"'),
            string_literal(field, false)
        );
        format!(
            "({v} = $1::jsonb OR EXISTS (SELECT 1 FROM jsonb_array_elements(\
             CASE jsonb_typeof({v}) WHEN 'array' THEN {v} ELSE '[]'::jsonb END) AS e(v) \
             WHERE e.v = $1::jsonb))",
            v = value
        )
    }
}

/// `json_extract("<col>", '$."<field>"') = json(?1)`, or an element of it does.
///
/// Only object values are compared so that a string holding JSON text never
/// matches.
#[derive(Debug, Clone)]
pub struct SqliteDialect {
    column: String,
}

impl SqlDialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn json_column(&self) -> &str {
        &self.column
    }

    fn json_field_equality(&self, field: &str) -> String {
        let column = quote_ident(&self.column, '"');
        let path = string_literal(&json_path(field), false);
        format!(
            "((json_type({c}, {p}) = 'object' AND json_extract({c}, {p}) = json(?1)) \
             OR EXISTS (SELECT 1 FROM json_each(\
             CASE json_type({c}, {p}) WHEN 'array' THEN json_extract({c}, {p}) ELSE '[]' END) AS e \
             WHERE e.type = 'object' AND e.value = json(?1)))",
            c = column,
            p = path
        )
    }
}

/// Scalars are wrapped into a one-element array, then every element of
/// `` `<col>`->'$."<field>"' `` is compared with `CAST(? AS JSON)`
#[derive(Debug, Clone)]
pub struct MysqlDialect {
    column: String,
}

impl SqlDialect for MysqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn json_column(&self) -> &str {
        &self.column
    }

    fn json_field_equality(&self, field: &str) -> String {
        let value = format!(
            "{}->{}",
            quote_ident(&self.column, '`'),
            string_literal(&json_path(field), true)
        );
        format!(
            "EXISTS (SELECT 1 FROM JSON_TABLE(\
             CASE JSON_TYPE({v}) WHEN 'ARRAY' THEN {v} ELSE JSON_ARRAY({v}) END, \
             '$[*]' COLUMNS (v JSON PATH '$')) AS e WHERE e.v = CAST(? AS JSON))",
            v = value
        )
    }
}

/// Quotes an identifier, doubling embedded quote characters
fn quote_ident(name: &str, quote: char) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    out.push(quote);
    for c in name.chars() {
        if c == quote {
            out.push(quote);
        }
        out.push(c);
    }
    out.push(quote);
    out
}

/// Single-quoted SQL string literal. MySQL also treats backslash as an escape.
fn string_literal(value: &str, escape_backslash: bool) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\'' => out.push_str("''"),
            '\\' if escape_backslash => out.push_str("\\\\"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// `$."<key>"` with the key escaped as a JSON string
fn json_path(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    out.push_str("$.\"");
    for c in key.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}
