//! Field path resolution
//!
//! Follows a dotted path through embedded documents. When a non-terminal
//! segment reaches an array, every element is followed (recursively for
//! nested arrays), and a numeric segment additionally selects that element.
//! Terminal values are returned as-is, arrays included.

use crate::filter::FieldPath;
use crate::value::{Document, Value};

/// Values reached by a path
#[derive(Debug, Default)]
pub struct Resolved<'a> {
    /// Terminal values, one per branch that reached the end of the path
    pub values: Vec<&'a Value>,
    /// True if at least one branch stopped short of the end
    pub missing: bool,
}

impl<'a> Resolved<'a> {
    /// True if no branch reached the end of the path
    pub fn is_absent(&self) -> bool {
        self.values.is_empty()
    }
}

/// Resolves `path` against a document
pub fn resolve<'a>(doc: &'a Document, path: &FieldPath) -> Resolved<'a> {
    let mut out = Resolved::default();
    walk_document(doc, path.segments(), &mut out);
    out
}

fn walk_document<'a>(doc: &'a Document, segments: &[String], out: &mut Resolved<'a>) {
    let Some((head, rest)) = segments.split_first() else {
        return;
    };
    match doc.get(head) {
        Some(value) => walk_value(value, rest, out),
        None => out.missing = true,
    }
}

fn walk_value<'a>(value: &'a Value, rest: &[String], out: &mut Resolved<'a>) {
    if rest.is_empty() {
        out.values.push(value);
        return;
    }

    match value {
        Value::Document(doc) => walk_document(doc, rest, out),
        Value::Array(items) => {
            if let Some(element) = array_index(&rest[0]).and_then(|i| items.get(i)) {
                walk_value(element, &rest[1..], out);
            }
            for item in items {
                walk_element(item, rest, out);
            }
        }
        _ => out.missing = true,
    }
}

/// Implicit unwrap: only documents and nested arrays continue the path
fn walk_element<'a>(item: &'a Value, rest: &[String], out: &mut Resolved<'a>) {
    match item {
        Value::Document(doc) => walk_document(doc, rest, out),
        Value::Array(_) => walk_value(item, rest, out),
        _ => out.missing = true,
    }
}

fn array_index(segment: &str) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}
