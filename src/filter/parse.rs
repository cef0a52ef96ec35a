//! Filter construction from a decoded filter document
//!
//! - `{path: value}` becomes `Eq(value)`
//! - `{path: {$op: operand, ...}}` becomes one entry per operator, in order
//! - `{path: {plain: ...}}` is equality against an embedded document
//! - top-level `$and`/`$or`/`$nor` take a non-empty array of sub-filters
//! - top-level `$comment` is recorded, any other top-level `$` key is rejected

use crate::value::{extjson, Document, Value};

use super::ast::{
    ElemMatch, FieldPath, Filter, FilterEntry, LogicalClause, LogicalOperator, Operator, Predicate,
    TypeCode,
};
use super::errors::{FilterError, FilterResult};

impl Filter {
    /// Builds a filter from a decoded filter document
    pub fn from_document(doc: &Document) -> FilterResult<Self> {
        let mut filter = Filter::new();

        for (key, value) in doc.iter() {
            if let Some(op) = LogicalOperator::from_name(key) {
                filter.logical.push(parse_logical(op, value)?);
                continue;
            }
            if key.starts_with('$') {
                if key != "$comment" {
                    return Err(FilterError::UnknownOperator(key.to_string()));
                }
                let comment = value
                    .as_str()
                    .ok_or_else(|| FilterError::operand("$comment", "needs a string"))?;
                filter.comment = Some(comment.to_string());
                continue;
            }

            let path = FieldPath::parse(key)?;

            match value {
                Value::Document(expr) if is_operator_document(key, expr)? => {
                    for (op_name, operand) in expr.iter() {
                        let predicate = parse_operator(op_name, operand)?;
                        filter.entries.push(FilterEntry::new(path.clone(), predicate));
                    }
                }
                _ => filter
                    .entries
                    .push(FilterEntry::new(path, Predicate::Eq(value.clone()))),
            }
        }

        Ok(filter)
    }

    /// Builds a filter from extended JSON
    pub fn from_json(json: &serde_json::Value) -> FilterResult<Self> {
        let doc = extjson::document_from_json(json)?;
        Self::from_document(&doc)
    }
}

fn parse_logical(op: LogicalOperator, operand: &Value) -> FilterResult<LogicalClause> {
    let items = match operand.as_array() {
        Some(items) if !items.is_empty() => items,
        _ => return Err(FilterError::operand(op.name(), "needs a non-empty array")),
    };

    let branches = items
        .iter()
        .map(|item| match item {
            Value::Document(doc) => Filter::from_document(doc),
            _ => Err(FilterError::operand(op.name(), "needs an array of documents")),
        })
        .collect::<FilterResult<Vec<_>>>()?;

    Ok(LogicalClause::new(op, branches))
}

/// True if every key is an operator, false if none is, error if mixed
fn is_operator_document(field: &str, expr: &Document) -> FilterResult<bool> {
    let operators = expr.keys().filter(|k| k.starts_with('$')).count();
    if operators == 0 {
        return Ok(false);
    }
    if operators != expr.len() {
        return Err(FilterError::MixedOperatorDocument(field.to_string()));
    }
    Ok(true)
}

fn parse_operator(name: &str, operand: &Value) -> FilterResult<Predicate> {
    let op = Operator::from_name(name).ok_or_else(|| FilterError::UnknownOperator(name.to_string()))?;

    let predicate = match op {
        Operator::Eq => Predicate::Eq(operand.clone()),
        Operator::Ne => Predicate::Ne(operand.clone()),
        Operator::Gt => Predicate::Gt(operand.clone()),
        Operator::Gte => Predicate::Gte(operand.clone()),
        Operator::Lt => Predicate::Lt(operand.clone()),
        Operator::Lte => Predicate::Lte(operand.clone()),
        Operator::In => Predicate::In(expect_array(op, operand)?),
        Operator::Nin => Predicate::Nin(expect_array(op, operand)?),
        Operator::Exists => Predicate::Exists(parse_truthy(operand)?),
        Operator::Size => Predicate::Size(parse_size(operand)?),
        Operator::Type => Predicate::Type(parse_type_codes(operand)?),
        Operator::Not => Predicate::Not(parse_not(operand)?),
        Operator::ElemMatch => Predicate::ElemMatch(parse_elem_match(operand)?),
        Operator::All => Predicate::All(expect_array(op, operand)?),
        Operator::Mod => parse_mod(operand)?,
    };

    Ok(predicate)
}

/// Predicates of an operator document, in order
fn parse_operators(expr: &Document) -> FilterResult<Vec<Predicate>> {
    expr.iter()
        .map(|(name, operand)| parse_operator(name, operand))
        .collect()
}

fn parse_not(operand: &Value) -> FilterResult<Vec<Predicate>> {
    match operand {
        Value::Document(expr) if !expr.is_empty() && is_operator_document("$not", expr)? => {
            parse_operators(expr)
        }
        _ => Err(FilterError::operand("$not", "needs a non-empty operator document")),
    }
}

/// Operator form when every key is a field operator, query form otherwise
fn parse_elem_match(operand: &Value) -> FilterResult<ElemMatch> {
    let Value::Document(expr) = operand else {
        return Err(FilterError::operand("$elemMatch", "needs a document"));
    };

    let field_operators = !expr.is_empty()
        && expr
            .keys()
            .all(|k| k.starts_with('$') && LogicalOperator::from_name(k).is_none());

    if field_operators {
        parse_operators(expr).map(ElemMatch::Operators)
    } else {
        Filter::from_document(expr).map(|f| ElemMatch::Query(Box::new(f)))
    }
}

fn parse_mod(operand: &Value) -> FilterResult<Predicate> {
    let (divisor, remainder) = match operand.as_array() {
        Some([d, r]) => (d.truncated(), r.truncated()),
        _ => {
            return Err(FilterError::operand(
                "$mod",
                "needs an array of [divisor, remainder]",
            ))
        }
    };

    match (divisor, remainder) {
        (Some(0), _) => Err(FilterError::operand("$mod", "divisor cannot be 0")),
        (Some(divisor), Some(remainder)) => Ok(Predicate::Mod { divisor, remainder }),
        _ => Err(FilterError::operand("$mod", "needs numeric divisor and remainder")),
    }
}

fn expect_array(op: Operator, operand: &Value) -> FilterResult<Vec<Value>> {
    operand
        .as_array()
        .map(<[Value]>::to_vec)
        .ok_or_else(|| FilterError::operand(op.name(), "needs an array"))
}

fn parse_truthy(operand: &Value) -> FilterResult<bool> {
    match operand {
        Value::Bool(b) => Ok(*b),
        Value::Int32(i) => Ok(*i != 0),
        Value::Int64(i) => Ok(*i != 0),
        Value::Double(d) => Ok(*d != 0.0),
        _ => Err(FilterError::operand("$exists", "needs a boolean or a number")),
    }
}

fn parse_size(operand: &Value) -> FilterResult<i64> {
    match operand.as_whole_number() {
        Some(n) if n >= 0 => Ok(n),
        _ => Err(FilterError::operand(
            "$size",
            "needs a non-negative whole number",
        )),
    }
}

fn parse_type_codes(operand: &Value) -> FilterResult<Vec<TypeCode>> {
    match operand {
        Value::Array(items) if items.is_empty() => {
            Err(FilterError::operand("$type", "needs at least one type"))
        }
        Value::Array(items) => items.iter().map(parse_type_code).collect(),
        single => Ok(vec![parse_type_code(single)?]),
    }
}

fn parse_type_code(value: &Value) -> FilterResult<TypeCode> {
    let code = match value {
        Value::String(alias) => TypeCode::from_alias(alias),
        other => other.as_whole_number().and_then(TypeCode::from_code),
    };
    code.ok_or_else(|| FilterError::operand("$type", format!("unknown type {:?}", value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(json: serde_json::Value) -> FilterResult<Filter> {
        Filter::from_json(&json)
    }

    #[test]
    fn test_implicit_equality() {
        let filter = parse(json!({"_id": {"$oid": "507f1f77bcf86cd799439011"}})).unwrap();
        assert_eq!(filter.len(), 1);
        let entry = &filter.entries()[0];
        assert!(entry.path().is_field("_id"));
        assert!(matches!(entry.predicate(), Predicate::Eq(Value::ObjectId(_))));
    }

    #[test]
    fn test_explicit_eq_is_equality() {
        let filter = parse(json!({"v": {"$eq": 5}})).unwrap();
        assert!(filter.entries()[0].predicate().is_equality());
    }

    #[test]
    fn test_embedded_document_equality() {
        let filter = parse(json!({"a": {"b": 1}})).unwrap();
        match filter.entries()[0].predicate() {
            Predicate::Eq(Value::Document(doc)) => assert!(doc.contains_key("b")),
            other => panic!("unexpected {:?}", other),
        }

        let empty = parse(json!({"a": {}})).unwrap();
        assert!(matches!(
            empty.entries()[0].predicate(),
            Predicate::Eq(Value::Document(d)) if d.is_empty()
        ));
    }

    #[test]
    fn test_multiple_operators_split_into_entries() {
        let filter = parse(json!({"age": {"$gte": 18, "$lt": 65}, "name": "x"})).unwrap();
        assert_eq!(filter.len(), 3);
        assert_eq!(filter.entries()[0].predicate().operator(), Operator::Gte);
        assert_eq!(filter.entries()[1].predicate().operator(), Operator::Lt);
        assert_eq!(filter.entries()[1].path().to_string(), "age");
        assert_eq!(filter.entries()[2].path().to_string(), "name");
    }

    #[test]
    fn test_comment_is_not_an_entry() {
        let filter = parse(json!({"$comment": "hello", "a": 1})).unwrap();
        assert_eq!(filter.len(), 1);
        assert_eq!(filter.comment(), Some("hello"));
    }

    #[test]
    fn test_unknown_operators_rejected() {
        assert_eq!(
            parse(json!({"a": {"$near": 1}})),
            Err(FilterError::UnknownOperator("$near".into()))
        );
        assert_eq!(
            parse(json!({"a": {"$regex": "^x"}})),
            Err(FilterError::UnknownOperator("$regex".into()))
        );
        assert_eq!(
            parse(json!({"$where": "true"})),
            Err(FilterError::UnknownOperator("$where".into()))
        );
        // logical operators are top-level only
        assert_eq!(
            parse(json!({"a": {"$or": [1]}})),
            Err(FilterError::UnknownOperator("$or".into()))
        );
    }

    #[test]
    fn test_logical_clauses() {
        let filter = parse(json!({
            "x": 1,
            "$or": [{"a": 1}, {"b": {"$gt": 2}, "c": 3}],
            "$nor": [{"d": null}]
        }))
        .unwrap();

        assert_eq!(filter.entries().len(), 1);
        assert_eq!(filter.len(), 3);
        let or = &filter.logical()[0];
        assert_eq!(or.operator(), LogicalOperator::Or);
        assert_eq!(or.branches().len(), 2);
        assert_eq!(or.branches()[1].len(), 2);
        assert_eq!(filter.logical()[1].operator(), LogicalOperator::Nor);

        let nested = parse(json!({"$and": [{"$or": [{"a": 1}]}]})).unwrap();
        assert_eq!(nested.logical()[0].branches()[0].logical().len(), 1);
    }

    #[test]
    fn test_logical_operand_validation() {
        for bad in [
            json!({"$or": []}),
            json!({"$and": {"a": 1}}),
            json!({"$nor": [1]}),
            json!({"$or": [{"a": {"$near": 1}}]}),
        ] {
            assert!(parse(bad.clone()).is_err(), "{}", bad);
        }
    }

    #[test]
    fn test_not_operand() {
        let filter = parse(json!({"a": {"$not": {"$gt": 5, "$type": "int"}}})).unwrap();
        assert_eq!(
            filter.entries()[0].predicate(),
            &Predicate::Not(vec![
                Predicate::Gt(Value::Int32(5)),
                Predicate::Type(vec![TypeCode::Int])
            ])
        );

        assert!(parse(json!({"a": {"$not": 5}})).is_err());
        assert!(parse(json!({"a": {"$not": {}}})).is_err());
        assert!(parse(json!({"a": {"$not": {"b": 1}}})).is_err());
    }

    #[test]
    fn test_elem_match_forms() {
        let ops = parse(json!({"a": {"$elemMatch": {"$gte": 1, "$lt": 3}}})).unwrap();
        assert!(matches!(
            ops.entries()[0].predicate(),
            Predicate::ElemMatch(ElemMatch::Operators(p)) if p.len() == 2
        ));

        let query = parse(json!({"a": {"$elemMatch": {"b": 1, "$or": [{"c": 2}]}}})).unwrap();
        match query.entries()[0].predicate() {
            Predicate::ElemMatch(ElemMatch::Query(f)) => {
                assert_eq!(f.entries().len(), 1);
                assert_eq!(f.logical().len(), 1);
            }
            other => panic!("unexpected {:?}", other),
        }

        assert!(parse(json!({"a": {"$elemMatch": 1}})).is_err());
        assert!(parse(json!({"a": {"$elemMatch": {"$near": 1}}})).is_err());
    }

    #[test]
    fn test_all_and_mod_operands() {
        let filter = parse(json!({"a": {"$all": [1, 2]}, "b": {"$mod": [4.7, -1]}})).unwrap();
        assert!(matches!(filter.entries()[0].predicate(), Predicate::All(v) if v.len() == 2));
        assert_eq!(
            filter.entries()[1].predicate(),
            &Predicate::Mod {
                divisor: 4,
                remainder: -1
            }
        );

        assert!(parse(json!({"a": {"$all": 1}})).is_err());
        assert!(parse(json!({"a": {"$mod": [0, 1]}})).is_err());
        assert!(parse(json!({"a": {"$mod": [0.5, 1]}})).is_err());
        assert!(parse(json!({"a": {"$mod": [2]}})).is_err());
        assert!(parse(json!({"a": {"$mod": ["2", 1]}})).is_err());
        assert!(parse(json!({"a": {"$mod": [2, 1, 0]}})).is_err());
    }

    #[test]
    fn test_mixed_operator_document_rejected() {
        assert_eq!(
            parse(json!({"a": {"$gt": 1, "b": 2}})),
            Err(FilterError::MixedOperatorDocument("a".into()))
        );
    }

    #[test]
    fn test_empty_path_segment_rejected() {
        assert_eq!(
            parse(json!({"a..b": 1})),
            Err(FilterError::EmptyPathSegment("a..b".into()))
        );
    }

    #[test]
    fn test_operand_validation() {
        assert!(parse(json!({"a": {"$in": 1}})).is_err());
        assert!(parse(json!({"a": {"$nin": "x"}})).is_err());
        assert!(parse(json!({"a": {"$size": -1}})).is_err());
        assert!(parse(json!({"a": {"$size": 1.5}})).is_err());
        assert!(parse(json!({"a": {"$exists": "yes"}})).is_err());
        assert!(parse(json!({"a": {"$type": "nope"}})).is_err());
        assert!(parse(json!({"a": {"$type": []}})).is_err());
        assert!(parse(json!({"$comment": 1})).is_err());
    }

    #[test]
    fn test_operand_parsing() {
        let filter = parse(json!({
            "a": {"$in": [1, "x"]},
            "b": {"$exists": 0},
            "c": {"$size": 2.0},
            "d": {"$type": ["string", 16, "number"]}
        }))
        .unwrap();

        assert!(matches!(filter.entries()[0].predicate(), Predicate::In(v) if v.len() == 2));
        assert_eq!(filter.entries()[1].predicate(), &Predicate::Exists(false));
        assert_eq!(filter.entries()[2].predicate(), &Predicate::Size(2));
        assert_eq!(
            filter.entries()[3].predicate(),
            &Predicate::Type(vec![TypeCode::String, TypeCode::Int, TypeCode::Number])
        );
    }

    #[test]
    fn test_bad_extended_json_rejected() {
        let err = parse(json!({"a": {"$numberInt": "x"}})).unwrap_err();
        assert!(matches!(err, FilterError::InvalidValue(_)));
        assert!(parse(json!([1])).is_err());
    }
}
