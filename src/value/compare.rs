//! Type-bracket comparison
//!
//! Values of different brackets order by [`TypeRank`]:
//!
//! null < NaN < numbers < string < document < array < binary < objectId < boolean < timestamp
//!
//! Inside a bracket:
//! - numbers compare by mathematical value across int32, int64 and double
//!   (exact, no lossy casts; -0.0 equals 0.0)
//! - NaN equals NaN
//! - strings compare bytewise
//! - documents compare field by field: type rank, then key, then value
//! - arrays compare element by element, a shorter prefix first
//! - binaries compare by length, then subtype, then bytes
//!
//! The resulting order is total, so equality is `compare(a, b) == Equal`.

use std::cmp::Ordering;

use super::types::{Binary, Document, TypeRank, Value};

/// Compares two values using the type-bracket order
pub fn compare(a: &Value, b: &Value) -> Ordering {
    let (rank_a, rank_b) = (a.type_rank(), b.type_rank());
    if rank_a != rank_b {
        return rank_a.cmp(&rank_b);
    }

    match (a, b) {
        (Value::String(x), Value::String(y)) => x.as_bytes().cmp(y.as_bytes()),
        (Value::Document(x), Value::Document(y)) => compare_documents(x, y),
        (Value::Array(x), Value::Array(y)) => compare_arrays(x, y),
        (Value::Binary(x), Value::Binary(y)) => compare_binaries(x, y),
        (Value::ObjectId(x), Value::ObjectId(y)) => x.raw().cmp(y.raw()),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Timestamp(x), Value::Timestamp(y)) => x.cmp(y),
        // remaining same-rank pairs: null/null, NaN/NaN, number/number
        _ => match (Number::of(a), Number::of(b)) {
            (Some(x), Some(y)) => x.cmp(y),
            _ => Ordering::Equal,
        },
    }
}

/// Returns true if both values are equal under the type-bracket order
pub fn values_equal(a: &Value, b: &Value) -> bool {
    compare(a, b) == Ordering::Equal
}

#[derive(Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Int32(i) => Some(Number::Int(i64::from(*i))),
            Value::Int64(i) => Some(Number::Int(*i)),
            Value::Double(d) => Some(Number::Float(*d)),
            _ => None,
        }
    }

    fn cmp(self, other: Number) -> Ordering {
        match (self, other) {
            (Number::Int(x), Number::Int(y)) => x.cmp(&y),
            // NaN pairs only reach here together and are equal
            (Number::Float(x), Number::Float(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            (Number::Float(x), Number::Int(y)) => compare_double_long(x, y),
            (Number::Int(x), Number::Float(y)) => compare_double_long(y, x).reverse(),
        }
    }
}

/// 2^63 as a double; every i64 lies in [-2^63, 2^63).
const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;

/// Exact comparison of a non-NaN double with an i64
fn compare_double_long(d: f64, i: i64) -> Ordering {
    if d >= TWO_POW_63 {
        return Ordering::Greater;
    }
    if d < -TWO_POW_63 {
        return Ordering::Less;
    }

    let whole = d.trunc();
    match (whole as i64).cmp(&i) {
        Ordering::Equal => {
            let frac = d - whole;
            if frac > 0.0 {
                Ordering::Greater
            } else if frac < 0.0 {
                Ordering::Less
            } else {
                Ordering::Equal
            }
        }
        other => other,
    }
}

fn compare_documents(a: &Document, b: &Document) -> Ordering {
    for ((ka, va), (kb, vb)) in a.iter().zip(b.iter()) {
        let ord = va
            .type_rank()
            .cmp(&vb.type_rank())
            .then_with(|| ka.as_bytes().cmp(kb.as_bytes()))
            .then_with(|| compare(va, vb));
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

fn compare_arrays(a: &[Value], b: &[Value]) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        let ord = compare(x, y);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

fn compare_binaries(a: &Binary, b: &Binary) -> Ordering {
    a.bytes
        .len()
        .cmp(&b.bytes.len())
        .then_with(|| a.subtype.cmp(&b.subtype))
        .then_with(|| a.bytes.cmp(&b.bytes))
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        values_equal(self, other)
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        compare(self, other)
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        compare_documents(self, other) == Ordering::Equal
    }
}

impl Eq for Document {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::types::{ObjectId, Timestamp};

    fn doc(pairs: Vec<(&str, Value)>) -> Value {
        Value::Document(pairs.into_iter().collect())
    }

    /// One representative per bracket, in ascending bracket order
    fn bracket_representatives() -> Vec<Value> {
        vec![
            Value::Null,
            Value::Double(f64::NAN),
            Value::Int32(0),
            Value::from(""),
            doc(vec![]),
            Value::Array(vec![]),
            Value::Binary(Binary::new(0, vec![])),
            Value::ObjectId(ObjectId::new([0; 12])),
            Value::Bool(false),
            Value::Timestamp(Timestamp(0)),
        ]
    }

    #[test]
    fn test_rank_table_matches_documented_order() {
        let ranks: Vec<u8> = bracket_representatives()
            .iter()
            .map(|v| v.type_rank().as_u8())
            .collect();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
    }

    #[test]
    fn test_every_bracket_pair_is_ordered() {
        let reps = bracket_representatives();
        for (i, a) in reps.iter().enumerate() {
            for (j, b) in reps.iter().enumerate() {
                assert_eq!(compare(a, b), i.cmp(&j), "{:?} vs {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_bracket_beats_magnitude() {
        // largest number still sorts below the empty string
        assert_eq!(
            compare(&Value::Double(f64::INFINITY), &Value::from("")),
            Ordering::Less
        );
        assert_eq!(
            compare(&Value::Bool(false), &Value::ObjectId(ObjectId::new([0xff; 12]))),
            Ordering::Greater
        );
    }

    #[test]
    fn test_numeric_cross_subtype_equality() {
        assert!(values_equal(&Value::Int32(5), &Value::Int64(5)));
        assert!(values_equal(&Value::Int64(5), &Value::Double(5.0)));
        assert!(values_equal(&Value::Double(-0.0), &Value::Int32(0)));
        assert!(values_equal(&Value::Double(-0.0), &Value::Double(0.0)));
        assert!(!values_equal(&Value::Int32(5), &Value::Double(5.5)));
    }

    #[test]
    fn test_double_long_exact_comparison() {
        // 2^53 + 1 is not representable as a double
        let big = 9_007_199_254_740_993_i64;
        assert_eq!(
            compare(&Value::Double(9_007_199_254_740_992.0), &Value::Int64(big)),
            Ordering::Less
        );
        assert_eq!(
            compare(&Value::Double(TWO_POW_63), &Value::Int64(i64::MAX)),
            Ordering::Greater
        );
        assert_eq!(
            compare(&Value::Double(-TWO_POW_63), &Value::Int64(i64::MIN)),
            Ordering::Equal
        );
        assert_eq!(
            compare(&Value::Int64(-3), &Value::Double(-2.5)),
            Ordering::Less
        );
    }

    #[test]
    fn test_nan_ordering() {
        let nan = Value::Double(f64::NAN);
        assert!(values_equal(&nan, &Value::Double(f64::NAN)));
        assert_eq!(compare(&nan, &Value::Double(f64::NEG_INFINITY)), Ordering::Less);
        assert_eq!(compare(&nan, &Value::Null), Ordering::Greater);
        assert!(!values_equal(&nan, &Value::Int32(0)));
    }

    #[test]
    fn test_infinities() {
        assert_eq!(
            compare(&Value::Double(f64::NEG_INFINITY), &Value::Int64(i64::MIN)),
            Ordering::Less
        );
        assert_eq!(
            compare(&Value::Double(f64::INFINITY), &Value::Int64(i64::MAX)),
            Ordering::Greater
        );
    }

    #[test]
    fn test_string_bytewise() {
        assert_eq!(compare(&Value::from("B"), &Value::from("a")), Ordering::Less);
        assert_eq!(compare(&Value::from("a"), &Value::from("ab")), Ordering::Less);
    }

    #[test]
    fn test_document_comparison() {
        let a = doc(vec![("a", Value::Int32(1))]);
        let b = doc(vec![("a", Value::Double(1.0))]);
        assert!(values_equal(&a, &b));

        // value type rank wins over key name
        let num = doc(vec![("z", Value::Int32(1))]);
        let text = doc(vec![("a", Value::from("x"))]);
        assert_eq!(compare(&num, &text), Ordering::Less);

        // field order matters
        let ab = doc(vec![("a", Value::Int32(1)), ("b", Value::Int32(2))]);
        let ba = doc(vec![("b", Value::Int32(2)), ("a", Value::Int32(1))]);
        assert!(!values_equal(&ab, &ba));

        // prefix sorts first
        let short = doc(vec![("a", Value::Int32(1))]);
        assert_eq!(compare(&short, &ab), Ordering::Less);
    }

    #[test]
    fn test_array_comparison() {
        let a = Value::Array(vec![Value::Int32(1), Value::Int32(2)]);
        let b = Value::Array(vec![Value::Int32(1), Value::Int32(3)]);
        let c = Value::Array(vec![Value::Int32(1)]);
        assert_eq!(compare(&a, &b), Ordering::Less);
        assert_eq!(compare(&c, &a), Ordering::Less);
    }

    #[test]
    fn test_binary_comparison() {
        let short = Value::Binary(Binary::new(5, vec![0xff]));
        let long = Value::Binary(Binary::new(0, vec![0x00, 0x00]));
        assert_eq!(compare(&short, &long), Ordering::Less);

        let sub0 = Value::Binary(Binary::new(0, vec![9]));
        let sub1 = Value::Binary(Binary::new(1, vec![0]));
        assert_eq!(compare(&sub0, &sub1), Ordering::Less);
    }

    #[test]
    fn test_boolean_and_timestamp() {
        assert_eq!(compare(&Value::Bool(false), &Value::Bool(true)), Ordering::Less);
        assert_eq!(
            compare(
                &Value::Timestamp(Timestamp::new(1, 9)),
                &Value::Timestamp(Timestamp::new(2, 0))
            ),
            Ordering::Less
        );
    }

    #[test]
    fn test_values_sort() {
        let mut values = vec![
            Value::Bool(true),
            Value::from("x"),
            Value::Int64(3),
            Value::Null,
            Value::Double(f64::NAN),
            Value::Double(2.5),
        ];
        values.sort();
        let aliases: Vec<&str> = values.iter().map(|v| v.type_alias()).collect();
        assert_eq!(
            aliases,
            vec!["null", "double", "double", "long", "string", "bool"]
        );
    }
}
