//! Extended JSON conversion
//!
//! Decodes canonical and relaxed extended JSON into [`Value`] and encodes
//! values back into the canonical form. Key order is preserved both ways.
//!
//! | Value     | Canonical form                                         |
//! |-----------|--------------------------------------------------------|
//! | int32     | `{"$numberInt": "1"}`                                  |
//! | int64     | `{"$numberLong": "1"}`                                 |
//! | double    | `{"$numberDouble": "1.0"}` (also NaN, +-Infinity)      |
//! | binary    | `{"$binary": {"base64": "...", "subType": "00"}}`      |
//! | objectId  | `{"$oid": "<24 hex chars>"}`                           |
//! | timestamp | `{"$timestamp": {"t": 1, "i": 2}}`                     |

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Map, Number, Value as Json};

use super::errors::{ValueError, ValueResult};
use super::types::{decode_hex, Binary, Document, ObjectId, Timestamp, Value};

/// Keys that turn a single-key object into a typed scalar on decode
pub const WRAPPER_KEYS: [&str; 6] = [
    "$oid",
    "$numberInt",
    "$numberLong",
    "$numberDouble",
    "$binary",
    "$timestamp",
];

/// Decodes an extended JSON value
pub fn from_json(json: &Json) -> ValueResult<Value> {
    match json {
        Json::Null => Ok(Value::Null),
        Json::Bool(b) => Ok(Value::Bool(*b)),
        Json::Number(n) => Ok(decode_number(n)),
        Json::String(s) => Ok(Value::String(s.clone())),
        Json::Array(items) => items
            .iter()
            .map(from_json)
            .collect::<ValueResult<Vec<_>>>()
            .map(Value::Array),
        Json::Object(map) => match decode_wrapper(map)? {
            Some(value) => Ok(value),
            None => decode_object(map).map(Value::Document),
        },
    }
}

/// Decodes an extended JSON object into a document
pub fn document_from_json(json: &Json) -> ValueResult<Document> {
    match from_json(json)? {
        Value::Document(doc) => Ok(doc),
        other => Err(ValueError::extjson(format!(
            "expected a document, got {}",
            other.type_alias()
        ))),
    }
}

/// Parses extended JSON text into a document
pub fn document_from_str(text: &str) -> ValueResult<Document> {
    let json: Json = serde_json::from_str(text).map_err(|e| ValueError::extjson(e.to_string()))?;
    document_from_json(&json)
}

/// Encodes a value in canonical extended JSON
pub fn to_json(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int32(i) => json!({ "$numberInt": i.to_string() }),
        Value::Int64(i) => json!({ "$numberLong": i.to_string() }),
        Value::Double(d) => json!({ "$numberDouble": format_double(*d) }),
        Value::String(s) => Json::String(s.clone()),
        Value::Binary(bin) => json!({
            "$binary": {
                "base64": STANDARD.encode(&bin.bytes),
                "subType": format!("{:02x}", bin.subtype),
            }
        }),
        Value::ObjectId(id) => json!({ "$oid": id.to_hex() }),
        Value::Timestamp(ts) => json!({
            "$timestamp": { "t": ts.time(), "i": ts.increment() }
        }),
        Value::Array(items) => Json::Array(items.iter().map(to_json).collect()),
        Value::Document(doc) => {
            let mut map = Map::with_capacity(doc.len());
            for (k, v) in doc.iter() {
                map.insert(k.to_string(), to_json(v));
            }
            Json::Object(map)
        }
    }
}

/// Encodes a value, refusing documents that would decode back as a different type
///
/// A document whose only key is a type wrapper (`{"$oid": ...}` held as a
/// plain document) has no faithful extended JSON form.
pub fn encode(value: &Value) -> ValueResult<Json> {
    ensure_encodable(value)?;
    Ok(to_json(value))
}

fn ensure_encodable(value: &Value) -> ValueResult<()> {
    match value {
        Value::Array(items) => items.iter().try_for_each(ensure_encodable),
        Value::Document(doc) => {
            if doc.len() == 1 {
                if let Some(key) = doc.keys().find(|k| WRAPPER_KEYS.contains(k)) {
                    return Err(ValueError::extjson(format!(
                        "document with sole key {:?} is ambiguous with a type wrapper",
                        key
                    )));
                }
            }
            doc.iter().try_for_each(|(_, v)| ensure_encodable(v))
        }
        _ => Ok(()),
    }
}

/// Compact canonical extended JSON text for a value
pub fn to_canonical_string(value: &Value) -> String {
    to_json(value).to_string()
}

fn decode_number(n: &Number) -> Value {
    if let Some(i) = n.as_i64() {
        return match i32::try_from(i) {
            Ok(small) => Value::Int32(small),
            Err(_) => Value::Int64(i),
        };
    }
    // u64 beyond i64 range or a float
    Value::Double(n.as_f64().unwrap_or(f64::NAN))
}

fn decode_object(map: &Map<String, Json>) -> ValueResult<Document> {
    let mut doc = Document::new();
    for (k, v) in map {
        doc.try_insert(k.clone(), from_json(v)?)?;
    }
    Ok(doc)
}

/// Recognizes single-key type wrappers. Other `$` keys (query operators) are plain documents.
fn decode_wrapper(map: &Map<String, Json>) -> ValueResult<Option<Value>> {
    if map.len() != 1 {
        return Ok(None);
    }
    let Some((key, inner)) = map.iter().next() else {
        return Ok(None);
    };

    let value = match key.as_str() {
        "$oid" => {
            let hex = expect_str(key, inner)?;
            let raw = decode_hex(hex).ok_or_else(|| ValueError::InvalidObjectIdHex(hex.to_string()))?;
            // wrong length is kept raw; rejected later by whoever needs a well-formed id
            Value::ObjectId(ObjectId::from_raw(raw))
        }
        "$numberInt" => {
            let s = expect_str(key, inner)?;
            Value::Int32(
                s.parse()
                    .map_err(|_| ValueError::extjson(format!("bad $numberInt {:?}", s)))?,
            )
        }
        "$numberLong" => {
            let s = expect_str(key, inner)?;
            Value::Int64(
                s.parse()
                    .map_err(|_| ValueError::extjson(format!("bad $numberLong {:?}", s)))?,
            )
        }
        "$numberDouble" => Value::Double(parse_double(expect_str(key, inner)?)?),
        "$binary" => Value::Binary(decode_binary(inner)?),
        "$timestamp" => {
            let t = expect_u32(inner, "t")?;
            let i = expect_u32(inner, "i")?;
            Value::Timestamp(Timestamp::new(t, i))
        }
        _ => return Ok(None),
    };

    Ok(Some(value))
}

fn decode_binary(inner: &Json) -> ValueResult<Binary> {
    let payload = inner
        .get("base64")
        .and_then(Json::as_str)
        .ok_or_else(|| ValueError::extjson("$binary requires a base64 string"))?;
    let subtype = inner
        .get("subType")
        .and_then(Json::as_str)
        .ok_or_else(|| ValueError::extjson("$binary requires a subType string"))?;

    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| ValueError::extjson(format!("bad $binary payload: {}", e)))?;
    let subtype = u8::from_str_radix(subtype, 16)
        .map_err(|_| ValueError::extjson(format!("bad $binary subType {:?}", subtype)))?;

    Ok(Binary::new(subtype, bytes))
}

fn expect_str<'a>(key: &str, json: &'a Json) -> ValueResult<&'a str> {
    json.as_str()
        .ok_or_else(|| ValueError::extjson(format!("{} requires a string", key)))
}

fn expect_u32(json: &Json, field: &str) -> ValueResult<u32> {
    json.get(field)
        .and_then(Json::as_u64)
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| ValueError::extjson(format!("$timestamp.{} must be a u32", field)))
}

fn parse_double(s: &str) -> ValueResult<f64> {
    match s {
        "NaN" => Ok(f64::NAN),
        "Infinity" => Ok(f64::INFINITY),
        "-Infinity" => Ok(f64::NEG_INFINITY),
        _ => s
            .parse()
            .map_err(|_| ValueError::extjson(format!("bad $numberDouble {:?}", s))),
    }
}

fn format_double(d: f64) -> String {
    if d.is_nan() {
        "NaN".to_string()
    } else if d == f64::INFINITY {
        "Infinity".to_string()
    } else if d == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else if d.fract() == 0.0 && d.abs() < 1e16 {
        format!("{:.1}", d)
    } else {
        d.to_string()
    }
}
