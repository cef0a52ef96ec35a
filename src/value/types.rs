//! Typed value representation
//!
//! Supported variants:
//! - null, bool
//! - int32, int64, double (signed zero, NaN and infinities included)
//! - string, binary (with subtype), object identifier, timestamp
//! - array, document (insertion-ordered, unique keys)

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering as AtomicOrdering};
use std::sync::OnceLock;

use chrono::{DateTime, TimeZone, Utc};
use indexmap::IndexMap;

use super::errors::{ValueError, ValueResult};

/// Length of a well-formed object identifier in bytes
pub const OBJECT_ID_LEN: usize = 12;

/// Object identifier: 4-byte big-endian seconds, 5 random bytes, 3-byte counter.
///
/// The raw bytes are kept exactly as handed over by the decoder, so a
/// corrupted identifier survives until someone calls [`ObjectId::decode`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectId {
    raw: Vec<u8>,
}

impl ObjectId {
    /// Creates a well-formed identifier
    pub fn new(bytes: [u8; OBJECT_ID_LEN]) -> Self {
        Self {
            raw: bytes.to_vec(),
        }
    }

    /// Wraps bytes received from the wire without validating them
    pub fn from_raw(raw: Vec<u8>) -> Self {
        Self { raw }
    }

    /// Generates a fresh identifier for the current second
    pub fn generate() -> Self {
        static PROCESS_UNIQUE: OnceLock<[u8; 5]> = OnceLock::new();
        static COUNTER: AtomicU32 = AtomicU32::new(0);

        let unique = PROCESS_UNIQUE.get_or_init(rand::random::<[u8; 5]>);
        let seconds = Utc::now().timestamp() as u32;
        let counter = COUNTER.fetch_add(1, AtomicOrdering::Relaxed) & 0x00ff_ffff;

        let mut bytes = [0u8; OBJECT_ID_LEN];
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(unique);
        bytes[9..].copy_from_slice(&counter.to_be_bytes()[1..]);
        Self::new(bytes)
    }

    /// Parses a 24-character hex string
    pub fn from_hex(s: &str) -> ValueResult<Self> {
        let raw = decode_hex(s).ok_or_else(|| ValueError::InvalidObjectIdHex(s.to_string()))?;
        if raw.len() != OBJECT_ID_LEN {
            return Err(ValueError::InvalidObjectIdLength(raw.len()));
        }
        Ok(Self { raw })
    }

    /// Returns the raw bytes as received
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Returns true if the raw bytes have the expected length
    pub fn is_well_formed(&self) -> bool {
        self.raw.len() == OBJECT_ID_LEN
    }

    /// Re-decodes the raw bytes into a fixed-width identifier
    pub fn decode(&self) -> ValueResult<[u8; OBJECT_ID_LEN]> {
        <[u8; OBJECT_ID_LEN]>::try_from(self.raw.as_slice())
            .map_err(|_| ValueError::InvalidObjectIdLength(self.raw.len()))
    }

    /// Lowercase hex form of the raw bytes
    pub fn to_hex(&self) -> String {
        encode_hex(&self.raw)
    }

    /// Creation time stored in the identifier prefix
    pub fn timestamp(&self) -> ValueResult<DateTime<Utc>> {
        let bytes = self.decode()?;
        let seconds = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        Utc.timestamp_opt(i64::from(seconds), 0)
            .single()
            .ok_or(ValueError::InvalidObjectIdLength(bytes.len()))
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId(\"{}\")", self.to_hex())
    }
}

pub(crate) fn encode_hex(bytes: &[u8]) -> String {
    use fmt::Write;

    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(out, "{:02x}", b);
    }
    out
}

pub(crate) fn decode_hex(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 || !s.is_ascii() {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
        .collect()
}

/// Binary blob with its subtype tag
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Binary {
    /// Subtype tag (0 = generic)
    pub subtype: u8,
    /// Payload
    pub bytes: Vec<u8>,
}

impl Binary {
    pub fn new(subtype: u8, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            subtype,
            bytes: bytes.into(),
        }
    }
}

/// Internal replication timestamp: seconds in the high 32 bits, increment in the low 32 bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub u64);

impl Timestamp {
    pub fn new(time: u32, increment: u32) -> Self {
        Self((u64::from(time) << 32) | u64::from(increment))
    }

    pub fn time(&self) -> u32 {
        (self.0 >> 32) as u32
    }

    pub fn increment(&self) -> u32 {
        self.0 as u32
    }
}

/// Ordered mapping of unique string keys to values
#[derive(Debug, Clone, Default)]
pub struct Document {
    fields: IndexMap<String, Value>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field. An existing key keeps its position and gets the new value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.fields.insert(key.into(), value)
    }

    /// Adds a field, refusing keys that are already present
    pub fn try_insert(&mut self, key: impl Into<String>, value: Value) -> ValueResult<()> {
        let key = key.into();
        if self.fields.contains_key(&key) {
            return Err(ValueError::DuplicateKey(key));
        }
        self.fields.insert(key, value);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates fields in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Document {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut doc = Document::new();
        for (k, v) in iter {
            doc.insert(k, v);
        }
        doc
    }
}

/// Type bracket of a value.
///
/// The discriminants are the external cross-type ordering and must not be
/// reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TypeRank {
    Null = 1,
    NaN = 2,
    Number = 3,
    String = 4,
    Document = 5,
    Array = 6,
    Binary = 7,
    ObjectId = 8,
    Boolean = 9,
    Timestamp = 10,
}

impl TypeRank {
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TypeRank::Null => "null",
            TypeRank::NaN => "nan",
            TypeRank::Number => "number",
            TypeRank::String => "string",
            TypeRank::Document => "document",
            TypeRank::Array => "array",
            TypeRank::Binary => "binary",
            TypeRank::ObjectId => "objectId",
            TypeRank::Boolean => "boolean",
            TypeRank::Timestamp => "timestamp",
        }
    }
}

/// A decoded document-language value
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Double(f64),
    String(String),
    Binary(Binary),
    ObjectId(ObjectId),
    Timestamp(Timestamp),
    Array(Vec<Value>),
    Document(Document),
}

impl Value {
    /// Fixed rank lookup for cross-type ordering
    pub fn type_rank(&self) -> TypeRank {
        match self {
            Value::Null => TypeRank::Null,
            Value::Double(d) if d.is_nan() => TypeRank::NaN,
            Value::Int32(_) | Value::Int64(_) | Value::Double(_) => TypeRank::Number,
            Value::String(_) => TypeRank::String,
            Value::Document(_) => TypeRank::Document,
            Value::Array(_) => TypeRank::Array,
            Value::Binary(_) => TypeRank::Binary,
            Value::ObjectId(_) => TypeRank::ObjectId,
            Value::Bool(_) => TypeRank::Boolean,
            Value::Timestamp(_) => TypeRank::Timestamp,
        }
    }

    /// Type alias as used by the `$type` operator
    pub fn type_alias(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int32(_) => "int",
            Value::Int64(_) => "long",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::Binary(_) => "binData",
            Value::ObjectId(_) => "objectId",
            Value::Timestamp(_) => "timestamp",
            Value::Array(_) => "array",
            Value::Document(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Int32(_) | Value::Int64(_) | Value::Double(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Value::Document(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_object_id(&self) -> Option<&ObjectId> {
        match self {
            Value::ObjectId(id) => Some(id),
            _ => None,
        }
    }

    /// Returns the value as an integer if it is a whole number of any numeric type
    pub fn as_whole_number(&self) -> Option<i64> {
        match self {
            Value::Int32(i) => Some(i64::from(*i)),
            Value::Int64(i) => Some(*i),
            Value::Double(d) if d.is_finite() && d.fract() == 0.0 => {
                if *d >= -9_223_372_036_854_775_808.0 && *d < 9_223_372_036_854_775_808.0 {
                    Some(*d as i64)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Numeric value truncated toward zero; NaN, infinities and out-of-range doubles yield None
    pub fn truncated(&self) -> Option<i64> {
        match self {
            Value::Int32(i) => Some(i64::from(*i)),
            Value::Int64(i) => Some(*i),
            Value::Double(d) if d.is_finite() => {
                let t = d.trunc();
                if t >= -9_223_372_036_854_775_808.0 && t < 9_223_372_036_854_775_808.0 {
                    Some(t as i64)
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

impl From<ObjectId> for Value {
    fn from(id: ObjectId) -> Self {
        Value::ObjectId(id)
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        Value::Document(doc)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int32(i)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int64(i)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}
