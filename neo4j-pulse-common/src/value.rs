//! Loosely-typed values returned by Cypher queries.

use serde_json::Value;

/// A single value from a query result.
///
/// Nested maps (JMX composite attributes, attribute envelopes) are kept as
/// ordered key/value pairs so that output follows server order.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// Integral number.
    Integer(i64),

    /// Floating point number.
    Float(f64),

    /// Text value.
    Text(String),

    /// Nested object.
    Object(Vec<(String, RawValue)>),

    /// Anything else (booleans, nulls, lists).
    Opaque,
}

impl RawValue {
    /// Convert a decoded JSON value, recursing into objects.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Number(n) => match n.as_i64() {
                Some(i) => RawValue::Integer(i),
                None => n.as_f64().map(RawValue::Float).unwrap_or(RawValue::Opaque),
            },
            Value::String(s) => RawValue::Text(s),
            Value::Object(map) => RawValue::Object(
                map.into_iter()
                    .map(|(k, v)| (k, RawValue::from_json(v)))
                    .collect(),
            ),
            Value::Null | Value::Bool(_) | Value::Array(_) => RawValue::Opaque,
        }
    }

    /// Integral reading of a numeric value. Floats are truncated toward zero.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            RawValue::Integer(i) => Some(*i),
            RawValue::Float(f) => Some(f.trunc() as i64),
            _ => None,
        }
    }

    /// Floating reading of a numeric value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RawValue::Integer(i) => Some(*i as f64),
            RawValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            RawValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Entries of an object value.
    pub fn as_object(&self) -> Option<&[(String, RawValue)]> {
        match self {
            RawValue::Object(entries) => Some(entries),
            _ => None,
        }
    }

    /// Look up a key of an object value (exact match).
    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.as_object()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Look up a key of an object value, ignoring ASCII case.
    pub fn get_ignore_case(&self, key: &str) -> Option<&RawValue> {
        self.as_object()?
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    }
}

impl From<i64> for RawValue {
    fn from(v: i64) -> Self {
        RawValue::Integer(v)
    }
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        RawValue::Float(v)
    }
}

impl From<&str> for RawValue {
    fn from(v: &str) -> Self {
        RawValue::Text(v.to_string())
    }
}

impl From<String> for RawValue {
    fn from(v: String) -> Self {
        RawValue::Text(v)
    }
}

/// One row of a query result: column names paired with their values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, RawValue)>,
}

impl Record {
    /// Create a record from column/value pairs.
    pub fn new(fields: Vec<(String, RawValue)>) -> Self {
        Self { fields }
    }

    /// Zip a column list with a row of JSON values.
    pub fn from_row(columns: &[String], row: Vec<Value>) -> Self {
        let fields = columns
            .iter()
            .cloned()
            .zip(row.into_iter().map(RawValue::from_json))
            .collect();
        Self { fields }
    }

    /// Add a field to this record.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
