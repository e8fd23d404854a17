//! Documents, field paths, and field-level update operators.
//!
//! A document is a JSON object. Updates address a nested location with a typed
//! [`FieldPath`] and apply a [`FieldOp`] there. Paths are built from segments,
//! never parsed from strings, so a caller cannot smuggle separators into a key.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Result, StoreError};

/// A stored document. Always a JSON object at the top level.
pub type Document = Value;

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq)]
pub enum PathSegment {
    /// A key in an object.
    Key(String),
    /// A position in an array.
    Index(usize),
    /// The first array element whose `field` equals `equals`.
    Where {
        /// Field inspected on each element.
        field: String,
        /// Value the field must equal.
        equals: Value,
    },
}

/// A typed path to a nested field inside a document.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    /// Start a path at a top-level field.
    #[must_use]
    pub fn field(name: impl Into<String>) -> Self {
        Self(vec![PathSegment::Key(name.into())])
    }

    /// Descend into an object key.
    #[must_use]
    pub fn key(mut self, name: impl Into<String>) -> Self {
        self.0.push(PathSegment::Key(name.into()));
        self
    }

    /// Descend into an array position.
    #[must_use]
    pub fn index(mut self, index: usize) -> Self {
        self.0.push(PathSegment::Index(index));
        self
    }

    /// Descend into the first array element whose `field` equals `equals`.
    #[must_use]
    pub fn element_where(mut self, field: impl Into<String>, equals: impl Into<Value>) -> Self {
        self.0.push(PathSegment::Where {
            field: field.into(),
            equals: equals.into(),
        });
        self
    }

    /// The segments of this path.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    fn invalid(&self, reason: impl Into<String>) -> StoreError {
        StoreError::InvalidPath {
            path: self.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if i == 0 => write!(f, "{key}")?,
                PathSegment::Key(key) => write!(f, ".{key}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
                PathSegment::Where { field, equals } => write!(f, "[{field}=={equals}]")?,
            }
        }
        Ok(())
    }
}

/// A field-level write operator.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOp {
    /// Replace the value at the path.
    Set(Value),
    /// Remove the key at the path. A missing path is a no-op.
    Delete,
    /// Append each value not already present in the array.
    ArrayUnion(Vec<Value>),
    /// Append every value, duplicates included.
    ArrayAppend(Vec<Value>),
    /// Remove every element equal to one of the values.
    ArrayRemove(Vec<Value>),
    /// Set the value to the commit's server timestamp.
    ServerTimestamp,
}

/// A single field update: a path and the operator applied there.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldUpdate {
    /// Where to apply the operator.
    pub path: FieldPath,
    /// What to do there.
    pub op: FieldOp,
}

impl FieldUpdate {
    /// Replace the value at `path`.
    #[must_use]
    pub fn set(path: FieldPath, value: impl Into<Value>) -> Self {
        Self {
            path,
            op: FieldOp::Set(value.into()),
        }
    }

    /// Remove the key at `path`.
    #[must_use]
    pub const fn delete(path: FieldPath) -> Self {
        Self {
            path,
            op: FieldOp::Delete,
        }
    }

    /// Union `values` into the array at `path`.
    #[must_use]
    pub const fn array_union(path: FieldPath, values: Vec<Value>) -> Self {
        Self {
            path,
            op: FieldOp::ArrayUnion(values),
        }
    }

    /// Append `values` to the array at `path`, keeping duplicates.
    #[must_use]
    pub const fn array_append(path: FieldPath, values: Vec<Value>) -> Self {
        Self {
            path,
            op: FieldOp::ArrayAppend(values),
        }
    }

    /// Remove `values` from the array at `path`.
    #[must_use]
    pub const fn array_remove(path: FieldPath, values: Vec<Value>) -> Self {
        Self {
            path,
            op: FieldOp::ArrayRemove(values),
        }
    }

    /// Set `path` to the server timestamp.
    #[must_use]
    pub const fn server_timestamp(path: FieldPath) -> Self {
        Self {
            path,
            op: FieldOp::ServerTimestamp,
        }
    }
}

/// The current time at the precision the store persists, for use as a
/// commit time.
#[must_use]
pub fn server_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Render a timestamp the way the store persists it.
#[must_use]
pub fn timestamp_value(at: DateTime<Utc>) -> Value {
    Value::String(at.to_rfc3339_opts(SecondsFormat::Micros, true))
}

/// Serialize a typed record into a document.
///
/// # Errors
///
/// Returns `StoreError::Serialization` if the value does not serialize to an object.
pub fn to_document<T: Serialize>(value: &T) -> Result<Document> {
    let doc = serde_json::to_value(value).map_err(|e| StoreError::Serialization(e.to_string()))?;
    if !doc.is_object() {
        return Err(StoreError::Serialization(
            "document must be an object".to_string(),
        ));
    }
    Ok(doc)
}

/// Deserialize a document into a typed record.
///
/// # Errors
///
/// Returns `StoreError::Serialization` if the document does not match the type.
pub fn from_document<T: DeserializeOwned>(doc: Document) -> Result<T> {
    serde_json::from_value(doc).map_err(|e| StoreError::Serialization(e.to_string()))
}

/// Apply one field update to a document in place.
///
/// Missing object keys along the path are created, except for `Delete`, where a
/// missing path is left alone. Array segments must resolve to an existing element.
///
/// # Errors
///
/// Returns `StoreError::InvalidPath` if the path cannot be resolved.
pub fn apply_update(doc: &mut Document, update: &FieldUpdate, now: DateTime<Utc>) -> Result<()> {
    let path = &update.path;
    let Some((last, parents)) = path.segments().split_last() else {
        return Err(path.invalid("empty path"));
    };
    let create = !matches!(update.op, FieldOp::Delete);

    let mut current = doc;
    for segment in parents {
        current = match segment {
            PathSegment::Key(key) => {
                if key.is_empty() {
                    return Err(path.invalid("empty key"));
                }
                let Value::Object(map) = current else {
                    return Err(path.invalid(format!("cannot read key {key:?} of a non-object")));
                };
                if !create && !map.contains_key(key) {
                    return Ok(());
                }
                map.entry(key.clone())
                    .or_insert_with(|| Value::Object(Map::new()))
            }
            PathSegment::Index(_) | PathSegment::Where { .. } => {
                array_element(current, segment, path)?
            }
        };
    }

    match last {
        PathSegment::Key(key) => {
            if key.is_empty() {
                return Err(path.invalid("empty key"));
            }
            let Value::Object(map) = current else {
                return Err(path.invalid(format!("cannot write key {key:?} of a non-object")));
            };
            if matches!(update.op, FieldOp::Delete) {
                map.remove(key);
            } else {
                let slot = map.entry(key.clone()).or_insert(Value::Null);
                apply_op(slot, &update.op, now);
            }
        }
        PathSegment::Index(_) | PathSegment::Where { .. } => {
            if matches!(update.op, FieldOp::Delete) {
                return Err(path.invalid("cannot delete an array element"));
            }
            let slot = array_element(current, last, path)?;
            apply_op(slot, &update.op, now);
        }
    }

    Ok(())
}

fn array_element<'a>(
    current: &'a mut Value,
    segment: &PathSegment,
    path: &FieldPath,
) -> Result<&'a mut Value> {
    let Value::Array(items) = current else {
        return Err(path.invalid("cannot index a non-array"));
    };
    match segment {
        PathSegment::Index(index) => {
            let len = items.len();
            items
                .get_mut(*index)
                .ok_or_else(|| path.invalid(format!("index {index} out of range (len {len})")))
        }
        PathSegment::Where { field, equals } => items
            .iter_mut()
            .find(|item| item.get(field).is_some_and(|v| values_equal(v, equals)))
            .ok_or_else(|| path.invalid(format!("no element with {field} == {equals}"))),
        PathSegment::Key(_) => Err(path.invalid("expected an array segment")),
    }
}

fn apply_op(slot: &mut Value, op: &FieldOp, now: DateTime<Utc>) {
    match op {
        FieldOp::Set(value) => *slot = value.clone(),
        FieldOp::ServerTimestamp => *slot = timestamp_value(now),
        FieldOp::ArrayUnion(values) => {
            if !slot.is_array() {
                *slot = Value::Array(Vec::new());
            }
            if let Value::Array(items) = slot {
                for value in values {
                    if !items.iter().any(|item| values_equal(item, value)) {
                        items.push(value.clone());
                    }
                }
            }
        }
        FieldOp::ArrayAppend(values) => {
            if let Value::Array(items) = slot {
                items.extend(values.iter().cloned());
            } else {
                *slot = Value::Array(values.clone());
            }
        }
        FieldOp::ArrayRemove(values) => {
            if let Value::Array(items) = slot {
                items.retain(|item| !values.iter().any(|value| values_equal(item, value)));
            } else {
                *slot = Value::Array(Vec::new());
            }
        }
        // Handled by the caller, which owns the parent container.
        FieldOp::Delete => {}
    }
}

/// Equality used by filters and array operators. Numbers compare by value, so
/// `100` equals `100.0`.
#[must_use]
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Total order used for query sorting.
///
/// Values of different types order as null < bool < number < string < array <
/// object. Strings that are both RFC 3339 timestamps compare chronologically.
#[must_use]
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => {
            match (
                DateTime::parse_from_rfc3339(x),
                DateTime::parse_from_rfc3339(y),
            ) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => x.cmp(y),
            }
        }
        (Value::Array(x), Value::Array(y)) => x
            .iter()
            .zip(y)
            .map(|(x, y)| compare_values(x, y))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or_else(|| x.len().cmp(&y.len())),
        _ => rank(a).cmp(&rank(b)),
    }
}
