//! Materialized instances.
//!
//! An [`Instance`] holds one value per declared field of its
//! [`TypeDescriptor`], absent ones included as [`FieldValue::Null`]. Fields
//! are reachable by their JSON key or by their escaped accessor, so both
//! `instance.get("References")` and `instance.get("references")` work.
//!
//! # Example
//!
//! ```rust
//! use hflav_fair::{infer, Materializer, ModelBuilder, DocumentSource};
//! use serde_json::json;
//!
//! let sample = json!({"title": "x", "measurements": [{"name": "m", "value": 1.0}]});
//! let schema = infer(&sample).unwrap();
//! let descriptor = ModelBuilder::new().build(&schema, "Model").unwrap();
//! let instance = Materializer::new()
//!     .materialize(&descriptor, DocumentSource::from(json!({
//!         "title": "HFLAV Tau",
//!         "measurements": [{"name": "tau mass", "value": 1776.93}]
//!     })))
//!     .unwrap();
//!
//! assert_eq!(instance.text("title"), Some("HFLAV Tau"));
//! let name = instance.lookup("measurements[0].name").unwrap();
//! assert_eq!(name.as_text(), Some("tau mass"));
//! ```

use std::fmt::{self, Display};
use std::str::FromStr;
use std::sync::Arc;

use indexmap::IndexMap;
use regex::Regex;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::ConversionError;
use crate::model::TypeDescriptor;
use crate::path::{JsonPath, PathSegment};

/// A materialized field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Absent from the document, or explicitly `null`.
    Null,
    Text(String),
    Integer(i64),
    /// An integer above `i64::MAX`.
    Unsigned(u64),
    Float(f64),
    Boolean(bool),
    Sequence(Vec<FieldValue>),
    Record(Instance),
    /// A value of an untyped field, kept verbatim.
    Any(Value),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null | FieldValue::Any(Value::Null))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Any(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            FieldValue::Any(v) => v.as_i64(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            FieldValue::Integer(i) => u64::try_from(*i).ok(),
            FieldValue::Unsigned(u) => Some(*u),
            FieldValue::Any(v) => v.as_u64(),
            _ => None,
        }
    }

    /// Numeric value; integers widen.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(f) => Some(*f),
            FieldValue::Integer(i) => Some(*i as f64),
            FieldValue::Unsigned(u) => Some(*u as f64),
            FieldValue::Any(v) => v.as_f64(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Boolean(b) => Some(*b),
            FieldValue::Any(Value::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Instance> {
        match self {
            FieldValue::Record(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            FieldValue::Null => Value::Null,
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Integer(i) => Value::from(*i),
            FieldValue::Unsigned(u) => Value::from(*u),
            FieldValue::Float(f) => Value::from(*f),
            FieldValue::Boolean(b) => Value::Bool(*b),
            FieldValue::Sequence(items) => Value::Array(items.iter().map(Self::to_value).collect()),
            FieldValue::Record(instance) => instance.to_value(),
            FieldValue::Any(v) => v.clone(),
        }
    }

    fn child(&self, segment: &PathSegment) -> Option<&FieldValue> {
        match (self, segment) {
            (FieldValue::Record(instance), PathSegment::Field(name)) => instance.get(name),
            (FieldValue::Sequence(items), PathSegment::Index(i)) => items.get(*i),
            _ => None,
        }
    }

    /// Text used by the `=~` search operator.
    fn searchable_text(&self) -> Option<String> {
        match self {
            FieldValue::Text(s) | FieldValue::Any(Value::String(s)) => Some(s.clone()),
            FieldValue::Integer(i) => Some(i.to_string()),
            FieldValue::Unsigned(u) => Some(u.to_string()),
            FieldValue::Float(f) => Some(f.to_string()),
            FieldValue::Boolean(b) => Some(b.to_string()),
            FieldValue::Any(v @ (Value::Number(_) | Value::Bool(_))) => Some(v.to_string()),
            _ => None,
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Null => serializer.serialize_none(),
            FieldValue::Text(s) => serializer.serialize_str(s),
            FieldValue::Integer(i) => serializer.serialize_i64(*i),
            FieldValue::Unsigned(u) => serializer.serialize_u64(*u),
            FieldValue::Float(f) => serializer.serialize_f64(*f),
            FieldValue::Boolean(b) => serializer.serialize_bool(*b),
            FieldValue::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            FieldValue::Record(instance) => instance.serialize(serializer),
            FieldValue::Any(v) => v.serialize(serializer),
        }
    }
}

/// A validated object conforming to a [`TypeDescriptor`].
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    descriptor: Arc<TypeDescriptor>,
    values: IndexMap<String, FieldValue>,
}

impl Instance {
    pub(crate) fn new(
        descriptor: Arc<TypeDescriptor>,
        values: IndexMap<String, FieldValue>,
    ) -> Self {
        Self { descriptor, values }
    }

    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    pub fn type_name(&self) -> &str {
        self.descriptor.name()
    }

    /// JSON keys of every declared field, in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// A field by JSON key or accessor. `None` only for undeclared names.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        let spec = self.descriptor.resolve(name)?;
        self.values.get(&spec.name)
    }

    /// Navigates a dotted path such as `measurements[0].inputs[1].name`.
    ///
    /// Only typed structure is traversed; untyped values are returned whole
    /// but never descended into.
    pub fn lookup(&self, expression: &str) -> Option<&FieldValue> {
        let path = JsonPath::parse(expression)?;
        self.lookup_path(&path)
    }

    pub fn lookup_path(&self, path: &JsonPath) -> Option<&FieldValue> {
        let mut segments = path.segments();
        let first = match segments.next()? {
            PathSegment::Field(name) => self.get(name)?,
            PathSegment::Index(_) => return None,
        };
        segments.try_fold(first, |current, segment| current.child(segment))
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_text)
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(FieldValue::as_i64)
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(FieldValue::as_f64)
    }

    pub fn boolean(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(FieldValue::as_bool)
    }

    pub fn record(&self, name: &str) -> Option<&Instance> {
        self.get(name).and_then(FieldValue::as_record)
    }

    pub fn sequence(&self, name: &str) -> Option<&[FieldValue]> {
        self.get(name).and_then(FieldValue::as_sequence)
    }

    /// Back to JSON, with every declared field present.
    pub fn to_value(&self) -> Value {
        let map: Map<String, Value> = self
            .values
            .iter()
            .map(|(name, value)| (name.clone(), value.to_value()))
            .collect();
        Value::Object(map)
    }

    /// Finds every record stored under a field named `object_name`, at any
    /// depth, whose `key` field satisfies `operator` against `value`.
    ///
    /// Records are returned in depth-first order.
    ///
    /// # Errors
    ///
    /// `MalformedInput` when `operator` is `=~` and `value` is not a valid
    /// regular expression string.
    ///
    /// ```rust
    /// use hflav_fair::{infer, Materializer, ModelBuilder, SearchOperator};
    /// use serde_json::json;
    ///
    /// let data = json!({"measurements": [
    ///     {"name": "m1", "value": 10.5},
    ///     {"name": "m2", "value": 20.3}
    /// ]});
    /// let descriptor = ModelBuilder::new().build(&infer(&data).unwrap(), "Model").unwrap();
    /// let instance = Materializer::new().materialize(&descriptor, data.into()).unwrap();
    ///
    /// let found = instance
    ///     .search("measurements", "value", SearchOperator::GreaterThan, &json!(15.0))
    ///     .unwrap();
    /// assert_eq!(found.len(), 1);
    /// assert_eq!(found[0].text("name"), Some("m2"));
    /// ```
    pub fn search(
        &self,
        object_name: &str,
        key: &str,
        operator: SearchOperator,
        value: &Value,
    ) -> Result<Vec<&Instance>, ConversionError> {
        let predicate = Predicate::compile(operator, value)?;
        let mut found = Vec::new();
        self.collect_matches(object_name, key, &predicate, &mut found);
        Ok(found)
    }

    fn collect_matches<'a>(
        &'a self,
        object_name: &str,
        key: &str,
        predicate: &Predicate<'_>,
        found: &mut Vec<&'a Instance>,
    ) {
        for (name, field) in &self.values {
            if name == object_name {
                for candidate in records_in(field) {
                    if candidate.get(key).is_some_and(|v| predicate.holds(v)) {
                        found.push(candidate);
                    }
                }
            }
            for nested in records_in(field) {
                nested.collect_matches(object_name, key, predicate, found);
            }
        }
    }
}

/// The records directly held by a field: itself, or the elements of a
/// sequence (one level of nesting flattened).
fn records_in(field: &FieldValue) -> Vec<&Instance> {
    match field {
        FieldValue::Record(instance) => vec![instance],
        FieldValue::Sequence(items) => items
            .iter()
            .flat_map(|item| match item {
                FieldValue::Record(instance) => vec![instance],
                FieldValue::Sequence(_) => records_in(item),
                _ => Vec::new(),
            })
            .collect(),
        _ => Vec::new(),
    }
}

impl Serialize for Instance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.type_name(), self.to_value())
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Instance>();
    assert_sync::<Instance>();
};

/// Comparison used by [`Instance::search`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchOperator {
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    GreaterThanOrEquals,
    LessThanOrEquals,
    /// Regular-expression match anywhere in the textual value.
    Matches,
}

impl SearchOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            SearchOperator::Equals => "==",
            SearchOperator::NotEquals => "!=",
            SearchOperator::GreaterThan => ">",
            SearchOperator::LessThan => "<",
            SearchOperator::GreaterThanOrEquals => ">=",
            SearchOperator::LessThanOrEquals => "<=",
            SearchOperator::Matches => "=~",
        }
    }
}

impl FromStr for SearchOperator {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "==" => Ok(SearchOperator::Equals),
            "!=" => Ok(SearchOperator::NotEquals),
            ">" => Ok(SearchOperator::GreaterThan),
            "<" => Ok(SearchOperator::LessThan),
            ">=" => Ok(SearchOperator::GreaterThanOrEquals),
            "<=" => Ok(SearchOperator::LessThanOrEquals),
            "=~" => Ok(SearchOperator::Matches),
            other => Err(ConversionError::malformed(
                "search operator",
                format!("unknown operator '{}'", other),
            )),
        }
    }
}

impl Display for SearchOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

enum Predicate<'v> {
    Compare(SearchOperator, &'v Value),
    Matches(Regex),
}

impl<'v> Predicate<'v> {
    fn compile(operator: SearchOperator, value: &'v Value) -> Result<Self, ConversionError> {
        if operator != SearchOperator::Matches {
            return Ok(Predicate::Compare(operator, value));
        }
        let pattern = value.as_str().ok_or_else(|| {
            ConversionError::malformed("search pattern", "the =~ operator needs a string pattern")
        })?;
        Regex::new(pattern)
            .map(Predicate::Matches)
            .map_err(|e| ConversionError::malformed("search pattern", e))
    }

    fn holds(&self, field: &FieldValue) -> bool {
        match self {
            Predicate::Matches(regex) => field
                .searchable_text()
                .is_some_and(|text| regex.is_match(&text)),
            Predicate::Compare(operator, target) => {
                let ordering = match (field.as_f64(), target.as_f64()) {
                    (Some(a), Some(b)) => a.partial_cmp(&b),
                    _ => None,
                };
                match operator {
                    SearchOperator::Equals => ordering
                        .map(|o| o.is_eq())
                        .unwrap_or_else(|| field.to_value() == **target),
                    SearchOperator::NotEquals => !ordering
                        .map(|o| o.is_eq())
                        .unwrap_or_else(|| field.to_value() == **target),
                    SearchOperator::GreaterThan => ordering.is_some_and(|o| o.is_gt()),
                    SearchOperator::LessThan => ordering.is_some_and(|o| o.is_lt()),
                    SearchOperator::GreaterThanOrEquals => ordering.is_some_and(|o| o.is_ge()),
                    SearchOperator::LessThanOrEquals => ordering.is_some_and(|o| o.is_le()),
                    SearchOperator::Matches => false,
                }
            }
        }
    }
}
