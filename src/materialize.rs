//! Turning documents into [`Instance`]s.
//!
//! The materializer walks a [`TypeDescriptor`] in declaration order, pulling
//! each field from the document by exact key. Absent fields become null;
//! present fields must fit their declared type. Type problems are collected
//! across the whole document and reported together.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use rayon::prelude::*;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::error::{ConversionError, Mismatch, Mismatches};
use crate::instance::{FieldValue, Instance};
use crate::model::{FieldType, TypeDescriptor};
use crate::path::JsonPath;
use crate::schema::Kind;

/// Where a data document comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentSource {
    /// An already-parsed document.
    Value(Value),
    /// Raw JSON text.
    Text(String),
    /// A file holding JSON text.
    Path(PathBuf),
}

impl DocumentSource {
    /// Interprets a caller-supplied string.
    ///
    /// A string naming an existing file is always a path, even if it would
    /// also parse as JSON; anything else is JSON text.
    pub fn from_input(input: &str) -> Self {
        let candidate = Path::new(input);
        if candidate.is_file() {
            DocumentSource::Path(candidate.to_path_buf())
        } else {
            DocumentSource::Text(input.to_string())
        }
    }

    /// Reads and parses the document.
    ///
    /// # Errors
    ///
    /// `DataNotFound` or `DataAccess` for unreadable paths, `MalformedInput`
    /// for text that is not JSON.
    pub fn into_value(self) -> Result<Value, ConversionError> {
        match self {
            DocumentSource::Value(value) => Ok(value),
            DocumentSource::Text(text) => parse_document(&text, "data document"),
            DocumentSource::Path(path) => {
                let resource = path.display().to_string();
                trace!(path = %resource, "reading data document");
                let text = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
                    std::io::ErrorKind::NotFound => ConversionError::DataNotFound {
                        resource: resource.clone(),
                    },
                    _ => ConversionError::access(resource.clone(), e),
                })?;
                parse_document(&text, &resource)
            }
        }
    }
}

fn parse_document(text: &str, context: &str) -> Result<Value, ConversionError> {
    crate::json::parse(text.as_bytes(), context)
}

impl From<Value> for DocumentSource {
    fn from(value: Value) -> Self {
        DocumentSource::Value(value)
    }
}

impl From<&str> for DocumentSource {
    fn from(input: &str) -> Self {
        DocumentSource::from_input(input)
    }
}

impl From<PathBuf> for DocumentSource {
    fn from(path: PathBuf) -> Self {
        DocumentSource::Path(path)
    }
}

impl From<&Path> for DocumentSource {
    fn from(path: &Path) -> Self {
        DocumentSource::Path(path.to_path_buf())
    }
}

/// Materializes documents against descriptors.
///
/// # Example
///
/// ```rust
/// use hflav_fair::{infer, ConversionError, DocumentSource, Materializer, ModelBuilder};
/// use serde_json::json;
///
/// let schema = infer(&json!({"value": [1.5, 2.5]})).unwrap();
/// let descriptor = ModelBuilder::new().build(&schema, "Model").unwrap();
///
/// let err = Materializer::new()
///     .materialize(&descriptor, DocumentSource::from(json!({"value": "not a list"})))
///     .unwrap_err();
///
/// assert!(matches!(err, ConversionError::Validation(_)));
/// assert_eq!(err.mismatches().unwrap().paths(), vec!["value"]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Materializer;

impl Materializer {
    pub fn new() -> Self {
        Self
    }

    /// Materializes one document.
    ///
    /// # Errors
    ///
    /// Source errors from [`DocumentSource::into_value`], or `Validation`
    /// carrying every field whose present value does not fit.
    pub fn materialize(
        &self,
        descriptor: &Arc<TypeDescriptor>,
        source: DocumentSource,
    ) -> Result<Instance, ConversionError> {
        let document = source.into_value()?;
        self.materialize_value(descriptor, &document)
    }

    /// Materializes an already-parsed document.
    pub fn materialize_value(
        &self,
        descriptor: &Arc<TypeDescriptor>,
        document: &Value,
    ) -> Result<Instance, ConversionError> {
        let root = JsonPath::root();
        let mut collected = Vec::new();

        let instance = match document {
            Value::Object(obj) => record(descriptor, obj, &root, &mut collected),
            other => {
                collected.push(Mismatch::type_mismatch(
                    root,
                    FieldType::Record(Arc::clone(descriptor)).to_string(),
                    Kind::of(other).as_str(),
                ));
                Instance::new(Arc::clone(descriptor), IndexMap::new())
            }
        };

        match Mismatches::try_from_vec(collected) {
            Some(mismatches) => {
                debug!(
                    model = descriptor.name(),
                    mismatches = mismatches.len(),
                    "materialization failed"
                );
                Err(ConversionError::Validation(mismatches))
            }
            None => {
                trace!(model = descriptor.name(), "materialized instance");
                Ok(instance)
            }
        }
    }

    /// Materializes many documents against one descriptor in parallel.
    ///
    /// Results keep the order of `sources`.
    pub fn materialize_many(
        &self,
        descriptor: &Arc<TypeDescriptor>,
        sources: Vec<DocumentSource>,
    ) -> Vec<Result<Instance, ConversionError>> {
        sources
            .into_par_iter()
            .map(|source| self.materialize(descriptor, source))
            .collect()
    }
}

fn record(
    descriptor: &Arc<TypeDescriptor>,
    obj: &Map<String, Value>,
    path: &JsonPath,
    collected: &mut Vec<Mismatch>,
) -> Instance {
    let mut values = IndexMap::with_capacity(descriptor.len());
    for spec in descriptor.fields() {
        let field_path = path.push_field(&spec.name);
        let value = match obj.get(&spec.name) {
            Some(present) => coerce(&spec.ty, present, &field_path, collected),
            None => {
                if !spec.optional {
                    collected.push(Mismatch::missing(field_path, &spec.name));
                }
                FieldValue::Null
            }
        };
        values.insert(spec.name.clone(), value);
    }
    Instance::new(Arc::clone(descriptor), values)
}

fn coerce(
    ty: &FieldType,
    value: &Value,
    path: &JsonPath,
    collected: &mut Vec<Mismatch>,
) -> FieldValue {
    if value.is_null() {
        return FieldValue::Null;
    }

    let coerced = match (ty, value) {
        (FieldType::Any, v) => Some(FieldValue::Any(v.clone())),
        (FieldType::Text, Value::String(s)) => Some(FieldValue::Text(s.clone())),
        (FieldType::Boolean, Value::Bool(b)) => Some(FieldValue::Boolean(*b)),
        (FieldType::Float, Value::Number(n)) => n.as_f64().map(FieldValue::Float),
        (FieldType::Integer, Value::Number(n)) => integer(n),
        (FieldType::Sequence(element), Value::Array(items)) => {
            let values = items
                .iter()
                .enumerate()
                .map(|(i, item)| match element {
                    Some(element) => coerce(element, item, &path.push_index(i), collected),
                    None => FieldValue::Any(item.clone()),
                })
                .collect();
            Some(FieldValue::Sequence(values))
        }
        (FieldType::Record(descriptor), Value::Object(obj)) => {
            Some(FieldValue::Record(record(descriptor, obj, path, collected)))
        }
        _ => None,
    };

    coerced.unwrap_or_else(|| {
        collected.push(Mismatch::type_mismatch(
            path.clone(),
            ty.to_string(),
            Kind::of(value).as_str(),
        ));
        FieldValue::Null
    })
}

/// Integers of either sign, and floats with no fractional part that fit in
/// an `i64`.
fn integer(n: &serde_json::Number) -> Option<FieldValue> {
    if let Some(i) = n.as_i64() {
        return Some(FieldValue::Integer(i));
    }
    if let Some(u) = n.as_u64() {
        return Some(FieldValue::Unsigned(u));
    }
    n.as_f64()
        .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
        .map(|f| FieldValue::Integer(f as i64))
}
