//! Schema inference from sample documents.
//!
//! A single sample marks every observed property as required. Feeding more
//! samples through a [`SchemaInferrer`] keeps a property required only if
//! every object observed at that position carried it, and widens kinds to
//! the union of what was seen.
//!
//! # Example
//!
//! ```rust
//! use hflav_fair::{Kind, SchemaInferrer};
//! use serde_json::json;
//!
//! let schema = SchemaInferrer::new()
//!     .add(&json!({"name": "tau mass", "value": 1776}))
//!     .add(&json!({"name": "tau lifetime", "value": 290.3, "unit": "fs"}))
//!     .into_schema();
//!
//! assert!(schema.is_required("name"));
//! assert!(!schema.is_required("unit"));
//! assert!(schema.property("value").unwrap().kinds().contains(Kind::Number));
//! ```

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::error::ConversionError;
use crate::schema::{Kind, KindSet, Schema, SchemaDialect};

/// Accumulates samples and produces a merged [`Schema`].
#[derive(Debug, Clone, Default)]
pub struct SchemaInferrer {
    root: Observed,
    samples: usize,
    dialect: SchemaDialect,
}

/// Everything seen at one position across all samples.
#[derive(Debug, Clone, Default)]
struct Observed {
    kinds: KindSet,
    objects: usize,
    properties: IndexMap<String, (usize, Observed)>,
    items: Option<Box<Observed>>,
}

impl Observed {
    fn observe(&mut self, value: &Value) {
        self.kinds.merge(&KindSet::single(Kind::of(value)));
        match value {
            Value::Object(obj) => {
                self.objects += 1;
                for (name, child) in obj {
                    let (seen, observed) = self.properties.entry(name.clone()).or_default();
                    *seen += 1;
                    observed.observe(child);
                }
            }
            Value::Array(elements) => {
                for element in elements {
                    self.items.get_or_insert_with(Box::default).observe(element);
                }
            }
            _ => {}
        }
    }

    fn into_schema(self) -> Schema {
        let objects = self.objects;
        let mut required = indexmap::IndexSet::new();
        let properties = self
            .properties
            .into_iter()
            .map(|(name, (seen, observed))| {
                if seen == objects {
                    required.insert(name.clone());
                }
                (name, observed.into_schema())
            })
            .collect();
        Schema::from_parts(
            self.kinds,
            properties,
            required,
            self.items.map(|items| items.into_schema()),
        )
    }
}

impl SchemaInferrer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The dialect marker put on the result; draft-07 unless set.
    pub fn dialect(mut self, dialect: SchemaDialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Folds one more sample into the inference.
    pub fn add(mut self, sample: &Value) -> Self {
        self.root.observe(sample);
        self.samples += 1;
        self
    }

    /// Parses `text` and folds it in.
    pub fn add_str(self, text: &str) -> Result<Self, ConversionError> {
        let sample = parse_sample(text)?;
        Ok(self.add(&sample))
    }

    /// Number of samples folded in so far.
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// The merged schema, marked with the configured dialect.
    pub fn into_schema(self) -> Schema {
        debug!(samples = self.samples, properties = self.root.properties.len(), "inferred schema");
        self.root.into_schema().with_dialect(self.dialect)
    }
}

/// Infers a schema from one sample.
///
/// # Errors
///
/// `MalformedInput` if the sample is a bare scalar rather than an object or
/// array.
pub fn infer(sample: &Value) -> Result<Schema, ConversionError> {
    ensure_structured(sample)?;
    Ok(SchemaInferrer::new().add(sample).into_schema())
}

/// Parses `text` and infers a schema from it.
pub fn infer_str(text: &str) -> Result<Schema, ConversionError> {
    let sample = parse_sample(text)?;
    infer(&sample)
}

/// Infers one schema from several samples.
///
/// An empty iterator yields a schema that admits anything.
pub fn infer_all<'a, I>(samples: I) -> Result<Schema, ConversionError>
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut inferrer = SchemaInferrer::new();
    for sample in samples {
        ensure_structured(sample)?;
        inferrer = inferrer.add(sample);
    }
    Ok(inferrer.into_schema())
}

fn ensure_structured(sample: &Value) -> Result<(), ConversionError> {
    match sample {
        Value::Object(_) | Value::Array(_) => Ok(()),
        other => Err(ConversionError::malformed(
            "template sample",
            format!("expected an object or array, got {}", Kind::of(other)),
        )),
    }
}

fn parse_sample(text: &str) -> Result<Value, ConversionError> {
    crate::json::parse(text.as_bytes(), "template sample")
}
