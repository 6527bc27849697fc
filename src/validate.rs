//! Structural validation of documents against a [`Schema`].
//!
//! Only declared properties are checked: a present property must have one of
//! its declared kinds, and every array element must match the item schema.
//! Undeclared properties pass through. Required properties are enforced only
//! under [`Strictness::Strict`]. All mismatches are collected before
//! reporting, so one call surfaces every problem in the document.
//!
//! # Example
//!
//! ```rust
//! use hflav_fair::{validate, Schema, Strictness};
//! use serde_json::json;
//!
//! let schema = Schema::from_json_schema(&json!({
//!     "type": "object",
//!     "properties": {"doi": {"type": "string"}},
//!     "required": ["doi"]
//! })).unwrap();
//!
//! let result = validate(&schema, &json!({"doi": 123}), Strictness::Strict);
//! let mismatches = result.into_result().unwrap_err();
//! assert_eq!(mismatches.paths(), vec!["doi"]);
//! assert_eq!(mismatches.first().expected.as_deref(), Some("string"));
//! assert_eq!(mismatches.first().got.as_deref(), Some("integer"));
//! ```

use serde_json::Value;
use tracing::debug;

use crate::error::{ConversionError, Mismatch, Mismatches};
use crate::path::JsonPath;
use crate::schema::{Kind, KindSet, Schema};
use crate::ValidationResult;

/// Whether missing required properties count as mismatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strictness {
    /// Only the kinds of present values are checked.
    Lenient,
    /// Required properties must be present as well.
    #[default]
    Strict,
}

/// Checks `document` against `schema`, accumulating every mismatch.
///
/// Never mutates its inputs, so it is safe to call concurrently on a shared
/// schema.
pub fn validate(schema: &Schema, document: &Value, strictness: Strictness) -> ValidationResult<()> {
    let mut collected = Vec::new();
    walk(schema, document, &JsonPath::root(), strictness, &mut collected);
    if !collected.is_empty() {
        debug!(mismatches = collected.len(), "document failed structural validation");
    }
    Mismatches::into_validation((), collected)
}

/// [`validate`], folded into a [`ConversionError::Structure`] on failure.
pub fn check(
    schema: &Schema,
    document: &Value,
    strictness: Strictness,
) -> Result<(), ConversionError> {
    validate(schema, document, strictness)
        .into_result()
        .map_err(ConversionError::Structure)
}

fn walk(
    schema: &Schema,
    value: &Value,
    path: &JsonPath,
    strictness: Strictness,
    collected: &mut Vec<Mismatch>,
) {
    let actual = Kind::of(value);
    if !admits_value(schema.kinds(), value) {
        collected.push(Mismatch::type_mismatch(
            path.clone(),
            schema.kinds().to_string(),
            actual.as_str(),
        ));
        return;
    }

    match value {
        Value::Object(obj) => {
            for (name, property) in schema.properties() {
                let field_path = path.push_field(name);
                match obj.get(name) {
                    Some(field_value) => {
                        walk(property, field_value, &field_path, strictness, collected);
                    }
                    None if strictness == Strictness::Strict && schema.is_required(name) => {
                        collected.push(Mismatch::missing(field_path, name));
                    }
                    None => {}
                }
            }
        }
        Value::Array(elements) => {
            if let Some(items) = schema.items() {
                for (index, element) in elements.iter().enumerate() {
                    walk(items, element, &path.push_index(index), strictness, collected);
                }
            }
        }
        _ => {}
    }
}

/// Like [`KindSet::admits`], but also lets an integral float such as `3.0`
/// satisfy `integer`, as JSON Schema does.
fn admits_value(kinds: &KindSet, value: &Value) -> bool {
    let actual = Kind::of(value);
    kinds.admits(actual)
        || (actual == Kind::Number
            && kinds.contains(Kind::Integer)
            && value.as_f64().is_some_and(|f| f.fract() == 0.0))
}
