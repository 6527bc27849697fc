//! JSON-Schema interoperability.
//!
//! Only the structural keywords are understood: `type`, `properties`,
//! `required`, `items` and `$schema`. Everything else (formats, bounds,
//! combinators, `$ref`) is ignored on import and never emitted.

use indexmap::{IndexMap, IndexSet};
use serde_json::{json, Map, Value};

use crate::error::ConversionError;
use crate::path::JsonPath;

use super::{Kind, KindSet, Schema, SchemaDialect};

/// Conversion to a JSON-Schema document.
pub trait ToJsonSchema {
    fn to_json_schema(&self) -> Value;
}

impl ToJsonSchema for Schema {
    fn to_json_schema(&self) -> Value {
        let mut out = Map::new();
        if let Some(dialect) = self.dialect() {
            out.insert("$schema".to_string(), json!(dialect.uri()));
        }

        let kinds: Vec<&str> = self.kinds().iter().map(Kind::as_str).collect();
        match kinds.as_slice() {
            [] => {}
            [single] => {
                out.insert("type".to_string(), json!(single));
            }
            many => {
                out.insert("type".to_string(), json!(many));
            }
        }

        if self.is_object_like() {
            let properties: Map<String, Value> = self
                .properties()
                .iter()
                .map(|(name, schema)| (name.clone(), schema.to_json_schema()))
                .collect();
            out.insert("properties".to_string(), Value::Object(properties));
            if !self.required().is_empty() {
                let required: Vec<&String> = self.required().iter().collect();
                out.insert("required".to_string(), json!(required));
            }
        }

        if let Some(items) = self.items() {
            out.insert("items".to_string(), items.to_json_schema());
        }

        Value::Object(out)
    }
}

impl Schema {
    /// Reads a schema from a JSON-Schema document.
    ///
    /// A node without `type` but with `properties` is read as an object.
    /// Unrecognized type names are dropped; a node left with no kinds admits
    /// anything.
    ///
    /// # Errors
    ///
    /// `MalformedInput` when a node (or `properties`/`required`) has the wrong
    /// JSON shape, `SchemaBuild` when `required` names an undeclared property.
    ///
    /// # Example
    ///
    /// ```rust
    /// use hflav_fair::{Schema, SchemaDialect};
    /// use serde_json::json;
    ///
    /// let schema = Schema::from_json_schema(&json!({
    ///     "$schema": "http://json-schema.org/draft-07/schema#",
    ///     "type": "object",
    ///     "properties": {"doi": {"type": "string"}},
    ///     "required": ["doi"]
    /// })).unwrap();
    ///
    /// assert_eq!(schema.dialect(), Some(&SchemaDialect::Draft07));
    /// assert!(schema.is_required("doi"));
    /// ```
    pub fn from_json_schema(document: &Value) -> Result<Self, ConversionError> {
        let mut schema = read_node(document, &JsonPath::root())?;
        if let Some(uri) = document.get("$schema").and_then(Value::as_str) {
            schema = schema.with_dialect(SchemaDialect::from(uri.to_string()));
        }
        Ok(schema)
    }

    /// Parses JSON text and reads it with [`Schema::from_json_schema`].
    pub fn from_json_schema_str(text: &str) -> Result<Self, ConversionError> {
        let document = crate::json::parse(text.as_bytes(), "schema document")?;
        Self::from_json_schema(&document)
    }
}

fn read_node(node: &Value, at: &JsonPath) -> Result<Schema, ConversionError> {
    let obj = match node {
        // `true` is the JSON-Schema spelling of "anything goes".
        Value::Bool(true) => return Ok(Schema::any()),
        Value::Object(obj) => obj,
        other => {
            return Err(ConversionError::malformed(
                "schema document",
                format!("expected a schema object at '{}', got {}", at, Kind::of(other)),
            ))
        }
    };

    let mut kinds = read_kinds(obj.get("type"), at)?;

    let mut properties = IndexMap::new();
    if let Some(declared) = obj.get("properties") {
        let declared = declared.as_object().ok_or_else(|| {
            ConversionError::malformed(
                "schema document",
                format!("'properties' at '{}' must be an object", at),
            )
        })?;
        for (name, sub) in declared {
            properties.insert(name.clone(), read_node(sub, &at.push_field(name))?);
        }
        if kinds.is_any() {
            kinds.insert(Kind::Object);
        }
    }

    let mut required = IndexSet::new();
    if let Some(names) = obj.get("required") {
        let names = names.as_array().ok_or_else(|| {
            ConversionError::malformed(
                "schema document",
                format!("'required' at '{}' must be an array", at),
            )
        })?;
        for name in names {
            let name = name.as_str().ok_or_else(|| {
                ConversionError::malformed(
                    "schema document",
                    format!("'required' at '{}' must list property names", at),
                )
            })?;
            if !properties.contains_key(name) {
                return Err(ConversionError::schema_build(
                    "schema",
                    format!("required property '{}' at '{}' is not declared", name, at),
                ));
            }
            required.insert(name.to_string());
        }
    }

    // Tuple-form `items` is not modelled; such arrays admit any element.
    let items = match obj.get("items") {
        Some(items @ (Value::Object(_) | Value::Bool(true))) => {
            Some(read_node(items, &at.push_index(0))?)
        }
        _ => None,
    };

    Ok(Schema::from_parts(kinds, properties, required, items))
}

fn read_kinds(declared: Option<&Value>, at: &JsonPath) -> Result<KindSet, ConversionError> {
    match declared {
        None => Ok(KindSet::any()),
        Some(Value::String(name)) => Ok(Kind::from_name(name).into_iter().collect()),
        Some(Value::Array(names)) => Ok(names
            .iter()
            .filter_map(Value::as_str)
            .filter_map(Kind::from_name)
            .collect()),
        Some(_) => Err(ConversionError::malformed(
            "schema document",
            format!("'type' at '{}' must be a string or an array of strings", at),
        )),
    }
}
