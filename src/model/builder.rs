use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::config::Settings;
use crate::error::ConversionError;
use crate::schema::{Kind, Schema};

use super::ident::{accessor, type_fragment};
use super::{FieldSpec, FieldType, TypeDescriptor};

/// How the schema's `required` list affects the built fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Optionality {
    /// Every field is optional; absent fields materialize as null.
    #[default]
    Lenient,
    /// Fields listed in `required` must be present.
    StrictRequired,
}

/// Builds [`TypeDescriptor`]s from schemas.
///
/// Building is deterministic: the same schema and name always yield equal
/// descriptors.
///
/// # Example
///
/// ```rust
/// use hflav_fair::{infer, FieldType, ModelBuilder};
/// use serde_json::json;
///
/// let schema = infer(&json!({"title": "x", "measurements": [{"value": 1.5}]})).unwrap();
/// let descriptor = ModelBuilder::new().build(&schema, "Model").unwrap();
///
/// assert_eq!(descriptor.field("title").unwrap().ty, FieldType::Text);
/// let measurements = descriptor.field("measurements").unwrap();
/// assert_eq!(measurements.ty.to_string(), "sequence<record<ModelMeasurementsItem>>");
/// assert!(measurements.optional);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ModelBuilder {
    optionality: Optionality,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let optionality = if settings.strict_required {
            Optionality::StrictRequired
        } else {
            Optionality::Lenient
        };
        Self::new().optionality(optionality)
    }

    pub fn optionality(mut self, optionality: Optionality) -> Self {
        self.optionality = optionality;
        self
    }

    pub fn current_optionality(&self) -> Optionality {
        self.optionality
    }

    /// Builds a descriptor named `name` from an object schema.
    ///
    /// # Errors
    ///
    /// `SchemaBuild` if the schema does not describe an object.
    pub fn build(
        &self,
        schema: &Schema,
        name: &str,
    ) -> Result<Arc<TypeDescriptor>, ConversionError> {
        if !schema.is_object_like() && !schema.kinds().is_any() {
            return Err(ConversionError::schema_build(
                name,
                format!("expected an object schema, got {}", schema.kinds()),
            ));
        }
        let descriptor = self.record(schema, name)?;
        debug!(model = name, fields = descriptor.len(), "built type descriptor");
        Ok(descriptor)
    }

    fn record(&self, schema: &Schema, name: &str) -> Result<Arc<TypeDescriptor>, ConversionError> {
        let mut fields = IndexMap::with_capacity(schema.properties().len());
        let mut taken: HashSet<String> = HashSet::new();

        for (property, property_schema) in schema.properties() {
            let field_accessor = unique_accessor(accessor(property), &mut taken);

            let nested_name = format!("{}{}", name, type_fragment(property));
            let ty = self.field_type(property_schema, &nested_name)?;
            let optional = match self.optionality {
                Optionality::Lenient => true,
                Optionality::StrictRequired => !schema.is_required(property),
            };
            fields.insert(
                property.clone(),
                FieldSpec {
                    name: property.clone(),
                    accessor: field_accessor,
                    ty,
                    optional,
                },
            );
        }

        Ok(Arc::new(TypeDescriptor::new(name.to_string(), fields)))
    }

    fn field_type(&self, schema: &Schema, nested_name: &str) -> Result<FieldType, ConversionError> {
        let kinds = schema.kinds().without_null();
        let ty = match kinds.as_slice() {
            [Kind::String] => FieldType::Text,
            [Kind::Integer] => FieldType::Integer,
            [Kind::Number] | [Kind::Integer, Kind::Number] => FieldType::Float,
            [Kind::Boolean] => FieldType::Boolean,
            [Kind::Array] => {
                let element = match schema.items() {
                    Some(items) => {
                        let item_name = format!("{}Item", nested_name);
                        Some(Box::new(self.field_type(items, &item_name)?))
                    }
                    None => None,
                };
                FieldType::Sequence(element)
            }
            // A declared object with no properties keeps its raw contents.
            [Kind::Object] if !schema.properties().is_empty() => {
                FieldType::Record(self.record(schema, nested_name)?)
            }
            [] if !schema.properties().is_empty() => {
                FieldType::Record(self.record(schema, nested_name)?)
            }
            _ => FieldType::Any,
        };
        Ok(ty)
    }
}

/// Numbers a repeated accessor: `field`, `field_2`, `field_3`, ...
fn unique_accessor(base: String, taken: &mut HashSet<String>) -> String {
    let mut candidate = base.clone();
    let mut n = 2;
    while taken.contains(&candidate) {
        candidate = format!("{}_{}", base, n);
        n += 1;
    }
    taken.insert(candidate.clone());
    candidate
}
