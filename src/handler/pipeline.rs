use std::sync::Arc;

use serde_json::Value;

use crate::cache::DescriptorCache;
use crate::config::Settings;
use crate::error::ConversionError;
use crate::instance::Instance;
use crate::materialize::Materializer;
use crate::model::{ModelBuilder, TypeDescriptor};
use crate::schema::{Schema, SchemaDialect};

/// The build-then-materialize steps shared by every handler.
#[derive(Debug, Clone)]
pub struct ModelPipeline {
    builder: ModelBuilder,
    cache: Option<DescriptorCache>,
    materializer: Materializer,
    model_name: String,
    dialect: SchemaDialect,
}

impl Default for ModelPipeline {
    fn default() -> Self {
        Self {
            builder: ModelBuilder::new(),
            cache: Some(DescriptorCache::new()),
            materializer: Materializer::new(),
            model_name: "Model".to_string(),
            dialect: SchemaDialect::default(),
        }
    }
}

impl ModelPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            builder: ModelBuilder::from_settings(settings),
            cache: settings.descriptor_cache.then(DescriptorCache::new),
            materializer: Materializer::new(),
            model_name: settings.model_name.clone(),
            dialect: settings.schema_dialect.clone(),
        }
    }

    pub fn builder(mut self, builder: ModelBuilder) -> Self {
        self.builder = builder;
        self
    }

    /// Shares `cache` with whoever else holds a clone of it.
    pub fn cache(mut self, cache: DescriptorCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn without_cache(mut self) -> Self {
        self.cache = None;
        self
    }

    pub fn model_name(mut self, name: impl Into<String>) -> Self {
        self.model_name = name.into();
        self
    }

    /// Dialect marker for schemas inferred along the way.
    pub fn dialect(mut self, dialect: SchemaDialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn schema_dialect(&self) -> &SchemaDialect {
        &self.dialect
    }

    pub fn descriptor(&self, schema: &Schema) -> Result<Arc<TypeDescriptor>, ConversionError> {
        match &self.cache {
            Some(cache) => cache.get_or_build(&self.builder, schema, &self.model_name),
            None => self.builder.build(schema, &self.model_name),
        }
    }

    pub fn run(&self, schema: &Schema, document: &Value) -> Result<Instance, ConversionError> {
        let descriptor = self.descriptor(schema)?;
        self.materializer.materialize_value(&descriptor, document)
    }
}
