use std::sync::Arc;

use tracing::info;

use crate::error::ConversionError;
use crate::instance::Instance;
use crate::materialize::DocumentSource;
use crate::models::Template;
use crate::schema::Schema;
use crate::source::SchemaRepository;
use crate::validate::{check, Strictness};

use super::{ConversionHandler, ModelPipeline};

/// Converts with the schema a [`SchemaRepository`] publishes under the
/// template's version tag.
pub struct RepositorySchemaHandler {
    repository: Arc<dyn SchemaRepository>,
    pipeline: ModelPipeline,
}

impl RepositorySchemaHandler {
    pub fn new(repository: Arc<dyn SchemaRepository>, pipeline: ModelPipeline) -> Self {
        Self {
            repository,
            pipeline,
        }
    }
}

impl ConversionHandler for RepositorySchemaHandler {
    fn name(&self) -> &'static str {
        "repository-schema"
    }

    fn can_handle(&self, template: &Template) -> bool {
        template.version.is_some()
    }

    fn handle(
        &self,
        template: &Template,
        data: DocumentSource,
    ) -> Result<Instance, ConversionError> {
        let tag = template.version.as_deref().ok_or_else(|| ConversionError::NoHandlerCapable {
            template: template.title.clone(),
        })?;
        info!(record = template.rec_id, tag, "fetching repository schema");
        let schema = Schema::from_json_schema(&self.repository.fetch_schema_at_tag(tag)?)?;

        let document = data.into_value()?;
        check(&schema, &document, Strictness::Strict)?;
        self.pipeline.run(&schema, &document)
    }
}
