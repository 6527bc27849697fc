use std::sync::Arc;

use tracing::{debug, info};

use crate::error::ConversionError;
use crate::instance::Instance;
use crate::materialize::DocumentSource;
use crate::models::Template;
use crate::schema::Schema;
use crate::source::Source;
use crate::validate::{check, Strictness};

use super::{ConversionHandler, ModelPipeline};

/// Converts with the `*.schema` file attached to the template record.
///
/// The data document is validated strictly (required properties included)
/// before it is materialized.
pub struct ExplicitSchemaHandler {
    source: Arc<dyn Source>,
    pipeline: ModelPipeline,
}

impl ExplicitSchemaHandler {
    pub fn new(source: Arc<dyn Source>, pipeline: ModelPipeline) -> Self {
        Self { source, pipeline }
    }
}

impl ConversionHandler for ExplicitSchemaHandler {
    fn name(&self) -> &'static str {
        "explicit-schema"
    }

    fn can_handle(&self, template: &Template) -> bool {
        template.json_schema.is_some()
    }

    fn handle(
        &self,
        template: &Template,
        data: DocumentSource,
    ) -> Result<Instance, ConversionError> {
        let schema_file = template
            .json_schema.as_ref()
            .ok_or_else(|| ConversionError::NoHandlerCapable {
                template: template.title.clone(),
            })?;
        info!(record = template.rec_id, file = %schema_file.name, "fetching explicit schema");
        let schema_document = self.source.fetch_json(template.rec_id, &schema_file.name)?;
        let schema = Schema::from_json_schema(&schema_document)?;

        let document = data.into_value()?;
        check(&schema, &document, Strictness::Strict)?;
        debug!(record = template.rec_id, "document matches explicit schema");
        self.pipeline.run(&schema, &document)
    }
}
