use std::sync::Arc;

use tracing::info;

use crate::error::ConversionError;
use crate::infer::infer;
use crate::instance::Instance;
use crate::materialize::DocumentSource;
use crate::models::Template;
use crate::source::Source;

use super::{ConversionHandler, ModelPipeline};

/// Converts with a schema inferred from the template's sample `*.json` file.
///
/// No structural validation runs here; the lenient model absorbs missing
/// fields and only type mismatches fail.
pub struct TemplateInferenceHandler {
    source: Arc<dyn Source>,
    pipeline: ModelPipeline,
}

impl TemplateInferenceHandler {
    pub fn new(source: Arc<dyn Source>, pipeline: ModelPipeline) -> Self {
        Self { source, pipeline }
    }
}

impl ConversionHandler for TemplateInferenceHandler {
    fn name(&self) -> &'static str {
        "template-inference"
    }

    fn can_handle(&self, template: &Template) -> bool {
        template.json_template.is_some()
    }

    fn handle(
        &self,
        template: &Template,
        data: DocumentSource,
    ) -> Result<Instance, ConversionError> {
        let sample_file = template
            .json_template.as_ref()
            .ok_or_else(|| ConversionError::NoHandlerCapable {
                template: template.title.clone(),
            })?;
        info!(record = template.rec_id, file = %sample_file.name, "inferring schema from template");
        let sample = self.source.fetch_json(template.rec_id, &sample_file.name)?;
        let schema = infer(&sample)?.with_dialect(self.pipeline.schema_dialect().clone());

        let document = data.into_value()?;
        self.pipeline.run(&schema, &document)
    }
}
