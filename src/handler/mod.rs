//! Choosing how a template turns data into an [`Instance`].
//!
//! A [`HandlerChain`] is an ordered list of [`ConversionHandler`]s. The first
//! handler whose [`can_handle`](ConversionHandler::can_handle) accepts the
//! template does the whole conversion; later handlers are never consulted,
//! even if the chosen one fails. The standard order is:
//!
//! 1. [`ExplicitSchemaHandler`]: the template carries a `*.schema` file.
//! 2. [`RepositorySchemaHandler`]: only when a [`SchemaRepository`] is
//!    configured and the template has a version tag.
//! 3. [`TemplateInferenceHandler`]: the template carries a sample `*.json`.
//!
//! When nothing applies the chain fails with
//! [`ConversionError::NoHandlerCapable`].

mod explicit;
mod inference;
mod pipeline;
mod repository;

pub use explicit::ExplicitSchemaHandler;
pub use inference::TemplateInferenceHandler;
pub use pipeline::ModelPipeline;
pub use repository::RepositorySchemaHandler;

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::error::ConversionError;
use crate::instance::Instance;
use crate::materialize::DocumentSource;
use crate::models::Template;
use crate::source::{SchemaRepository, Source};

/// One conversion strategy.
pub trait ConversionHandler: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    fn can_handle(&self, template: &Template) -> bool;

    fn handle(
        &self,
        template: &Template,
        data: DocumentSource,
    ) -> Result<Instance, ConversionError>;
}

/// An ordered list of handlers with first-match dispatch.
pub struct HandlerChain {
    handlers: Vec<Box<dyn ConversionHandler>>,
}

impl HandlerChain {
    pub fn new(handlers: Vec<Box<dyn ConversionHandler>>) -> Self {
        Self { handlers }
    }

    /// Explicit schema first, then inference from the sample.
    pub fn standard(source: Arc<dyn Source>) -> Self {
        Self::assemble(source, None, ModelPipeline::default())
    }

    /// The standard chain with a repository link between the two.
    pub fn with_repository(source: Arc<dyn Source>, repository: Arc<dyn SchemaRepository>) -> Self {
        Self::assemble(source, Some(repository), ModelPipeline::default())
    }

    pub fn from_settings(
        settings: &Settings,
        source: Arc<dyn Source>,
        repository: Option<Arc<dyn SchemaRepository>>,
    ) -> Self {
        Self::assemble(source, repository, ModelPipeline::from_settings(settings))
    }

    /// Builds the standard order around an explicit pipeline.
    pub fn assemble(
        source: Arc<dyn Source>,
        repository: Option<Arc<dyn SchemaRepository>>,
        pipeline: ModelPipeline,
    ) -> Self {
        let mut handlers: Vec<Box<dyn ConversionHandler>> = vec![Box::new(
            ExplicitSchemaHandler::new(Arc::clone(&source), pipeline.clone()),
        )];
        if let Some(repository) = repository {
            handlers.push(Box::new(RepositorySchemaHandler::new(repository, pipeline.clone())));
        }
        handlers.push(Box::new(TemplateInferenceHandler::new(source, pipeline)));
        Self::new(handlers)
    }

    /// Appends a handler at the lowest priority.
    pub fn push(&mut self, handler: Box<dyn ConversionHandler>) {
        self.handlers.push(handler);
    }

    pub fn handler_names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    /// The handler that would process `template`, if any.
    pub fn select(&self, template: &Template) -> Option<&dyn ConversionHandler> {
        self.handlers
            .iter()
            .find(|h| h.can_handle(template))
            .map(|h| &**h)
    }

    /// Converts `data` with the first handler that accepts `template`.
    pub fn dispatch(
        &self,
        template: &Template,
        data: DocumentSource,
    ) -> Result<Instance, ConversionError> {
        for handler in &self.handlers {
            if !handler.can_handle(template) {
                debug!(handler = handler.name(), template = %template.title, "handler declined");
                continue;
            }
            info!(handler = handler.name(), template = %template.title, "handling template");
            return handler.handle(template, data);
        }
        warn!(template = %template.title, "no handler can process template");
        Err(ConversionError::NoHandlerCapable {
            template: template.title.clone(),
        })
    }
}
