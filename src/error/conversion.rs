//! Failures that stop a conversion.

use super::Mismatches;

/// Everything that can go wrong between a template and a materialized instance.
///
/// None of these are retried inside the crate; they all propagate to the
/// caller, which owns any recovery policy.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    /// Input could not be parsed as a structured document.
    #[error("malformed input ({context}): {reason}")]
    MalformedInput { context: String, reason: String },

    /// A document failed validation against an explicit schema.
    #[error("document does not match the schema: {0}")]
    Structure(Mismatches),

    /// A present value could not be coerced to its declared field type.
    #[error("document does not fit the model: {0}")]
    Validation(Mismatches),

    /// A schema could not be turned into a type descriptor.
    #[error("cannot build model '{model}': {reason}")]
    SchemaBuild { model: String, reason: String },

    /// No strategy in the handler chain accepts the template.
    #[error("no handler is capable of processing template '{template}'")]
    NoHandlerCapable { template: String },

    /// The source has no such record or file.
    #[error("data not found: {resource}")]
    DataNotFound { resource: String },

    /// The source has the resource but it could not be read or written.
    #[error("error accessing {resource}: {reason}")]
    DataAccess { resource: String, reason: String },

    /// A configuration value could not be interpreted.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ConversionError {
    pub(crate) fn malformed(context: impl Into<String>, reason: impl ToString) -> Self {
        Self::MalformedInput {
            context: context.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn schema_build(model: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SchemaBuild {
            model: model.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn access(resource: impl Into<String>, reason: impl ToString) -> Self {
        Self::DataAccess {
            resource: resource.into(),
            reason: reason.to_string(),
        }
    }

    /// The structural diagnostics carried by `Structure` or `Validation`.
    pub fn mismatches(&self) -> Option<&Mismatches> {
        match self {
            Self::Structure(m) | Self::Validation(m) => Some(m),
            _ => None,
        }
    }
}
