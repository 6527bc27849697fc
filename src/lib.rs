//! # hflav-fair
//!
//! Schema-driven conversion of HFLAV averages into typed, navigable
//! instances.
//!
//! ## Overview
//!
//! HFLAV publishes its averages on Zenodo as JSON documents whose shape is
//! only known at runtime: a template record carries either an explicit
//! JSON-Schema file or a sample document. This crate turns such a template
//! into a reusable [`TypeDescriptor`] and materializes any number of data
//! documents against it:
//!
//! 1. [`infer`] derives a [`Schema`] from a sample, or
//!    [`Schema::from_json_schema`] reads an explicit one.
//! 2. [`validate`] checks a document against a schema, collecting every
//!    mismatch through stillwater's `Validation`.
//! 3. [`ModelBuilder`] turns the schema into a [`TypeDescriptor`]; a
//!    [`DescriptorCache`] memoizes that step.
//! 4. [`Materializer`] produces an [`Instance`], null-filling absent fields.
//! 5. [`HandlerChain`] picks which of the above paths a template takes.
//!
//! ## Core Types
//!
//! - [`JsonPath`]: a location such as `measurements[0].inputs[2].name`
//! - [`Mismatch`] / [`Mismatches`]: accumulated structural diagnostics
//! - [`ConversionError`]: every way a conversion can fail
//! - [`Schema`], [`TypeDescriptor`], [`Instance`]: the three stages of a document
//!
//! ## Example
//!
//! ```rust
//! use hflav_fair::{infer, DocumentSource, Materializer, ModelBuilder};
//! use serde_json::json;
//!
//! let schema = infer(&json!({"title": "x", "measurements": []})).unwrap();
//! let descriptor = ModelBuilder::new().build(&schema, "Model").unwrap();
//!
//! let instance = Materializer::new()
//!     .materialize(&descriptor, DocumentSource::from(r#"{"title": "HFLAV Tau"}"#))
//!     .unwrap();
//!
//! assert_eq!(instance.text("title"), Some("HFLAV Tau"));
//! assert!(instance.get("measurements").unwrap().is_null());
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod handler;
pub mod infer;
pub mod instance;
mod json;
pub mod logging;
pub mod materialize;
pub mod model;
pub mod models;
pub mod path;
pub mod present;
pub mod schema;
pub mod source;
pub mod validate;

pub use cache::DescriptorCache;
pub use config::Settings;
pub use error::{ConversionError, Mismatch, Mismatches};
pub use handler::{
    ConversionHandler, ExplicitSchemaHandler, HandlerChain, ModelPipeline,
    RepositorySchemaHandler, TemplateInferenceHandler,
};
pub use infer::{infer, infer_all, infer_str, SchemaInferrer};
pub use instance::{FieldValue, Instance, SearchOperator};
pub use materialize::{DocumentSource, Materializer};
pub use model::{FieldSpec, FieldType, ModelBuilder, Optionality, TypeDescriptor};
pub use models::{select_template, FileRef, Record, Template};
pub use path::{JsonPath, PathSegment};
pub use present::{PrettyJsonVisualizer, Visualizer};
pub use schema::{Kind, KindSet, Schema, SchemaDialect, ToJsonSchema};
pub use source::{download, save_file, LocalSource, SchemaRepository, Source};
pub use validate::{check, validate, Strictness};

/// Type alias for validation results using Mismatches
pub type ValidationResult<T> = stillwater::Validation<T, Mismatches>;
