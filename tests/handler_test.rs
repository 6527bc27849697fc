//! Integration tests for handler selection and dispatch.

use std::collections::HashMap;
use std::sync::Arc;

use hflav_fair::{
    ConversionError, DocumentSource, HandlerChain, LocalSource, ModelPipeline, SchemaRepository,
    Settings, Source, Template,
};
use serde_json::{json, Value};

struct MemorySource {
    files: HashMap<(u64, String), Value>,
}

impl MemorySource {
    fn new() -> Self {
        Self {
            files: HashMap::new(),
        }
    }

    fn with(mut self, record_id: u64, name: &str, content: Value) -> Self {
        self.files.insert((record_id, name.to_string()), content);
        self
    }
}

impl Source for MemorySource {
    fn fetch_file_bytes(&self, record_id: u64, filename: &str) -> Result<Vec<u8>, ConversionError> {
        self.files
            .get(&(record_id, filename.to_string()))
            .map(|value| value.to_string().into_bytes())
            .ok_or_else(|| ConversionError::DataNotFound {
                resource: format!("{}/{}", record_id, filename),
            })
    }

    fn fetch_record_json(&self, record_id: u64) -> Result<Value, ConversionError> {
        self.files
            .get(&(record_id, "record.json".to_string()))
            .cloned()
            .ok_or_else(|| ConversionError::DataNotFound {
                resource: format!("record {}", record_id),
            })
    }
}

struct TaggedSchemas(HashMap<String, Value>);

impl SchemaRepository for TaggedSchemas {
    fn fetch_schema_at_tag(&self, tag: &str) -> Result<Value, ConversionError> {
        self.0
            .get(tag)
            .cloned()
            .ok_or_else(|| ConversionError::DataNotFound {
                resource: format!("schema@{}", tag),
            })
    }
}

fn template_record(files: &[&str], version: Option<&str>) -> Value {
    json!({
        "id": 7,
        "created": "2023-05-01T10:00:00.000000",
        "updated": "2023-05-02T10:00:00+00:00",
        "metadata": {"title": "HFLAV tau template", "version": version},
        "files": files
            .iter()
            .map(|name| {
                let link = format!("https://zenodo.org/api/records/7/files/{}", name);
                json!({"key": name, "links": {"self": link}})
            })
            .collect::<Vec<_>>()
    })
}

fn doi_schema() -> Value {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "properties": {"doi": {"type": "string"}, "title": {"type": "string"}},
        "required": ["doi"]
    })
}

#[test]
fn test_explicit_schema_wins_over_sample() {
    let source = MemorySource::new()
        .with(7, "record.json", template_record(&["tau.json", "tau.schema"], None))
        .with(7, "tau.json", json!({"title": "x", "measurements": []}))
        .with(7, "tau.schema", doi_schema());
    let source: Arc<dyn Source> = Arc::new(source);
    let template = source.fetch_template(7).unwrap();
    assert!(template.json_template.is_some());
    assert!(template.json_schema.is_some());

    let chain = HandlerChain::standard(Arc::clone(&source));
    assert_eq!(chain.select(&template).unwrap().name(), "explicit-schema");

    let instance = chain
        .dispatch(&template, DocumentSource::from(json!({"doi": "10.5281/zenodo.7"})))
        .unwrap();
    assert_eq!(instance.text("doi"), Some("10.5281/zenodo.7"));
    assert!(instance.get("measurements").is_none());
}

#[test]
fn test_explicit_schema_reports_type_mismatch() {
    let source = MemorySource::new().with(7, "tau.schema", doi_schema());
    let template = Template::from_json(template_record(&["tau.schema"], None)).unwrap();
    let chain = HandlerChain::standard(Arc::new(source));

    let err = chain
        .dispatch(&template, DocumentSource::from(json!({"doi": 123})))
        .unwrap_err();
    assert!(matches!(err, ConversionError::Structure(_)));
    let mismatch = err.mismatches().unwrap().first();
    assert_eq!(mismatch.path.to_string(), "doi");
    assert_eq!(mismatch.expected.as_deref(), Some("string"));
    assert_eq!(mismatch.got.as_deref(), Some("integer"));
}

#[test]
fn test_sample_only_template_uses_inference() {
    let source = MemorySource::new().with(7, "tau.json", json!({"title": "x", "measurements": []}));
    let template = Template::from_json(template_record(&["tau.json"], None)).unwrap();
    let chain = HandlerChain::standard(Arc::new(source));

    assert_eq!(chain.select(&template).unwrap().name(), "template-inference");
    let instance = chain
        .dispatch(&template, DocumentSource::from(r#"{"title": "HFLAV Tau"}"#))
        .unwrap();
    assert_eq!(instance.text("title"), Some("HFLAV Tau"));
    assert!(instance.get("measurements").unwrap().is_null());
}

#[test]
fn test_template_without_files_has_no_handler() {
    let template = Template::from_json(template_record(&["README.md"], None)).unwrap();
    let chain = HandlerChain::standard(Arc::new(MemorySource::new()));

    assert!(chain.select(&template).is_none());
    let err = chain
        .dispatch(&template, DocumentSource::from(json!({})))
        .unwrap_err();
    assert!(matches!(
        err,
        ConversionError::NoHandlerCapable { ref template } if template == "HFLAV tau template"
    ));
}

#[test]
fn test_repository_sits_between_explicit_and_inference() {
    let repository = TaggedSchemas(HashMap::from([("v1.2".to_string(), doi_schema())]));
    let source = MemorySource::new().with(7, "tau.json", json!({"title": "x"}));
    let chain = HandlerChain::with_repository(Arc::new(source), Arc::new(repository));
    assert_eq!(
        chain.handler_names(),
        vec!["explicit-schema", "repository-schema", "template-inference"]
    );

    let tagged = Template::from_json(template_record(&["tau.json"], Some("v1.2"))).unwrap();
    assert_eq!(chain.select(&tagged).unwrap().name(), "repository-schema");
    let instance = chain
        .dispatch(&tagged, DocumentSource::from(json!({"doi": "d", "title": "t"})))
        .unwrap();
    assert_eq!(instance.text("doi"), Some("d"));

    let untagged = Template::from_json(template_record(&["tau.json"], None)).unwrap();
    assert_eq!(chain.select(&untagged).unwrap().name(), "template-inference");
}

#[test]
fn test_chosen_handler_failure_does_not_fall_through() {
    let source = MemorySource::new().with(7, "tau.json", json!({"title": "x"}));
    let template = Template::from_json(template_record(&["tau.json", "tau.schema"], None)).unwrap();
    let chain = HandlerChain::standard(Arc::new(source));

    let err = chain
        .dispatch(&template, DocumentSource::from(json!({"title": "t"})))
        .unwrap_err();
    assert!(matches!(err, ConversionError::DataNotFound { .. }));
}

#[test]
fn test_chain_from_settings_applies_model_name() {
    let settings = Settings {
        model_name: "TauAverages".to_string(),
        ..Settings::default()
    };
    let source = MemorySource::new().with(7, "tau.json", json!({"title": "x"}));
    let template = Template::from_json(template_record(&["tau.json"], None)).unwrap();
    let chain = HandlerChain::from_settings(&settings, Arc::new(source), None);

    let instance = chain
        .dispatch(&template, DocumentSource::from(json!({"title": "t"})))
        .unwrap();
    assert_eq!(instance.type_name(), "TauAverages");
}

#[test]
fn test_shared_cache_across_dispatches() {
    let cache = hflav_fair::DescriptorCache::new();
    let source: Arc<dyn Source> =
        Arc::new(MemorySource::new().with(7, "tau.json", json!({"title": "x"})));
    let chain = HandlerChain::assemble(source, None, ModelPipeline::new().cache(cache.clone()));
    let template = Template::from_json(template_record(&["tau.json"], None)).unwrap();

    for title in ["a", "b", "c"] {
        chain
            .dispatch(&template, DocumentSource::from(json!({"title": title})))
            .unwrap();
    }
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_local_source_end_to_end() {
    let root = tempfile::tempdir().unwrap();
    let record_dir = root.path().join("7");
    std::fs::create_dir_all(&record_dir).unwrap();
    std::fs::write(
        record_dir.join("record.json"),
        template_record(&["tau.json"], None).to_string(),
    )
    .unwrap();
    std::fs::write(
        record_dir.join("tau.json"),
        json!({"title": "x", "measurements": [{"name": "m", "value": 1.0}]}).to_string(),
    )
    .unwrap();
    let data = root.path().join("data.json");
    std::fs::write(
        &data,
        json!({"title": "HFLAV Tau", "measurements": [{"name": "tau mass", "value": 1776}]})
            .to_string(),
    )
    .unwrap();

    let source: Arc<dyn Source> = Arc::new(LocalSource::new(root.path()));
    let template = source.fetch_template(7).unwrap();
    let chain = HandlerChain::standard(source);
    let instance = chain
        .dispatch(&template, DocumentSource::from(data.as_path()))
        .unwrap();

    assert_eq!(instance.text("title"), Some("HFLAV Tau"));
    assert_eq!(
        instance.lookup("measurements[0].value").and_then(|v| v.as_f64()),
        Some(1776.0)
    );
}
