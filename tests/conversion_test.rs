//! End-to-end tests for infer -> validate -> build -> materialize.

use hflav_fair::{
    check, infer, validate, ConversionError, DocumentSource, FieldType, FieldValue, Materializer,
    ModelBuilder, Optionality, Schema, Strictness,
};
use serde_json::{json, Value};
use std::io::Write;

/// Helper to extract the success value from a Validation
fn unwrap_success<T, E: std::fmt::Debug>(v: stillwater::Validation<T, E>) -> T {
    v.into_result().unwrap()
}

/// Helper to extract the error value from a Validation
fn unwrap_failure<T, E>(v: stillwater::Validation<T, E>) -> E
where
    T: std::fmt::Debug,
{
    v.into_result().unwrap_err()
}

fn tau_template() -> Value {
    json!({
        "title": "x",
        "year": 2023,
        "measurements": [
            {
                "name": "tau mass",
                "value": 1776.86,
                "inputs": [{"experiment": "BaBar", "value": 1776.68}]
            }
        ]
    })
}

#[test]
fn test_inferred_template_scenario() {
    let schema = infer(&json!({"title": "x", "measurements": []})).unwrap();
    assert!(schema.property("title").unwrap().kinds().contains(hflav_fair::Kind::String));
    assert!(schema.property("measurements").unwrap().items().is_none());

    let descriptor = ModelBuilder::new().build(&schema, "Model").unwrap();
    let instance = Materializer::new()
        .materialize(&descriptor, DocumentSource::from(json!({"title": "HFLAV Tau"})))
        .unwrap();

    assert_eq!(instance.text("title"), Some("HFLAV Tau"));
    assert!(instance.get("measurements").unwrap().is_null());
}

#[test]
fn test_explicit_schema_rejects_integer_doi() {
    let schema = Schema::from_json_schema(&json!({
        "type": "object",
        "properties": {"doi": {"type": "string"}},
        "required": ["doi"]
    }))
    .unwrap();

    let errors = unwrap_failure(validate(&schema, &json!({"doi": 123}), Strictness::Strict));
    assert_eq!(errors.len(), 1);
    let mismatch = errors.first();
    assert_eq!(mismatch.path.to_string(), "doi");
    assert_eq!(mismatch.expected.as_deref(), Some("string"));
    assert_eq!(mismatch.got.as_deref(), Some("integer"));

    unwrap_success(validate(&schema, &json!({"doi": "10.5281/zenodo.1"}), Strictness::Strict));
}

#[test]
fn test_check_wraps_mismatches_as_structure_error() {
    let schema = Schema::from_json_schema(&json!({
        "type": "object",
        "properties": {"doi": {"type": "string"}},
        "required": ["doi"]
    }))
    .unwrap();

    let err = check(&schema, &json!({}), Strictness::Strict).unwrap_err();
    assert!(matches!(err, ConversionError::Structure(_)));
    assert_eq!(err.mismatches().unwrap().with_code("required").len(), 1);

    assert!(check(&schema, &json!({}), Strictness::Lenient).is_ok());
}

#[test]
fn test_build_is_idempotent() {
    let builder = ModelBuilder::new();
    let first = builder.build(&infer(&tau_template()).unwrap(), "Model").unwrap();
    let second = builder.build(&infer(&tau_template()).unwrap(), "Model").unwrap();

    assert_eq!(first.signature(), second.signature());
    assert_eq!(first.name(), second.name());
}

#[test]
fn test_lenient_optionality_null_fills() {
    let descriptor = ModelBuilder::new()
        .build(&infer(&tau_template()).unwrap(), "Model")
        .unwrap();

    for missing in ["title", "year", "measurements"] {
        let mut document = tau_template();
        document.as_object_mut().unwrap().remove(missing);

        let instance = Materializer::new()
            .materialize_value(&descriptor, &document)
            .unwrap();
        assert_eq!(instance.get(missing), Some(&FieldValue::Null), "field {}", missing);
    }
}

#[test]
fn test_strict_required_reports_missing() {
    let descriptor = ModelBuilder::new()
        .optionality(Optionality::StrictRequired)
        .build(&infer(&tau_template()).unwrap(), "Model")
        .unwrap();

    let err = Materializer::new()
        .materialize_value(&descriptor, &json!({"title": "t", "measurements": []}))
        .unwrap_err();
    assert!(matches!(err, ConversionError::Validation(_)));
    assert_eq!(err.mismatches().unwrap().paths(), vec!["year"]);
}

#[test]
fn test_sequence_field_rejects_text() {
    let descriptor = ModelBuilder::new()
        .build(&infer(&json!({"value": [1.5, 2.5]})).unwrap(), "Model")
        .unwrap();
    assert_eq!(
        descriptor.field("value").unwrap().ty.to_string(),
        FieldType::Sequence(Some(Box::new(FieldType::Float))).to_string()
    );

    let err = Materializer::new()
        .materialize_value(&descriptor, &json!({"value": "not a list"}))
        .unwrap_err();
    let mismatches = err.mismatches().unwrap();
    assert_eq!(mismatches.paths(), vec!["value"]);
    assert_eq!(mismatches.first().code, "invalid_type");
    assert_eq!(mismatches.first().got.as_deref(), Some("string"));
}

#[test]
fn test_existing_path_wins_over_json_text() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", json!({"a": 1})).unwrap();
    let path = file.path().to_str().unwrap().to_string();

    let source = DocumentSource::from(path.as_str());
    assert!(matches!(source, DocumentSource::Path(_)));
    assert_eq!(source.into_value().unwrap(), json!({"a": 1}));

    let descriptor = ModelBuilder::new()
        .build(&infer(&json!({"a": 0})).unwrap(), "Model")
        .unwrap();
    let instance = Materializer::new()
        .materialize(&descriptor, DocumentSource::from(path.as_str()))
        .unwrap();
    assert_eq!(instance.integer("a"), Some(1));
}

#[test]
fn test_non_path_text_is_parsed() {
    let source = DocumentSource::from(r#"{"a": 2}"#);
    assert!(matches!(source, DocumentSource::Text(_)));
    assert_eq!(source.into_value().unwrap(), json!({"a": 2}));

    let err = DocumentSource::from("{not json").into_value().unwrap_err();
    assert!(matches!(err, ConversionError::MalformedInput { .. }));
}

#[test]
fn test_round_trip_adds_explicit_nulls() {
    let descriptor = ModelBuilder::new()
        .build(&infer(&tau_template()).unwrap(), "Model")
        .unwrap();
    let document = json!({
        "title": "HFLAV Tau",
        "measurements": [{"name": "tau mass", "value": 1776.93}]
    });

    let first = Materializer::new()
        .materialize_value(&descriptor, &document)
        .unwrap();
    let serialized = serde_json::to_value(&first).unwrap();
    let second = Materializer::new()
        .materialize_value(&descriptor, &serialized)
        .unwrap();

    let expected = json!({
        "title": "HFLAV Tau",
        "year": null,
        "measurements": [{"name": "tau mass", "value": 1776.93, "inputs": null}]
    });
    assert_eq!(serialized, expected);
    assert_eq!(second.to_value(), expected);
}

#[test]
fn test_integer_in_float_field_serializes_as_float() {
    let descriptor = ModelBuilder::new()
        .build(&infer(&json!({"average": 1.5})).unwrap(), "Model")
        .unwrap();
    let instance = Materializer::new()
        .materialize_value(&descriptor, &json!({"average": 2}))
        .unwrap();

    // Float fields widen integral input, so the number comes back as 2.0.
    assert_eq!(instance.get("average"), Some(&FieldValue::Float(2.0)));
    let serialized = serde_json::to_value(&instance).unwrap();
    assert_eq!(serialized["average"], json!(2.0));
    assert_ne!(serialized["average"], json!(2));
}

#[test]
fn test_integer_above_i64_max_round_trips() {
    let document = json!({"event_count": u64::MAX});
    let descriptor = ModelBuilder::new()
        .build(&infer(&document).unwrap(), "Model")
        .unwrap();
    let instance = Materializer::new()
        .materialize_value(&descriptor, &document)
        .unwrap();

    assert_eq!(instance.get("event_count"), Some(&FieldValue::Unsigned(u64::MAX)));
    assert_eq!(instance.integer("event_count"), None);
    assert_eq!(serde_json::to_value(&instance).unwrap(), document);
}

#[test]
fn test_deeply_nested_document_converts() {
    let depth = 200;
    let text = format!("{}1{}", r#"{"a":"#.repeat(depth), "}".repeat(depth));

    let schema = hflav_fair::infer_str(&text).unwrap();
    let descriptor = ModelBuilder::new().build(&schema, "Model").unwrap();
    let instance = Materializer::new()
        .materialize(&descriptor, DocumentSource::from(text.as_str()))
        .unwrap();

    let path = vec!["a"; depth].join(".");
    assert_eq!(instance.lookup(&path).and_then(FieldValue::as_i64), Some(1));
}

#[test]
fn test_greek_property_names_materialize() {
    let document = json!({"α": 1, "β": 2});
    let descriptor = ModelBuilder::new()
        .build(&infer(&document).unwrap(), "Model")
        .unwrap();
    let instance = Materializer::new()
        .materialize_value(&descriptor, &document)
        .unwrap();

    assert_eq!(instance.integer("α"), Some(1));
    assert_eq!(instance.integer("β"), Some(2));
    assert_eq!(instance.to_value(), document);
}

#[test]
fn test_undeclared_keys_are_dropped() {
    let descriptor = ModelBuilder::new()
        .build(&infer(&json!({"title": "x"})).unwrap(), "Model")
        .unwrap();
    let instance = Materializer::new()
        .materialize_value(&descriptor, &json!({"title": "t", "extra": [1, 2]}))
        .unwrap();

    assert!(instance.get("extra").is_none());
    assert_eq!(instance.to_value(), json!({"title": "t"}));
}

#[test]
fn test_nested_lookup_after_materialize() {
    let descriptor = ModelBuilder::new()
        .build(&infer(&tau_template()).unwrap(), "Model")
        .unwrap();
    let instance = Materializer::new()
        .materialize_value(&descriptor, &tau_template())
        .unwrap();

    assert_eq!(
        instance.lookup("measurements[0].inputs[0].experiment").and_then(FieldValue::as_text),
        Some("BaBar")
    );
    assert_eq!(
        instance.lookup("measurements[0].value").and_then(FieldValue::as_f64),
        Some(1776.86)
    );
    assert!(instance.lookup("measurements[3]").is_none());
}

#[test]
fn test_materialize_many_keeps_order() {
    let descriptor = ModelBuilder::new()
        .build(&infer(&json!({"year": 2023})).unwrap(), "Model")
        .unwrap();
    let sources: Vec<DocumentSource> = (0..32)
        .map(|i| DocumentSource::from(json!({"year": 2000 + i})))
        .chain(std::iter::once(DocumentSource::from(json!({"year": "soon"}))))
        .collect();

    let results = Materializer::new().materialize_many(&descriptor, sources);
    assert_eq!(results.len(), 33);
    for (i, result) in results.iter().take(32).enumerate() {
        assert_eq!(result.as_ref().unwrap().integer("year"), Some(2000 + i as i64));
    }
    assert!(results[32].is_err());
}
