//! Tests for sharing descriptors, caches and instances across threads.

use hflav_fair::{
    infer, DescriptorCache, HandlerChain, Instance, Materializer, ModelBuilder, Schema,
    TypeDescriptor,
};
use serde_json::json;
use std::sync::Arc;
use std::thread;

#[test]
fn test_core_types_are_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Schema>();
    assert_send_sync::<TypeDescriptor>();
    assert_send_sync::<Instance>();
    assert_send_sync::<DescriptorCache>();
    assert_send_sync::<HandlerChain>();
}

#[test]
fn test_concurrent_materialization() {
    let descriptor = ModelBuilder::new()
        .build(&infer(&json!({"name": "x", "value": 1.0})).unwrap(), "Model")
        .unwrap();

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let descriptor = Arc::clone(&descriptor);
            thread::spawn(move || {
                let instance = Materializer::new()
                    .materialize_value(&descriptor, &json!({"name": format!("m{}", i), "value": i}))
                    .unwrap();
                assert_eq!(instance.text("name"), Some(format!("m{}", i).as_str()));
                assert_eq!(instance.float("value"), Some(i as f64));
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_concurrent_cache_builds_once_per_schema() {
    let cache = DescriptorCache::new();
    let schema = Arc::new(infer(&json!({"title": "x", "measurements": [{"value": 1.5}]})).unwrap());

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let cache = cache.clone();
            let schema = Arc::clone(&schema);
            thread::spawn(move || {
                cache
                    .get_or_build(&ModelBuilder::new(), &schema, "Model")
                    .unwrap()
            })
        })
        .collect();

    let descriptors: Vec<Arc<TypeDescriptor>> =
        handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(cache.len(), 1);
    for descriptor in &descriptors {
        assert!(Arc::ptr_eq(descriptor, &descriptors[0]));
    }
}

#[test]
fn test_concurrent_cache_with_distinct_schemas() {
    let cache = DescriptorCache::new();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let cache = cache.clone();
            thread::spawn(move || {
                let mut sample = serde_json::Map::new();
                sample.insert(format!("field{}", i), json!(i));
                let schema = infer(&serde_json::Value::Object(sample)).unwrap();
                let descriptor = cache
                    .get_or_build(&ModelBuilder::new(), &schema, "Model")
                    .unwrap();
                assert!(descriptor.field(&format!("field{}", i)).is_some());
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(cache.len(), 8);
}

#[test]
fn test_instances_shared_between_threads() {
    let descriptor = ModelBuilder::new()
        .build(&infer(&json!({"title": "x"})).unwrap(), "Model")
        .unwrap();
    let instance = Arc::new(
        Materializer::new()
            .materialize_value(&descriptor, &json!({"title": "HFLAV Tau"}))
            .unwrap(),
    );

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let instance = Arc::clone(&instance);
            thread::spawn(move || instance.to_value())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), json!({"title": "HFLAV Tau"}));
    }
}
