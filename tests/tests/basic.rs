mod common;

use anyhow::Result;
use common::*;
use datalith_core::{EventualState, ProxyConfig, ProxyRegistry, Settled, Store, StoreConfig, Window};
use datalith_storage_memory::{MemoryEngine, MemoryProxy};
use serde_json::json;
use std::sync::Arc;

fn memory_store(engine: &MemoryEngine, page_size: Option<u32>) -> Store {
    Store::with_proxy("albums".into(), Arc::new(MemoryProxy::new(engine.clone())), page_size)
}

#[tokio::test]
async fn save_then_load_round_trips_through_the_backend() -> Result<()> {
    let engine = MemoryEngine::new();
    let store = memory_store(&engine, None);

    let batch = store.perform_save(records(&[json!({"name": "Blue Train"}), json!({"name": "Giant Steps"})]));
    assert_eq!(batch.eventual().wait().await.state(), EventualState::Resolved);

    // Creates were applied to the live collection with assigned ids
    assert_eq!(store.collection().len(), 2);
    let id = store.collection().records()[0].id_string().expect("assigned id");

    // A fresh store over the same engine sees the persisted records
    let other = memory_store(&engine, None);
    let load = other.perform_load(None);
    match load.eventual().wait().await {
        Settled::Resolved(results) => assert_eq!(results.len(), 2),
        other => panic!("expected resolution, got {other:?}"),
    }
    assert!(other.collection().by_id(&id).is_some());
    Ok(())
}

#[tokio::test]
async fn paged_load_fans_out_and_reassembles_in_order() -> Result<()> {
    let engine = MemoryEngine::new();
    let seed = engine.collection(&"albums".into());
    for i in 0..6 {
        seed.set(format!("id{i}"), json!({"id": format!("id{i}"), "n": i}));
    }

    let store = memory_store(&engine, Some(2));
    let operation = store.perform_load(Some(Window::Range { start: 0, limit: 6 }));
    assert_eq!(operation.requests().len(), 3);

    match operation.eventual().wait().await {
        Settled::Resolved(results) => {
            assert_eq!(results.total(), 6);
            let ns: Vec<_> = results.records().iter().map(|r| r.get("n").cloned().unwrap()).collect();
            assert_eq!(ns, vec![json!(0), json!(1), json!(2), json!(3), json!(4), json!(5)]);
        }
        other => panic!("expected resolution, got {other:?}"),
    }
    assert_eq!(store.collection().len(), 6);
    Ok(())
}

#[tokio::test]
async fn update_and_destroy_maintain_the_collection() -> Result<()> {
    let engine = MemoryEngine::new();
    let seed = engine.collection(&"albums".into());
    seed.set("a", json!({"id": "a", "plays": 1}));
    seed.set("b", json!({"id": "b", "plays": 2}));

    let store = memory_store(&engine, None);
    store.perform_load(None).eventual().wait().await;

    let save = store.perform_save(records(&[json!({"id": "a", "plays": 3})]));
    assert_eq!(save.eventual().wait().await.state(), EventualState::Resolved);
    assert_eq!(store.collection().by_id("a").unwrap().get("plays"), Some(&json!(3)));
    assert_eq!(seed.get("a").unwrap(), json!({"id": "a", "plays": 3}));

    let destroy = store.perform_destroy(records(&[json!({"id": "b"})]));
    assert_eq!(destroy.eventual().wait().await.state(), EventualState::Resolved);
    assert_eq!(store.collection().len(), 1);
    assert!(!seed.contains("b"));
    Ok(())
}

#[tokio::test]
async fn load_one_fetches_a_single_entity() -> Result<()> {
    let engine = MemoryEngine::new();
    engine.collection(&"albums".into()).set("a", json!({"id": "a", "name": "Out to Lunch"}));

    let store = memory_store(&engine, None);
    match store.perform_load_one("a").eventual().wait().await {
        Settled::Resolved(results) => assert_eq!(results.records()[0].get("name"), Some(&json!("Out to Lunch"))),
        other => panic!("expected resolution, got {other:?}"),
    }

    // A missing id rejects rather than resolving empty
    match store.perform_load_one("ghost").eventual().wait().await {
        Settled::Rejected(error) => assert_eq!(error.to_string(), "entity not found: ghost"),
        other => panic!("expected rejection, got {other:?}"),
    }
    Ok(())
}

#[test]
fn stores_build_from_config_through_the_registry() {
    let engine = MemoryEngine::new();
    let mut registry = ProxyRegistry::new();
    MemoryProxy::register(&mut registry, engine.clone());

    let config = StoreConfig { collection: "albums".into(), proxy: ProxyConfig::new("memory"), page_size: Some(25) };
    let store = Store::from_config(config, &registry).expect("known proxy kind");

    let batch = store.perform_save(records(&[json!({"name": "Speak No Evil"})]));
    assert_eq!(batch.state(), EventualState::Resolved);
    assert_eq!(engine.collection(&"albums".into()).len(), 1);
}

#[test]
fn collection_changes_notify_subscribers_once_per_operation() {
    let engine = MemoryEngine::new();
    let store = memory_store(&engine, None);

    let notifications = Arc::new(std::sync::Mutex::new(0));
    let n = notifications.clone();
    let _guard = store.collection().subscribe(move || *n.lock().unwrap() += 1);

    store.perform_save(records(&[json!({"name": "one"}), json!({"name": "two"})]));
    assert_eq!(*notifications.lock().unwrap(), 1);
}
