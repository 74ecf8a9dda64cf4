mod common;

use std::sync::{Arc, Mutex};

use common::*;
use datalith_core::error::DataError;
use datalith_core::{Action, Batch, EventualState, Operation, Request, RequestParams, Settled};

fn operation_with_one_request(proxy: &ControlledProxy, action: Action) -> Operation {
    let request = Arc::new(Request::new(action, "albums".into(), RequestParams::default()));
    Operation::new(action, vec![request], Arc::new(proxy.clone()), None)
}

#[test]
fn batch_resolves_only_when_every_operation_resolves() {
    let proxy = ControlledProxy::new();
    let batch = Batch::new(vec![
        operation_with_one_request(&proxy, Action::Create),
        operation_with_one_request(&proxy, Action::Update),
        operation_with_one_request(&proxy, Action::Destroy),
    ]);
    batch.run();

    proxy.request(0).resolve(page("c", 1, 1));
    proxy.request(2).resolve(page("d", 1, 1));
    assert_eq!(batch.state(), EventualState::Pending);

    proxy.request(1).resolve(page("u", 1, 1));
    assert_eq!(batch.state(), EventualState::Resolved);

    // Per-operation results arrive in input order
    match batch.eventual().outcome() {
        Some(Settled::Resolved(sets)) => {
            let ids: Vec<_> = sets.iter().map(|set| set.records()[0].id_string().unwrap()).collect();
            assert_eq!(ids, vec!["c1", "u1", "d1"]);
        }
        other => panic!("expected resolution, got {other:?}"),
    }
}

#[test]
fn batch_rejects_as_soon_as_any_operation_rejects() {
    let proxy = ControlledProxy::new();
    let batch = Batch::new(vec![
        operation_with_one_request(&proxy, Action::Create),
        operation_with_one_request(&proxy, Action::Update),
    ]);
    batch.run();

    proxy.request(1).reject(DataError::Backend("rejected".to_string()));
    assert_eq!(batch.state(), EventualState::Rejected);

    // The other operation's eventual outcome no longer matters
    proxy.request(0).resolve(page("c", 1, 1));
    assert_eq!(batch.state(), EventualState::Rejected);
    assert_eq!(batch.operations()[0].state(), EventualState::Resolved);
}

#[test]
fn batch_abort_cascades_to_pending_operations() {
    let proxy = ControlledProxy::new();
    let batch = Batch::new(vec![
        operation_with_one_request(&proxy, Action::Create),
        operation_with_one_request(&proxy, Action::Update),
    ]);
    batch.run();

    proxy.request(0).resolve(page("c", 1, 1));
    batch.abort();

    assert_eq!(batch.state(), EventualState::Aborted);
    assert_eq!(batch.operations()[0].state(), EventualState::Resolved);
    assert_eq!(batch.operations()[1].state(), EventualState::Aborted);
    assert_eq!(proxy.request(1).state(), EventualState::Aborted);
}

#[test]
fn batch_passes_child_progress_through() {
    let proxy = ControlledProxy::new();
    let batch = Batch::new(vec![
        operation_with_one_request(&proxy, Action::Create),
        operation_with_one_request(&proxy, Action::Update),
    ]);
    batch.run();

    let completions = Arc::new(Mutex::new(Vec::new()));
    let seen = completions.clone();
    batch.eventual().on_progress(move |p| seen.lock().unwrap().push(p.completed));

    proxy.request(0).resolve(page("c", 1, 1));
    proxy.request(1).resolve(page("u", 1, 1));

    // Each request completion bubbles up through its operation to the batch
    assert!(!completions.lock().unwrap().is_empty());
}
