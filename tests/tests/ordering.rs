mod common;

use std::sync::{Arc, Mutex};

use common::*;
use datalith_core::error::DataError;
use datalith_core::{EventualState, Settled, Store, Window};

#[test]
fn pages_assemble_in_request_order_not_completion_order() {
    let proxy = ControlledProxy::new();
    let store = Store::with_proxy("albums".into(), Arc::new(proxy.clone()), Some(2));

    let operation = store.perform_load(Some(Window::Range { start: 0, limit: 6 }));
    let requests = proxy.requests();
    assert_eq!(requests.len(), 3);

    // Complete out of order: page 3, page 1, page 2
    requests[2].resolve(page("p3r", 2, 6));
    assert_eq!(operation.state(), EventualState::Pending);
    requests[0].resolve(page("p1r", 2, 6));
    assert_eq!(operation.state(), EventualState::Pending);
    requests[1].resolve(page("p2r", 2, 6));
    assert_eq!(operation.state(), EventualState::Resolved);

    let ids: Vec<_> = store.collection().records().iter().map(|r| r.id_string().unwrap()).collect();
    assert_eq!(ids, vec!["p1r1", "p1r2", "p2r1", "p2r2", "p3r1", "p3r2"]);

    match operation.eventual().outcome() {
        Some(Settled::Resolved(results)) => {
            assert_eq!(results.len(), 6);
            assert_eq!(results.total(), 6);
        }
        other => panic!("expected resolution, got {other:?}"),
    }
}

#[test]
fn each_completed_page_reports_progress() {
    let proxy = ControlledProxy::new();
    let store = Store::with_proxy("albums".into(), Arc::new(proxy.clone()), Some(2));

    let operation = store.perform_load(Some(Window::Range { start: 0, limit: 4 }));
    let completions = Arc::new(Mutex::new(Vec::new()));
    let seen = completions.clone();
    operation.eventual().on_progress(move |p| seen.lock().unwrap().push(p.completed));

    proxy.request(1).resolve(page("p2r", 2, 4));
    proxy.request(0).resolve(page("p1r", 2, 4));

    assert_eq!(*completions.lock().unwrap(), vec![1, 2]);
}

#[test]
fn first_rejection_settles_the_operation_immediately() {
    let proxy = ControlledProxy::new();
    let store = Store::with_proxy("albums".into(), Arc::new(proxy.clone()), Some(2));

    let operation = store.perform_load(Some(Window::Range { start: 0, limit: 4 }));
    proxy.request(1).reject(DataError::Backend("disk on fire".to_string()));

    assert_eq!(operation.state(), EventualState::Rejected);

    // The sibling settles independently; its records never reach the target
    proxy.request(0).resolve(page("p1r", 2, 4));
    assert_eq!(operation.state(), EventualState::Rejected);
    assert_eq!(store.collection().len(), 0);
}

#[test]
fn late_listener_on_a_finished_operation_fires_immediately() {
    let proxy = ControlledProxy::new();
    let store = Store::with_proxy("albums".into(), Arc::new(proxy.clone()), None);

    let operation = store.perform_load(None);
    proxy.request(0).resolve(page("r", 2, 2));

    let seen = Arc::new(Mutex::new(None));
    let seen2 = seen.clone();
    operation.eventual().on_success(move |results| *seen2.lock().unwrap() = Some(results.len()));
    assert_eq!(*seen.lock().unwrap(), Some(2));
}
