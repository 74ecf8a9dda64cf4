mod common;

use std::sync::Arc;

use common::*;
use datalith_core::{EventualState, Settled, Store, Window};

#[test]
fn abort_discards_results_that_arrive_later() {
    let proxy = ControlledProxy::new();
    let store = Store::with_proxy("albums".into(), Arc::new(proxy.clone()), Some(2));

    let operation = store.perform_load(Some(Window::Range { start: 0, limit: 4 }));
    assert_eq!(store.collection().len(), 0);

    operation.abort();
    assert_eq!(operation.state(), EventualState::Aborted);

    // The backend answers anyway; the data must not be applied
    proxy.request(0).resolve(page("p1r", 2, 4));
    proxy.request(1).resolve(page("p2r", 2, 4));

    assert_eq!(store.collection().len(), 0);
    assert_eq!(operation.state(), EventualState::Aborted);
}

#[test]
fn abort_cascades_to_pending_requests_and_the_proxy_hook() {
    let proxy = ControlledProxy::new();
    let store = Store::with_proxy("albums".into(), Arc::new(proxy.clone()), Some(2));

    let operation = store.perform_load(Some(Window::Range { start: 0, limit: 4 }));

    // One request finishes before the abort; only the other is still pending
    proxy.request(0).resolve(page("p1r", 2, 4));
    operation.abort();

    assert_eq!(proxy.request(0).state(), EventualState::Resolved);
    assert_eq!(proxy.request(1).state(), EventualState::Aborted);
    assert_eq!(proxy.abort_calls(), vec![proxy.request(1).id()]);
}

#[test]
fn aborted_requests_still_record_what_the_backend_reported() {
    let proxy = ControlledProxy::new();
    let store = Store::with_proxy("albums".into(), Arc::new(proxy.clone()), None);

    let operation = store.perform_load(None);
    operation.abort();

    let request = proxy.request(0);
    request.resolve(page("r", 1, 1));

    // Inspectable for diagnostics, but the future stayed aborted
    assert!(matches!(request.reported(), Some(Settled::Resolved(_))));
    assert_eq!(request.result(), Some(Settled::Aborted));
}

#[test]
fn abort_is_idempotent_and_loses_to_resolution() {
    let proxy = ControlledProxy::new();
    let store = Store::with_proxy("albums".into(), Arc::new(proxy.clone()), None);

    let operation = store.perform_load(None);
    operation.abort();
    operation.abort();
    assert_eq!(operation.state(), EventualState::Aborted);

    let finished = store.perform_load(None);
    proxy.request(1).resolve(page("r", 1, 1));
    finished.abort();
    assert_eq!(finished.state(), EventualState::Resolved);
}
