use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Progress payload delivered to `on_progress` listeners. Proxies report
/// transport-level chunks; operations report child completions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventualState {
    Pending,
    Resolved,
    Rejected,
    Aborted,
}

impl EventualState {
    pub fn is_terminal(&self) -> bool { !matches!(self, EventualState::Pending) }
}

impl std::fmt::Display for EventualState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventualState::Pending => write!(f, "pending"),
            EventualState::Resolved => write!(f, "resolved"),
            EventualState::Rejected => write!(f, "rejected"),
            EventualState::Aborted => write!(f, "aborted"),
        }
    }
}

/// Owned terminal outcome of an [`Eventual`], as returned by [`Eventual::outcome`]
/// and [`Eventual::wait`].
#[derive(Debug, Clone, PartialEq)]
pub enum Settled<T, E> {
    Resolved(T),
    Rejected(E),
    Aborted,
}

impl<T, E> Settled<T, E> {
    pub fn state(&self) -> EventualState {
        match self {
            Settled::Resolved(_) => EventualState::Resolved,
            Settled::Rejected(_) => EventualState::Rejected,
            Settled::Aborted => EventualState::Aborted,
        }
    }
}

type Callback<A> = Arc<dyn Fn(&A) + Send + Sync + 'static>;
type UnitCallback = Arc<dyn Fn() + Send + Sync + 'static>;
type SettledCallback = Arc<dyn Fn(EventualState) + Send + Sync + 'static>;

/// A cancellable, single-resolution asynchronous result container.
///
/// Exactly one of resolve/reject/abort wins; once terminal the state never
/// changes and the losing calls are silent no-ops. Listeners fire
/// synchronously, in registration order, within the call that settles the
/// container. Registering a listener whose category matches an
/// already-reached terminal state fires it immediately.
///
/// Clones share the same underlying cell.
pub struct Eventual<T, E>(Arc<Inner<T, E>>);

impl<T, E> Clone for Eventual<T, E> {
    fn clone(&self) -> Self { Self(self.0.clone()) }
}

struct Inner<T, E> {
    state: Mutex<State<T, E>>,
}

struct State<T, E> {
    outcome: Outcome<T, E>,
    progress: Vec<Callback<Progress>>,
    success: Vec<Callback<T>>,
    failure: Vec<Callback<E>>,
    abort: Vec<UnitCallback>,
    settled: Vec<SettledCallback>,
}

enum Outcome<T, E> {
    Pending,
    Resolved(T),
    Rejected(E),
    Aborted,
}

impl<T, E> Outcome<T, E> {
    fn state(&self) -> EventualState {
        match self {
            Outcome::Pending => EventualState::Pending,
            Outcome::Resolved(_) => EventualState::Resolved,
            Outcome::Rejected(_) => EventualState::Rejected,
            Outcome::Aborted => EventualState::Aborted,
        }
    }
}

impl<T, E> Default for Eventual<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    fn default() -> Self { Self::new() }
}

impl<T, E> Eventual<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self(Arc::new(Inner {
            state: Mutex::new(State {
                outcome: Outcome::Pending,
                progress: Vec::new(),
                success: Vec::new(),
                failure: Vec::new(),
                abort: Vec::new(),
                settled: Vec::new(),
            }),
        }))
    }

    pub fn state(&self) -> EventualState { self.0.state.lock().unwrap().outcome.state() }

    /// Owned snapshot of the terminal outcome, or None while pending.
    pub fn outcome(&self) -> Option<Settled<T, E>> {
        match &self.0.state.lock().unwrap().outcome {
            Outcome::Pending => None,
            Outcome::Resolved(value) => Some(Settled::Resolved(value.clone())),
            Outcome::Rejected(error) => Some(Settled::Rejected(error.clone())),
            Outcome::Aborted => Some(Settled::Aborted),
        }
    }

    /// Fire progress listeners. Silently ignored unless pending.
    pub fn notify(&self, progress: &Progress) {
        // Clone the listeners out of the lock so callbacks can re-enter.
        let listeners = {
            let state = self.0.state.lock().unwrap();
            if state.outcome.state().is_terminal() {
                return;
            }
            state.progress.clone()
        };
        for listener in listeners {
            listener(progress);
        }
    }

    /// Transition pending -> resolved. No-op once terminal.
    pub fn resolve(&self, value: T) {
        let (listeners, settled) = {
            let mut state = self.0.state.lock().unwrap();
            if state.outcome.state().is_terminal() {
                return;
            }
            state.outcome = Outcome::Resolved(value.clone());
            // Terminal: no listener category can fire after this dispatch,
            // so drop them all rather than keeping closures alive.
            state.progress.clear();
            state.failure.clear();
            state.abort.clear();
            (std::mem::take(&mut state.success), std::mem::take(&mut state.settled))
        };
        for listener in listeners {
            listener(&value);
        }
        for listener in settled {
            listener(EventualState::Resolved);
        }
    }

    /// Transition pending -> rejected. No-op once terminal.
    pub fn reject(&self, error: E) {
        let (listeners, settled) = {
            let mut state = self.0.state.lock().unwrap();
            if state.outcome.state().is_terminal() {
                return;
            }
            state.outcome = Outcome::Rejected(error.clone());
            state.progress.clear();
            state.success.clear();
            state.abort.clear();
            (std::mem::take(&mut state.failure), std::mem::take(&mut state.settled))
        };
        for listener in listeners {
            listener(&error);
        }
        for listener in settled {
            listener(EventualState::Rejected);
        }
    }

    /// Transition pending -> aborted. No-op once terminal: a container that
    /// already resolved or rejected cannot be aborted.
    pub fn abort(&self) {
        let (listeners, settled) = {
            let mut state = self.0.state.lock().unwrap();
            if state.outcome.state().is_terminal() {
                return;
            }
            state.outcome = Outcome::Aborted;
            state.progress.clear();
            state.success.clear();
            state.failure.clear();
            (std::mem::take(&mut state.abort), std::mem::take(&mut state.settled))
        };
        for listener in listeners {
            listener();
        }
        for listener in settled {
            listener(EventualState::Aborted);
        }
    }

    pub fn on_progress<F>(&self, listener: F) -> &Self
    where F: Fn(&Progress) + Send + Sync + 'static {
        let mut state = self.0.state.lock().unwrap();
        if let Outcome::Pending = state.outcome {
            state.progress.push(Arc::new(listener));
        }
        drop(state);
        self
    }

    pub fn on_success<F>(&self, listener: F) -> &Self
    where F: Fn(&T) + Send + Sync + 'static {
        let immediate = {
            let mut state = self.0.state.lock().unwrap();
            match &state.outcome {
                Outcome::Pending => {
                    state.success.push(Arc::new(listener));
                    None
                }
                Outcome::Resolved(value) => Some((listener, value.clone())),
                _ => None,
            }
        };
        if let Some((listener, value)) = immediate {
            listener(&value);
        }
        self
    }

    pub fn on_failure<F>(&self, listener: F) -> &Self
    where F: Fn(&E) + Send + Sync + 'static {
        let immediate = {
            let mut state = self.0.state.lock().unwrap();
            match &state.outcome {
                Outcome::Pending => {
                    state.failure.push(Arc::new(listener));
                    None
                }
                Outcome::Rejected(error) => Some((listener, error.clone())),
                _ => None,
            }
        };
        if let Some((listener, error)) = immediate {
            listener(&error);
        }
        self
    }

    pub fn on_abort<F>(&self, listener: F) -> &Self
    where F: Fn() + Send + Sync + 'static {
        let immediate = {
            let mut state = self.0.state.lock().unwrap();
            match &state.outcome {
                Outcome::Pending => {
                    state.abort.push(Arc::new(listener));
                    None
                }
                Outcome::Aborted => Some(listener),
                _ => None,
            }
        };
        if let Some(listener) = immediate {
            listener();
        }
        self
    }

    /// Fires on any terminal transition with the state reached.
    pub fn on_settled<F>(&self, listener: F) -> &Self
    where F: Fn(EventualState) + Send + Sync + 'static {
        let immediate = {
            let mut state = self.0.state.lock().unwrap();
            match state.outcome.state() {
                EventualState::Pending => {
                    state.settled.push(Arc::new(listener));
                    None
                }
                terminal => Some((listener, terminal)),
            }
        };
        if let Some((listener, terminal)) = immediate {
            listener(terminal);
        }
        self
    }

    /// Await settlement from async callers. Purely observational: dispatch
    /// stays synchronous on the settling side.
    pub async fn wait(&self) -> Settled<T, E> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        let tx = Mutex::new(Some(tx));
        let me = self.clone();
        self.on_settled(move |_| {
            if let (Some(tx), Some(outcome)) = (tx.lock().unwrap().take(), me.outcome()) {
                let _ = tx.send(outcome);
            }
        });
        // The listener is retained until it fires, and `self` keeps the cell alive.
        rx.await.expect("settled listener dropped without firing")
    }

    /// Combine n containers into one master that resolves with all values in
    /// input order once every input resolves, rejects with the first input
    /// rejection, and aborts if any input aborts. Input progress events and
    /// per-input completions pass through as master progress. An empty input
    /// resolves immediately.
    pub fn join(inputs: &[Eventual<T, E>]) -> Eventual<Vec<T>, E> {
        let master = Eventual::new();
        let total = inputs.len();
        if total == 0 {
            master.resolve(Vec::new());
            return master;
        }
        let slots: Arc<Mutex<Vec<Option<T>>>> = Arc::new(Mutex::new((0..total).map(|_| None).collect()));
        let remaining = Arc::new(AtomicUsize::new(total));

        for (index, input) in inputs.iter().enumerate() {
            let me = master.clone();
            let slots = slots.clone();
            let remaining = remaining.clone();
            input.on_success(move |value| {
                slots.lock().unwrap()[index] = Some(value.clone());
                let left = remaining.fetch_sub(1, Ordering::SeqCst) - 1;
                me.notify(&Progress { completed: total - left, total: Some(total) });
                if left == 0 {
                    let values = slots
                        .lock()
                        .unwrap()
                        .iter_mut()
                        .map(|slot| slot.take().expect("all inputs resolved"))
                        .collect();
                    me.resolve(values);
                }
            });

            let me = master.clone();
            input.on_failure(move |error| me.reject(error.clone()));

            let me = master.clone();
            input.on_abort(move || me.abort());

            let me = master.clone();
            input.on_progress(move |progress| me.notify(progress));
        }
        master
    }
}

impl<T, E> std::fmt::Debug for Eventual<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Eventual").field("state", &self.0.state.lock().unwrap().outcome.state()).finish()
    }
}
