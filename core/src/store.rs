use std::sync::Arc;

use tracing::debug;

use crate::batch::Batch;
use crate::collection::Collection;
use crate::error::ConfigError;
use crate::id::CollectionId;
use crate::operation::Operation;
use crate::proxy::{Proxy, ProxyConfig};
use crate::record::Record;
use crate::registry::ProxyRegistry;
use crate::request::{Action, Request, RequestParams, Window};

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub collection: CollectionId,
    pub proxy: ProxyConfig,
    /// When set, ranged loads fan out into one request per page slice.
    pub page_size: Option<u32>,
}

/// The caller-facing surface: owns the proxy and the live target
/// collection, and turns load/save/destroy calls into proxy-backed
/// operations. Callers observe the returned handle's future; this layer
/// never retries on its own.
pub struct Store {
    collection_id: CollectionId,
    proxy: Arc<dyn Proxy>,
    page_size: Option<u32>,
    target: Collection,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("collection_id", &self.collection_id)
            .field("page_size", &self.page_size)
            .finish()
    }
}

impl Store {
    /// Resolve the configured proxy through the registry. Fails fast on
    /// configuration problems.
    pub fn from_config(config: StoreConfig, registry: &ProxyRegistry) -> Result<Self, ConfigError> {
        if config.proxy.kind.is_empty() {
            return Err(ConfigError::MissingProxy(config.collection.to_string()));
        }
        let proxy = registry.build(&config.proxy)?;
        Ok(Self::with_proxy(config.collection, proxy, config.page_size))
    }

    pub fn with_proxy(collection_id: CollectionId, proxy: Arc<dyn Proxy>, page_size: Option<u32>) -> Self {
        Self { collection_id, proxy, page_size, target: Collection::new() }
    }

    pub fn collection_id(&self) -> &CollectionId { &self.collection_id }

    /// The live record collection operations apply results to.
    pub fn collection(&self) -> &Collection { &self.target }

    pub fn proxy(&self) -> &Arc<dyn Proxy> { &self.proxy }

    /// Begin one or more read requests. A `Range` window wider than the
    /// configured page size fans out into one request per page slice, in
    /// page order; everything else is a single request.
    pub fn perform_load(&self, window: Option<Window>) -> Operation {
        let requests = self
            .load_windows(window)
            .into_iter()
            .map(|window| {
                let params = match window {
                    Some(window) => RequestParams::windowed(window),
                    None => RequestParams::default(),
                };
                Arc::new(Request::new(Action::Read, self.collection_id.clone(), params))
            })
            .collect::<Vec<_>>();
        debug!(collection = %self.collection_id, requests = requests.len(), "load");

        let operation = Operation::new(Action::Read, requests, self.proxy.clone(), Some(self.target.clone()));
        operation.run();
        operation
    }

    /// Load a single entity by id.
    pub fn perform_load_one(&self, id: impl Into<String>) -> Operation {
        let request = Arc::new(Request::new(Action::Read, self.collection_id.clone(), RequestParams::entity(id)));
        let operation = Operation::new(Action::Read, vec![request], self.proxy.clone(), Some(self.target.clone()));
        operation.run();
        operation
    }

    /// Persist records: those without an id become creates, the rest
    /// updates, one operation per action, combined into a batch.
    pub fn perform_save(&self, records: Vec<Record>) -> Batch {
        let (updates, creates): (Vec<_>, Vec<_>) = records.into_iter().partition(|record| record.id().is_some());
        debug!(collection = %self.collection_id, creates = creates.len(), updates = updates.len(), "save");

        let mut operations = Vec::new();
        for (action, records) in [(Action::Create, creates), (Action::Update, updates)] {
            if !records.is_empty() {
                let request = Arc::new(Request::new(action, self.collection_id.clone(), RequestParams::records(records)));
                operations.push(Operation::new(action, vec![request], self.proxy.clone(), Some(self.target.clone())));
            }
        }

        let batch = Batch::new(operations);
        batch.run();
        batch
    }

    pub fn perform_destroy(&self, records: Vec<Record>) -> Operation {
        debug!(collection = %self.collection_id, records = records.len(), "destroy");
        let request = Arc::new(Request::new(Action::Destroy, self.collection_id.clone(), RequestParams::records(records)));
        let operation = Operation::new(Action::Destroy, vec![request], self.proxy.clone(), Some(self.target.clone()));
        operation.run();
        operation
    }

    fn load_windows(&self, window: Option<Window>) -> Vec<Option<Window>> {
        match (window, self.page_size) {
            (Some(Window::Range { start, limit }), Some(size)) if limit > size as u64 => {
                let size = size as u64;
                let mut windows = Vec::new();
                let mut offset = start;
                let end = start + limit;
                while offset < end {
                    let slice = size.min(end - offset);
                    windows.push(Some(Window::Range { start: offset, limit: slice }));
                    offset += slice;
                }
                windows
            }
            (window, _) => vec![window],
        }
    }
}
