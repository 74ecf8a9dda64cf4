use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ConfigError;
use crate::proxy::{Proxy, ProxyConfig};

type ProxyFactory = Arc<dyn Fn(&ProxyConfig) -> Result<Arc<dyn Proxy>, ConfigError> + Send + Sync>;

/// An explicit map from proxy kind to constructor, built at process start
/// by the embedding application and passed into store construction. No
/// module-level registration, no global state.
#[derive(Clone, Default)]
pub struct ProxyRegistry {
    factories: HashMap<String, ProxyFactory>,
}

impl ProxyRegistry {
    pub fn new() -> Self { Self::default() }

    pub fn register<F>(&mut self, kind: impl Into<String>, factory: F)
    where F: Fn(&ProxyConfig) -> Result<Arc<dyn Proxy>, ConfigError> + Send + Sync + 'static {
        self.factories.insert(kind.into(), Arc::new(factory));
    }

    pub fn build(&self, config: &ProxyConfig) -> Result<Arc<dyn Proxy>, ConfigError> {
        match self.factories.get(&config.kind) {
            Some(factory) => factory(config),
            None => Err(ConfigError::UnknownProxy(config.kind.clone())),
        }
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> { self.factories.keys().map(String::as_str) }
}

impl std::fmt::Debug for ProxyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyRegistry").field("kinds", &self.factories.keys().collect::<Vec<_>>()).finish()
    }
}
