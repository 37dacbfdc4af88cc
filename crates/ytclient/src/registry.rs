//! The service discovery seam.
//!
//! The invocation path only needs two things from a registry: the current
//! endpoint list for an interface, and change notifications. Everything
//! else (sessions, persistence, health) belongs to the registry
//! implementation behind this trait.

use dashmap::DashMap;

use crate::endpoint::Endpoint;

/// Called with the full new endpoint list whenever an interface's
/// candidates change.
pub type EndpointWatcher = Box<dyn Fn(Vec<Endpoint>) + Send + Sync>;

pub trait Registry: Send + Sync {
    /// The current candidate endpoints for an interface. Empty if the
    /// interface is unknown.
    fn resolve(&self, interface: &str) -> Vec<Endpoint>;

    /// Register a watcher for endpoint changes on an interface.
    fn subscribe(&self, interface: &str, watcher: EndpointWatcher);
}

/// An in-process registry: a table of interface name to endpoint list,
/// with push notification on update. Serves fixed deployments and tests;
/// a real discovery service implements [`Registry`] the same way.
#[derive(Default)]
pub struct StaticRegistry {
    table: DashMap<String, Vec<Endpoint>>,
    watchers: DashMap<String, Vec<EndpointWatcher>>,
}

impl StaticRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace an interface's endpoint list and notify its watchers.
    pub fn register(&self, interface: &str, endpoints: Vec<Endpoint>) {
        self.table.insert(interface.to_string(), endpoints.clone());
        if let Some(watchers) = self.watchers.get(interface) {
            for watcher in watchers.iter() {
                watcher(endpoints.clone());
            }
        }
    }
}

impl Registry for StaticRegistry {
    fn resolve(&self, interface: &str) -> Vec<Endpoint> {
        self.table.get(interface).map(|e| e.value().clone()).unwrap_or_default()
    }

    fn subscribe(&self, interface: &str, watcher: EndpointWatcher) {
        self.watchers.entry(interface.to_string()).or_default().push(watcher);
    }
}
