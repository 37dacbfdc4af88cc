//! The client-side face of a remote interface.
//!
//! A proxy presents `invoke(method, param_types, args)` as if the
//! interface lived in-process. Per call it mints a fresh request id,
//! snapshots the current endpoint list (the registry pushes updates
//! between calls, never into a call), and delegates to the cluster.
//! Remote faults re-raise in the caller's context; everything else the
//! cluster surfaces is wrapped as a call failure carrying its cause.

use std::sync::Arc;
use std::sync::Mutex;

use uuid::Uuid;

use ytproto::Request;
use ytproto::Value;

use crate::cluster::Cluster;
use crate::endpoint::Endpoint;
use crate::error::Error;
use crate::error::Result;
use crate::registry::Registry;

pub struct Proxy {
    interface: String,
    endpoints: Arc<Mutex<Vec<Endpoint>>>,
    cluster: Arc<Cluster>,
}

impl Proxy {
    /// Build a proxy for `interface`: resolve the candidate list once and
    /// subscribe for pushes.
    pub fn new(interface: impl Into<String>, registry: &dyn Registry, cluster: Arc<Cluster>) -> Self {
        let interface = interface.into();
        let endpoints = Arc::new(Mutex::new(registry.resolve(&interface)));

        let watched = endpoints.clone();
        registry.subscribe(
            &interface,
            Box::new(move |updated| {
                let mut guard = match watched.lock() {
                    Ok(guard) => guard,
                    Err(poisoned) => poisoned.into_inner(),
                };
                *guard = updated;
            }),
        );

        Self { interface, endpoints, cluster }
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }

    /// Run one remote call and translate the response.
    ///
    /// # Errors
    ///
    /// - [`Error::Remote`] if the call completed and the remote side
    ///   reported an application fault.
    /// - [`Error::CallFailed`] for any cluster-level failure, with the
    ///   cause attached.
    pub async fn invoke(
        &self,
        method: &str,
        param_types: &[&str],
        args: Vec<Value>,
    ) -> Result<Value> {
        let request = Request::new(
            Uuid::new_v4().to_string(),
            self.interface.clone(),
            method,
            param_types.iter().map(|t| t.to_string()).collect(),
            args,
        );

        let candidates = self.snapshot();
        let response = self
            .cluster
            .invoke(&candidates, &request)
            .await
            .map_err(|e| Error::CallFailed(Box::new(e)))?;

        if let Some(fault) = response.fault {
            return Err(Error::Remote(fault));
        }
        Ok(response.result.unwrap_or(Value::Unit))
    }

    /// The call-local copy of the candidate list.
    fn snapshot(&self) -> Vec<Endpoint> {
        match self.endpoints.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}
