//! Test doubles for the deletion collaborators.

use super::resolver::{ContextReassignmentResolver, ReassignmentOutcome, ReassignmentRequest};
use super::ClusterReferenceCleanup;
use crate::cluster::{ClusterId, ClusterRecord, ClusterRepository};
use crate::ipc::{RegistryRequest, RegistryResponse, StateNotifier, TransportError};
use async_trait::async_trait;
use parking_lot::Mutex;

#[derive(Default)]
pub struct FakeStateNotifier {
    requests: Mutex<Vec<RegistryRequest>>,
    fail_op: Option<&'static str>,
}

impl FakeStateNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_on(mut self, op: &'static str) -> Self {
        self.fail_op = Some(op);
        self
    }

    pub fn requests(&self) -> Vec<RegistryRequest> {
        self.requests.lock().clone()
    }

    pub fn ops(&self) -> Vec<&'static str> {
        self.requests.lock().iter().map(|r| r.op_name()).collect()
    }
}

#[async_trait]
impl StateNotifier for FakeStateNotifier {
    async fn request(&self, request: RegistryRequest) -> Result<RegistryResponse, TransportError> {
        let op = request.op_name();
        self.requests.lock().push(request);
        if self.fail_op == Some(op) {
            return Err(TransportError::Disconnected);
        }
        Ok(RegistryResponse::Ack)
    }
}

pub struct FakeRepository(pub Vec<ClusterRecord>);

impl ClusterRepository for FakeRepository {
    fn get(&self, id: &ClusterId) -> Option<ClusterRecord> {
        self.0.iter().find(|r| &r.id == id).cloned()
    }
}

/// Wraps a resolver and records every request it sees.
pub struct SpyResolver<R> {
    inner: R,
    seen: Mutex<Vec<ReassignmentRequest>>,
}

impl<R> SpyResolver<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn seen(&self) -> Vec<ReassignmentRequest> {
        self.seen.lock().clone()
    }
}

#[async_trait]
impl<R: ContextReassignmentResolver> ContextReassignmentResolver for SpyResolver<R> {
    async fn resolve(&self, request: ReassignmentRequest) -> ReassignmentOutcome {
        self.seen.lock().push(request.clone());
        self.inner.resolve(request).await
    }
}

#[derive(Default)]
pub struct RecordingCleanup {
    purged: Mutex<Vec<ClusterId>>,
}

impl RecordingCleanup {
    pub fn purged(&self) -> Vec<ClusterId> {
        self.purged.lock().clone()
    }
}

impl ClusterReferenceCleanup for RecordingCleanup {
    fn purge_cluster_references(&self, cluster_id: &ClusterId) {
        self.purged.lock().push(cluster_id.clone());
    }
}
