//! Cross-process state channel for the cluster registry.
//!
//! Callers never touch the registry directly while deleting: they send typed
//! requests and wait for a typed reply. The in-process transport is a tokio
//! channel pair; any other transport only has to implement `StateNotifier`.

mod client;
mod proto;
mod server;

pub use client::ChannelStateClient;
pub use proto::{RegistryRequest, RegistryResponse, TransportError};
pub use server::{RegistryServer, RegistryServerHandle};

use crate::cluster::ClusterId;
use async_trait::async_trait;

/// Request/response client for the shared registry.
#[async_trait]
pub trait StateNotifier: Send + Sync {
    async fn request(&self, request: RegistryRequest) -> Result<RegistryResponse, TransportError>;

    /// Flag a cluster as mid-deletion.
    async fn mark_deleting(&self, cluster_id: &ClusterId) -> Result<(), TransportError> {
        self.request(RegistryRequest::MarkDeleting {
            cluster_id: cluster_id.clone(),
        })
        .await?
        .into_ack()
    }

    /// Drop the deleting flag without removing the cluster.
    async fn clear_deleting(&self, cluster_id: &ClusterId) -> Result<(), TransportError> {
        self.request(RegistryRequest::ClearDeleting {
            cluster_id: cluster_id.clone(),
        })
        .await?
        .into_ack()
    }

    /// Remove the cluster from the registry.
    async fn commit_delete(&self, cluster_id: &ClusterId) -> Result<(), TransportError> {
        self.request(RegistryRequest::CommitDelete {
            cluster_id: cluster_id.clone(),
        })
        .await?
        .into_ack()
    }
}
