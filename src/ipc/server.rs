use super::client::{ChannelStateClient, Envelope};
use super::proto::{RegistryRequest, RegistryResponse};
use crate::cluster::SharedClusterRegistry;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const CHANNEL_CAPACITY: usize = 32;

/// Owner of the shared registry on the serving side of the channel.
pub struct RegistryServer {
    registry: SharedClusterRegistry,
}

/// Running server. Call `shutdown` to stop it and wait for the task; dropping
/// the handle also stops the server.
pub struct RegistryServerHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl RegistryServer {
    pub fn new(registry: SharedClusterRegistry) -> Self {
        Self { registry }
    }

    /// Spawn the serving task on the current tokio runtime.
    pub fn spawn(self, request_timeout: Duration) -> (ChannelStateClient, RegistryServerHandle) {
        let (sender, receiver) = mpsc::channel(CHANNEL_CAPACITY);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(self.run(receiver, shutdown_rx));
        (
            ChannelStateClient::new(sender, request_timeout),
            RegistryServerHandle {
                shutdown: Some(shutdown_tx),
                task,
            },
        )
    }

    async fn run(self, mut receiver: mpsc::Receiver<Envelope>, mut shutdown: oneshot::Receiver<()>) {
        debug!("Registry server started");
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                next = receiver.recv() => match next {
                    Some(envelope) => {
                        let response = self.handle(&envelope.request);
                        if envelope.reply.send(response).is_err() {
                            debug!(op = envelope.request.op_name(), "Requester went away before reply");
                        }
                    }
                    None => break,
                },
            }
        }
        debug!("Registry server stopped");
    }

    /// Apply one request to the registry.
    pub fn handle(&self, request: &RegistryRequest) -> RegistryResponse {
        let mut registry = self.registry.write();
        match request {
            RegistryRequest::MarkDeleting { cluster_id } => {
                registry.set_deleting(cluster_id);
                RegistryResponse::Ack
            }
            RegistryRequest::ClearDeleting { cluster_id } => {
                registry.clear_deleting(cluster_id);
                RegistryResponse::Ack
            }
            RegistryRequest::CommitDelete { cluster_id } => match registry.remove(cluster_id) {
                Ok(Some(_)) => {
                    info!(cluster_id = %cluster_id, "Cluster removed from registry");
                    RegistryResponse::Ack
                }
                Ok(None) => {
                    debug!(cluster_id = %cluster_id, "Commit for unknown cluster; nothing to remove");
                    RegistryResponse::Ack
                }
                Err(e) => {
                    warn!(cluster_id = %cluster_id, "Failed to persist cluster removal: {}", e);
                    RegistryResponse::Error {
                        message: e.to_string(),
                    }
                }
            },
        }
    }
}

impl RegistryServerHandle {
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Err(e) = self.task.await {
            warn!("Registry server task ended abnormally: {}", e);
        }
    }
}
