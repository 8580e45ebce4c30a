use super::proto::{RegistryRequest, RegistryResponse, TransportError};
use super::StateNotifier;
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// A request paired with the channel its reply goes back on.
pub(crate) struct Envelope {
    pub request: RegistryRequest,
    pub reply: oneshot::Sender<RegistryResponse>,
}

/// Client side of the in-process registry channel.
#[derive(Clone)]
pub struct ChannelStateClient {
    sender: mpsc::Sender<Envelope>,
    timeout: Duration,
}

impl ChannelStateClient {
    pub(crate) fn new(sender: mpsc::Sender<Envelope>, timeout: Duration) -> Self {
        Self { sender, timeout }
    }
}

#[async_trait]
impl StateNotifier for ChannelStateClient {
    async fn request(&self, request: RegistryRequest) -> Result<RegistryResponse, TransportError> {
        let op = request.op_name();
        let (reply, response) = oneshot::channel();
        let exchange = async {
            self.sender
                .send(Envelope { request, reply })
                .await
                .map_err(|_| TransportError::Disconnected)?;
            response.await.map_err(|_| TransportError::Disconnected)
        };

        match tokio::time::timeout(self.timeout, exchange).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(op, "Registry request timed out");
                Err(TransportError::Timeout {
                    after_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                })
            }
        }
    }
}
