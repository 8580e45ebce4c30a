use crate::cluster::ClusterId;
use crate::ipc::{StateNotifier, TransportError};
use std::sync::Arc;
use tracing::{debug, warn};

/// The registry's "deleting" flag for one cluster, held for one attempt.
///
/// Settled exactly once, by `commit` or `clear`. A guard dropped while still
/// set (for example when the attempt's future is cancelled) spawns a
/// best-effort clear on the current runtime.
pub struct DeletingFlag {
    cluster_id: ClusterId,
    state: Arc<dyn StateNotifier>,
    settled: bool,
}

impl DeletingFlag {
    /// Set the flag. On error no flag is held.
    pub async fn mark(
        state: Arc<dyn StateNotifier>,
        cluster_id: ClusterId,
    ) -> Result<Self, TransportError> {
        state.mark_deleting(&cluster_id).await?;
        debug!(cluster_id = %cluster_id, "Marked cluster as deleting");
        Ok(Self {
            cluster_id,
            state,
            settled: false,
        })
    }

    pub fn cluster_id(&self) -> &ClusterId {
        &self.cluster_id
    }

    /// Ask the registry to remove the cluster. On failure the flag is cleared
    /// best-effort before the error is returned.
    pub async fn commit(mut self) -> Result<(), TransportError> {
        self.settled = true;
        match self.state.commit_delete(&self.cluster_id).await {
            Ok(()) => Ok(()),
            Err(e) => {
                clear_best_effort(self.state.as_ref(), &self.cluster_id).await;
                Err(e)
            }
        }
    }

    /// Drop the flag without removing the cluster. Failures are logged.
    pub async fn clear(mut self) {
        self.settled = true;
        clear_best_effort(self.state.as_ref(), &self.cluster_id).await;
    }
}

async fn clear_best_effort(state: &dyn StateNotifier, cluster_id: &ClusterId) {
    match state.clear_deleting(cluster_id).await {
        Ok(()) => debug!(cluster_id = %cluster_id, "Cleared deleting flag"),
        Err(e) => warn!(cluster_id = %cluster_id, "Failed to clear deleting flag: {}", e),
    }
}

impl Drop for DeletingFlag {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let state = self.state.clone();
        let cluster_id = self.cluster_id.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    clear_best_effort(state.as_ref(), &cluster_id).await;
                });
            }
            Err(_) => warn!(
                cluster_id = %self.cluster_id,
                "Deleting flag dropped outside a runtime; it stays set"
            ),
        }
    }
}
