use super::error::DeleteError;
use super::flag::DeletingFlag;
use super::resolver::{ContextReassignmentResolver, ReassignmentOutcome, ReassignmentRequest};
use super::state::{DeletionState, StateTrace};
use super::ClusterReferenceCleanup;
use crate::cluster::{ClusterId, ClusterRecord, ClusterRepository};
use crate::ipc::StateNotifier;
use crate::kubeconfig::{
    needs_reassignment, reassign_current, remaining_contexts, remove_context, ConfigFileStore,
    KubeConfig, ReassignmentChoice,
};
use crate::lock::LockManager;
use crate::notify::Notifier;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What happened to `current-context` in a committed deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "name")]
pub enum ReassignmentDecision {
    /// The deleted context was not current, or nothing else remained.
    Unchanged,
    Unset,
    SetTo(String),
}

impl From<ReassignmentChoice> for ReassignmentDecision {
    fn from(choice: ReassignmentChoice) -> Self {
        match choice {
            ReassignmentChoice::Unset => Self::Unset,
            ReassignmentChoice::Context(name) => Self::SetTo(name),
        }
    }
}

#[derive(Debug)]
pub enum DeletionOutcome {
    NotFound,
    Committed { reassignment: ReassignmentDecision },
    Aborted(DeleteError),
}

impl DeletionOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Committed { .. } => "committed",
            Self::Aborted(DeleteError::UserCancelled) => "cancelled",
            Self::Aborted(_) => "aborted",
        }
    }
}

/// Result of one `delete_cluster` call.
#[derive(Debug)]
pub struct DeletionReport {
    pub cluster_id: ClusterId,
    pub outcome: DeletionOutcome,
    pub trace: StateTrace,
}

impl DeletionReport {
    pub fn is_committed(&self) -> bool {
        matches!(self.outcome, DeletionOutcome::Committed { .. })
    }

    pub fn error(&self) -> Option<&DeleteError> {
        match &self.outcome {
            DeletionOutcome::Aborted(e) => Some(e),
            _ => None,
        }
    }
}

/// Runs the deletion protocol for one cluster at a time.
///
/// The coordinator holds no in-process lock around the kubeconfig; mutual
/// exclusion with other writers comes only from the lock marker.
pub struct DeletionCoordinator {
    clusters: Arc<dyn ClusterRepository>,
    state: Arc<dyn StateNotifier>,
    store: Arc<dyn ConfigFileStore>,
    locks: LockManager,
    resolver: Arc<dyn ContextReassignmentResolver>,
    notifier: Arc<dyn Notifier>,
    cleanup: Vec<Arc<dyn ClusterReferenceCleanup>>,
}

impl DeletionCoordinator {
    pub fn new(
        clusters: Arc<dyn ClusterRepository>,
        state: Arc<dyn StateNotifier>,
        store: Arc<dyn ConfigFileStore>,
        locks: LockManager,
        resolver: Arc<dyn ContextReassignmentResolver>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            clusters,
            state,
            store,
            locks,
            resolver,
            notifier,
            cleanup: Vec::new(),
        }
    }

    /// Register a collaborator purged after every committed deletion.
    pub fn with_cleanup(mut self, cleanup: Arc<dyn ClusterReferenceCleanup>) -> Self {
        self.cleanup.push(cleanup);
        self
    }

    /// Delete the cluster's context from its kubeconfig and drop the cluster
    /// from the shared registry.
    ///
    /// Never returns an error: aborts are reported through the notifier and
    /// the returned report.
    pub async fn delete_cluster(&self, cluster_id: &ClusterId) -> DeletionReport {
        let mut trace = StateTrace::new();

        let Some(record) = self.clusters.get(cluster_id) else {
            warn!(cluster_id = %cluster_id, "Cannot delete unknown cluster");
            return DeletionReport {
                cluster_id: cluster_id.clone(),
                outcome: DeletionOutcome::NotFound,
                trace,
            };
        };

        info!(
            cluster_id = %record.id,
            path = %record.kubeconfig_path.display(),
            context = %record.context_name,
            "Deleting cluster context"
        );

        let outcome = match self.attempt(&record, &mut trace).await {
            Ok(reassignment) => {
                for cleanup in &self.cleanup {
                    cleanup.purge_cluster_references(&record.id);
                }
                info!(cluster_id = %record.id, "Cluster deleted");
                DeletionOutcome::Committed { reassignment }
            }
            Err(err) => {
                trace.enter(DeletionState::Aborted);
                match err.user_message() {
                    Some(message) => {
                        warn!(cluster_id = %record.id, state = "aborted", "{}", err);
                        self.notifier.notify_error(&message);
                    }
                    None => info!(cluster_id = %record.id, "Deletion cancelled by user"),
                }
                DeletionOutcome::Aborted(err)
            }
        };

        DeletionReport {
            cluster_id: record.id,
            outcome,
            trace,
        }
    }

    /// Flag, lock, rewrite and commit. On success the lock is already
    /// released; on error both the flag and the lock have been settled.
    async fn attempt(
        &self,
        record: &ClusterRecord,
        trace: &mut StateTrace,
    ) -> Result<ReassignmentDecision, DeleteError> {
        let flag = DeletingFlag::mark(self.state.clone(), record.id.clone()).await?;
        trace.enter(DeletionState::Locking);

        let path = record.kubeconfig_path.as_path();
        if let Err(e) = self.store.check_access(path) {
            flag.clear().await;
            return Err(e.into());
        }
        let lock = match self.locks.acquire(path) {
            Ok(lock) => lock,
            Err(e) => {
                flag.clear().await;
                return Err(e.into());
            }
        };
        trace.enter(DeletionState::PermissionChecked);

        let decision = match self.rewrite(record, trace).await {
            Ok(decision) => decision,
            Err(e) => {
                flag.clear().await;
                self.locks.release(lock);
                return Err(e);
            }
        };

        let committed = flag.commit().await;
        if committed.is_ok() {
            trace.enter(DeletionState::Committed);
        }
        self.locks.release(lock);
        committed?;
        trace.enter(DeletionState::Unlocked);
        Ok(decision)
    }

    /// Everything between taking the lock and the atomic rename.
    async fn rewrite(
        &self,
        record: &ClusterRecord,
        trace: &mut StateTrace,
    ) -> Result<ReassignmentDecision, DeleteError> {
        let path = record.kubeconfig_path.as_path();
        let target = record.context_name.as_str();

        let raw = self.store.read(path).map_err(|source| DeleteError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let doc = KubeConfig::parse(&raw)?;
        trace.enter(DeletionState::Parsed);

        if !doc.has_context(target) {
            debug!(context = target, "Context already absent from kubeconfig");
        }

        let choice = if needs_reassignment(&doc, target) {
            trace.enter(DeletionState::NeedsReassignment);
            let request = ReassignmentRequest::new(path, target, remaining_contexts(&doc, target));
            let choice = match self.resolver.resolve(request.clone()).await {
                ReassignmentOutcome::Cancelled => return Err(DeleteError::UserCancelled),
                ReassignmentOutcome::Selected(choice) => choice,
            };
            if !request.offers(&choice) {
                let name = match &choice {
                    ReassignmentChoice::Context(name) => name.clone(),
                    ReassignmentChoice::Unset => String::new(),
                };
                return Err(DeleteError::InvalidSelection { name });
            }
            trace.enter(DeletionState::Resolved);
            Some(choice)
        } else {
            trace.enter(DeletionState::Resolved);
            None
        };

        let mut updated = remove_context(doc, target);
        if let Some(choice) = &choice {
            reassign_current(&mut updated, choice);
        }
        let contents = updated.serialize()?;
        self.store
            .replace(path, &contents)
            .map_err(|source| DeleteError::WriteFailure {
                path: path.to_path_buf(),
                source,
            })?;
        trace.enter(DeletionState::Written);
        debug!(path = %path.display(), "Kubeconfig rewritten");

        Ok(choice.map_or(ReassignmentDecision::Unchanged, ReassignmentDecision::from))
    }
}
