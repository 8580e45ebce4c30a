//! Safe deletion of a cluster's context from a shared kubeconfig.
//!
//! The coordinator flags the cluster as deleting, checks access, takes the
//! file lock, parses, optionally asks for a new current context, writes the
//! result atomically and commits the removal in the shared registry. Every
//! exit path settles the flag and gives the lock back.

mod coordinator;
mod error;
#[cfg(test)]
mod fakes;
mod flag;
pub mod resolver;
mod state;

pub use coordinator::{DeletionCoordinator, DeletionOutcome, DeletionReport, ReassignmentDecision};
pub use error::DeleteError;
pub use flag::DeletingFlag;
pub use resolver::{
    ContextReassignmentResolver, DialoguerResolver, PresetResolver, ReassignmentOption,
    ReassignmentOutcome, ReassignmentRequest, UNSET_CURRENT_CONTEXT_LABEL,
};
pub use state::{DeletionState, StateTrace};

use crate::cluster::ClusterId;

/// Holder of per-cluster state that must go away once a cluster is deleted.
///
/// Called only after a committed deletion. Implementations log their own
/// failures; a purge never undoes a deletion.
pub trait ClusterReferenceCleanup: Send + Sync {
    fn purge_cluster_references(&self, cluster_id: &ClusterId);
}
