//! Kubeconfig document handling.
//!
//! Parses a kubeconfig into a model that knows about contexts and the current
//! context and carries every other key through untouched. Mutations are pure;
//! writing goes through the `ConfigFileStore` port, which only ever replaces the
//! target by atomic rename.

mod document;
mod mutate;
pub mod store;

pub use document::{KubeConfig, KubeconfigError, NamedContext};
pub use mutate::{
    needs_reassignment, reassign_current, remaining_contexts, remove_context, ReassignmentChoice,
};
pub use store::{ConfigFileStore, FileAccessError, FsConfigFileStore};
