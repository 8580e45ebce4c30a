//! Cluster records and the shared registry that owns them.
//!
//! A cluster is one context inside one kubeconfig file. The registry is the
//! in-memory aggregate; persistence is delegated to a storage port.

pub mod record;
pub mod registry;
pub mod storage;

pub use record::{ClusterId, ClusterRecord};
pub use registry::{ClusterRegistry, ClusterRepository, SharedClusterRegistry};
pub use storage::{ClusterStorage, JsonClusterStorage, MemoryClusterStorage};
