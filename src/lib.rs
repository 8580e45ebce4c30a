//! clusterdeck: named kubeconfig contexts with safe deletion
//!
//! Clusters are contexts inside shared kubeconfig files. Deleting one rewrites
//! a file other processes may also be editing, so the deletion flow locks the
//! file, writes atomically and keeps the shared registry in step with disk.

pub mod cli;
pub mod cluster;
pub mod config;
pub mod deletion;
pub mod error;
pub mod hotbar;
pub mod ipc;
pub mod kubeconfig;
pub mod lock;
pub mod logging;
pub mod notify;
pub mod persist;
