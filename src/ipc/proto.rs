use crate::cluster::ClusterId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Registry request. Every variant is idempotent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RegistryRequest {
    MarkDeleting { cluster_id: ClusterId },
    ClearDeleting { cluster_id: ClusterId },
    CommitDelete { cluster_id: ClusterId },
}

impl RegistryRequest {
    pub fn cluster_id(&self) -> &ClusterId {
        match self {
            Self::MarkDeleting { cluster_id }
            | Self::ClearDeleting { cluster_id }
            | Self::CommitDelete { cluster_id } => cluster_id,
        }
    }

    pub fn op_name(&self) -> &'static str {
        match self {
            Self::MarkDeleting { .. } => "mark_deleting",
            Self::ClearDeleting { .. } => "clear_deleting",
            Self::CommitDelete { .. } => "commit_delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistryResponse {
    Ack,
    Error { message: String },
}

impl RegistryResponse {
    pub fn into_ack(self) -> Result<(), TransportError> {
        match self {
            Self::Ack => Ok(()),
            Self::Error { message } => Err(TransportError::Rejected { message }),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("registry channel disconnected")]
    Disconnected,

    #[error("registry did not answer within {after_ms}ms")]
    Timeout { after_ms: u64 },

    #[error("registry rejected request: {message}")]
    Rejected { message: String },
}
