use serde::Serialize;
use std::fmt;

/// Stages of one deletion attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletionState {
    Idle,
    Locking,
    PermissionChecked,
    Parsed,
    NeedsReassignment,
    Resolved,
    Written,
    Committed,
    Unlocked,
    Aborted,
}

impl DeletionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Locking => "locking",
            Self::PermissionChecked => "permission_checked",
            Self::Parsed => "parsed",
            Self::NeedsReassignment => "needs_reassignment",
            Self::Resolved => "resolved",
            Self::Written => "written",
            Self::Committed => "committed",
            Self::Unlocked => "unlocked",
            Self::Aborted => "aborted",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Unlocked | Self::Aborted)
    }
}

impl fmt::Display for DeletionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered record of the states an attempt passed through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateTrace {
    states: Vec<DeletionState>,
}

impl StateTrace {
    pub fn new() -> Self {
        Self {
            states: vec![DeletionState::Idle],
        }
    }

    pub(crate) fn enter(&mut self, state: DeletionState) {
        tracing::trace!(state = %state, "Deletion state");
        self.states.push(state);
    }

    pub fn states(&self) -> &[DeletionState] {
        &self.states
    }

    pub fn current(&self) -> DeletionState {
        self.states.last().copied().unwrap_or(DeletionState::Idle)
    }

    pub fn visited(&self, state: DeletionState) -> bool {
        self.states.contains(&state)
    }
}

impl Default for StateTrace {
    fn default() -> Self {
        Self::new()
    }
}
