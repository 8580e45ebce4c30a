//! Pure in-memory mutations applied while deleting a context.

use super::document::KubeConfig;
use serde::{Deserialize, Serialize};

/// What to do with `current-context` once its target is removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "name")]
pub enum ReassignmentChoice {
    /// Clear `current-context`.
    Unset,
    /// Point `current-context` at another context.
    Context(String),
}

/// Drop every context named `name`. `current-context` is not touched.
pub fn remove_context(mut doc: KubeConfig, name: &str) -> KubeConfig {
    doc.retain_contexts(|c| c.name() != name);
    doc
}

/// Apply a reassignment decision to `current-context`.
pub fn reassign_current(doc: &mut KubeConfig, choice: &ReassignmentChoice) {
    match choice {
        ReassignmentChoice::Unset => doc.set_current_context(None),
        ReassignmentChoice::Context(name) => doc.set_current_context(Some(name.clone())),
    }
}

/// Context names that survive removing `name`, in file order.
pub fn remaining_contexts(doc: &KubeConfig, name: &str) -> Vec<String> {
    doc.context_names()
        .into_iter()
        .filter(|n| *n != name)
        .map(str::to_string)
        .collect()
}

/// True when `name` is the current context and at least one other context
/// would remain to take its place.
pub fn needs_reassignment(doc: &KubeConfig, name: &str) -> bool {
    doc.current_context() == Some(name) && !remaining_contexts(doc, name).is_empty()
}
