//! Choosing a new current context when the current one is being deleted.

use crate::kubeconfig::ReassignmentChoice;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::warn;

/// Label of the option that clears `current-context`.
pub const UNSET_CURRENT_CONTEXT_LABEL: &str = "--unset current-context--";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReassignmentOption {
    Unset,
    Context(String),
}

impl ReassignmentOption {
    pub fn label(&self) -> &str {
        match self {
            Self::Unset => UNSET_CURRENT_CONTEXT_LABEL,
            Self::Context(name) => name,
        }
    }

    pub fn to_choice(&self) -> ReassignmentChoice {
        match self {
            Self::Unset => ReassignmentChoice::Unset,
            Self::Context(name) => ReassignmentChoice::Context(name.clone()),
        }
    }
}

/// Everything a resolver needs to ask the question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReassignmentRequest {
    pub kubeconfig_path: PathBuf,
    pub context_name: String,
    /// The unset option first, then remaining contexts in file order.
    pub options: Vec<ReassignmentOption>,
}

impl ReassignmentRequest {
    pub fn new(
        kubeconfig_path: impl Into<PathBuf>,
        context_name: impl Into<String>,
        remaining: Vec<String>,
    ) -> Self {
        let mut options = Vec::with_capacity(remaining.len() + 1);
        options.push(ReassignmentOption::Unset);
        options.extend(remaining.into_iter().map(ReassignmentOption::Context));
        Self {
            kubeconfig_path: kubeconfig_path.into(),
            context_name: context_name.into(),
            options,
        }
    }

    pub fn prompt(&self) -> String {
        format!(
            "\"{}\" is the current context in \"{}\". Select a new current context",
            self.context_name,
            self.kubeconfig_path.display()
        )
    }

    pub fn labels(&self) -> Vec<&str> {
        self.options.iter().map(ReassignmentOption::label).collect()
    }

    pub fn offers(&self, choice: &ReassignmentChoice) -> bool {
        self.options.iter().any(|o| &o.to_choice() == choice)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReassignmentOutcome {
    Selected(ReassignmentChoice),
    Cancelled,
}

/// Interactive decision point. Exactly one outcome per call; no timeout.
#[async_trait]
pub trait ContextReassignmentResolver: Send + Sync {
    async fn resolve(&self, request: ReassignmentRequest) -> ReassignmentOutcome;
}

/// Terminal menu built on `dialoguer::Select`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DialoguerResolver;

impl DialoguerResolver {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ContextReassignmentResolver for DialoguerResolver {
    async fn resolve(&self, request: ReassignmentRequest) -> ReassignmentOutcome {
        let prompt = request.prompt();
        let labels: Vec<String> = request.labels().into_iter().map(str::to_string).collect();

        let picked = tokio::task::spawn_blocking(move || {
            dialoguer::Select::new()
                .with_prompt(prompt)
                .items(&labels)
                .default(0)
                .interact_opt()
        })
        .await;

        match picked {
            Ok(Ok(Some(index))) => match request.options.get(index) {
                Some(option) => ReassignmentOutcome::Selected(option.to_choice()),
                None => ReassignmentOutcome::Cancelled,
            },
            Ok(Ok(None)) => ReassignmentOutcome::Cancelled,
            Ok(Err(e)) => {
                warn!("Failed to get user input: {}", e);
                ReassignmentOutcome::Cancelled
            }
            Err(e) => {
                warn!("Reassignment prompt task failed: {}", e);
                ReassignmentOutcome::Cancelled
            }
        }
    }
}

/// Fixed answer for non-interactive runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresetResolver {
    Choose(ReassignmentChoice),
    Cancel,
}

#[async_trait]
impl ContextReassignmentResolver for PresetResolver {
    async fn resolve(&self, request: ReassignmentRequest) -> ReassignmentOutcome {
        match self {
            Self::Cancel => ReassignmentOutcome::Cancelled,
            Self::Choose(choice) if request.offers(choice) => {
                ReassignmentOutcome::Selected(choice.clone())
            }
            Self::Choose(choice) => {
                warn!(
                    context = %request.context_name,
                    "Preset current context {:?} is not a remaining context; cancelling",
                    choice
                );
                ReassignmentOutcome::Cancelled
            }
        }
    }
}
