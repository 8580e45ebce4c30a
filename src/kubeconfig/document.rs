use serde_yaml::{Mapping, Value};
use std::collections::HashSet;
use thiserror::Error;

const KEY_CONTEXTS: &str = "contexts";
const KEY_CURRENT_CONTEXT: &str = "current-context";
const KEY_NAME: &str = "name";

#[derive(Debug, Error)]
pub enum KubeconfigError {
    #[error("Invalid kubeconfig: {0}")]
    Parse(String),

    #[error("Failed to serialize kubeconfig: {0}")]
    Serialize(String),
}

/// One entry of the `contexts` list.
///
/// The full entry mapping is kept so the nested `context` block and any
/// extension keys survive a rewrite in their original order.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedContext {
    name: String,
    entry: Mapping,
}

impl NamedContext {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The cluster this context points at, if declared.
    pub fn cluster(&self) -> Option<&str> {
        self.context_field("cluster")
    }

    /// The user this context authenticates as, if declared.
    pub fn user(&self) -> Option<&str> {
        self.context_field("user")
    }

    pub fn namespace(&self) -> Option<&str> {
        self.context_field("namespace")
    }

    fn context_field(&self, key: &str) -> Option<&str> {
        self.entry
            .get(Value::from("context"))
            .and_then(|c| c.get(key))
            .and_then(Value::as_str)
    }
}

/// Parsed kubeconfig.
#[derive(Debug, Clone, PartialEq)]
pub struct KubeConfig {
    root: Mapping,
    contexts: Vec<NamedContext>,
    current_context: Option<String>,
}

impl KubeConfig {
    /// Parse kubeconfig YAML.
    ///
    /// Strict: structural problems in `contexts` or `current-context` are
    /// rejected rather than skipped. Other keys are not validated.
    pub fn parse(raw: &str) -> Result<Self, KubeconfigError> {
        let value: Value =
            serde_yaml::from_str(raw).map_err(|e| KubeconfigError::Parse(e.to_string()))?;

        let root = match value {
            Value::Mapping(map) => map,
            Value::Null => {
                return Err(KubeconfigError::Parse("document is empty".to_string()));
            }
            _ => {
                return Err(KubeconfigError::Parse(
                    "top level must be a mapping".to_string(),
                ));
            }
        };

        let contexts = match root.get(Value::from(KEY_CONTEXTS)) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Sequence(entries)) => parse_contexts(entries)?,
            Some(_) => {
                return Err(KubeconfigError::Parse(
                    "'contexts' must be a list".to_string(),
                ));
            }
        };

        let current_context = match root.get(Value::from(KEY_CURRENT_CONTEXT)) {
            None | Some(Value::Null) => None,
            Some(value) => match scalar_name(value) {
                Some(name) if name.is_empty() => None,
                Some(name) => Some(name),
                None => {
                    return Err(KubeconfigError::Parse(
                        "'current-context' must be a scalar".to_string(),
                    ));
                }
            },
        };

        Ok(Self {
            root,
            contexts,
            current_context,
        })
    }

    /// Serialize back to YAML.
    ///
    /// Keys keep their original order. `current-context` is dropped when unset
    /// and keeps its original scalar when unchanged.
    pub fn serialize(&self) -> Result<String, KubeconfigError> {
        let mut root = self.root.clone();

        let entries: Vec<Value> = self
            .contexts
            .iter()
            .map(|c| Value::Mapping(c.entry.clone()))
            .collect();
        root.insert(Value::from(KEY_CONTEXTS), Value::Sequence(entries));

        match &self.current_context {
            Some(name) => {
                let unchanged = root
                    .get(Value::from(KEY_CURRENT_CONTEXT))
                    .and_then(scalar_name)
                    .is_some_and(|existing| existing == *name);
                if !unchanged {
                    root.insert(Value::from(KEY_CURRENT_CONTEXT), Value::from(name.as_str()));
                }
            }
            None => {
                root.shift_remove(Value::from(KEY_CURRENT_CONTEXT));
            }
        }

        serde_yaml::to_string(&Value::Mapping(root))
            .map_err(|e| KubeconfigError::Serialize(e.to_string()))
    }

    pub fn contexts(&self) -> &[NamedContext] {
        &self.contexts
    }

    /// Context names in file order.
    pub fn context_names(&self) -> Vec<&str> {
        self.contexts.iter().map(NamedContext::name).collect()
    }

    pub fn has_context(&self, name: &str) -> bool {
        self.contexts.iter().any(|c| c.name == name)
    }

    pub fn current_context(&self) -> Option<&str> {
        self.current_context.as_deref()
    }

    pub fn set_current_context(&mut self, name: Option<String>) {
        self.current_context = name;
    }

    pub(crate) fn retain_contexts<F>(&mut self, keep: F)
    where
        F: FnMut(&NamedContext) -> bool,
    {
        self.contexts.retain(keep);
    }
}

/// Names are strings to kubectl, but YAML types bare `2024` or `true` as
/// numbers and bools. Take any such scalar by its textual form.
fn scalar_name(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn parse_contexts(entries: &[Value]) -> Result<Vec<NamedContext>, KubeconfigError> {
    let mut seen = HashSet::new();
    let mut contexts = Vec::with_capacity(entries.len());

    for (index, entry) in entries.iter().enumerate() {
        let map = entry.as_mapping().ok_or_else(|| {
            KubeconfigError::Parse(format!("contexts[{}] must be a mapping", index))
        })?;
        let name = map
            .get(Value::from(KEY_NAME))
            .and_then(scalar_name)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| {
                KubeconfigError::Parse(format!("contexts[{}] has no name", index))
            })?;
        if !seen.insert(name.clone()) {
            return Err(KubeconfigError::Parse(format!(
                "duplicate context name '{}'",
                name
            )));
        }
        contexts.push(NamedContext {
            name,
            entry: map.clone(),
        });
    }

    Ok(contexts)
}
