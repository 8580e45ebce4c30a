//! CLI route tests: commands parsed with clap and executed through RunContext.

use crate::integration::test_utils::{two_contexts_current, TWO_CONTEXTS};
use clap::Parser;
use clusterdeck::cli::{Cli, RunContext};
use clusterdeck::cluster::ClusterRecord;
use clusterdeck::config::{DeckConfig, StorageConfig};
use clusterdeck::error::ApiError;
use clusterdeck::kubeconfig::KubeConfig;
use clusterdeck::notify::RecordingNotifier;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

struct CliHarness {
    dir: TempDir,
    kubeconfig: PathBuf,
    notifier: Arc<RecordingNotifier>,
}

impl CliHarness {
    fn new(contents: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let kubeconfig = dir.path().join("config");
        std::fs::write(&kubeconfig, contents).unwrap();
        Self {
            dir,
            kubeconfig,
            notifier: Arc::new(RecordingNotifier::new()),
        }
    }

    fn config(&self) -> DeckConfig {
        let mut config = DeckConfig::default();
        config.storage = StorageConfig {
            clusters_file: Some(self.dir.path().join("state").join("clusters.json")),
            hotbar_file: Some(self.dir.path().join("state").join("hotbar.json")),
        };
        config.deletion.interactive = false;
        config
    }

    fn context(&self) -> RunContext {
        RunContext::from_config(self.config())
            .unwrap()
            .with_notifier(self.notifier.clone())
    }

    /// A fresh context per call, like separate CLI invocations.
    fn run(&self, args: &[&str]) -> Result<String, ApiError> {
        self.run_in(&self.context(), args)
    }

    fn run_in(&self, ctx: &RunContext, args: &[&str]) -> Result<String, ApiError> {
        let mut argv = vec!["clusterdeck"];
        argv.extend_from_slice(args);
        let cli = Cli::try_parse_from(argv).unwrap();
        ctx.execute(&cli.command)
    }

    fn path(&self) -> &str {
        self.kubeconfig.to_str().unwrap()
    }

    fn id(&self, context: &str) -> String {
        ClusterRecord::new(&self.kubeconfig, context).id.to_string()
    }

    fn add(&self, context: &str) -> String {
        self.run(&["cluster", "add", self.path(), "--context", context])
            .unwrap()
    }

    fn listed_ids(&self) -> Vec<String> {
        let out = self.run(&["cluster", "list", "--format", "json"]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["id"].as_str().unwrap().to_string())
            .collect()
    }
}

#[test]
fn test_add_and_list_clusters() {
    let h = CliHarness::new(TWO_CONTEXTS);

    let out = h.add("a");
    assert!(out.contains(&h.id("a")));
    h.add("b");

    let mut expected = vec![h.id("a"), h.id("b")];
    expected.sort();
    assert_eq!(h.listed_ids(), expected);

    let text = h.run(&["cluster", "list"]).unwrap();
    assert!(text.contains("Context"));
}

#[test]
fn test_add_rejects_unknown_context_and_duplicates() {
    let h = CliHarness::new(TWO_CONTEXTS);

    let err = h
        .run(&["cluster", "add", h.path(), "--context", "zzz"])
        .unwrap_err();
    assert!(matches!(err, ApiError::ContextNotFound { .. }));

    h.add("a");
    let err = h
        .run(&["cluster", "add", h.path(), "--context", "a"])
        .unwrap_err();
    assert!(matches!(err, ApiError::ClusterExists(_)));
}

#[test]
fn test_contexts_command_lists_file_contexts() {
    let h = CliHarness::new(TWO_CONTEXTS);

    let out = h.run(&["contexts", h.path(), "--format", "json"]).unwrap();
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["current_context"], "a");
    assert_eq!(value["contexts"].as_array().unwrap().len(), 2);
    assert_eq!(value["contexts"][1]["namespace"], "apps");
}

#[test]
fn test_delete_with_preset_reassignment() {
    let h = CliHarness::new(TWO_CONTEXTS);
    h.add("a");
    h.add("b");
    let a = h.id("a");
    h.run(&["hotbar", "pin", &a]).unwrap();

    let out = h
        .run(&["cluster", "delete", &a, "--yes", "--current-context", "b"])
        .unwrap();
    assert!(out.contains("current-context set to \"b\""));

    let doc = KubeConfig::parse(&std::fs::read_to_string(&h.kubeconfig).unwrap()).unwrap();
    assert_eq!(doc.context_names(), vec!["b"]);
    assert_eq!(doc.current_context(), Some("b"));
    assert_eq!(h.listed_ids(), vec![h.id("b")]);
    assert_eq!(
        h.run(&["hotbar", "list"]).unwrap(),
        "No pinned clusters."
    );
}

#[test]
fn test_delete_requires_confirmation_when_not_interactive() {
    let h = CliHarness::new(TWO_CONTEXTS);
    h.add("b");

    let err = h.run(&["cluster", "delete", &h.id("b")]).unwrap_err();
    assert!(matches!(err, ApiError::Input(_)));
    assert_eq!(std::fs::read_to_string(&h.kubeconfig).unwrap(), TWO_CONTEXTS);
}

#[test]
fn test_delete_current_without_answer_is_cancelled() {
    let h = CliHarness::new(TWO_CONTEXTS);
    h.add("a");

    let out = h.run(&["cluster", "delete", &h.id("a"), "--yes"]).unwrap();
    assert_eq!(out, "Deletion cancelled");
    assert_eq!(std::fs::read_to_string(&h.kubeconfig).unwrap(), TWO_CONTEXTS);
    assert_eq!(h.listed_ids(), vec![h.id("a")]);
    assert!(h.notifier.messages().is_empty());
}

#[test]
fn test_delete_reports_lock_conflict() {
    let h = CliHarness::new(&two_contexts_current("b"));
    h.add("a");
    let lock = clusterdeck::lock::LockManager::lock_path_for(&h.kubeconfig);
    std::fs::write(&lock, b"").unwrap();

    let err = h
        .run(&["cluster", "delete", &h.id("a"), "--yes"])
        .unwrap_err();
    assert!(matches!(err, ApiError::DeletionAborted { .. }));
    assert_eq!(
        h.notifier.messages(),
        vec!["Cannot remove cluster, failed to acquire lock file. Already held.".to_string()]
    );
    assert_eq!(h.listed_ids(), vec![h.id("a")]);
}

#[test]
fn test_delete_unknown_cluster() {
    let h = CliHarness::new(TWO_CONTEXTS);
    let err = h
        .run(&["cluster", "delete", "0123456789abcdef", "--yes"])
        .unwrap_err();
    assert!(matches!(err, ApiError::ClusterNotFound(_)));
    assert!(clusterdeck::cli::map_error(&err).contains("cluster list"));
}

#[test]
fn test_hotbar_pin_requires_registered_cluster() {
    let h = CliHarness::new(TWO_CONTEXTS);
    let err = h.run(&["hotbar", "pin", "0123456789abcdef"]).unwrap_err();
    assert!(matches!(err, ApiError::ClusterNotFound(_)));

    h.add("a");
    let a = h.id("a");
    h.run(&["hotbar", "pin", &a, "--hotbar", "work"]).unwrap();
    let again = h.run(&["hotbar", "pin", &a, "--hotbar", "work"]).unwrap();
    assert!(again.contains("already pinned"));

    let out = h
        .run(&["hotbar", "list", "--hotbar", "work", "--format", "json"])
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["work"][0]["context"], "a");

    h.run(&["hotbar", "unpin", &a, "--hotbar", "work"]).unwrap();
    assert_eq!(
        h.run(&["hotbar", "list"]).unwrap(),
        "No pinned clusters."
    );
}

#[test]
fn test_cluster_being_deleted_is_listed_and_cannot_be_pinned() {
    let h = CliHarness::new(TWO_CONTEXTS);
    h.add("a");
    h.add("b");
    let a = h.id("a");

    let ctx = h.context();
    ctx.registry()
        .write()
        .set_deleting(&clusterdeck::cluster::ClusterId::new(a.as_str()));

    let out = h.run_in(&ctx, &["cluster", "list", "--format", "json"]).unwrap();
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    let flagged: Vec<(String, bool)> = value
        .as_array()
        .unwrap()
        .iter()
        .map(|v| {
            (
                v["context"].as_str().unwrap().to_string(),
                v["deleting"].as_bool().unwrap(),
            )
        })
        .collect();
    assert!(flagged.contains(&("a".to_string(), true)));
    assert!(flagged.contains(&("b".to_string(), false)));

    let err = h.run_in(&ctx, &["hotbar", "pin", &a]).unwrap_err();
    assert!(matches!(err, ApiError::Input(_)));
    assert!(ctx.hotbars().items(clusterdeck::hotbar::DEFAULT_HOTBAR).is_empty());

    // Another invocation has no deletion in flight.
    h.run(&["hotbar", "pin", &a]).unwrap();
}

#[test]
fn test_add_from_separate_invocations_survives_delete() {
    let h = CliHarness::new(&two_contexts_current("b"));
    h.add("a");

    // Loaded before "b" was registered by another invocation.
    let stale = h.context();
    h.add("b");

    h.run_in(&stale, &["cluster", "delete", &h.id("a"), "--yes"])
        .unwrap();

    assert_eq!(h.listed_ids(), vec![h.id("b")]);
}
