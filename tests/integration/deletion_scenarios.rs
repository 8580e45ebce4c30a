//! End-to-end deletion flows against real files, a persisted registry and the
//! in-process registry server.

use crate::integration::test_utils::{two_contexts_current, DeletionFixture, ONE_CONTEXT, TWO_CONTEXTS};
use clusterdeck::deletion::{
    DeleteError, DeletionOutcome, DeletionState, PresetResolver, ReassignmentDecision,
};
use clusterdeck::hotbar::DEFAULT_HOTBAR;
use clusterdeck::kubeconfig::{
    ConfigFileStore, FileAccessError, FsConfigFileStore, KubeConfig, ReassignmentChoice,
};
use std::io;
use std::path::Path;
use std::sync::Arc;

fn parsed(raw: &str) -> KubeConfig {
    KubeConfig::parse(raw).unwrap()
}

#[tokio::test]
async fn test_current_context_reassigned_to_selection() {
    let fx = DeletionFixture::new(TWO_CONTEXTS, &["a", "b"]);
    let a = fx.record("a");
    fx.hotbars.pin(DEFAULT_HOTBAR, &a.id).unwrap();

    let report = fx
        .delete(
            "a",
            PresetResolver::Choose(ReassignmentChoice::Context("b".to_string())),
        )
        .await;

    assert!(matches!(
        report.outcome,
        DeletionOutcome::Committed {
            reassignment: ReassignmentDecision::SetTo(ref name)
        } if name == "b"
    ));
    let doc = parsed(&fx.file());
    assert_eq!(doc.context_names(), vec!["b"]);
    assert_eq!(doc.current_context(), Some("b"));

    // Untouched sections survive the rewrite.
    let raw = fx.file();
    assert!(raw.contains("https://two.example:6443"));
    assert!(raw.contains("token: two"));
    assert!(raw.contains("namespace: apps"));

    // Registry, its persisted copy and the hotbar all dropped the cluster.
    assert!(fx.registry.read().get(&a.id).is_none());
    assert!(!fx.registry.read().is_deleting(&a.id));
    let persisted: Vec<String> = fx
        .persisted_records()
        .into_iter()
        .map(|r| r.context_name)
        .collect();
    assert_eq!(persisted, vec!["b".to_string()]);
    assert!(fx.hotbars.items(DEFAULT_HOTBAR).is_empty());

    assert!(!fx.lock_path().exists());
    assert!(fx.notifier.messages().is_empty());
}

#[tokio::test]
async fn test_non_current_context_deleted_without_prompt() {
    let fx = DeletionFixture::new(&two_contexts_current("b"), &["a", "b"]);

    // A cancelling resolver would abort if it were consulted.
    let report = fx.delete("a", PresetResolver::Cancel).await;

    assert!(report.is_committed());
    assert!(!report.trace.visited(DeletionState::NeedsReassignment));
    assert!(report.trace.visited(DeletionState::Resolved));
    let doc = parsed(&fx.file());
    assert_eq!(doc.context_names(), vec!["b"]);
    assert_eq!(doc.current_context(), Some("b"));
}

#[tokio::test]
async fn test_last_context_leaves_current_context_dangling() {
    let fx = DeletionFixture::new(ONE_CONTEXT, &["a"]);

    let report = fx.delete("a", PresetResolver::Cancel).await;

    assert!(matches!(
        report.outcome,
        DeletionOutcome::Committed {
            reassignment: ReassignmentDecision::Unchanged
        }
    ));
    assert!(report.trace.visited(DeletionState::Resolved));
    let doc = parsed(&fx.file());
    assert!(doc.context_names().is_empty());
    // current-context keeps naming the removed context.
    assert_eq!(doc.current_context(), Some("a"));
    assert!(fx.registry.read().is_empty());
}

#[tokio::test]
async fn test_existing_lock_marker_conflicts() {
    let fx = DeletionFixture::new(TWO_CONTEXTS, &["a", "b"]);
    std::fs::write(fx.lock_path(), b"").unwrap();
    let a = fx.record("a");

    let report = fx
        .delete(
            "a",
            PresetResolver::Choose(ReassignmentChoice::Context("b".to_string())),
        )
        .await;

    assert!(matches!(report.error(), Some(DeleteError::LockConflict { .. })));
    assert_eq!(fx.file(), TWO_CONTEXTS);
    assert!(fx.registry.read().get(&a.id).is_some());
    assert!(!fx.registry.read().is_deleting(&a.id));
    // Someone else's marker is not ours to remove.
    assert!(fx.lock_path().exists());
    assert_eq!(
        fx.notifier.messages(),
        vec!["Cannot remove cluster, failed to acquire lock file. Already held.".to_string()]
    );
}

#[tokio::test]
async fn test_lock_directory_in_place_conflicts() {
    let fx = DeletionFixture::new(TWO_CONTEXTS, &["a", "b"]);
    std::fs::create_dir(fx.lock_path()).unwrap();

    let report = fx.delete("b", PresetResolver::Cancel).await;

    assert!(matches!(report.error(), Some(DeleteError::LockConflict { .. })));
    assert_eq!(fx.file(), TWO_CONTEXTS);
}

/// Reports the file as not writable; everything else hits the disk.
struct NoWriteAccessStore;

impl ConfigFileStore for NoWriteAccessStore {
    fn check_access(&self, path: &Path) -> Result<(), FileAccessError> {
        Err(FileAccessError::PermissionDenied {
            path: path.to_path_buf(),
        })
    }

    fn read(&self, path: &Path) -> io::Result<String> {
        FsConfigFileStore::new().read(path)
    }

    fn replace(&self, path: &Path, contents: &str) -> io::Result<()> {
        FsConfigFileStore::new().replace(path, contents)
    }
}

#[tokio::test]
async fn test_permission_denied_reported_before_lock_attempt() {
    let fx = DeletionFixture::new(TWO_CONTEXTS, &["a", "b"]);
    // A held lock would surface as LockConflict if the lock were tried first.
    std::fs::write(fx.lock_path(), b"").unwrap();
    let a = fx.record("a");

    let (coordinator, server) =
        fx.start(Arc::new(PresetResolver::Cancel), Arc::new(NoWriteAccessStore));
    let report = coordinator.delete_cluster(&a.id).await;
    server.shutdown().await;

    assert!(matches!(
        report.error(),
        Some(DeleteError::PermissionDenied { .. })
    ));
    assert!(!fx.registry.read().is_deleting(&a.id));
    assert_eq!(fx.file(), TWO_CONTEXTS);
    let messages = fx.notifier.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("Cannot remove cluster, missing write permissions for "));
}

#[cfg(unix)]
#[tokio::test]
async fn test_read_only_kubeconfig_rejected() {
    use std::os::unix::fs::PermissionsExt;

    let fx = DeletionFixture::new(TWO_CONTEXTS, &["a", "b"]);
    std::fs::set_permissions(&fx.kubeconfig, std::fs::Permissions::from_mode(0o444)).unwrap();
    if std::fs::OpenOptions::new()
        .write(true)
        .open(&fx.kubeconfig)
        .is_ok()
    {
        // Privileged users bypass mode bits; nothing to observe.
        return;
    }

    let report = fx.delete("b", PresetResolver::Cancel).await;

    assert!(matches!(
        report.error(),
        Some(DeleteError::PermissionDenied { .. })
    ));
    assert!(!fx.lock_path().exists());
    assert_eq!(fx.file(), TWO_CONTEXTS);
}

#[tokio::test]
async fn test_cancelled_reassignment_is_pure() {
    let fx = DeletionFixture::new(TWO_CONTEXTS, &["a", "b"]);
    let a = fx.record("a");
    fx.hotbars.pin(DEFAULT_HOTBAR, &a.id).unwrap();
    let before = std::fs::read(&fx.kubeconfig).unwrap();

    let report = fx.delete("a", PresetResolver::Cancel).await;

    assert!(matches!(
        report.outcome,
        DeletionOutcome::Aborted(DeleteError::UserCancelled)
    ));
    assert_eq!(std::fs::read(&fx.kubeconfig).unwrap(), before);
    assert!(!fx.lock_path().exists());
    assert!(fx.registry.read().get(&a.id).is_some());
    assert!(!fx.registry.read().is_deleting(&a.id));
    assert_eq!(fx.hotbars.items(DEFAULT_HOTBAR).len(), 1);
    assert!(fx.notifier.messages().is_empty());
}

#[tokio::test]
async fn test_parse_error_releases_lock_and_flag() {
    let broken = "contexts:\n- context: {cluster: c1}\n";
    let fx = DeletionFixture::new(broken, &["a"]);
    let a = fx.record("a");

    let report = fx.delete("a", PresetResolver::Cancel).await;

    assert!(matches!(report.error(), Some(DeleteError::Parse(_))));
    assert_eq!(fx.file(), broken);
    assert!(!fx.lock_path().exists());
    assert!(!fx.registry.read().is_deleting(&a.id));
    assert!(fx.notifier.messages()[0]
        .starts_with("Cannot remove cluster, failed to process config file. "));
}

/// Accepts everything up to the final write, then fails it.
struct FullDiskStore;

impl ConfigFileStore for FullDiskStore {
    fn check_access(&self, path: &Path) -> Result<(), FileAccessError> {
        FsConfigFileStore::new().check_access(path)
    }

    fn read(&self, path: &Path) -> io::Result<String> {
        FsConfigFileStore::new().read(path)
    }

    fn replace(&self, _path: &Path, _contents: &str) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::Other, "No space left on device"))
    }
}

#[tokio::test]
async fn test_write_failure_keeps_original_file() {
    let fx = DeletionFixture::new(&two_contexts_current("b"), &["a", "b"]);
    let a = fx.record("a");
    let before = fx.file();

    let (coordinator, server) = fx.start(Arc::new(PresetResolver::Cancel), Arc::new(FullDiskStore));
    let report = coordinator.delete_cluster(&a.id).await;
    server.shutdown().await;

    assert!(matches!(
        report.error(),
        Some(DeleteError::WriteFailure { .. })
    ));
    assert_eq!(fx.file(), before);
    assert!(!fx.lock_path().exists());
    assert!(fx.registry.read().get(&a.id).is_some());
    assert!(!fx.registry.read().is_deleting(&a.id));
    assert!(fx.notifier.messages()[0].ends_with("No space left on device"));
}

#[tokio::test]
async fn test_unknown_cluster_is_not_found() {
    let fx = DeletionFixture::new(TWO_CONTEXTS, &["a"]);

    // "b" exists in the file but was never registered.
    let report = fx.delete("b", PresetResolver::Cancel).await;

    assert!(matches!(report.outcome, DeletionOutcome::NotFound));
    assert_eq!(fx.file(), TWO_CONTEXTS);
    assert!(fx.notifier.messages().is_empty());
}

#[tokio::test]
async fn test_unset_choice_drops_current_context() {
    let fx = DeletionFixture::new(TWO_CONTEXTS, &["a", "b"]);

    let report = fx
        .delete("a", PresetResolver::Choose(ReassignmentChoice::Unset))
        .await;

    assert!(report.is_committed());
    let doc = parsed(&fx.file());
    assert_eq!(doc.context_names(), vec!["b"]);
    assert_eq!(doc.current_context(), None);
}

#[tokio::test]
async fn test_sequential_deletions_from_same_file() {
    let fx = DeletionFixture::new(&two_contexts_current("b"), &["a", "b"]);

    assert!(fx.delete("a", PresetResolver::Cancel).await.is_committed());
    assert!(fx.delete("b", PresetResolver::Cancel).await.is_committed());

    let doc = parsed(&fx.file());
    assert!(doc.context_names().is_empty());
    assert!(fx.registry.read().is_empty());
    assert!(fx.persisted_records().is_empty());
}

#[tokio::test]
async fn test_numeric_context_names_are_deletable() {
    let raw = "\
apiVersion: v1
kind: Config
contexts:
- name: 2024
  context:
    cluster: c1
- name: prod
  context:
    cluster: c1
current-context: 2024
";
    let fx = DeletionFixture::new(raw, &["2024", "prod"]);

    let report = fx
        .delete(
            "2024",
            PresetResolver::Choose(ReassignmentChoice::Context("prod".to_string())),
        )
        .await;

    assert!(report.is_committed());
    let doc = parsed(&fx.file());
    assert_eq!(doc.context_names(), vec!["prod"]);
    assert_eq!(doc.current_context(), Some("prod"));
    assert!(fx.registry.read().get(&fx.record("2024").id).is_none());
}

#[tokio::test]
async fn test_numeric_context_survives_deleting_its_neighbour() {
    let raw = "\
contexts:
- name: 2024
  context:
    cluster: c1
- name: prod
  context:
    cluster: c1
current-context: 2024
";
    let fx = DeletionFixture::new(raw, &["2024", "prod"]);

    assert!(fx.delete("prod", PresetResolver::Cancel).await.is_committed());

    let doc = parsed(&fx.file());
    assert_eq!(doc.context_names(), vec!["2024"]);
    assert_eq!(doc.current_context(), Some("2024"));
}

#[tokio::test]
async fn test_commit_keeps_records_added_by_another_process() {
    use clusterdeck::cluster::{ClusterRecord, ClusterRegistry, JsonClusterStorage};

    let fx = DeletionFixture::new(&two_contexts_current("b"), &["a", "b"]);
    let elsewhere = ClusterRecord::new(fx.dir.path().join("other").join("config"), "ops");

    // A second process with its own view of the store registers a cluster
    // after this one loaded the registry.
    let storage = Arc::new(JsonClusterStorage::new(fx.dir.path().join("clusters.json")));
    ClusterRegistry::load(storage)
        .unwrap()
        .add(elsewhere.clone())
        .unwrap();
    assert!(fx.registry.read().get(&elsewhere.id).is_none());

    assert!(fx.delete("a", PresetResolver::Cancel).await.is_committed());

    let mut persisted: Vec<String> = fx
        .persisted_records()
        .into_iter()
        .map(|r| r.context_name)
        .collect();
    persisted.sort();
    assert_eq!(persisted, vec!["b".to_string(), "ops".to_string()]);
    assert!(fx.registry.read().get(&elsewhere.id).is_some());
}

#[tokio::test]
async fn test_purge_keeps_pins_written_by_another_process() {
    use clusterdeck::cluster::ClusterId;
    use clusterdeck::hotbar::HotbarStore;

    let fx = DeletionFixture::new(&two_contexts_current("b"), &["a", "b"]);
    let a = fx.record("a");
    fx.hotbars.pin(DEFAULT_HOTBAR, &a.id).unwrap();

    let other = HotbarStore::open(fx.dir.path().join("hotbar.json")).unwrap();
    let pinned_elsewhere = ClusterId::new("0123456789abcdef");
    other.pin(DEFAULT_HOTBAR, &pinned_elsewhere).unwrap();

    assert!(fx.delete("a", PresetResolver::Cancel).await.is_committed());

    let ids: Vec<ClusterId> = HotbarStore::open(fx.dir.path().join("hotbar.json"))
        .unwrap()
        .items(DEFAULT_HOTBAR)
        .into_iter()
        .map(|i| i.cluster_id)
        .collect();
    assert_eq!(ids, vec![pinned_elsewhere]);
}
