//! CLI presentation: text and json formatters per command family.

use crate::cluster::{ClusterId, ClusterRecord};
use crate::deletion::{DeletionOutcome, DeletionReport, ReassignmentDecision};
use crate::error::{ApiError, StorageError};
use crate::hotbar::HotbarItem;
use crate::kubeconfig::KubeConfig;
use comfy_table::Table;
use serde_json::json;

fn to_json(value: &serde_json::Value) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ApiError::StorageError(StorageError::InvalidPath(e.to_string())))
}

fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(header);
    table
}

/// `deleting` lists clusters with a deletion in flight.
pub fn format_cluster_list(
    records: &[ClusterRecord],
    deleting: &[ClusterId],
    format: &str,
) -> Result<String, ApiError> {
    if format == "json" {
        let arr: Vec<serde_json::Value> = records
            .iter()
            .map(|r| {
                json!({
                    "id": r.id,
                    "context": r.context_name,
                    "kubeconfig": r.kubeconfig_path,
                    "deleting": deleting.contains(&r.id),
                })
            })
            .collect();
        return to_json(&json!(arr));
    }
    if records.is_empty() {
        return Ok("No clusters registered.".to_string());
    }
    let mut t = table(vec!["ID", "Context", "Kubeconfig", "State"]);
    for r in records {
        let state = if deleting.contains(&r.id) { "deleting" } else { "ready" };
        t.add_row(vec![
            r.id.to_string(),
            r.context_name.clone(),
            r.kubeconfig_path.display().to_string(),
            state.to_string(),
        ]);
    }
    Ok(t.to_string())
}

pub fn format_contexts(doc: &KubeConfig, format: &str) -> Result<String, ApiError> {
    let current = doc.current_context();
    if format == "json" {
        let arr: Vec<serde_json::Value> = doc
            .contexts()
            .iter()
            .map(|c| {
                json!({
                    "name": c.name(),
                    "cluster": c.cluster(),
                    "user": c.user(),
                    "namespace": c.namespace(),
                    "current": current == Some(c.name()),
                })
            })
            .collect();
        return to_json(&json!({ "current_context": current, "contexts": arr }));
    }
    if doc.contexts().is_empty() {
        return Ok("No contexts.".to_string());
    }
    let mut t = table(vec!["", "Name", "Cluster", "User", "Namespace"]);
    for c in doc.contexts() {
        let marker = if current == Some(c.name()) { "*" } else { "" };
        t.add_row(vec![
            marker,
            c.name(),
            c.cluster().unwrap_or("-"),
            c.user().unwrap_or("-"),
            c.namespace().unwrap_or("-"),
        ]);
    }
    Ok(t.to_string())
}

/// One row per pin; `records` resolves ids to context names where known.
pub fn format_hotbars(
    hotbars: &[(String, Vec<HotbarItem>)],
    records: &[ClusterRecord],
    format: &str,
) -> Result<String, ApiError> {
    let context_of = |item: &HotbarItem| {
        records
            .iter()
            .find(|r| r.id == item.cluster_id)
            .map(|r| r.context_name.clone())
    };
    if format == "json" {
        let obj: serde_json::Map<String, serde_json::Value> = hotbars
            .iter()
            .map(|(name, items)| {
                let arr: Vec<serde_json::Value> = items
                    .iter()
                    .map(|i| {
                        json!({
                            "cluster_id": i.cluster_id,
                            "context": context_of(i),
                            "pinned_at": i.pinned_at.to_rfc3339(),
                        })
                    })
                    .collect();
                (name.clone(), json!(arr))
            })
            .collect();
        return to_json(&serde_json::Value::Object(obj));
    }
    if hotbars.iter().all(|(_, items)| items.is_empty()) {
        return Ok("No pinned clusters.".to_string());
    }
    let mut t = table(vec!["Hotbar", "Cluster ID", "Context", "Pinned At"]);
    for (name, items) in hotbars {
        for item in items {
            t.add_row(vec![
                name.clone(),
                item.cluster_id.to_string(),
                context_of(item).unwrap_or_else(|| "(missing)".to_string()),
                item.pinned_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            ]);
        }
    }
    Ok(t.to_string())
}

pub fn format_deletion_report(report: &DeletionReport, record: &ClusterRecord) -> String {
    match &report.outcome {
        DeletionOutcome::Committed { reassignment } => {
            let mut s = format!(
                "Deleted context \"{}\" from {}",
                record.context_name,
                record.kubeconfig_path.display()
            );
            match reassignment {
                ReassignmentDecision::Unchanged => {}
                ReassignmentDecision::Unset => s.push_str("\ncurrent-context unset"),
                ReassignmentDecision::SetTo(name) => {
                    s.push_str(&format!("\ncurrent-context set to \"{}\"", name))
                }
            }
            s
        }
        DeletionOutcome::Aborted(e) if e.is_cancellation() => "Deletion cancelled".to_string(),
        DeletionOutcome::Aborted(e) => format!("Deletion aborted: {}", e),
        DeletionOutcome::NotFound => format!("Cluster not found: {}", report.cluster_id),
    }
}
