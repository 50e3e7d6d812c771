use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Map, Value};

const NODE_TYPE_SUSPEND: &str = "Suspend";
const PHASE_RUNNING: &str = "Running";
const PHASE_SUCCEEDED: &str = "Succeeded";

/// Compute the JSON merge patch that resumes `workflow`.
///
/// `workflow` is the object body (`spec`, `status`, ...). A suspended
/// workflow (`spec.suspend: true`) gets the flag cleared, and every suspend
/// node still running is marked succeeded as of `now`. Returns `None` when
/// the workflow has nothing to resume.
pub fn resume_patch(workflow: &Value, now: DateTime<Utc>) -> Option<Value> {
    let mut patch = Map::new();

    if workflow.pointer("/spec/suspend").and_then(Value::as_bool) == Some(true) {
        patch.insert("spec".into(), json!({ "suspend": null }));
    }

    let finished_at = now.to_rfc3339_opts(SecondsFormat::Secs, true);
    let nodes: Map<String, Value> = workflow
        .pointer("/status/nodes")
        .and_then(Value::as_object)
        .into_iter()
        .flatten()
        .filter(|(_, node)| is_active_suspend_node(node))
        .map(|(id, _)| {
            (
                id.clone(),
                json!({ "phase": PHASE_SUCCEEDED, "finishedAt": finished_at }),
            )
        })
        .collect();
    if !nodes.is_empty() {
        patch.insert("status".into(), json!({ "nodes": nodes }));
    }

    if patch.is_empty() {
        None
    } else {
        Some(Value::Object(patch))
    }
}

fn is_active_suspend_node(node: &Value) -> bool {
    node.get("type").and_then(Value::as_str) == Some(NODE_TYPE_SUSPEND)
        && node.get("phase").and_then(Value::as_str) == Some(PHASE_RUNNING)
}
