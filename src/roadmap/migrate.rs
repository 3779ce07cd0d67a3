//! One-time upgrade of legacy roadmap documents.
//!
//! Older documents kept the phase list under `roadmap`, used camelCase
//! top-level keys and `module_status` / `task_status` for nested progress.
//! The canonical shape stores phases under `phases` with a plain `status`.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::db::models::roadmap::Roadmap;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("roadmap document is not a JSON object")]
    NotAnObject,
    #[error("roadmap document has no phase list")]
    MissingPhases,
    #[error("roadmap document is invalid after upgrade: {0}")]
    Invalid(#[from] serde_json::Error),
}

const TOP_LEVEL_RENAMES: [(&str, &str); 6] = [
    ("planTitle", "title"),
    ("careerGoal", "career_goal"),
    ("learningPath", "learning_path"),
    ("availableTime", "available_time"),
    ("currentPhaseId", "current_phase_id"),
    ("createdAt", "created_at"),
];

const DROPPED_KEYS: [&str; 1] = ["totalPhases"];

/// Rewrites a stored document into the canonical shape.
/// Returns the document and whether anything changed.
pub fn upgrade_document(mut doc: Value, now: DateTime<Utc>) -> Result<(Value, bool), MigrationError> {
    let map = doc.as_object_mut().ok_or(MigrationError::NotAnObject)?;
    let mut changed = false;

    // `roadmap` was the list written at onboarding and always wins
    if let Some(phases) = map.remove("roadmap") {
        map.insert("phases".to_string(), phases);
        changed = true;
    }
    if !map.get("phases").is_some_and(Value::is_array) {
        return Err(MigrationError::MissingPhases);
    }

    for (from, to) in TOP_LEVEL_RENAMES {
        changed |= rename_key(map, from, to);
    }
    for key in DROPPED_KEYS {
        changed |= map.remove(key).is_some();
    }

    if !map.contains_key("last_updated") {
        map.insert("last_updated".to_string(), Value::String(now.to_rfc3339()));
        changed = true;
    }
    if !map.contains_key("created_at") {
        let created = map
            .get("last_updated")
            .cloned()
            .unwrap_or_else(|| Value::String(now.to_rfc3339()));
        map.insert("created_at".to_string(), created);
        changed = true;
    }
    if !map.contains_key("title") {
        map.insert("title".to_string(), Value::String("Learning Roadmap".to_string()));
        changed = true;
    }

    if let Some(Value::Array(phases)) = map.get_mut("phases") {
        for phase in phases.iter_mut().filter_map(Value::as_object_mut) {
            changed |= phase.remove("progress_percent").is_some();
            let Some(Value::Array(modules)) = phase.get_mut("modules") else {
                continue;
            };
            for module in modules.iter_mut().filter_map(Value::as_object_mut) {
                changed |= rename_key(module, "module_status", "status");
                let Some(Value::Array(tasks)) = module.get_mut("tasks") else {
                    continue;
                };
                for task in tasks.iter_mut().filter_map(Value::as_object_mut) {
                    changed |= rename_key(task, "task_status", "status");
                }
            }
        }
    }

    Ok((doc, changed))
}

/// Upgrades and parses in one step, used by the migration binary to prove
/// the rewritten document is loadable before it is written back.
pub fn upgrade_and_parse(doc: Value, now: DateTime<Utc>) -> Result<(Roadmap, bool), MigrationError> {
    let (doc, changed) = upgrade_document(doc, now)?;
    let roadmap = serde_json::from_value(doc)?;
    Ok((roadmap, changed))
}

fn rename_key(map: &mut Map<String, Value>, from: &str, to: &str) -> bool {
    match map.remove(from) {
        Some(value) => {
            map.entry(to.to_string()).or_insert(value);
            true
        }
        None => false,
    }
}
