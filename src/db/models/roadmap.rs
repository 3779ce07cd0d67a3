use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::enums::{AvailableTime, LearningPath};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ProgressStatus {
    #[default]
    NotStarted,
    Active,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Read,
    Write,
    Practice,
    Project,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// Smallest unit of work in a roadmap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TaskType,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<String>,
    #[serde(default)]
    pub status: ProgressStatus,
    #[serde(default)]
    pub completed_on: Option<DateTime<Utc>>,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.status == ProgressStatus::Completed
    }

    pub fn is_pending(&self) -> bool {
        !self.is_completed()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    pub estimated_hours: u32,
    #[serde(default)]
    pub status: ProgressStatus,
    pub tasks: Vec<Task>,
}

impl Module {
    /// True when every task is completed (vacuously for an empty module).
    pub fn all_tasks_completed(&self) -> bool {
        self.tasks.iter().all(Task::is_completed)
    }

    pub fn completed_tasks(&self) -> usize {
        self.tasks.iter().filter(|t| t.is_completed()).count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    pub id: String,
    pub title: String,
    pub duration_weeks: u32,
    pub estimated_weeks: f64,
    #[serde(default)]
    pub estimated_end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: ProgressStatus,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    pub modules: Vec<Module>,
}

impl Phase {
    pub fn all_tasks_completed(&self) -> bool {
        self.modules.iter().all(Module::all_tasks_completed)
    }

    /// Modules follow the phase: all completed in a completed phase, all
    /// not started in a not-started one. Inside the active phase they form
    /// a completed prefix, at most one active module, then a not-started
    /// suffix.
    fn module_order_violations(&self) -> Vec<String> {
        let expected = match self.status {
            ProgressStatus::Completed => Some(ProgressStatus::Completed),
            ProgressStatus::NotStarted => Some(ProgressStatus::NotStarted),
            ProgressStatus::Active => None,
        };
        if let Some(expected) = expected {
            return self
                .modules
                .iter()
                .filter(|m| m.status != expected)
                .map(|m| format!("module '{}' disagrees with phase {}", m.name, self.id))
                .collect();
        }

        let mut violations = Vec::new();
        let first_open = self
            .modules
            .iter()
            .position(|m| m.status != ProgressStatus::Completed)
            .unwrap_or(self.modules.len());
        let rest = &self.modules[first_open..];
        let tail = match rest.first() {
            Some(m) if m.status == ProgressStatus::Active => &rest[1..],
            _ => rest,
        };
        for module in tail.iter().filter(|m| m.status != ProgressStatus::NotStarted) {
            violations.push(format!(
                "module '{}' in phase {} is out of order",
                module.name, self.id
            ));
        }
        violations
    }

    pub fn total_tasks(&self) -> usize {
        self.modules.iter().map(|m| m.tasks.len()).sum()
    }

    pub fn completed_tasks(&self) -> usize {
        self.modules.iter().map(Module::completed_tasks).sum()
    }

    /// The module the learner is currently working through.
    pub fn current_module(&self) -> Option<&Module> {
        self.modules
            .iter()
            .find(|m| m.status != ProgressStatus::Completed)
    }
}

/// A learner's personalized roadmap, stored as one document per user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roadmap {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub career_goal: String,
    pub learning_path: LearningPath,
    #[serde(default)]
    pub available_time: Option<AvailableTime>,
    #[serde(default)]
    pub current_phase_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub phases: Vec<Phase>,
}

impl Roadmap {
    pub fn active_phase_index(&self) -> Option<usize> {
        self.phases
            .iter()
            .position(|p| p.status == ProgressStatus::Active)
    }

    pub fn active_phase(&self) -> Option<&Phase> {
        self.active_phase_index().map(|i| &self.phases[i])
    }

    pub fn phase_index_by_id(&self, phase_id: &str) -> Option<usize> {
        self.phases.iter().position(|p| p.id == phase_id)
    }

    pub fn is_complete(&self) -> bool {
        !self.phases.is_empty()
            && self
                .phases
                .iter()
                .all(|p| p.status == ProgressStatus::Completed)
    }

    pub fn completed_phases(&self) -> impl Iterator<Item = &Phase> {
        self.phases
            .iter()
            .filter(|p| p.status == ProgressStatus::Completed)
    }

    /// Structural invariants every stored roadmap must satisfy.
    /// Returns one message per violation; empty means consistent.
    pub fn check_invariants(&self) -> Vec<String> {
        let mut violations = Vec::new();

        let active: Vec<usize> = self
            .phases
            .iter()
            .enumerate()
            .filter(|(_, p)| p.status == ProgressStatus::Active)
            .map(|(i, _)| i)
            .collect();
        if active.len() > 1 {
            violations.push(format!("{} phases are active", active.len()));
        }

        match active.first() {
            Some(&idx) => {
                for (i, phase) in self.phases.iter().enumerate() {
                    if i < idx && phase.status != ProgressStatus::Completed {
                        violations.push(format!("phase {} precedes the active phase but is not completed", phase.id));
                    }
                    if i > idx && phase.status != ProgressStatus::NotStarted {
                        violations.push(format!("phase {} follows the active phase but has started", phase.id));
                    }
                }
                if self.current_phase_id.as_deref() != Some(self.phases[idx].id.as_str()) {
                    violations.push("current_phase_id does not point at the active phase".to_string());
                }
            }
            None => {
                // completed prefix followed by a not-started suffix
                let first_open = self
                    .phases
                    .iter()
                    .position(|p| p.status != ProgressStatus::Completed)
                    .unwrap_or(self.phases.len());
                if self.phases[first_open..]
                    .iter()
                    .any(|p| p.status != ProgressStatus::NotStarted)
                {
                    violations.push("phases are out of order".to_string());
                }
                if self.current_phase_id.is_some() {
                    violations.push("current_phase_id is set but no phase is active".to_string());
                }
            }
        }

        for phase in &self.phases {
            if (phase.status == ProgressStatus::Completed) != phase.completed_at.is_some() {
                violations.push(format!("phase {} completed_at disagrees with status", phase.id));
            }
            violations.extend(phase.module_order_violations());
            for module in &phase.modules {
                for task in &module.tasks {
                    if task.is_completed() != task.completed_on.is_some() {
                        violations.push(format!(
                            "task '{}' completed_on disagrees with status",
                            task.name
                        ));
                    }
                }
            }
        }

        violations
    }
}

// Persistence rows: the document itself is stored as JSONB
#[derive(diesel::Queryable, diesel::Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::user_roadmaps)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRoadmapRow {
    pub user_id: String,
    pub document: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(diesel::Insertable)]
#[diesel(table_name = crate::schema::user_roadmaps)]
pub struct NewUserRoadmap<'a> {
    pub user_id: &'a str,
    pub document: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(diesel::Insertable)]
#[diesel(table_name = crate::schema::roadmap_archives)]
pub struct NewRoadmapArchive<'a> {
    pub id: uuid::Uuid,
    pub user_id: &'a str,
    pub document: serde_json::Value,
    pub archived_at: DateTime<Utc>,
}
