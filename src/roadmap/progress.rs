use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::models::roadmap::{Phase, ProgressStatus, Roadmap, Task};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSummary {
    /// Completed share of all tasks, one decimal place
    pub overall_progress: f64,
    pub completed_tasks: usize,
    pub total_tasks: usize,
    pub completed_modules: usize,
    pub total_modules: usize,
    pub completed_phases: usize,
    pub total_phases: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseProgress {
    pub phase_id: String,
    pub title: String,
    pub status: ProgressStatus,
    pub percent: u32,
    pub estimated_end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoadmapProgress {
    pub summary: ProgressSummary,
    pub phases: Vec<PhaseProgress>,
}

/// Tasks to focus on today. Cached per user, hence `Deserialize`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTasks {
    pub career_goal: String,
    pub phase_id: Option<String>,
    pub phase_title: Option<String>,
    pub module_name: Option<String>,
    pub tasks: Vec<Task>,
    pub roadmap_completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletedPhase {
    pub phase_id: String,
    pub title: String,
    pub completed_at: Option<DateTime<Utc>>,
    pub modules: usize,
    pub tasks: usize,
}

pub fn summarize(roadmap: &Roadmap) -> ProgressSummary {
    let modules = roadmap.phases.iter().flat_map(|p| &p.modules);
    let total_modules = modules.clone().count();
    let completed_modules = modules
        .filter(|m| m.status == ProgressStatus::Completed)
        .count();

    let total_tasks: usize = roadmap.phases.iter().map(Phase::total_tasks).sum();
    let completed_tasks: usize = roadmap.phases.iter().map(Phase::completed_tasks).sum();

    ProgressSummary {
        overall_progress: one_decimal_percent(completed_tasks, total_tasks),
        completed_tasks,
        total_tasks,
        completed_modules,
        total_modules,
        completed_phases: roadmap.completed_phases().count(),
        total_phases: roadmap.phases.len(),
    }
}

fn one_decimal_percent(done: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (done as f64 / total as f64 * 1000.0).round() / 10.0
}

/// 100 for a completed phase, otherwise the floored share of completed tasks.
pub fn phase_percent(phase: &Phase) -> u32 {
    if phase.status == ProgressStatus::Completed {
        return 100;
    }
    let total = phase.total_tasks();
    if total == 0 {
        return 0;
    }
    (phase.completed_tasks() * 100 / total) as u32
}

pub fn roadmap_progress(roadmap: &Roadmap) -> RoadmapProgress {
    RoadmapProgress {
        summary: summarize(roadmap),
        phases: roadmap
            .phases
            .iter()
            .map(|p| PhaseProgress {
                phase_id: p.id.clone(),
                title: p.title.clone(),
                status: p.status,
                percent: phase_percent(p),
                estimated_end_date: p.estimated_end_date,
            })
            .collect(),
    }
}

/// Pending tasks of the first unfinished module in the active phase.
pub fn daily_tasks(roadmap: &Roadmap, limit: usize) -> DailyTasks {
    let mut view = DailyTasks {
        career_goal: roadmap.career_goal.clone(),
        phase_id: None,
        phase_title: None,
        module_name: None,
        tasks: Vec::new(),
        roadmap_completed: roadmap.is_complete(),
    };

    let Some(phase) = roadmap.active_phase() else {
        return view;
    };
    view.phase_id = Some(phase.id.clone());
    view.phase_title = Some(phase.title.clone());

    if let Some(module) = phase.current_module() {
        view.module_name = Some(module.name.clone());
        view.tasks = module
            .tasks
            .iter()
            .filter(|t| t.is_pending())
            .take(limit)
            .cloned()
            .collect();
    }

    view
}

pub fn completed_phases(roadmap: &Roadmap) -> Vec<CompletedPhase> {
    roadmap
        .completed_phases()
        .map(|p| CompletedPhase {
            phase_id: p.id.clone(),
            title: p.title.clone(),
            completed_at: p.completed_at,
            modules: p.modules.len(),
            tasks: p.total_tasks(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::enums::{AvailableTime, LearningPath};
    use crate::roadmap::instantiate::instantiate;
    use crate::roadmap::progression::{RoadmapAction, apply};
    use crate::roadmap::templates::TemplateCatalog;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 10, 12, 0, 0).unwrap()
    }

    fn creative() -> Roadmap {
        let catalog = TemplateCatalog::embedded().unwrap();
        instantiate(
            catalog.get(LearningPath::Creative).unwrap(),
            LearningPath::Creative,
            AvailableTime::Minutes30To60,
            "Become a product designer",
            now(),
        )
    }

    fn complete(r: &Roadmap, name: &str) -> Roadmap {
        apply(
            r,
            &RoadmapAction::CompleteTask {
                task_name: name.to_string(),
            },
            now(),
        )
        .unwrap()
        .roadmap
    }

    #[test]
    fn fresh_roadmap_has_no_progress() {
        let r = creative();
        let summary = summarize(&r);
        assert_eq!(summary.overall_progress, 0.0);
        assert_eq!(summary.total_phases, 3);
        assert_eq!(summary.total_modules, 5);
        assert_eq!(summary.total_tasks, 8);
        assert!(roadmap_progress(&r).phases.iter().all(|p| p.percent == 0));
    }

    #[test]
    fn overall_progress_rounds_to_one_decimal() {
        let r = complete(&creative(), "Critique 3 website layouts");
        let summary = summarize(&r);
        assert_eq!(summary.completed_tasks, 1);
        assert_eq!(summary.completed_phases, 1);
        assert_eq!(summary.completed_modules, 1);
        // 1 / 8
        assert_eq!(summary.overall_progress, 12.5);

        let r = complete(&r, "Identify Typeface Families");
        // 2 / 8
        assert_eq!(summarize(&r).overall_progress, 25.0);
        // phase 2 holds 4 tasks, 1 done
        assert_eq!(phase_percent(&r.phases[1]), 25);
        assert_eq!(phase_percent(&r.phases[0]), 100);
    }

    #[test]
    fn phase_percent_floors() {
        let mut r = creative();
        let phase = &mut r.phases[1];
        phase.modules[0].tasks[0].status = ProgressStatus::Completed;
        phase.modules[0].tasks[0].completed_on = Some(now());
        assert_eq!(phase_percent(&r.phases[1]), 25);

        // 1 of 3
        r.phases[1].modules[1].tasks.truncate(1);
        assert_eq!(phase_percent(&r.phases[1]), 33);

        r.phases[1].modules.clear();
        assert_eq!(phase_percent(&r.phases[1]), 0);
    }

    #[test]
    fn daily_tasks_come_from_the_first_unfinished_module() {
        let r = creative();
        let today = daily_tasks(&r, 3);
        assert_eq!(today.phase_id.as_deref(), Some("crea_foundation"));
        assert_eq!(today.module_name.as_deref(), Some("Visual Hierarchy"));
        assert_eq!(today.tasks.len(), 1);

        let r = complete(&r, "Critique 3 website layouts");
        let today = daily_tasks(&r, 1);
        assert_eq!(today.phase_id.as_deref(), Some("crea_typography"));
        assert_eq!(today.module_name.as_deref(), Some("Typography Basics"));
        assert_eq!(today.tasks.len(), 1);
        assert_eq!(today.tasks[0].name, "Identify Typeface Families");
        assert!(!today.roadmap_completed);
    }

    #[test]
    fn daily_tasks_include_started_tasks() {
        let r = creative();
        let r = complete(&r, "Critique 3 website layouts");
        let started = apply(
            &r,
            &RoadmapAction::StartTask {
                task_name: "Create a Typographic Poster".into(),
            },
            now(),
        )
        .unwrap()
        .roadmap;
        let today = daily_tasks(&started, 3);
        assert_eq!(today.tasks.len(), 2);
        assert_eq!(today.tasks[1].status, ProgressStatus::Active);
    }

    #[test]
    fn history_lists_completed_phases() {
        let r = complete(&creative(), "Critique 3 website layouts");
        let history = completed_phases(&r);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].phase_id, "crea_foundation");
        assert_eq!(history[0].completed_at, Some(now()));
    }
}
