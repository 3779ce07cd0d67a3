use chrono::{DateTime, Duration, Utc};

use crate::db::enums::{AvailableTime, LearningPath};
use crate::db::models::roadmap::{Module, Phase, ProgressStatus, Roadmap, Task};
use crate::roadmap::templates::{ModuleTemplate, PhaseTemplate, RoadmapTemplate, TaskTemplate};

/// Scales a phase's template duration to the learner's weekly budget.
///
/// The short bucket stretches by 1.5 without rounding; the long bucket
/// compresses by 0.75 rounded up. The middle buckets keep the template value.
pub fn adjusted_weeks(duration_weeks: u32, available: AvailableTime) -> f64 {
    let base = f64::from(duration_weeks);
    match available {
        AvailableTime::Minutes15To30 => base * 1.5,
        AvailableTime::Minutes120Plus => (base * 0.75).ceil(),
        AvailableTime::Minutes30To60 | AvailableTime::Minutes60To120 => base,
    }
}

/// `now` plus the adjusted number of weeks, truncated to whole days.
pub fn estimated_end_date(now: DateTime<Utc>, weeks: f64) -> DateTime<Utc> {
    let days = (weeks * 7.0).trunc() as i64;
    now + Duration::days(days)
}

/// Builds a fresh, personalized roadmap from a template.
///
/// The first phase starts `active`; every module and task starts
/// `not-started`. Modules activate when the learner first touches them.
pub fn instantiate(
    template: &RoadmapTemplate,
    learning_path: LearningPath,
    available: AvailableTime,
    career_goal: &str,
    now: DateTime<Utc>,
) -> Roadmap {
    let phases: Vec<Phase> = template
        .phases
        .iter()
        .enumerate()
        .map(|(index, phase)| build_phase(phase, index == 0, available, now))
        .collect();

    Roadmap {
        title: template.title.clone(),
        description: template.description.clone(),
        career_goal: career_goal.trim().to_string(),
        learning_path,
        available_time: Some(available),
        current_phase_id: phases.first().map(|p| p.id.clone()),
        created_at: now,
        last_updated: now,
        phases,
    }
}

fn build_phase(
    template: &PhaseTemplate,
    is_first: bool,
    available: AvailableTime,
    now: DateTime<Utc>,
) -> Phase {
    let weeks = adjusted_weeks(template.duration_weeks, available);
    Phase {
        id: template.id.clone(),
        title: template.title.clone(),
        duration_weeks: template.duration_weeks,
        estimated_weeks: weeks,
        estimated_end_date: Some(estimated_end_date(now, weeks)),
        status: if is_first {
            ProgressStatus::Active
        } else {
            ProgressStatus::NotStarted
        },
        completed_at: None,
        modules: template.modules.iter().map(build_module).collect(),
    }
}

fn build_module(template: &ModuleTemplate) -> Module {
    Module {
        name: template.name.clone(),
        estimated_hours: template.estimated_hours,
        status: ProgressStatus::NotStarted,
        tasks: template.tasks.iter().map(build_task).collect(),
    }
}

fn build_task(template: &TaskTemplate) -> Task {
    Task {
        name: template.name.clone(),
        kind: template.kind,
        difficulty: template.difficulty,
        description: template.description.clone(),
        resources: template.resources.clone(),
        status: ProgressStatus::NotStarted,
        completed_on: None,
    }
}
