//! Roadmap progression state machine.
//!
//! Every action is applied to an owned copy of the current snapshot. A failed
//! action returns an error and the copy is dropped, so the caller's snapshot
//! is never partially mutated.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::db::models::api::error_codes;
use crate::db::models::roadmap::{Module, Phase, ProgressStatus, Roadmap, Task};
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoadmapAction {
    CompleteTask { task_name: String },
    StartTask { task_name: String },
    AdvanceModule { phase: usize, module: usize },
    FinalizePhase { phase_id: String },
    RestartPhase { phase: usize },
    RestartModule { phase: usize, module: usize },
    RestartTask { phase: usize, module: usize, task: usize },
}

impl RoadmapAction {
    pub fn name(&self) -> &'static str {
        match self {
            RoadmapAction::CompleteTask { .. } => "complete_task",
            RoadmapAction::StartTask { .. } => "start_task",
            RoadmapAction::AdvanceModule { .. } => "advance_module",
            RoadmapAction::FinalizePhase { .. } => "finalize_phase",
            RoadmapAction::RestartPhase { .. } => "restart_phase",
            RoadmapAction::RestartModule { .. } => "restart_module",
            RoadmapAction::RestartTask { .. } => "restart_task",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProgressionError {
    #[error("Phase not found")]
    PhaseNotFound,
    #[error("Module not found")]
    ModuleNotFound,
    #[error("Task not found")]
    TaskNotFound,
    #[error("No phase is currently active")]
    NoActivePhase,
    #[error("Phase '{0}' is not active")]
    PhaseNotActive(String),
    #[error("Complete every task in '{0}' before advancing")]
    ModuleIncomplete(String),
    #[error("Module '{0}' is already completed")]
    ModuleAlreadyCompleted(String),
    #[error("Complete every task in '{0}' before finalizing the phase")]
    PhaseIncomplete(String),
}

impl From<ProgressionError> for AppError {
    fn from(err: ProgressionError) -> Self {
        match err {
            ProgressionError::PhaseNotFound => {
                AppError::not_found_with_code("Phase", error_codes::PHASE_NOT_FOUND)
            }
            ProgressionError::ModuleNotFound => {
                AppError::not_found_with_code("Module", error_codes::MODULE_NOT_FOUND)
            }
            ProgressionError::TaskNotFound => {
                AppError::not_found_with_code("Task", error_codes::TASK_NOT_FOUND)
            }
            ProgressionError::NoActivePhase => {
                AppError::not_found_with_code("Active phase", error_codes::NO_ACTIVE_PHASE)
            }
            ProgressionError::PhaseNotActive(_) => {
                AppError::validation_with_code(err.to_string(), error_codes::PHASE_NOT_ACTIVE)
            }
            ProgressionError::ModuleIncomplete(_) => {
                AppError::validation_with_code(err.to_string(), error_codes::MODULE_INCOMPLETE)
            }
            ProgressionError::ModuleAlreadyCompleted(_) => AppError::validation_with_code(
                err.to_string(),
                error_codes::MODULE_ALREADY_COMPLETED,
            ),
            ProgressionError::PhaseIncomplete(_) => {
                AppError::validation_with_code(err.to_string(), error_codes::PHASE_INCOMPLETE)
            }
        }
    }
}

/// Most significant event produced by an action.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    TaskCompleted {
        task: String,
    },
    ModuleCompleted {
        module: String,
    },
    PhaseCompleted {
        phase: String,
        next_phase: Option<String>,
    },
    TaskStarted {
        task: String,
    },
    PhaseRestarted {
        phase: String,
    },
    ModuleRestarted {
        module: String,
    },
    TaskRestarted {
        task: String,
    },
}

impl Outcome {
    /// User-facing notification text.
    pub fn message(&self) -> String {
        match self {
            Outcome::TaskCompleted { task } => {
                format!("Task completed: {}! Keep the streak going!", task)
            }
            Outcome::ModuleCompleted { module } => {
                format!("Module completed: {}! On to the next one.", module)
            }
            Outcome::PhaseCompleted {
                phase,
                next_phase: Some(next),
            } => format!("Phase completed: {}! Advancing to {}.", phase, next),
            Outcome::PhaseCompleted {
                next_phase: None, ..
            } => "Roadmap completed! Congratulations on finishing every phase!".to_string(),
            Outcome::TaskStarted { task } => format!("Task started: {}", task),
            Outcome::PhaseRestarted { phase } => {
                format!("Phase \"{}\" restarted successfully!", phase)
            }
            Outcome::ModuleRestarted { module } => {
                format!("Module \"{}\" restarted successfully!", module)
            }
            Outcome::TaskRestarted { task } => {
                format!("Task \"{}\" restarted successfully!", task)
            }
        }
    }

    pub fn roadmap_completed(&self) -> bool {
        matches!(self, Outcome::PhaseCompleted { next_phase: None, .. })
    }
}

#[derive(Debug, Clone)]
pub struct Transition {
    pub roadmap: Roadmap,
    pub outcome: Outcome,
}

/// Applies `action` to a copy of `current`. `current` is left untouched.
pub fn apply(
    current: &Roadmap,
    action: &RoadmapAction,
    now: DateTime<Utc>,
) -> Result<Transition, ProgressionError> {
    let mut roadmap = current.clone();
    let outcome = match action {
        RoadmapAction::CompleteTask { task_name } => complete_task(&mut roadmap, task_name, now)?,
        RoadmapAction::StartTask { task_name } => start_task(&mut roadmap, task_name)?,
        RoadmapAction::AdvanceModule { phase, module } => {
            advance_module(&mut roadmap, *phase, *module, now)?
        }
        RoadmapAction::FinalizePhase { phase_id } => finalize_phase(&mut roadmap, phase_id, now)?,
        RoadmapAction::RestartPhase { phase } => restart_phase(&mut roadmap, *phase, now)?,
        RoadmapAction::RestartModule { phase, module } => {
            restart_module(&mut roadmap, *phase, *module, now)?
        }
        RoadmapAction::RestartTask {
            phase,
            module,
            task,
        } => restart_task(&mut roadmap, *phase, *module, *task, now)?,
    };
    roadmap.last_updated = now;
    Ok(Transition { roadmap, outcome })
}

pub fn complete_task(
    roadmap: &mut Roadmap,
    task_name: &str,
    now: DateTime<Utc>,
) -> Result<Outcome, ProgressionError> {
    let phase_idx = roadmap
        .active_phase_index()
        .ok_or(ProgressionError::NoActivePhase)?;
    let (module_idx, task_idx) = find_open_task(&roadmap.phases[phase_idx], task_name)
        .ok_or(ProgressionError::TaskNotFound)?;

    let phase = &mut roadmap.phases[phase_idx];
    let task = &mut phase.modules[module_idx].tasks[task_idx];
    task.status = ProgressStatus::Completed;
    task.completed_on = Some(now);
    let task_name = task.name.clone();

    let finished = settle_modules(phase, Some(module_idx));
    let mut outcome = if finished.contains(&module_idx) {
        Outcome::ModuleCompleted {
            module: phase.modules[module_idx].name.clone(),
        }
    } else {
        Outcome::TaskCompleted { task: task_name }
    };

    if phase.all_tasks_completed() {
        outcome = complete_phase_and_advance(roadmap, phase_idx, now);
    }

    Ok(outcome)
}

pub fn start_task(roadmap: &mut Roadmap, task_name: &str) -> Result<Outcome, ProgressionError> {
    let phase_idx = roadmap
        .active_phase_index()
        .ok_or(ProgressionError::NoActivePhase)?;
    let (module_idx, task_idx) = find_open_task(&roadmap.phases[phase_idx], task_name)
        .ok_or(ProgressionError::TaskNotFound)?;

    let phase = &mut roadmap.phases[phase_idx];
    let task = &mut phase.modules[module_idx].tasks[task_idx];
    task.status = ProgressStatus::Active;
    let task_name = task.name.clone();
    settle_modules(phase, Some(module_idx));

    Ok(Outcome::TaskStarted { task: task_name })
}

pub fn advance_module(
    roadmap: &mut Roadmap,
    phase_idx: usize,
    module_idx: usize,
    now: DateTime<Utc>,
) -> Result<Outcome, ProgressionError> {
    let phase = roadmap
        .phases
        .get(phase_idx)
        .ok_or(ProgressionError::PhaseNotFound)?;
    let module = phase
        .modules
        .get(module_idx)
        .ok_or(ProgressionError::ModuleNotFound)?;

    if phase.status != ProgressStatus::Active {
        return Err(ProgressionError::PhaseNotActive(phase.title.clone()));
    }
    if module.status == ProgressStatus::Completed {
        return Err(ProgressionError::ModuleAlreadyCompleted(module.name.clone()));
    }
    if let Some(open) = phase.modules[..module_idx]
        .iter()
        .find(|m| m.status != ProgressStatus::Completed)
    {
        return Err(ProgressionError::ModuleIncomplete(open.name.clone()));
    }
    if !module.all_tasks_completed() {
        return Err(ProgressionError::ModuleIncomplete(module.name.clone()));
    }

    let phase = &mut roadmap.phases[phase_idx];
    phase.modules[module_idx].status = ProgressStatus::Completed;
    let mut outcome = Outcome::ModuleCompleted {
        module: phase.modules[module_idx].name.clone(),
    };
    settle_modules(phase, None);

    if phase.all_tasks_completed() {
        outcome = complete_phase_and_advance(roadmap, phase_idx, now);
    }

    Ok(outcome)
}

pub fn finalize_phase(
    roadmap: &mut Roadmap,
    phase_id: &str,
    now: DateTime<Utc>,
) -> Result<Outcome, ProgressionError> {
    let phase_idx = roadmap
        .phase_index_by_id(phase_id)
        .ok_or(ProgressionError::PhaseNotFound)?;
    let phase = &roadmap.phases[phase_idx];

    if phase.status != ProgressStatus::Active {
        return Err(ProgressionError::PhaseNotActive(phase.title.clone()));
    }
    if !phase.all_tasks_completed() {
        return Err(ProgressionError::PhaseIncomplete(phase.title.clone()));
    }

    Ok(complete_phase_and_advance(roadmap, phase_idx, now))
}

pub fn restart_phase(
    roadmap: &mut Roadmap,
    phase_idx: usize,
    now: DateTime<Utc>,
) -> Result<Outcome, ProgressionError> {
    let phase = roadmap
        .phases
        .get(phase_idx)
        .ok_or(ProgressionError::PhaseNotFound)?;
    let title = phase.title.clone();

    rewind_to(roadmap, phase_idx, 0, 0, now);
    Ok(Outcome::PhaseRestarted { phase: title })
}

pub fn restart_module(
    roadmap: &mut Roadmap,
    phase_idx: usize,
    module_idx: usize,
    now: DateTime<Utc>,
) -> Result<Outcome, ProgressionError> {
    let module = roadmap
        .phases
        .get(phase_idx)
        .ok_or(ProgressionError::PhaseNotFound)?
        .modules
        .get(module_idx)
        .ok_or(ProgressionError::ModuleNotFound)?;
    let name = module.name.clone();

    rewind_to(roadmap, phase_idx, module_idx, 0, now);
    Ok(Outcome::ModuleRestarted { module: name })
}

pub fn restart_task(
    roadmap: &mut Roadmap,
    phase_idx: usize,
    module_idx: usize,
    task_idx: usize,
    now: DateTime<Utc>,
) -> Result<Outcome, ProgressionError> {
    let task = roadmap
        .phases
        .get(phase_idx)
        .ok_or(ProgressionError::PhaseNotFound)?
        .modules
        .get(module_idx)
        .ok_or(ProgressionError::ModuleNotFound)?
        .tasks
        .get(task_idx)
        .ok_or(ProgressionError::TaskNotFound)?;
    let name = task.name.clone();

    rewind_to(roadmap, phase_idx, module_idx, task_idx, now);
    Ok(Outcome::TaskRestarted { task: name })
}

/// Moves the learner's position back (or forward) to phase `p`, module `m`,
/// task `t`. Indices must already be validated.
///
/// Everything before the position is completed, the containers of the
/// position are active, the position itself and everything after it is
/// not started.
fn rewind_to(roadmap: &mut Roadmap, p: usize, m: usize, t: usize, now: DateTime<Utc>) {
    for (pi, phase) in roadmap.phases.iter_mut().enumerate() {
        if pi < p {
            force_phase_completed(phase, now);
            continue;
        }
        if pi > p {
            reset_phase(phase);
            continue;
        }

        phase.status = ProgressStatus::Active;
        phase.completed_at = None;
        for (mi, module) in phase.modules.iter_mut().enumerate() {
            if mi < m {
                force_module_completed(module, now);
            } else if mi > m {
                reset_module(module);
            } else {
                module.status = ProgressStatus::Active;
                for (ti, task) in module.tasks.iter_mut().enumerate() {
                    if ti < t {
                        force_task_completed(task, now);
                    } else {
                        reset_task(task);
                    }
                }
            }
        }
    }

    roadmap.current_phase_id = Some(roadmap.phases[p].id.clone());
}

fn find_open_task(phase: &Phase, task_name: &str) -> Option<(usize, usize)> {
    phase.modules.iter().enumerate().find_map(|(mi, module)| {
        module
            .tasks
            .iter()
            .position(|t| t.name == task_name && t.is_pending())
            .map(|ti| (mi, ti))
    })
}

/// Re-derives module statuses of the active phase so they stay in order:
/// a completed prefix, at most one active module, then not-started ones.
///
/// A module only completes once every module before it has. The first open
/// module becomes active when it follows a completed module or has been
/// worked on (`touched`, or any task no longer not-started). Returns the
/// indices of modules that completed during this call.
fn settle_modules(phase: &mut Phase, touched: Option<usize>) -> Vec<usize> {
    let mut finished = Vec::new();
    let mut prefix_done = true;

    for (mi, module) in phase.modules.iter_mut().enumerate() {
        if !prefix_done {
            module.status = ProgressStatus::NotStarted;
            continue;
        }
        if module.all_tasks_completed() {
            if module.status != ProgressStatus::Completed {
                module.status = ProgressStatus::Completed;
                finished.push(mi);
            }
            continue;
        }

        prefix_done = false;
        let worked_on = touched == Some(mi)
            || module
                .tasks
                .iter()
                .any(|t| t.status != ProgressStatus::NotStarted);
        if mi > 0 || worked_on || module.status == ProgressStatus::Active {
            module.status = ProgressStatus::Active;
        }
    }

    finished
}

/// Marks the phase and all its modules completed and activates the next
/// phase, if any.
fn complete_phase_and_advance(roadmap: &mut Roadmap, phase_idx: usize, now: DateTime<Utc>) -> Outcome {
    let phase = &mut roadmap.phases[phase_idx];
    for module in phase.modules.iter_mut() {
        module.status = ProgressStatus::Completed;
    }
    phase.status = ProgressStatus::Completed;
    phase.completed_at = Some(now);
    let finished = phase.title.clone();

    let next_phase = match roadmap.phases.get_mut(phase_idx + 1) {
        Some(next) => {
            next.status = ProgressStatus::Active;
            roadmap.current_phase_id = Some(next.id.clone());
            Some(next.title.clone())
        }
        None => {
            roadmap.current_phase_id = None;
            None
        }
    };

    Outcome::PhaseCompleted {
        phase: finished,
        next_phase,
    }
}

fn force_phase_completed(phase: &mut Phase, now: DateTime<Utc>) {
    phase.status = ProgressStatus::Completed;
    phase.completed_at.get_or_insert(now);
    for module in phase.modules.iter_mut() {
        force_module_completed(module, now);
    }
}

fn force_module_completed(module: &mut Module, now: DateTime<Utc>) {
    module.status = ProgressStatus::Completed;
    for task in module.tasks.iter_mut() {
        force_task_completed(task, now);
    }
}

fn force_task_completed(task: &mut Task, now: DateTime<Utc>) {
    task.status = ProgressStatus::Completed;
    task.completed_on.get_or_insert(now);
}

fn reset_phase(phase: &mut Phase) {
    phase.status = ProgressStatus::NotStarted;
    phase.completed_at = None;
    for module in phase.modules.iter_mut() {
        reset_module(module);
    }
}

fn reset_module(module: &mut Module) {
    module.status = ProgressStatus::NotStarted;
    for task in module.tasks.iter_mut() {
        reset_task(task);
    }
}

fn reset_task(task: &mut Task) {
    task.status = ProgressStatus::NotStarted;
    task.completed_on = None;
}
