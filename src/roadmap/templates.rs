use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::db::enums::LearningPath;
use crate::db::models::roadmap::{Difficulty, TaskType};
use crate::error::{AppError, AppResult};

const EMBEDDED_TEMPLATES: &str = include_str!("../../data/templates.json");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskTemplate {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TaskType,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleTemplate {
    pub name: String,
    pub estimated_hours: u32,
    pub tasks: Vec<TaskTemplate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseTemplate {
    pub id: String,
    pub title: String,
    pub duration_weeks: u32,
    pub modules: Vec<ModuleTemplate>,
}

/// Static curriculum for one learning path. Carries no progress state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadmapTemplate {
    pub title: String,
    /// One-line pitch shown when picking a path
    #[serde(default)]
    pub summary: String,
    pub description: String,
    pub phases: Vec<PhaseTemplate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LearningPathSummary {
    pub id: LearningPath,
    pub title: String,
    pub description: String,
    pub phase_count: usize,
    pub total_weeks: u32,
}

/// Read-only catalog of roadmap templates keyed by learning path.
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    templates: HashMap<LearningPath, RoadmapTemplate>,
}

impl TemplateCatalog {
    /// Catalog compiled into the binary from `data/templates.json`.
    pub fn embedded() -> AppResult<Self> {
        Self::from_json(EMBEDDED_TEMPLATES)
    }

    pub fn from_json(raw: &str) -> AppResult<Self> {
        let parsed: HashMap<String, RoadmapTemplate> = serde_json::from_str(raw)
            .map_err(|e| AppError::Config(format!("Invalid roadmap templates: {}", e)))?;

        let mut templates = HashMap::with_capacity(parsed.len());
        for (key, template) in parsed {
            let path: LearningPath = key.parse().map_err(AppError::Config)?;
            validate_template(path, &template)?;
            templates.insert(path, template);
        }

        Ok(Self { templates })
    }

    pub fn get(&self, path: LearningPath) -> AppResult<&RoadmapTemplate> {
        self.templates.get(&path).ok_or_else(|| {
            AppError::Config(format!(
                "No roadmap template for learning path '{}'",
                path
            ))
        })
    }

    pub fn summaries(&self) -> Vec<LearningPathSummary> {
        LearningPath::ALL
            .iter()
            .filter_map(|path| {
                self.templates.get(path).map(|t| LearningPathSummary {
                    id: *path,
                    title: t.title.clone(),
                    description: t.summary.clone(),
                    phase_count: t.phases.len(),
                    total_weeks: t.phases.iter().map(|p| p.duration_weeks).sum(),
                })
            })
            .collect()
    }
}

fn validate_template(path: LearningPath, template: &RoadmapTemplate) -> AppResult<()> {
    if template.phases.is_empty() {
        return Err(AppError::Config(format!(
            "Roadmap template '{}' has no phases",
            path
        )));
    }

    let mut seen = HashSet::new();
    for phase in &template.phases {
        if !seen.insert(phase.id.as_str()) {
            return Err(AppError::Config(format!(
                "Roadmap template '{}' repeats phase id '{}'",
                path, phase.id
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_catalog_covers_every_path() {
        let catalog = TemplateCatalog::embedded().unwrap();
        for path in LearningPath::ALL {
            let template = catalog.get(path).unwrap();
            assert_eq!(template.phases.len(), 3, "{} should have 3 phases", path);
        }

        let tech = catalog.get(LearningPath::Technology).unwrap();
        assert_eq!(tech.title, "Tech Career Accelerator");
        assert_eq!(tech.phases[0].id, "tech_foundation");
        assert_eq!(tech.phases[0].duration_weeks, 4);
        assert_eq!(tech.phases[0].modules[0].tasks[0].kind, TaskType::Practice);
    }

    #[test]
    fn missing_path_is_a_configuration_error() {
        let raw = r#"{
            "business": {
                "title": "Biz",
                "description": "d",
                "phases": [
                    {"id": "b1", "title": "One", "duration_weeks": 2, "modules": []}
                ]
            }
        }"#;
        let catalog = TemplateCatalog::from_json(raw).unwrap();
        assert!(catalog.get(LearningPath::Business).is_ok());
        assert!(matches!(
            catalog.get(LearningPath::Creative),
            Err(AppError::Config(_))
        ));
        assert_eq!(catalog.summaries().len(), 1);
    }

    #[test]
    fn rejects_unknown_paths_and_duplicate_phase_ids() {
        let unknown = r#"{"gardening": {"title": "G", "description": "", "phases": []}}"#;
        assert!(TemplateCatalog::from_json(unknown).is_err());

        let duplicated = r#"{
            "creative": {
                "title": "C",
                "description": "",
                "phases": [
                    {"id": "same", "title": "A", "duration_weeks": 1, "modules": []},
                    {"id": "same", "title": "B", "duration_weeks": 1, "modules": []}
                ]
            }
        }"#;
        assert!(TemplateCatalog::from_json(duplicated).is_err());
    }

    #[test]
    fn summaries_follow_path_order() {
        let catalog = TemplateCatalog::embedded().unwrap();
        let ids: Vec<_> = catalog.summaries().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, LearningPath::ALL.to_vec());
        let tech = &catalog.summaries()[0];
        assert_eq!(tech.total_weeks, 16);
    }
}
