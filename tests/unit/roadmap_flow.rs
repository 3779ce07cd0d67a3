use chrono::Utc;
use std::sync::Arc;

use skillzbloom_backend::cache::DailyTaskCache;
use skillzbloom_backend::db::enums::{AvailableTime, EducationLevel, LearningPath};
use skillzbloom_backend::db::models::api::error_codes;
use skillzbloom_backend::db::models::roadmap::{ProgressStatus, Roadmap};
use skillzbloom_backend::db::models::user::OnboardingRequest;
use skillzbloom_backend::roadmap::{MemoryRoadmapStore, Outcome, RoadmapAction, RoadmapStore, TemplateCatalog};
use skillzbloom_backend::services::context::RequestContext;
use skillzbloom_backend::services::onboarding_service::OnboardingService;
use skillzbloom_backend::services::roadmap_service::RoadmapService;
use skillzbloom_backend::websocket::feed::{RoadmapEvent, RoadmapFeed};

fn onboarding(path: LearningPath) -> OnboardingRequest {
    OnboardingRequest {
        full_name: "Ada Lovelace".into(),
        age: 28,
        education_level: EducationLevel::Graduate,
        learning_path: path,
        available_time: AvailableTime::Minutes60To120,
        career_goal: "Become a backend engineer".into(),
    }
}

fn fresh_roadmap(path: LearningPath) -> Roadmap {
    let catalog = TemplateCatalog::embedded().unwrap();
    OnboardingService::build_roadmap(&catalog, &onboarding(path), Utc::now()).unwrap()
}

fn service(store: Arc<MemoryRoadmapStore>, daily_limit: usize) -> RoadmapService {
    RoadmapService::new(store, RoadmapFeed::default(), DailyTaskCache::disabled(), daily_limit)
}

#[tokio::test]
async fn test_every_path_can_be_completed_through_daily_tasks() {
    for path in LearningPath::ALL {
        let store = Arc::new(MemoryRoadmapStore::new());
        let svc = service(store.clone(), 3);
        let user = format!("walker_{}", path.as_str());
        let ctx = RequestContext::new(user.clone());
        let doc = fresh_roadmap(path);
        let total_tasks: usize = doc.phases.iter().map(|p| p.total_tasks()).sum();
        svc.install(&user, &doc).await.unwrap();

        let mut completed = 0;
        let mut finished = false;
        while !finished {
            let today = svc.today(&ctx).await.unwrap();
            assert!(!today.tasks.is_empty(), "{}: no tasks offered before completion", path);
            assert!(today.tasks.len() <= 3);

            let update = svc
                .perform(
                    &ctx,
                    RoadmapAction::CompleteTask {
                        task_name: today.tasks[0].name.clone(),
                    },
                )
                .await
                .unwrap();
            completed += 1;
            assert!(
                update.roadmap.check_invariants().is_empty(),
                "{}: {:?}",
                path,
                update.roadmap.check_invariants()
            );
            finished = update.roadmap_completed;
            assert!(completed <= total_tasks, "{}: walked past the last task", path);
        }

        assert_eq!(completed, total_tasks);
        let stored = store.load(&user).await.unwrap().unwrap();
        assert!(stored.is_complete());
        assert_eq!(stored.current_phase_id, None);
        assert_eq!(svc.history(&ctx).await.unwrap().len(), stored.phases.len());

        let today = svc.today(&ctx).await.unwrap();
        assert!(today.roadmap_completed);
        assert!(today.tasks.is_empty());
    }
}

#[tokio::test]
async fn test_last_task_of_a_phase_advances_to_the_next() {
    let store = Arc::new(MemoryRoadmapStore::new());
    let svc = service(store.clone(), 10);
    let ctx = RequestContext::new("advance_user");
    let doc = fresh_roadmap(LearningPath::Technology);
    let first_phase = doc.phases[0].clone();
    svc.install("advance_user", &doc).await.unwrap();

    let names: Vec<String> = first_phase
        .modules
        .iter()
        .flat_map(|m| m.tasks.iter().map(|t| t.name.clone()))
        .collect();
    let mut last = None;
    for name in names {
        last = Some(
            svc.perform(&ctx, RoadmapAction::CompleteTask { task_name: name })
                .await
                .unwrap(),
        );
    }

    let update = last.unwrap();
    match &update.outcome {
        Outcome::PhaseCompleted { phase, next_phase } => {
            assert_eq!(phase, &first_phase.title);
            assert_eq!(next_phase.as_deref(), Some(doc.phases[1].title.as_str()));
        }
        other => panic!("unexpected outcome {:?}", other),
    }
    assert_eq!(update.roadmap.phases[0].status, ProgressStatus::Completed);
    assert_eq!(update.roadmap.phases[1].status, ProgressStatus::Active);
    assert_eq!(update.roadmap.current_phase_id.as_deref(), Some(doc.phases[1].id.as_str()));
    assert!(!update.roadmap_completed);
}

#[tokio::test]
async fn test_finalize_requires_every_task() {
    let store = Arc::new(MemoryRoadmapStore::new());
    let svc = service(store, 3);
    let ctx = RequestContext::new("finalize_user");
    let doc = fresh_roadmap(LearningPath::Business);
    let phase_id = doc.phases[0].id.clone();
    svc.install("finalize_user", &doc).await.unwrap();

    let err = svc
        .perform(&ctx, RoadmapAction::FinalizePhase { phase_id: phase_id.clone() })
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some(error_codes::PHASE_INCOMPLETE));

    let err = svc
        .perform(&ctx, RoadmapAction::FinalizePhase { phase_id: "no-such-phase".into() })
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some(error_codes::PHASE_NOT_FOUND));
}

#[tokio::test]
async fn test_restart_phase_rewinds_later_progress() {
    let store = Arc::new(MemoryRoadmapStore::new());
    let svc = service(store.clone(), 3);
    let ctx = RequestContext::new("restart_user");
    let doc = fresh_roadmap(LearningPath::Creative);
    svc.install("restart_user", &doc).await.unwrap();

    // finish the first phase, then one task of the second
    for module in &doc.phases[0].modules {
        for task in &module.tasks {
            svc.perform(&ctx, RoadmapAction::CompleteTask { task_name: task.name.clone() })
                .await
                .unwrap();
        }
    }
    let second_task = doc.phases[1].modules[0].tasks[0].name.clone();
    svc.perform(&ctx, RoadmapAction::CompleteTask { task_name: second_task })
        .await
        .unwrap();

    let update = svc
        .perform(&ctx, RoadmapAction::RestartPhase { phase: 0 })
        .await
        .unwrap();
    assert!(matches!(update.outcome, Outcome::PhaseRestarted { .. }));

    let stored = store.load("restart_user").await.unwrap().unwrap();
    assert!(stored.check_invariants().is_empty());
    assert_eq!(stored.phases[0].status, ProgressStatus::Active);
    assert_eq!(stored.phases[0].completed_at, None);
    assert!(stored.phases[0].modules.iter().flat_map(|m| &m.tasks).all(|t| t.is_pending()));
    assert_eq!(stored.phases[1].status, ProgressStatus::NotStarted);
    assert!(stored.phases[1].modules.iter().flat_map(|m| &m.tasks).all(|t| t.is_pending()));
}

#[tokio::test]
async fn test_restart_task_in_a_later_phase_completes_everything_before_it() {
    let store = Arc::new(MemoryRoadmapStore::new());
    let svc = service(store.clone(), 3);
    let ctx = RequestContext::new("jump_user");
    let doc = fresh_roadmap(LearningPath::Communication);
    svc.install("jump_user", &doc).await.unwrap();

    svc.perform(&ctx, RoadmapAction::RestartTask { phase: 1, module: 0, task: 1 })
        .await
        .unwrap();

    let stored = store.load("jump_user").await.unwrap().unwrap();
    assert!(stored.check_invariants().is_empty());
    assert_eq!(stored.phases[0].status, ProgressStatus::Completed);
    assert_eq!(stored.phases[1].status, ProgressStatus::Active);
    let module = &stored.phases[1].modules[0];
    assert!(module.tasks[0].is_completed());
    assert!(module.tasks[1].is_pending());

    let err = svc
        .perform(&ctx, RoadmapAction::RestartTask { phase: 1, module: 0, task: 99 })
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some(error_codes::TASK_NOT_FOUND));
}

#[tokio::test]
async fn test_daily_tasks_respect_limit_and_module() {
    let store = Arc::new(MemoryRoadmapStore::new());
    let svc = service(store, 2);
    let ctx = RequestContext::new("daily_user");
    let doc = fresh_roadmap(LearningPath::Technology);
    svc.install("daily_user", &doc).await.unwrap();

    let today = svc.today(&ctx).await.unwrap();
    let module = &doc.phases[0].modules[0];
    assert_eq!(today.phase_id.as_deref(), Some(doc.phases[0].id.as_str()));
    assert_eq!(today.module_name.as_deref(), Some(module.name.as_str()));
    assert_eq!(today.tasks.len(), module.tasks.len().min(2));
    assert!(today.tasks.iter().all(|t| module.tasks.iter().any(|m| m.name == t.name)));
    assert_eq!(today.career_goal, "Become a backend engineer");
}

#[tokio::test]
async fn test_reset_publishes_deletion() {
    let store = Arc::new(MemoryRoadmapStore::new());
    let svc = service(store, 3);
    let ctx = RequestContext::new("reset_user");
    svc.install("reset_user", &fresh_roadmap(LearningPath::PersonalDev))
        .await
        .unwrap();

    let mut rx = svc.feed().subscribe("reset_user").await;
    assert!(svc.clear("reset_user").await.unwrap());
    assert_eq!(rx.recv().await.unwrap(), RoadmapEvent::Deleted);

    let err = svc.current(&ctx).await.unwrap_err();
    assert_eq!(err.code(), Some(error_codes::ROADMAP_NOT_FOUND));
    assert!(!svc.clear("reset_user").await.unwrap());
}

#[tokio::test]
async fn test_failed_write_publishes_nothing() {
    let store = Arc::new(MemoryRoadmapStore::new());
    let svc = service(store.clone(), 3);
    let ctx = RequestContext::new("offline_user");
    let doc = fresh_roadmap(LearningPath::Technology);
    let task = doc.phases[0].modules[0].tasks[0].name.clone();
    svc.install("offline_user", &doc).await.unwrap();

    let mut rx = svc.feed().subscribe("offline_user").await;
    store.set_fail_writes(true);
    assert!(svc
        .perform(&ctx, RoadmapAction::CompleteTask { task_name: task })
        .await
        .is_err());
    assert!(rx.try_recv().is_err());

    store.set_fail_writes(false);
    assert_eq!(store.load("offline_user").await.unwrap().unwrap(), doc);
}

#[test]
fn test_onboarding_rejects_short_career_goal() {
    let catalog = TemplateCatalog::embedded().unwrap();
    let mut req = onboarding(LearningPath::Technology);
    req.career_goal = "  short  ".into();
    assert!(OnboardingService::build_roadmap(&catalog, &req, Utc::now()).is_err());
}

#[tokio::test]
async fn test_out_of_order_completion_keeps_modules_in_sequence() {
    let store = Arc::new(MemoryRoadmapStore::new());
    let svc = service(store.clone(), 3);
    let ctx = RequestContext::new("skipper");
    let doc = fresh_roadmap(LearningPath::Technology);
    let first = &doc.phases[0];
    svc.install("skipper", &doc).await.unwrap();

    // finish the second module before touching the first
    let update = svc
        .perform(
            &ctx,
            RoadmapAction::CompleteTask {
                task_name: first.modules[1].tasks[0].name.clone(),
            },
        )
        .await
        .unwrap();
    assert!(matches!(update.outcome, Outcome::TaskCompleted { .. }));
    assert!(update.roadmap.check_invariants().is_empty());
    assert_eq!(update.roadmap.phases[0].modules[1].status, ProgressStatus::NotStarted);

    let today = svc.today(&ctx).await.unwrap();
    assert_eq!(today.module_name.as_deref(), Some(first.modules[0].name.as_str()));

    let mut last = None;
    for task in &first.modules[0].tasks {
        last = Some(
            svc.perform(&ctx, RoadmapAction::CompleteTask { task_name: task.name.clone() })
                .await
                .unwrap(),
        );
    }
    let update = last.unwrap();
    assert!(matches!(update.outcome, Outcome::PhaseCompleted { .. }));
    assert!(update.roadmap.check_invariants().is_empty());

    let err = svc
        .perform(
            &ctx,
            RoadmapAction::AdvanceModule { phase: 0, module: 0 },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some(error_codes::PHASE_NOT_ACTIVE));
}

#[tokio::test]
async fn test_actions_on_a_finished_roadmap_report_no_active_phase() {
    let store = Arc::new(MemoryRoadmapStore::new());
    let svc = service(store, 3);
    let ctx = RequestContext::new("graduate");
    let mut doc = fresh_roadmap(LearningPath::Communication);
    let last = doc.phases.len() - 1;
    doc = skillzbloom_backend::roadmap::progression::apply(
        &doc,
        &RoadmapAction::RestartPhase { phase: last },
        Utc::now(),
    )
    .unwrap()
    .roadmap;
    svc.install("graduate", &doc).await.unwrap();
    for module in &doc.phases[last].modules {
        for task in &module.tasks {
            svc.perform(&ctx, RoadmapAction::CompleteTask { task_name: task.name.clone() })
                .await
                .unwrap();
        }
    }

    let err = svc
        .perform(&ctx, RoadmapAction::StartTask { task_name: "anything".into() })
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some(error_codes::NO_ACTIVE_PHASE));
}
