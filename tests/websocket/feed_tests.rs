use chrono::Utc;
use std::sync::Arc;

use skillzbloom_backend::cache::DailyTaskCache;
use skillzbloom_backend::db::enums::{AvailableTime, LearningPath};
use skillzbloom_backend::roadmap::instantiate::instantiate;
use skillzbloom_backend::roadmap::{MemoryRoadmapStore, RoadmapAction, TemplateCatalog};
use skillzbloom_backend::services::context::RequestContext;
use skillzbloom_backend::services::roadmap_service::RoadmapService;
use skillzbloom_backend::websocket::feed::{RoadmapEvent, RoadmapFeed};

fn service() -> RoadmapService {
    RoadmapService::new(
        Arc::new(MemoryRoadmapStore::new()),
        RoadmapFeed::default(),
        DailyTaskCache::disabled(),
        3,
    )
}

fn roadmap() -> skillzbloom_backend::db::models::roadmap::Roadmap {
    let catalog = TemplateCatalog::embedded().unwrap();
    instantiate(
        catalog.get(LearningPath::Technology).unwrap(),
        LearningPath::Technology,
        AvailableTime::Minutes15To30,
        "Become a backend engineer",
        Utc::now(),
    )
}

#[tokio::test]
async fn test_every_session_of_a_user_sees_updates() {
    let svc = service();
    let doc = roadmap();
    let task = doc.phases[0].modules[0].tasks[0].name.clone();
    svc.install("multi_tab", &doc).await.unwrap();

    let mut tab_a = svc.feed().subscribe("multi_tab").await;
    let mut tab_b = svc.feed().subscribe("multi_tab").await;
    assert_eq!(svc.feed().subscriber_count("multi_tab").await, 2);

    let update = svc
        .perform(&RequestContext::new("multi_tab"), RoadmapAction::CompleteTask { task_name: task })
        .await
        .unwrap();

    for rx in [&mut tab_a, &mut tab_b] {
        match rx.recv().await.unwrap() {
            RoadmapEvent::Updated(roadmap) => assert_eq!(roadmap, update.roadmap),
            other => panic!("unexpected event {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_updates_are_scoped_to_their_user() {
    let svc = service();
    let doc = roadmap();
    let task = doc.phases[0].modules[0].tasks[0].name.clone();
    svc.install("owner", &doc).await.unwrap();
    svc.install("bystander", &doc).await.unwrap();

    let mut bystander = svc.feed().subscribe("bystander").await;
    svc.perform(&RequestContext::new("owner"), RoadmapAction::CompleteTask { task_name: task })
        .await
        .unwrap();

    assert!(bystander.try_recv().is_err());
}

#[tokio::test]
async fn test_events_serialize_with_type_tag() {
    let frame = serde_json::to_value(RoadmapEvent::Deleted).unwrap();
    assert_eq!(frame["type"], "deleted");

    let frame = serde_json::to_value(RoadmapEvent::Error {
        message: "Failed to save progress. Check your connection.".into(),
    })
    .unwrap();
    assert_eq!(frame["type"], "error");
    assert_eq!(frame["data"]["message"], "Failed to save progress. Check your connection.");

    let frame = serde_json::to_value(RoadmapEvent::Snapshot(roadmap())).unwrap();
    assert_eq!(frame["type"], "snapshot");
    assert!(frame["data"]["phases"].is_array());
}
