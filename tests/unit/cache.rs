use skillzbloom_backend::cache::DailyTaskCache;
use skillzbloom_backend::cache::redis::{delete_cache, get_cache, set_cache};
use skillzbloom_backend::roadmap::progress::DailyTasks;

#[tokio::test]
#[ignore = "requires running server"]
async fn test_cache_round_trip_and_delete() {
    let client = redis::Client::open("redis://127.0.0.1/").unwrap();
    set_cache(&client, "test", &"value", 10).await.unwrap();
    let value: Option<String> = get_cache(&client, "test").await.unwrap();
    assert_eq!(value, Some("value".to_string()));

    delete_cache(&client, "test").await.unwrap();
    let value: Option<String> = get_cache(&client, "test").await.unwrap();
    assert_eq!(value, None);
}

#[tokio::test]
#[ignore = "requires running server"]
async fn test_daily_task_cache_invalidation() {
    let client = redis::Client::open("redis://127.0.0.1/").unwrap();
    let cache = DailyTaskCache::new(client, 60);
    let view = DailyTasks {
        career_goal: "Ship a side project".into(),
        phase_id: Some("phase-1".into()),
        phase_title: Some("Foundations".into()),
        module_name: None,
        tasks: vec![],
        roadmap_completed: false,
    };

    cache.set("cache_test_user", &view).await;
    assert_eq!(cache.get("cache_test_user").await, Some(view));
    cache.invalidate("cache_test_user").await;
    assert_eq!(cache.get("cache_test_user").await, None);
}

#[tokio::test]
async fn test_unreachable_redis_degrades_to_miss() {
    // nothing listens on port 1
    let client = redis::Client::open("redis://127.0.0.1:1/").unwrap();
    let cache = DailyTaskCache::new(client, 60);
    assert_eq!(cache.get("u1").await, None);
    cache.invalidate("u1").await;
}
