// Request payloads as the client sends them, decoded then validated

use serde_json::json;
use validator::Validate;

use skillzbloom_backend::db::enums::{AvailableTime, LearningPath, Mood};
use skillzbloom_backend::db::models::reflection::CreateReflectionRequest;
use skillzbloom_backend::db::models::skill::{CreateSkillRequest, UpdateSkillRequest};
use skillzbloom_backend::db::models::user::{OnboardingRequest, UpdateProfileRequest};
use skillzbloom_backend::validation::onboarding::validate_onboarding;
use skillzbloom_backend::validation::profile::validate_update_profile;
use skillzbloom_backend::validation::reflection::parse_tags;
use skillzbloom_backend::validation::skill::{clean_projects, validate_update_skill};

#[test]
fn onboarding_payload_decodes_and_validates() {
    let req: OnboardingRequest = serde_json::from_value(json!({
        "full_name": "Grace Hopper",
        "age": 34,
        "education_level": "professional",
        "learning_path": "personal-dev",
        "available_time": "120-plus",
        "career_goal": "Lead a compiler team"
    }))
    .unwrap();

    assert_eq!(req.learning_path, LearningPath::PersonalDev);
    assert_eq!(req.available_time, AvailableTime::Minutes120Plus);
    assert!(validate_onboarding(&req).is_ok());
}

#[test]
fn onboarding_rejects_unknown_path_and_bad_age() {
    let unknown = serde_json::from_value::<OnboardingRequest>(json!({
        "full_name": "Grace Hopper",
        "age": 34,
        "education_level": "professional",
        "learning_path": "astrology",
        "available_time": "30-60",
        "career_goal": "Lead a compiler team"
    }));
    assert!(unknown.is_err());

    let req: OnboardingRequest = serde_json::from_value(json!({
        "full_name": "Grace Hopper",
        "age": 0,
        "education_level": "professional",
        "learning_path": "technology",
        "available_time": "30-60",
        "career_goal": "Lead a compiler team"
    }))
    .unwrap();
    let err = validate_onboarding(&req).unwrap_err();
    assert!(err.to_string().contains("Age must be between 1 and 120"));
}

#[test]
fn profile_update_checks_picture_url_and_goal() {
    let req = UpdateProfileRequest {
        profile_picture: Some("not a url".into()),
        ..Default::default()
    };
    assert!(validate_update_profile(&req).is_err());

    let req = UpdateProfileRequest {
        career_goal: Some("tiny".into()),
        ..Default::default()
    };
    assert!(validate_update_profile(&req).is_err());

    let req = UpdateProfileRequest {
        username: Some("grace_h".into()),
        profile_picture: Some("https://img.example.com/g.png".into()),
        ..Default::default()
    };
    assert!(validate_update_profile(&req).is_ok());
}

#[test]
fn reflection_accepts_comma_separated_tags_and_defaults_mood() {
    let req: CreateReflectionRequest = serde_json::from_value(json!({
        "title": "First week",
        "content": "Finished the HTTP module.",
        "tags": "http, rust ,"
    }))
    .unwrap();

    assert_eq!(req.mood, Mood::Neutral);
    assert!(req.validate().is_ok());
    assert_eq!(parse_tags(req.tags.as_ref()), vec!["http", "rust"]);
}

#[test]
fn reflection_rejects_blank_content() {
    let req: CreateReflectionRequest = serde_json::from_value(json!({
        "title": "Blank",
        "content": "   ",
        "mood": "great"
    }))
    .unwrap();
    assert!(req.validate().is_err());
}

#[test]
fn skill_payloads() {
    let req: CreateSkillRequest = serde_json::from_value(json!({
        "name": "SQL",
        "category": "Technical",
        "projects": [" reporting ", ""]
    }))
    .unwrap();
    assert!(req.validate().is_ok());
    assert_eq!(req.proficiency, None);
    assert_eq!(clean_projects(&req.projects), vec!["reporting"]);

    let bad: CreateSkillRequest = serde_json::from_value(json!({ "name": "SQL", "proficiency": 0 })).unwrap();
    assert!(bad.validate().is_err());

    let update = UpdateSkillRequest {
        notes: Some("Window functions".into()),
        ..Default::default()
    };
    assert!(validate_update_skill(&update).is_ok());
}
