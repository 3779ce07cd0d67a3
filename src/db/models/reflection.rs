use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::db::enums::Mood;
use crate::validation::rules::validate_not_blank;

#[derive(Queryable, Selectable, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[diesel(table_name = crate::schema::reflections)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Reflection {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub mood: Mood,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::reflections)]
pub struct NewReflection {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub mood: Mood,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(AsChangeset, Default, Debug)]
#[diesel(table_name = crate::schema::reflections)]
pub struct ReflectionChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub mood: Option<Mood>,
    pub tags: Option<Vec<String>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Tags arrive either as a list or as one comma-separated string.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum TagsInput {
    List(Vec<String>),
    Text(String),
}

#[derive(Deserialize, Validate, Debug, Clone)]
pub struct CreateReflectionRequest {
    #[validate(
        length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"),
        custom(function = "validate_not_blank")
    )]
    pub title: String,

    #[validate(
        length(min = 1, message = "Content is required"),
        custom(function = "validate_not_blank")
    )]
    pub content: String,

    #[serde(default)]
    pub mood: Mood,

    pub tags: Option<TagsInput>,
}

#[derive(Deserialize, Validate, Debug, Clone, Default)]
pub struct UpdateReflectionRequest {
    #[validate(
        length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"),
        custom(function = "validate_not_blank")
    )]
    pub title: Option<String>,

    #[validate(custom(function = "validate_not_blank"))]
    pub content: Option<String>,

    pub mood: Option<Mood>,
    pub tags: Option<TagsInput>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct ReflectionQuery {
    pub search: Option<String>,
    pub mood: Option<Mood>,
    pub limit: Option<i64>,
}
