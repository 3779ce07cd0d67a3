use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::db::enums::SkillCategory;
use crate::validation::rules::validate_not_blank;

pub const MIN_PROFICIENCY: i32 = 1;
pub const MAX_PROFICIENCY: i32 = 5;
pub const DEFAULT_PROFICIENCY: i32 = 2;

#[derive(Queryable, Selectable, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[diesel(table_name = crate::schema::skills)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Skill {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: String,
    pub name: String,
    pub proficiency: i32,
    pub category: SkillCategory,
    pub projects: Vec<String>,
    pub notes: String,
    pub endorsements: i32,
    pub last_practiced: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::skills)]
pub struct NewSkill {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub proficiency: i32,
    pub category: SkillCategory,
    pub projects: Vec<String>,
    pub notes: String,
    pub endorsements: i32,
    pub last_practiced: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(AsChangeset, Default, Debug)]
#[diesel(table_name = crate::schema::skills)]
pub struct SkillChanges {
    pub name: Option<String>,
    pub proficiency: Option<i32>,
    pub category: Option<SkillCategory>,
    pub projects: Option<Vec<String>>,
    pub notes: Option<String>,
    pub endorsements: Option<i32>,
    pub last_practiced: Option<DateTime<Utc>>,
}

#[derive(Deserialize, Validate, Debug, Clone)]
pub struct CreateSkillRequest {
    #[validate(
        length(min = 1, max = 100, message = "Skill name must be between 1 and 100 characters"),
        custom(function = "validate_not_blank")
    )]
    pub name: String,

    #[validate(range(min = 1, max = 5, message = "Proficiency must be between 1 and 5"))]
    pub proficiency: Option<i32>,

    pub category: Option<SkillCategory>,

    #[serde(default)]
    pub projects: Vec<String>,

    #[serde(default)]
    pub notes: String,
}

#[derive(Deserialize, Validate, Debug, Clone, Default)]
pub struct UpdateSkillRequest {
    #[validate(
        length(min = 1, max = 100, message = "Skill name must be between 1 and 100 characters"),
        custom(function = "validate_not_blank")
    )]
    pub name: Option<String>,

    #[validate(range(min = 1, max = 5, message = "Proficiency must be between 1 and 5"))]
    pub proficiency: Option<i32>,

    pub category: Option<SkillCategory>,
    pub projects: Option<Vec<String>>,
    pub notes: Option<String>,

    #[validate(range(min = 0, message = "Endorsements cannot be negative"))]
    pub endorsements: Option<i32>,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SkillSort {
    #[default]
    Proficiency,
    Recent,
    Name,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct SkillQuery {
    pub search: Option<String>,
    pub category: Option<SkillCategory>,
    #[serde(default)]
    pub sort: SkillSort,
}
