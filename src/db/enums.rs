use diesel::backend::Backend;
use diesel::deserialize::{self, FromSql};
use diesel::pg::Pg;
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use diesel::{AsExpression, FromSqlRow};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::str::FromStr;

/// The five learning tracks a roadmap can be generated for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "kebab-case")]
pub enum LearningPath {
    Technology,
    Communication,
    Business,
    Creative,
    PersonalDev,
}

impl LearningPath {
    pub const ALL: [LearningPath; 5] = [
        LearningPath::Technology,
        LearningPath::Communication,
        LearningPath::Business,
        LearningPath::Creative,
        LearningPath::PersonalDev,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LearningPath::Technology => "technology",
            LearningPath::Communication => "communication",
            LearningPath::Business => "business",
            LearningPath::Creative => "creative",
            LearningPath::PersonalDev => "personal-dev",
        }
    }
}

impl FromStr for LearningPath {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "technology" => Ok(LearningPath::Technology),
            "communication" => Ok(LearningPath::Communication),
            "business" => Ok(LearningPath::Business),
            "creative" => Ok(LearningPath::Creative),
            "personal-dev" => Ok(LearningPath::PersonalDev),
            other => Err(format!("Unknown learning path: {}", other)),
        }
    }
}

impl fmt::Display for LearningPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromSql<Text, Pg> for LearningPath {
    fn from_sql(bytes: <Pg as Backend>::RawValue<'_>) -> deserialize::Result<Self> {
        let s = <String as FromSql<Text, Pg>>::from_sql(bytes)?;
        s.parse().map_err(|_| "Unrecognized enum variant".into())
    }
}

impl ToSql<Text, Pg> for LearningPath {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

/// Weekly time budget bucket chosen during onboarding.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow,
)]
#[diesel(sql_type = Text)]
pub enum AvailableTime {
    #[serde(rename = "15-30")]
    Minutes15To30,
    #[serde(rename = "30-60")]
    Minutes30To60,
    #[serde(rename = "60-120")]
    Minutes60To120,
    #[serde(rename = "120-plus")]
    Minutes120Plus,
}

impl AvailableTime {
    pub fn as_str(&self) -> &'static str {
        match self {
            AvailableTime::Minutes15To30 => "15-30",
            AvailableTime::Minutes30To60 => "30-60",
            AvailableTime::Minutes60To120 => "60-120",
            AvailableTime::Minutes120Plus => "120-plus",
        }
    }
}

impl FromStr for AvailableTime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "15-30" => Ok(AvailableTime::Minutes15To30),
            "30-60" => Ok(AvailableTime::Minutes30To60),
            "60-120" => Ok(AvailableTime::Minutes60To120),
            "120-plus" => Ok(AvailableTime::Minutes120Plus),
            other => Err(format!("Unknown available time: {}", other)),
        }
    }
}

impl FromSql<Text, Pg> for AvailableTime {
    fn from_sql(bytes: <Pg as Backend>::RawValue<'_>) -> deserialize::Result<Self> {
        let s = <String as FromSql<Text, Pg>>::from_sql(bytes)?;
        s.parse().map_err(|_| "Unrecognized enum variant".into())
    }
}

impl ToSql<Text, Pg> for AvailableTime {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "kebab-case")]
pub enum EducationLevel {
    HighSchool,
    Undergraduate,
    Graduate,
    Professional,
}

impl EducationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EducationLevel::HighSchool => "high-school",
            EducationLevel::Undergraduate => "undergraduate",
            EducationLevel::Graduate => "graduate",
            EducationLevel::Professional => "professional",
        }
    }
}

impl FromStr for EducationLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high-school" => Ok(EducationLevel::HighSchool),
            "undergraduate" => Ok(EducationLevel::Undergraduate),
            "graduate" => Ok(EducationLevel::Graduate),
            "professional" => Ok(EducationLevel::Professional),
            other => Err(format!("Unknown education level: {}", other)),
        }
    }
}

impl FromSql<Text, Pg> for EducationLevel {
    fn from_sql(bytes: <Pg as Backend>::RawValue<'_>) -> deserialize::Result<Self> {
        let s = <String as FromSql<Text, Pg>>::from_sql(bytes)?;
        s.parse().map_err(|_| "Unrecognized enum variant".into())
    }
}

impl ToSql<Text, Pg> for EducationLevel {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

/// Mood attached to a reflection entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Great,
    Good,
    Neutral,
    Challenging,
    Difficult,
}

impl Default for Mood {
    fn default() -> Self {
        Mood::Neutral
    }
}

impl FromSql<Text, Pg> for Mood {
    fn from_sql(bytes: <Pg as Backend>::RawValue<'_>) -> deserialize::Result<Self> {
        let s = <String as FromSql<Text, Pg>>::from_sql(bytes)?;
        match s.as_str() {
            "great" => Ok(Mood::Great),
            "good" => Ok(Mood::Good),
            "neutral" => Ok(Mood::Neutral),
            "challenging" => Ok(Mood::Challenging),
            "difficult" => Ok(Mood::Difficult),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

impl ToSql<Text, Pg> for Mood {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            Mood::Great => out.write_all(b"great")?,
            Mood::Good => out.write_all(b"good")?,
            Mood::Neutral => out.write_all(b"neutral")?,
            Mood::Challenging => out.write_all(b"challenging")?,
            Mood::Difficult => out.write_all(b"difficult")?,
        }
        Ok(IsNull::No)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
pub enum SkillCategory {
    Technical,
    #[serde(rename = "Soft Skills")]
    SoftSkills,
    Business,
    Languages,
    Creative,
    Other,
}

impl SkillCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkillCategory::Technical => "Technical",
            SkillCategory::SoftSkills => "Soft Skills",
            SkillCategory::Business => "Business",
            SkillCategory::Languages => "Languages",
            SkillCategory::Creative => "Creative",
            SkillCategory::Other => "Other",
        }
    }
}

impl Default for SkillCategory {
    fn default() -> Self {
        SkillCategory::Technical
    }
}

impl FromSql<Text, Pg> for SkillCategory {
    fn from_sql(bytes: <Pg as Backend>::RawValue<'_>) -> deserialize::Result<Self> {
        let s = <String as FromSql<Text, Pg>>::from_sql(bytes)?;
        match s.as_str() {
            "Technical" => Ok(SkillCategory::Technical),
            "Soft Skills" => Ok(SkillCategory::SoftSkills),
            "Business" => Ok(SkillCategory::Business),
            "Languages" => Ok(SkillCategory::Languages),
            "Creative" => Ok(SkillCategory::Creative),
            "Other" => Ok(SkillCategory::Other),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

impl ToSql<Text, Pg> for SkillCategory {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}
