use diesel::prelude::*;
use uuid::Uuid;

use crate::db::models::skill::{NewSkill, Skill, SkillChanges, SkillQuery, SkillSort};

pub struct SkillRepo;

impl SkillRepo {
    pub fn list(conn: &mut PgConnection, uid: &str, query: &SkillQuery) -> Result<Vec<Skill>, diesel::result::Error> {
        use crate::schema::skills::dsl::*;

        let mut q = skills
            .filter(user_id.eq(uid))
            .select(Skill::as_select())
            .into_boxed();

        if let Some(cat) = query.category {
            q = q.filter(category.eq(cat));
        }

        if let Some(term) = query.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = format!("%{}%", term);
            q = q.filter(name.ilike(pattern.clone()).or(notes.ilike(pattern)));
        }

        q = match query.sort {
            SkillSort::Proficiency => q.order((proficiency.desc(), name.asc())),
            SkillSort::Recent => q.order(last_practiced.desc()),
            SkillSort::Name => q.order(name.asc()),
        };

        q.load(conn)
    }

    pub fn find(conn: &mut PgConnection, uid: &str, skill_id: Uuid) -> Result<Option<Skill>, diesel::result::Error> {
        use crate::schema::skills::dsl::*;
        skills
            .filter(id.eq(skill_id))
            .filter(user_id.eq(uid))
            .select(Skill::as_select())
            .first(conn)
            .optional()
    }

    pub fn insert(conn: &mut PgConnection, new_skill: &NewSkill) -> Result<Skill, diesel::result::Error> {
        diesel::insert_into(crate::schema::skills::table)
            .values(new_skill)
            .returning(Skill::as_returning())
            .get_result(conn)
    }

    pub fn update(
        conn: &mut PgConnection,
        uid: &str,
        skill_id: Uuid,
        changes: &SkillChanges,
    ) -> Result<Option<Skill>, diesel::result::Error> {
        use crate::schema::skills::dsl::*;
        diesel::update(skills.filter(id.eq(skill_id)).filter(user_id.eq(uid)))
            .set(changes)
            .returning(Skill::as_returning())
            .get_result(conn)
            .optional()
    }

    pub fn delete(conn: &mut PgConnection, uid: &str, skill_id: Uuid) -> Result<usize, diesel::result::Error> {
        use crate::schema::skills::dsl::*;
        diesel::delete(skills.filter(id.eq(skill_id)).filter(user_id.eq(uid))).execute(conn)
    }

    pub fn delete_all(conn: &mut PgConnection, uid: &str) -> Result<usize, diesel::result::Error> {
        use crate::schema::skills::dsl::*;
        diesel::delete(skills.filter(user_id.eq(uid))).execute(conn)
    }
}
