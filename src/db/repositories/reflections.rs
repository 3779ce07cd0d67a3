use diesel::prelude::*;
use uuid::Uuid;

use crate::db::models::reflection::{NewReflection, Reflection, ReflectionChanges, ReflectionQuery};

pub struct ReflectionRepo;

impl ReflectionRepo {
    /// Newest first, optionally filtered by mood and a case-insensitive
    /// search over title, content and tags.
    pub fn list(
        conn: &mut PgConnection,
        uid: &str,
        query: &ReflectionQuery,
    ) -> Result<Vec<Reflection>, diesel::result::Error> {
        use crate::schema::reflections::dsl::*;

        let mut q = reflections
            .filter(user_id.eq(uid))
            .select(Reflection::as_select())
            .into_boxed();

        if let Some(m) = query.mood {
            q = q.filter(mood.eq(m));
        }

        if let Some(term) = query.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = format!("%{}%", term);
            let tag = term.to_lowercase();
            q = q.filter(
                title
                    .ilike(pattern.clone())
                    .or(content.ilike(pattern))
                    .or(tags.contains(vec![tag])),
            );
        }

        if let Some(n) = query.limit {
            q = q.limit(n);
        }

        q.order(created_at.desc()).load(conn)
    }

    pub fn latest(conn: &mut PgConnection, uid: &str, n: i64) -> Result<Vec<Reflection>, diesel::result::Error> {
        use crate::schema::reflections::dsl::*;
        reflections
            .filter(user_id.eq(uid))
            .order(created_at.desc())
            .limit(n)
            .select(Reflection::as_select())
            .load(conn)
    }

    pub fn find(conn: &mut PgConnection, uid: &str, reflection_id: Uuid) -> Result<Option<Reflection>, diesel::result::Error> {
        use crate::schema::reflections::dsl::*;
        reflections
            .filter(id.eq(reflection_id))
            .filter(user_id.eq(uid))
            .select(Reflection::as_select())
            .first(conn)
            .optional()
    }

    pub fn insert(conn: &mut PgConnection, new_reflection: &NewReflection) -> Result<Reflection, diesel::result::Error> {
        diesel::insert_into(crate::schema::reflections::table)
            .values(new_reflection)
            .returning(Reflection::as_returning())
            .get_result(conn)
    }

    pub fn update(
        conn: &mut PgConnection,
        uid: &str,
        reflection_id: Uuid,
        changes: &ReflectionChanges,
    ) -> Result<Option<Reflection>, diesel::result::Error> {
        use crate::schema::reflections::dsl::*;
        diesel::update(reflections.filter(id.eq(reflection_id)).filter(user_id.eq(uid)))
            .set(changes)
            .returning(Reflection::as_returning())
            .get_result(conn)
            .optional()
    }

    pub fn delete(conn: &mut PgConnection, uid: &str, reflection_id: Uuid) -> Result<usize, diesel::result::Error> {
        use crate::schema::reflections::dsl::*;
        diesel::delete(reflections.filter(id.eq(reflection_id)).filter(user_id.eq(uid))).execute(conn)
    }

    pub fn delete_all(conn: &mut PgConnection, uid: &str) -> Result<usize, diesel::result::Error> {
        use crate::schema::reflections::dsl::*;
        diesel::delete(reflections.filter(user_id.eq(uid))).execute(conn)
    }
}
