use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::db::enums::LearningPath;
use crate::db::models::user::{NewUser, OnboardingChanges, ProfileChanges, User};

pub struct UserRepo;

impl UserRepo {
    pub fn find_by_id(conn: &mut PgConnection, uid: &str) -> Result<Option<User>, diesel::result::Error> {
        use crate::schema::users::dsl::*;
        users
            .filter(id.eq(uid))
            .select(User::as_select())
            .first(conn)
            .optional()
    }

    /// Username taken by someone other than `uid`
    pub fn username_taken(
        conn: &mut PgConnection,
        target_username: &str,
        uid: &str,
    ) -> Result<bool, diesel::result::Error> {
        use crate::schema::users::dsl::*;
        diesel::select(diesel::dsl::exists(
            users.filter(username.eq(target_username)).filter(id.ne(uid)),
        ))
        .get_result(conn)
    }

    /// Inserts the profile row; an existing row is left as is.
    pub fn insert_if_missing(conn: &mut PgConnection, new_user: &NewUser) -> Result<usize, diesel::result::Error> {
        diesel::insert_into(crate::schema::users::table)
            .values(new_user)
            .on_conflict(crate::schema::users::id)
            .do_nothing()
            .execute(conn)
    }

    pub fn update_profile(
        conn: &mut PgConnection,
        uid: &str,
        changes: &ProfileChanges,
    ) -> Result<User, diesel::result::Error> {
        use crate::schema::users::dsl::*;
        diesel::update(users.filter(id.eq(uid)))
            .set(changes)
            .returning(User::as_returning())
            .get_result(conn)
    }

    pub fn complete_onboarding(
        conn: &mut PgConnection,
        uid: &str,
        changes: &OnboardingChanges,
    ) -> Result<User, diesel::result::Error> {
        use crate::schema::users::dsl::*;
        diesel::update(users.filter(id.eq(uid)))
            .set(changes)
            .returning(User::as_returning())
            .get_result(conn)
    }

    pub fn update_preferences(
        conn: &mut PgConnection,
        uid: &str,
        prefs: &serde_json::Value,
        now: DateTime<Utc>,
    ) -> Result<User, diesel::result::Error> {
        use crate::schema::users::dsl::*;
        diesel::update(users.filter(id.eq(uid)))
            .set((preferences.eq(prefs), updated_at.eq(now)))
            .returning(User::as_returning())
            .get_result(conn)
    }

    /// Sets a new path and sends the user back through onboarding.
    pub fn change_learning_path(
        conn: &mut PgConnection,
        uid: &str,
        path: LearningPath,
        now: DateTime<Utc>,
    ) -> Result<User, diesel::result::Error> {
        use crate::schema::users::dsl::*;
        diesel::update(users.filter(id.eq(uid)))
            .set((
                learning_path.eq(Some(path)),
                onboarding_complete.eq(false),
                updated_at.eq(now),
            ))
            .returning(User::as_returning())
            .get_result(conn)
    }

    pub fn reset_onboarding(conn: &mut PgConnection, uid: &str, now: DateTime<Utc>) -> Result<usize, diesel::result::Error> {
        use crate::schema::users::dsl::*;
        diesel::update(users.filter(id.eq(uid)))
            .set((onboarding_complete.eq(false), updated_at.eq(now)))
            .execute(conn)
    }

    pub fn delete(conn: &mut PgConnection, uid: &str) -> Result<usize, diesel::result::Error> {
        use crate::schema::users::dsl::*;
        diesel::delete(users.filter(id.eq(uid))).execute(conn)
    }
}
