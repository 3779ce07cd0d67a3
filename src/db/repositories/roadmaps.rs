use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::db::models::roadmap::{NewRoadmapArchive, NewUserRoadmap, UserRoadmapRow};

pub struct RoadmapRepo;

impl RoadmapRepo {
    pub fn find_by_user(
        conn: &mut PgConnection,
        uid: &str,
    ) -> Result<Option<UserRoadmapRow>, diesel::result::Error> {
        use crate::schema::user_roadmaps::dsl::*;
        user_roadmaps
            .filter(user_id.eq(uid))
            .select(UserRoadmapRow::as_select())
            .first(conn)
            .optional()
    }

    pub fn list_all(conn: &mut PgConnection) -> Result<Vec<UserRoadmapRow>, diesel::result::Error> {
        use crate::schema::user_roadmaps::dsl::*;
        user_roadmaps
            .order(user_id.asc())
            .select(UserRoadmapRow::as_select())
            .load(conn)
    }

    /// Full-document write; the previous document is replaced wholesale.
    pub fn upsert(
        conn: &mut PgConnection,
        row: &NewUserRoadmap,
    ) -> Result<usize, diesel::result::Error> {
        use crate::schema::user_roadmaps::dsl::*;
        diesel::insert_into(user_roadmaps)
            .values(row)
            .on_conflict(user_id)
            .do_update()
            .set((document.eq(&row.document), updated_at.eq(row.updated_at)))
            .execute(conn)
    }

    pub fn update_document(
        conn: &mut PgConnection,
        uid: &str,
        doc: &serde_json::Value,
        at: DateTime<Utc>,
    ) -> Result<usize, diesel::result::Error> {
        use crate::schema::user_roadmaps::dsl::*;
        diesel::update(user_roadmaps.filter(user_id.eq(uid)))
            .set((document.eq(doc), updated_at.eq(at)))
            .execute(conn)
    }

    pub fn delete(conn: &mut PgConnection, uid: &str) -> Result<usize, diesel::result::Error> {
        use crate::schema::user_roadmaps::dsl::*;
        diesel::delete(user_roadmaps.filter(user_id.eq(uid))).execute(conn)
    }

    pub fn insert_archive(
        conn: &mut PgConnection,
        archive: &NewRoadmapArchive,
    ) -> Result<usize, diesel::result::Error> {
        diesel::insert_into(crate::schema::roadmap_archives::table)
            .values(archive)
            .execute(conn)
    }

    pub fn count_archives(conn: &mut PgConnection, uid: &str) -> Result<i64, diesel::result::Error> {
        use crate::schema::roadmap_archives::dsl::*;
        roadmap_archives
            .filter(user_id.eq(uid))
            .count()
            .get_result(conn)
    }

    pub fn delete_archives(conn: &mut PgConnection, uid: &str) -> Result<usize, diesel::result::Error> {
        use crate::schema::roadmap_archives::dsl::*;
        diesel::delete(roadmap_archives.filter(user_id.eq(uid))).execute(conn)
    }
}
