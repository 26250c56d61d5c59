//! School-level routes: creation, roster and leaderboard.

use crate::auth::Actor;
use crate::helpers::{ApiResult, AppConfig, get_connection, map_error};
use karma_common::db_util::{self, PgPool};
use karma_common::leaderboard::LeaderboardEntry;
use karma_common::roster::ImportSummary;
use karma_common::{SchoolRecord, StudentRecord};
use rocket::State;
use rocket::serde::Deserialize;
use rocket::serde::json::Json;

#[derive(Debug, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct NewSchool {
    pub name: String,
}

#[post("/schools", data = "<input>")]
pub fn create_school(
    actor: Actor,
    pool: &State<PgPool>,
    input: Json<NewSchool>,
) -> ApiResult<SchoolRecord> {
    actor.require_superuser()?;
    let mut conn = get_connection(pool)?;
    let school = db_util::insert_school(&mut conn, &input.name).map_err(|e| map_error(&e))?;
    tracing::info!(school_id = school.school_id, name = %school.name, "School created");
    Ok(Json(school))
}

#[get("/schools/<school_id>/students?<include_inactive>")]
pub fn list_students(
    actor: Actor,
    pool: &State<PgPool>,
    school_id: u32,
    include_inactive: Option<bool>,
) -> ApiResult<Vec<StudentRecord>> {
    actor.require_member_of(school_id)?;
    let mut conn = get_connection(pool)?;
    let active_only = !include_inactive.unwrap_or(false);
    db_util::get_students_in_school(&mut conn, school_id, active_only)
        .map(Json)
        .map_err(|e| map_error(&e))
}

/// Add a list of student names to the school's roster.
#[post("/schools/<school_id>/students/import", data = "<names>")]
pub fn import_roster(
    actor: Actor,
    pool: &State<PgPool>,
    config: &State<AppConfig>,
    school_id: u32,
    names: Json<Vec<String>>,
) -> ApiResult<ImportSummary> {
    actor.require_admin_of(school_id)?;
    let mut conn = get_connection(pool)?;
    db_util::import_students(&mut conn, &config.karma, school_id, &names)
        .map(Json)
        .map_err(|e| map_error(&e))
}

#[get("/schools/<school_id>/leaderboard")]
pub fn leaderboard(
    actor: Actor,
    pool: &State<PgPool>,
    school_id: u32,
) -> ApiResult<Vec<LeaderboardEntry>> {
    actor.require_member_of(school_id)?;
    let mut conn = get_connection(pool)?;
    db_util::get_leaderboard(&mut conn, school_id)
        .map(Json)
        .map_err(|e| map_error(&e))
}
