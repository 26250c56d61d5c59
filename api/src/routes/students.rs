//! Student routes: profile, reviews, endorsements and letters.

use crate::auth::Actor;
use crate::helpers::{
    ApiResult, AppConfig, bad_request_error, get_connection, internal_error, map_error,
};
use karma_common::db_util::{self, PgPool};
use karma_common::letter::{self, Letter, LetterRequest};
use karma_common::validation::ReviewInput;
use karma_common::{EndorsementRecord, ReviewRecord, Skill, StudentProfile, StudentRecord};
use rocket::State;
use rocket::serde::Deserialize;
use rocket::serde::json::Json;
use rocket::tokio::task;

#[get("/students/<student_id>")]
pub fn profile(actor: Actor, pool: &State<PgPool>, student_id: u32) -> ApiResult<StudentProfile> {
    let mut conn = get_connection(pool)?;
    let student = db_util::get_student_by_id(&mut conn, student_id).map_err(|e| map_error(&e))?;
    actor.require_member_of(student.school_id)?;
    db_util::get_student_profile(&mut conn, student_id)
        .map(Json)
        .map_err(|e| map_error(&e))
}

#[derive(Debug, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct ActiveFlag {
    pub active: bool,
}

/// Take a student off the roster, or put them back. Inactive students keep their
/// history but leave the leaderboard.
#[put("/students/<student_id>/active", data = "<input>")]
pub fn set_active(
    actor: Actor,
    pool: &State<PgPool>,
    student_id: u32,
    input: Json<ActiveFlag>,
) -> ApiResult<StudentRecord> {
    let mut conn = get_connection(pool)?;
    let student = db_util::get_student_by_id(&mut conn, student_id).map_err(|e| map_error(&e))?;
    actor.require_admin_of(student.school_id)?;
    let updated = db_util::set_student_active(&mut conn, student_id, input.active)
        .map_err(|e| map_error(&e))?;
    tracing::info!(student_id, active = updated.active, "Student roster status changed");
    Ok(Json(updated))
}

#[post("/students/<student_id>/reviews", data = "<input>")]
pub fn create_review(
    actor: Actor,
    pool: &State<PgPool>,
    config: &State<AppConfig>,
    student_id: u32,
    input: Json<ReviewInput>,
) -> ApiResult<ReviewRecord> {
    let mut conn = get_connection(pool)?;
    let student = db_util::get_student_by_id(&mut conn, student_id).map_err(|e| map_error(&e))?;
    let author = actor.require_staff_of(student.school_id)?;
    db_util::insert_review(&mut conn, &config.karma, author, student_id, &input)
        .map(Json)
        .map_err(|e| map_error(&e))
}

/// Flip one skill in the caller's endorsement of a student.
#[post("/students/<student_id>/endorsements/<skill>")]
pub fn toggle_endorsement(
    actor: Actor,
    pool: &State<PgPool>,
    config: &State<AppConfig>,
    student_id: u32,
    skill: &str,
) -> ApiResult<EndorsementRecord> {
    let skill: Skill = skill
        .parse()
        .map_err(|e: anyhow::Error| bad_request_error(e.to_string()))?;
    let mut conn = get_connection(pool)?;
    let student = db_util::get_student_by_id(&mut conn, student_id).map_err(|e| map_error(&e))?;
    let endorser = actor.require_staff_of(student.school_id)?;
    db_util::toggle_endorsement(&mut conn, &config.karma, endorser, student_id, skill)
        .map(Json)
        .map_err(|e| map_error(&e))
}

/// Draft a recommendation letter. The text service is called on the blocking
/// pool, and the template is used whenever it is unavailable.
#[post("/students/<student_id>/letter")]
pub async fn recommendation_letter(
    actor: Actor,
    pool: &State<PgPool>,
    config: &State<AppConfig>,
    student_id: u32,
) -> ApiResult<Letter> {
    let pool = pool.inner().clone();
    let letters = config.letters.clone();

    task::spawn_blocking(move || {
        let mut conn = get_connection(&pool)?;
        let student =
            db_util::get_student_by_id(&mut conn, student_id).map_err(|e| map_error(&e))?;
        actor.require_admin_of(student.school_id)?;
        let school =
            db_util::get_school_by_id(&mut conn, student.school_id).map_err(|e| map_error(&e))?;
        let profile =
            db_util::get_student_profile(&mut conn, student_id).map_err(|e| map_error(&e))?;

        let request = LetterRequest {
            student_name: profile.student.name,
            school_name: school.name,
            author_name: actor.user.full_name(),
            karma: profile.karma,
            top_qualities: profile.top_qualities,
        };
        let drafted = letter::generate(&letters, &request);
        tracing::info!(student_id, source = ?drafted.source, "Letter drafted");
        Ok(Json(drafted))
    })
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Letter task failed");
        internal_error("The letter could not be drafted.")
    })?
}
