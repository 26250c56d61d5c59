//! Routes on a single review: edit, delete and vote.

use crate::auth::Actor;
use crate::helpers::{
    ApiError, ApiResult, AppConfig, bad_request_error, forbidden_error, get_connection, map_error,
};
use karma_common::db_util::{self, PgPool};
use karma_common::validation::ReviewInput;
use karma_common::votes::VoteAction;
use karma_common::{ReviewRecord, StudentRecord, VoteCount, VoteValue};
use rocket::State;
use rocket::serde::Serialize;
use rocket::serde::json::Json;

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct VoteOutcome {
    pub action: VoteAction,
    pub votes: VoteCount,
}

struct ReviewContext {
    review: ReviewRecord,
    student: StudentRecord,
}

fn load_review(
    conn: &mut db_util::PgPooledConnection,
    review_id: u32,
) -> Result<ReviewContext, ApiError> {
    let review = db_util::get_review_by_id(conn, review_id).map_err(|e| map_error(&e))?;
    let student = db_util::get_student_by_id(conn, review.student_id).map_err(|e| map_error(&e))?;
    Ok(ReviewContext { review, student })
}

fn is_author(actor: &Actor, review: &ReviewRecord) -> bool {
    actor
        .staff
        .as_ref()
        .is_some_and(|s| s.staff_id == review.staff_id)
}

/// Replace a review's text and rating. Only the author may edit, and only once.
#[put("/reviews/<review_id>", data = "<input>")]
pub fn edit_review(
    actor: Actor,
    pool: &State<PgPool>,
    config: &State<AppConfig>,
    review_id: u32,
    input: Json<ReviewInput>,
) -> ApiResult<ReviewRecord> {
    let mut conn = get_connection(pool)?;
    let ctx = load_review(&mut conn, review_id)?;
    if !is_author(&actor, &ctx.review) {
        return Err(forbidden_error("Only the author may edit a review."));
    }
    db_util::edit_review(&mut conn, &config.karma, review_id, &input)
        .map(Json)
        .map_err(|e| map_error(&e))
}

#[delete("/reviews/<review_id>")]
pub fn delete_review(
    actor: Actor,
    pool: &State<PgPool>,
    config: &State<AppConfig>,
    review_id: u32,
) -> ApiResult<ReviewRecord> {
    let mut conn = get_connection(pool)?;
    let ctx = load_review(&mut conn, review_id)?;
    if !is_author(&actor, &ctx.review) && !actor.is_admin_of(ctx.student.school_id) {
        return Err(forbidden_error(
            "Only the author or a school administrator may delete a review.",
        ));
    }
    db_util::delete_review(&mut conn, &config.karma, review_id)
        .map(Json)
        .map_err(|e| map_error(&e))
}

/// Vote a review up or down. Casting the same vote again withdraws it.
#[post("/reviews/<review_id>/vote/<value>")]
pub fn vote(
    actor: Actor,
    pool: &State<PgPool>,
    config: &State<AppConfig>,
    review_id: u32,
    value: &str,
) -> ApiResult<VoteOutcome> {
    let cast: VoteValue = value
        .parse()
        .map_err(|e: anyhow::Error| bad_request_error(e.to_string()))?;
    let mut conn = get_connection(pool)?;
    let ctx = load_review(&mut conn, review_id)?;
    let voter = actor.require_staff_of(ctx.student.school_id)?;
    let (action, votes) = db_util::cast_vote(&mut conn, &config.karma, voter, review_id, cast)
        .map_err(|e| map_error(&e))?;
    Ok(Json(VoteOutcome { action, votes }))
}
