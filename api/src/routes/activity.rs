use crate::auth::Actor;
use crate::helpers::{ApiResult, get_connection, map_error};
use karma_common::db_util::{self, PgPool};
use karma_common::{ActivityRecord, RECENT_ACTIVITY_LIMIT};
use rocket::State;
use rocket::serde::json::Json;

/// The caller's most recent activity, newest first.
#[get("/activity?<limit>")]
pub fn recent_activity(
    actor: Actor,
    pool: &State<PgPool>,
    limit: Option<u32>,
) -> ApiResult<Vec<ActivityRecord>> {
    let limit = limit.unwrap_or(RECENT_ACTIVITY_LIMIT).min(RECENT_ACTIVITY_LIMIT * 5);
    let mut conn = get_connection(pool)?;
    db_util::get_recent_activity(&mut conn, actor.user.user_id, limit)
        .map(Json)
        .map_err(|e| map_error(&e))
}
