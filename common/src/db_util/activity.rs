use super::schema::activity;
use super::*;

#[derive(Queryable)]
#[diesel(table_name = activity)]
struct ActivityPrivate {
    id: i32,
    user_id: i32,
    message: String,
    parameter: String,
    created_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = activity)]
struct ActivityPrivateNew<'a> {
    user_id: i32,
    message: &'a str,
    parameter: &'a str,
}

fn private_to_public(p: ActivityPrivate) -> Result<ActivityRecord> {
    Ok(ActivityRecord {
        activity_id: conversions::i32_to_u32(p.id)?,
        user_id: conversions::i32_to_u32(p.user_id)?,
        message: p.message,
        parameter: p.parameter,
        created_at: p.created_at,
    })
}

/// Append a line to a user's activity feed.
pub fn insert_activity(
    conn: &mut PgConnection,
    input_user_id: u32,
    input_message: &str,
    input_parameter: &str,
) -> Result<ActivityRecord> {
    use self::activity::dsl::*;

    let new_row = ActivityPrivateNew {
        user_id: conversions::u32_to_i32(input_user_id)?,
        message: input_message,
        parameter: input_parameter,
    };

    let result = diesel::insert_into(activity)
        .values(&new_row)
        .get_result::<ActivityPrivate>(conn)?;
    private_to_public(result)
}

/// The most recent entries of a user's feed, newest first.
pub fn get_recent_activity(conn: &mut PgConnection, input_user_id: u32, limit: u32) -> Result<Vec<ActivityRecord>> {
    use self::activity::dsl::*;

    let input_user_id = conversions::u32_to_i32(input_user_id)?;

    activity
        .filter(user_id.eq(input_user_id))
        .order((created_at.desc(), id.desc()))
        .limit(i64::from(limit))
        .load::<ActivityPrivate>(conn)?
        .into_iter()
        .map(private_to_public)
        .collect()
}
