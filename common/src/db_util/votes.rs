use super::schema::votes;
use super::*;

#[derive(Queryable)]
#[diesel(table_name = votes)]
struct VotePrivate {
    id: i32,
    staff_id: i32,
    review_id: i32,
    value: String,
    time: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = votes)]
struct VotePrivateNew {
    staff_id: i32,
    review_id: i32,
    value: String,
}

fn private_to_public(p: VotePrivate) -> Result<VoteRecord> {
    use conversions::*;
    Ok(VoteRecord {
        vote_id: i32_to_u32(p.id)?,
        staff_id: i32_to_u32(p.staff_id)?,
        review_id: i32_to_u32(p.review_id)?,
        value: deserialize_vote_value(&p.value)?,
        time: p.time,
    })
}

pub fn get_vote(conn: &mut PgConnection, voter: &StaffRecord, input_review_id: u32) -> Result<Option<VoteRecord>> {
    use self::votes::dsl::*;

    votes
        .filter(staff_id.eq(conversions::u32_to_i32(voter.staff_id)?))
        .filter(review_id.eq(conversions::u32_to_i32(input_review_id)?))
        .first::<VotePrivate>(conn)
        .optional()?
        .map(private_to_public)
        .transpose()
}

pub fn get_votes_for_reviews(conn: &mut PgConnection, review_ids: &[u32]) -> Result<Vec<VoteRecord>> {
    use self::votes::dsl::*;

    if review_ids.is_empty() {
        return Ok(Vec::new());
    }
    let review_ids = conversions::ids_to_i32(review_ids)?;

    votes
        .filter(review_id.eq_any(review_ids))
        .load::<VotePrivate>(conn)?
        .into_iter()
        .map(private_to_public)
        .collect()
}

pub fn get_vote_count(conn: &mut PgConnection, input_review_id: u32) -> Result<VoteCount> {
    let review_votes = get_votes_for_reviews(conn, &[input_review_id])?;
    Ok(crate::votes::count(&review_votes))
}

/// Cast, replace or clear a staff member's vote on a review and recompute the
/// karma of the reviewed student. Returns what happened and the new tally.
pub fn cast_vote(
    conn: &mut PgConnection,
    weights: &KarmaWeights,
    voter: &StaffRecord,
    input_review_id: u32,
    cast: VoteValue,
) -> Result<(VoteAction, VoteCount)> {
    use self::votes::dsl::*;

    conn.transaction::<_, anyhow::Error, _>(|conn| {
        let review = get_review_by_id(conn, input_review_id)?;
        if review.deleted {
            return Err(ValidationError::ReviewDeleted.into());
        }

        let existing = get_vote(conn, voter, input_review_id)?;
        let action = crate::votes::resolve(existing.as_ref().map(|v| v.value), cast);

        match (action, existing) {
            (VoteAction::Insert(new_value), _) => {
                diesel::insert_into(votes)
                    .values(&VotePrivateNew {
                        staff_id: conversions::u32_to_i32(voter.staff_id)?,
                        review_id: conversions::u32_to_i32(input_review_id)?,
                        value: conversions::serialize_vote_value(new_value),
                    })
                    .execute(conn)?;
            }
            (VoteAction::Replace(new_value), Some(current)) => {
                diesel::update(votes.filter(id.eq(conversions::u32_to_i32(current.vote_id)?)))
                    .set((
                        value.eq(conversions::serialize_vote_value(new_value)),
                        time.eq(Utc::now()),
                    ))
                    .execute(conn)?;
            }
            (VoteAction::Clear, Some(current)) => {
                diesel::delete(votes.filter(id.eq(conversions::u32_to_i32(current.vote_id)?)))
                    .execute(conn)?;
            }
            (_, None) => return Err(anyhow!("Vote action {action:?} without an existing vote")),
        }

        recompute_karma(conn, weights, review.student_id)?;
        if let VoteAction::Insert(_) = action {
            let author = get_staff_by_id(conn, review.staff_id)?;
            insert_activity(
                conn,
                author.user_id,
                "Someone voted on your review",
                &review.review_id.to_string(),
            )?;
        }
        debug!(
            "Staff #{} {action:?} on review #{input_review_id}",
            voter.staff_id
        );

        Ok((action, get_vote_count(conn, input_review_id)?))
    })
}
