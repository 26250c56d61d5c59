use super::schema::reviews;
use super::*;
use crate::validation::validate_review;
use itertools::Itertools;

#[derive(Queryable)]
#[diesel(table_name = reviews)]
struct ReviewPrivate {
    id: i32,
    staff_id: i32,
    student_id: i32,
    text: String,
    rating: i32,
    is_good: bool,
    created: DateTime<Utc>,
    edited: bool,
    deleted: bool,
}

#[derive(Insertable)]
#[diesel(table_name = reviews)]
struct ReviewPrivateNew {
    staff_id: i32,
    student_id: i32,
    text: String,
    rating: i32,
    is_good: bool,
}

fn private_to_public(p: ReviewPrivate) -> Result<ReviewRecord> {
    use conversions::*;
    Ok(ReviewRecord {
        review_id: i32_to_u32(p.id)?,
        staff_id: i32_to_u32(p.staff_id)?,
        student_id: i32_to_u32(p.student_id)?,
        text: p.text,
        rating: i32_to_u8(p.rating)?,
        is_good: p.is_good,
        created: p.created,
        edited: p.edited,
        deleted: p.deleted,
    })
}

/// Validate and store a new review, then recompute the student's karma.
pub fn insert_review(
    conn: &mut PgConnection,
    weights: &KarmaWeights,
    author: &StaffRecord,
    input_student_id: u32,
    input: &ReviewInput,
) -> Result<ReviewRecord> {
    use self::reviews::dsl::*;

    let valid = validate_review(input)?;
    let new_row = ReviewPrivateNew {
        staff_id: conversions::u32_to_i32(author.staff_id)?,
        student_id: conversions::u32_to_i32(input_student_id)?,
        text: valid.text,
        rating: conversions::u8_to_i32(valid.rating),
        is_good: valid.is_good,
    };

    conn.transaction::<_, anyhow::Error, _>(|conn| {
        let result = diesel::insert_into(reviews)
            .values(&new_row)
            .get_result::<ReviewPrivate>(conn)?;
        let review = private_to_public(result)?;

        let karma = recompute_karma(conn, weights, input_student_id)?;
        insert_activity(
            conn,
            author.user_id,
            "You wrote a review",
            &input_student_id.to_string(),
        )?;
        info!(
            "Review #{} on student #{input_student_id} by staff #{}, karma now {}",
            review.review_id, author.staff_id, karma.score
        );
        Ok(review)
    })
}

/// Replace a review's text and rating. A review can be edited only once.
pub fn edit_review(
    conn: &mut PgConnection,
    weights: &KarmaWeights,
    row_id: u32,
    input: &ReviewInput,
) -> Result<ReviewRecord> {
    use self::reviews::dsl::*;

    let valid = validate_review(input)?;

    conn.transaction::<_, anyhow::Error, _>(|conn| {
        let existing = get_review_by_id(conn, row_id)?;
        if existing.deleted {
            return Err(ValidationError::ReviewDeleted.into());
        }
        if existing.edited {
            return Err(ValidationError::AlreadyEdited.into());
        }

        let result = diesel::update(reviews.filter(id.eq(conversions::u32_to_i32(row_id)?)))
            .set((
                text.eq(&valid.text),
                rating.eq(conversions::u8_to_i32(valid.rating)),
                is_good.eq(valid.is_good),
                edited.eq(true),
            ))
            .get_result::<ReviewPrivate>(conn)?;
        let review = private_to_public(result)?;

        recompute_karma(conn, weights, review.student_id)?;
        let author = get_staff_by_id(conn, review.staff_id)?;
        insert_activity(
            conn,
            author.user_id,
            "You edited a review",
            &review.student_id.to_string(),
        )?;
        Ok(review)
    })
}

/// Soft-delete a review. The student's karma is recomputed without it.
pub fn delete_review(conn: &mut PgConnection, weights: &KarmaWeights, row_id: u32) -> Result<ReviewRecord> {
    use self::reviews::dsl::*;

    conn.transaction::<_, anyhow::Error, _>(|conn| {
        let existing = get_review_by_id(conn, row_id)?;
        if existing.deleted {
            return Err(ValidationError::ReviewDeleted.into());
        }

        let result = diesel::update(reviews.filter(id.eq(conversions::u32_to_i32(row_id)?)))
            .set(deleted.eq(true))
            .get_result::<ReviewPrivate>(conn)?;
        let review = private_to_public(result)?;

        recompute_karma(conn, weights, review.student_id)?;
        let author = get_staff_by_id(conn, review.staff_id)?;
        insert_activity(
            conn,
            author.user_id,
            "Your review was deleted",
            &review.student_id.to_string(),
        )?;
        Ok(review)
    })
}

pub fn get_review_by_id(conn: &mut PgConnection, row_id: u32) -> Result<ReviewRecord> {
    use self::reviews::dsl::*;

    let row_id = conversions::u32_to_i32(row_id)?;

    let result = reviews.filter(id.eq(row_id)).first::<ReviewPrivate>(conn)?;
    private_to_public(result)
}

/// All live reviews of a student, newest first.
pub fn get_reviews_for_student(conn: &mut PgConnection, input_student_id: u32) -> Result<Vec<ReviewRecord>> {
    use self::reviews::dsl::*;

    let input_student_id = conversions::u32_to_i32(input_student_id)?;

    reviews
        .filter(student_id.eq(input_student_id))
        .filter(deleted.eq(false))
        .order(created.desc())
        .load::<ReviewPrivate>(conn)?
        .into_iter()
        .map(private_to_public)
        .collect()
}

/// All live reviews of a student, each with its vote aggregate.
pub fn get_reviews_with_votes_for_student(
    conn: &mut PgConnection,
    input_student_id: u32,
) -> Result<Vec<ReviewWithVotes>> {
    let student_reviews = get_reviews_for_student(conn, input_student_id)?;
    let review_ids: Vec<u32> = student_reviews.iter().map(|r| r.review_id).collect();
    let votes_by_review = get_votes_for_reviews(conn, &review_ids)?
        .into_iter()
        .into_group_map_by(|v| v.review_id);

    Ok(student_reviews
        .into_iter()
        .map(|review| {
            let votes = votes_by_review
                .get(&review.review_id)
                .map(|v| crate::votes::count(v))
                .unwrap_or_default();
            ReviewWithVotes { review, votes }
        })
        .collect())
}
