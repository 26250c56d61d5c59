use super::schema::{karma, students};
use super::*;
use crate::karma::{ReviewTally, compute_score};
use crate::leaderboard::{self, Candidate, LeaderboardEntry};

#[derive(Queryable, Insertable)]
#[diesel(table_name = karma)]
struct KarmaPrivate {
    student_id: i32,
    score: i64,
}

fn private_to_public(p: KarmaPrivate) -> Result<KarmaRecord> {
    Ok(KarmaRecord {
        student_id: conversions::i32_to_u32(p.student_id)?,
        score: p.score,
    })
}

/// Write a student's score, creating the row if it does not exist.
pub fn upsert_karma(conn: &mut PgConnection, input_student_id: u32, input_score: i64) -> Result<KarmaRecord> {
    use self::karma::dsl::*;

    let row = KarmaPrivate {
        student_id: conversions::u32_to_i32(input_student_id)?,
        score: input_score,
    };

    let result = diesel::insert_into(karma)
        .values(&row)
        .on_conflict(student_id)
        .do_update()
        .set(score.eq(input_score))
        .get_result::<KarmaPrivate>(conn)?;
    private_to_public(result)
}

pub fn get_karma(conn: &mut PgConnection, input_student_id: u32) -> Result<KarmaRecord> {
    use self::karma::dsl::*;

    let input_student_id = conversions::u32_to_i32(input_student_id)?;

    let result = karma
        .filter(student_id.eq(input_student_id))
        .first::<KarmaPrivate>(conn)?;
    private_to_public(result)
}

/// Like [`get_karma`], but a student without a karma row yields `None`.
pub fn find_karma(conn: &mut PgConnection, input_student_id: u32) -> Result<Option<KarmaRecord>> {
    use self::karma::dsl::*;

    let input_student_id = conversions::u32_to_i32(input_student_id)?;

    karma
        .filter(student_id.eq(input_student_id))
        .first::<KarmaPrivate>(conn)
        .optional()?
        .map(private_to_public)
        .transpose()
}

/// Recompute a student's karma from every review, vote and endorsement and store it.
/// Stored scores are never read back as an input.
pub fn recompute_karma(
    conn: &mut PgConnection,
    weights: &KarmaWeights,
    input_student_id: u32,
) -> Result<KarmaRecord> {
    let reviews = get_reviews_with_votes_for_student(conn, input_student_id)?;
    let tallies: Vec<ReviewTally> = reviews.iter().map(ReviewTally::from).collect();
    let endorsements = get_endorsements_for_student(conn, input_student_id)?;

    let new_score = compute_score(weights, &tallies, &endorsements);
    debug!(
        "Student #{input_student_id}: {} reviews, {} endorsements, karma {new_score}",
        tallies.len(),
        endorsements.len()
    );
    upsert_karma(conn, input_student_id, new_score)
}

/// Active students of a school in leaderboard order.
pub fn get_leaderboard(conn: &mut PgConnection, input_school_id: u32) -> Result<Vec<LeaderboardEntry>> {
    let input_school_id = conversions::u32_to_i32(input_school_id)?;

    let rows: Vec<(i32, String, i64)> = students::table
        .inner_join(karma::table)
        .filter(students::school_id.eq(input_school_id))
        .filter(students::active.eq(true))
        .select((students::id, students::name, karma::score))
        .load(conn)?;

    let candidates = rows
        .into_iter()
        .map(|(row_id, row_name, row_score)| {
            Ok(Candidate {
                student_id: conversions::i32_to_u32(row_id)?,
                name: row_name,
                score: row_score,
            })
        })
        .collect::<Result<Vec<Candidate>>>()?;

    Ok(leaderboard::rank(candidates))
}
