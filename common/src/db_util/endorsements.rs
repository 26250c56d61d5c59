use super::schema::{endorsements, students};
use super::*;
use crate::endorsement_stats::{count_skills, count_skills_by_student, school_maximums};

#[derive(Queryable)]
#[diesel(table_name = endorsements)]
struct EndorsementPrivate {
    #[allow(dead_code)]
    id: i32,
    staff_id: i32,
    student_id: i32,
    leadership: bool,
    respect: bool,
    punctuality: bool,
    participation: bool,
    teamwork: bool,
}

#[derive(Insertable, AsChangeset)]
#[diesel(table_name = endorsements)]
struct EndorsementPrivateNew {
    staff_id: i32,
    student_id: i32,
    leadership: bool,
    respect: bool,
    punctuality: bool,
    participation: bool,
    teamwork: bool,
}

fn private_to_public(p: EndorsementPrivate) -> Result<EndorsementRecord> {
    use conversions::*;
    Ok(EndorsementRecord {
        staff_id: i32_to_u32(p.staff_id)?,
        student_id: i32_to_u32(p.student_id)?,
        leadership: p.leadership,
        respect: p.respect,
        punctuality: p.punctuality,
        participation: p.participation,
        teamwork: p.teamwork,
    })
}

fn public_to_private(p: &EndorsementRecord) -> Result<EndorsementPrivateNew> {
    use conversions::*;
    Ok(EndorsementPrivateNew {
        staff_id: u32_to_i32(p.staff_id)?,
        student_id: u32_to_i32(p.student_id)?,
        leadership: p.leadership,
        respect: p.respect,
        punctuality: p.punctuality,
        participation: p.participation,
        teamwork: p.teamwork,
    })
}

pub fn get_endorsement(
    conn: &mut PgConnection,
    endorser: &StaffRecord,
    input_student_id: u32,
) -> Result<Option<EndorsementRecord>> {
    use self::endorsements::dsl::*;

    endorsements
        .filter(staff_id.eq(conversions::u32_to_i32(endorser.staff_id)?))
        .filter(student_id.eq(conversions::u32_to_i32(input_student_id)?))
        .first::<EndorsementPrivate>(conn)
        .optional()?
        .map(private_to_public)
        .transpose()
}

/// Flip one skill in a staff member's endorsement of a student, creating the
/// endorsement on first use, and recompute the student's karma.
pub fn toggle_endorsement(
    conn: &mut PgConnection,
    weights: &KarmaWeights,
    endorser: &StaffRecord,
    input_student_id: u32,
    skill: Skill,
) -> Result<EndorsementRecord> {
    use self::endorsements::dsl::*;

    conn.transaction::<_, anyhow::Error, _>(|conn| {
        let mut endorsement = get_endorsement(conn, endorser, input_student_id)?
            .unwrap_or_else(|| EndorsementRecord::new(endorser.staff_id, input_student_id));
        let now_endorsed = endorsement.toggle(skill);

        let row = public_to_private(&endorsement)?;
        diesel::insert_into(endorsements)
            .values(&row)
            .on_conflict((staff_id, student_id))
            .do_update()
            .set(&row)
            .execute(conn)?;

        recompute_karma(conn, weights, input_student_id)?;
        if now_endorsed {
            insert_activity(
                conn,
                endorser.user_id,
                &format!("You endorsed a student for {skill}"),
                &input_student_id.to_string(),
            )?;
        }
        Ok(endorsement)
    })
}

pub fn get_endorsements_for_student(
    conn: &mut PgConnection,
    input_student_id: u32,
) -> Result<Vec<EndorsementRecord>> {
    use self::endorsements::dsl::*;

    let input_student_id = conversions::u32_to_i32(input_student_id)?;

    endorsements
        .filter(student_id.eq(input_student_id))
        .load::<EndorsementPrivate>(conn)?
        .into_iter()
        .map(private_to_public)
        .collect()
}

pub fn get_endorsements_in_school(
    conn: &mut PgConnection,
    input_school_id: u32,
) -> Result<Vec<EndorsementRecord>> {
    let input_school_id = conversions::u32_to_i32(input_school_id)?;

    endorsements::table
        .inner_join(students::table)
        .filter(students::school_id.eq(input_school_id))
        .select(endorsements::all_columns)
        .load::<EndorsementPrivate>(conn)?
        .into_iter()
        .map(private_to_public)
        .collect()
}

/// Per-skill endorsement counts for one student.
pub fn get_endorsement_stats(conn: &mut PgConnection, input_student_id: u32) -> Result<SkillCounts> {
    let rows = get_endorsements_for_student(conn, input_student_id)?;
    Ok(count_skills(&rows))
}

/// The best per-skill count held by any student of the school.
pub fn get_school_skill_maximums(conn: &mut PgConnection, input_school_id: u32) -> Result<SkillCounts> {
    let rows = get_endorsements_in_school(conn, input_school_id)?;
    let by_student = count_skills_by_student(&rows);
    Ok(school_maximums(by_student.values()))
}
