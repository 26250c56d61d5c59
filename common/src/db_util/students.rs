use super::schema::students;
use super::*;
use crate::endorsement_stats;
use crate::roster::plan_import;

#[derive(Queryable)]
#[diesel(table_name = students)]
struct StudentPrivate {
    id: i32,
    name: String,
    school_id: i32,
    active: bool,
}

#[derive(Insertable)]
#[diesel(table_name = students)]
struct StudentPrivateNew<'a> {
    name: &'a str,
    school_id: i32,
    active: bool,
}

fn private_to_public(p: StudentPrivate) -> Result<StudentRecord> {
    use conversions::*;
    Ok(StudentRecord {
        student_id: i32_to_u32(p.id)?,
        name: p.name,
        school_id: i32_to_u32(p.school_id)?,
        active: p.active,
    })
}

/// Insert a student together with its karma row at the baseline score.
pub fn insert_student(
    conn: &mut PgConnection,
    weights: &KarmaWeights,
    input_school_id: u32,
    input_name: &str,
) -> Result<StudentRecord> {
    use self::students::dsl::*;

    let input_name = input_name.trim();
    if input_name.is_empty() {
        return Err(ValidationError::MissingField { field: "name" }.into());
    }
    let new_row = StudentPrivateNew {
        name: input_name,
        school_id: conversions::u32_to_i32(input_school_id)?,
        active: true,
    };

    conn.transaction::<_, anyhow::Error, _>(|conn| {
        let result = diesel::insert_into(students)
            .values(&new_row)
            .get_result::<StudentPrivate>(conn)
            .map_err(|e| {
                on_unique_violation(e, |_| ValidationError::DuplicateStudent(input_name.to_string()))
            })?;
        let student = private_to_public(result)?;
        upsert_karma(conn, student.student_id, weights.baseline)?;
        Ok(student)
    })
}

pub fn get_student_by_id(conn: &mut PgConnection, row_id: u32) -> Result<StudentRecord> {
    use self::students::dsl::*;

    let row_id = conversions::u32_to_i32(row_id)?;

    let result = students
        .filter(id.eq(row_id))
        .first::<StudentPrivate>(conn)?;
    private_to_public(result)
}

pub fn get_students_in_school(
    conn: &mut PgConnection,
    input_school_id: u32,
    active_only: bool,
) -> Result<Vec<StudentRecord>> {
    use self::students::dsl::*;

    let input_school_id = conversions::u32_to_i32(input_school_id)?;

    let mut query = students
        .filter(school_id.eq(input_school_id))
        .order(name.asc())
        .into_boxed();
    if active_only {
        query = query.filter(active.eq(true));
    }

    query
        .load::<StudentPrivate>(conn)?
        .into_iter()
        .map(private_to_public)
        .collect()
}

pub fn set_student_active(conn: &mut PgConnection, row_id: u32, is_active: bool) -> Result<StudentRecord> {
    use self::students::dsl::*;

    let row_id = conversions::u32_to_i32(row_id)?;

    let result = diesel::update(students.filter(id.eq(row_id)))
        .set(active.eq(is_active))
        .get_result::<StudentPrivate>(conn)?;
    private_to_public(result)
}

/// Add a roster of names to a school. Names already on the school's roster are
/// skipped, so importing the same roster twice creates nothing the second time.
pub fn import_students(
    conn: &mut PgConnection,
    weights: &KarmaWeights,
    input_school_id: u32,
    names: &[String],
) -> Result<ImportSummary> {
    conn.transaction::<_, anyhow::Error, _>(|conn| {
        let existing = get_students_in_school(conn, input_school_id, false)?;
        let summary = plan_import(
            existing.iter().map(|s| s.name.as_str()),
            names.iter().map(String::as_str),
        );
        for new_name in &summary.created {
            insert_student(conn, weights, input_school_id, new_name)?;
        }
        info!(
            "Imported roster into school #{input_school_id}: {} created, {} skipped",
            summary.created.len(),
            summary.skipped.len()
        );
        Ok(summary)
    })
}

/// Load everything shown on a student's profile page.
pub fn get_student_profile(conn: &mut PgConnection, input_student_id: u32) -> Result<StudentProfile> {
    let student = get_student_by_id(conn, input_student_id)?;
    let karma = get_karma(conn, input_student_id)?;
    let skills = get_endorsement_stats(conn, input_student_id)?;
    let school_max = get_school_skill_maximums(conn, student.school_id)?;
    let reviews = get_reviews_with_votes_for_student(conn, input_student_id)?;

    Ok(StudentProfile {
        top_qualities: endorsement_stats::top_qualities(&skills, &school_max),
        student,
        karma: karma.score,
        skills,
        reviews,
    })
}
