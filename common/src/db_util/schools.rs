use super::schema::schools;
use super::*;

#[derive(Queryable)]
#[diesel(table_name = schools)]
struct SchoolPrivate {
    id: i32,
    name: String,
}

#[derive(Insertable)]
#[diesel(table_name = schools)]
struct SchoolPrivateNew<'a> {
    name: &'a str,
}

fn private_to_public(p: SchoolPrivate) -> Result<SchoolRecord> {
    use conversions::*;
    Ok(SchoolRecord {
        school_id: i32_to_u32(p.id)?,
        name: p.name,
    })
}

pub fn insert_school(conn: &mut PgConnection, input_name: &str) -> Result<SchoolRecord> {
    use self::schools::dsl::*;

    let input_name = input_name.trim();
    if input_name.is_empty() {
        return Err(ValidationError::MissingField { field: "name" }.into());
    }

    conn.transaction::<_, anyhow::Error, _>(|conn| {
        if get_school_by_name(conn, input_name)?.is_some() {
            return Err(ValidationError::DuplicateSchool(input_name.to_string()).into());
        }
        let result = diesel::insert_into(schools)
            .values(&SchoolPrivateNew { name: input_name })
            .get_result(conn)?;
        info!("Created school {input_name}");
        private_to_public(result)
    })
}

pub fn get_school_by_id(conn: &mut PgConnection, row_id: u32) -> Result<SchoolRecord> {
    use self::schools::dsl::*;

    let row_id = conversions::u32_to_i32(row_id)?;

    let result = schools
        .filter(id.eq(row_id))
        .first::<SchoolPrivate>(conn)?;
    private_to_public(result)
}

pub fn get_school_by_name(conn: &mut PgConnection, input_name: &str) -> Result<Option<SchoolRecord>> {
    use self::schools::dsl::*;

    schools
        .filter(name.eq(input_name.trim()))
        .first::<SchoolPrivate>(conn)
        .optional()?
        .map(private_to_public)
        .transpose()
}

pub fn get_all_schools(conn: &mut PgConnection) -> Result<Vec<SchoolRecord>> {
    use self::schools::dsl::*;

    schools
        .order(name.asc())
        .load::<SchoolPrivate>(conn)?
        .into_iter()
        .map(private_to_public)
        .collect()
}
