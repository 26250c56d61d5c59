use super::schema::staff;
use super::*;

#[derive(Queryable)]
#[diesel(table_name = staff)]
struct StaffPrivate {
    id: i32,
    user_id: i32,
    school_id: i32,
}

fn private_to_public(p: StaffPrivate) -> Result<StaffRecord> {
    use conversions::*;
    Ok(StaffRecord {
        staff_id: i32_to_u32(p.id)?,
        user_id: i32_to_u32(p.user_id)?,
        school_id: i32_to_u32(p.school_id)?,
    })
}

pub fn get_staff_by_id(conn: &mut PgConnection, row_id: u32) -> Result<StaffRecord> {
    use self::staff::dsl::*;

    let row_id = conversions::u32_to_i32(row_id)?;

    let result = staff.filter(id.eq(row_id)).first::<StaffPrivate>(conn)?;
    private_to_public(result)
}

pub fn get_staff_by_user_id(conn: &mut PgConnection, input_user_id: u32) -> Result<Option<StaffRecord>> {
    use self::staff::dsl::*;

    let input_user_id = conversions::u32_to_i32(input_user_id)?;

    staff
        .filter(user_id.eq(input_user_id))
        .first::<StaffPrivate>(conn)
        .optional()?
        .map(private_to_public)
        .transpose()
}
