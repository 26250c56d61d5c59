use super::schema::{admins, staff, users};
use super::*;
use crate::validation::validate_registration;

#[derive(Queryable)]
#[diesel(table_name = users)]
struct UserPrivate {
    id: i32,
    email: String,
    username: String,
    first_name: String,
    last_name: String,
    role: String,
}

#[derive(Insertable)]
#[diesel(table_name = users)]
struct UserPrivateNew {
    email: String,
    username: String,
    first_name: String,
    last_name: String,
    role: String,
}

fn private_to_public(p: UserPrivate) -> Result<UserRecord> {
    use conversions::*;
    Ok(UserRecord {
        user_id: i32_to_u32(p.id)?,
        email: p.email,
        username: p.username,
        first_name: p.first_name,
        last_name: p.last_name,
        role: deserialize_role(&p.role)?,
    })
}

fn build_new_row(input: &RegistrationInput, role: Role) -> UserPrivateNew {
    UserPrivateNew {
        email: input.email.trim().to_lowercase(),
        username: input.username.trim().to_string(),
        first_name: input.first_name.trim().to_string(),
        last_name: input.last_name.trim().to_string(),
        role: conversions::serialize_role(role),
    }
}

pub fn get_user_by_id(conn: &mut PgConnection, row_id: u32) -> Result<UserRecord> {
    use self::users::dsl::*;

    let row_id = conversions::u32_to_i32(row_id)?;

    let result = users.filter(id.eq(row_id)).first::<UserPrivate>(conn)?;
    private_to_public(result)
}

/// Insert a user after checking that the email and username are free.
fn insert_user(conn: &mut PgConnection, input: &RegistrationInput, input_role: Role) -> Result<UserRecord> {
    use self::users::dsl::*;

    let new_row = build_new_row(input, input_role);

    let email_taken: i64 = users
        .filter(email.eq(&new_row.email))
        .count()
        .get_result(conn)?;
    if email_taken > 0 {
        return Err(ValidationError::DuplicateEmail(new_row.email).into());
    }
    let username_taken: i64 = users
        .filter(username.eq(&new_row.username))
        .count()
        .get_result(conn)?;
    if username_taken > 0 {
        return Err(ValidationError::DuplicateUsername(new_row.username).into());
    }

    // A concurrent registration can still slip past the checks above.
    let result: UserPrivate = diesel::insert_into(users)
        .values(&new_row)
        .get_result(conn)
        .map_err(|e| {
            on_unique_violation(e, |constraint| {
                duplicate_user_error(constraint, &new_row.email, &new_row.username)
            })
        })?;
    private_to_public(result)
}

fn duplicate_user_error(constraint: &str, taken_email: &str, taken_username: &str) -> ValidationError {
    if constraint.contains("username") {
        ValidationError::DuplicateUsername(taken_username.to_string())
    } else {
        ValidationError::DuplicateEmail(taken_email.to_string())
    }
}

fn registration_school(conn: &mut PgConnection, input: &RegistrationInput) -> Result<SchoolRecord> {
    validate_registration(input)?;
    get_school_by_name(conn, &input.school)?
        .ok_or_else(|| ValidationError::UnknownSchool(input.school.trim().to_string()).into())
}

/// Create a staff account and attach it to an existing school.
///
/// # Errors
/// Returns a [`ValidationError`] for missing fields, a malformed email, an unknown
/// school, or an email or username that is already registered.
pub fn register_staff(
    conn: &mut PgConnection,
    input: &RegistrationInput,
) -> Result<(UserRecord, StaffRecord)> {
    conn.transaction::<_, anyhow::Error, _>(|conn| {
        let school = registration_school(conn, input)?;
        let user = insert_user(conn, input, Role::Staff)?;

        let row: (i32, i32, i32) = diesel::insert_into(staff::table)
            .values((
                staff::user_id.eq(conversions::u32_to_i32(user.user_id)?),
                staff::school_id.eq(conversions::u32_to_i32(school.school_id)?),
            ))
            .get_result(conn)?;
        let staff_record = StaffRecord {
            staff_id: conversions::i32_to_u32(row.0)?,
            user_id: user.user_id,
            school_id: school.school_id,
        };

        info!("Registered staff {} at {}", user.username, school.name);
        Ok((user, staff_record))
    })
}

/// Create a school administrator account.
///
/// # Errors
/// Same as [`register_staff`].
pub fn register_admin(
    conn: &mut PgConnection,
    input: &RegistrationInput,
) -> Result<(UserRecord, AdminRecord)> {
    conn.transaction::<_, anyhow::Error, _>(|conn| {
        let school = registration_school(conn, input)?;
        let user = insert_user(conn, input, Role::Admin)?;

        let row: (i32, i32, i32) = diesel::insert_into(admins::table)
            .values((
                admins::user_id.eq(conversions::u32_to_i32(user.user_id)?),
                admins::school_id.eq(conversions::u32_to_i32(school.school_id)?),
            ))
            .get_result(conn)?;
        let admin = AdminRecord {
            admin_id: conversions::i32_to_u32(row.0)?,
            user_id: user.user_id,
            school_id: school.school_id,
        };

        info!("Registered admin {} at {}", user.username, school.name);
        Ok((user, admin))
    })
}

/// Create a superuser. Only reachable from the jobs binary.
///
/// # Errors
/// Same validation as [`register_staff`], except no school is required.
pub fn register_superuser(conn: &mut PgConnection, input: &RegistrationInput) -> Result<UserRecord> {
    let with_placeholder_school = RegistrationInput {
        school: "-".to_string(),
        ..input.clone()
    };
    validate_registration(&with_placeholder_school)?;
    conn.transaction::<_, anyhow::Error, _>(|conn| insert_user(conn, input, Role::Superuser))
}

/// Look up the admin row for a user, if they are one.
pub fn get_admin_by_user_id(conn: &mut PgConnection, input_user_id: u32) -> Result<Option<AdminRecord>> {
    use self::admins::dsl::*;

    let input_user_id = conversions::u32_to_i32(input_user_id)?;

    admins
        .filter(user_id.eq(input_user_id))
        .first::<(i32, i32, i32)>(conn)
        .optional()?
        .map(|(row_id, row_user_id, row_school_id)| {
            Ok(AdminRecord {
                admin_id: conversions::i32_to_u32(row_id)?,
                user_id: conversions::i32_to_u32(row_user_id)?,
                school_id: conversions::i32_to_u32(row_school_id)?,
            })
        })
        .transpose()
}

/// Admin display name in the `"First Last : School"` form used by the admin site.
pub fn get_admin_display_name(conn: &mut PgConnection, admin: &AdminRecord) -> Result<String> {
    let user = get_user_by_id(conn, admin.user_id)?;
    let school = get_school_by_id(conn, admin.school_id)?;
    Ok(format!("{} : {}", user.full_name(), school.name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn test_duplicate_user_error_follows_constraint() {
        assert_eq!(
            duplicate_user_error("users_username_key", "a@b.org", "ab"),
            ValidationError::DuplicateUsername("ab".to_string())
        );
        assert_eq!(
            duplicate_user_error("users_email_key", "a@b.org", "ab"),
            ValidationError::DuplicateEmail("a@b.org".to_string())
        );
    }
}
