//! Open account registration.

use crate::helpers::{ApiResult, get_connection, map_error};
use karma_common::db_util::{self, PgPool};
use karma_common::validation::RegistrationInput;
use karma_common::{AdminRecord, StaffRecord, UserRecord};
use rocket::State;
use rocket::serde::Serialize;
use rocket::serde::json::Json;

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct StaffRegistration {
    pub user: UserRecord,
    pub staff: StaffRecord,
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct AdminRegistration {
    pub user: UserRecord,
    pub admin: AdminRecord,
    pub display_name: String,
}

#[post("/register/staff", data = "<input>")]
pub fn register_staff(
    pool: &State<PgPool>,
    input: Json<RegistrationInput>,
) -> ApiResult<StaffRegistration> {
    let mut conn = get_connection(pool)?;
    let (user, staff) = db_util::register_staff(&mut conn, &input).map_err(|e| map_error(&e))?;
    Ok(Json(StaffRegistration { user, staff }))
}

#[post("/register/admin", data = "<input>")]
pub fn register_admin(
    pool: &State<PgPool>,
    input: Json<RegistrationInput>,
) -> ApiResult<AdminRegistration> {
    let mut conn = get_connection(pool)?;
    let (user, admin) = db_util::register_admin(&mut conn, &input).map_err(|e| map_error(&e))?;
    let display_name =
        db_util::get_admin_display_name(&mut conn, &admin).map_err(|e| map_error(&e))?;
    Ok(Json(AdminRegistration {
        user,
        admin,
        display_name,
    }))
}
