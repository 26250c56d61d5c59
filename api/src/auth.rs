//! Caller identity. Authentication happens upstream; requests carry the
//! authenticated user's id in the `X-User-Id` header.

use crate::helpers::{ApiError, forbidden_error};
use karma_common::db_util::{
    self, PgPool, get_admin_by_user_id, get_staff_by_user_id, get_user_by_id,
};
use karma_common::{AdminRecord, Role, StaffRecord, UserRecord};
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome, Request};

pub const USER_ID_HEADER: &str = "X-User-Id";

/// The user making a request, with the school rows attached to their role.
#[derive(Debug, Clone)]
pub struct Actor {
    pub user: UserRecord,
    pub staff: Option<StaffRecord>,
    pub admin: Option<AdminRecord>,
}

impl Actor {
    pub fn require_superuser(&self) -> Result<(), ApiError> {
        if self.user.role == Role::Superuser {
            Ok(())
        } else {
            Err(forbidden_error("Only superusers may do this."))
        }
    }

    /// The caller's staff row, if they are staff at this school.
    pub fn require_staff_of(&self, school_id: u32) -> Result<&StaffRecord, ApiError> {
        self.staff
            .as_ref()
            .filter(|s| s.school_id == school_id)
            .ok_or_else(|| forbidden_error("Only staff of this school may do this."))
    }

    pub fn require_admin_of(&self, school_id: u32) -> Result<&AdminRecord, ApiError> {
        self.admin
            .as_ref()
            .filter(|a| a.school_id == school_id)
            .ok_or_else(|| forbidden_error("Only administrators of this school may do this."))
    }

    pub fn is_admin_of(&self, school_id: u32) -> bool {
        self.require_admin_of(school_id).is_ok()
    }

    /// Staff and administrators of a school can read its records.
    pub fn require_member_of(&self, school_id: u32) -> Result<(), ApiError> {
        if self.require_staff_of(school_id).is_ok() || self.is_admin_of(school_id) {
            Ok(())
        } else {
            Err(forbidden_error("You do not belong to this school."))
        }
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Actor {
    type Error = &'static str;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let Some(user_id) = request
            .headers()
            .get_one(USER_ID_HEADER)
            .and_then(|v| v.trim().parse::<u32>().ok())
        else {
            return Outcome::Error((Status::Unauthorized, "missing or malformed user id"));
        };
        let Some(pool) = request.rocket().state::<PgPool>() else {
            return Outcome::Error((Status::InternalServerError, "no database pool"));
        };

        match load_actor(pool, user_id) {
            Ok(Some(actor)) => Outcome::Success(actor),
            Ok(None) => Outcome::Error((Status::Unauthorized, "unknown user")),
            Err(e) => {
                tracing::error!(error = %format!("{e:#}"), user_id, "Failed to load caller");
                Outcome::Error((Status::InternalServerError, "failed to load user"))
            }
        }
    }
}

fn load_actor(pool: &PgPool, user_id: u32) -> anyhow::Result<Option<Actor>> {
    let mut conn = db_util::get_pooled_database_connection(pool)?;
    let user = match get_user_by_id(&mut conn, user_id) {
        Ok(user) => user,
        Err(e) if db_util::is_not_found(&e) => return Ok(None),
        Err(e) => return Err(e),
    };
    let staff = get_staff_by_user_id(&mut conn, user_id)?;
    let admin = get_admin_by_user_id(&mut conn, user_id)?;
    Ok(Some(Actor { user, staff, admin }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(role: Role, staff_school: Option<u32>, admin_school: Option<u32>) -> Actor {
        Actor {
            user: UserRecord {
                user_id: 7,
                email: "pat@example.org".to_string(),
                username: "pat".to_string(),
                first_name: "Pat".to_string(),
                last_name: "Doe".to_string(),
                role,
            },
            staff: staff_school.map(|school_id| StaffRecord {
                staff_id: 3,
                user_id: 7,
                school_id,
            }),
            admin: admin_school.map(|school_id| AdminRecord {
                admin_id: 4,
                user_id: 7,
                school_id,
            }),
        }
    }

    #[test_log::test]
    fn test_staff_is_scoped_to_school() {
        let staff = actor(Role::Staff, Some(1), None);
        assert!(staff.require_staff_of(1).is_ok());
        assert_eq!(staff.require_staff_of(2).unwrap_err().0, Status::Forbidden);
        assert!(staff.require_admin_of(1).is_err());
        assert!(staff.require_member_of(1).is_ok());
        assert!(staff.require_superuser().is_err());
    }

    #[test_log::test]
    fn test_admin_is_member_but_not_staff() {
        let admin = actor(Role::Admin, None, Some(5));
        assert!(admin.is_admin_of(5));
        assert!(admin.require_member_of(5).is_ok());
        assert!(admin.require_staff_of(5).is_err());
        assert!(admin.require_member_of(6).is_err());
    }

    #[test_log::test]
    fn test_superuser() {
        assert!(actor(Role::Superuser, None, None).require_superuser().is_ok());
    }
}
