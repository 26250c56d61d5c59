//! Interfaces between the application code and database.
//!
//! Every table has a private row type that mirrors the SQL columns and a public
//! record type from the crate root. Conversions between the two go through
//! [`conversions`] so that signed SQL integers never leak into the API.

use crate::config::KarmaWeights;
use crate::roster::ImportSummary;
use crate::validation::{RegistrationInput, ReviewInput, ValidationError};
use crate::votes::VoteAction;
use crate::{
    ActivityRecord, AdminRecord, EndorsementRecord, KarmaRecord, ReviewRecord, ReviewWithVotes,
    Role, SchoolRecord, Skill, SkillCounts, StaffRecord, StudentProfile, StudentRecord,
    UserRecord, VoteCount, VoteRecord, VoteValue,
};
use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
pub use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use log::{debug, info};
use std::env;

mod activity;
mod conversions;
mod endorsements;
mod karma;
mod reviews;
mod schema;
mod schools;
mod staff;
mod students;
mod users;
mod votes;

pub use activity::*;
pub use endorsements::*;
pub use karma::*;
pub use reviews::*;
pub use schools::*;
pub use staff::*;
pub use students::*;
pub use users::*;
pub use votes::*;

pub use diesel::result::Error as QueryError;

pub type PgPool = Pool<ConnectionManager<PgConnection>>;
pub type PgPooledConnection = PooledConnection<ConnectionManager<PgConnection>>;

/// Read `DATABASE_URL` from the environment, loading `.env` first if present.
///
/// # Errors
/// Returns an error if the variable is unset.
pub fn get_database_url() -> Result<String> {
    dotenvy::dotenv().ok();
    env::var("DATABASE_URL").context("DATABASE_URL must be set")
}

/// Open a single connection, for batch jobs.
///
/// # Errors
/// Returns an error if the URL is missing or the database is unreachable.
pub fn get_database_connection() -> Result<PgConnection> {
    let url = get_database_url()?;
    PgConnection::establish(&url).with_context(|| "Error connecting to database".to_string())
}

/// Build a connection pool and check that the database is reachable.
///
/// # Errors
/// Returns an error if the URL is missing or no connection can be opened.
pub fn get_database_pool() -> Result<PgPool> {
    let url = get_database_url()?;
    let manager = ConnectionManager::<PgConnection>::new(url);
    Pool::builder()
        .build(manager)
        .context("Error building database pool")
}

/// Build a pool that opens connections on first use instead of at startup.
#[must_use]
pub fn get_lazy_database_pool(database_url: &str) -> PgPool {
    Pool::builder().build_unchecked(ConnectionManager::new(database_url))
}

/// Check a connection out of the pool.
///
/// # Errors
/// Returns an error if the pool times out waiting for a connection.
pub fn get_pooled_database_connection(pool: &PgPool) -> Result<PgPooledConnection> {
    pool.get().context("Error getting connection from pool")
}

/// Whether an error came from a query that matched no row.
#[must_use]
pub fn is_not_found(err: &anyhow::Error) -> bool {
    matches!(err.downcast_ref::<QueryError>(), Some(QueryError::NotFound))
}

/// Turn a unique-constraint violation into the matching validation error, passing
/// the violated constraint's name. Other errors are returned unchanged.
fn on_unique_violation(
    err: QueryError,
    to_validation: impl FnOnce(&str) -> ValidationError,
) -> anyhow::Error {
    if let QueryError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) = &err {
        return to_validation(info.constraint_name().unwrap_or_default()).into();
    }
    err.into()
}

#[cfg(test)]
mod tests;
