//! Some helper functions for the API.

use karma_common::config::KarmaWeights;
use karma_common::db_util::{self, PgPool, PgPooledConnection};
use karma_common::letter::LetterConfig;
use karma_common::validation::ValidationError;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::Status;
use rocket::request::Request;
use rocket::response::Response;
use rocket::response::status as rocket_status;
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use std::time::Instant;

/// Settings read from Rocket's figment (`Rocket.toml` or `ROCKET_*` variables).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct AppConfig {
    #[serde(default)]
    pub karma: KarmaWeights,
    #[serde(default)]
    pub letters: LetterConfig,
}

#[derive(Clone, Copy)]
pub struct RequestTimingFairing;

#[rocket::async_trait]
impl Fairing for RequestTimingFairing {
    fn info(&self) -> Info {
        Info {
            name: "Request timing",
            kind: Kind::Request | Kind::Response,
        }
    }

    async fn on_request(&self, request: &mut Request<'_>, _data: &mut rocket::Data<'_>) {
        request.local_cache(Instant::now);
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        let started_at = request.local_cache(Instant::now);
        let elapsed = started_at.elapsed();

        tracing::info!(
            method = %request.method(),
            path = %request.uri(),
            status = response.status().code,
            elapsed_ms = elapsed.as_millis(),
            "Request Completed"
        );
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    UnprocessableEntity,
    Internal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct ApiErrorBody {
    pub error: ApiErrorKind,
    pub message: String,
}

impl ApiErrorBody {
    pub fn new(error: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            error,
            message: message.into(),
        }
    }
}

pub type ApiError = rocket_status::Custom<Json<ApiErrorBody>>;
pub type ApiResult<T> = Result<Json<T>, ApiError>;

fn api_error(status: Status, kind: ApiErrorKind, message: impl Into<String>) -> ApiError {
    rocket_status::Custom(status, Json(ApiErrorBody::new(kind, message)))
}

pub fn bad_request_error(message: impl Into<String>) -> ApiError {
    api_error(Status::BadRequest, ApiErrorKind::BadRequest, message)
}

pub fn forbidden_error(message: impl Into<String>) -> ApiError {
    api_error(Status::Forbidden, ApiErrorKind::Forbidden, message)
}

pub fn not_found_error(message: impl Into<String>) -> ApiError {
    api_error(Status::NotFound, ApiErrorKind::NotFound, message)
}

pub fn conflict_error(message: impl Into<String>) -> ApiError {
    api_error(Status::Conflict, ApiErrorKind::Conflict, message)
}

pub fn unprocessable_entity_error(message: impl Into<String>) -> ApiError {
    api_error(
        Status::UnprocessableEntity,
        ApiErrorKind::UnprocessableEntity,
        message,
    )
}

pub fn internal_error(message: impl Into<String>) -> ApiError {
    api_error(Status::InternalServerError, ApiErrorKind::Internal, message)
}

/// Translate a library error into a response. Validation failures keep their
/// message; anything unexpected is logged and reported without detail.
pub fn map_error(err: &anyhow::Error) -> ApiError {
    if let Some(validation) = err.downcast_ref::<ValidationError>() {
        return match validation {
            ValidationError::DuplicateEmail(_)
            | ValidationError::DuplicateUsername(_)
            | ValidationError::DuplicateSchool(_)
            | ValidationError::DuplicateStudent(_) => conflict_error(validation.to_string()),
            _ => unprocessable_entity_error(validation.to_string()),
        };
    }
    if db_util::is_not_found(err) {
        return not_found_error("The requested record does not exist.");
    }
    tracing::error!(error = %format!("{err:#}"), "Request failed");
    internal_error("An internal error occurred.")
}

pub fn get_connection(pool: &PgPool) -> Result<PgPooledConnection, ApiError> {
    db_util::get_pooled_database_connection(pool).map_err(|e| {
        tracing::error!(error = %e, "Database unavailable");
        internal_error("The database is unavailable.")
    })
}
