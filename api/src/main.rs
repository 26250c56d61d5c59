//! An api for school reviews, endorsements and karma.

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::needless_pass_by_value)]

#[macro_use]
extern crate rocket;

mod auth;
mod helpers;
mod routes;

use helpers::{ApiErrorBody, ApiErrorKind, AppConfig, RequestTimingFairing};
use karma_common::db_util::{self, PgPool};
use rocket::fairing::AdHoc;
use rocket::serde::json::Json;
use rocket::{Build, Rocket};
use rocket_prometheus::PrometheusMetrics;
use tracing_subscriber::EnvFilter;

#[catch(400)]
fn bad_request() -> Json<ApiErrorBody> {
    Json(ApiErrorBody::new(
        ApiErrorKind::BadRequest,
        "The request could not be understood.",
    ))
}

#[catch(401)]
fn unauthorized() -> Json<ApiErrorBody> {
    Json(ApiErrorBody::new(
        ApiErrorKind::Unauthorized,
        "A valid X-User-Id header is required.",
    ))
}

#[catch(404)]
fn not_found() -> Json<ApiErrorBody> {
    Json(ApiErrorBody::new(
        ApiErrorKind::NotFound,
        "The requested resource could not be found.",
    ))
}

#[catch(422)]
fn unprocessable_entity() -> Json<ApiErrorBody> {
    Json(ApiErrorBody::new(
        ApiErrorKind::UnprocessableEntity,
        "The request body is malformed.",
    ))
}

#[catch(500)]
fn internal() -> Json<ApiErrorBody> {
    Json(ApiErrorBody::new(
        ApiErrorKind::Internal,
        "An internal error occurred.",
    ))
}

fn build_rocket(pool: PgPool) -> Rocket<Build> {
    let prometheus = PrometheusMetrics::new();

    rocket::build()
        .attach(RequestTimingFairing)
        .attach(prometheus.clone())
        .attach(AdHoc::config::<AppConfig>())
        .manage(pool)
        .mount("/metrics", prometheus)
        .mount(
            "/",
            routes![
                routes::schools::create_school,
                routes::schools::list_students,
                routes::schools::import_roster,
                routes::schools::leaderboard,
                routes::register::register_staff,
                routes::register::register_admin,
                routes::students::profile,
                routes::students::set_active,
                routes::students::create_review,
                routes::students::toggle_endorsement,
                routes::students::recommendation_letter,
                routes::reviews::edit_review,
                routes::reviews::delete_review,
                routes::reviews::vote,
                routes::activity::recent_activity,
            ],
        )
        .register(
            "/",
            catchers![
                bad_request,
                unauthorized,
                not_found,
                unprocessable_entity,
                internal
            ],
        )
}

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let pool = db_util::get_database_pool()?;
    tracing::info!("Database pool ready");

    build_rocket(pool).launch().await?;
    Ok(())
}
