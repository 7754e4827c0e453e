use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
};

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/users", user_routes())
        .nest("/companies", company_routes())
        .nest("/jobs", job_routes())
        .nest("/media", media_routes())
}

/// Body limit for routes that accept a file upload (16 MB).
fn upload_body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(16 * 1024 * 1024)
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/verify-email", get(handlers::auth::verify_email))
        .route("/me", get(handlers::auth::me))
        .route("/password", patch(handlers::auth::update_password))
        .route("/forgot-password", post(handlers::auth::forgot_password))
        .route("/reset-password", post(handlers::auth::reset_password))
        .layer(upload_body_limit())
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::user::list_by_recovery_email))
        .route(
            "/me",
            patch(handlers::user::update_account).delete(handlers::user::delete_account),
        )
        .route("/{id}", get(handlers::user::get_profile))
        .layer(upload_body_limit())
}

fn company_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::company::create_company))
        .route("/search", get(handlers::company::search_company))
        .route(
            "/{id}",
            get(handlers::company::get_company)
                .patch(handlers::company::update_company)
                .delete(handlers::company::delete_company),
        )
        .route(
            "/{id}/applications",
            get(handlers::application::list_company_applications),
        )
        .layer(upload_body_limit())
}

fn job_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::job::list_jobs).post(handlers::job::create_job),
        )
        .route("/company", get(handlers::job::list_company_jobs))
        .route(
            "/{id}",
            patch(handlers::job::update_job).delete(handlers::job::delete_job),
        )
        .route(
            "/{id}/applications",
            post(handlers::application::apply_to_job),
        )
        .layer(upload_body_limit())
}

fn media_routes() -> Router<AppState> {
    Router::new().route("/{*path}", get(handlers::media::download_media))
}
