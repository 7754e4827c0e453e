pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod mail;
pub mod models;
pub mod rollback;
pub mod routes;
pub mod state;
pub mod utils;

use std::time::Duration;

use axum::http::HeaderValue;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::CorsConfig;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Hireboard API",
        version = "1.0.0",
        description = "REST API for the Hireboard job board"
    ),
    paths(
        handlers::company::create_company,
        handlers::company::search_company,
        handlers::company::get_company,
        handlers::company::update_company,
        handlers::company::delete_company,
        handlers::job::create_job,
        handlers::job::list_jobs,
        handlers::job::list_company_jobs,
        handlers::job::update_job,
        handlers::job::delete_job,
        handlers::application::apply_to_job,
        handlers::application::list_company_applications,
        handlers::media::download_media,
    ),
    tags(
        (name = "Companies", description = "Company CRUD, one company per HR account"),
        (name = "Jobs", description = "Job CRUD, listing and filtering"),
        (name = "Applications", description = "Job applications and the HR report"),
        (name = "Media", description = "Stored media retrieval"),
    ),
    modifiers(&SecurityAddon),
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();
        components.add_security_scheme(
            "jwt",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let cors = cors_layer(&state.config.server.cors);

    let api = routes::api_routes()
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rollback::rollback_guard,
        ))
        .with_state(state);

    axum::Router::new()
        .nest("/api", api)
        .layer(cors)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
}

fn cors_layer(cfg: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(cfg.max_age));

    if cfg.allow_origins.iter().any(|origin| origin == "*") {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = cfg
            .allow_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        layer.allow_origin(AllowOrigin::list(origins))
    }
}
