//! End-to-end checks of the request-scoped rollback protocol: a handler
//! that uploads a file and inserts a record, registers both, and then
//! either succeeds or fails downstream.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    routing::post,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde_json::json;

use crate::common::TestApp;
use server::entity::company;
use server::error::AppError;
use server::rollback::{PendingRecord, RequestEffects};
use server::state::AppState;

/// Creates a company with a logo, registering both effects, then fails
/// downstream when asked to. This mirrors the shape of every mutating
/// handler: upload, register, insert, register, more fallible logic.
async fn create_with_effects(
    State(state): State<AppState>,
    effects: RequestEffects,
    Json(body): Json<serde_json::Value>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let hr_user_id = body["hr_user_id"].as_i64().expect("hr_user_id") as i32;
    let name = body["name"].as_str().expect("name").to_string();
    let fail = body["fail"].as_bool().unwrap_or(false);

    let folder = format!("companies/effects-{}", name.to_lowercase().replace(' ', "-"));
    let dest = format!("{folder}/logo");
    let uploaded = state.media.upload(b"logo bytes", &dest, "logo.png").await?;
    effects.register_upload(&dest);

    let now = chrono::Utc::now();
    let created = company::ActiveModel {
        name: Set(name.clone()),
        employee_count: Set(15),
        email: Set(format!("{}@effects.example", name.to_lowercase().replace(' ', "-"))),
        hr_user_id: Set(hr_user_id),
        logo_id: Set(Some(uploaded.id)),
        logo_url: Set(Some(uploaded.url)),
        media_folder: Set(folder),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;
    effects.register_creation(PendingRecord::Company(created.id));

    if fail {
        return Err(AppError::Validation("simulated downstream failure".into()));
    }

    Ok((StatusCode::CREATED, Json(json!({ "id": created.id }))))
}

/// Spawn a side router sharing the app's state, wrapped in the same
/// rollback middleware as the real API.
async fn spawn_effects_route(app: &TestApp) -> String {
    let router = Router::new()
        .route("/effects", post(create_with_effects))
        .layer(middleware::from_fn_with_state(
            app.state.clone(),
            server::rollback::rollback_guard,
        ))
        .with_state(app.state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://{addr}/effects")
}

async fn company_by_name(app: &TestApp, name: &str) -> Option<company::Model> {
    company::Entity::find()
        .filter(company::Column::Name.eq(name))
        .one(&app.db)
        .await
        .unwrap()
}

#[tokio::test]
async fn failed_request_rolls_back_record_and_upload() {
    let app = TestApp::spawn().await;
    let (_, hr_id, _) = app.create_authenticated_user("company_hr").await;
    let url = spawn_effects_route(&app).await;

    let res = app
        .client
        .post(&url)
        .json(&json!({ "hr_user_id": hr_id, "name": "Doomed Co", "fail": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);

    // The created record is gone from the store.
    assert!(company_by_name(&app, "Doomed Co").await.is_none());

    // Nothing remains under the registered upload folder.
    let logo_dir = app.media_dir.path().join("companies/effects-doomed-co/logo");
    assert!(!logo_dir.exists(), "upload folder survived the rollback");
}

#[tokio::test]
async fn successful_request_keeps_record_and_upload() {
    let app = TestApp::spawn().await;
    let (_, hr_id, _) = app.create_authenticated_user("company_hr").await;
    let url = spawn_effects_route(&app).await;

    let res = app
        .client
        .post(&url)
        .json(&json!({ "hr_user_id": hr_id, "name": "Kept Co", "fail": false }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 201);

    // Registered effects were intentional and stay put.
    let kept = company_by_name(&app, "Kept Co").await.expect("record kept");
    assert!(kept.logo_id.is_some());

    let logo_dir = app.media_dir.path().join("companies/effects-kept-co/logo");
    let entries: Vec<_> = std::fs::read_dir(&logo_dir).unwrap().collect();
    assert_eq!(entries.len(), 1, "uploaded file should survive");
}

#[tokio::test]
async fn failure_before_any_effect_cleans_nothing_and_breaks_nothing() {
    let app = TestApp::spawn().await;
    let (token, _, _) = app.create_authenticated_user("company_hr").await;

    // Role check fails before any side effect: the middleware sees a 4xx
    // with no registrations and must pass the response through untouched.
    let res = app
        .post_with_token(
            crate::common::routes::JOBS,
            &json!({
                "title": "No Company Job",
                "location": "remote",
                "working_time": "full-time",
                "seniority": "mid",
                "description": "Fails validation downstream.",
            }),
            &token,
        )
        .await;
    assert_eq!(res.status, 400);
    assert_eq!(res.error_code(), "VALIDATION_ERROR");
}
