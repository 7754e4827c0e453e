use std::collections::HashMap;

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{application, company, job, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::handlers::company::find_owned_company;
use crate::models::application::{
    ApplicationDetailResponse, ApplicationResponse, ApplyRequest, CompanyApplicationsResponse,
};
use crate::models::job::JobResponse;
use crate::models::shared::ApiResponse;
use crate::models::user::UserResponse;
use crate::rollback::{PendingRecord, RequestEffects};
use crate::state::AppState;
use crate::utils::{media, multipart};

#[utoipa::path(
    post,
    path = "/api/v1/jobs/{id}/applications",
    tag = "Applications",
    operation_id = "applyToJob",
    summary = "Apply to a job",
    description = "Submits an application as the calling applicant. Multipart form: optional \
        `data` JSON part with skill lists plus an optional `file` resume. The job must exist \
        before any side effect happens.",
    params(("id" = i32, Path, description = "Job ID")),
    request_body(content_type = "multipart/form-data", description = "optional `data` JSON part + optional `file` resume"),
    responses(
        (status = 201, description = "Application created", body = ApiResponse<ApplicationResponse>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Job not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip_all, fields(job_id, user_id = auth_user.user_id))]
pub async fn apply_to_job(
    auth_user: AuthUser,
    State(state): State<AppState>,
    effects: RequestEffects,
    Path(job_id): Path<i32>,
    form: Multipart,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_role(user::ROLE_APPLICANT)?;

    let posting = job::Entity::find_by_id(job_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".into()))?;

    let (payload, resume_file) =
        multipart::parse_form::<ApplyRequest>(form, state.config.storage.max_upload_size).await?;
    let payload = payload.unwrap_or_default();

    let mut resume = None;
    if let Some(file) = resume_file {
        // Resumes live under the posting company's media folder.
        let owning_company = company::Entity::find()
            .filter(company::Column::HrUserId.eq(posting.added_by))
            .one(&state.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Company not found".into()))?;

        let dest = media::job_resume_folder(&owning_company.media_folder, posting.id);
        let uploaded = state.media.upload(&file.bytes, &dest, &file.filename).await?;
        effects.register_upload(&dest);
        resume = Some(uploaded);
    }

    let new_application = application::ActiveModel {
        job_id: Set(posting.id),
        user_id: Set(auth_user.user_id),
        tech_skills: Set(to_json(&payload.tech_skills)?),
        soft_skills: Set(to_json(&payload.soft_skills)?),
        resume_id: Set(resume.as_ref().map(|m| m.id.clone())),
        resume_url: Set(resume.as_ref().map(|m| m.url.clone())),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let created = new_application.insert(&state.db).await?;
    effects.register_creation(PendingRecord::Application(created.id));

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            "Job application sent successfully",
            ApplicationResponse::from(created),
        )),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/companies/{id}/applications",
    tag = "Applications",
    operation_id = "listCompanyApplications",
    summary = "List every application for a company's jobs",
    description = "Returns all applications across all jobs posted by the company, each with its \
        job and applicant resolved. Only the owning HR may call this.",
    params(("id" = i32, Path, description = "Company ID")),
    responses(
        (status = 200, description = "Applications with context", body = ApiResponse<CompanyApplicationsResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Company not found or not owned (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(company_id, user_id = auth_user.user_id))]
pub async fn list_company_applications(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(company_id): Path<i32>,
) -> Result<Json<ApiResponse<CompanyApplicationsResponse>>, AppError> {
    auth_user.require_role(user::ROLE_COMPANY_HR)?;

    let owned = find_owned_company(&state.db, company_id, auth_user.user_id).await?;

    let jobs: HashMap<i32, job::Model> = job::Entity::find()
        .filter(job::Column::AddedBy.eq(owned.hr_user_id))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|j| (j.id, j))
        .collect();

    if jobs.is_empty() {
        return Ok(Json(ApiResponse::new(
            "Applications found successfully",
            CompanyApplicationsResponse {
                applications: Vec::new(),
                total: 0,
            },
        )));
    }

    let rows = application::Entity::find()
        .filter(application::Column::JobId.is_in(jobs.keys().copied().collect::<Vec<_>>()))
        .order_by_asc(application::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let applicants = applicants_by_id(&state.db, rows.iter().map(|a| a.user_id)).await?;

    let applications: Vec<ApplicationDetailResponse> = rows
        .into_iter()
        .map(|row| ApplicationDetailResponse {
            job: jobs.get(&row.job_id).cloned().map(JobResponse::from),
            applicant: applicants
                .get(&row.user_id)
                .cloned()
                .map(UserResponse::from),
            application: ApplicationResponse::from(row),
        })
        .collect();

    let total = applications.len() as u64;
    Ok(Json(ApiResponse::new(
        "Applications found successfully",
        CompanyApplicationsResponse {
            applications,
            total,
        },
    )))
}

/// Resolve applicant accounts by id.
async fn applicants_by_id<C: ConnectionTrait>(
    db: &C,
    user_ids: impl Iterator<Item = i32>,
) -> Result<HashMap<i32, user::Model>, AppError> {
    let ids: Vec<i32> = {
        let mut ids: Vec<i32> = user_ids.collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    };
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let accounts = user::Entity::find()
        .filter(user::Column::Id.is_in(ids))
        .all(db)
        .await?;

    Ok(accounts.into_iter().map(|u| (u.id, u)).collect())
}

fn to_json(skills: &[String]) -> Result<serde_json::Value, AppError> {
    serde_json::to_value(skills).map_err(|e| AppError::Internal(format!("Skill encoding error: {e}")))
}
