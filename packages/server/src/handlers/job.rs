use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{application, company, job, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::company::CompanyResponse;
use crate::models::job::{
    CompanyJobsQuery, CompanyJobsResponse, CreateJobRequest, JobListQuery, JobListResponse,
    JobResponse, JobWithCompany, UpdateJobRequest, validate_create_job, validate_update_job,
};
use crate::models::shared::{ApiResponse, Pagination, escape_like};
use crate::rollback::{PendingRecord, RequestEffects};
use crate::state::AppState;
use crate::utils::media;

#[utoipa::path(
    post,
    path = "/api/v1/jobs",
    tag = "Jobs",
    operation_id = "createJob",
    summary = "Post a new job",
    description = "Creates a job owned by the calling HR. The HR must already own a company.",
    request_body = CreateJobRequest,
    responses(
        (status = 201, description = "Job created", body = ApiResponse<JobResponse>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, effects, payload), fields(user_id = auth_user.user_id))]
pub async fn create_job(
    auth_user: AuthUser,
    State(state): State<AppState>,
    effects: RequestEffects,
    AppJson(payload): AppJson<CreateJobRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_role(user::ROLE_COMPANY_HR)?;
    validate_create_job(&payload)?;

    // The posting identity must resolve to exactly one company.
    let owned = company::Entity::find()
        .filter(company::Column::HrUserId.eq(auth_user.user_id))
        .one(&state.db)
        .await?;
    if owned.is_none() {
        return Err(AppError::Validation(
            "You must create a company before posting jobs".into(),
        ));
    }

    let now = chrono::Utc::now();
    let new_job = job::ActiveModel {
        title: Set(payload.title.trim().to_string()),
        location: Set(payload.location.as_str().to_string()),
        working_time: Set(payload.working_time.as_str().to_string()),
        seniority: Set(payload.seniority.as_str().to_string()),
        description: Set(payload.description),
        technical_skills: Set(to_json(&payload.technical_skills)?),
        soft_skills: Set(to_json(&payload.soft_skills)?),
        added_by: Set(auth_user.user_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let created = new_job.insert(&state.db).await?;
    effects.register_creation(PendingRecord::Job(created.id));

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            "Job added successfully",
            JobResponse::from(created),
        )),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/jobs",
    tag = "Jobs",
    operation_id = "listJobs",
    summary = "List jobs with their companies",
    description = "Paginated job list with each job's company resolved. Filters are an explicit \
        allow-list: `location`, `working_time`, `seniority`, and a case-insensitive `title` \
        substring; unknown query keys are ignored.",
    params(JobListQuery),
    responses(
        (status = 200, description = "Jobs with companies", body = ApiResponse<JobListResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_jobs(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<JobListQuery>,
) -> Result<Json<ApiResponse<JobListResponse>>, AppError> {
    auth_user.require_any_role(&[user::ROLE_APPLICANT, user::ROLE_COMPANY_HR])?;

    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let mut select = job::Entity::find();
    if let Some(location) = query.location {
        select = select.filter(job::Column::Location.eq(location.as_str()));
    }
    if let Some(working_time) = query.working_time {
        select = select.filter(job::Column::WorkingTime.eq(working_time.as_str()));
    }
    if let Some(seniority) = query.seniority {
        select = select.filter(job::Column::Seniority.eq(seniority.as_str()));
    }
    if let Some(ref title) = query.title {
        let term = escape_like(title.trim());
        if !term.is_empty() {
            select = select.filter(
                Expr::expr(Func::lower(Expr::col(job::Column::Title)))
                    .like(LikeExpr::new(format!("%{}%", term.to_lowercase())).escape('\\')),
            );
        }
    }

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;
    let total_pages = total.div_ceil(per_page);

    let jobs = select
        .order_by_desc(job::Column::CreatedAt)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?;

    let companies = companies_by_hr(&state.db, jobs.iter().map(|j| j.added_by)).await?;
    let data = jobs
        .into_iter()
        .map(|j| {
            let company = companies.get(&j.added_by).cloned().map(CompanyResponse::from);
            JobWithCompany {
                job: JobResponse::from(j),
                company,
            }
        })
        .collect();

    Ok(Json(ApiResponse::new(
        "All jobs with companies info fetched successfully",
        JobListResponse {
            data,
            pagination: Pagination {
                page,
                per_page,
                total,
                total_pages,
            },
        },
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/jobs/company",
    tag = "Jobs",
    operation_id = "listCompanyJobs",
    summary = "List all jobs for a named company",
    params(CompanyJobsQuery),
    responses(
        (status = 200, description = "Company and its jobs", body = ApiResponse<CompanyJobsResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Company not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_company_jobs(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<CompanyJobsQuery>,
) -> Result<Json<ApiResponse<CompanyJobsResponse>>, AppError> {
    auth_user.require_any_role(&[user::ROLE_APPLICANT, user::ROLE_COMPANY_HR])?;

    let found = company::Entity::find()
        .filter(company::Column::Name.eq(query.name.trim()))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Company not found".into()))?;

    let jobs = job::Entity::find()
        .filter(job::Column::AddedBy.eq(found.hr_user_id))
        .order_by_desc(job::Column::CreatedAt)
        .all(&state.db)
        .await?
        .into_iter()
        .map(JobResponse::from)
        .collect();

    let name = found.name.clone();
    Ok(Json(ApiResponse::new(
        format!("All jobs for {name} fetched successfully"),
        CompanyJobsResponse {
            company: CompanyResponse::from(found),
            jobs,
        },
    )))
}

#[utoipa::path(
    patch,
    path = "/api/v1/jobs/{id}",
    tag = "Jobs",
    operation_id = "updateJob",
    summary = "Update a job",
    description = "Partially updates a job using PATCH semantics. Only the posting HR may update \
        it; an empty payload returns the current job unchanged.",
    params(("id" = i32, Path, description = "Job ID")),
    request_body = UpdateJobRequest,
    responses(
        (status = 200, description = "Job updated", body = ApiResponse<JobResponse>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Job not found or not owned (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, user_id = auth_user.user_id))]
pub async fn update_job(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateJobRequest>,
) -> Result<Json<ApiResponse<JobResponse>>, AppError> {
    auth_user.require_role(user::ROLE_COMPANY_HR)?;
    validate_update_job(&payload)?;

    let found = find_owned_job(&state.db, id, auth_user.user_id).await?;

    if payload == UpdateJobRequest::default() {
        return Ok(Json(ApiResponse::new(
            "Job updated successfully",
            JobResponse::from(found),
        )));
    }

    let mut active: job::ActiveModel = found.into();
    if let Some(title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(location) = payload.location {
        active.location = Set(location.as_str().to_string());
    }
    if let Some(working_time) = payload.working_time {
        active.working_time = Set(working_time.as_str().to_string());
    }
    if let Some(seniority) = payload.seniority {
        active.seniority = Set(seniority.as_str().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(technical_skills) = payload.technical_skills {
        active.technical_skills = Set(to_json(&technical_skills)?);
    }
    if let Some(soft_skills) = payload.soft_skills {
        active.soft_skills = Set(to_json(&soft_skills)?);
    }
    active.updated_at = Set(chrono::Utc::now());

    let updated = active.update(&state.db).await?;

    Ok(Json(ApiResponse::new(
        "Job updated successfully",
        JobResponse::from(updated),
    )))
}

#[utoipa::path(
    delete,
    path = "/api/v1/jobs/{id}",
    tag = "Jobs",
    operation_id = "deleteJob",
    summary = "Delete a job",
    description = "Deletes the job and all applications to it in one transaction, then removes \
        the job's media subtree (submitted resumes).",
    params(("id" = i32, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Job deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Job not found or not owned (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, user_id = auth_user.user_id))]
pub async fn delete_job(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    auth_user.require_role(user::ROLE_COMPANY_HR)?;

    let found = find_owned_job(&state.db, id, auth_user.user_id).await?;

    let owned = company::Entity::find()
        .filter(company::Column::HrUserId.eq(auth_user.user_id))
        .one(&state.db)
        .await?;

    let txn = state.db.begin().await?;
    application::Entity::delete_many()
        .filter(application::Column::JobId.eq(found.id))
        .exec(&txn)
        .await?;
    job::Entity::delete_by_id(found.id).exec(&txn).await?;
    txn.commit().await?;

    if let Some(owned) = owned {
        let folder = media::job_folder(&owned.media_folder, found.id);
        if let Err(e) = state.media.delete_prefix(&folder).await {
            tracing::warn!("Failed to purge media folder {folder}: {e}");
        } else if let Err(e) = state.media.delete_folder(&folder).await {
            tracing::warn!("Failed to remove media folder {folder}: {e}");
        }
    }

    Ok(Json(ApiResponse::message("Job deleted successfully")))
}

/// Load a job by id, treating records posted by someone else as absent.
pub async fn find_owned_job<C: ConnectionTrait>(
    db: &C,
    id: i32,
    hr_user_id: i32,
) -> Result<job::Model, AppError> {
    let found = job::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".into()))?;

    if found.added_by != hr_user_id {
        return Err(AppError::NotFound("Job not found".into()));
    }

    Ok(found)
}

/// Resolve the companies owned by the given HR ids, keyed by HR id.
async fn companies_by_hr<C: ConnectionTrait>(
    db: &C,
    hr_ids: impl Iterator<Item = i32>,
) -> Result<HashMap<i32, company::Model>, AppError> {
    let ids: Vec<i32> = {
        let mut ids: Vec<i32> = hr_ids.collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    };
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let companies = company::Entity::find()
        .filter(company::Column::HrUserId.is_in(ids))
        .all(db)
        .await?;

    Ok(companies.into_iter().map(|c| (c.hr_user_id, c)).collect())
}

fn to_json(skills: &[String]) -> Result<serde_json::Value, AppError> {
    serde_json::to_value(skills).map_err(|e| AppError::Internal(format!("Skill encoding error: {e}")))
}
