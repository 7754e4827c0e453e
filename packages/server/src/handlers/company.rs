use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{application, company, job, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::company::{
    CompanyDetailResponse, CompanyResponse, CompanySearchQuery, CreateCompanyRequest,
    UpdateCompanyRequest, validate_create_company, validate_update_company,
};
use crate::models::job::JobResponse;
use crate::models::shared::ApiResponse;
use crate::rollback::{PendingRecord, RequestEffects};
use crate::state::AppState;
use crate::utils::{media, multipart};

#[utoipa::path(
    post,
    path = "/api/v1/companies",
    tag = "Companies",
    operation_id = "createCompany",
    summary = "Create a company",
    description = "Creates the calling HR's company. Multipart form: `data` JSON part plus an \
        optional `file` logo. An HR account owns at most one company; name and email are unique.",
    request_body(content_type = "multipart/form-data", description = "`data` JSON part + optional `file` logo"),
    responses(
        (status = 201, description = "Company created", body = ApiResponse<CompanyResponse>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Second company, or name/email taken (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip_all, fields(user_id = auth_user.user_id))]
pub async fn create_company(
    auth_user: AuthUser,
    State(state): State<AppState>,
    effects: RequestEffects,
    form: Multipart,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_role(user::ROLE_COMPANY_HR)?;

    let (payload, logo_file) =
        multipart::parse_form::<CreateCompanyRequest>(form, state.config.storage.max_upload_size)
            .await?;
    let payload = payload.ok_or_else(|| AppError::Validation("Missing 'data' field".into()))?;
    validate_create_company(&payload)?;

    let owned = company::Entity::find()
        .filter(company::Column::HrUserId.eq(auth_user.user_id))
        .one(&state.db)
        .await?;
    if owned.is_some() {
        return Err(AppError::Conflict(
            "You cannot add more than one company".into(),
        ));
    }

    let name = payload.name.trim().to_string();
    let email = payload.email.trim().to_lowercase();
    let duplicate = company::Entity::find()
        .filter(
            Condition::any()
                .add(company::Column::Name.eq(name.as_str()))
                .add(company::Column::Email.eq(email.as_str())),
        )
        .one(&state.db)
        .await?;
    if duplicate.is_some() {
        return Err(AppError::Conflict("Company already exists".into()));
    }

    let folder = media::new_company_folder();
    let mut logo = None;
    if let Some(file) = logo_file {
        let dest = media::company_logo_folder(&folder);
        let uploaded = state.media.upload(&file.bytes, &dest, &file.filename).await?;
        effects.register_upload(&dest);
        logo = Some(uploaded);
    }

    let now = chrono::Utc::now();
    let new_company = company::ActiveModel {
        name: Set(name),
        description: Set(payload.description),
        industry: Set(payload.industry),
        address: Set(payload.address),
        employee_count: Set(payload.employee_count),
        email: Set(email),
        hr_user_id: Set(auth_user.user_id),
        logo_id: Set(logo.as_ref().map(|m| m.id.clone())),
        logo_url: Set(logo.as_ref().map(|m| m.url.clone())),
        media_folder: Set(folder),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let created = new_company.insert(&state.db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            tracing::debug!("Company creation race condition: unique constraint caught on insert");
            AppError::Conflict("Company already exists".into())
        }
        _ => AppError::from(e),
    })?;
    effects.register_creation(PendingRecord::Company(created.id));

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            "Company created successfully",
            CompanyResponse::from(created),
        )),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/companies/search",
    tag = "Companies",
    operation_id = "searchCompany",
    summary = "Search for a company by name",
    params(CompanySearchQuery),
    responses(
        (status = 200, description = "Company found", body = ApiResponse<CompanyResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Company not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn search_company(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<CompanySearchQuery>,
) -> Result<Json<ApiResponse<CompanyResponse>>, AppError> {
    auth_user.require_any_role(&[user::ROLE_APPLICANT, user::ROLE_COMPANY_HR])?;

    let found = company::Entity::find()
        .filter(company::Column::Name.eq(query.name.trim()))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Company not found".into()))?;

    Ok(Json(ApiResponse::new(
        "Company found successfully",
        CompanyResponse::from(found),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/companies/{id}",
    tag = "Companies",
    operation_id = "getCompany",
    summary = "Get the calling HR's company with its jobs",
    params(("id" = i32, Path, description = "Company ID")),
    responses(
        (status = 200, description = "Company data", body = ApiResponse<CompanyDetailResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Company not found or not owned (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_company(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<CompanyDetailResponse>>, AppError> {
    auth_user.require_role(user::ROLE_COMPANY_HR)?;

    let found = find_owned_company(&state.db, id, auth_user.user_id).await?;

    // The company's jobs hang off its HR account.
    let jobs = job::Entity::find()
        .filter(job::Column::AddedBy.eq(found.hr_user_id))
        .order_by_desc(job::Column::CreatedAt)
        .all(&state.db)
        .await?
        .into_iter()
        .map(JobResponse::from)
        .collect();

    Ok(Json(ApiResponse::new(
        "Company data found successfully",
        CompanyDetailResponse {
            company: CompanyResponse::from(found),
            jobs,
        },
    )))
}

#[utoipa::path(
    patch,
    path = "/api/v1/companies/{id}",
    tag = "Companies",
    operation_id = "updateCompany",
    summary = "Update the calling HR's company",
    description = "Multipart form: `data` JSON part with PATCH semantics plus an optional `file` \
        replacing the logo.",
    params(("id" = i32, Path, description = "Company ID")),
    request_body(content_type = "multipart/form-data", description = "`data` JSON part + optional `file` logo"),
    responses(
        (status = 200, description = "Company updated", body = ApiResponse<CompanyResponse>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Company not found or not owned (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Name/email taken (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip_all, fields(id, user_id = auth_user.user_id))]
pub async fn update_company(
    auth_user: AuthUser,
    State(state): State<AppState>,
    effects: RequestEffects,
    Path(id): Path<i32>,
    form: Multipart,
) -> Result<Json<ApiResponse<CompanyResponse>>, AppError> {
    auth_user.require_role(user::ROLE_COMPANY_HR)?;

    let (payload, logo_file) =
        multipart::parse_form::<UpdateCompanyRequest>(form, state.config.storage.max_upload_size)
            .await?;
    let payload = payload.unwrap_or_default();
    validate_update_company(&payload)?;

    let found = find_owned_company(&state.db, id, auth_user.user_id).await?;

    let mut logo = None;
    if let Some(file) = logo_file {
        if let Some(old_id) = &found.logo_id {
            if let Err(e) = state.media.delete(old_id).await {
                tracing::warn!("Failed to delete old logo {old_id}: {e}");
            }
        }
        let dest = media::company_logo_folder(&found.media_folder);
        let uploaded = state.media.upload(&file.bytes, &dest, &file.filename).await?;
        effects.register_upload(&dest);
        logo = Some(uploaded);
    }

    let mut active: company::ActiveModel = found.into();
    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    match payload.description {
        Some(Some(description)) => active.description = Set(Some(description)),
        Some(None) => active.description = Set(None),
        None => {}
    }
    match payload.industry {
        Some(Some(industry)) => active.industry = Set(Some(industry)),
        Some(None) => active.industry = Set(None),
        None => {}
    }
    match payload.address {
        Some(Some(address)) => active.address = Set(Some(address)),
        Some(None) => active.address = Set(None),
        None => {}
    }
    if let Some(count) = payload.employee_count {
        active.employee_count = Set(count);
    }
    if let Some(email) = payload.email {
        active.email = Set(email.trim().to_lowercase());
    }
    if let Some(uploaded) = logo {
        active.logo_id = Set(Some(uploaded.id));
        active.logo_url = Set(Some(uploaded.url));
    }
    active.updated_at = Set(chrono::Utc::now());

    let updated = active.update(&state.db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("Company already exists".into())
        }
        _ => AppError::from(e),
    })?;

    Ok(Json(ApiResponse::new(
        "Company data updated successfully",
        CompanyResponse::from(updated),
    )))
}

#[utoipa::path(
    delete,
    path = "/api/v1/companies/{id}",
    tag = "Companies",
    operation_id = "deleteCompany",
    summary = "Delete the calling HR's company",
    description = "Deletes the company, all jobs it posted, and every application to those jobs \
        in one transaction, then removes the company's media folder.",
    params(("id" = i32, Path, description = "Company ID")),
    responses(
        (status = 200, description = "Company deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Company not found or not owned (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, user_id = auth_user.user_id))]
pub async fn delete_company(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    auth_user.require_role(user::ROLE_COMPANY_HR)?;

    let found = find_owned_company(&state.db, id, auth_user.user_id).await?;
    let folder = found.media_folder.clone();

    let txn = state.db.begin().await?;

    let job_ids: Vec<i32> = job::Entity::find()
        .filter(job::Column::AddedBy.eq(found.hr_user_id))
        .select_only()
        .column(job::Column::Id)
        .into_tuple::<i32>()
        .all(&txn)
        .await?;

    // No jobs is not an error, just an empty cascade.
    if !job_ids.is_empty() {
        application::Entity::delete_many()
            .filter(application::Column::JobId.is_in(job_ids.clone()))
            .exec(&txn)
            .await?;
        job::Entity::delete_many()
            .filter(job::Column::Id.is_in(job_ids))
            .exec(&txn)
            .await?;
    }
    company::Entity::delete_by_id(found.id).exec(&txn).await?;

    txn.commit().await?;

    if let Err(e) = state.media.delete_prefix(&folder).await {
        tracing::warn!("Failed to purge media folder {folder}: {e}");
    } else if let Err(e) = state.media.delete_folder(&folder).await {
        tracing::warn!("Failed to remove media folder {folder}: {e}");
    }

    Ok(Json(ApiResponse::message("Company data deleted successfully")))
}

/// Load a company by id, treating records owned by someone else as absent.
pub async fn find_owned_company<C: ConnectionTrait>(
    db: &C,
    id: i32,
    hr_user_id: i32,
) -> Result<company::Model, AppError> {
    let found = company::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Company not found".into()))?;

    if found.hr_user_id != hr_user_id {
        return Err(AppError::NotFound("Company not found".into()));
    }

    Ok(found)
}
