use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{application, company, job, user};
use crate::error::AppError;
use crate::extractors::auth::AuthUser;
use crate::models::shared::ApiResponse;
use crate::models::user::{
    RecoveryEmailQuery, UpdateAccountRequest, UserResponse, validate_update_account,
};
use crate::rollback::RequestEffects;
use crate::state::AppState;
use crate::utils::{media, multipart};

/// Public profile lookup by user id. No authentication required.
#[instrument(skip(state), fields(id))]
pub async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let account = find_account(&state.db, id).await?;
    Ok(Json(ApiResponse::new(
        "User profile fetched successfully",
        UserResponse::from(account),
    )))
}

/// List accounts sharing a recovery e-mail.
#[instrument(skip(state, query))]
pub async fn list_by_recovery_email(
    State(state): State<AppState>,
    Query(query): Query<RecoveryEmailQuery>,
) -> Result<Json<ApiResponse<Vec<UserResponse>>>, AppError> {
    let accounts = user::Entity::find()
        .filter(user::Column::RecoveryEmail.eq(query.recovery_email.trim().to_lowercase()))
        .all(&state.db)
        .await?;

    if accounts.is_empty() {
        return Err(AppError::NotFound(
            "No account found associated with this recovery email".into(),
        ));
    }

    Ok(Json(ApiResponse::new(
        "Accounts fetched successfully",
        accounts.into_iter().map(UserResponse::from).collect::<Vec<_>>(),
    )))
}

/// Update the current account. Multipart form: `data` JSON part with PATCH
/// semantics, optional `file` part replacing the profile picture.
#[instrument(skip_all, fields(user_id = auth_user.user_id))]
pub async fn update_account(
    auth_user: AuthUser,
    State(state): State<AppState>,
    effects: RequestEffects,
    form: Multipart,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let (payload, picture) =
        multipart::parse_form::<UpdateAccountRequest>(form, state.config.storage.max_upload_size)
            .await?;
    let payload = payload.unwrap_or_default();
    validate_update_account(&payload)?;

    let account = find_account(&state.db, auth_user.user_id).await?;

    let mut image = None;
    if let Some(file) = picture {
        // Replace, not accumulate: the old picture goes first.
        if let Some(old_id) = &account.profile_image_id {
            if let Err(e) = state.media.delete(old_id).await {
                tracing::warn!("Failed to delete old profile picture {old_id}: {e}");
            }
        }
        let dest = media::user_profile_folder(&account.media_folder);
        let uploaded = state.media.upload(&file.bytes, &dest, &file.filename).await?;
        effects.register_upload(&dest);
        image = Some(uploaded);
    }

    let mut active: user::ActiveModel = account.into();
    if let Some(first) = payload.first_name {
        active.first_name = Set(first.trim().to_string());
    }
    if let Some(last) = payload.last_name {
        active.last_name = Set(last.trim().to_string());
    }
    if let Some(email) = payload.email {
        active.email = Set(email.trim().to_lowercase());
    }
    if let Some(mobile) = payload.mobile_number {
        active.mobile_number = Set(mobile.trim().to_string());
    }
    match payload.recovery_email {
        Some(Some(recovery)) => active.recovery_email = Set(Some(recovery.trim().to_lowercase())),
        Some(None) => active.recovery_email = Set(None),
        None => {}
    }
    match payload.date_of_birth {
        Some(Some(dob)) => active.date_of_birth = Set(Some(dob)),
        Some(None) => active.date_of_birth = Set(None),
        None => {}
    }
    if let Some(uploaded) = image {
        active.profile_image_id = Set(Some(uploaded.id));
        active.profile_image_url = Set(Some(uploaded.url));
    }
    active.updated_at = Set(chrono::Utc::now());

    let updated = active.update(&state.db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::Conflict(
            "An account with this email or mobile number already exists".into(),
        ),
        _ => AppError::from(e),
    })?;

    Ok(Json(ApiResponse::new(
        "Account updated successfully",
        UserResponse::from(updated),
    )))
}

/// Delete the current account and every application it submitted. An HR
/// account also takes its company, that company's jobs, and their
/// applications with it. Media folders are removed afterwards, best-effort.
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn delete_account(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let account = find_account(&state.db, auth_user.user_id).await?;
    let mut folders = vec![account.media_folder.clone()];

    let owned = company::Entity::find()
        .filter(company::Column::HrUserId.eq(account.id))
        .one(&state.db)
        .await?;

    let txn = state.db.begin().await?;
    if let Some(owned) = &owned {
        let job_ids: Vec<i32> = job::Entity::find()
            .filter(job::Column::AddedBy.eq(account.id))
            .select_only()
            .column(job::Column::Id)
            .into_tuple::<i32>()
            .all(&txn)
            .await?;
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
        company::Entity::delete_by_id(owned.id).exec(&txn).await?;
        folders.push(owned.media_folder.clone());
    }
    application::Entity::delete_many()
        .filter(application::Column::UserId.eq(account.id))
        .exec(&txn)
        .await?;
    user::Entity::delete_by_id(account.id).exec(&txn).await?;
    txn.commit().await?;

    for folder in folders {
        if let Err(e) = state.media.delete_prefix(&folder).await {
            tracing::warn!("Failed to purge media folder {folder}: {e}");
        } else if let Err(e) = state.media.delete_folder(&folder).await {
            tracing::warn!("Failed to remove media folder {folder}: {e}");
        }
    }

    Ok(Json(ApiResponse::message("Account deleted successfully")))
}

async fn find_account<C: ConnectionTrait>(db: &C, id: i32) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}
