use axum::{
    Json,
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sea_orm::*;
use tracing::instrument;

use crate::entity::user;
use crate::error::AppError;
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::auth::{
    ForgotPasswordRequest, LoginRequest, LoginResponse, RegisterRequest, ResetPasswordRequest,
    UpdatePasswordRequest, VerifyEmailQuery, validate_login_request, validate_register_request,
    validate_reset_password, validate_update_password,
};
use crate::models::shared::ApiResponse;
use crate::models::user::UserResponse;
use crate::rollback::{PendingRecord, RequestEffects};
use crate::state::AppState;
use crate::utils::{hash, jwt, media, multipart, otp};

const DUPLICATE_ACCOUNT: &str = "An account with this email or mobile number already exists";

/// Handle sign-up: multipart form with a `data` JSON part and an optional
/// `file` profile picture.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    effects: RequestEffects,
    form: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let (payload, picture) =
        multipart::parse_form::<RegisterRequest>(form, state.config.storage.max_upload_size)
            .await?;
    let payload = payload.ok_or_else(|| AppError::Validation("Missing 'data' field".into()))?;
    validate_register_request(&payload)?;

    let email = payload.email.trim().to_lowercase();
    let mobile = payload.mobile_number.trim().to_string();

    // Fast path for a friendly message; the unique indexes are what
    // actually close the race on insert below.
    let existing = user::Entity::find()
        .filter(
            Condition::any()
                .add(user::Column::Email.eq(email.as_str()))
                .add(user::Column::MobileNumber.eq(mobile.as_str())),
        )
        .one(&state.db)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(DUPLICATE_ACCOUNT.into()));
    }

    let folder = media::new_user_folder();
    let mut image = None;
    if let Some(file) = picture {
        let dest = media::user_profile_folder(&folder);
        let uploaded = state.media.upload(&file.bytes, &dest, &file.filename).await?;
        effects.register_upload(&dest);
        image = Some(uploaded);
    }

    let password_hash = hash::hash_password(&payload.password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {e}")))?;

    let now = chrono::Utc::now();
    let new_user = user::ActiveModel {
        first_name: Set(payload.first_name.trim().to_string()),
        last_name: Set(payload.last_name.trim().to_string()),
        email: Set(email.clone()),
        password: Set(password_hash),
        recovery_email: Set(payload.recovery_email.map(|r| r.trim().to_lowercase())),
        role: Set(payload.role.unwrap_or_else(|| user::DEFAULT_ROLE.to_string())),
        status: Set(user::STATUS_OFFLINE.to_string()),
        mobile_number: Set(mobile),
        date_of_birth: Set(payload.date_of_birth),
        profile_image_id: Set(image.as_ref().map(|m| m.id.clone())),
        profile_image_url: Set(image.as_ref().map(|m| m.url.clone())),
        media_folder: Set(folder),
        email_verified: Set(false),
        otp_hash: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let created = new_user.insert(&state.db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            tracing::debug!("Sign-up race condition: unique constraint caught on insert");
            AppError::Conflict(DUPLICATE_ACCOUNT.into())
        }
        _ => AppError::from(e),
    })?;
    effects.register_creation(PendingRecord::User(created.id));

    let token = jwt::sign_verification(&created.email, &state.config.auth.jwt_secret)
        .map_err(|e| AppError::Internal(format!("JWT sign error: {e}")))?;
    let link = format!(
        "{}/api/v1/auth/verify-email?token={token}",
        state.config.server.public_url.trim_end_matches('/')
    );
    state
        .mailer
        .send(
            &created.email,
            "Account verification",
            &format!("Welcome to Hireboard! Verify your account: {link}"),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            "Account created, please check your email to verify it",
            UserResponse::from(created),
        )),
    ))
}

/// Handle login with e-mail or mobile number.
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, AppError> {
    validate_login_request(&payload)?;

    let mut identifier = Condition::any();
    if let Some(email) = &payload.email {
        identifier = identifier.add(user::Column::Email.eq(email.trim().to_lowercase()));
    }
    if let Some(mobile) = &payload.mobile_number {
        identifier = identifier.add(user::Column::MobileNumber.eq(mobile.trim()));
    }

    let account = user::Entity::find()
        .filter(identifier)
        .one(&state.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let is_valid = hash::verify_password(&payload.password, &account.password)
        .map_err(|e| AppError::Internal(format!("Password verify error: {e}")))?;
    if !is_valid {
        return Err(AppError::InvalidCredentials);
    }

    let token = jwt::sign(
        account.id,
        &account.email,
        &account.role,
        &state.config.auth.jwt_secret,
    )
    .map_err(|e| AppError::Internal(format!("JWT sign error: {e}")))?;

    let mut active: user::ActiveModel = account.into();
    active.status = Set(user::STATUS_ONLINE.to_string());
    active.updated_at = Set(chrono::Utc::now());
    let account = active.update(&state.db).await?;

    Ok(Json(ApiResponse::new(
        "Logged in successfully",
        LoginResponse {
            token,
            email: account.email,
            role: account.role,
        },
    )))
}

/// Confirm an account's e-mail address from the sign-up link.
#[instrument(skip(state, query))]
pub async fn verify_email(
    State(state): State<AppState>,
    Query(query): Query<VerifyEmailQuery>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let email = jwt::verify_verification(&query.token, &state.config.auth.jwt_secret)
        .map_err(|_| AppError::TokenInvalid)?;

    let account = user::Entity::find()
        .filter(user::Column::Email.eq(&email))
        .filter(user::Column::EmailVerified.eq(false))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("No unverified account found for this email".into()))?;

    let mut active: user::ActiveModel = account.into();
    active.email_verified = Set(true);
    active.updated_at = Set(chrono::Utc::now());
    let account = active.update(&state.db).await?;

    Ok(Json(ApiResponse::new(
        "Email verified successfully",
        UserResponse::from(account),
    )))
}

/// Return the current authenticated account's data.
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn me(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let account = find_account(&state.db, auth_user.user_id).await?;
    Ok(Json(ApiResponse::new(
        "Account data fetched successfully",
        UserResponse::from(account),
    )))
}

/// Change the current account's password, verifying the old one.
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn update_password(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<UpdatePasswordRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    validate_update_password(&payload)?;

    let account = find_account(&state.db, auth_user.user_id).await?;

    let is_valid = hash::verify_password(&payload.old_password, &account.password)
        .map_err(|e| AppError::Internal(format!("Password verify error: {e}")))?;
    if !is_valid {
        return Err(AppError::InvalidCredentials);
    }

    let new_hash = hash::hash_password(&payload.new_password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {e}")))?;
    let mut active: user::ActiveModel = account.into();
    active.password = Set(new_hash);
    active.updated_at = Set(chrono::Utc::now());
    active.update(&state.db).await?;

    Ok(Json(ApiResponse::message("Password updated successfully")))
}

/// Start a password reset: e-mail a one-time password and store its hash.
#[instrument(skip(state, payload))]
pub async fn forgot_password(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ForgotPasswordRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let account = user::Entity::find()
        .filter(user::Column::Email.eq(payload.email.trim().to_lowercase()))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("No account found associated with this email".into()))?;

    let code = otp::generate();
    state
        .mailer
        .send(
            &account.email,
            "Password reset",
            &format!("Use this one-time password to reset your Hireboard password: {code}"),
        )
        .await?;

    let otp_hash = hash::hash_password(&code)
        .map_err(|e| AppError::Internal(format!("OTP hash error: {e}")))?;
    let mut active: user::ActiveModel = account.into();
    active.otp_hash = Set(Some(otp_hash));
    active.updated_at = Set(chrono::Utc::now());
    active.update(&state.db).await?;

    Ok(Json(ApiResponse::message(
        "OTP sent successfully, please check your email",
    )))
}

/// Finish a password reset with the e-mailed one-time password.
#[instrument(skip(state, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ResetPasswordRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    validate_reset_password(&payload)?;

    let account = user::Entity::find()
        .filter(user::Column::Email.eq(payload.email.trim().to_lowercase()))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("No account found associated with this email".into()))?;

    let stored = account.otp_hash.clone().ok_or(AppError::OtpInvalid)?;
    let is_valid = hash::verify_password(&payload.otp, &stored)
        .map_err(|e| AppError::Internal(format!("OTP verify error: {e}")))?;
    if !is_valid {
        return Err(AppError::OtpInvalid);
    }

    let new_hash = hash::hash_password(&payload.new_password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {e}")))?;
    let mut active: user::ActiveModel = account.into();
    active.password = Set(new_hash);
    active.otp_hash = Set(None);
    active.updated_at = Set(chrono::Utc::now());
    active.update(&state.db).await?;

    Ok(Json(ApiResponse::message("Password reset successfully")))
}

async fn find_account<C: ConnectionTrait>(db: &C, id: i32) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Account not found".into()))
}
