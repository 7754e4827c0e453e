use serde::{Deserialize, Serialize};

use crate::entity::user;
use crate::error::AppError;
use crate::models::shared::{validate_email, validate_mobile, validate_name};

/// JSON `data` part of the sign-up form.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "Alice")]
    pub first_name: String,
    #[schema(example = "Wonder")]
    pub last_name: String,
    #[schema(example = "alice@example.com")]
    pub email: String,
    /// Password (6-128 characters).
    pub password: String,
    pub recovery_email: Option<String>,
    /// 11-digit mobile number, unique per account.
    #[schema(example = "01234567890")]
    pub mobile_number: String,
    pub date_of_birth: Option<String>,
    /// `applicant` (default) or `company_hr`.
    pub role: Option<String>,
}

pub fn validate_register_request(payload: &RegisterRequest) -> Result<(), AppError> {
    validate_name(&payload.first_name, "First name")?;
    validate_name(&payload.last_name, "Last name")?;
    validate_email(&payload.email, "Email")?;
    validate_mobile(&payload.mobile_number)?;
    if payload.password.len() < 6 || payload.password.len() > 128 {
        return Err(AppError::Validation(
            "Password must be 6-128 characters".into(),
        ));
    }
    if let Some(recovery) = &payload.recovery_email {
        validate_email(recovery, "Recovery email")?;
    }
    if let Some(role) = &payload.role {
        if !user::is_valid_role(role) {
            return Err(AppError::Validation(format!(
                "Role must be one of: {}, {}",
                user::ROLE_APPLICANT,
                user::ROLE_COMPANY_HR
            )));
        }
    }
    Ok(())
}

/// Request body for login. Either `email` or `mobile_number` identifies the
/// account.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub mobile_number: Option<String>,
    pub password: String,
}

pub fn validate_login_request(payload: &LoginRequest) -> Result<(), AppError> {
    if payload.email.as_deref().is_none_or(|e| e.trim().is_empty())
        && payload
            .mobile_number
            .as_deref()
            .is_none_or(|m| m.trim().is_empty())
    {
        return Err(AppError::Validation(
            "Either email or mobile_number is required".into(),
        ));
    }
    if payload.password.is_empty() {
        return Err(AppError::Validation("Password must not be empty".into()));
    }
    Ok(())
}

/// Successful login response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    /// JWT bearer token valid for 7 days.
    pub token: String,
    pub email: String,
    pub role: String,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct VerifyEmailQuery {
    /// E-mail verification token from the sign-up e-mail.
    pub token: String,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdatePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

pub fn validate_update_password(payload: &UpdatePasswordRequest) -> Result<(), AppError> {
    if payload.new_password.len() < 6 || payload.new_password.len() > 128 {
        return Err(AppError::Validation(
            "Password must be 6-128 characters".into(),
        ));
    }
    Ok(())
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ResetPasswordRequest {
    pub email: String,
    /// 6-digit code from the reset e-mail.
    pub otp: String,
    pub new_password: String,
}

pub fn validate_reset_password(payload: &ResetPasswordRequest) -> Result<(), AppError> {
    validate_email(&payload.email, "Email")?;
    if payload.otp.trim().is_empty() {
        return Err(AppError::Validation("OTP must not be empty".into()));
    }
    if payload.new_password.len() < 6 || payload.new_password.len() > 128 {
        return Err(AppError::Validation(
            "Password must be 6-128 characters".into(),
        ));
    }
    Ok(())
}
