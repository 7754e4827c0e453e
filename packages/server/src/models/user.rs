use serde::{Deserialize, Serialize};

use crate::entity::user;
use crate::error::AppError;
use crate::models::shared::{
    MediaRef, double_option, media_ref, validate_email, validate_mobile, validate_name,
};

/// A user account as returned by the API. Secrets (password hash, OTP hash)
/// are never serialised.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UserResponse {
    #[schema(example = 42)]
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    /// Display name combining first and last name.
    #[schema(example = "Alice Wonder")]
    pub username: String,
    pub email: String,
    pub recovery_email: Option<String>,
    #[schema(example = "applicant")]
    pub role: String,
    #[schema(example = "offline")]
    pub status: String,
    pub mobile_number: String,
    pub date_of_birth: Option<String>,
    /// Profile picture, absent when none was uploaded.
    pub profile_image: Option<MediaRef>,
    pub email_verified: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<user::Model> for UserResponse {
    fn from(m: user::Model) -> Self {
        let profile_image = media_ref(&m.profile_image_id, &m.profile_image_url);
        Self {
            id: m.id,
            username: format!("{} {}", m.first_name, m.last_name),
            first_name: m.first_name,
            last_name: m.last_name,
            email: m.email,
            recovery_email: m.recovery_email,
            role: m.role,
            status: m.status,
            mobile_number: m.mobile_number,
            date_of_birth: m.date_of_birth,
            profile_image,
            email_verified: m.email_verified,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// JSON `data` part of the account-update form. PATCH semantics: absent
/// fields are left unchanged; `recovery_email` and `date_of_birth` may be
/// set to null to clear them.
#[derive(Default, Deserialize, utoipa::ToSchema)]
pub struct UpdateAccountRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub mobile_number: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub recovery_email: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub date_of_birth: Option<Option<String>>,
}

pub fn validate_update_account(payload: &UpdateAccountRequest) -> Result<(), AppError> {
    if let Some(first) = &payload.first_name {
        validate_name(first, "First name")?;
    }
    if let Some(last) = &payload.last_name {
        validate_name(last, "Last name")?;
    }
    if let Some(email) = &payload.email {
        validate_email(email, "Email")?;
    }
    if let Some(mobile) = &payload.mobile_number {
        validate_mobile(mobile)?;
    }
    if let Some(Some(recovery)) = &payload.recovery_email {
        validate_email(recovery, "Recovery email")?;
    }
    Ok(())
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct RecoveryEmailQuery {
    /// Recovery e-mail shared by the accounts to look up.
    pub recovery_email: String,
}
