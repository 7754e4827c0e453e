use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role of an account that applies to jobs.
pub const ROLE_APPLICANT: &str = "applicant";
/// Role of an account that owns a company and posts jobs.
pub const ROLE_COMPANY_HR: &str = "company_hr";
/// The role assigned when sign-up does not request one.
pub const DEFAULT_ROLE: &str = ROLE_APPLICANT;

pub const STATUS_ONLINE: &str = "online";
pub const STATUS_OFFLINE: &str = "offline";

pub fn is_valid_role(role: &str) -> bool {
    role == ROLE_APPLICANT || role == ROLE_COMPANY_HR
}

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub first_name: String,
    pub last_name: String,
    #[sea_orm(unique)]
    pub email: String,
    /// Argon2 hash, never the raw password.
    pub password: String,
    pub recovery_email: Option<String>,
    /// One of: `applicant`, `company_hr`.
    pub role: String,
    /// One of: `online`, `offline`.
    pub status: String,
    #[sea_orm(unique)]
    pub mobile_number: String,
    pub date_of_birth: Option<String>,

    /// Both set or both NULL, never one without the other.
    pub profile_image_id: Option<String>,
    pub profile_image_url: Option<String>,
    /// Media Store folder owned by this account, assigned at sign-up.
    pub media_folder: String,

    pub email_verified: bool,
    /// Argon2 hash of the active password-reset OTP, if any.
    pub otp_hash: Option<String>,

    #[sea_orm(has_many)]
    pub jobs: HasMany<super::job::Entity>,

    #[sea_orm(has_many)]
    pub applications: HasMany<super::application::Entity>,

    #[sea_orm(has_one)]
    pub company: HasOne<super::company::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
