use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A job application. Created when an applicant applies, removed when the
/// job or the applicant's account is deleted, never updated.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "application")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub job_id: i32,
    #[sea_orm(belongs_to, from = "job_id", to = "id")]
    pub job: HasOne<super::job::Entity>,

    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub applicant: HasOne<super::user::Entity>,

    #[sea_orm(column_type = "JsonBinary")]
    pub tech_skills: serde_json::Value,
    #[sea_orm(column_type = "JsonBinary")]
    pub soft_skills: serde_json::Value,

    /// Both set or both NULL, never one without the other.
    pub resume_id: Option<String>,
    pub resume_url: Option<String>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
