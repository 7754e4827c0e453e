use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "job")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,
    /// One of: `onsite`, `remote`, `hybrid`.
    pub location: String,
    /// One of: `full-time`, `part-time`.
    pub working_time: String,
    /// One of: `junior`, `mid`, `senior`, `team-lead`, `executive`.
    pub seniority: String,
    pub description: String,

    /// JSON arrays of skill names.
    #[sea_orm(column_type = "JsonBinary")]
    pub technical_skills: serde_json::Value,
    #[sea_orm(column_type = "JsonBinary")]
    pub soft_skills: serde_json::Value,

    /// The HR account that posted the job; resolves to its company.
    pub added_by: i32,
    #[sea_orm(belongs_to, from = "added_by", to = "id")]
    pub owner: HasOne<super::user::Entity>,

    #[sea_orm(has_many)]
    pub applications: HasMany<super::application::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
