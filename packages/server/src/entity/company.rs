use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "company")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub name: String,
    pub description: Option<String>,
    pub industry: Option<String>,
    pub address: Option<String>,
    /// At least 10.
    pub employee_count: i32,
    #[sea_orm(unique)]
    pub email: String,

    /// The owning HR account; one company per HR.
    #[sea_orm(unique)]
    pub hr_user_id: i32,
    #[sea_orm(belongs_to, from = "hr_user_id", to = "id")]
    pub hr_user: HasOne<super::user::Entity>,

    /// Both set or both NULL, never one without the other.
    pub logo_id: Option<String>,
    pub logo_url: Option<String>,
    /// Media Store folder owned by this company, assigned at creation.
    pub media_folder: String,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
