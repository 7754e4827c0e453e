use serde::{Deserialize, Serialize};

use crate::entity::company;
use crate::error::AppError;
use crate::models::job::JobResponse;
use crate::models::shared::{MediaRef, double_option, media_ref, validate_email, validate_name};

/// Minimum head count accepted for a company.
pub const MIN_EMPLOYEES: i32 = 10;

/// JSON `data` part of the company-creation form.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateCompanyRequest {
    #[schema(example = "Acme")]
    pub name: String,
    pub description: Option<String>,
    pub industry: Option<String>,
    pub address: Option<String>,
    /// At least 10.
    #[schema(example = 20)]
    pub employee_count: i32,
    #[schema(example = "jobs@acme.example")]
    pub email: String,
}

pub fn validate_create_company(payload: &CreateCompanyRequest) -> Result<(), AppError> {
    validate_name(&payload.name, "Company name")?;
    validate_email(&payload.email, "Company email")?;
    if payload.employee_count < MIN_EMPLOYEES {
        return Err(AppError::Validation(format!(
            "Company should have at least {MIN_EMPLOYEES} employees"
        )));
    }
    Ok(())
}

/// JSON `data` part of the company-update form (PATCH semantics).
#[derive(Default, Deserialize, utoipa::ToSchema)]
pub struct UpdateCompanyRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub industry: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub address: Option<Option<String>>,
    pub employee_count: Option<i32>,
    pub email: Option<String>,
}

pub fn validate_update_company(payload: &UpdateCompanyRequest) -> Result<(), AppError> {
    if let Some(name) = &payload.name {
        validate_name(name, "Company name")?;
    }
    if let Some(email) = &payload.email {
        validate_email(email, "Company email")?;
    }
    if let Some(count) = payload.employee_count {
        if count < MIN_EMPLOYEES {
            return Err(AppError::Validation(format!(
                "Company should have at least {MIN_EMPLOYEES} employees"
            )));
        }
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CompanyResponse {
    #[schema(example = 7)]
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub industry: Option<String>,
    pub address: Option<String>,
    pub employee_count: i32,
    pub email: String,
    /// The owning HR account.
    pub hr_user_id: i32,
    /// Company logo, absent when none was uploaded.
    pub logo: Option<MediaRef>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<company::Model> for CompanyResponse {
    fn from(m: company::Model) -> Self {
        let logo = media_ref(&m.logo_id, &m.logo_url);
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            industry: m.industry,
            address: m.address,
            employee_count: m.employee_count,
            email: m.email,
            hr_user_id: m.hr_user_id,
            logo,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// A company together with the jobs it posted.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CompanyDetailResponse {
    pub company: CompanyResponse,
    pub jobs: Vec<JobResponse>,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct CompanySearchQuery {
    /// Exact company name to look up.
    pub name: String,
}
