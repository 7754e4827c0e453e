use serde::{Deserialize, Serialize};

use crate::entity::job;
use crate::error::AppError;
use crate::models::company::CompanyResponse;
use crate::models::shared::{Pagination, validate_name};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum JobLocation {
    Onsite,
    Remote,
    Hybrid,
}

impl JobLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Onsite => "onsite",
            Self::Remote => "remote",
            Self::Hybrid => "hybrid",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum WorkingTime {
    FullTime,
    PartTime,
}

impl WorkingTime {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullTime => "full-time",
            Self::PartTime => "part-time",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum SeniorityLevel {
    Junior,
    Mid,
    Senior,
    TeamLead,
    Executive,
}

impl SeniorityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Junior => "junior",
            Self::Mid => "mid",
            Self::Senior => "senior",
            Self::TeamLead => "team-lead",
            Self::Executive => "executive",
        }
    }
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateJobRequest {
    #[schema(example = "Backend Engineer")]
    pub title: String,
    pub location: JobLocation,
    pub working_time: WorkingTime,
    pub seniority: SeniorityLevel,
    pub description: String,
    #[serde(default)]
    pub technical_skills: Vec<String>,
    #[serde(default)]
    pub soft_skills: Vec<String>,
}

pub fn validate_create_job(payload: &CreateJobRequest) -> Result<(), AppError> {
    validate_name(&payload.title, "Job title")?;
    if payload.description.trim().is_empty() {
        return Err(AppError::Validation(
            "Job description must not be empty".into(),
        ));
    }
    Ok(())
}

/// PATCH-semantics job update: only provided fields are modified.
#[derive(Default, PartialEq, Deserialize, utoipa::ToSchema)]
pub struct UpdateJobRequest {
    pub title: Option<String>,
    pub location: Option<JobLocation>,
    pub working_time: Option<WorkingTime>,
    pub seniority: Option<SeniorityLevel>,
    pub description: Option<String>,
    pub technical_skills: Option<Vec<String>>,
    pub soft_skills: Option<Vec<String>>,
}

pub fn validate_update_job(payload: &UpdateJobRequest) -> Result<(), AppError> {
    if let Some(title) = &payload.title {
        validate_name(title, "Job title")?;
    }
    if let Some(description) = &payload.description {
        if description.trim().is_empty() {
            return Err(AppError::Validation(
                "Job description must not be empty".into(),
            ));
        }
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct JobResponse {
    #[schema(example = 9)]
    pub id: i32,
    pub title: String,
    #[schema(example = "remote")]
    pub location: String,
    #[schema(example = "full-time")]
    pub working_time: String,
    #[schema(example = "mid")]
    pub seniority: String,
    pub description: String,
    pub technical_skills: Vec<String>,
    pub soft_skills: Vec<String>,
    /// The HR account that posted the job.
    pub added_by: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<job::Model> for JobResponse {
    fn from(m: job::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            location: m.location,
            working_time: m.working_time,
            seniority: m.seniority,
            description: m.description,
            technical_skills: skills(m.technical_skills),
            soft_skills: skills(m.soft_skills),
            added_by: m.added_by,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

fn skills(value: serde_json::Value) -> Vec<String> {
    serde_json::from_value(value).unwrap_or_default()
}

/// A job with its company resolved.
#[derive(Serialize, utoipa::ToSchema)]
pub struct JobWithCompany {
    pub job: JobResponse,
    pub company: Option<CompanyResponse>,
}

/// Query parameters for the job list.
///
/// Filters are an explicit allow-list; unknown query keys are ignored and
/// never reach the store.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct JobListQuery {
    /// Page number (1-based, default 1).
    pub page: Option<u64>,
    /// Page size (1-100, default 20).
    pub per_page: Option<u64>,
    pub location: Option<JobLocation>,
    pub working_time: Option<WorkingTime>,
    pub seniority: Option<SeniorityLevel>,
    /// Case-insensitive substring match on the job title.
    pub title: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct JobListResponse {
    pub data: Vec<JobWithCompany>,
    pub pagination: Pagination,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct CompanyJobsQuery {
    /// Name of the company whose jobs to list.
    pub name: String,
}

/// A company and every job it posted.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CompanyJobsResponse {
    pub company: CompanyResponse,
    pub jobs: Vec<JobResponse>,
}
