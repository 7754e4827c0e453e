use serde::{Deserialize, Serialize};

use crate::entity::application;
use crate::models::job::JobResponse;
use crate::models::shared::{MediaRef, media_ref};
use crate::models::user::UserResponse;

/// JSON `data` part of the apply form. Optional: an application with no
/// skills and no resume is valid.
#[derive(Default, Deserialize, utoipa::ToSchema)]
pub struct ApplyRequest {
    #[serde(default)]
    pub tech_skills: Vec<String>,
    #[serde(default)]
    pub soft_skills: Vec<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ApplicationResponse {
    pub id: i32,
    pub job_id: i32,
    /// The applicant.
    pub user_id: i32,
    pub tech_skills: Vec<String>,
    pub soft_skills: Vec<String>,
    /// Submitted resume, absent when none was uploaded.
    pub resume: Option<MediaRef>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<application::Model> for ApplicationResponse {
    fn from(m: application::Model) -> Self {
        let resume = media_ref(&m.resume_id, &m.resume_url);
        Self {
            id: m.id,
            job_id: m.job_id,
            user_id: m.user_id,
            tech_skills: serde_json::from_value(m.tech_skills).unwrap_or_default(),
            soft_skills: serde_json::from_value(m.soft_skills).unwrap_or_default(),
            resume,
            created_at: m.created_at,
        }
    }
}

/// An application with its job and applicant resolved.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ApplicationDetailResponse {
    pub application: ApplicationResponse,
    pub job: Option<JobResponse>,
    pub applicant: Option<UserResponse>,
}

/// Every application across all jobs of one company.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CompanyApplicationsResponse {
    pub applications: Vec<ApplicationDetailResponse>,
    pub total: u64,
}
