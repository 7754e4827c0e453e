//! Media Store folder layout.
//!
//! Every user and company owns a uuid-based folder assigned at creation;
//! job resumes live in a subfolder of the owning company's folder, so
//! deleting a company or job maps to a single prefix deletion.

use uuid::Uuid;

/// Fresh media folder for a new user account.
pub fn new_user_folder() -> String {
    format!("users/{}", Uuid::new_v4().simple())
}

/// Fresh media folder for a new company.
pub fn new_company_folder() -> String {
    format!("companies/{}", Uuid::new_v4().simple())
}

/// Destination for a user's profile picture.
pub fn user_profile_folder(media_folder: &str) -> String {
    format!("{media_folder}/profile")
}

/// Destination for a company's logo.
pub fn company_logo_folder(media_folder: &str) -> String {
    format!("{media_folder}/logo")
}

/// Subtree holding everything uploaded for one job.
pub fn job_folder(company_media_folder: &str, job_id: i32) -> String {
    format!("{company_media_folder}/jobs/{job_id}")
}

/// Destination for resumes submitted to one job.
pub fn job_resume_folder(company_media_folder: &str, job_id: i32) -> String {
    format!("{company_media_folder}/jobs/{job_id}/resumes")
}
