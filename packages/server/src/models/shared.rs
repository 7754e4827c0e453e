use serde::{Deserialize, Deserializer, Serialize};

use crate::error::AppError;

/// Envelope for all successful responses.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ApiResponse<T> {
    /// Always `true` for success responses.
    #[schema(example = true)]
    pub success: bool,
    /// Human-readable outcome description.
    pub message: String,
    /// Payload, omitted for message-only responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// A success response with no payload.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }
}

/// Pagination metadata included in list responses.
#[derive(Serialize, utoipa::ToSchema)]
pub struct Pagination {
    /// Current page number (1-based).
    #[schema(example = 1)]
    pub page: u64,
    /// Number of items per page.
    #[schema(example = 20)]
    pub per_page: u64,
    /// Total number of matching items across all pages.
    #[schema(example = 47)]
    pub total: u64,
    /// Total number of pages.
    #[schema(example = 3)]
    pub total_pages: u64,
}

/// Reference to an uploaded media object. Absent entirely when no file was
/// uploaded; when present, both fields are set.
#[derive(Clone, Serialize, utoipa::ToSchema)]
pub struct MediaRef {
    /// Hierarchical media id inside the Media Store.
    pub id: String,
    /// Retrieval URL.
    pub url: String,
}

/// Combine a stored id/url column pair into an optional media reference.
pub fn media_ref(id: &Option<String>, url: &Option<String>) -> Option<MediaRef> {
    match (id, url) {
        (Some(id), Some(url)) => Some(MediaRef {
            id: id.clone(),
            url: url.clone(),
        }),
        _ => None,
    }
}

/// Escape LIKE wildcard characters in a search string.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Serde helper for PATCH semantics on nullable fields.
///
/// * JSON field absent  => `None`          (don't update)
/// * JSON field = null  => `Some(None)`    (set to NULL)
/// * JSON field = value => `Some(Some(v))` (set to value)
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

/// Validate an e-mail address (shallow shape check; the store's unique
/// index is what actually matters).
pub fn validate_email(email: &str, field: &str) -> Result<(), AppError> {
    let email = email.trim();
    let well_formed = email.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
    });
    if email.is_empty() || email.chars().any(char::is_whitespace) || !well_formed {
        return Err(AppError::Validation(format!(
            "{field} must be a valid email address"
        )));
    }
    Ok(())
}

/// Validate a mobile number (11 digits).
pub fn validate_mobile(mobile: &str) -> Result<(), AppError> {
    let mobile = mobile.trim();
    if mobile.len() != 11 || !mobile.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::Validation(
            "Mobile number must be 11 digits".into(),
        ));
    }
    Ok(())
}

/// Validate a trimmed name-like field (3-64 Unicode characters).
pub fn validate_name(value: &str, field: &str) -> Result<(), AppError> {
    let value = value.trim();
    if value.chars().count() < 3 || value.chars().count() > 64 {
        return Err(AppError::Validation(format!(
            "{field} must be 3-64 characters"
        )));
    }
    Ok(())
}
