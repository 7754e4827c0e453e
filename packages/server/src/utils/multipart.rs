use axum::extract::Multipart;
use axum::extract::multipart::Field;
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// A file received as part of a multipart request.
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Parse a mutating endpoint's multipart form.
///
/// The `data` field carries the JSON payload, the optional `file` field the
/// single uploaded file. Unknown fields are ignored.
pub async fn parse_form<T: DeserializeOwned>(
    mut multipart: Multipart,
    max_upload: u64,
) -> Result<(Option<T>, Option<UploadedFile>), AppError> {
    let mut data: Option<T> = None;
    let mut file: Option<UploadedFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        match field.name() {
            Some("data") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read data field: {e}")))?;
                data = Some(
                    serde_json::from_str(&text)
                        .map_err(|e| AppError::Validation(format!("Invalid data payload: {e}")))?,
                );
            }
            Some("file") => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let bytes = read_limited(field, max_upload).await?;
                file = Some(UploadedFile { filename, bytes });
            }
            _ => {} // Ignore unknown fields.
        }
    }

    Ok((data, file))
}

/// Read a multipart field into memory, enforcing the upload size cap.
async fn read_limited(mut field: Field<'_>, max: u64) -> Result<Vec<u8>, AppError> {
    let mut buf = Vec::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| AppError::Validation(format!("Upload read error: {e}")))?
    {
        if (buf.len() + chunk.len()) as u64 > max {
            return Err(AppError::Validation(format!(
                "File exceeds maximum size of {max} bytes"
            )));
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf)
}
