//! Request-scoped rollback tracking for multi-step writes.
//!
//! A mutating request performs at most one record creation and at most one
//! media upload. Each is registered here immediately after the store
//! confirms it, before any further fallible logic runs. When the request
//! ends in an error response, the registered effects are undone before the
//! response leaves the server; on success they become permanent.

use std::sync::{Arc, Mutex};

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use common::storage::MediaStore;
use sea_orm::{DatabaseConnection, DbErr, EntityTrait};

use crate::entity::{application, company, job, user};
use crate::error::AppError;
use crate::state::AppState;

/// A record created earlier in the current request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PendingRecord {
    User(i32),
    Company(i32),
    Job(i32),
    Application(i32),
}

#[derive(Debug, Default)]
struct Effects {
    creation: Option<PendingRecord>,
    upload_folder: Option<String>,
}

/// Per-request effect registry, cloneable into handlers via extensions.
///
/// Registrations are markers, not queues: registering a second creation or
/// upload overwrites the first.
#[derive(Clone, Default)]
pub struct RequestEffects {
    inner: Arc<Mutex<Effects>>,
}

impl RequestEffects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `record` was just created and may need rollback.
    pub fn register_creation(&self, record: PendingRecord) {
        self.inner.lock().expect("effects lock poisoned").creation = Some(record);
    }

    /// Record that files were just uploaded under `folder`.
    pub fn register_upload(&self, folder: &str) {
        self.inner.lock().expect("effects lock poisoned").upload_folder = Some(folder.to_string());
    }

    fn take(&self) -> Effects {
        std::mem::take(&mut *self.inner.lock().expect("effects lock poisoned"))
    }

    /// Inspect the registrations once the request outcome is known.
    ///
    /// On failure the pending creation and upload folder are removed from
    /// their stores; cleanup errors are logged and swallowed so the
    /// original response is never masked. Registrations are consumed either
    /// way and never outlive the request.
    pub async fn finalize(&self, db: &DatabaseConnection, media: &dyn MediaStore, failed: bool) {
        let effects = self.take();
        if !failed {
            return;
        }

        if let Some(record) = effects.creation {
            if let Err(e) = delete_record(db, record).await {
                tracing::warn!("rollback: failed to delete {record:?}: {e}");
            } else {
                tracing::debug!("rollback: deleted {record:?}");
            }
        }

        if let Some(folder) = effects.upload_folder {
            if let Err(e) = media.delete_prefix(&folder).await {
                tracing::warn!("rollback: failed to purge media folder {folder}: {e}");
            } else if let Err(e) = media.delete_folder(&folder).await {
                tracing::warn!("rollback: failed to remove media folder {folder}: {e}");
            } else {
                tracing::debug!("rollback: removed media folder {folder}");
            }
        }
    }
}

async fn delete_record(db: &DatabaseConnection, record: PendingRecord) -> Result<(), DbErr> {
    match record {
        PendingRecord::User(id) => user::Entity::delete_by_id(id).exec(db).await?,
        PendingRecord::Company(id) => company::Entity::delete_by_id(id).exec(db).await?,
        PendingRecord::Job(id) => job::Entity::delete_by_id(id).exec(db).await?,
        PendingRecord::Application(id) => application::Entity::delete_by_id(id).exec(db).await?,
    };
    Ok(())
}

/// Middleware wrapped around the API router.
///
/// Inserts a fresh [`RequestEffects`] into the request extensions, runs the
/// handler, and finalizes the effects based on the response status. 4xx and
/// 5xx responses count as failure; everything else leaves registered
/// effects untouched.
pub async fn rollback_guard(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let effects = RequestEffects::new();
    request.extensions_mut().insert(effects.clone());

    let response = next.run(request).await;

    let status = response.status();
    let failed = status.is_client_error() || status.is_server_error();
    effects.finalize(&state.db, state.media.as_ref(), failed).await;

    response
}

impl<S> FromRequestParts<S> for RequestEffects
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestEffects>()
            .cloned()
            .ok_or_else(|| AppError::Internal("rollback context missing from request".into()))
    }
}
