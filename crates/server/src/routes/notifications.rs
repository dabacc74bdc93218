//! Notification route handlers.

use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;

use crate::db::notifications::NotificationRepository;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// The caller's newest notifications.
///
/// # Errors
///
/// 401 without a session.
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse> {
    let repo = NotificationRepository::new(state.pool());
    let notifications = repo.list_for_user(user.id).await?;

    Ok(Json(notifications))
}

/// Mark all of the caller's unread notifications as read.
///
/// # Errors
///
/// 401 without a session.
pub async fn mark_all_read(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse> {
    let repo = NotificationRepository::new(state.pool());
    let updated = repo.mark_all_read(user.id).await?;

    Ok(Json(json!({ "success": true, "updated": updated })))
}
