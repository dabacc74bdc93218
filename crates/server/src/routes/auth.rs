//! Authentication route handlers.
//!
//! Phone-OTP flow: `send-otp` issues a code, `verify-otp` proves control of
//! the phone and resolves the identity, `login` is the separate session
//! exchange that re-validates the verified code and mints the session.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;
use tower_sessions::Session;

use crate::error::{AppError, Result};
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Request body for `POST /auth/send-otp`.
#[derive(Debug, Deserialize)]
pub struct SendOtpRequest {
    pub phone: Option<String>,
}

/// Request body for `POST /auth/verify-otp` and `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    pub phone: Option<String>,
    pub code: Option<String>,
}

/// Issue and dispatch a one-time code.
///
/// # Errors
///
/// 400 for a missing phone, 429 when rate limited, 400/500 for SMS delivery
/// failures depending on the provider error.
pub async fn send_otp(
    State(state): State<AppState>,
    Json(req): Json<SendOtpRequest>,
) -> Result<impl IntoResponse> {
    let phone = req
        .phone
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Phone number is required".to_string()))?;

    let auth = AuthService::new(state.pool(), state.sms());
    let phone = auth.send_otp(&phone).await?;

    Ok(Json(json!({
        "message": "OTP sent successfully",
        "phone": phone.as_str(),
    })))
}

/// Verify a submitted code and resolve (or create) the identity.
///
/// Does not mint a session; call `/auth/login` with the same pair for that.
///
/// # Errors
///
/// 400 for missing fields or an invalid/expired code.
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(req): Json<VerifyOtpRequest>,
) -> Result<impl IntoResponse> {
    let (phone, code) = require_pair(req)?;

    let auth = AuthService::new(state.pool(), state.sms());
    let verified = auth.verify_otp(&phone, &code).await?;

    Ok(Json(json!({
        "message": "OTP verified successfully",
        "isNewUser": verified.is_new_user,
        "userId": verified.user.id,
        "phone": verified.phone.as_str(),
    })))
}

/// Session exchange: re-validate a verified code and store the user in the
/// session. All codes for the phone are deleted on success.
///
/// # Errors
///
/// 401 when no verified, unexpired code matches.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<VerifyOtpRequest>,
) -> Result<impl IntoResponse> {
    let (phone, code) = require_pair(req)?;

    let auth = AuthService::new(state.pool(), state.sms());
    let user = match auth.login(&phone, &code).await {
        Ok(user) => user,
        // The exchange failing means the caller never verified (or waited too
        // long); for session minting that is an authorization failure.
        Err(crate::services::auth::AuthError::InvalidOrExpiredCode) => {
            return Err(AppError::Unauthorized(
                "Invalid or expired OTP. Please verify first.".to_string(),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    let current = CurrentUser::new(
        user.id,
        user.phone
            .as_ref()
            .map_or_else(String::new, |p| p.as_str().to_string()),
        user.name.clone(),
    );

    set_current_user(&session, &current)
        .await
        .map_err(|e| AppError::Internal(format!("failed to persist session: {e}")))?;

    Ok(Json(user))
}

/// Clear the session.
pub async fn logout(session: Session) -> Result<impl IntoResponse> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(format!("failed to clear session: {e}")))?;

    Ok((StatusCode::OK, Json(json!({ "success": true }))))
}

/// Both phone and code are required for verification and login.
fn require_pair(req: VerifyOtpRequest) -> Result<(String, String)> {
    let phone = req.phone.filter(|p| !p.trim().is_empty());
    let code = req.code.filter(|c| !c.trim().is_empty());

    match (phone, code) {
        (Some(phone), Some(code)) => Ok((phone, code)),
        _ => Err(AppError::BadRequest(
            "Phone number and OTP are required".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_pair_missing_fields() {
        let err = require_pair(VerifyOtpRequest {
            phone: None,
            code: Some("482913".to_string()),
        });
        assert!(err.is_err());

        let err = require_pair(VerifyOtpRequest {
            phone: Some("+15551230000".to_string()),
            code: Some("  ".to_string()),
        });
        assert!(err.is_err());
    }

    #[test]
    fn test_require_pair_present() {
        let (phone, code) = require_pair(VerifyOtpRequest {
            phone: Some("+15551230000".to_string()),
            code: Some("482913".to_string()),
        })
        .expect("both present");
        assert_eq!(phone, "+15551230000");
        assert_eq!(code, "482913");
    }

    #[test]
    fn test_send_otp_request_parses_without_phone() {
        let req: SendOtpRequest = serde_json::from_str("{}").expect("valid json");
        assert!(req.phone.is_none());
    }
}
