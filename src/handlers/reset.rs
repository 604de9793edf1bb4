use crate::error::{AppError, AppResult};
use crate::response::ApiResponse;
use crate::services::email::EmailService;
use crate::services::reset::ResetService;
use axum::{response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RequestResetRequest {
    /// Email address to send the code to
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct VerifyResetRequest {
    /// Email address the code was sent to
    #[validate(email)]
    pub email: String,
    /// Six-digit code from the email
    #[validate(length(equal = 6))]
    pub code: String,
    /// New password (min 8 characters)
    #[validate(length(min = 8))]
    pub new_password: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/request-reset",
    request_body = RequestResetRequest,
    responses(
        (status = 200, description = "Code sent if the account exists", body = serde_json::Value),
        (status = 400, description = "Validation error", body = AppError),
        (status = 429, description = "Issued too recently (code: rate_limited)", body = AppError),
    ),
    tag = "reset"
)]
pub async fn request_reset(
    Extension(db): Extension<DatabaseConnection>,
    Extension(email_service): Extension<EmailService>,
    Json(payload): Json<RequestResetRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let service = ResetService::new(db);
    service.issue_code(&payload.email, &email_service).await?;

    // The same body for known and unknown emails; only the cooldown 429
    // escapes this shape, and it implies the caller already got a code.
    Ok(ApiResponse::ok(serde_json::json!({
        "message": "If an account with that email exists, a reset code has been sent."
    })))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/verify-reset",
    request_body = VerifyResetRequest,
    responses(
        (status = 200, description = "Password updated", body = serde_json::Value),
        (status = 400, description = "Code rejected (code: invalid_otp | expired)", body = AppError),
    ),
    tag = "reset"
)]
pub async fn verify_reset(
    Extension(db): Extension<DatabaseConnection>,
    Json(payload): Json<VerifyResetRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let service = ResetService::new(db);
    service
        .verify_and_reset(&payload.email, &payload.code, &payload.new_password)
        .await?;

    Ok(ApiResponse::ok(serde_json::json!({
        "message": "Password has been reset successfully"
    })))
}
