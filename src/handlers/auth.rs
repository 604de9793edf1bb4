use crate::error::{AppError, AppResult};
use crate::middleware::auth::{parse_user_id, require_member};
use crate::middleware::AuthUser;
use crate::models::ProfileModel;
use crate::response::ApiResponse;
use crate::services::auth::AuthService;
use anyhow::anyhow;
use axum::{
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    Extension, Json,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    /// "personal" or "company"
    pub profile_type: String,
    /// Person or company name, routed by profile_type
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Email address
    #[validate(email)]
    pub email: String,
    /// Password (min 8 characters)
    #[validate(length(min = 8))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// Email address
    #[validate(email)]
    pub email: String,
    /// Password
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    /// JWT access token
    pub token: String,
    /// JWT refresh token
    pub refresh_token: String,
    /// Profile ID
    pub user_id: i32,
    /// Display name (full_name or company_name by profile_type)
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GuestResponse {
    /// Browse-only JWT access token
    pub token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// New JWT access token
    pub token: String,
    /// New JWT refresh token
    pub refresh_token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    /// Profile ID
    pub id: i32,
    /// Email address
    pub email: String,
    /// "personal" or "company"
    pub profile_type: String,
    pub full_name: Option<String>,
    pub company_name: Option<String>,
    /// "member" or "admin"
    pub role: String,
}

impl From<ProfileModel> for UserResponse {
    fn from(user: ProfileModel) -> Self {
        Self {
            id: user.id,
            email: user.email,
            profile_type: user.profile_type,
            full_name: user.full_name,
            company_name: user.company_name,
            role: user.role,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created", body = AuthResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 409, description = "Email already registered", body = AppError),
    ),
    tag = "auth"
)]
pub async fn register(
    Extension(db): Extension<DatabaseConnection>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(format!("Validation error: {e}")))?;

    // The single name field lands in full_name or company_name, selected
    // by profile_type; the service validates the pairing.
    let (full_name, company_name) = match payload.profile_type.as_str() {
        "company" => (None, Some(payload.name.as_str())),
        _ => (Some(payload.name.as_str()), None),
    };

    let service = AuthService::new(db);
    let (user, access_token, refresh_token) = service
        .register(
            &payload.email,
            &payload.password,
            &payload.profile_type,
            full_name,
            company_name,
        )
        .await?;

    let response = AuthResponse {
        token: access_token.clone(),
        refresh_token: refresh_token.clone(),
        user_id: user.id,
        name: user.display_name().to_string(),
    };

    let mut http_response = ApiResponse::ok(response).into_response();
    set_auth_cookies(&mut http_response, &access_token, &refresh_token)?;
    Ok(http_response)
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = AppError),
    ),
    tag = "auth"
)]
pub async fn login(
    Extension(db): Extension<DatabaseConnection>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let service = AuthService::new(db);
    let (user, access_token, refresh_token) =
        service.login(&payload.email, &payload.password).await?;

    let response = AuthResponse {
        token: access_token.clone(),
        refresh_token: refresh_token.clone(),
        user_id: user.id,
        name: user.display_name().to_string(),
    };

    let mut http_response = ApiResponse::ok(response).into_response();
    set_auth_cookies(&mut http_response, &access_token, &refresh_token)?;
    Ok(http_response)
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/guest",
    responses(
        (status = 200, description = "Guest session issued", body = GuestResponse),
        (status = 403, description = "Guest access disabled", body = AppError),
    ),
    tag = "auth"
)]
pub async fn guest_session(
    Extension(db): Extension<DatabaseConnection>,
) -> AppResult<impl IntoResponse> {
    let service = AuthService::new(db);
    let token = service.guest_session()?;
    Ok(ApiResponse::ok(GuestResponse { token }))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "auth"
)]
pub async fn get_current_user(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    let user_id = parse_user_id(&auth_user)?;

    let service = AuthService::new(db);
    let user = service.get_user_by_id(user_id).await?;

    Ok(ApiResponse::ok(UserResponse::from(user)))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordRequest {
    /// Current password
    pub current_password: String,
    /// New password (min 8 characters)
    #[validate(length(min = 8))]
    pub new_password: String,
}

#[utoipa::path(
    put,
    path = "/api/v1/auth/password",
    security(("jwt_token" = [])),
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = String),
        (status = 400, description = "Validation error", body = AppError),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "auth"
)]
pub async fn change_password(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user_id = require_member(&auth_user)?;

    let service = AuthService::new(db);
    service
        .change_password(user_id, &payload.current_password, &payload.new_password)
        .await?;

    Ok(ApiResponse::ok("Password changed successfully"))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshTokenRequest {
    /// Refresh token; falls back to the HttpOnly cookie when absent
    pub refresh_token: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "Tokens rotated", body = TokenResponse),
        (status = 401, description = "Invalid or expired refresh token", body = AppError),
    ),
    tag = "auth"
)]
pub async fn refresh_token(
    Extension(db): Extension<DatabaseConnection>,
    headers: HeaderMap,
    payload: Option<Json<RefreshTokenRequest>>,
) -> AppResult<impl IntoResponse> {
    let refresh_token = payload
        .and_then(|Json(body)| body.refresh_token)
        .or_else(|| {
            crate::utils::cookie::extract_cookie(
                &headers,
                crate::utils::cookie::REFRESH_TOKEN_COOKIE,
            )
        })
        .ok_or(AppError::Unauthorized)?;

    let claims =
        crate::utils::jwt::decode_jwt(&refresh_token).map_err(|_| AppError::Unauthorized)?;
    if !crate::utils::jwt::is_refresh_token(&claims) {
        return Err(AppError::Unauthorized);
    }
    let user_id: i32 = claims.sub.parse().map_err(|_| AppError::Unauthorized)?;

    // Rotation: the presented token is consumed and a fresh pair issued.
    let service = AuthService::new(db);
    let (new_access_token, new_refresh_token) =
        service.rotate_refresh_token(user_id, &refresh_token).await?;

    let response = TokenResponse {
        token: new_access_token.clone(),
        refresh_token: new_refresh_token.clone(),
    };

    let mut http_response = ApiResponse::ok(response).into_response();
    set_auth_cookies(&mut http_response, &new_access_token, &new_refresh_token)?;
    Ok(http_response)
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Logout successful", body = String),
    ),
    tag = "auth"
)]
pub async fn logout(
    Extension(db): Extension<DatabaseConnection>,
    headers: HeaderMap,
    payload: Option<Json<RefreshTokenRequest>>,
) -> AppResult<impl IntoResponse> {
    let refresh_token = payload.and_then(|Json(body)| body.refresh_token).or_else(|| {
        crate::utils::cookie::extract_cookie(&headers, crate::utils::cookie::REFRESH_TOKEN_COOKIE)
    });

    if let Some(token) = refresh_token {
        let service = AuthService::new(db);
        service.revoke_refresh_token(&token).await?;
    }

    let mut response = ApiResponse::ok("Logout successful").into_response();
    clear_auth_cookies(&mut response)?;
    Ok(response)
}

#[utoipa::path(
    delete,
    path = "/api/v1/account",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Account deleted", body = String),
        (status = 401, description = "Unauthorized", body = AppError),
        (status = 403, description = "Guest session", body = AppError),
    ),
    tag = "auth"
)]
pub async fn delete_account(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    let user_id = require_member(&auth_user)?;

    // Ideas, votes, comments and tokens cascade from the profile row.
    let service = AuthService::new(db);
    service.delete_account(user_id).await?;

    let mut response = ApiResponse::ok("Account deleted").into_response();
    clear_auth_cookies(&mut response)?;
    Ok(response)
}

fn set_auth_cookies(
    response: &mut Response,
    access_token: &str,
    refresh_token: &str,
) -> AppResult<()> {
    let access_cookie = crate::utils::cookie::build_auth_cookie(
        crate::utils::cookie::ACCESS_TOKEN_COOKIE,
        access_token,
        crate::utils::jwt::access_token_expiry_seconds(),
    );
    let refresh_cookie = crate::utils::cookie::build_auth_cookie(
        crate::utils::cookie::REFRESH_TOKEN_COOKIE,
        refresh_token,
        crate::utils::jwt::refresh_token_expiry_seconds(),
    );

    append_set_cookie(response, &access_cookie)?;
    append_set_cookie(response, &refresh_cookie)?;
    Ok(())
}

fn clear_auth_cookies(response: &mut Response) -> AppResult<()> {
    append_set_cookie(
        response,
        &crate::utils::cookie::build_clear_cookie(crate::utils::cookie::ACCESS_TOKEN_COOKIE),
    )?;
    append_set_cookie(
        response,
        &crate::utils::cookie::build_clear_cookie(crate::utils::cookie::REFRESH_TOKEN_COOKIE),
    )?;
    Ok(())
}

fn append_set_cookie(response: &mut Response, cookie_value: &str) -> AppResult<()> {
    let value = HeaderValue::from_str(cookie_value).map_err(|e| {
        AppError::Internal(anyhow!("Failed to build Set-Cookie header value: {}", e))
    })?;
    response.headers_mut().append(header::SET_COOKIE, value);
    Ok(())
}
