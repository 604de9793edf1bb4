use crate::error::{AppError, AppResult};
use crate::middleware::auth::require_member;
use crate::middleware::AuthUser;
use crate::models::ProfileModel;
use crate::response::ApiResponse;
use crate::services::profile::{ProfileService, ProfileUpdate};
use axum::{extract::Path, response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Public profile view. No email, no credentials.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub id: i32,
    pub profile_type: String,
    /// full_name or company_name, selected by profile_type
    pub name: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub website: Option<String>,
    pub industry: Option<String>,
    pub investor_type: Option<String>,
    pub investment_range: Option<String>,
    pub sectors: Vec<String>,
    pub is_investor: bool,
    pub created_at: chrono::NaiveDateTime,
}

impl From<ProfileModel> for ProfileResponse {
    fn from(p: ProfileModel) -> Self {
        Self {
            id: p.id,
            name: p.display_name().to_string(),
            is_investor: p.is_investor(),
            sectors: p.sectors.map(|s| s.0).unwrap_or_default(),
            profile_type: p.profile_type,
            bio: p.bio,
            avatar_url: p.avatar_url,
            website: p.website,
            industry: p.industry,
            investor_type: p.investor_type,
            investment_range: p.investment_range,
            created_at: p.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    /// "personal" or "company"
    pub profile_type: String,
    pub full_name: Option<String>,
    pub company_name: Option<String>,
    #[validate(length(max = 2000))]
    pub bio: Option<String>,
    #[validate(url)]
    pub avatar_url: Option<String>,
    #[validate(url)]
    pub website: Option<String>,
    pub industry: Option<String>,
    pub investor_type: Option<String>,
    pub investment_range: Option<String>,
    #[serde(default)]
    pub sectors: Vec<String>,
    /// Legacy is-investor flag: "Yes" or "No"
    pub interests: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/profiles/{id}",
    params(("id" = i32, Path, description = "Profile ID")),
    responses(
        (status = 200, description = "Public profile", body = ProfileResponse),
        (status = 404, description = "Profile not found", body = AppError),
    ),
    tag = "profiles"
)]
pub async fn get_profile(
    Extension(db): Extension<DatabaseConnection>,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let service = ProfileService::new(db);
    let profile = service.get(id).await?;
    Ok(ApiResponse::ok(ProfileResponse::from(profile)))
}

#[utoipa::path(
    put,
    path = "/api/v1/profiles/me",
    security(("jwt_token" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = ProfileResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 401, description = "Unauthorized", body = AppError),
        (status = 403, description = "Guest session", body = AppError),
    ),
    tag = "profiles"
)]
pub async fn update_my_profile(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user_id = require_member(&auth_user)?;

    let service = ProfileService::new(db);
    let profile = service
        .update(
            user_id,
            ProfileUpdate {
                profile_type: payload.profile_type,
                full_name: payload.full_name,
                company_name: payload.company_name,
                bio: payload.bio,
                avatar_url: payload.avatar_url,
                website: payload.website,
                industry: payload.industry,
                investor_type: payload.investor_type,
                investment_range: payload.investment_range,
                sectors: payload.sectors,
                interests: payload.interests,
            },
        )
        .await?;

    Ok(ApiResponse::ok(ProfileResponse::from(profile)))
}
