use crate::error::{AppError, AppResult};
use crate::middleware::auth::require_admin;
use crate::middleware::AuthUser;
use crate::models::ProfileModel;
use crate::response::{ApiResponse, PaginatedResponse, PaginationQuery};
use crate::score::VoteTally;
use crate::services::admin::{AdminService, NewUser, UserPatch};
use crate::services::comment::CommentService;
use crate::services::vote::VoteService;
use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    Extension, Json,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminUserResponse {
    pub id: i32,
    pub email: String,
    pub profile_type: String,
    pub full_name: Option<String>,
    pub company_name: Option<String>,
    pub role: String,
    pub created_at: chrono::NaiveDateTime,
}

impl From<ProfileModel> for AdminUserResponse {
    fn from(p: ProfileModel) -> Self {
        Self {
            id: p.id,
            email: p.email,
            profile_type: p.profile_type,
            full_name: p.full_name,
            company_name: p.company_name,
            role: p.role,
            created_at: p.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// "personal" or "company"; maps to profile_type and routes `name`
    pub role: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PatchUserRequest {
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 8))]
    pub password: Option<String>,
    pub name: Option<String>,
    /// "personal" or "company"; requires `name` alongside it
    pub role: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRoleRequest {
    /// Operator privilege: "member" or "admin"
    pub role: String,
}

/// Admin view of an idea: the row plus author and community signals.
#[derive(Debug, Serialize, ToSchema)]
pub struct AdminIdeaResponse {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub category: String,
    pub stage: String,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub votes: VoteTally,
    pub score: i32,
    pub comments: u64,
    pub created_at: chrono::NaiveDateTime,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct IdeaCountResponse {
    pub count: u64,
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    security(("jwt_token" = [])),
    params(
        ("page" = Option<u64>, Query, description = "Page number (1-based)"),
        ("per_page" = Option<u64>, Query, description = "Items per page (max 100)"),
    ),
    responses(
        (status = 200, description = "Users, newest first", body = PaginatedResponse<AdminUserResponse>),
        (status = 403, description = "Not an admin", body = AppError),
    ),
    tag = "admin"
)]
pub async fn list_users(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Query(pagination): Query<PaginationQuery>,
) -> AppResult<impl IntoResponse> {
    require_admin(&db, &auth_user).await?;

    let page = pagination.page();
    let per_page = pagination.per_page();

    let service = AdminService::new(db);
    let (users, total) = service.list_users(page, per_page).await?;
    let items: Vec<AdminUserResponse> = users.into_iter().map(Into::into).collect();

    Ok(ApiResponse::ok(PaginatedResponse::new(
        items, total, page, per_page,
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/users",
    security(("jwt_token" = [])),
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "User created", body = AdminUserResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 403, description = "Not an admin", body = AppError),
        (status = 409, description = "Email already registered", body = AppError),
    ),
    tag = "admin"
)]
pub async fn create_user(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Json(payload): Json<CreateUserRequest>,
) -> AppResult<impl IntoResponse> {
    require_admin(&db, &auth_user).await?;
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let service = AdminService::new(db);
    let user = service
        .create_user(NewUser {
            email: payload.email,
            password: payload.password,
            name: payload.name,
            role: payload.role,
        })
        .await?;

    Ok(ApiResponse::ok(AdminUserResponse::from(user)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/admin/users/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Profile ID")),
    request_body = PatchUserRequest,
    responses(
        (status = 200, description = "User updated", body = AdminUserResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 403, description = "Not an admin", body = AppError),
        (status = 404, description = "User not found", body = AppError),
    ),
    tag = "admin"
)]
pub async fn patch_user(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<PatchUserRequest>,
) -> AppResult<impl IntoResponse> {
    require_admin(&db, &auth_user).await?;
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let service = AdminService::new(db);
    let user = service
        .update_user(
            id,
            UserPatch {
                email: payload.email,
                password: payload.password,
                name: payload.name,
                role: payload.role,
            },
        )
        .await?;

    Ok(ApiResponse::ok(AdminUserResponse::from(user)))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/users/{id}/role",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Profile ID")),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = AdminUserResponse),
        (status = 400, description = "Invalid role", body = AppError),
        (status = 403, description = "Not an admin", body = AppError),
        (status = 404, description = "User not found", body = AppError),
    ),
    tag = "admin"
)]
pub async fn update_user_role(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateRoleRequest>,
) -> AppResult<impl IntoResponse> {
    let admin_id = require_admin(&db, &auth_user).await?;

    // An admin stripping their own role would lock the last admin out.
    if admin_id == id && payload.role != "admin" {
        return Err(AppError::Validation(
            "Cannot change your own admin role".to_string(),
        ));
    }

    let service = AdminService::new(db);
    let user = service.set_user_role(id, &payload.role).await?;
    Ok(ApiResponse::ok(AdminUserResponse::from(user)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/users/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Profile ID")),
    responses(
        (status = 200, description = "User deleted", body = String),
        (status = 403, description = "Not an admin", body = AppError),
        (status = 404, description = "User not found", body = AppError),
    ),
    tag = "admin"
)]
pub async fn delete_user(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let admin_id = require_admin(&db, &auth_user).await?;

    if admin_id == id {
        return Err(AppError::Validation(
            "Cannot delete your own account through the admin route".to_string(),
        ));
    }

    let service = AdminService::new(db);
    service.delete_user(id).await?;
    Ok(ApiResponse::ok("User deleted"))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/ideas",
    security(("jwt_token" = [])),
    params(
        ("page" = Option<u64>, Query, description = "Page number (1-based)"),
        ("per_page" = Option<u64>, Query, description = "Items per page (max 100)"),
    ),
    responses(
        (status = 200, description = "Ideas with authors merged in", body = PaginatedResponse<AdminIdeaResponse>),
        (status = 403, description = "Not an admin", body = AppError),
    ),
    tag = "admin"
)]
pub async fn list_ideas(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Query(pagination): Query<PaginationQuery>,
) -> AppResult<impl IntoResponse> {
    require_admin(&db, &auth_user).await?;

    let page = pagination.page();
    let per_page = pagination.per_page();

    let service = AdminService::new(db.clone());
    let (ideas, authors, total) = service.list_ideas(page, per_page).await?;

    let idea_ids: Vec<i32> = ideas.iter().map(|i| i.id).collect();
    let tallies = VoteService::new(db.clone()).tallies_for(&idea_ids).await?;
    let comment_counts = CommentService::new(db).counts_for(&idea_ids).await?;

    let items: Vec<AdminIdeaResponse> = ideas
        .into_iter()
        .map(|idea| {
            let tally = tallies.get(&idea.id).copied().unwrap_or_default();
            let author = authors.get(&idea.user_id);
            AdminIdeaResponse {
                id: idea.id,
                user_id: idea.user_id,
                title: idea.title,
                category: idea.category,
                stage: idea.stage,
                author_name: author.map(|a| a.display_name().to_string()),
                author_email: author.map(|a| a.email.clone()),
                votes: tally,
                score: tally.score(),
                comments: comment_counts.get(&idea.id).copied().unwrap_or(0),
                created_at: idea.created_at,
            }
        })
        .collect();

    Ok(ApiResponse::ok(PaginatedResponse::new(
        items, total, page, per_page,
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/ideas/count",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Total idea count", body = IdeaCountResponse),
        (status = 403, description = "Not an admin", body = AppError),
    ),
    tag = "admin"
)]
pub async fn count_ideas(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    require_admin(&db, &auth_user).await?;

    let service = AdminService::new(db);
    let count = service.count_ideas().await?;
    Ok(ApiResponse::ok(IdeaCountResponse { count }))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/ideas/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Idea ID")),
    responses(
        (status = 200, description = "Idea deleted", body = String),
        (status = 403, description = "Not an admin", body = AppError),
        (status = 404, description = "Idea not found", body = AppError),
    ),
    tag = "admin"
)]
pub async fn delete_idea(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    require_admin(&db, &auth_user).await?;

    // No ownership check on this path; that is the point of the route.
    let service = AdminService::new(db);
    service.delete_idea(id).await?;
    Ok(ApiResponse::ok("Idea deleted"))
}
