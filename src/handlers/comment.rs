use crate::error::{AppError, AppResult};
use crate::middleware::auth::require_member;
use crate::middleware::AuthUser;
use crate::models::{CommentModel, ProfileModel};
use crate::response::ApiResponse;
use crate::services::ai::AiService;
use crate::services::comment::CommentService;
use axum::{extract::Path, response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, max = 5000))]
    pub content: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CommentResponse {
    pub id: i32,
    pub idea_id: i32,
    pub user_id: i32,
    pub content: String,
    pub author_name: Option<String>,
    pub created_at: chrono::NaiveDateTime,
}

impl CommentResponse {
    fn assemble(comment: CommentModel, author: Option<&ProfileModel>) -> Self {
        Self {
            id: comment.id,
            idea_id: comment.idea_id,
            user_id: comment.user_id,
            content: comment.content,
            author_name: author.map(|a| a.display_name().to_string()),
            created_at: comment.created_at,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/ideas/{id}/comments",
    params(("id" = i32, Path, description = "Idea ID")),
    responses(
        (status = 200, description = "Comments, oldest first", body = Vec<CommentResponse>),
        (status = 404, description = "Idea not found", body = AppError),
    ),
    tag = "comments"
)]
pub async fn list_comments(
    Extension(db): Extension<DatabaseConnection>,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let service = CommentService::new(db);
    let comments = service.list_for_idea(id).await?;
    let authors = service.authors_for(&comments).await?;

    let items: Vec<CommentResponse> = comments
        .into_iter()
        .map(|c| {
            let author = authors.get(&c.user_id);
            CommentResponse::assemble(c, author)
        })
        .collect();

    Ok(ApiResponse::ok(items))
}

#[utoipa::path(
    post,
    path = "/api/v1/ideas/{id}/comments",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Idea ID")),
    request_body = CreateCommentRequest,
    responses(
        (status = 200, description = "Comment posted", body = CommentResponse),
        (status = 400, description = "Validation error or moderation rejection", body = AppError),
        (status = 403, description = "Guest session", body = AppError),
        (status = 404, description = "Idea not found", body = AppError),
    ),
    tag = "comments"
)]
pub async fn create_comment(
    Extension(db): Extension<DatabaseConnection>,
    Extension(ai): Extension<AiService>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<CreateCommentRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let user_id = require_member(&auth_user)?;

    let verdict = ai.moderate(&payload.content).await;
    if !verdict.is_valid {
        return Err(AppError::Validation(
            verdict
                .reason
                .unwrap_or_else(|| "Content was rejected by moderation".to_string()),
        ));
    }

    let service = CommentService::new(db);
    let comment = service.create(user_id, id, &payload.content).await?;
    let authors = service.authors_for(std::slice::from_ref(&comment)).await?;
    let author = authors.get(&comment.user_id);

    let response = CommentResponse::assemble(comment, author);
    Ok(ApiResponse::ok(response))
}

#[utoipa::path(
    delete,
    path = "/api/v1/comments/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Comment deleted", body = String),
        (status = 403, description = "Not the author", body = AppError),
        (status = 404, description = "Comment not found", body = AppError),
    ),
    tag = "comments"
)]
pub async fn delete_comment(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let user_id = require_member(&auth_user)?;

    let service = CommentService::new(db);
    service.delete(id, user_id).await?;
    Ok(ApiResponse::ok("Comment deleted"))
}
