use crate::error::AppResult;
use crate::middleware::auth::require_member;
use crate::middleware::AuthUser;
use crate::models::VoteKind;
use crate::response::ApiResponse;
use crate::score::VoteTally;
use crate::services::vote::VoteService;
use axum::{extract::Path, response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct VoteRequest {
    /// "yes", "maybe" or "no"
    pub vote: VoteKind,
}

/// The recorded position plus the fresh tally, so the client renders the
/// same numbers the server computed instead of guessing optimistically.
#[derive(Debug, Serialize, ToSchema)]
pub struct VoteResponse {
    pub idea_id: i32,
    pub vote: VoteKind,
    pub votes: VoteTally,
    pub total_votes: u64,
    pub score: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TallyResponse {
    pub idea_id: i32,
    pub votes: VoteTally,
    pub total_votes: u64,
    pub score: i32,
}

#[utoipa::path(
    post,
    path = "/api/v1/ideas/{id}/vote",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Idea ID")),
    request_body = VoteRequest,
    responses(
        (status = 200, description = "Vote recorded", body = VoteResponse),
        (status = 401, description = "Unauthorized", body = crate::error::AppError),
        (status = 403, description = "Guest session", body = crate::error::AppError),
        (status = 404, description = "Idea not found", body = crate::error::AppError),
    ),
    tag = "votes"
)]
pub async fn cast_vote(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<VoteRequest>,
) -> AppResult<impl IntoResponse> {
    // Guests are rejected before any write.
    let user_id = require_member(&auth_user)?;

    let service = VoteService::new(db);
    let tally = service.cast(user_id, id, payload.vote).await?;

    Ok(ApiResponse::ok(VoteResponse {
        idea_id: id,
        vote: payload.vote,
        votes: tally,
        total_votes: tally.total(),
        score: tally.score(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/ideas/{id}/votes",
    params(("id" = i32, Path, description = "Idea ID")),
    responses(
        (status = 200, description = "Current tally and score", body = TallyResponse),
        (status = 404, description = "Idea not found", body = crate::error::AppError),
    ),
    tag = "votes"
)]
pub async fn get_votes(
    Extension(db): Extension<DatabaseConnection>,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    crate::services::idea::IdeaService::new(db.clone())
        .get(id)
        .await?;

    let service = VoteService::new(db);
    let tally = service.tally_for(id).await?;

    Ok(ApiResponse::ok(TallyResponse {
        idea_id: id,
        votes: tally,
        total_votes: tally.total(),
        score: tally.score(),
    }))
}
