use crate::error::{AppError, AppResult};
use crate::middleware::auth::require_member;
use crate::middleware::AuthUser;
use crate::models::{IdeaModel, ProfileModel};
use crate::response::{ApiResponse, PaginatedResponse, PaginationQuery};
use crate::score::VoteTally;
use crate::services::ai::AiService;
use crate::services::comment::CommentService;
use crate::services::idea::{IdeaDraft, IdeaFilter, IdeaService};
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

/// An idea with its community signals merged in: vote tally, validation
/// score, comment count, and the author's display name. Every surface
/// that shows an idea goes through this one mapper so the numbers never
/// disagree between screens.
#[derive(Debug, Serialize, ToSchema)]
pub struct IdeaResponse {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub description: String,
    pub category: String,
    pub stage: String,
    pub tags: Vec<String>,
    pub seeking_investment: bool,
    pub investment_amount: Option<String>,
    pub author_name: Option<String>,
    pub votes: VoteTally,
    /// Engaged voters: rows with any position set
    pub total_votes: u64,
    /// Validation score in [-100, 100]
    pub score: i32,
    pub comments: u64,
    pub created_at: chrono::NaiveDateTime,
}

impl IdeaResponse {
    pub fn assemble(
        idea: IdeaModel,
        tally: VoteTally,
        comments: u64,
        author: Option<&ProfileModel>,
    ) -> Self {
        Self {
            id: idea.id,
            user_id: idea.user_id,
            title: idea.title,
            description: idea.description,
            category: idea.category,
            stage: idea.stage,
            tags: idea.tags.map(|t| t.0).unwrap_or_default(),
            seeking_investment: idea.seeking_investment,
            investment_amount: idea.investment_amount,
            author_name: author.map(|a| a.display_name().to_string()),
            votes: tally,
            total_votes: tally.total(),
            score: tally.score(),
            comments,
            created_at: idea.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct IdeaRequest {
    #[validate(length(min = 3, max = 200))]
    pub title: String,
    #[validate(length(min = 10, max = 10_000))]
    pub description: String,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    /// One of: idea, prototype, mvp, launched
    pub stage: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub seeking_investment: bool,
    pub investment_amount: Option<String>,
}

impl IdeaRequest {
    fn into_draft(self) -> IdeaDraft {
        IdeaDraft {
            title: self.title,
            description: self.description,
            category: self.category,
            stage: self.stage,
            tags: self.tags,
            seeking_investment: self.seeking_investment,
            investment_amount: self.investment_amount,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct IdeaListQuery {
    pub category: Option<String>,
    pub stage: Option<String>,
    pub search: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationQuery,
}

/// Batch enrichment for a page of ideas: tallies, comment counts, and
/// authors in three queries. The author merge is a fetch-and-merge on
/// purpose, not a SQL join.
async fn enrich_ideas(db: &DatabaseConnection, ideas: Vec<IdeaModel>) -> AppResult<Vec<IdeaResponse>> {
    let idea_ids: Vec<i32> = ideas.iter().map(|i| i.id).collect();

    let tallies = VoteService::new(db.clone()).tallies_for(&idea_ids).await?;
    let comment_counts = CommentService::new(db.clone()).counts_for(&idea_ids).await?;
    let authors = IdeaService::new(db.clone()).authors_for(&ideas).await?;

    Ok(ideas
        .into_iter()
        .map(|idea| {
            let tally = tallies.get(&idea.id).copied().unwrap_or_default();
            let comments = comment_counts.get(&idea.id).copied().unwrap_or(0);
            let author = authors.get(&idea.user_id);
            IdeaResponse::assemble(idea, tally, comments, author)
        })
        .collect())
}

async fn enrich_idea(db: &DatabaseConnection, idea: IdeaModel) -> AppResult<IdeaResponse> {
    let mut enriched = enrich_ideas(db, vec![idea]).await?;
    enriched
        .pop()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("enrichment dropped the idea")))
}

/// Moderation gate shared by create and update. Fails open inside the
/// service; only a parsed rejection blocks the write.
async fn moderate_idea(ai: &AiService, title: &str, description: &str) -> AppResult<()> {
    let verdict = ai.moderate(&format!("{title}\n\n{description}")).await;
    if !verdict.is_valid {
        return Err(AppError::Validation(
            verdict
                .reason
                .unwrap_or_else(|| "Content was rejected by moderation".to_string()),
        ));
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/api/v1/ideas",
    params(
        ("category" = Option<String>, Query, description = "Filter by category"),
        ("stage" = Option<String>, Query, description = "Filter by stage"),
        ("search" = Option<String>, Query, description = "Search title and description"),
        ("page" = Option<u64>, Query, description = "Page number (1-based)"),
        ("per_page" = Option<u64>, Query, description = "Items per page (max 100)"),
    ),
    responses(
        (status = 200, description = "Ideas, newest first", body = PaginatedResponse<IdeaResponse>),
    ),
    tag = "ideas"
)]
pub async fn list_ideas(
    Extension(db): Extension<DatabaseConnection>,
    Query(query): Query<IdeaListQuery>,
) -> AppResult<impl IntoResponse> {
    let filter = IdeaFilter {
        category: query.category,
        stage: query.stage,
        search: query.search,
    };
    let page = query.pagination.page();
    let per_page = query.pagination.per_page();

    let service = IdeaService::new(db.clone());
    let (ideas, total) = service.browse(&filter, page, per_page).await?;
    let items = enrich_ideas(&db, ideas).await?;

    Ok(ApiResponse::ok(PaginatedResponse::new(
        items, total, page, per_page,
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/ideas/mine",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "The caller's ideas, newest first", body = Vec<IdeaResponse>),
        (status = 401, description = "Unauthorized", body = AppError),
        (status = 403, description = "Guest session", body = AppError),
    ),
    tag = "ideas"
)]
pub async fn my_ideas(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    let user_id = require_member(&auth_user)?;

    let service = IdeaService::new(db.clone());
    let ideas = service.list_by_user(user_id).await?;
    let items = enrich_ideas(&db, ideas).await?;

    Ok(ApiResponse::ok(items))
}

#[utoipa::path(
    get,
    path = "/api/v1/ideas/{id}",
    params(("id" = i32, Path, description = "Idea ID")),
    responses(
        (status = 200, description = "Idea detail", body = IdeaResponse),
        (status = 404, description = "Idea not found", body = AppError),
    ),
    tag = "ideas"
)]
pub async fn get_idea(
    Extension(db): Extension<DatabaseConnection>,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let service = IdeaService::new(db.clone());
    let idea = service.get(id).await?;
    let item = enrich_idea(&db, idea).await?;
    Ok(ApiResponse::ok(item))
}

#[utoipa::path(
    post,
    path = "/api/v1/ideas",
    security(("jwt_token" = [])),
    request_body = IdeaRequest,
    responses(
        (status = 200, description = "Idea created", body = IdeaResponse),
        (status = 400, description = "Validation error or moderation rejection", body = AppError),
        (status = 401, description = "Unauthorized", body = AppError),
        (status = 403, description = "Guest session", body = AppError),
    ),
    tag = "ideas"
)]
pub async fn create_idea(
    Extension(db): Extension<DatabaseConnection>,
    Extension(ai): Extension<AiService>,
    auth_user: AuthUser,
    Json(payload): Json<IdeaRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let user_id = require_member(&auth_user)?;

    moderate_idea(&ai, &payload.title, &payload.description).await?;

    let service = IdeaService::new(db.clone());
    let idea = service.create(user_id, payload.into_draft()).await?;
    // Fresh idea: votes = 0, score = 0, comments = 0.
    let item = enrich_idea(&db, idea).await?;
    Ok(ApiResponse::ok(item))
}

#[utoipa::path(
    put,
    path = "/api/v1/ideas/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Idea ID")),
    request_body = IdeaRequest,
    responses(
        (status = 200, description = "Idea updated", body = IdeaResponse),
        (status = 400, description = "Validation error or moderation rejection", body = AppError),
        (status = 403, description = "Not the owner", body = AppError),
        (status = 404, description = "Idea not found", body = AppError),
    ),
    tag = "ideas"
)]
pub async fn update_idea(
    Extension(db): Extension<DatabaseConnection>,
    Extension(ai): Extension<AiService>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<IdeaRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let user_id = require_member(&auth_user)?;

    // Edits are re-moderated like fresh submissions.
    moderate_idea(&ai, &payload.title, &payload.description).await?;

    let service = IdeaService::new(db.clone());
    let idea = service.update(id, user_id, payload.into_draft()).await?;
    let item = enrich_idea(&db, idea).await?;
    Ok(ApiResponse::ok(item))
}

#[utoipa::path(
    delete,
    path = "/api/v1/ideas/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Idea ID")),
    responses(
        (status = 200, description = "Idea deleted", body = String),
        (status = 403, description = "Not the owner", body = AppError),
        (status = 404, description = "Idea not found", body = AppError),
    ),
    tag = "ideas"
)]
pub async fn delete_idea(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let user_id = require_member(&auth_user)?;

    let service = IdeaService::new(db);
    service.delete(id, user_id).await?;
    Ok(ApiResponse::ok("Idea deleted"))
}
