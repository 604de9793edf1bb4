use crate::{
    error::{AppError, AppResult},
    models::{comment, profile, Comment, CommentModel, Idea, Profile, ProfileModel},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use std::collections::HashMap;

pub struct CommentService {
    db: DatabaseConnection,
}

impl CommentService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// All comments on an idea, oldest first.
    pub async fn list_for_idea(&self, idea_id: i32) -> AppResult<Vec<CommentModel>> {
        Idea::find_by_id(idea_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let comments = Comment::find()
            .filter(comment::Column::IdeaId.eq(idea_id))
            .order_by_asc(comment::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(comments)
    }

    pub async fn create(&self, user_id: i32, idea_id: i32, content: &str) -> AppResult<CommentModel> {
        Idea::find_by_id(idea_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let now = chrono::Utc::now().naive_utc();
        let new_comment = comment::ActiveModel {
            idea_id: sea_orm::ActiveValue::Set(idea_id),
            user_id: sea_orm::ActiveValue::Set(user_id),
            content: sea_orm::ActiveValue::Set(content.to_string()),
            created_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };

        Ok(new_comment.insert(&self.db).await?)
    }

    /// Delete a comment. Only its author may delete it.
    pub async fn delete(&self, comment_id: i32, user_id: i32) -> AppResult<()> {
        let existing = Comment::find_by_id(comment_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        if existing.user_id != user_id {
            return Err(AppError::Forbidden);
        }

        Comment::delete_by_id(comment_id).exec(&self.db).await?;
        Ok(())
    }

    /// Comment counts for a batch of ideas, for list enrichment.
    pub async fn counts_for(&self, idea_ids: &[i32]) -> AppResult<HashMap<i32, u64>> {
        if idea_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(i32, i64)> = Comment::find()
            .select_only()
            .column(comment::Column::IdeaId)
            .column_as(comment::Column::Id.count(), "count")
            .filter(comment::Column::IdeaId.is_in(idea_ids.to_vec()))
            .group_by(comment::Column::IdeaId)
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(|(id, n)| (id, n as u64)).collect())
    }

    /// Commenter profiles keyed by id, fetched in one query.
    pub async fn authors_for(
        &self,
        comments: &[CommentModel],
    ) -> AppResult<HashMap<i32, ProfileModel>> {
        let mut ids: Vec<i32> = comments.iter().map(|c| c.user_id).collect();
        ids.sort_unstable();
        ids.dedup();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let profiles = Profile::find()
            .filter(profile::Column::Id.is_in(ids))
            .all(&self.db)
            .await?;

        Ok(profiles.into_iter().map(|p| (p.id, p)).collect())
    }
}
