use crate::{
    error::{AppError, AppResult},
    models::{
        idea::{self, Tags, IDEA_STAGES},
        profile, Idea, IdeaModel, Profile, ProfileModel,
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder,
};
use std::collections::HashMap;

/// Fields a member supplies when creating or replacing an idea.
#[derive(Debug, Clone)]
pub struct IdeaDraft {
    pub title: String,
    pub description: String,
    pub category: String,
    pub stage: String,
    pub tags: Vec<String>,
    pub seeking_investment: bool,
    pub investment_amount: Option<String>,
}

/// Optional browse filters; all are ANDed together.
#[derive(Debug, Default, Clone)]
pub struct IdeaFilter {
    pub category: Option<String>,
    pub stage: Option<String>,
    pub search: Option<String>,
}

pub struct IdeaService {
    db: DatabaseConnection,
}

impl IdeaService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Paginated public browse, newest first.
    pub async fn browse(
        &self,
        filter: &IdeaFilter,
        page: u64,
        per_page: u64,
    ) -> AppResult<(Vec<IdeaModel>, u64)> {
        let mut query = Idea::find();

        if let Some(category) = &filter.category {
            query = query.filter(idea::Column::Category.eq(category.clone()));
        }
        if let Some(stage) = &filter.stage {
            query = query.filter(idea::Column::Stage.eq(stage.clone()));
        }
        if let Some(search) = &filter.search {
            query = query.filter(
                Condition::any()
                    .add(idea::Column::Title.contains(search))
                    .add(idea::Column::Description.contains(search)),
            );
        }

        let paginator = query
            .order_by_desc(idea::Column::CreatedAt)
            .paginate(&self.db, per_page);

        let total = paginator.num_items().await?;
        let ideas = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((ideas, total))
    }

    /// All of one member's ideas, newest first.
    pub async fn list_by_user(&self, user_id: i32) -> AppResult<Vec<IdeaModel>> {
        let ideas = Idea::find()
            .filter(idea::Column::UserId.eq(user_id))
            .order_by_desc(idea::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(ideas)
    }

    pub async fn get(&self, id: i32) -> AppResult<IdeaModel> {
        Idea::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn create(&self, user_id: i32, draft: IdeaDraft) -> AppResult<IdeaModel> {
        validate_stage(&draft.stage).map_err(AppError::Validation)?;
        let now = chrono::Utc::now().naive_utc();

        let new_idea = idea::ActiveModel {
            user_id: sea_orm::ActiveValue::Set(user_id),
            title: sea_orm::ActiveValue::Set(draft.title),
            description: sea_orm::ActiveValue::Set(draft.description),
            category: sea_orm::ActiveValue::Set(draft.category),
            stage: sea_orm::ActiveValue::Set(draft.stage),
            tags: sea_orm::ActiveValue::Set(Some(Tags(draft.tags))),
            seeking_investment: sea_orm::ActiveValue::Set(draft.seeking_investment),
            investment_amount: sea_orm::ActiveValue::Set(draft.investment_amount),
            created_at: sea_orm::ActiveValue::Set(now),
            updated_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };

        Ok(new_idea.insert(&self.db).await?)
    }

    /// Replace an idea's content. Only the owner may edit.
    pub async fn update(&self, idea_id: i32, user_id: i32, draft: IdeaDraft) -> AppResult<IdeaModel> {
        validate_stage(&draft.stage).map_err(AppError::Validation)?;

        let existing = self.get(idea_id).await?;
        if existing.user_id != user_id {
            return Err(AppError::Forbidden);
        }

        let now = chrono::Utc::now().naive_utc();
        let mut active: idea::ActiveModel = existing.into();
        active.title = sea_orm::ActiveValue::Set(draft.title);
        active.description = sea_orm::ActiveValue::Set(draft.description);
        active.category = sea_orm::ActiveValue::Set(draft.category);
        active.stage = sea_orm::ActiveValue::Set(draft.stage);
        active.tags = sea_orm::ActiveValue::Set(Some(Tags(draft.tags)));
        active.seeking_investment = sea_orm::ActiveValue::Set(draft.seeking_investment);
        active.investment_amount = sea_orm::ActiveValue::Set(draft.investment_amount);
        active.updated_at = sea_orm::ActiveValue::Set(now);

        Ok(active.update(&self.db).await?)
    }

    /// Delete an idea. Only the owner may delete through this path;
    /// administrators go through the admin service.
    pub async fn delete(&self, idea_id: i32, user_id: i32) -> AppResult<()> {
        let existing = self.get(idea_id).await?;
        if existing.user_id != user_id {
            return Err(AppError::Forbidden);
        }
        Idea::delete_by_id(idea_id).exec(&self.db).await?;
        Ok(())
    }

    /// Author profiles for a set of ideas, keyed by profile id.
    /// Two queries and an in-memory merge, not a SQL join.
    pub async fn authors_for(&self, ideas: &[IdeaModel]) -> AppResult<HashMap<i32, ProfileModel>> {
        let mut ids: Vec<i32> = ideas.iter().map(|i| i.user_id).collect();
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

fn validate_stage(stage: &str) -> Result<(), String> {
    if IDEA_STAGES.contains(&stage) {
        Ok(())
    } else {
        Err(format!(
            "stage must be one of: {}",
            IDEA_STAGES.join(", ")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::validate_stage;

    #[test]
    fn known_stages_pass() {
        for stage in ["idea", "prototype", "mvp", "launched"] {
            assert!(validate_stage(stage).is_ok());
        }
    }

    #[test]
    fn unknown_stage_is_rejected() {
        let err = validate_stage("unicorn").unwrap_err();
        assert!(err.contains("mvp"));
    }

    #[test]
    fn stage_matching_is_case_sensitive() {
        assert!(validate_stage("MVP").is_err());
    }
}
