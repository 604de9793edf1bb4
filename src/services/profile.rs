use crate::{
    error::{AppError, AppResult},
    models::{
        profile::{self, normalize_names, Sectors},
        Profile, ProfileModel,
    },
};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait};

/// Full replacement payload for the caller's own profile.
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub profile_type: String,
    pub full_name: Option<String>,
    pub company_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub website: Option<String>,
    pub industry: Option<String>,
    pub investor_type: Option<String>,
    pub investment_range: Option<String>,
    pub sectors: Vec<String>,
    pub interests: Option<String>,
}

pub struct ProfileService {
    db: DatabaseConnection,
}

impl ProfileService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get(&self, id: i32) -> AppResult<ProfileModel> {
        Profile::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn update(&self, user_id: i32, update: ProfileUpdate) -> AppResult<ProfileModel> {
        let (full_name, company_name) = normalize_names(
            &update.profile_type,
            update.full_name.as_deref(),
            update.company_name.as_deref(),
        )
        .map_err(AppError::Validation)?;
        validate_interests(update.interests.as_deref()).map_err(AppError::Validation)?;

        let existing = self.get(user_id).await?;
        let now = chrono::Utc::now().naive_utc();

        let mut active: profile::ActiveModel = existing.into();
        active.profile_type = sea_orm::ActiveValue::Set(update.profile_type);
        active.full_name = sea_orm::ActiveValue::Set(full_name);
        active.company_name = sea_orm::ActiveValue::Set(company_name);
        active.bio = sea_orm::ActiveValue::Set(update.bio);
        active.avatar_url = sea_orm::ActiveValue::Set(update.avatar_url);
        active.website = sea_orm::ActiveValue::Set(update.website);
        active.industry = sea_orm::ActiveValue::Set(update.industry);
        active.investor_type = sea_orm::ActiveValue::Set(update.investor_type);
        active.investment_range = sea_orm::ActiveValue::Set(update.investment_range);
        active.sectors = sea_orm::ActiveValue::Set(Some(Sectors(update.sectors)));
        active.interests = sea_orm::ActiveValue::Set(update.interests);
        active.updated_at = sea_orm::ActiveValue::Set(now);

        Ok(active.update(&self.db).await?)
    }
}

/// The stored investor flag is the literal string "Yes" or "No".
fn validate_interests(interests: Option<&str>) -> Result<(), String> {
    match interests {
        None | Some("Yes") | Some("No") => Ok(()),
        Some(other) => Err(format!(
            "interests must be \"Yes\" or \"No\", got \"{other}\""
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::validate_interests;

    #[test]
    fn interests_accepts_the_flag_values() {
        assert!(validate_interests(None).is_ok());
        assert!(validate_interests(Some("Yes")).is_ok());
        assert!(validate_interests(Some("No")).is_ok());
    }

    #[test]
    fn interests_rejects_everything_else() {
        assert!(validate_interests(Some("yes")).is_err());
        assert!(validate_interests(Some("true")).is_err());
        assert!(validate_interests(Some("")).is_err());
    }
}
