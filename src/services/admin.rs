use crate::{
    error::{AppError, AppResult},
    models::{
        idea,
        profile::{self, normalize_names},
        Idea, IdeaModel, Profile, ProfileModel,
    },
    utils::hash_password,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};
use std::collections::HashMap;

/// Privileged profile/idea management. Callers must already have passed an
/// admin check; nothing here re-verifies the caller.
pub struct AdminService {
    db: DatabaseConnection,
}

/// Admin create payload. `role` selects the profile_type and which name
/// field `name` lands in.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: String,
}

/// Admin patch payload. Absent fields are left untouched. When `role` is
/// present, `name` must be too (the mapping decides where the name goes).
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
}

impl AdminService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list_users(
        &self,
        page: u64,
        per_page: u64,
    ) -> AppResult<(Vec<ProfileModel>, u64)> {
        let paginator = Profile::find()
            .order_by_desc(profile::Column::CreatedAt)
            .paginate(&self.db, per_page);

        let total = paginator.num_items().await?;
        let users = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((users, total))
    }

    pub async fn create_user(&self, new_user: NewUser) -> AppResult<ProfileModel> {
        let (profile_type, full_name, company_name) =
            apply_role_name(&new_user.role, &new_user.name).map_err(AppError::Validation)?;

        let email = new_user.email.trim().to_lowercase();
        let taken = Profile::find()
            .filter(profile::Column::Email.eq(email.clone()))
            .count(&self.db)
            .await?
            > 0;
        if taken {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let password_hash = hash_password(&new_user.password)?;
        let now = chrono::Utc::now().naive_utc();

        let model = profile::ActiveModel {
            email: sea_orm::ActiveValue::Set(email),
            password_hash: sea_orm::ActiveValue::Set(password_hash),
            profile_type: sea_orm::ActiveValue::Set(profile_type),
            full_name: sea_orm::ActiveValue::Set(full_name),
            company_name: sea_orm::ActiveValue::Set(company_name),
            role: sea_orm::ActiveValue::Set("member".to_string()),
            created_at: sea_orm::ActiveValue::Set(now),
            updated_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };

        Ok(model.insert(&self.db).await?)
    }

    pub async fn update_user(&self, user_id: i32, patch: UserPatch) -> AppResult<ProfileModel> {
        let existing = Profile::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: profile::ActiveModel = existing.clone().into();

        match (&patch.role, &patch.name) {
            (Some(role), Some(name)) => {
                let (profile_type, full_name, company_name) =
                    apply_role_name(role, name).map_err(AppError::Validation)?;
                active.profile_type = sea_orm::ActiveValue::Set(profile_type);
                active.full_name = sea_orm::ActiveValue::Set(full_name);
                active.company_name = sea_orm::ActiveValue::Set(company_name);
            }
            (Some(_), None) => {
                return Err(AppError::Validation(
                    "name is required when changing role".to_string(),
                ));
            }
            (None, Some(name)) => {
                // Name alone lands in the field the current profile_type selects.
                let (_, full_name, company_name) =
                    apply_role_name(&existing.profile_type, name).map_err(AppError::Validation)?;
                active.full_name = sea_orm::ActiveValue::Set(full_name);
                active.company_name = sea_orm::ActiveValue::Set(company_name);
            }
            (None, None) => {}
        }

        if let Some(email) = &patch.email {
            let email = email.trim().to_lowercase();
            let taken = Profile::find()
                .filter(profile::Column::Email.eq(email.clone()))
                .filter(profile::Column::Id.ne(user_id))
                .count(&self.db)
                .await?
                > 0;
            if taken {
                return Err(AppError::Conflict("Email already registered".to_string()));
            }
            active.email = sea_orm::ActiveValue::Set(email);
        }

        if let Some(password) = &patch.password {
            active.password_hash = sea_orm::ActiveValue::Set(hash_password(password)?);
        }

        active.updated_at = sea_orm::ActiveValue::Set(chrono::Utc::now().naive_utc());
        Ok(active.update(&self.db).await?)
    }

    /// Operator privilege, separate from the profile_type mapping above.
    pub async fn set_user_role(&self, user_id: i32, role: &str) -> AppResult<ProfileModel> {
        let valid_roles = ["member", "admin"];
        if !valid_roles.contains(&role) {
            return Err(AppError::Validation(format!(
                "Invalid role. Must be one of: {}",
                valid_roles.join(", ")
            )));
        }

        let existing = Profile::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: profile::ActiveModel = existing.into();
        active.role = sea_orm::ActiveValue::Set(role.to_string());
        active.updated_at = sea_orm::ActiveValue::Set(chrono::Utc::now().naive_utc());
        Ok(active.update(&self.db).await?)
    }

    pub async fn delete_user(&self, user_id: i32) -> AppResult<()> {
        Profile::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        // Ideas, votes and comments go with the profile via FK cascade.
        Profile::delete_by_id(user_id).exec(&self.db).await?;
        Ok(())
    }

    /// Ideas with their authors merged in. Two queries, not a SQL join.
    pub async fn list_ideas(
        &self,
        page: u64,
        per_page: u64,
    ) -> AppResult<(Vec<IdeaModel>, HashMap<i32, ProfileModel>, u64)> {
        let paginator = Idea::find()
            .order_by_desc(idea::Column::CreatedAt)
            .paginate(&self.db, per_page);

        let total = paginator.num_items().await?;
        let ideas = paginator.fetch_page(page.saturating_sub(1)).await?;

        let mut author_ids: Vec<i32> = ideas.iter().map(|i| i.user_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();

        let authors = Profile::find()
            .filter(profile::Column::Id.is_in(author_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        Ok((ideas, authors, total))
    }

    pub async fn count_ideas(&self) -> AppResult<u64> {
        Ok(Idea::find().count(&self.db).await?)
    }

    /// Unlike the owner route this skips the ownership check.
    pub async fn delete_idea(&self, idea_id: i32) -> AppResult<()> {
        Idea::find_by_id(idea_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        Idea::delete_by_id(idea_id).exec(&self.db).await?;
        Ok(())
    }
}

/// Maps the admin-facing `role` string to a profile_type and routes `name`
/// into the field that type selects.
fn apply_role_name(
    role: &str,
    name: &str,
) -> Result<(String, Option<String>, Option<String>), String> {
    let (full_name, company_name) = match role {
        "personal" => normalize_names("personal", Some(name), None)?,
        "company" => normalize_names("company", None, Some(name))?,
        _ => return Err("role must be 'personal' or 'company'".to_string()),
    };
    Ok((role.to_string(), full_name, company_name))
}

#[cfg(test)]
mod tests {
    use super::apply_role_name;

    #[test]
    fn role_selects_the_name_field() {
        let (ptype, full, company) = apply_role_name("personal", "Ada Lovelace").unwrap();
        assert_eq!(ptype, "personal");
        assert_eq!(full.as_deref(), Some("Ada Lovelace"));
        assert_eq!(company, None);

        let (ptype, full, company) = apply_role_name("company", "Acme Ventures").unwrap();
        assert_eq!(ptype, "company");
        assert_eq!(full, None);
        assert_eq!(company.as_deref(), Some("Acme Ventures"));
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!(apply_role_name("moderator", "Ada").is_err());
    }

    #[test]
    fn empty_name_is_rejected() {
        assert!(apply_role_name("personal", "   ").is_err());
    }
}
