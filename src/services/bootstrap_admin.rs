use crate::error::AppResult;
use crate::models::{profile, Profile};
use crate::utils::hash_password;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use std::env;

#[derive(Debug, Clone)]
pub struct BootstrapAdminConfig {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl BootstrapAdminConfig {
    pub fn from_env() -> Option<Self> {
        let enabled = env::var("BOOTSTRAP_ADMIN_ENABLED")
            .ok()
            .map(|v| v.trim().to_ascii_lowercase())
            .map(|v| matches!(v.as_str(), "1" | "true" | "yes" | "y" | "on"))
            .unwrap_or(false);

        if !enabled {
            return None;
        }

        Some(Self {
            email: env::var("BOOTSTRAP_ADMIN_EMAIL").ok()?,
            password: env::var("BOOTSTRAP_ADMIN_PASSWORD").ok()?,
            name: env::var("BOOTSTRAP_ADMIN_NAME").ok()?,
        })
    }
}

/// Startup admin seeding:
/// - if any admin already exists: do nothing
/// - else if the configured email exists: promote it
/// - else create a fresh personal admin account
pub async fn ensure_bootstrap_admin(db: &DatabaseConnection) -> AppResult<()> {
    let Some(cfg) = BootstrapAdminConfig::from_env() else {
        return Ok(());
    };

    let admin_exists = Profile::find()
        .filter(profile::Column::Role.eq("admin"))
        .one(db)
        .await?
        .is_some();
    if admin_exists {
        return Ok(());
    }

    let email = cfg.email.trim().to_lowercase();
    let existing = Profile::find()
        .filter(profile::Column::Email.eq(email.clone()))
        .one(db)
        .await?;

    let now = chrono::Utc::now().naive_utc();

    if let Some(user) = existing {
        let mut active: profile::ActiveModel = user.into();
        active.role = sea_orm::ActiveValue::Set("admin".to_string());
        active.updated_at = sea_orm::ActiveValue::Set(now);
        active.update(db).await?;
        tracing::info!(%email, "promoted existing profile to admin");
        return Ok(());
    }

    let password_hash = hash_password(&cfg.password)?;

    let new_admin = profile::ActiveModel {
        email: sea_orm::ActiveValue::Set(email.clone()),
        password_hash: sea_orm::ActiveValue::Set(password_hash),
        profile_type: sea_orm::ActiveValue::Set("personal".to_string()),
        full_name: sea_orm::ActiveValue::Set(Some(cfg.name)),
        role: sea_orm::ActiveValue::Set("admin".to_string()),
        created_at: sea_orm::ActiveValue::Set(now),
        updated_at: sea_orm::ActiveValue::Set(now),
        ..Default::default()
    };

    new_admin.insert(db).await?;
    tracing::info!(%email, "created bootstrap admin profile");
    Ok(())
}
