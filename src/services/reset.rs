use crate::{
    error::{AppError, AppResult, OtpError},
    models::{profile, refresh_token, reset_token, Profile, RefreshToken, ResetToken},
    services::email::EmailService,
    utils::{hash_password, otp},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};

pub const CODE_TTL_MINUTES: i64 = 15;
pub const ISSUE_COOLDOWN_SECONDS: i64 = 60;
pub const MAX_ATTEMPTS: i32 = 3;

/// Outcome of checking a submitted code against the most recent token.
/// Checked in a fixed order: expiry wins over the attempt cap, which wins
/// over a mismatch, so "expired" is reported even for a correct string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CodeCheck {
    Ok,
    Expired,
    AttemptsExhausted,
    Mismatch,
}

fn check_code(
    token: &reset_token::Model,
    submitted: &str,
    now: chrono::NaiveDateTime,
) -> CodeCheck {
    if now > token.expires_at {
        return CodeCheck::Expired;
    }
    if token.attempts >= MAX_ATTEMPTS {
        return CodeCheck::AttemptsExhausted;
    }
    if token.token != submitted {
        return CodeCheck::Mismatch;
    }
    CodeCheck::Ok
}

pub struct ResetService {
    db: DatabaseConnection,
}

impl ResetService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Issue a reset code for this email and send it.
    ///
    /// Enumeration-safe: an unknown email still returns Ok so the response
    /// shape never reveals whether an account exists. A repeat request
    /// within the cooldown is rejected without generating a new code.
    pub async fn issue_code(&self, email: &str, email_service: &EmailService) -> AppResult<()> {
        let email = email.to_lowercase();

        let user = Profile::find()
            .filter(profile::Column::Email.eq(email.clone()))
            .one(&self.db)
            .await?;

        let user = match user {
            Some(u) => u,
            None => {
                tracing::debug!("Reset requested for unknown email");
                return Ok(());
            }
        };

        let now = chrono::Utc::now().naive_utc();

        if let Some(latest) = self.latest_token_for(&email).await? {
            if now - latest.created_at < chrono::Duration::seconds(ISSUE_COOLDOWN_SECONDS) {
                return Err(AppError::RateLimited);
            }
        }

        let code = otp::generate_code()?;
        let row = reset_token::ActiveModel {
            user_id: sea_orm::ActiveValue::Set(user.id),
            email: sea_orm::ActiveValue::Set(email.clone()),
            token: sea_orm::ActiveValue::Set(code.clone()),
            attempts: sea_orm::ActiveValue::Set(0),
            expires_at: sea_orm::ActiveValue::Set(
                now + chrono::Duration::minutes(CODE_TTL_MINUTES),
            ),
            created_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };
        row.insert(&self.db).await?;

        if let Err(e) = email_service.send_reset_code(&email, &code).await {
            tracing::warn!("Failed to send reset code: {e}");
        }

        Ok(())
    }

    /// Verify a submitted code and, on success, set the new password.
    ///
    /// A mismatch increments the attempt counter on the most recent token.
    /// Success purges every outstanding token for the user (not just the
    /// matched one) and revokes all refresh tokens.
    pub async fn verify_and_reset(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let email = email.to_lowercase();
        let now = chrono::Utc::now().naive_utc();

        let token = self
            .latest_token_for(&email)
            .await?
            .ok_or(AppError::Otp(OtpError::Invalid))?;

        match check_code(&token, code, now) {
            CodeCheck::Expired => Err(AppError::Otp(OtpError::Expired)),
            CodeCheck::AttemptsExhausted => Err(AppError::Otp(OtpError::Invalid)),
            CodeCheck::Mismatch => {
                let attempts = token.attempts + 1;
                let mut active: reset_token::ActiveModel = token.into();
                active.attempts = sea_orm::ActiveValue::Set(attempts);
                active.update(&self.db).await?;
                Err(AppError::Otp(OtpError::Invalid))
            }
            CodeCheck::Ok => {
                let user_id = token.user_id;
                let new_hash = hash_password(new_password)?;

                let user = Profile::find_by_id(user_id)
                    .one(&self.db)
                    .await?
                    .ok_or(AppError::Otp(OtpError::Invalid))?;

                let txn = self.db.begin().await?;

                let mut active: profile::ActiveModel = user.into();
                active.password_hash = sea_orm::ActiveValue::Set(new_hash);
                active.updated_at = sea_orm::ActiveValue::Set(now);
                active.update(&txn).await?;

                ResetToken::delete_many()
                    .filter(reset_token::Column::UserId.eq(user_id))
                    .exec(&txn)
                    .await?;

                RefreshToken::delete_many()
                    .filter(refresh_token::Column::UserId.eq(user_id))
                    .exec(&txn)
                    .await?;

                txn.commit().await?;
                Ok(())
            }
        }
    }

    async fn latest_token_for(&self, email: &str) -> AppResult<Option<reset_token::Model>> {
        let token = ResetToken::find()
            .filter(reset_token::Column::Email.eq(email))
            .order_by_desc(reset_token::Column::Id)
            .one(&self.db)
            .await?;
        Ok(token)
    }
}
