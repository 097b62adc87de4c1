use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
};
use uuid::Uuid;

use clickgate_account_schema::{otps, users};

use crate::domain::repository::{OtpRepository, UserPort};
use crate::domain::types::{AccountUser, OtpCredential};
use crate::error::AccountError;

// ── User repository ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserPort for DbUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<AccountUser>, AccountError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<AccountUser>, AccountError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }
}

fn user_from_model(model: users::Model) -> AccountUser {
    AccountUser {
        id: model.id,
        email: model.email,
        password_hash: model.password_hash,
    }
}

// ── Otp repository ────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOtpRepository {
    pub db: DatabaseConnection,
}

impl OtpRepository for DbOtpRepository {
    async fn find_live_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<OtpCredential>, AccountError> {
        let now = Utc::now();
        let model = otps::Entity::find()
            .filter(otps::Column::UserId.eq(user_id))
            .filter(otps::Column::ExpiresAt.gt(now))
            .one(&self.db)
            .await
            .context("find live otp by user")?;
        Ok(model.map(otp_from_model))
    }

    async fn insert(&self, otp: &OtpCredential) -> Result<(), AccountError> {
        otps::ActiveModel {
            request_id: Set(otp.request_id),
            user_id: Set(otp.user_id),
            expires_at: Set(otp.expires_at),
            secret: Set(otp.secret.clone()),
            created_at: Set(otp.created_at),
        }
        .insert(&self.db)
        .await
        .context("insert otp")?;
        Ok(())
    }

    async fn find_by_request_id(
        &self,
        request_id: Uuid,
    ) -> Result<Option<OtpCredential>, AccountError> {
        let model = otps::Entity::find_by_id(request_id)
            .one(&self.db)
            .await
            .context("find otp by request id")?;
        Ok(model.map(otp_from_model))
    }

    async fn find_by_user_and_expiry(
        &self,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<Option<OtpCredential>, AccountError> {
        let model = otps::Entity::find()
            .filter(otps::Column::UserId.eq(user_id))
            .filter(otps::Column::ExpiresAt.eq(expires_at))
            .one(&self.db)
            .await
            .context("find otp by user and exact expiry")?;
        Ok(model.map(otp_from_model))
    }

    async fn delete_expired(&self) -> Result<u64, AccountError> {
        let now = Utc::now();
        let result = otps::Entity::delete_many()
            .filter(otps::Column::ExpiresAt.lt(now))
            .exec(&self.db)
            .await
            .context("delete expired otps")?;
        Ok(result.rows_affected)
    }
}

fn otp_from_model(model: otps::Model) -> OtpCredential {
    OtpCredential {
        request_id: model.request_id,
        user_id: model.user_id,
        expires_at: model.expires_at,
        secret: model.secret,
        created_at: model.created_at,
    }
}
