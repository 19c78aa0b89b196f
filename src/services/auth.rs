use crate::{
    error::{AppError, AppResult},
    models::{refresh_token, RefreshToken, User},
    utils::{encode_access_token, encode_refresh_token, hash_password, verify_password},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    TransactionTrait,
};

/// Login, token rotation and password changes for invited identities.
/// There is no self-service registration: accounts come into existence
/// through the admin invitation flow in `UserService`.
pub struct AuthService {
    db: DatabaseConnection,
}

impl AuthService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Login with email + password.
    /// Returns (user_model, access_token, refresh_token).
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> AppResult<(crate::models::UserModel, String, String)> {
        let user = User::find()
            .filter(crate::models::user::Column::Email.eq(email))
            .one(&self.db)
            .await?
            .ok_or(AppError::Unauthorized)?;

        // An account still holding an invite token has never set a
        // password and cannot log in yet.
        if user.invite_token.is_some() {
            return Err(AppError::Unauthorized);
        }

        let is_valid = verify_password(password, &user.password_hash)?;
        if !is_valid {
            return Err(AppError::Unauthorized);
        }

        let (access_token, refresh_token) = self.issue_tokens_for_user(user.id).await?;
        Ok((user, access_token, refresh_token))
    }

    pub async fn rotate_refresh_token(
        &self,
        user_id: i32,
        current_refresh_token: &str,
    ) -> AppResult<(String, String)> {
        let token_hash = crate::utils::jwt::hash_refresh_token(current_refresh_token);
        let now = chrono::Utc::now().naive_utc();

        let existing = RefreshToken::find()
            .filter(refresh_token::Column::UserId.eq(user_id))
            .filter(refresh_token::Column::Token.eq(token_hash))
            .one(&self.db)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if existing.expires_at <= now {
            let _ = RefreshToken::delete_by_id(existing.id).exec(&self.db).await;
            return Err(AppError::Unauthorized);
        }

        let txn = self.db.begin().await?;
        RefreshToken::delete_by_id(existing.id).exec(&txn).await?;
        let (access_token, refresh_token) = self.issue_tokens_for_user_txn(&txn, user_id).await?;
        txn.commit().await?;
        Ok((access_token, refresh_token))
    }

    pub async fn revoke_refresh_token(&self, refresh_token: &str) -> AppResult<()> {
        let token_hash = crate::utils::jwt::hash_refresh_token(refresh_token);
        RefreshToken::delete_many()
            .filter(refresh_token::Column::Token.eq(token_hash))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    pub async fn revoke_all_user_refresh_tokens(&self, user_id: i32) -> AppResult<()> {
        RefreshToken::delete_many()
            .filter(refresh_token::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    pub async fn get_user_by_id(&self, id: i32) -> AppResult<crate::models::UserModel> {
        let user = User::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;
        Ok(user)
    }

    /// Change password for an authenticated identity; revokes every
    /// outstanding refresh token.
    pub async fn change_password(
        &self,
        user_id: i32,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let user = self.get_user_by_id(user_id).await?;
        let is_valid = verify_password(current_password, &user.password_hash)?;
        if !is_valid {
            return Err(AppError::Validation(
                "Current password is incorrect".to_string(),
            ));
        }
        let new_hash = hash_password(new_password)?;
        let now = chrono::Utc::now().naive_utc();
        let mut active: crate::models::user::ActiveModel = user.into();
        active.password_hash = sea_orm::ActiveValue::Set(new_hash);
        active.updated_at = sea_orm::ActiveValue::Set(now);
        active.update(&self.db).await?;
        self.revoke_all_user_refresh_tokens(user_id).await?;
        Ok(())
    }

    async fn issue_tokens_for_user(&self, user_id: i32) -> AppResult<(String, String)> {
        self.issue_tokens_for_user_txn(&self.db, user_id).await
    }

    async fn issue_tokens_for_user_txn<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: i32,
    ) -> AppResult<(String, String)> {
        let user_id_str = user_id.to_string();
        let access_token = encode_access_token(&user_id_str)?;
        let refresh_token = encode_refresh_token(&user_id_str)?;
        self.persist_refresh_token(conn, user_id, &refresh_token)
            .await?;
        Ok((access_token, refresh_token))
    }

    async fn persist_refresh_token<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: i32,
        refresh_token: &str,
    ) -> AppResult<()> {
        let now = chrono::Utc::now().naive_utc();
        let expires_at = now
            + chrono::Duration::seconds(crate::utils::jwt::refresh_token_expiry_seconds() as i64);

        let model = refresh_token::ActiveModel {
            user_id: sea_orm::ActiveValue::Set(user_id),
            token: sea_orm::ActiveValue::Set(crate::utils::jwt::hash_refresh_token(refresh_token)),
            expires_at: sea_orm::ActiveValue::Set(expires_at),
            created_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };
        model.insert(conn).await?;
        Ok(())
    }
}
