use crate::{
    error::{AppError, AppResult},
    models::{user, User, UserModel},
    services::email::EmailService,
    utils::hash_password,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};

pub const ROLES: &[&str] = &["admin", "officer"];

const INVITE_EXPIRY_DAYS: i64 = 7;

/// Admin-side identity management. Accounts are created by invitation:
/// the invited user activates by setting a password against a one-shot
/// token; until then the account cannot log in.
pub struct UserService {
    db: DatabaseConnection,
}

impl UserService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn invite(
        &self,
        name: &str,
        email: &str,
        role: &str,
        email_service: &EmailService,
    ) -> AppResult<UserModel> {
        validate_role(role)?;

        let exists = User::find()
            .filter(user::Column::Email.eq(email))
            .count(&self.db)
            .await?
            > 0;
        if exists {
            return Err(AppError::Validation(
                "A user with this email already exists".to_string(),
            ));
        }

        let now = chrono::Utc::now().naive_utc();
        let invite_token = uuid::Uuid::new_v4().to_string();
        // Placeholder hash; login is blocked while the invite token is
        // outstanding, and accept-invite overwrites it.
        let placeholder_hash = hash_password(&uuid::Uuid::new_v4().to_string())?;

        let new_user = user::ActiveModel {
            name: sea_orm::ActiveValue::Set(name.to_string()),
            email: sea_orm::ActiveValue::Set(email.to_string()),
            password_hash: sea_orm::ActiveValue::Set(placeholder_hash),
            avatar_url: sea_orm::ActiveValue::Set(None),
            role: sea_orm::ActiveValue::Set(role.to_string()),
            invite_token: sea_orm::ActiveValue::Set(Some(invite_token.clone())),
            invite_expires: sea_orm::ActiveValue::Set(Some(
                now + chrono::Duration::days(INVITE_EXPIRY_DAYS),
            )),
            created_at: sea_orm::ActiveValue::Set(now),
            updated_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };

        let saved = new_user
            .insert(&self.db)
            .await
            .map_err(|e| AppError::from_store_write("invite_user", e))?;

        // Non-fatal: the invite link can be re-sent by deleting and
        // re-inviting if delivery failed.
        if let Err(e) = email_service
            .send_invitation_email(&saved.email, &saved.name, &invite_token)
            .await
        {
            tracing::warn!("Failed to send invitation email: {e}");
        }

        Ok(saved)
    }

    /// Activate an invited account by setting its password.
    pub async fn accept_invite(&self, token: &str, password: &str) -> AppResult<UserModel> {
        let user = User::find()
            .filter(user::Column::InviteToken.eq(token))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::Validation("Invalid invitation token".to_string()))?;

        if let Some(expires) = user.invite_expires {
            if chrono::Utc::now().naive_utc() > expires {
                return Err(AppError::Validation(
                    "Invitation has expired".to_string(),
                ));
            }
        }

        let new_hash = hash_password(password)?;
        let now = chrono::Utc::now().naive_utc();
        let mut active: user::ActiveModel = user.into();
        active.password_hash = sea_orm::ActiveValue::Set(new_hash);
        active.invite_token = sea_orm::ActiveValue::Set(None);
        active.invite_expires = sea_orm::ActiveValue::Set(None);
        active.updated_at = sea_orm::ActiveValue::Set(now);
        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    pub async fn list(&self, page: u64, per_page: u64) -> AppResult<(Vec<UserModel>, u64)> {
        let paginator = User::find()
            .order_by_asc(user::Column::Name)
            .paginate(&self.db, per_page);

        let total = paginator.num_items().await?;
        let users = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((users, total))
    }

    pub async fn update(
        &self,
        user_id: i32,
        name: Option<&str>,
        role: Option<&str>,
        avatar_url: Option<&str>,
    ) -> AppResult<UserModel> {
        if let Some(role) = role {
            validate_role(role)?;
        }

        let existing = User::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let now = chrono::Utc::now().naive_utc();
        let mut active: user::ActiveModel = existing.into();
        if let Some(name) = name {
            active.name = sea_orm::ActiveValue::Set(name.to_string());
        }
        if let Some(role) = role {
            active.role = sea_orm::ActiveValue::Set(role.to_string());
        }
        if let Some(avatar_url) = avatar_url {
            active.avatar_url = sea_orm::ActiveValue::Set(Some(avatar_url.to_string()));
        }
        active.updated_at = sea_orm::ActiveValue::Set(now);

        let updated = active
            .update(&self.db)
            .await
            .map_err(|e| AppError::from_store_write("update_user", e))?;
        Ok(updated)
    }

    pub async fn delete(&self, user_id: i32, actor_id: i32) -> AppResult<()> {
        if user_id == actor_id {
            return Err(AppError::Validation(
                "You cannot delete your own account".to_string(),
            ));
        }

        User::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        User::delete_by_id(user_id)
            .exec(&self.db)
            .await
            .map_err(|e| AppError::from_store_write("delete_user", e))?;
        Ok(())
    }
}

fn validate_role(role: &str) -> AppResult<()> {
    if !ROLES.contains(&role) {
        return Err(AppError::Validation(format!(
            "Role must be one of: {}",
            ROLES.join(", ")
        )));
    }
    Ok(())
}
