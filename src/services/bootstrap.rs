use crate::error::AppResult;
use crate::models::{category, status_definition, Category, StatusDefinition, User};
use crate::utils::hash_password;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use std::env;

#[derive(Debug, Clone)]
pub struct BootstrapAdminConfig {
    pub name: String,
    pub email: String,
    pub password: String,
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
            name: env::var("BOOTSTRAP_ADMIN_NAME").ok()?,
            email: env::var("BOOTSTRAP_ADMIN_EMAIL").ok()?,
            password: env::var("BOOTSTRAP_ADMIN_PASSWORD").ok()?,
        })
    }
}

/// First-run admin provisioning:
/// - if any admin already exists, do nothing
/// - else if the configured email exists, promote it
/// - else create a new active admin account
pub async fn ensure_bootstrap_admin(db: &DatabaseConnection) -> AppResult<()> {
    let Some(cfg) = BootstrapAdminConfig::from_env() else {
        return Ok(());
    };

    let admin_exists = User::find()
        .filter(crate::models::user::Column::Role.eq("admin"))
        .one(db)
        .await?
        .is_some();
    if admin_exists {
        return Ok(());
    }

    let existing = User::find()
        .filter(crate::models::user::Column::Email.eq(cfg.email.clone()))
        .one(db)
        .await?;

    let now = chrono::Utc::now().naive_utc();

    if let Some(user) = existing {
        let mut active: crate::models::user::ActiveModel = user.into();
        active.role = sea_orm::ActiveValue::Set("admin".to_string());
        active.updated_at = sea_orm::ActiveValue::Set(now);
        active.update(db).await?;
        return Ok(());
    }

    let password_hash = hash_password(&cfg.password)?;

    let new_user = crate::models::user::ActiveModel {
        name: sea_orm::ActiveValue::Set(cfg.name),
        email: sea_orm::ActiveValue::Set(cfg.email),
        password_hash: sea_orm::ActiveValue::Set(password_hash),
        avatar_url: sea_orm::ActiveValue::Set(None),
        role: sea_orm::ActiveValue::Set("admin".to_string()),
        invite_token: sea_orm::ActiveValue::Set(None),
        invite_expires: sea_orm::ActiveValue::Set(None),
        created_at: sea_orm::ActiveValue::Set(now),
        updated_at: sea_orm::ActiveValue::Set(now),
        ..Default::default()
    };

    new_user.insert(db).await?;
    tracing::info!("Bootstrap admin account created");
    Ok(())
}

/// Default status catalog, in board order. New/Resolved/Case Closed are
/// the reserved names the lifecycle engine treats specially.
const DEFAULT_STATUSES: &[(&str, &str)] = &[
    ("New", "#3b82f6"),
    ("In Progress", "#f59e0b"),
    ("Forwarded to Upper Management", "#8b5cf6"),
    ("Dismissed", "#6b7280"),
    ("Case Closed", "#374151"),
    ("Resolved", "#10b981"),
];

const DEFAULT_CATEGORIES: &[&str] = &["Financial", "HR", "Safety", "Other"];

/// Seed the status and category catalogs on an empty database. Existing
/// (possibly admin-edited) catalogs are left untouched.
pub async fn seed_catalogs(db: &DatabaseConnection) -> AppResult<()> {
    let now = chrono::Utc::now().naive_utc();

    if StatusDefinition::find().count(db).await? == 0 {
        for (order, (name, color)) in DEFAULT_STATUSES.iter().enumerate() {
            let row = status_definition::ActiveModel {
                name: sea_orm::ActiveValue::Set(name.to_string()),
                color: sea_orm::ActiveValue::Set(color.to_string()),
                sort_order: sea_orm::ActiveValue::Set(order as i32),
                created_at: sea_orm::ActiveValue::Set(now),
                ..Default::default()
            };
            row.insert(db).await?;
        }
        tracing::info!("Status catalog seeded");
    }

    if Category::find().count(db).await? == 0 {
        for name in DEFAULT_CATEGORIES {
            let row = category::ActiveModel {
                name: sea_orm::ActiveValue::Set(name.to_string()),
                created_at: sea_orm::ActiveValue::Set(now),
                ..Default::default()
            };
            row.insert(db).await?;
        }
        tracing::info!("Category catalog seeded");
    }

    Ok(())
}
