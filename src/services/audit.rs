use crate::{
    error::{AppError, AppResult},
    models::{audit_log, AuditLog, AuditLogModel, UserModel},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};

/// Append-only trail of mutating actions. This service exposes exactly one
/// writer; nothing in the crate updates or deletes a row once written.
pub struct AuditService {
    db: DatabaseConnection,
}

impl AuditService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// `case_id` is None for actions that outlive or precede a case
    /// (e.g. case deletion).
    pub async fn append(
        &self,
        case_id: Option<i32>,
        actor: &UserModel,
        action: &str,
    ) -> AppResult<AuditLogModel> {
        let now = chrono::Utc::now().naive_utc();
        let model = audit_log::ActiveModel {
            case_id: sea_orm::ActiveValue::Set(case_id),
            actor_id: sea_orm::ActiveValue::Set(actor.id),
            actor_name: sea_orm::ActiveValue::Set(actor.name.clone()),
            action: sea_orm::ActiveValue::Set(action.to_string()),
            created_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };

        let saved = model
            .insert(&self.db)
            .await
            .map_err(|e| AppError::from_store_write("append_audit_entry", e))?;
        Ok(saved)
    }

    /// Full history, newest first, optionally scoped to one case.
    pub async fn list(
        &self,
        case_id: Option<i32>,
        page: u64,
        per_page: u64,
    ) -> AppResult<(Vec<AuditLogModel>, u64)> {
        let mut query = AuditLog::find();
        if let Some(id) = case_id {
            query = query.filter(audit_log::Column::CaseId.eq(id));
        }

        let paginator = query
            .order_by_desc(audit_log::Column::CreatedAt)
            .order_by_desc(audit_log::Column::Id)
            .paginate(&self.db, per_page);

        let total = paginator.num_items().await?;
        let entries = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((entries, total))
    }
}
