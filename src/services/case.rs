use crate::{
    error::{AppError, AppResult},
    models::{case, Case, CaseModel, UserModel},
    services::{audit::AuditService, lifecycle::STATUS_RESOLVED},
};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};

#[derive(Debug, Default, Clone)]
pub struct CaseFilter {
    pub status: Option<String>,
    pub severity: Option<String>,
    pub category: Option<String>,
}

/// Dashboard reads and the admin-only destructive path. Lifecycle
/// mutations live in `LifecycleService`; this service never touches
/// status, severity or assignees.
pub struct CaseService {
    db: DatabaseConnection,
}

impl CaseService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get(&self, case_id: i32) -> AppResult<CaseModel> {
        Case::find_by_id(case_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn find_by_public_id(&self, raw_code: &str) -> AppResult<CaseModel> {
        let code = crate::utils::tracking::normalize_tracking_code(raw_code);
        Case::find()
            .filter(case::Column::PublicId.eq(code))
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Active-case listing: everything not yet Resolved, newest first.
    pub async fn list(
        &self,
        filter: CaseFilter,
        page: u64,
        per_page: u64,
    ) -> AppResult<(Vec<CaseModel>, u64)> {
        let mut query = Case::find().filter(case::Column::Status.ne(STATUS_RESOLVED));

        if let Some(status) = filter.status {
            query = query.filter(case::Column::Status.eq(status));
        }
        if let Some(severity) = filter.severity {
            query = query.filter(case::Column::Severity.eq(severity));
        }
        if let Some(category) = filter.category {
            query = query.filter(case::Column::Category.eq(category));
        }

        let paginator = query
            .order_by_desc(case::Column::SubmittedAt)
            .paginate(&self.db, per_page);

        let total = paginator.num_items().await?;
        let cases = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((cases, total))
    }

    /// Archive: Resolved cases only. Admin-gated at the handler.
    pub async fn list_archive(
        &self,
        page: u64,
        per_page: u64,
    ) -> AppResult<(Vec<CaseModel>, u64)> {
        let paginator = Case::find()
            .filter(case::Column::Status.eq(STATUS_RESOLVED))
            .order_by_desc(case::Column::UpdatedAt)
            .paginate(&self.db, per_page);

        let total = paginator.num_items().await?;
        let cases = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((cases, total))
    }

    /// Irreversible admin-only deletion. Messages, attachments, assignee
    /// rows and share tokens cascade at the schema level; audit rows keep
    /// their text with the case reference nulled. The deletion itself is
    /// recorded with a caseless audit entry, since the referenced row is
    /// gone by the time anyone reads it.
    pub async fn delete(&self, case_id: i32, actor: &UserModel) -> AppResult<()> {
        let case = self.get(case_id).await?;

        Case::delete_by_id(case_id)
            .exec(&self.db)
            .await
            .map_err(|e| AppError::from_store_write("delete_case", e))?;

        AuditService::new(self.db.clone())
            .append(
                None,
                actor,
                &format!("deleted case {} (\"{}\")", case.public_id, case.title),
            )
            .await?;

        tracing::warn!(
            public_id = %case.public_id,
            actor = %actor.name,
            "case deleted"
        );
        Ok(())
    }
}
