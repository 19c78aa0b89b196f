use crate::error::{AppError, AppResult};
use crate::middleware::auth::require_admin;
use crate::middleware::AuthUser;
use crate::models::AuditLogModel;
use crate::response::{ApiResponse, PaginatedResponse};
use crate::services::audit::AuditService;
use axum::{extract::Query, response::IntoResponse, Extension};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AuditListQuery {
    /// Restrict to one case (internal id)
    pub case_id: Option<i32>,
    /// Page number
    pub page: Option<u64>,
    /// Items per page
    pub per_page: Option<u64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuditEntryResponse {
    pub id: i32,
    /// Null for actions without a surviving case reference
    pub case_id: Option<i32>,
    pub actor_id: i32,
    pub actor_name: String,
    pub action: String,
    pub created_at: String,
}

impl From<AuditLogModel> for AuditEntryResponse {
    fn from(e: AuditLogModel) -> Self {
        Self {
            id: e.id,
            case_id: e.case_id,
            actor_id: e.actor_id,
            actor_name: e.actor_name,
            action: e.action,
            created_at: e.created_at.to_string(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/audit",
    security(("jwt_token" = [])),
    params(
        ("case_id" = Option<i32>, Query, description = "Restrict to one case"),
        ("page" = Option<u64>, Query, description = "Page number"),
        ("per_page" = Option<u64>, Query, description = "Items per page"),
    ),
    responses(
        (status = 200, description = "Audit history, newest first", body = PaginatedResponse<AuditEntryResponse>),
        (status = 403, description = "Admin only", body = AppError),
    ),
    tag = "audit"
)]
pub async fn list_audit_log(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Query(params): Query<AuditListQuery>,
) -> AppResult<impl IntoResponse> {
    require_admin(&db, &auth_user).await?;

    let page = params.page.unwrap_or(1);
    let per_page = params.per_page.unwrap_or(50).min(200);

    let service = AuditService::new(db);
    let (entries, total) = service.list(params.case_id, page, per_page).await?;
    let items = entries.into_iter().map(AuditEntryResponse::from).collect();

    Ok(ApiResponse::ok(PaginatedResponse::new(
        items, total, page, per_page,
    )))
}
