use crate::error::{AppError, AppResult};
use crate::middleware::auth::{require_admin, require_officer};
use crate::middleware::AuthUser;
use crate::models::{CaseModel, UserModel};
use crate::response::{ApiResponse, PaginatedResponse};
use crate::services::attachment::AttachmentService;
use crate::services::case::{CaseFilter, CaseService};
use crate::services::lifecycle::LifecycleService;
use crate::services::message::MessageService;
use crate::websocket::hub::CaseStreamHub;
use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    Extension,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::intake::{TrackedAttachmentResponse, TrackedMessageResponse};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CaseListQuery {
    /// Filter by status name
    pub status: Option<String>,
    /// Filter by severity
    pub severity: Option<String>,
    /// Filter by category
    pub category: Option<String>,
    /// Page number
    pub page: Option<u64>,
    /// Items per page
    pub per_page: Option<u64>,
}

/// Officer/admin view of a case. Reporter contact appears as stored —
/// present for confidential submissions, null for anonymous ones.
#[derive(Debug, Serialize, ToSchema)]
pub struct CaseResponse {
    pub id: i32,
    pub report_id: String,
    pub title: String,
    pub content: String,
    pub category: String,
    pub submission_type: String,
    pub reporter_name: Option<String>,
    pub reporter_email: Option<String>,
    pub severity: String,
    pub status: String,
    pub ai_summary: Option<String>,
    pub ai_risk_assessment: Option<String>,
    pub ai_suggested_steps: Option<serde_json::Value>,
    pub ai_reasoning: Option<String>,
    pub submitted_at: String,
    pub updated_at: String,
}

impl From<CaseModel> for CaseResponse {
    fn from(c: CaseModel) -> Self {
        Self {
            id: c.id,
            report_id: c.public_id,
            title: c.title,
            content: c.content,
            category: c.category,
            submission_type: c.submission_type,
            reporter_name: c.reporter_name,
            reporter_email: c.reporter_email,
            severity: c.severity,
            status: c.status,
            ai_summary: c.ai_summary,
            ai_risk_assessment: c.ai_risk_assessment,
            ai_suggested_steps: c.ai_suggested_steps,
            ai_reasoning: c.ai_reasoning,
            submitted_at: c.submitted_at.to_string(),
            updated_at: c.updated_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AssigneeResponse {
    pub id: i32,
    pub name: String,
    pub avatar_url: Option<String>,
    pub role: String,
}

impl From<UserModel> for AssigneeResponse {
    fn from(u: UserModel) -> Self {
        Self {
            id: u.id,
            name: u.name,
            avatar_url: u.avatar_url,
            role: u.role,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CaseDetailResponse {
    #[serde(flatten)]
    pub case: CaseResponse,
    pub assignees: Vec<AssigneeResponse>,
    pub messages: Vec<TrackedMessageResponse>,
    pub attachments: Vec<TrackedAttachmentResponse>,
}

#[utoipa::path(
    get,
    path = "/api/v1/cases",
    security(("jwt_token" = [])),
    params(
        ("status" = Option<String>, Query, description = "Filter by status name"),
        ("severity" = Option<String>, Query, description = "Filter by severity"),
        ("category" = Option<String>, Query, description = "Filter by category"),
        ("page" = Option<u64>, Query, description = "Page number"),
        ("per_page" = Option<u64>, Query, description = "Items per page"),
    ),
    responses(
        (status = 200, description = "Active cases", body = PaginatedResponse<CaseResponse>),
        (status = 403, description = "Officer or admin only", body = AppError),
    ),
    tag = "cases"
)]
pub async fn list_cases(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Query(params): Query<CaseListQuery>,
) -> AppResult<impl IntoResponse> {
    require_officer(&db, &auth_user).await?;

    let page = params.page.unwrap_or(1);
    let per_page = params.per_page.unwrap_or(20).min(100);

    let service = CaseService::new(db);
    let (cases, total) = service
        .list(
            CaseFilter {
                status: params.status,
                severity: params.severity,
                category: params.category,
            },
            page,
            per_page,
        )
        .await?;
    let items = cases.into_iter().map(CaseResponse::from).collect();

    Ok(ApiResponse::ok(PaginatedResponse::new(
        items, total, page, per_page,
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/cases/{code}",
    security(("jwt_token" = [])),
    params(("code" = String, Path, description = "Public tracking code")),
    responses(
        (status = 200, description = "Case detail", body = CaseDetailResponse),
        (status = 403, description = "Officer or admin only", body = AppError),
        (status = 404, description = "Unknown case", body = AppError),
    ),
    tag = "cases"
)]
pub async fn get_case(
    Extension(db): Extension<DatabaseConnection>,
    Extension(hub): Extension<CaseStreamHub>,
    auth_user: AuthUser,
    Path(code): Path<String>,
) -> AppResult<impl IntoResponse> {
    require_officer(&db, &auth_user).await?;

    let case = CaseService::new(db.clone()).find_by_public_id(&code).await?;
    let assignees = LifecycleService::new(db.clone(), hub.clone())
        .assignees(case.id)
        .await?;
    let messages = MessageService::new(db.clone(), hub).list(case.id).await?;
    let attachments = AttachmentService::new(db).list(case.id).await?;

    Ok(ApiResponse::ok(CaseDetailResponse {
        case: CaseResponse::from(case),
        assignees: assignees.into_iter().map(AssigneeResponse::from).collect(),
        messages: messages.into_iter().map(TrackedMessageResponse::from).collect(),
        attachments: attachments
            .into_iter()
            .map(TrackedAttachmentResponse::from)
            .collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/archive",
    security(("jwt_token" = [])),
    params(
        ("page" = Option<u64>, Query, description = "Page number"),
        ("per_page" = Option<u64>, Query, description = "Items per page"),
    ),
    responses(
        (status = 200, description = "Resolved cases", body = PaginatedResponse<CaseResponse>),
        (status = 403, description = "Admin only", body = AppError),
    ),
    tag = "cases"
)]
pub async fn list_archive(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Query(params): Query<crate::response::PaginationQuery>,
) -> AppResult<impl IntoResponse> {
    require_admin(&db, &auth_user).await?;

    let page = params.page.unwrap_or(1);
    let per_page = params.per_page.unwrap_or(20).min(100);

    let service = CaseService::new(db);
    let (cases, total) = service.list_archive(page, per_page).await?;
    let items = cases.into_iter().map(CaseResponse::from).collect();

    Ok(ApiResponse::ok(PaginatedResponse::new(
        items, total, page, per_page,
    )))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/cases/{code}",
    security(("jwt_token" = [])),
    params(("code" = String, Path, description = "Public tracking code")),
    responses(
        (status = 200, description = "Case deleted", body = String),
        (status = 403, description = "Admin only", body = AppError),
        (status = 404, description = "Unknown case", body = AppError),
    ),
    tag = "cases"
)]
pub async fn delete_case(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(code): Path<String>,
) -> AppResult<impl IntoResponse> {
    let admin = require_admin(&db, &auth_user).await?;

    let service = CaseService::new(db);
    let case = service.find_by_public_id(&code).await?;
    service.delete(case.id, &admin).await?;

    Ok(ApiResponse::ok("Case deleted"))
}
