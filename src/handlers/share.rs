use crate::error::{AppError, AppResult};
use crate::middleware::auth::require_officer;
use crate::middleware::AuthUser;
use crate::response::ApiResponse;
use crate::services::case::CaseService;
use crate::services::share::ShareService;
use axum::{extract::Path, response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::intake::{TrackedAttachmentResponse, TrackedMessageResponse};

#[derive(Debug, Deserialize, ToSchema)]
pub struct IssueShareLinkRequest {
    /// Link lifetime in days: 1, 7 or 30
    pub ttl_days: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ShareLinkResponse {
    /// Opaque share token
    pub token: String,
    /// Shareable URL embedding the token
    pub url: String,
    /// Expiry timestamp
    pub expires_at: String,
}

/// External read-only case view. The reporter contact fields have no
/// representation here at all — redaction is structural, not conditional.
#[derive(Debug, Serialize, ToSchema)]
pub struct SharedCaseResponse {
    pub report_id: String,
    pub title: String,
    pub content: String,
    pub category: String,
    pub submission_type: String,
    pub severity: String,
    pub status: String,
    pub submitted_at: String,
    pub expires_at: String,
    pub messages: Vec<TrackedMessageResponse>,
    pub attachments: Vec<TrackedAttachmentResponse>,
}

#[utoipa::path(
    post,
    path = "/api/v1/cases/{code}/share",
    security(("jwt_token" = [])),
    params(("code" = String, Path, description = "Public tracking code")),
    request_body = IssueShareLinkRequest,
    responses(
        (status = 200, description = "Share link issued", body = ShareLinkResponse),
        (status = 400, description = "Unsupported lifetime", body = AppError),
        (status = 403, description = "Officer or admin only", body = AppError),
        (status = 404, description = "Unknown case", body = AppError),
    ),
    tag = "share"
)]
pub async fn issue_share_link(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(code): Path<String>,
    Json(payload): Json<IssueShareLinkRequest>,
) -> AppResult<impl IntoResponse> {
    let actor = require_officer(&db, &auth_user).await?;
    let case = CaseService::new(db.clone()).find_by_public_id(&code).await?;

    let service = ShareService::new(db);
    let (token, url) = service.issue(case.id, payload.ttl_days, &actor).await?;

    Ok(ApiResponse::ok(ShareLinkResponse {
        token: token.id,
        url,
        expires_at: token.expires_at.to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/share/{token}",
    params(("token" = String, Path, description = "Share token")),
    responses(
        (status = 200, description = "Redacted case view", body = SharedCaseResponse),
        (status = 404, description = "Invalid link", body = AppError),
        (status = 410, description = "Expired link", body = AppError),
    ),
    tag = "share"
)]
pub async fn resolve_share_link(
    Extension(db): Extension<DatabaseConnection>,
    Path(token): Path<String>,
) -> AppResult<impl IntoResponse> {
    let service = ShareService::new(db);
    let view = service.resolve(&token).await?;

    Ok(ApiResponse::ok(SharedCaseResponse {
        report_id: view.case.public_id,
        title: view.case.title,
        content: view.case.content,
        category: view.case.category,
        submission_type: view.case.submission_type,
        severity: view.case.severity,
        status: view.case.status,
        submitted_at: view.case.submitted_at.to_string(),
        expires_at: view.expires_at.to_string(),
        messages: view
            .messages
            .into_iter()
            .map(TrackedMessageResponse::from)
            .collect(),
        attachments: view
            .attachments
            .into_iter()
            .map(TrackedAttachmentResponse::from)
            .collect(),
    }))
}
