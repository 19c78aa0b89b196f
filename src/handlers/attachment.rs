use crate::error::{AppError, AppResult};
use crate::middleware::auth::require_officer;
use crate::middleware::AuthUser;
use crate::response::ApiResponse;
use crate::services::attachment::{AttachmentService, UploadConfig, Uploader};
use crate::services::case::CaseService;
use axum::{
    extract::{Multipart, Path},
    response::IntoResponse,
    Extension,
};
use sea_orm::DatabaseConnection;

use super::intake::TrackedAttachmentResponse;

/// Officer evidence upload (multipart form: field "file").
#[utoipa::path(
    post,
    path = "/api/v1/cases/{code}/attachments",
    security(("jwt_token" = [])),
    params(("code" = String, Path, description = "Public tracking code")),
    responses(
        (status = 200, description = "File attached", body = TrackedAttachmentResponse),
        (status = 400, description = "Unsupported file", body = AppError),
        (status = 403, description = "Officer or admin only", body = AppError),
        (status = 409, description = "Case is resolved", body = AppError),
    ),
    tag = "attachments"
)]
pub async fn upload_attachment(
    Extension(db): Extension<DatabaseConnection>,
    Extension(config): Extension<UploadConfig>,
    auth_user: AuthUser,
    Path(code): Path<String>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let actor = require_officer(&db, &auth_user).await?;
    let case = CaseService::new(db.clone()).find_by_public_id(&code).await?;

    let field = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read upload: {}", e)))?
        .ok_or_else(|| AppError::Validation("No file provided".to_string()))?;

    let file_name = field.file_name().unwrap_or("attachment").to_string();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();

    let data = field
        .bytes()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read file data: {}", e)))?;

    let service = AttachmentService::new(db);
    let attachment = service
        .store(
            &config,
            &case,
            &data,
            &content_type,
            &file_name,
            Uploader::Officer(&actor),
        )
        .await?;

    Ok(ApiResponse::ok(TrackedAttachmentResponse::from(attachment)))
}

#[utoipa::path(
    get,
    path = "/api/v1/cases/{code}/attachments",
    security(("jwt_token" = [])),
    params(("code" = String, Path, description = "Public tracking code")),
    responses(
        (status = 200, description = "Attachments, oldest first", body = Vec<TrackedAttachmentResponse>),
        (status = 403, description = "Officer or admin only", body = AppError),
        (status = 404, description = "Unknown case", body = AppError),
    ),
    tag = "attachments"
)]
pub async fn list_attachments(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(code): Path<String>,
) -> AppResult<impl IntoResponse> {
    require_officer(&db, &auth_user).await?;

    let case = CaseService::new(db.clone()).find_by_public_id(&code).await?;
    let attachments = AttachmentService::new(db).list(case.id).await?;
    let items: Vec<TrackedAttachmentResponse> = attachments
        .into_iter()
        .map(TrackedAttachmentResponse::from)
        .collect();

    Ok(ApiResponse::ok(items))
}
