use crate::error::{AppError, AppResult};
use crate::models::{AttachmentModel, CaseMessageModel, CaseModel};
use crate::response::ApiResponse;
use crate::services::advisor::AdvisorClient;
use crate::services::attachment::{AttachmentService, UploadConfig, Uploader};
use crate::services::case::CaseService;
use crate::services::intake::{IntakeService, NewReport};
use crate::services::message::MessageService;
use crate::websocket::hub::CaseStreamHub;
use axum::{
    extract::{Multipart, Path},
    response::IntoResponse,
    Extension, Json,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SubmitReportRequest {
    /// Short title of the issue (4-200 characters)
    #[validate(length(min = 4, max = 200))]
    pub title: String,
    /// Category name from the catalog
    #[validate(length(min = 1, max = 50))]
    pub category: String,
    /// Full description (20-20000 characters)
    #[validate(length(min = 20, max = 20000))]
    pub content: String,
    /// "anonymous" or "confidential"
    pub submission_type: String,
    /// Reporter name (required for confidential submissions)
    pub reporter_name: Option<String>,
    /// Reporter email (required for confidential submissions)
    pub reporter_email: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubmitReportResponse {
    /// Public tracking code for the new case
    pub report_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TrackedMessageResponse {
    pub id: i32,
    /// "reporter" or "officer"
    pub sender: String,
    /// Officer display name, when officer-sent
    pub sender_name: Option<String>,
    pub sender_avatar: Option<String>,
    pub content: String,
    pub sent_at: String,
}

impl From<CaseMessageModel> for TrackedMessageResponse {
    fn from(m: CaseMessageModel) -> Self {
        Self {
            id: m.id,
            sender: m.sender,
            sender_name: m.sender_name,
            sender_avatar: m.sender_avatar,
            content: m.content,
            sent_at: m.sent_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TrackedAttachmentResponse {
    pub id: i32,
    pub url: String,
    pub file_name: String,
    pub file_type: String,
    pub uploaded_by: String,
    pub uploaded_at: String,
}

impl From<AttachmentModel> for TrackedAttachmentResponse {
    fn from(a: AttachmentModel) -> Self {
        Self {
            id: a.id,
            url: a.url,
            file_name: a.file_name,
            file_type: a.file_type,
            uploaded_by: a.uploaded_by_name,
            uploaded_at: a.uploaded_at.to_string(),
        }
    }
}

/// Reporter-facing view of a case: status and timeline only. Reporter
/// contact and the AI triage fields never appear here.
#[derive(Debug, Serialize, ToSchema)]
pub struct TrackedCaseResponse {
    pub report_id: String,
    pub title: String,
    pub category: String,
    pub submission_type: String,
    pub severity: String,
    pub status: String,
    pub submitted_at: String,
    pub messages: Vec<TrackedMessageResponse>,
    pub attachments: Vec<TrackedAttachmentResponse>,
}

#[utoipa::path(
    post,
    path = "/api/v1/reports",
    request_body = SubmitReportRequest,
    responses(
        (status = 200, description = "Report submitted", body = SubmitReportResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 502, description = "Advisory service unavailable", body = AppError),
    ),
    tag = "intake"
)]
pub async fn submit_report(
    Extension(db): Extension<DatabaseConnection>,
    Extension(advisor): Extension<AdvisorClient>,
    Json(payload): Json<SubmitReportRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(format!("Validation error: {e}")))?;

    let service = IntakeService::new(db, advisor);
    let case = service
        .submit(NewReport {
            title: payload.title,
            category: payload.category,
            content: payload.content,
            submission_type: payload.submission_type,
            reporter_name: payload.reporter_name,
            reporter_email: payload.reporter_email,
        })
        .await?;

    Ok(ApiResponse::with_message(
        SubmitReportResponse {
            report_id: case.public_id,
        },
        "Your report has been submitted. Keep the tracking code to follow up.".to_string(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/track/{code}",
    params(("code" = String, Path, description = "Public tracking code")),
    responses(
        (status = 200, description = "Case timeline", body = TrackedCaseResponse),
        (status = 404, description = "Unknown tracking code", body = AppError),
    ),
    tag = "intake"
)]
pub async fn track_case(
    Extension(db): Extension<DatabaseConnection>,
    Extension(hub): Extension<CaseStreamHub>,
    Path(code): Path<String>,
) -> AppResult<impl IntoResponse> {
    let case = CaseService::new(db.clone()).find_by_public_id(&code).await?;
    let messages = MessageService::new(db.clone(), hub).list(case.id).await?;
    let attachments = AttachmentService::new(db).list(case.id).await?;

    Ok(ApiResponse::ok(tracked_view(case, messages, attachments)))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReporterMessageRequest {
    /// Message content
    #[validate(length(min = 1, max = 10000))]
    pub content: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/track/{code}/messages",
    params(("code" = String, Path, description = "Public tracking code")),
    request_body = ReporterMessageRequest,
    responses(
        (status = 200, description = "Message posted", body = TrackedMessageResponse),
        (status = 404, description = "Unknown tracking code", body = AppError),
        (status = 409, description = "Case is resolved", body = AppError),
    ),
    tag = "intake"
)]
pub async fn post_reporter_message(
    Extension(db): Extension<DatabaseConnection>,
    Extension(hub): Extension<CaseStreamHub>,
    Path(code): Path<String>,
    Json(payload): Json<ReporterMessageRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(format!("Validation error: {e}")))?;

    let case = CaseService::new(db.clone()).find_by_public_id(&code).await?;

    let service = MessageService::new(db, hub);
    let message = service
        .post_reporter_message(case.id, &payload.content)
        .await?;

    Ok(ApiResponse::ok(TrackedMessageResponse::from(message)))
}

/// Reporter evidence upload (multipart form: field "file").
#[utoipa::path(
    post,
    path = "/api/v1/track/{code}/attachments",
    params(("code" = String, Path, description = "Public tracking code")),
    responses(
        (status = 200, description = "File attached", body = TrackedAttachmentResponse),
        (status = 400, description = "Unsupported file", body = AppError),
        (status = 409, description = "Case is resolved", body = AppError),
    ),
    tag = "intake"
)]
pub async fn upload_reporter_attachment(
    Extension(db): Extension<DatabaseConnection>,
    Extension(config): Extension<UploadConfig>,
    Path(code): Path<String>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
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
        .store(&config, &case, &data, &content_type, &file_name, Uploader::Reporter)
        .await?;

    Ok(ApiResponse::ok(TrackedAttachmentResponse::from(attachment)))
}

fn tracked_view(
    case: CaseModel,
    messages: Vec<CaseMessageModel>,
    attachments: Vec<AttachmentModel>,
) -> TrackedCaseResponse {
    TrackedCaseResponse {
        report_id: case.public_id,
        title: case.title,
        category: case.category,
        submission_type: case.submission_type,
        severity: case.severity,
        status: case.status,
        submitted_at: case.submitted_at.to_string(),
        messages: messages.into_iter().map(TrackedMessageResponse::from).collect(),
        attachments: attachments
            .into_iter()
            .map(TrackedAttachmentResponse::from)
            .collect(),
    }
}
