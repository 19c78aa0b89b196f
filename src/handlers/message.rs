use crate::error::{AppError, AppResult};
use crate::middleware::auth::require_officer;
use crate::middleware::AuthUser;
use crate::response::ApiResponse;
use crate::services::case::CaseService;
use crate::services::message::MessageService;
use crate::websocket::hub::CaseStreamHub;
use axum::{extract::Path, response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use super::intake::TrackedMessageResponse;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct OfficerMessageRequest {
    /// Message content
    #[validate(length(min = 1, max = 10000))]
    pub content: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/cases/{code}/messages",
    security(("jwt_token" = [])),
    params(("code" = String, Path, description = "Public tracking code")),
    responses(
        (status = 200, description = "Conversation, oldest first", body = Vec<TrackedMessageResponse>),
        (status = 403, description = "Officer or admin only", body = AppError),
        (status = 404, description = "Unknown case", body = AppError),
    ),
    tag = "messages"
)]
pub async fn list_messages(
    Extension(db): Extension<DatabaseConnection>,
    Extension(hub): Extension<CaseStreamHub>,
    auth_user: AuthUser,
    Path(code): Path<String>,
) -> AppResult<impl IntoResponse> {
    require_officer(&db, &auth_user).await?;

    let case = CaseService::new(db.clone()).find_by_public_id(&code).await?;
    let messages = MessageService::new(db, hub).list(case.id).await?;
    let items: Vec<TrackedMessageResponse> = messages
        .into_iter()
        .map(TrackedMessageResponse::from)
        .collect();

    Ok(ApiResponse::ok(items))
}

#[utoipa::path(
    post,
    path = "/api/v1/cases/{code}/messages",
    security(("jwt_token" = [])),
    params(("code" = String, Path, description = "Public tracking code")),
    request_body = OfficerMessageRequest,
    responses(
        (status = 200, description = "Message posted", body = TrackedMessageResponse),
        (status = 403, description = "Officer or admin only", body = AppError),
        (status = 409, description = "Case is resolved", body = AppError),
    ),
    tag = "messages"
)]
pub async fn post_officer_message(
    Extension(db): Extension<DatabaseConnection>,
    Extension(hub): Extension<CaseStreamHub>,
    auth_user: AuthUser,
    Path(code): Path<String>,
    Json(payload): Json<OfficerMessageRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(format!("Validation error: {e}")))?;

    let actor = require_officer(&db, &auth_user).await?;
    let case = CaseService::new(db.clone()).find_by_public_id(&code).await?;

    let service = MessageService::new(db, hub);
    let message = service
        .post_officer_message(case.id, &actor, &payload.content)
        .await?;

    Ok(ApiResponse::ok(TrackedMessageResponse::from(message)))
}
