use crate::error::{AppError, AppResult};
use crate::middleware::auth::require_officer;
use crate::middleware::AuthUser;
use crate::response::ApiResponse;
use crate::services::case::CaseService;
use crate::services::lifecycle::LifecycleService;
use crate::websocket::hub::CaseStreamHub;
use axum::{extract::Path, response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use super::case::CaseResponse;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignCaseRequest {
    /// Identity to assign
    pub user_id: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TransferCaseRequest {
    /// Replacement assignee set, in order
    #[validate(length(min = 1))]
    pub user_ids: Vec<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddAssigneesRequest {
    /// Identities to union into the assignee set
    #[validate(length(min = 1))]
    pub user_ids: Vec<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangeStatusRequest {
    /// Target status-definition id from the catalog
    pub status_definition_id: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangeSeverityRequest {
    /// One of Low, Medium, High, Critical
    pub severity: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CloseCaseRequest {
    /// Closing remarks appended to the conversation
    pub remarks: Option<String>,
}

#[utoipa::path(
    put,
    path = "/api/v1/cases/{code}/assign",
    security(("jwt_token" = [])),
    params(("code" = String, Path, description = "Public tracking code")),
    request_body = AssignCaseRequest,
    responses(
        (status = 200, description = "Case assigned", body = CaseResponse),
        (status = 403, description = "Officer or admin only", body = AppError),
        (status = 404, description = "Unknown case or identity", body = AppError),
        (status = 409, description = "Case is resolved", body = AppError),
    ),
    tag = "lifecycle"
)]
pub async fn assign_case(
    Extension(db): Extension<DatabaseConnection>,
    Extension(hub): Extension<CaseStreamHub>,
    auth_user: AuthUser,
    Path(code): Path<String>,
    Json(payload): Json<AssignCaseRequest>,
) -> AppResult<impl IntoResponse> {
    let actor = require_officer(&db, &auth_user).await?;
    let case = CaseService::new(db.clone()).find_by_public_id(&code).await?;

    let service = LifecycleService::new(db, hub);
    let updated = service.assign(case.id, payload.user_id, &actor).await?;

    Ok(ApiResponse::ok(CaseResponse::from(updated)))
}

#[utoipa::path(
    put,
    path = "/api/v1/cases/{code}/transfer",
    security(("jwt_token" = [])),
    params(("code" = String, Path, description = "Public tracking code")),
    request_body = TransferCaseRequest,
    responses(
        (status = 200, description = "Case transferred", body = CaseResponse),
        (status = 403, description = "Officer or admin only", body = AppError),
        (status = 404, description = "Unknown case or identity", body = AppError),
        (status = 409, description = "Case is resolved", body = AppError),
    ),
    tag = "lifecycle"
)]
pub async fn transfer_case(
    Extension(db): Extension<DatabaseConnection>,
    Extension(hub): Extension<CaseStreamHub>,
    auth_user: AuthUser,
    Path(code): Path<String>,
    Json(payload): Json<TransferCaseRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(format!("Validation error: {e}")))?;

    let actor = require_officer(&db, &auth_user).await?;
    let case = CaseService::new(db.clone()).find_by_public_id(&code).await?;

    let service = LifecycleService::new(db, hub);
    let updated = service.transfer(case.id, &payload.user_ids, &actor).await?;

    Ok(ApiResponse::ok(CaseResponse::from(updated)))
}

#[utoipa::path(
    put,
    path = "/api/v1/cases/{code}/assignees",
    security(("jwt_token" = [])),
    params(("code" = String, Path, description = "Public tracking code")),
    request_body = AddAssigneesRequest,
    responses(
        (status = 200, description = "Assignees added", body = CaseResponse),
        (status = 403, description = "Officer or admin only", body = AppError),
        (status = 404, description = "Unknown case or identity", body = AppError),
        (status = 409, description = "Case is resolved", body = AppError),
    ),
    tag = "lifecycle"
)]
pub async fn add_assignees(
    Extension(db): Extension<DatabaseConnection>,
    Extension(hub): Extension<CaseStreamHub>,
    auth_user: AuthUser,
    Path(code): Path<String>,
    Json(payload): Json<AddAssigneesRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(format!("Validation error: {e}")))?;

    let actor = require_officer(&db, &auth_user).await?;
    let case = CaseService::new(db.clone()).find_by_public_id(&code).await?;

    let service = LifecycleService::new(db, hub);
    let updated = service
        .add_assignees(case.id, &payload.user_ids, &actor)
        .await?;

    Ok(ApiResponse::ok(CaseResponse::from(updated)))
}

#[utoipa::path(
    put,
    path = "/api/v1/cases/{code}/status",
    security(("jwt_token" = [])),
    params(("code" = String, Path, description = "Public tracking code")),
    request_body = ChangeStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = CaseResponse),
        (status = 403, description = "Officer or admin only", body = AppError),
        (status = 409, description = "Case is resolved", body = AppError),
        (status = 422, description = "Reserved status selected", body = AppError),
    ),
    tag = "lifecycle"
)]
pub async fn change_status(
    Extension(db): Extension<DatabaseConnection>,
    Extension(hub): Extension<CaseStreamHub>,
    auth_user: AuthUser,
    Path(code): Path<String>,
    Json(payload): Json<ChangeStatusRequest>,
) -> AppResult<impl IntoResponse> {
    let actor = require_officer(&db, &auth_user).await?;
    let case = CaseService::new(db.clone()).find_by_public_id(&code).await?;

    let service = LifecycleService::new(db, hub);
    let updated = service
        .change_status(case.id, payload.status_definition_id, &actor)
        .await?;

    Ok(ApiResponse::ok(CaseResponse::from(updated)))
}

#[utoipa::path(
    put,
    path = "/api/v1/cases/{code}/severity",
    security(("jwt_token" = [])),
    params(("code" = String, Path, description = "Public tracking code")),
    request_body = ChangeSeverityRequest,
    responses(
        (status = 200, description = "Severity changed", body = CaseResponse),
        (status = 400, description = "Unknown severity", body = AppError),
        (status = 403, description = "Officer or admin only", body = AppError),
        (status = 409, description = "Case is resolved", body = AppError),
    ),
    tag = "lifecycle"
)]
pub async fn change_severity(
    Extension(db): Extension<DatabaseConnection>,
    Extension(hub): Extension<CaseStreamHub>,
    auth_user: AuthUser,
    Path(code): Path<String>,
    Json(payload): Json<ChangeSeverityRequest>,
) -> AppResult<impl IntoResponse> {
    let actor = require_officer(&db, &auth_user).await?;
    let case = CaseService::new(db.clone()).find_by_public_id(&code).await?;

    let service = LifecycleService::new(db, hub);
    let updated = service
        .change_severity(case.id, &payload.severity, &actor)
        .await?;

    Ok(ApiResponse::ok(CaseResponse::from(updated)))
}

#[utoipa::path(
    put,
    path = "/api/v1/cases/{code}/close",
    security(("jwt_token" = [])),
    params(("code" = String, Path, description = "Public tracking code")),
    request_body = CloseCaseRequest,
    responses(
        (status = 200, description = "Case closed", body = CaseResponse),
        (status = 403, description = "Officer or admin only", body = AppError),
        (status = 409, description = "Case is already resolved", body = AppError),
    ),
    tag = "lifecycle"
)]
pub async fn close_case(
    Extension(db): Extension<DatabaseConnection>,
    Extension(hub): Extension<CaseStreamHub>,
    auth_user: AuthUser,
    Path(code): Path<String>,
    Json(payload): Json<CloseCaseRequest>,
) -> AppResult<impl IntoResponse> {
    let actor = require_officer(&db, &auth_user).await?;
    let case = CaseService::new(db.clone()).find_by_public_id(&code).await?;

    let service = LifecycleService::new(db, hub);
    let updated = service
        .close(case.id, &actor, payload.remarks.as_deref())
        .await?;

    Ok(ApiResponse::ok(CaseResponse::from(updated)))
}
