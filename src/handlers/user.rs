use crate::error::{AppError, AppResult};
use crate::middleware::auth::require_admin;
use crate::middleware::AuthUser;
use crate::response::{ApiResponse, PaginatedResponse, PaginationQuery};
use crate::services::email::EmailService;
use crate::services::user::UserService;
use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    Extension, Json,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use super::auth::UserResponse;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct InviteUserRequest {
    /// Display name (2-100 characters)
    #[validate(length(min = 2, max = 100))]
    pub name: String,
    /// Email address the invitation is sent to
    #[validate(email)]
    pub email: String,
    /// Role: admin or officer
    pub role: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    /// New display name
    #[validate(length(min = 2, max = 100))]
    pub name: Option<String>,
    /// New role: admin or officer
    pub role: Option<String>,
    /// New avatar URL
    pub avatar_url: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/users",
    security(("jwt_token" = [])),
    request_body = InviteUserRequest,
    responses(
        (status = 200, description = "Invitation sent", body = UserResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 403, description = "Admin only", body = AppError),
    ),
    tag = "users"
)]
pub async fn invite_user(
    Extension(db): Extension<DatabaseConnection>,
    Extension(email_service): Extension<EmailService>,
    auth_user: AuthUser,
    Json(payload): Json<InviteUserRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(format!("Validation error: {e}")))?;

    require_admin(&db, &auth_user).await?;

    let service = UserService::new(db);
    let user = service
        .invite(&payload.name, &payload.email, &payload.role, &email_service)
        .await?;

    Ok(ApiResponse::with_message(
        UserResponse::from(user),
        "Invitation sent".to_string(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    security(("jwt_token" = [])),
    params(
        ("page" = Option<u64>, Query, description = "Page number"),
        ("per_page" = Option<u64>, Query, description = "Items per page"),
    ),
    responses(
        (status = 200, description = "All identities", body = PaginatedResponse<UserResponse>),
        (status = 403, description = "Admin only", body = AppError),
    ),
    tag = "users"
)]
pub async fn list_users(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Query(params): Query<PaginationQuery>,
) -> AppResult<impl IntoResponse> {
    require_admin(&db, &auth_user).await?;

    let page = params.page.unwrap_or(1);
    let per_page = params.per_page.unwrap_or(20).min(100);

    let service = UserService::new(db);
    let (users, total) = service.list(page, per_page).await?;
    let items = users.into_iter().map(UserResponse::from).collect();

    Ok(ApiResponse::ok(PaginatedResponse::new(
        items, total, page, per_page,
    )))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/users/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Identity ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Identity updated", body = UserResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 403, description = "Admin only", body = AppError),
        (status = 404, description = "Unknown identity", body = AppError),
    ),
    tag = "users"
)]
pub async fn update_user(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateUserRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(format!("Validation error: {e}")))?;

    require_admin(&db, &auth_user).await?;

    let service = UserService::new(db);
    let user = service
        .update(
            id,
            payload.name.as_deref(),
            payload.role.as_deref(),
            payload.avatar_url.as_deref(),
        )
        .await?;

    Ok(ApiResponse::ok(UserResponse::from(user)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/users/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Identity ID")),
    responses(
        (status = 200, description = "Identity deleted", body = String),
        (status = 400, description = "Cannot delete yourself", body = AppError),
        (status = 403, description = "Admin only", body = AppError),
        (status = 404, description = "Unknown identity", body = AppError),
    ),
    tag = "users"
)]
pub async fn delete_user(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let admin = require_admin(&db, &auth_user).await?;

    let service = UserService::new(db);
    service.delete(id, admin.id).await?;

    Ok(ApiResponse::ok("User deleted"))
}
