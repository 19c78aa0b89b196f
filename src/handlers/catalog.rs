use crate::error::{AppError, AppResult};
use crate::middleware::auth::{require_admin, require_officer};
use crate::middleware::AuthUser;
use crate::models::{CategoryModel, StatusDefinitionModel};
use crate::response::ApiResponse;
use crate::services::catalog::CatalogService;
use axum::{extract::Path, response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    pub id: i32,
    pub name: String,
    pub color: String,
    pub sort_order: i32,
}

impl From<StatusDefinitionModel> for StatusResponse {
    fn from(s: StatusDefinitionModel) -> Self {
        Self {
            id: s.id,
            name: s.name,
            color: s.color,
            sort_order: s.sort_order,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryResponse {
    pub id: i32,
    pub name: String,
}

impl From<CategoryModel> for CategoryResponse {
    fn from(c: CategoryModel) -> Self {
        Self {
            id: c.id,
            name: c.name,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateStatusRequest {
    /// Status name (1-50 characters)
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    /// Display color (hex)
    #[validate(length(min = 1, max = 20))]
    pub color: String,
    /// Board position
    pub sort_order: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateStatusRequest {
    /// New status name
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,
    /// New display color
    #[validate(length(min = 1, max = 20))]
    pub color: Option<String>,
    /// New board position
    pub sort_order: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryRequest {
    /// Category name (1-50 characters)
    #[validate(length(min = 1, max = 50))]
    pub name: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/statuses",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Status catalog in board order", body = Vec<StatusResponse>),
        (status = 403, description = "Officer or admin only", body = AppError),
    ),
    tag = "catalog"
)]
pub async fn list_statuses(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    require_officer(&db, &auth_user).await?;

    let statuses = CatalogService::new(db).list_statuses().await?;
    let items: Vec<StatusResponse> = statuses.into_iter().map(StatusResponse::from).collect();
    Ok(ApiResponse::ok(items))
}

#[utoipa::path(
    get,
    path = "/api/v1/categories",
    responses(
        (status = 200, description = "Category catalog", body = Vec<CategoryResponse>),
    ),
    tag = "catalog"
)]
pub async fn list_categories(
    Extension(db): Extension<DatabaseConnection>,
) -> AppResult<impl IntoResponse> {
    let categories = CatalogService::new(db).list_categories().await?;
    let items: Vec<CategoryResponse> = categories.into_iter().map(CategoryResponse::from).collect();
    Ok(ApiResponse::ok(items))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/statuses",
    security(("jwt_token" = [])),
    request_body = CreateStatusRequest,
    responses(
        (status = 200, description = "Status created", body = StatusResponse),
        (status = 403, description = "Admin only", body = AppError),
        (status = 409, description = "Duplicate name", body = AppError),
    ),
    tag = "catalog"
)]
pub async fn create_status(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Json(payload): Json<CreateStatusRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(format!("Validation error: {e}")))?;

    require_admin(&db, &auth_user).await?;

    let service = CatalogService::new(db);
    let status = service
        .create_status(&payload.name, &payload.color, payload.sort_order.unwrap_or(0))
        .await?;

    Ok(ApiResponse::ok(StatusResponse::from(status)))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/statuses/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Status definition ID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = StatusResponse),
        (status = 400, description = "Reserved status", body = AppError),
        (status = 403, description = "Admin only", body = AppError),
        (status = 404, description = "Unknown status", body = AppError),
    ),
    tag = "catalog"
)]
pub async fn update_status(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(format!("Validation error: {e}")))?;

    require_admin(&db, &auth_user).await?;

    let service = CatalogService::new(db);
    let status = service
        .update_status(
            id,
            payload.name.as_deref(),
            payload.color.as_deref(),
            payload.sort_order,
        )
        .await?;

    Ok(ApiResponse::ok(StatusResponse::from(status)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/statuses/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Status definition ID")),
    responses(
        (status = 200, description = "Status deleted", body = String),
        (status = 400, description = "Reserved status", body = AppError),
        (status = 403, description = "Admin only", body = AppError),
        (status = 404, description = "Unknown status", body = AppError),
    ),
    tag = "catalog"
)]
pub async fn delete_status(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    require_admin(&db, &auth_user).await?;

    CatalogService::new(db).delete_status(id).await?;
    Ok(ApiResponse::ok("Status deleted"))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/categories",
    security(("jwt_token" = [])),
    request_body = CreateCategoryRequest,
    responses(
        (status = 200, description = "Category created", body = CategoryResponse),
        (status = 403, description = "Admin only", body = AppError),
        (status = 409, description = "Duplicate name", body = AppError),
    ),
    tag = "catalog"
)]
pub async fn create_category(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Json(payload): Json<CreateCategoryRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(format!("Validation error: {e}")))?;

    require_admin(&db, &auth_user).await?;

    let category = CatalogService::new(db).create_category(&payload.name).await?;
    Ok(ApiResponse::ok(CategoryResponse::from(category)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/categories/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category deleted", body = String),
        (status = 403, description = "Admin only", body = AppError),
        (status = 404, description = "Unknown category", body = AppError),
    ),
    tag = "catalog"
)]
pub async fn delete_category(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    require_admin(&db, &auth_user).await?;

    CatalogService::new(db).delete_category(id).await?;
    Ok(ApiResponse::ok("Category deleted"))
}
