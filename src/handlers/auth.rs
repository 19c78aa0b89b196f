use crate::error::{AppError, AppResult};
use crate::middleware::auth::parse_user_id;
use crate::middleware::AuthUser;
use crate::models::UserModel;
use crate::response::ApiResponse;
use crate::services::auth::AuthService;
use crate::services::user::UserService;
use axum::{response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// Account email
    #[validate(email)]
    pub email: String,
    /// Account password
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshTokenRequest {
    /// JWT refresh token
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AcceptInviteRequest {
    /// One-shot invitation token from the invite email
    pub token: String,
    /// Chosen password (min 8 characters)
    #[validate(length(min = 8))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    /// JWT access token
    pub token: String,
    /// JWT refresh token
    pub refresh_token: String,
    /// Identity ID
    pub user_id: i32,
    /// Display name
    pub name: String,
    /// Role (admin or officer)
    pub role: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// JWT access token
    pub token: String,
    /// JWT refresh token
    pub refresh_token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    /// Identity ID
    pub id: i32,
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// Avatar URL
    pub avatar_url: Option<String>,
    /// Role (admin or officer)
    pub role: String,
}

impl From<UserModel> for UserResponse {
    fn from(user: UserModel) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            avatar_url: user.avatar_url,
            role: user.role,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = AppError),
    ),
    tag = "auth"
)]
pub async fn login(
    Extension(db): Extension<DatabaseConnection>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(format!("Validation error: {e}")))?;

    let service = AuthService::new(db);
    let (user, access_token, refresh_token) =
        service.login(&payload.email, &payload.password).await?;

    Ok(ApiResponse::ok(AuthResponse {
        token: access_token,
        refresh_token,
        user_id: user.id,
        name: user.name,
        role: user.role,
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "Tokens rotated", body = TokenResponse),
        (status = 401, description = "Invalid refresh token", body = AppError),
    ),
    tag = "auth"
)]
pub async fn refresh_token(
    Extension(db): Extension<DatabaseConnection>,
    Json(payload): Json<RefreshTokenRequest>,
) -> AppResult<impl IntoResponse> {
    let claims =
        crate::utils::jwt::decode_jwt(&payload.refresh_token).map_err(|_| AppError::Unauthorized)?;

    if !crate::utils::jwt::is_refresh_token(&claims) {
        return Err(AppError::Unauthorized);
    }

    let user_id: i32 = claims.sub.parse().map_err(|_| AppError::Unauthorized)?;

    let service = AuthService::new(db);
    let (access_token, refresh_token) = service
        .rotate_refresh_token(user_id, &payload.refresh_token)
        .await?;

    Ok(ApiResponse::ok(TokenResponse {
        token: access_token,
        refresh_token,
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/accept-invite",
    request_body = AcceptInviteRequest,
    responses(
        (status = 200, description = "Account activated", body = UserResponse),
        (status = 400, description = "Invalid or expired invitation", body = AppError),
    ),
    tag = "auth"
)]
pub async fn accept_invite(
    Extension(db): Extension<DatabaseConnection>,
    Json(payload): Json<AcceptInviteRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(format!("Validation error: {e}")))?;

    let service = UserService::new(db);
    let user = service
        .accept_invite(&payload.token, &payload.password)
        .await?;

    Ok(ApiResponse::with_message(
        UserResponse::from(user),
        "Account activated. You can now log in.".to_string(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Current identity", body = UserResponse),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "auth"
)]
pub async fn get_current_user(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    let user_id = parse_user_id(&auth_user)?;

    let service = AuthService::new(db);
    let user = service.get_user_by_id(user_id).await?;

    Ok(ApiResponse::ok(UserResponse::from(user)))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordRequest {
    /// Current password
    pub current_password: String,
    /// New password (min 8 characters)
    #[validate(length(min = 8))]
    pub new_password: String,
}

#[utoipa::path(
    put,
    path = "/api/v1/auth/password",
    security(("jwt_token" = [])),
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = String),
        (status = 400, description = "Validation error", body = AppError),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "auth"
)]
pub async fn change_password(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(format!("Validation error: {e}")))?;

    let user_id = parse_user_id(&auth_user)?;

    let service = AuthService::new(db);
    service
        .change_password(user_id, &payload.current_password, &payload.new_password)
        .await?;

    Ok(ApiResponse::ok("Password changed successfully"))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LogoutRequest {
    /// Refresh token to revoke
    pub refresh_token: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    security(("jwt_token" = [])),
    request_body = LogoutRequest,
    responses(
        (status = 200, description = "Logged out", body = String),
    ),
    tag = "auth"
)]
pub async fn logout(
    Extension(db): Extension<DatabaseConnection>,
    _auth_user: AuthUser,
    Json(payload): Json<LogoutRequest>,
) -> AppResult<impl IntoResponse> {
    if let Some(refresh_token) = payload.refresh_token.as_deref() {
        let service = AuthService::new(db);
        service.revoke_refresh_token(refresh_token).await?;
    }
    Ok(ApiResponse::ok("Logged out"))
}
