use crate::{
    error::AppError,
    models::{User, UserModel},
    utils::jwt::decode_jwt,
};
use axum::{extract::Request, http::HeaderMap, middleware::Next, response::Response, Extension};
use sea_orm::{DatabaseConnection, EntityTrait};

/// Extracted identity reference from the JWT access token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
}

/// JWT authentication middleware for the dashboard surface.
///
/// Verifies the bearer token, rejects refresh tokens and accounts that
/// have not yet accepted their invitation, and stores the identity
/// reference in request extensions.
pub async fn auth_middleware(
    Extension(db): Extension<DatabaseConnection>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(&headers).ok_or(AppError::Unauthorized)?;

    let claims = decode_jwt(&token).map_err(|_| AppError::Unauthorized)?;

    // Access routes must use access tokens (not refresh tokens).
    if !crate::utils::jwt::is_access_token(&claims) {
        return Err(AppError::Unauthorized);
    }

    let user_id: i32 = claims
        .sub
        .parse()
        .map_err(|_| AppError::Validation("Invalid user ID in token".to_string()))?;

    let user = User::find_by_id(user_id)
        .one(&db)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if user.invite_token.is_some() {
        return Err(AppError::PermissionDenied);
    }

    let auth_user = AuthUser {
        user_id: claims.sub,
    };
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())?;

    let token = auth_header.strip_prefix("Bearer ")?;
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Parse user_id from AuthUser string to i32
pub fn parse_user_id(auth_user: &AuthUser) -> crate::error::AppResult<i32> {
    auth_user
        .user_id
        .parse()
        .map_err(|_| AppError::Validation("Invalid user ID".to_string()))
}

/// Resolve the acting identity, requiring role admin or officer. Returns
/// the full model — lifecycle operations need the actor's display name
/// for audit text.
pub async fn require_officer(
    db: &DatabaseConnection,
    auth_user: &AuthUser,
) -> crate::error::AppResult<UserModel> {
    let user_id = parse_user_id(auth_user)?;
    let user = User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(AppError::Unauthorized)?;
    if user.role != "admin" && user.role != "officer" {
        return Err(AppError::PermissionDenied);
    }
    Ok(user)
}

/// Resolve the acting identity, requiring role admin.
pub async fn require_admin(
    db: &DatabaseConnection,
    auth_user: &AuthUser,
) -> crate::error::AppResult<UserModel> {
    let user = require_officer(db, auth_user).await?;
    if user.role != "admin" {
        return Err(AppError::PermissionDenied);
    }
    Ok(user)
}

/// Extractor for AuthUser from request extensions
use axum::extract::FromRequestParts;

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}
