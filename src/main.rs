mod config;
mod error;
mod handlers;
mod middleware;
mod migration;
mod models;
mod response;
mod routes;
mod services;
mod utils;
mod websocket;

use axum::{extract::Extension, response::IntoResponse, routing::get, Json, Router};
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use sea_orm_migration::MigratorTrait;
use serde_json::json;
use services::advisor::AdvisorClient;
use services::attachment::UploadConfig;
use std::env;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use websocket::hub::CaseStreamHub;

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check,
        // Intake routes
        crate::handlers::intake::submit_report,
        crate::handlers::intake::track_case,
        crate::handlers::intake::post_reporter_message,
        crate::handlers::intake::upload_reporter_attachment,
        // Auth routes
        crate::handlers::auth::login,
        crate::handlers::auth::refresh_token,
        crate::handlers::auth::accept_invite,
        crate::handlers::auth::get_current_user,
        crate::handlers::auth::change_password,
        crate::handlers::auth::logout,
        // Case routes
        crate::handlers::case::list_cases,
        crate::handlers::case::get_case,
        crate::handlers::case::list_archive,
        crate::handlers::case::delete_case,
        // Lifecycle routes
        crate::handlers::lifecycle::assign_case,
        crate::handlers::lifecycle::transfer_case,
        crate::handlers::lifecycle::add_assignees,
        crate::handlers::lifecycle::change_status,
        crate::handlers::lifecycle::change_severity,
        crate::handlers::lifecycle::close_case,
        // Message routes
        crate::handlers::message::list_messages,
        crate::handlers::message::post_officer_message,
        // Attachment routes
        crate::handlers::attachment::upload_attachment,
        crate::handlers::attachment::list_attachments,
        // Share routes
        crate::handlers::share::issue_share_link,
        crate::handlers::share::resolve_share_link,
        // Audit routes
        crate::handlers::audit::list_audit_log,
        // User routes
        crate::handlers::user::invite_user,
        crate::handlers::user::list_users,
        crate::handlers::user::update_user,
        crate::handlers::user::delete_user,
        // Catalog routes
        crate::handlers::catalog::list_statuses,
        crate::handlers::catalog::list_categories,
        crate::handlers::catalog::create_status,
        crate::handlers::catalog::update_status,
        crate::handlers::catalog::delete_status,
        crate::handlers::catalog::create_category,
        crate::handlers::catalog::delete_category,
    ),
    components(
        schemas(
            crate::response::ApiResponse<serde_json::Value>,
            crate::response::PaginatedResponse<serde_json::Value>,
            crate::response::PaginationQuery,
            crate::error::AppError,
            // Intake
            crate::handlers::intake::SubmitReportRequest,
            crate::handlers::intake::SubmitReportResponse,
            crate::handlers::intake::TrackedCaseResponse,
            crate::handlers::intake::TrackedMessageResponse,
            crate::handlers::intake::TrackedAttachmentResponse,
            crate::handlers::intake::ReporterMessageRequest,
            // Auth
            crate::handlers::auth::LoginRequest,
            crate::handlers::auth::RefreshTokenRequest,
            crate::handlers::auth::AcceptInviteRequest,
            crate::handlers::auth::AuthResponse,
            crate::handlers::auth::TokenResponse,
            crate::handlers::auth::UserResponse,
            crate::handlers::auth::ChangePasswordRequest,
            crate::handlers::auth::LogoutRequest,
            // Cases
            crate::handlers::case::CaseResponse,
            crate::handlers::case::CaseDetailResponse,
            crate::handlers::case::AssigneeResponse,
            crate::handlers::case::CaseListQuery,
            // Lifecycle
            crate::handlers::lifecycle::AssignCaseRequest,
            crate::handlers::lifecycle::TransferCaseRequest,
            crate::handlers::lifecycle::AddAssigneesRequest,
            crate::handlers::lifecycle::ChangeStatusRequest,
            crate::handlers::lifecycle::ChangeSeverityRequest,
            crate::handlers::lifecycle::CloseCaseRequest,
            // Messages
            crate::handlers::message::OfficerMessageRequest,
            // Share
            crate::handlers::share::IssueShareLinkRequest,
            crate::handlers::share::ShareLinkResponse,
            crate::handlers::share::SharedCaseResponse,
            // Audit
            crate::handlers::audit::AuditEntryResponse,
            // Users
            crate::handlers::user::InviteUserRequest,
            crate::handlers::user::UpdateUserRequest,
            // Catalog
            crate::handlers::catalog::StatusResponse,
            crate::handlers::catalog::CategoryResponse,
            crate::handlers::catalog::CreateStatusRequest,
            crate::handlers::catalog::UpdateStatusRequest,
            crate::handlers::catalog::CreateCategoryRequest,
        )
    ),
    tags(
        (name = "intake", description = "Public report submission and tracking"),
        (name = "auth", description = "Authentication operations"),
        (name = "cases", description = "Case dashboard operations"),
        (name = "lifecycle", description = "Case lifecycle transitions"),
        (name = "messages", description = "Case communication channel"),
        (name = "attachments", description = "Evidence uploads"),
        (name = "share", description = "Time-boxed share links"),
        (name = "audit", description = "Audit trail"),
        (name = "users", description = "Identity management"),
        (name = "catalog", description = "Status and category catalogs"),
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ibx=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Validate configuration before doing anything else
    let (jwt_config, advisor_config) = validate_config()?;

    // Initialize JWT config
    utils::jwt::init_jwt_config(jwt_config)?;

    tracing::info!("Starting IBX Report API v{}...", env!("CARGO_PKG_VERSION"));

    let db = config::database::get_database().await?;
    tracing::info!("Database connected successfully");

    migration::Migrator::up(&db, None).await?;
    tracing::info!("Database migrations applied successfully");

    services::bootstrap::seed_catalogs(&db).await?;
    services::bootstrap::ensure_bootstrap_admin(&db).await?;

    let hub = CaseStreamHub::new();
    let advisor = AdvisorClient::new(advisor_config);

    let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string());
    let upload_config = UploadConfig {
        upload_dir: upload_dir.clone(),
    };

    let email_service = services::email::EmailService::from_env();
    if email_service.is_configured() {
        tracing::info!("SMTP email service configured");
    } else {
        tracing::warn!("SMTP not configured, invitation emails will be skipped");
    }

    let app = create_app(&upload_dir)
        .layer(Extension(db))
        .layer(Extension(hub))
        .layer(Extension(advisor))
        .layer(Extension(upload_config))
        .layer(Extension(email_service));

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

/// Validate all required configuration at startup (fail-fast).
fn validate_config() -> anyhow::Result<(
    crate::config::jwt::JwtConfig,
    crate::config::advisor::AdvisorConfig,
)> {
    // JWT config — validated and cached
    let jwt_config = config::jwt::JwtConfig::from_env()?;

    // Advisory service — submissions cannot be accepted without it
    let advisor_config = config::advisor::AdvisorConfig::from_env()?;

    // DATABASE_URL — checked here for early error; actual connection happens later
    if env::var("DATABASE_URL").is_err() {
        return Err(anyhow::anyhow!(
            "DATABASE_URL environment variable must be set"
        ));
    }

    // Upload directory — create if needed
    let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string());
    std::fs::create_dir_all(&upload_dir).map_err(|e| {
        anyhow::anyhow!("Failed to create upload directory '{}': {}", upload_dir, e)
    })?;

    Ok((jwt_config, advisor_config))
}

fn build_cors_layer() -> CorsLayer {
    use axum::http::{header, HeaderValue, Method};

    let origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins_str == "*" {
        cors.allow_origin(tower_http::cors::Any)
    } else {
        let origins: Vec<HeaderValue> = origins_str
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

fn create_app(upload_dir: &str) -> Router {
    Router::new()
        .route("/", get(health_check))
        .merge(routes::create_routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest_service("/uploads", ServeDir::new(upload_dir))
        .layer(axum::middleware::from_fn(
            middleware::security::security_headers_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer())
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Health check successful", body = serde_json::Value)
    )
)]
async fn health_check(Extension(db): Extension<DatabaseConnection>) -> impl IntoResponse {
    let db_ok = db
        .query_one(Statement::from_string(
            sea_orm::DatabaseBackend::Postgres,
            "SELECT 1".to_string(),
        ))
        .await
        .is_ok();

    let status = if db_ok { "ok" } else { "degraded" };

    Json(json!({
        "status": status,
        "service": "IBX Report API",
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_ok,
    }))
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
    tracing::info!("Shutdown signal received, gracefully shutting down...");
}
