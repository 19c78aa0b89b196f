use crate::config::rate_limit::{RateLimitConfig, RateLimitRule};
use crate::handlers;
use crate::middleware::auth::auth_middleware;
use crate::websocket;
use axum::{middleware, routing, Router};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

pub fn create_routes() -> Router {
    Router::new()
        .nest("/api/v1", api_routes())
        // Case event stream (reporter by code, officer via query token)
        .route(
            "/ws/cases/{code}",
            routing::get(websocket::case_stream::ws_handler),
        )
}

fn api_routes() -> Router {
    let rate_limit_config = RateLimitConfig::from_env();

    let intake = intake_routes(&rate_limit_config);
    let public_read = public_read_routes(&rate_limit_config);
    let protected =
        protected_routes(&rate_limit_config).layer(middleware::from_fn(auth_middleware));

    intake.merge(public_read).merge(protected)
}

/// Intake routes: anonymous writes, throttled hardest.
fn intake_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        .route("/reports", routing::post(handlers::intake::submit_report))
        .route(
            "/track/{code}/messages",
            routing::post(handlers::intake::post_reporter_message),
        )
        .route(
            "/track/{code}/attachments",
            routing::post(handlers::intake::upload_reporter_attachment),
        )
        .route(
            "/auth/accept-invite",
            routing::post(handlers::auth::accept_invite),
        )
        .route("/auth/login", routing::post(handlers::auth::login))
        .route("/auth/refresh", routing::post(handlers::auth::refresh_token));

    with_optional_rate_limit(router, config.enabled, config.intake)
}

/// Public reads: tracking view, share links, category catalog.
fn public_read_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        .route("/track/{code}", routing::get(handlers::intake::track_case))
        .route(
            "/share/{token}",
            routing::get(handlers::share::resolve_share_link),
        )
        .route(
            "/categories",
            routing::get(handlers::catalog::list_categories),
        );

    with_optional_rate_limit(router, config.enabled, config.public_read)
}

/// Protected routes: authenticated dashboard reads and writes. Role
/// checks (officer vs admin) happen in the handlers.
fn protected_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        // Auth
        .route("/auth/me", routing::get(handlers::auth::get_current_user))
        .route("/auth/logout", routing::post(handlers::auth::logout))
        .route("/auth/password", routing::put(handlers::auth::change_password))
        // Cases
        .route("/cases", routing::get(handlers::case::list_cases))
        .route("/cases/{code}", routing::get(handlers::case::get_case))
        // Lifecycle
        .route(
            "/cases/{code}/assign",
            routing::put(handlers::lifecycle::assign_case),
        )
        .route(
            "/cases/{code}/transfer",
            routing::put(handlers::lifecycle::transfer_case),
        )
        .route(
            "/cases/{code}/assignees",
            routing::put(handlers::lifecycle::add_assignees),
        )
        .route(
            "/cases/{code}/status",
            routing::put(handlers::lifecycle::change_status),
        )
        .route(
            "/cases/{code}/severity",
            routing::put(handlers::lifecycle::change_severity),
        )
        .route(
            "/cases/{code}/close",
            routing::put(handlers::lifecycle::close_case),
        )
        // Messages
        .route(
            "/cases/{code}/messages",
            routing::get(handlers::message::list_messages)
                .post(handlers::message::post_officer_message),
        )
        // Attachments
        .route(
            "/cases/{code}/attachments",
            routing::get(handlers::attachment::list_attachments)
                .post(handlers::attachment::upload_attachment),
        )
        // Share links
        .route(
            "/cases/{code}/share",
            routing::post(handlers::share::issue_share_link),
        )
        // Catalog
        .route("/statuses", routing::get(handlers::catalog::list_statuses))
        // Admin
        .route(
            "/admin/archive",
            routing::get(handlers::case::list_archive),
        )
        .route(
            "/admin/cases/{code}",
            routing::delete(handlers::case::delete_case),
        )
        .route("/admin/audit", routing::get(handlers::audit::list_audit_log))
        .route(
            "/admin/users",
            routing::get(handlers::user::list_users).post(handlers::user::invite_user),
        )
        .route(
            "/admin/users/{id}",
            routing::put(handlers::user::update_user).delete(handlers::user::delete_user),
        )
        .route(
            "/admin/statuses",
            routing::post(handlers::catalog::create_status),
        )
        .route(
            "/admin/statuses/{id}",
            routing::put(handlers::catalog::update_status)
                .delete(handlers::catalog::delete_status),
        )
        .route(
            "/admin/categories",
            routing::post(handlers::catalog::create_category),
        )
        .route(
            "/admin/categories/{id}",
            routing::delete(handlers::catalog::delete_category),
        );

    with_optional_rate_limit(router, config.enabled, config.protected)
}

fn with_optional_rate_limit(router: Router, enabled: bool, rule: RateLimitRule) -> Router {
    if !enabled {
        return router;
    }

    let governor_conf = GovernorConfigBuilder::default()
        .per_second(rule.per_second)
        .burst_size(rule.burst_size)
        .finish()
        .expect("Invalid rate limit configuration");

    router.layer(GovernorLayer::new(governor_conf))
}
