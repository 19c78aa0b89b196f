#![allow(dead_code)]

use ibx::config::advisor::AdvisorConfig;
use ibx::services::advisor::AdvisorClient;
use reqwest::Client;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, Statement};
use sea_orm_migration::MigratorTrait;
use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Once,
};

static INIT: Once = Once::new();
static MIGRATIONS_RAN: AtomicBool = AtomicBool::new(false);
static USER_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn init_env() {
    INIT.call_once(|| {
        dotenv::dotenv().ok();
        std::env::set_var(
            "JWT_SECRET",
            "integration_test_secret_that_is_at_least_32_characters_long",
        );
        std::env::set_var("RATE_LIMIT_ENABLED", "false");
        let config = ibx::config::jwt::JwtConfig::from_env().unwrap();
        let _ = ibx::utils::jwt::init_jwt_config(config);
    });
}

pub struct TestApp {
    pub addr: String,
    pub db: DatabaseConnection,
    pub client: Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.addr, path)
    }
}

/// Spawn the app against a stub advisory service that classifies
/// everything as High severity.
pub async fn spawn_app() -> TestApp {
    let advisor_url = spawn_advisor_stub(false).await;
    spawn_app_with_advisor(&advisor_url).await
}

/// Spawn the app against a stub advisory service whose classify endpoint
/// always fails.
pub async fn spawn_app_with_failing_advisor() -> TestApp {
    let advisor_url = spawn_advisor_stub(true).await;
    spawn_app_with_advisor(&advisor_url).await
}

async fn spawn_app_with_advisor(advisor_url: &str) -> TestApp {
    init_env();

    let database_url = std::env::var("TEST_DATABASE_URL")
        .unwrap_or_else(|_| std::env::var("DATABASE_URL").expect("DATABASE_URL must be set"));

    let db = sea_orm::Database::connect(&database_url)
        .await
        .expect("Failed to connect to test database");

    // Run migrations only once globally (using atomic bool for thread safety)
    if !MIGRATIONS_RAN.swap(true, Ordering::SeqCst) {
        ibx::migration::Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");
    }

    // Clean data tables (reverse dependency order), then re-seed catalogs
    cleanup_tables(&db).await;
    ibx::services::bootstrap::seed_catalogs(&db)
        .await
        .expect("Failed to seed catalogs");

    let hub = ibx::websocket::hub::CaseStreamHub::new();
    let advisor = AdvisorClient::new(AdvisorConfig {
        base_url: advisor_url.trim_end_matches('/').to_string(),
        api_key: None,
        model: "ibx-triage-test".to_string(),
        timeout_seconds: 5,
    });
    let upload_config = ibx::services::attachment::UploadConfig {
        upload_dir: "./test_uploads".to_string(),
    };
    let email_service = ibx::services::email::EmailService::from_env();

    let app = axum::Router::new()
        .route("/", axum::routing::get(|| async { "ok" }))
        .merge(ibx::routes::create_routes())
        .layer(axum::middleware::from_fn(
            ibx::middleware::security::security_headers_middleware,
        ))
        .layer(axum::extract::Extension(db.clone()))
        .layer(axum::extract::Extension(hub))
        .layer(axum::extract::Extension(advisor))
        .layer(axum::extract::Extension(upload_config))
        .layer(axum::extract::Extension(email_service));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    TestApp {
        addr: format!("http://{}", addr),
        db,
        client: Client::new(),
    }
}

/// Stand-in for the hosted advisory service. `failing` makes the
/// classification endpoint return 500 so the all-or-nothing submission
/// path can be exercised.
async fn spawn_advisor_stub(failing: bool) -> String {
    use axum::response::IntoResponse;
    use axum::{routing::post, Json, Router};

    let classify = if failing {
        post(|| async {
            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                "model overloaded",
            )
                .into_response()
        })
    } else {
        post(|| async {
            Json(serde_json::json!({
                "severity_level": "High",
                "reasoning": "Report describes an immediate physical hazard."
            }))
            .into_response()
        })
    };

    let app = Router::new()
        .route("/v1/classify", classify)
        .route(
            "/v1/summarize",
            post(|| async {
                Json(serde_json::json!({
                    "summary": "Scaffolding on site B is unsafe.",
                    "risk_assessment": "Serious injury risk if unaddressed."
                }))
            }),
        )
        .route(
            "/v1/suggest-steps",
            post(|| async {
                Json(serde_json::json!({
                    "steps": ["Interview foreman"],
                    "reasoning": "Start with the on-site supervisor."
                }))
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind advisor stub port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

async fn cleanup_tables(db: &DatabaseConnection) {
    let tables = [
        "refresh_tokens",
        "share_tokens",
        "audit_log",
        "attachments",
        "case_messages",
        "case_assignees",
        "cases",
        "users",
        "status_definitions",
        "categories",
    ];

    for table in tables {
        let sql = format!("TRUNCATE TABLE {} CASCADE", table);
        let _ = db
            .execute(Statement::from_string(
                sea_orm::DatabaseBackend::Postgres,
                sql,
            ))
            .await;
    }
}

/// Insert an active identity directly and log in through the API.
/// Returns (user_id, access_token).
pub async fn create_user(app: &TestApp, name_prefix: &str, role: &str) -> (i32, String) {
    let counter = USER_COUNTER.fetch_add(1, Ordering::SeqCst);
    let email = format!("{}_{}@test.com", name_prefix, counter);
    let password = "test_password_123";

    let now = chrono::Utc::now().naive_utc();
    let user = ibx::models::user::ActiveModel {
        name: sea_orm::ActiveValue::Set(format!("{} {}", name_prefix, counter)),
        email: sea_orm::ActiveValue::Set(email.clone()),
        password_hash: sea_orm::ActiveValue::Set(ibx::utils::hash_password(password).unwrap()),
        avatar_url: sea_orm::ActiveValue::Set(None),
        role: sea_orm::ActiveValue::Set(role.to_string()),
        invite_token: sea_orm::ActiveValue::Set(None),
        invite_expires: sea_orm::ActiveValue::Set(None),
        created_at: sea_orm::ActiveValue::Set(now),
        updated_at: sea_orm::ActiveValue::Set(now),
        ..Default::default()
    };
    let user = user.insert(&app.db).await.expect("Failed to insert user");

    let resp = app
        .client
        .post(app.url("/auth/login"))
        .json(&serde_json::json!({
            "email": email,
            "password": password,
        }))
        .send()
        .await
        .expect("Failed to log in");

    let status = resp.status();
    let body: serde_json::Value = resp.json().await.expect("Failed to parse login response");
    if !body["success"].as_bool().unwrap_or(false) {
        panic!("Login failed for '{}': status={}, body={}", email, status, body);
    }

    let token = body["data"]["token"]
        .as_str()
        .expect("Login response missing token")
        .to_string();
    (user.id, token)
}

/// Submit an anonymous Safety report through the API and return its
/// tracking code.
pub async fn submit_report(app: &TestApp) -> String {
    let resp = app
        .client
        .post(app.url("/reports"))
        .json(&serde_json::json!({
            "title": "Unsafe scaffolding on site B",
            "category": "Safety",
            "content": "The scaffolding on the east face of site B is missing cross-braces and sways in wind.",
            "submission_type": "anonymous",
        }))
        .send()
        .await
        .expect("Failed to submit report");

    let status = resp.status();
    let body: serde_json::Value = resp.json().await.expect("Failed to parse submit response");
    if !body["success"].as_bool().unwrap_or(false) {
        panic!("Submission failed: status={}, body={}", status, body);
    }

    body["data"]["report_id"]
        .as_str()
        .expect("Response missing report_id")
        .to_string()
}

/// Look up a status-definition id by name.
pub async fn status_id(db: &DatabaseConnection, name: &str) -> i32 {
    ibx::models::StatusDefinition::find()
        .filter(ibx::models::status_definition::Column::Name.eq(name))
        .one(db)
        .await
        .expect("Failed to query status definitions")
        .unwrap_or_else(|| panic!("Status '{}' not seeded", name))
        .id
}

/// Close a case through the API as the given actor.
pub async fn close_case(app: &TestApp, token: &str, code: &str) {
    let resp = app
        .client
        .put(app.url(&format!("/cases/{}/close", code)))
        .bearer_auth(token)
        .json(&serde_json::json!({ "remarks": "Investigation finished." }))
        .send()
        .await
        .expect("Failed to close case");
    assert_eq!(resp.status(), 200, "close_case helper expected success");
}
