mod common;

use sea_orm::{ActiveModelTrait, EntityTrait, IntoActiveModel};
use serde_json::Value;

async fn submit_confidential(app: &common::TestApp) -> String {
    let resp = app
        .client
        .post(app.url("/reports"))
        .json(&serde_json::json!({
            "title": "Payroll irregularities",
            "category": "Financial",
            "content": "Several contractor invoices were paid twice over the last quarter.",
            "submission_type": "confidential",
            "reporter_name": "Jordan Vale",
            "reporter_email": "jordan@example.com",
        }))
        .send()
        .await
        .unwrap();

    let body: Value = resp.json().await.unwrap();
    body["data"]["report_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn issued_link_resolves_to_redacted_view() {
    let app = common::spawn_app().await;
    let (_id, token) = common::create_user(&app, "officer", "officer").await;
    let code = submit_confidential(&app).await;

    let resp = app
        .client
        .post(app.url(&format!("/cases/{}/share", code)))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "ttl_days": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();

    let share_token = body["data"]["token"].as_str().unwrap().to_string();
    assert!(share_token.len() >= 16);
    assert!(share_token.chars().all(|c| c.is_ascii_alphanumeric()));
    assert!(body["data"]["url"].as_str().unwrap().contains(&share_token));

    // Anyone holding the link can read the redacted view, no auth needed.
    let resp = app
        .client
        .get(app.url(&format!("/share/{}", share_token)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();

    assert_eq!(body["data"]["report_id"], code);
    assert_eq!(body["data"]["title"], "Payroll irregularities");
    // Reporter contact has no representation in the share view, even for
    // a confidential case.
    assert!(body["data"].get("reporter_name").is_none());
    assert!(body["data"].get("reporter_email").is_none());
}

#[tokio::test]
async fn expired_link_is_gone() {
    let app = common::spawn_app().await;
    let (_id, token) = common::create_user(&app, "officer", "officer").await;
    let code = submit_confidential(&app).await;

    let resp = app
        .client
        .post(app.url(&format!("/cases/{}/share", code)))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "ttl_days": 1 }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let share_token = body["data"]["token"].as_str().unwrap().to_string();

    // Rewind expiry two hours past due, as if 25h of a 24h link elapsed.
    let row = ibx::models::ShareToken::find_by_id(share_token.clone())
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    let mut active = row.into_active_model();
    active.expires_at = sea_orm::ActiveValue::Set(
        chrono::Utc::now().naive_utc() - chrono::Duration::hours(2),
    );
    active.update(&app.db).await.unwrap();

    let resp = app
        .client
        .get(app.url(&format!("/share/{}", share_token)))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 410);
}

#[tokio::test]
async fn unknown_token_is_invalid_link() {
    let app = common::spawn_app().await;

    let resp = app
        .client
        .get(app.url("/share/NotARealTokenAtAll123"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn unsupported_ttl_rejected() {
    let app = common::spawn_app().await;
    let (_id, token) = common::create_user(&app, "officer", "officer").await;
    let code = submit_confidential(&app).await;

    for ttl in [0, 2, 365, -1] {
        let resp = app
            .client
            .post(app.url(&format!("/cases/{}/share", code)))
            .bearer_auth(&token)
            .json(&serde_json::json!({ "ttl_days": ttl }))
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 400, "ttl {} must be rejected", ttl);
    }
}

#[tokio::test]
async fn issuing_requires_officer_role() {
    let app = common::spawn_app().await;
    let code = submit_confidential(&app).await;

    let resp = app
        .client
        .post(app.url(&format!("/cases/{}/share", code)))
        .json(&serde_json::json!({ "ttl_days": 7 }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn tokens_are_unique_per_issue() {
    let app = common::spawn_app().await;
    let (_id, token) = common::create_user(&app, "officer", "officer").await;
    let code = submit_confidential(&app).await;

    let mut seen = std::collections::HashSet::new();
    for _ in 0..3 {
        let resp = app
            .client
            .post(app.url(&format!("/cases/{}/share", code)))
            .bearer_auth(&token)
            .json(&serde_json::json!({ "ttl_days": 7 }))
            .send()
            .await
            .unwrap();
        let body: Value = resp.json().await.unwrap();
        let t = body["data"]["token"].as_str().unwrap().to_string();
        assert!(seen.insert(t), "share tokens must not repeat");
    }

    let count = ibx::models::ShareToken::find()
        .all(&app.db)
        .await
        .unwrap()
        .len();
    assert_eq!(count, 3);
}
