mod common;

use serde_json::Value;

#[tokio::test]
async fn audit_listing_is_admin_only() {
    let app = common::spawn_app().await;
    let (_id, officer_token) = common::create_user(&app, "officer", "officer").await;

    let resp = app
        .client
        .get(app.url("/admin/audit"))
        .bearer_auth(&officer_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    let resp = app.client.get(app.url("/admin/audit")).send().await.unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn history_is_newest_first_and_survives_case_deletion() {
    let app = common::spawn_app().await;
    let (_admin_id, admin_token) = common::create_user(&app, "admin", "admin").await;
    let (officer_id, _) = common::create_user(&app, "officer", "officer").await;
    let code = common::submit_report(&app).await;

    app.client
        .put(app.url(&format!("/cases/{}/assign", code)))
        .bearer_auth(&admin_token)
        .json(&serde_json::json!({ "user_id": officer_id }))
        .send()
        .await
        .unwrap();

    app.client
        .put(app.url(&format!("/cases/{}/severity", code)))
        .bearer_auth(&admin_token)
        .json(&serde_json::json!({ "severity": "Critical" }))
        .send()
        .await
        .unwrap();

    let resp = app
        .client
        .get(app.url("/admin/audit"))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    // Newest first: the severity change precedes the assignment.
    assert!(items[0]["action"]
        .as_str()
        .unwrap()
        .starts_with("changed severity"));
    assert!(items[1]["action"]
        .as_str()
        .unwrap()
        .starts_with("assigned the case"));

    // Deleting the case nulls the reference but keeps the history, and
    // records the deletion itself.
    let resp = app
        .client
        .delete(app.url(&format!("/admin/cases/{}", code)))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = app
        .client
        .get(app.url("/admin/audit"))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert!(items[0]["action"].as_str().unwrap().starts_with("deleted case"));
    assert!(items[0]["case_id"].is_null());
    assert!(items[1]["case_id"].is_null());
    assert!(items[2]["case_id"].is_null());
}

#[tokio::test]
async fn case_deletion_is_admin_only_and_cascades() {
    let app = common::spawn_app().await;
    let (_admin_id, admin_token) = common::create_user(&app, "admin", "admin").await;
    let (_officer_id, officer_token) = common::create_user(&app, "officer", "officer").await;
    let code = common::submit_report(&app).await;

    // Give the case a message so the cascade has something to clear.
    app.client
        .post(app.url(&format!("/track/{}/messages", code)))
        .json(&serde_json::json!({ "content": "extra context about the incident" }))
        .send()
        .await
        .unwrap();

    let resp = app
        .client
        .delete(app.url(&format!("/admin/cases/{}", code)))
        .bearer_auth(&officer_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    let resp = app
        .client
        .delete(app.url(&format!("/admin/cases/{}", code)))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = app
        .client
        .get(app.url(&format!("/track/{}", code)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    use sea_orm::{EntityTrait, PaginatorTrait};
    let message_count = ibx::models::CaseMessage::find()
        .count(&app.db)
        .await
        .unwrap();
    assert_eq!(message_count, 0);
}
