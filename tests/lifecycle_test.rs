mod common;

use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use serde_json::Value;

async fn case_audit_entries(
    db: &sea_orm::DatabaseConnection,
    code: &str,
) -> Vec<ibx::models::AuditLogModel> {
    let case = ibx::models::Case::find()
        .filter(ibx::models::case::Column::PublicId.eq(code))
        .one(db)
        .await
        .unwrap()
        .unwrap();

    ibx::models::AuditLog::find()
        .filter(ibx::models::audit_log::Column::CaseId.eq(case.id))
        .order_by_asc(ibx::models::audit_log::Column::Id)
        .all(db)
        .await
        .unwrap()
}

#[tokio::test]
async fn assign_moves_new_case_to_in_progress_and_audits() {
    let app = common::spawn_app().await;
    let (_officer_id, token) = common::create_user(&app, "officer", "officer").await;
    let (assignee_id, _) = common::create_user(&app, "assignee", "officer").await;
    let code = common::submit_report(&app).await;

    let resp = app
        .client
        .put(app.url(&format!("/cases/{}/assign", code)))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "user_id": assignee_id }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["status"], "In Progress");

    let entries = case_audit_entries(&app.db, &code).await;
    assert_eq!(entries.len(), 1);
    assert!(entries[0].action.starts_with("assigned the case to "));
}

#[tokio::test]
async fn transfer_replaces_assignee_set() {
    let app = common::spawn_app().await;
    let (_id, token) = common::create_user(&app, "officer", "officer").await;
    let (first_id, _) = common::create_user(&app, "first", "officer").await;
    let (second_id, _) = common::create_user(&app, "second", "officer").await;
    let (third_id, _) = common::create_user(&app, "third", "officer").await;
    let code = common::submit_report(&app).await;

    app.client
        .put(app.url(&format!("/cases/{}/assign", code)))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "user_id": first_id }))
        .send()
        .await
        .unwrap();

    let resp = app
        .client
        .put(app.url(&format!("/cases/{}/transfer", code)))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "user_ids": [second_id, third_id] }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = app
        .client
        .get(app.url(&format!("/cases/{}", code)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let assignees: Vec<i64> = body["data"]["assignees"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_i64().unwrap())
        .collect();

    assert_eq!(assignees, vec![second_id as i64, third_id as i64]);
}

#[tokio::test]
async fn add_assignees_unions_without_duplicates() {
    let app = common::spawn_app().await;
    let (_id, token) = common::create_user(&app, "officer", "officer").await;
    let (first_id, _) = common::create_user(&app, "first", "officer").await;
    let (second_id, _) = common::create_user(&app, "second", "officer").await;
    let code = common::submit_report(&app).await;

    app.client
        .put(app.url(&format!("/cases/{}/assign", code)))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "user_id": first_id }))
        .send()
        .await
        .unwrap();

    // first_id is already assigned; the union must not duplicate it.
    let resp = app
        .client
        .put(app.url(&format!("/cases/{}/assignees", code)))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "user_ids": [first_id, second_id] }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = app
        .client
        .get(app.url(&format!("/cases/{}", code)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let assignees: Vec<i64> = body["data"]["assignees"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_i64().unwrap())
        .collect();

    assert_eq!(assignees, vec![first_id as i64, second_id as i64]);
}

#[tokio::test]
async fn change_status_accepts_intermediate_statuses() {
    let app = common::spawn_app().await;
    let (_id, token) = common::create_user(&app, "officer", "officer").await;
    let code = common::submit_report(&app).await;

    for name in ["In Progress", "Forwarded to Upper Management", "Dismissed"] {
        let id = common::status_id(&app.db, name).await;
        let resp = app
            .client
            .put(app.url(&format!("/cases/{}/status", code)))
            .bearer_auth(&token)
            .json(&serde_json::json!({ "status_definition_id": id }))
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 200, "selecting '{}' should succeed", name);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["data"]["status"], name);
    }
}

#[tokio::test]
async fn change_status_rejects_reserved_targets() {
    let app = common::spawn_app().await;
    let (_id, token) = common::create_user(&app, "officer", "officer").await;
    let code = common::submit_report(&app).await;

    for name in ["New", "Resolved", "Case Closed"] {
        let id = common::status_id(&app.db, name).await;
        let resp = app
            .client
            .put(app.url(&format!("/cases/{}/status", code)))
            .bearer_auth(&token)
            .json(&serde_json::json!({ "status_definition_id": id }))
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 422, "selecting '{}' must be rejected", name);
    }
}

#[tokio::test]
async fn change_severity_moves_in_both_directions() {
    let app = common::spawn_app().await;
    let (_id, token) = common::create_user(&app, "officer", "officer").await;
    let code = common::submit_report(&app).await;

    // Stub advisor classified High; lower it, then raise it.
    for severity in ["Low", "Critical"] {
        let resp = app
            .client
            .put(app.url(&format!("/cases/{}/severity", code)))
            .bearer_auth(&token)
            .json(&serde_json::json!({ "severity": severity }))
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["data"]["severity"], severity);
    }

    let resp = app
        .client
        .put(app.url(&format!("/cases/{}/severity", code)))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "severity": "Apocalyptic" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn close_appends_system_message_and_audit_entry() {
    let app = common::spawn_app().await;
    let (_id, token) = common::create_user(&app, "officer", "officer").await;
    let code = common::submit_report(&app).await;

    let resp = app
        .client
        .put(app.url(&format!("/cases/{}/close", code)))
        .bearer_auth(&token)
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["status"], "Resolved");

    let case = ibx::models::Case::find()
        .filter(ibx::models::case::Column::PublicId.eq(code.clone()))
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();

    let messages = ibx::models::CaseMessage::find()
        .filter(ibx::models::case_message::Column::CaseId.eq(case.id))
        .all(&app.db)
        .await
        .unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(
        messages[0].content,
        "Case closed with the following remarks: No remarks provided."
    );
    assert_eq!(messages[0].sender, "officer");
    assert!(messages[0].sender_user_id.is_some());

    let entries = case_audit_entries(&app.db, &code).await;
    assert_eq!(entries.len(), 1);
    assert_eq!(
        entries[0].action,
        "closed the case and marked it as \"Resolved\""
    );
}

#[tokio::test]
async fn close_with_remarks_embeds_them() {
    let app = common::spawn_app().await;
    let (_id, token) = common::create_user(&app, "officer", "officer").await;
    let code = common::submit_report(&app).await;

    app.client
        .put(app.url(&format!("/cases/{}/close", code)))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "remarks": "Hazard removed on 14 March." }))
        .send()
        .await
        .unwrap();

    let case = ibx::models::Case::find()
        .filter(ibx::models::case::Column::PublicId.eq(code))
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    let messages = ibx::models::CaseMessage::find()
        .filter(ibx::models::case_message::Column::CaseId.eq(case.id))
        .all(&app.db)
        .await
        .unwrap();

    assert_eq!(
        messages[0].content,
        "Case closed with the following remarks: Hazard removed on 14 March."
    );
}

#[tokio::test]
async fn resolved_case_rejects_every_mutation() {
    let app = common::spawn_app().await;
    let (_id, token) = common::create_user(&app, "officer", "officer").await;
    let (other_id, _) = common::create_user(&app, "other", "officer").await;
    let code = common::submit_report(&app).await;
    common::close_case(&app, &token, &code).await;

    let dismissed = common::status_id(&app.db, "Dismissed").await;

    let attempts = [
        ("assign", serde_json::json!({ "user_id": other_id })),
        ("transfer", serde_json::json!({ "user_ids": [other_id] })),
        ("assignees", serde_json::json!({ "user_ids": [other_id] })),
        (
            "status",
            serde_json::json!({ "status_definition_id": dismissed }),
        ),
        ("severity", serde_json::json!({ "severity": "Low" })),
        ("close", serde_json::json!({})),
    ];

    for (path, payload) in attempts {
        let resp = app
            .client
            .put(app.url(&format!("/cases/{}/{}", code, path)))
            .bearer_auth(&token)
            .json(&payload)
            .send()
            .await
            .unwrap();

        assert_eq!(
            resp.status(),
            409,
            "mutation '{}' must fail on a resolved case",
            path
        );
    }

    // Officer messaging is shut too
    let resp = app
        .client
        .post(app.url(&format!("/cases/{}/messages", code)))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "content": "still there?" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);

    // And the reporter side
    let resp = app
        .client
        .post(app.url(&format!("/track/{}/messages", code)))
        .json(&serde_json::json!({ "content": "any update?" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);
}

#[tokio::test]
async fn closing_twice_appends_nothing_new() {
    let app = common::spawn_app().await;
    let (_id, token) = common::create_user(&app, "officer", "officer").await;
    let code = common::submit_report(&app).await;
    common::close_case(&app, &token, &code).await;

    let resp = app
        .client
        .put(app.url(&format!("/cases/{}/close", code)))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "remarks": "double close" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);

    let case = ibx::models::Case::find()
        .filter(ibx::models::case::Column::PublicId.eq(code.clone()))
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();

    let message_count = ibx::models::CaseMessage::find()
        .filter(ibx::models::case_message::Column::CaseId.eq(case.id))
        .count(&app.db)
        .await
        .unwrap();
    assert_eq!(message_count, 1, "no duplicate closing message");

    let entries = case_audit_entries(&app.db, &code).await;
    assert_eq!(entries.len(), 1, "no duplicate audit entry");
}

#[tokio::test]
async fn every_successful_operation_appends_exactly_one_audit_entry() {
    let app = common::spawn_app().await;
    let (_id, token) = common::create_user(&app, "officer", "officer").await;
    let (first_id, _) = common::create_user(&app, "first", "officer").await;
    let (second_id, _) = common::create_user(&app, "second", "officer").await;
    let code = common::submit_report(&app).await;

    let dismissed = common::status_id(&app.db, "Dismissed").await;

    let operations = [
        ("assign", serde_json::json!({ "user_id": first_id })),
        ("transfer", serde_json::json!({ "user_ids": [second_id] })),
        ("assignees", serde_json::json!({ "user_ids": [first_id] })),
        (
            "status",
            serde_json::json!({ "status_definition_id": dismissed }),
        ),
        ("severity", serde_json::json!({ "severity": "Medium" })),
        ("close", serde_json::json!({})),
    ];

    for (i, (path, payload)) in operations.iter().enumerate() {
        let resp = app
            .client
            .put(app.url(&format!("/cases/{}/{}", code, path)))
            .bearer_auth(&token)
            .json(payload)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200, "operation '{}' failed", path);

        let entries = case_audit_entries(&app.db, &code).await;
        assert_eq!(entries.len(), i + 1);
        assert!(!entries[i].action.is_empty());
    }
}

#[tokio::test]
async fn lifecycle_requires_authentication() {
    let app = common::spawn_app().await;
    let code = common::submit_report(&app).await;

    let resp = app
        .client
        .put(app.url(&format!("/cases/{}/severity", code)))
        .json(&serde_json::json!({ "severity": "Low" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn unknown_assignee_is_not_found() {
    let app = common::spawn_app().await;
    let (_id, token) = common::create_user(&app, "officer", "officer").await;
    let code = common::submit_report(&app).await;

    let resp = app
        .client
        .put(app.url(&format!("/cases/{}/assign", code)))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "user_id": 999999 }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 404);
}
