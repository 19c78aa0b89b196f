mod common;

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde_json::Value;

#[tokio::test]
async fn invite_and_accept_flow_activates_account() {
    let app = common::spawn_app().await;
    let (_admin_id, admin_token) = common::create_user(&app, "admin", "admin").await;

    let resp = app
        .client
        .post(app.url("/admin/users"))
        .bearer_auth(&admin_token)
        .json(&serde_json::json!({
            "name": "Riley Chen",
            "email": "riley@test.com",
            "role": "officer",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let invited_id = body["data"]["id"].as_i64().unwrap() as i32;

    // Login is blocked until the invitation is accepted.
    let resp = app
        .client
        .post(app.url("/auth/login"))
        .json(&serde_json::json!({
            "email": "riley@test.com",
            "password": "whatever_password",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    // Fetch the invite token the email would have carried.
    let invited = ibx::models::User::find_by_id(invited_id)
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    let invite_token = invited.invite_token.expect("invite token must be stored");

    let resp = app
        .client
        .post(app.url("/auth/accept-invite"))
        .json(&serde_json::json!({
            "token": invite_token,
            "password": "chosen_password_9",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = app
        .client
        .post(app.url("/auth/login"))
        .json(&serde_json::json!({
            "email": "riley@test.com",
            "password": "chosen_password_9",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["role"], "officer");
}

#[tokio::test]
async fn invite_requires_admin() {
    let app = common::spawn_app().await;
    let (_id, officer_token) = common::create_user(&app, "officer", "officer").await;

    let resp = app
        .client
        .post(app.url("/admin/users"))
        .bearer_auth(&officer_token)
        .json(&serde_json::json!({
            "name": "Riley Chen",
            "email": "riley2@test.com",
            "role": "officer",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 403);
}

#[tokio::test]
async fn invite_rejects_unknown_role_and_duplicate_email() {
    let app = common::spawn_app().await;
    let (_admin_id, admin_token) = common::create_user(&app, "admin", "admin").await;

    let resp = app
        .client
        .post(app.url("/admin/users"))
        .bearer_auth(&admin_token)
        .json(&serde_json::json!({
            "name": "Riley Chen",
            "email": "riley3@test.com",
            "role": "superuser",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    app.client
        .post(app.url("/admin/users"))
        .bearer_auth(&admin_token)
        .json(&serde_json::json!({
            "name": "Riley Chen",
            "email": "riley3@test.com",
            "role": "officer",
        }))
        .send()
        .await
        .unwrap();

    let resp = app
        .client
        .post(app.url("/admin/users"))
        .bearer_auth(&admin_token)
        .json(&serde_json::json!({
            "name": "Riley Again",
            "email": "riley3@test.com",
            "role": "officer",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = common::spawn_app().await;
    let (_id, _token) = common::create_user(&app, "officer", "officer").await;

    let user = ibx::models::User::find()
        .filter(ibx::models::user::Column::Role.eq("officer"))
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();

    let resp = app
        .client
        .post(app.url("/auth/login"))
        .json(&serde_json::json!({
            "email": user.email,
            "password": "not_the_password",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn refresh_rotation_issues_new_tokens() {
    let app = common::spawn_app().await;
    let (_id, _token) = common::create_user(&app, "officer", "officer").await;

    let user = ibx::models::User::find()
        .filter(ibx::models::user::Column::Role.eq("officer"))
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();

    let resp = app
        .client
        .post(app.url("/auth/login"))
        .json(&serde_json::json!({
            "email": user.email,
            "password": "test_password_123",
        }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let refresh = body["data"]["refresh_token"].as_str().unwrap().to_string();

    let resp = app
        .client
        .post(app.url("/auth/refresh"))
        .json(&serde_json::json!({ "refresh_token": refresh }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // The rotated-out token is dead.
    let resp = app
        .client
        .post(app.url("/auth/refresh"))
        .json(&serde_json::json!({ "refresh_token": refresh }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn admin_cannot_delete_own_account() {
    let app = common::spawn_app().await;
    let (admin_id, admin_token) = common::create_user(&app, "admin", "admin").await;

    let resp = app
        .client
        .delete(app.url(&format!("/admin/users/{}", admin_id)))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn admin_updates_role_and_deletes_user() {
    let app = common::spawn_app().await;
    let (_admin_id, admin_token) = common::create_user(&app, "admin", "admin").await;
    let (officer_id, _officer_token) = common::create_user(&app, "officer", "officer").await;

    let resp = app
        .client
        .put(app.url(&format!("/admin/users/{}", officer_id)))
        .bearer_auth(&admin_token)
        .json(&serde_json::json!({ "role": "admin" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["role"], "admin");

    let resp = app
        .client
        .delete(app.url(&format!("/admin/users/{}", officer_id)))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let gone = ibx::models::User::find_by_id(officer_id)
        .one(&app.db)
        .await
        .unwrap();
    assert!(gone.is_none());
}

#[tokio::test]
async fn me_returns_current_identity() {
    let app = common::spawn_app().await;
    let (user_id, token) = common::create_user(&app, "officer", "officer").await;

    let resp = app
        .client
        .get(app.url("/auth/me"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["id"].as_i64().unwrap() as i32, user_id);
    assert_eq!(body["data"]["role"], "officer");
}
