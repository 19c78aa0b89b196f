mod common;

use serde_json::Value;

const PNG_BYTES: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D,
];

fn png_form(file_name: &str) -> reqwest::multipart::Form {
    let part = reqwest::multipart::Part::bytes(PNG_BYTES.to_vec())
        .file_name(file_name.to_string())
        .mime_str("image/png")
        .unwrap();
    reqwest::multipart::Form::new().part("file", part)
}

#[tokio::test]
async fn officer_uploads_and_lists_evidence() {
    let app = common::spawn_app().await;
    let (_id, token) = common::create_user(&app, "officer", "officer").await;
    let code = common::submit_report(&app).await;

    let resp = app
        .client
        .post(app.url(&format!("/cases/{}/attachments", code)))
        .bearer_auth(&token)
        .multipart(png_form("site-photo.png"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["file_name"], "site-photo.png");
    assert_eq!(body["data"]["file_type"], "image/png");
    assert!(body["data"]["url"]
        .as_str()
        .unwrap()
        .starts_with("/uploads/cases/"));
    assert!(body["data"]["uploaded_by"].as_str().unwrap().len() > 0);

    let resp = app
        .client
        .get(app.url(&format!("/cases/{}/attachments", code)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn reporter_uploads_via_tracking_code() {
    let app = common::spawn_app().await;
    let code = common::submit_report(&app).await;

    let resp = app
        .client
        .post(app.url(&format!("/track/{}/attachments", code)))
        .multipart(png_form("evidence.png"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["uploaded_by"], "Reporter");
}

#[tokio::test]
async fn mismatched_content_is_rejected() {
    let app = common::spawn_app().await;
    let code = common::submit_report(&app).await;

    // PNG bytes declared as JPEG
    let part = reqwest::multipart::Part::bytes(PNG_BYTES.to_vec())
        .file_name("fake.jpg")
        .mime_str("image/jpeg")
        .unwrap();
    let form = reqwest::multipart::Form::new().part("file", part);

    let resp = app
        .client
        .post(app.url(&format!("/track/{}/attachments", code)))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn unsupported_type_is_rejected() {
    let app = common::spawn_app().await;
    let code = common::submit_report(&app).await;

    let part = reqwest::multipart::Part::bytes(b"#!/bin/sh\necho hi\n".to_vec())
        .file_name("script.sh")
        .mime_str("application/x-sh")
        .unwrap();
    let form = reqwest::multipart::Form::new().part("file", part);

    let resp = app
        .client
        .post(app.url(&format!("/track/{}/attachments", code)))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn resolved_case_accepts_no_new_evidence() {
    let app = common::spawn_app().await;
    let (_id, token) = common::create_user(&app, "officer", "officer").await;
    let code = common::submit_report(&app).await;
    common::close_case(&app, &token, &code).await;

    let resp = app
        .client
        .post(app.url(&format!("/track/{}/attachments", code)))
        .multipart(png_form("late.png"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 409);
}
