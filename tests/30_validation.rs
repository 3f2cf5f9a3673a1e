mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn comment_with_empty_content_is_rejected() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!(
            "{}/api/projects/00000000-0000-0000-0000-000000000000/comments",
            server.base_url
        ))
        .json(&json!({ "visitor_name": "Sam", "content": "  " }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["error_code"], "VALIDATION_ERROR");
    assert!(body["details"].get("content").is_some());
    Ok(())
}

#[tokio::test]
async fn contact_message_with_bad_email_is_rejected() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!(
            "{}/api/contact/00000000-0000-0000-0000-000000000000",
            server.base_url
        ))
        .json(&json!({ "visitor_email": "nope", "message": "hello" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["error_code"], "VALIDATION_ERROR");
    Ok(())
}

#[tokio::test]
async fn malformed_json_body_gets_the_error_envelope() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/auth/login", server.base_url))
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["error_code"], "VALIDATION_ERROR");
    Ok(())
}
