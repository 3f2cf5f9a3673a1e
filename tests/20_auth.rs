mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn register_rejects_invalid_payload_before_any_store_access() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/auth/register", server.base_url))
        .json(&json!({ "email": "not-an-email", "password_hash": "", "name": "" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["error_code"], "VALIDATION_ERROR");
    assert!(
        body["details"].get("email").is_some(),
        "expected an email field error: {}",
        body
    );
    assert!(body.get("timestamp").is_some());
    Ok(())
}

#[tokio::test]
async fn login_requires_both_fields() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/auth/login", server.base_url))
        .json(&json!({ "email": "a@x.com" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["error_code"], "VALIDATION_ERROR");
    Ok(())
}

#[tokio::test]
async fn protected_route_without_token_is_401() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .patch(format!(
            "{}/api/users/00000000-0000-0000-0000-000000000000",
            server.base_url
        ))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["error_code"], "CREDENTIAL_MISSING");
    Ok(())
}

#[tokio::test]
async fn garbage_token_is_403() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!(
            "{}/api/analytics/00000000-0000-0000-0000-000000000000",
            server.base_url
        ))
        .header("Authorization", "Bearer not.a.jwt")
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["error_code"], "CREDENTIAL_INVALID");
    Ok(())
}

#[tokio::test]
async fn non_bearer_authorization_is_403() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .delete(format!(
            "{}/api/projects/00000000-0000-0000-0000-000000000000",
            server.base_url
        ))
        .header("Authorization", "Basic dXNlcjpwYXNz")
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["error_code"], "CREDENTIAL_INVALID");
    Ok(())
}
