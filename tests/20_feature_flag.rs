mod common;

use anyhow::Result;
use reqwest::StatusCode;

// This file's server runs with the protected API switched off; the kill
// switch must win over every other outcome, credentials or not.
const FLAG_OFF: &[(&str, &str)] = &[("SECURITY_PROTECTED_API_ENABLED", "false")];

#[tokio::test]
async fn disabled_feature_rejects_protected_routes() -> Result<()> {
    let server = common::ensure_server_with(FLAG_OFF).await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/auth/whoami", server.base_url))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "FEATURE_DISABLED");
    Ok(())
}

#[tokio::test]
async fn disabled_feature_wins_over_presented_credentials() -> Result<()> {
    let server = common::ensure_server_with(FLAG_OFF).await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/dashboard", server.base_url))
        .header("Authorization", "Bearer some.token.here")
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "FEATURE_DISABLED");
    Ok(())
}

#[tokio::test]
async fn public_routes_stay_reachable() -> Result<()> {
    let server = common::ensure_server_with(FLAG_OFF).await?;
    let client = reqwest::Client::new();

    let res = client.get(&server.base_url).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}
