mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn health_reports_memory_store() -> Result<()> {
    let (status, body) = common::get("/health").await?;

    assert_eq!(status, StatusCode::OK, "unexpected health response: {}", body);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["store"], "memory");
    Ok(())
}

#[tokio::test]
async fn root_lists_collection_routes() -> Result<()> {
    let (status, body) = common::get("/").await?;

    assert_eq!(status, StatusCode::OK);
    let routes = body["data"]["endpoints"]["collections"]
        .as_array()
        .expect("collections should be an array");
    assert!(routes.iter().any(|r| r == "/api/company-profiles[/:id]"), "{}", body);
    assert!(routes.iter().any(|r| r == "/api/insurance[/:id]"), "{}", body);
    Ok(())
}

#[tokio::test]
async fn malformed_json_uses_the_error_envelope() -> Result<()> {
    let server = common::ensure_server().await?;
    let request = reqwest::Client::new()
        .post(server.url("/api/projects"))
        .header("content-type", "application/json")
        .body("{not json");
    let (status, body) = common::send(request).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string(), "{}", body);
    Ok(())
}
