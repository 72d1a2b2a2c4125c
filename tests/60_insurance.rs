mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn policies_require_name_and_type() -> Result<()> {
    let (status, body) = common::post("/api/insurance", &json!({ "policy_name": "Plant cover" })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);

    let created = common::create(
        "/api/insurance",
        &json!({ "policy_name": "Plant cover", "policy_type": "property", "premium": 1200 }),
    )
    .await?;
    let (status, body) = common::get(&format!("/api/insurance/{}", common::id_of(&created))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["policy_type"], "property");
    Ok(())
}

#[tokio::test]
async fn provider_scoped_listing_and_creation() -> Result<()> {
    let provider = common::unique("provider");

    let (status, _) = common::post(
        "/api/insurance/provider",
        &json!({ "policy_name": "Output guarantee", "policy_type": "performance" }),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = common::post(
        "/api/insurance/provider",
        &json!({ "providerId": provider, "policy_name": "Output guarantee", "policy_type": "performance" }),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);

    let (status, body) = common::get(&format!("/api/insurance/provider?providerId={}", provider)).await?;
    assert_eq!(status, StatusCode::OK);
    let policies = body["data"].as_array().expect("array");
    assert_eq!(policies.len(), 1);
    assert_eq!(policies[0]["providerId"], provider.as_str());

    let (status, _) = common::get("/api/insurance/provider").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn provider_cannot_delete_another_providers_policy() -> Result<()> {
    let owner = common::unique("provider");
    let policy = common::create(
        "/api/insurance/provider",
        &json!({ "providerId": owner, "policy_name": "Delay cover", "policy_type": "delay" }),
    )
    .await?;
    let id = common::id_of(&policy);

    let (status, _) = common::delete(&format!("/api/insurance/provider?providerId=intruder&id={}", id)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = common::delete(&format!("/api/insurance/provider?providerId={}&id={}", owner, id)).await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["$id"], id.as_str());

    let (status, _) = common::get(&format!("/api/insurance/{}", id)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}
