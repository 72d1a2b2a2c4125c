mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

fn subsidy(country: &str) -> Value {
    json!({
        "name": "Green Hydrogen Grant",
        "country": country,
        "programType": "grant",
        "status": "open",
        "incentiveDetails": { "type": "capex_grant", "amount": 2500000, "currency": "EUR" },
        "eligibility": { "sectors": ["industry", "mobility"] },
        "resourceLinks": [{ "title": "Guide", "url": "https://example.org/guide" }]
    })
}

#[tokio::test]
async fn nested_objects_round_trip_as_objects() -> Result<()> {
    let created = common::create("/api/subsidies", &subsidy("DE")).await?;
    assert_eq!(created["incentiveDetails"]["currency"], "EUR", "{}", created);

    let (status, body) = common::get(&format!("/api/subsidies/{}", common::id_of(&created))).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["incentiveDetails"].is_object(), "{}", body);
    assert_eq!(body["data"]["incentiveDetails"]["amount"], 2500000);
    assert_eq!(body["data"]["eligibility"]["sectors"][1], "mobility");
    assert!(body["data"]["resourceLinks"].is_array());
    Ok(())
}

#[tokio::test]
async fn stringified_nested_objects_are_accepted() -> Result<()> {
    let mut body = subsidy("FR");
    body["incentiveDetails"] = json!(r#"{"type":"tax_credit","amount":10,"currency":"EUR"}"#);
    let created = common::create("/api/subsidies", &body).await?;
    assert_eq!(created["incentiveDetails"]["type"], "tax_credit");
    Ok(())
}

#[tokio::test]
async fn incentive_details_fields_are_required() -> Result<()> {
    for missing in ["type", "amount", "currency"] {
        let mut body = subsidy("ES");
        body["incentiveDetails"]
            .as_object_mut()
            .expect("object")
            .remove(missing);
        let (status, res) = common::post("/api/subsidies", &body).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "missing {}: {}", missing, res);
    }

    let mut body = subsidy("ES");
    body.as_object_mut().expect("object").remove("incentiveDetails");
    let (status, _) = common::post("/api/subsidies", &body).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn catalog_filters_by_country_and_status() -> Result<()> {
    let country = common::unique("XX");
    common::create("/api/subsidies", &subsidy(&country)).await?;
    let mut closed = subsidy(&country);
    closed["status"] = json!("closed");
    common::create("/api/subsidies", &closed).await?;

    let (_, body) = common::get(&format!("/api/subsidies?country={}", country)).await?;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(2));

    let (_, body) = common::get(&format!("/api/subsidies?country={}&status=open", country)).await?;
    let items = body["data"].as_array().expect("array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["status"], "open");
    Ok(())
}

#[tokio::test]
async fn partial_update_keeps_nested_objects() -> Result<()> {
    let created = common::create("/api/subsidies", &subsidy("IT")).await?;
    let (status, body) = common::put(
        &format!("/api/subsidies/{}", common::id_of(&created)),
        &json!({ "status": "closed" }),
    )
    .await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["status"], "closed");
    assert_eq!(body["data"]["incentiveDetails"]["amount"], 2500000);
    Ok(())
}

#[tokio::test]
async fn update_cannot_drop_incentive_fields() -> Result<()> {
    let created = common::create("/api/subsidies", &subsidy("PT")).await?;
    let path = format!("/api/subsidies/{}", common::id_of(&created));

    let (status, body) = common::put(&path, &json!({ "incentiveDetails": { "type": "grant" } })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);

    let (_, body) = common::get(&path).await?;
    assert_eq!(body["data"]["incentiveDetails"]["currency"], "EUR");
    Ok(())
}

#[tokio::test]
async fn plain_text_nested_fields_stay_strings() -> Result<()> {
    let mut body = subsidy("AT");
    body["eligibility"] = json!("Open to EU SMEs");
    let created = common::create("/api/subsidies", &body).await?;
    assert_eq!(created["eligibility"], "Open to EU SMEs");

    let (status, body) = common::put(
        &format!("/api/subsidies/{}", common::id_of(&created)),
        &json!({ "status": "closed" }),
    )
    .await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["eligibility"], "Open to EU SMEs");
    Ok(())
}

#[tokio::test]
async fn nested_keys_are_not_filters() -> Result<()> {
    let (status, body) = common::get("/api/subsidies?incentiveDetails.type=grant").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
    assert!(body["message"].as_str().unwrap_or_default().contains("incentiveDetails.type"), "{}", body);
    Ok(())
}
