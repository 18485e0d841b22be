use std::time::Duration;

use anyhow::Result;
use axum::http::HeaderValue;
use email_collector::{
    config::{AppConfig, Environment},
    model::format_timestamp,
    store::{MemStore, SubscriptionStore},
    App,
};
use figment::providers::Serialized;
use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::helpers::{
    assert_api_headers, spawn_failing_app, spawn_test_app, spawn_with_store,
    STORE_FAILURE_DETAIL,
};

#[tokio::test]
async fn subscribe_valid_email_is_stored() -> Result<()> {
    let app = spawn_test_app().await?;
    let before = chrono::Utc::now() - chrono::Duration::milliseconds(1);

    let res = app.post_subscribe_json(&json!({ "email": "a@b.com" })).await?;

    assert_eq!(StatusCode::OK, res.status());
    assert_api_headers(&res, "*");
    assert_eq!(
        json!({ "message": "Email subscription successful", "email": "a@b.com" }),
        res.json::<Value>().await?
    );

    let records = app.store.query("a@b.com").await?;
    assert_eq!(1, records.len());
    let record = &records[0];
    assert_eq!("a@b.com", record.email);
    assert_eq!(
        format!("a@b.com_{}", format_timestamp(&record.subscription_date)),
        record.id
    );
    assert!(record.subscription_date >= before);
    assert!(record.subscription_date <= chrono::Utc::now());

    Ok(())
}

#[tokio::test]
async fn subscribe_returns_a_400_for_missing_or_malformed_email() -> Result<()> {
    let app = spawn_test_app().await?;

    let cases = [
        (json!({ "email": "" }), "empty email"),
        (json!({ "email": "ursuladomain.com" }), "missing @"),
        (json!({ "email": "ursula@domain" }), "missing dot after @"),
        (json!({ "email": "ursula@@domain.com" }), "double @"),
        (json!({ "email": "ursula le guin@domain.com" }), "whitespace"),
        (json!({ "email": " a@b.com" }), "leading whitespace"),
        (json!({ "email": null }), "null email"),
        (json!({ "email": 42 }), "numeric email"),
        (json!({ "name": "Ursula" }), "missing email"),
        (json!({}), "empty json"),
    ];

    for (body, description) in cases {
        let res = app.post_subscribe_json(&body).await?;
        assert_eq!(
            StatusCode::BAD_REQUEST,
            res.status(),
            "The API did not return a 400 BAD REQUEST when the payload was {description}."
        );
        assert_api_headers(&res, "*");
        assert_eq!(
            json!({ "message": "Invalid email address" }),
            res.json::<Value>().await?
        );
    }

    assert!(app.store.is_empty().await, "rejected input was stored");

    Ok(())
}

#[tokio::test]
async fn subscribe_returns_a_400_for_a_body_that_is_not_json() -> Result<()> {
    let app = spawn_test_app().await?;

    for body in ["", "email=a@b.com", "{\"email\": \"a@b.com\""] {
        let res = app.post_subscribe(body).await?;
        assert_eq!(StatusCode::BAD_REQUEST, res.status(), "body: {body:?}");
        assert_eq!(
            json!({ "message": "Invalid email address" }),
            res.json::<Value>().await?
        );
    }

    assert!(app.store.is_empty().await);

    Ok(())
}

#[tokio::test]
async fn subscribe_returns_a_json_400_for_a_body_over_the_size_limit() -> Result<()> {
    let app = spawn_test_app().await?;
    let email = format!("{}@b.com", "a".repeat(3 * 1024 * 1024));

    let res = app.post_subscribe_json(&json!({ "email": email })).await?;

    assert_eq!(StatusCode::BAD_REQUEST, res.status());
    assert_api_headers(&res, "*");
    assert_eq!(
        json!({ "message": "Invalid email address" }),
        res.json::<Value>().await?
    );
    assert!(app.store.is_empty().await);

    Ok(())
}

#[tokio::test]
async fn subscribe_rejects_a_byte_order_mark_in_the_email() -> Result<()> {
    let app = spawn_test_app().await?;

    let res = app
        .post_subscribe_json(&json!({ "email": "a\u{FEFF}@b.com" }))
        .await?;

    assert_eq!(StatusCode::BAD_REQUEST, res.status());
    assert!(app.store.is_empty().await);

    Ok(())
}

#[tokio::test]
async fn subscribe_does_not_require_a_json_content_type() -> Result<()> {
    let app = spawn_test_app().await?;

    let res = app
        .client
        .post(format!("http://{}/api/subscribe", app.addr))
        .header("Content-Type", "text/plain")
        .body(r#"{"email": "a@b.com"}"#)
        .send()
        .await?;

    assert_eq!(StatusCode::OK, res.status());
    assert_eq!(1, app.store.len().await);

    Ok(())
}

#[tokio::test]
async fn subscribe_twice_keeps_both_records() -> Result<()> {
    let app = spawn_test_app().await?;
    let body = json!({ "email": "a@b.com" });

    assert_eq!(StatusCode::OK, app.post_subscribe_json(&body).await?.status());
    // Ids are only unique down to the millisecond.
    tokio::time::sleep(Duration::from_millis(5)).await;
    assert_eq!(StatusCode::OK, app.post_subscribe_json(&body).await?.status());

    let records = app.store.query("a@b.com").await?;
    assert_eq!(2, records.len());
    assert_ne!(records[0].id, records[1].id);

    Ok(())
}

#[tokio::test]
async fn subscribe_store_failure_returns_a_generic_500() -> Result<()> {
    let app = spawn_failing_app().await?;

    let res = app.post_subscribe_json(&json!({ "email": "a@b.com" })).await?;

    assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, res.status());
    assert_api_headers(&res, "*");
    let body = res.text().await?;
    assert!(!body.contains(STORE_FAILURE_DETAIL), "leaked: {body}");
    assert_eq!(
        json!({ "message": "Internal server error" }),
        serde_json::from_str::<Value>(&body)?
    );

    Ok(())
}

#[tokio::test]
async fn subscribe_without_configured_table_returns_a_500() -> Result<()> {
    let store = MemStore::new(None);
    let addr = spawn_with_store(Box::new(store.clone()), HeaderValue::from_static("*")).await?;

    let res = reqwest::Client::new()
        .post(format!("http://{addr}/api/subscribe"))
        .json(&json!({ "email": "a@b.com" }))
        .send()
        .await?;

    assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, res.status());
    assert_eq!(
        json!({ "message": "Internal server error" }),
        res.json::<Value>().await?
    );
    assert!(store.is_empty().await);

    Ok(())
}

#[tokio::test]
async fn subscribe_uses_the_configured_origin() -> Result<()> {
    let config_dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("config");
    let config: AppConfig = AppConfig::figment(&config_dir, &Environment::Local)
        .merge(Serialized::default("store_config.backend", "memory"))
        .merge(Serialized::default("net_config.app_port", 0))
        .merge(Serialized::default(
            "net_config.allow_origin",
            "https://news.example.com",
        ))
        .extract()?;

    let app = App::build_from_config(&config).await?;
    let addr = app.local_addr()?;
    tokio::spawn(email_collector::serve(app));

    let client = reqwest::Client::new();
    let res = client
        .post(format!("http://{addr}/api/subscribe"))
        .json(&json!({ "email": "a@b.com" }))
        .send()
        .await?;
    assert_eq!(StatusCode::OK, res.status());
    assert_api_headers(&res, "https://news.example.com");

    let res = client
        .get(format!("http://{addr}/api/lookup"))
        .query(&[("email", "a@b.com")])
        .send()
        .await?;
    assert_eq!(StatusCode::OK, res.status());
    assert_api_headers(&res, "https://news.example.com");

    Ok(())
}
