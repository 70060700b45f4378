//! End-to-end generate flow: quota gate, event recording, and the styled
//! response.

mod common;

use common::{TestApp, item, test_config};
use reqwest::StatusCode;
use stylist_service::models::Tier;
use uuid::Uuid;

#[tokio::test]
async fn fresh_free_user_generates_with_quota_telemetry() {
    let app = TestApp::spawn().await;
    let user = Uuid::new_v4();
    app.wardrobe
        .seed(item(user, "White tee", Some("t-shirt"), &["summer"], Some(2)));

    let response = app.post_generate(user).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Tightest dimension (the daily cap of 3) drives the headers.
    assert_eq!(response.headers()["x-ratelimit-limit"], "3");
    assert_eq!(response.headers()["x-ratelimit-remaining"], "3");
    assert!(response.headers().contains_key("x-ratelimit-reset"));

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["usage"]["used"], 1);
    assert_eq!(body["usage"]["limit"], 3);
    assert_eq!(body["usage"]["remaining"], 2);
    assert_eq!(body["usage"]["isPro"], false);
    assert_eq!(body["outfit"]["items"][0]["name"], "White tee");

    assert_eq!(app.events.count(user), 1);
}

#[tokio::test]
async fn free_user_at_monthly_limit_gets_structured_429() {
    let app = TestApp::spawn().await;
    let user = Uuid::new_v4();
    app.events.seed(user, 5);

    let response = app.post_generate(user).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    assert_eq!(response.headers()["x-ratelimit-limit"], "5");
    assert_eq!(response.headers()["x-ratelimit-remaining"], "0");
    assert!(response.headers().contains_key("x-ratelimit-reset"));
    assert!(response.headers().contains_key("retry-after"));

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "quota_exceeded");
    assert_eq!(body["code"], "monthly_limit_reached");
    assert_eq!(body["used"], 5);
    assert_eq!(body["limit"], 5);
    assert_eq!(body["remaining"], 0);
    assert!(body["resetsAt"].is_string());
    assert!(body["upgradeUrl"].is_string());
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .contains("Upgrade to Pro")
    );

    // The rejected request must not consume anything.
    assert_eq!(app.events.count(user), 5);
}

#[tokio::test]
async fn free_user_hits_the_daily_cap_before_the_monthly_limit() {
    let app = TestApp::spawn().await;
    let user = Uuid::new_v4();
    app.events.seed(user, 3);

    let response = app.post_generate(user).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], "daily_cap_reached");
    assert_eq!(body["used"], 3);
    assert_eq!(body["limit"], 3);
    assert_eq!(body["remaining"], 0);
    assert!(body["upgradeUrl"].is_string());
}

#[tokio::test]
async fn pro_user_generates_past_the_free_limit() {
    let app = TestApp::spawn().await;
    let user = Uuid::new_v4();
    app.subscriptions.set_tier(user, Tier::Pro);
    app.events.seed(user, 5);
    app.wardrobe
        .seed(item(user, "Linen shirt", Some("shirt"), &["summer"], Some(4)));

    let response = app.post_generate(user).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Daily (20 left of 25) is tighter than monthly (70 left of 75).
    assert_eq!(response.headers()["x-ratelimit-limit"], "25");
    assert_eq!(response.headers()["x-ratelimit-remaining"], "20");

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["usage"]["used"], 6);
    assert_eq!(body["usage"]["limit"], 25);
    assert_eq!(body["usage"]["remaining"], 19);
    assert_eq!(body["usage"]["isPro"], true);

    assert_eq!(app.events.count(user), 6);
}

#[tokio::test]
async fn zero_daily_cap_disables_the_daily_dimension() {
    let mut config = test_config();
    config.tiers.free.daily_generation_cap = 0;
    let app = TestApp::spawn_with_config(config).await;
    let user = Uuid::new_v4();

    // A disabled cap must mean "no daily dimension", not "limit zero".
    let response = app.post_generate(user).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Monthly is the only dimension left driving the headers.
    assert_eq!(response.headers()["x-ratelimit-limit"], "5");
    assert_eq!(response.headers()["x-ratelimit-remaining"], "5");

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["usage"]["limit"], 5);
}

#[tokio::test]
async fn pro_rejection_carries_no_upgrade_url() {
    let app = TestApp::spawn().await;
    let user = Uuid::new_v4();
    app.subscriptions.set_tier(user, Tier::Pro);
    app.events.seed(user, 25);

    let response = app.post_generate(user).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], "daily_cap_reached");
    assert!(body["upgradeUrl"].is_null());
}

#[tokio::test]
async fn composed_outfit_excludes_inappropriate_items() {
    let app = TestApp::spawn().await;
    let user = Uuid::new_v4();

    // Default scripted weather: 30 degrees, summer, dry.
    app.wardrobe
        .seed(item(user, "Wool coat", Some("coat"), &["winter"], Some(9)));
    app.wardrobe.seed(item(
        user,
        "Tan loafers",
        Some("suede shoes"),
        &["summer"],
        Some(4),
    ));

    let response = app.post_generate(user).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.unwrap();
    let items = body["outfit"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Tan loafers");
    assert_eq!(items[0]["weatherAppropriate"], true);
    assert_eq!(body["weather"]["temperatureCelsius"], 30.0);
}

#[tokio::test]
async fn weather_outage_fails_the_request_without_consuming_credits() {
    let app = TestApp::spawn().await;
    let user = Uuid::new_v4();
    app.weather.set_failing(true);

    let response = app.post_generate(user).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(app.events.count(user), 0);
}

#[tokio::test]
async fn subscription_outage_fails_open() {
    let app = TestApp::spawn().await;
    let user = Uuid::new_v4();
    app.subscriptions.set_failing(true);
    app.events.seed(user, 5);

    // Denying here would block every user during an outage; the check
    // assumes a clean free-tier window instead.
    let response = app.post_generate(user).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_identity_is_unauthorized() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(format!("{}/v1/outfits/generate", app.address))
        .json(&serde_json::json!({ "latitude": 40.7, "longitude": -74.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .client
        .post(format!("{}/v1/outfits/generate", app.address))
        .header("x-user-id", "not-a-uuid")
        .json(&serde_json::json!({ "latitude": 40.7, "longitude": -74.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn out_of_range_coordinates_are_rejected() {
    let app = TestApp::spawn().await;
    let user = Uuid::new_v4();

    let response = app
        .client
        .post(format!("{}/v1/outfits/generate", app.address))
        .header("x-user-id", user.to_string())
        .json(&serde_json::json!({ "latitude": 120.0, "longitude": -74.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
