use super::router;
use crate::state::{AppState, EngineSettings};
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use walkin_core::port::id_provider::mocks::SequentialIdProvider;
use walkin_core::port::shop_store::mocks::InMemoryShopStore;
use walkin_core::port::time_provider::mocks::FixedTimeProvider;

// 2023-11-14T22:13:20Z
const NOW: i64 = 1_700_000_000_000;
const DAY_MS: i64 = 24 * 60 * 60 * 1000;

struct Harness {
    app: Router,
    state: AppState,
    time: Arc<FixedTimeProvider>,
}

fn harness() -> Harness {
    let store = Arc::new(InMemoryShopStore::new());
    let time = Arc::new(FixedTimeProvider::new(NOW));
    let state = AppState::new(
        store,
        Arc::new(SequentialIdProvider::new("id")),
        time.clone(),
        EngineSettings::default(),
    );
    Harness {
        app: router(state.clone()),
        state,
        time,
    }
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(v) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn create_shop(app: &Router) -> String {
    let (status, body) = call(
        app,
        Method::POST,
        "/admin/shops",
        Some(json!({ "name": "Fade Factory" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

async fn join(app: &Router, shop_id: &str, name: &str, customer_ref: Option<&str>) -> Value {
    let (status, body) = call(
        app,
        Method::POST,
        "/queue",
        Some(json!({
            "shopId": shop_id,
            "name": name,
            "customerRef": customer_ref,
            "services": "Haircut",
            "totalCost": 15.0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "join failed: {body}");
    body
}

async fn queue_names(app: &Router, shop_id: &str) -> Vec<String> {
    let (status, body) = call(app, Method::GET, &format!("/queue?shopId={shop_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_health() {
    let h = harness();
    let (status, body) = call(&h.app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_oversized_trial_is_bad_request() {
    let h = harness();
    let (status, body) = call(
        &h.app,
        Method::POST,
        "/admin/shops",
        Some(json!({ "name": "Forever Cuts", "trialDays": i64::MAX / 1000 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("trialDays"));

    let (_, shops) = call(&h.app, Method::GET, "/shops", None).await;
    assert_eq!(shops.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_missing_shop_id_is_bad_request() {
    let h = harness();
    let (status, body) = call(&h.app, Method::GET, "/queue", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "shopId is required");

    let (status, _) = call(&h.app, Method::POST, "/queue", Some(json!({ "name": "Ann" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_shop_is_not_found() {
    let h = harness();
    let (status, _) = call(
        &h.app,
        Method::POST,
        "/queue",
        Some(json!({ "shopId": "ghost", "name": "Ann" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let h = harness();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/queue")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = h.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_queue_ordering_flow() {
    let h = harness();
    let shop = create_shop(&h.app).await;

    let a = join(&h.app, &shop, "A", Some("cust-a")).await;
    join(&h.app, &shop, "B", Some("cust-b")).await;
    join(&h.app, &shop, "C", None).await;
    assert_eq!(a["position"], 1);
    assert_eq!(a["services"], json!(["Haircut"]));

    let (_, listed) = call(&h.app, Method::GET, &format!("/queue?shopId={shop}"), None).await;
    assert_eq!(listed["queueLength"], 3);
    let positions: Vec<i64> = listed["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["position"].as_i64().unwrap())
        .collect();
    assert_eq!(positions, vec![1, 2, 3]);

    let (status, body) = call(
        &h.app,
        Method::PATCH,
        "/queue/move",
        Some(json!({ "shopId": shop, "id": a["id"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Item moved down");
    assert_eq!(queue_names(&h.app, &shop).await, vec!["B", "A", "C"]);

    // C is last
    let c_id = listed["data"][2]["id"].clone();
    let (status, _) = call(
        &h.app,
        Method::PATCH,
        "/queue/move",
        Some(json!({ "shopId": shop, "id": c_id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(queue_names(&h.app, &shop).await, vec!["B", "A", "C"]);

    let (status, body) = call(
        &h.app,
        Method::DELETE,
        &format!("/queue?shopId={shop}&uid=cust-b"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"]["name"], "B");

    let d = join(&h.app, &shop, "D", None).await;
    assert_eq!(d["position"], 4);
    assert_eq!(queue_names(&h.app, &shop).await, vec!["A", "C", "D"]);
}

#[tokio::test]
async fn test_remove_head_drains_then_reports_empty() {
    let h = harness();
    let shop = create_shop(&h.app).await;
    join(&h.app, &shop, "A", None).await;
    join(&h.app, &shop, "B", None).await;

    let uri = format!("/queue?shopId={shop}");
    let (_, first) = call(&h.app, Method::DELETE, &uri, None).await;
    assert_eq!(first["removed"]["name"], "A");
    let (_, second) = call(&h.app, Method::DELETE, &uri, None).await;
    assert_eq!(second["removed"]["name"], "B");

    let (status, empty) = call(&h.app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(empty["message"], "Queue is empty");
    assert!(empty["removed"].is_null());
}

#[tokio::test]
async fn test_remove_entry_by_id() {
    let h = harness();
    let shop = create_shop(&h.app).await;
    let a = join(&h.app, &shop, "A", None).await;
    join(&h.app, &shop, "B", None).await;

    let entry_id = a["id"].as_str().unwrap();
    let (status, body) = call(
        &h.app,
        Method::DELETE,
        &format!("/queue/{entry_id}?shopId={shop}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"]["id"], entry_id);
    assert_eq!(queue_names(&h.app, &shop).await, vec!["B"]);
}

#[tokio::test]
async fn test_update_services() {
    let h = harness();
    let shop = create_shop(&h.app).await;
    join(&h.app, &shop, "A", Some("cust-a")).await;

    let (status, _) = call(
        &h.app,
        Method::PATCH,
        "/update-services",
        Some(json!({ "shopId": shop, "customerRef": "cust-a", "services": ["Shave"] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(
        &h.app,
        Method::PATCH,
        "/update-services",
        Some(json!({
            "shopId": shop,
            "customerRef": "cust-a",
            "services": ["Shave", "Wash"],
            "totalCost": 30.0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updatedEntry"]["services"], json!(["Shave", "Wash"]));
    assert_eq!(body["updatedEntry"]["totalCost"], 30.0);
    assert_eq!(body["updatedEntry"]["position"], 1);
}

#[tokio::test]
async fn test_completion_rating_and_views() {
    let h = harness();
    let shop = create_shop(&h.app).await;

    let (_, barber) = call(
        &h.app,
        Method::POST,
        "/admin/barbers",
        Some(json!({ "shopId": shop, "name": "Sam" })),
    )
    .await;
    let barber_id = barber["id"].as_str().unwrap().to_string();

    let (_, customer) = call(
        &h.app,
        Method::POST,
        "/admin/customers",
        Some(json!({ "name": "Ann" })),
    )
    .await;
    let customer_ref = customer["id"].as_str().unwrap().to_string();
    join(&h.app, &shop, "Ann", Some(&customer_ref)).await;

    let (status, summary) = call(
        &h.app,
        Method::POST,
        "/barber/add-history",
        Some(json!({
            "shopId": shop,
            "customerRef": customer_ref,
            "barberId": barber_id,
            "service": "Cut, Shave",
            "cost": 20.0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{summary}");
    assert_eq!(summary["ok"], true);
    assert_eq!(summary["record"]["services"], json!(["Cut", "Shave"]));
    assert_eq!(summary["removedEntry"]["name"], "Ann");
    assert_eq!(summary["customerUpdated"], true);
    assert!(queue_names(&h.app, &shop).await.is_empty());

    let rate = json!({ "shopId": shop, "customerRef": customer_ref, "rating": 4 });
    let (status, rated) = call(&h.app, Method::POST, "/barber/rate", Some(rate.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rated["averageRating"], 4.0);
    assert_eq!(rated["barberId"], barber_id.as_str());

    let (status, _) = call(&h.app, Method::POST, "/barber/rate", Some(rate)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, barbers) = call(&h.app, Method::GET, &format!("/barbers?shopId={shop}"), None).await;
    assert_eq!(barbers[0]["customersServed"], 1);
    assert_eq!(barbers[0]["averageRating"], 4.0);

    let (status, profile) = call(
        &h.app,
        Method::GET,
        &format!("/barber/{barber_id}?shopId={shop}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["history"].as_array().unwrap().len(), 1);
    assert_eq!(profile["ratings"][0]["rating"], 4);

    let (_, history) = call(&h.app, Method::GET, &format!("/history?shopId={shop}"), None).await;
    assert_eq!(history["count"], 1);

    let (_, today) = call(
        &h.app,
        Method::GET,
        &format!("/history/2023-11-14?shopId={shop}"),
        None,
    )
    .await;
    assert_eq!(today["count"], 1);

    let (_, other_day) = call(
        &h.app,
        Method::GET,
        &format!("/history/2023-11-15?shopId={shop}"),
        None,
    )
    .await;
    assert_eq!(other_day["count"], 0);

    let (status, _) = call(
        &h.app,
        Method::GET,
        &format!("/history/14-11-2023?shopId={shop}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_guest_completion_skips_customer_step() {
    let h = harness();
    let shop = create_shop(&h.app).await;
    let (_, barber) = call(
        &h.app,
        Method::POST,
        "/admin/barbers",
        Some(json!({ "shopId": shop, "name": "Sam" })),
    )
    .await;

    let (status, summary) = call(
        &h.app,
        Method::POST,
        "/barber/add-history",
        Some(json!({
            "shopId": shop,
            "customerRef": "walkin-77=",
            "barberId": barber["id"],
            "service": ["Fade"],
            "cost": 12.0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["customerUpdated"], false);
    assert!(summary["removedEntry"].is_null());
}

#[tokio::test]
async fn test_unknown_barber_is_not_found() {
    let h = harness();
    let shop = create_shop(&h.app).await;
    let (status, _) = call(
        &h.app,
        Method::POST,
        "/barber/add-history",
        Some(json!({
            "shopId": shop,
            "customerRef": "x=",
            "barberId": "nobody",
            "service": "Cut",
            "cost": 10.0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(
        &h.app,
        Method::GET,
        &format!("/barber/nobody?shopId={shop}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reset_pending_rating_unknown_customer() {
    let h = harness();
    let (status, _) = call(
        &h.app,
        Method::POST,
        "/reset-pending-rating",
        Some(json!({ "customerRef": "ghost" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_expired_trial_is_forbidden_and_hidden() {
    let h = harness();
    let shop = create_shop(&h.app).await;
    join(&h.app, &shop, "A", None).await;

    h.time.advance(31 * DAY_MS);

    let (status, body) = call(
        &h.app,
        Method::POST,
        "/queue",
        Some(json!({ "shopId": shop, "name": "Late" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Trial period has expired");

    let (status, _) = call(&h.app, Method::GET, &format!("/queue?shopId={shop}"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, shops) = call(&h.app, Method::GET, "/shops", None).await;
    assert!(shops.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_mutation_reaches_live_subscribers() {
    let h = harness();
    let shop = create_shop(&h.app).await;
    let mut rx = h.state.hub.subscribe(&shop);

    join(&h.app, &shop, "A", None).await;

    let event = rx.recv().await.unwrap();
    assert_eq!(event.shop_id, shop);
    assert_eq!(event.message, format!("Queue updated for shop {shop}"));
    assert!(event.version > 0);
}
