use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use kereta_api::{app, AppState};
use kereta_store::{LocalStore, MemoryUserAccounts, StaticScheduleSource};

fn test_state() -> AppState {
    let dir = std::env::temp_dir().join(format!(
        "kereta-api-test-{}-{:?}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    AppState {
        history: Arc::new(LocalStore::open(dir).unwrap()),
        schedules: Arc::new(StaticScheduleSource::new()),
        users: Arc::new(MemoryUserAccounts::default()),
    }
}

async fn send(router: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(body) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn reference_data_is_served() {
    let router = app(test_state());

    let (status, stations) = send(&router, "GET", "/api/stations", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stations.as_array().unwrap().len(), 10);

    let (status, matches) = send(&router, "GET", "/api/stations?q=sura", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(matches.as_array().unwrap().len(), 1);
    assert_eq!(matches[0]["code"], "SGU");

    let (status, trains) = send(&router, "GET", "/api/trains", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(trains.as_array().unwrap().len(), 3);

    let (status, schedules) =
        send(&router, "GET", "/api/schedules?from=gambir&to=yogya", None).await;
    assert_eq!(status, StatusCode::OK);
    let schedules = schedules.as_array().unwrap();
    assert_eq!(schedules.len(), 1);
    assert_eq!(schedules[0]["train_name"], "Taksaka");
}

#[tokio::test]
async fn booking_lifecycle_over_http() {
    let router = app(test_state());

    let (status, created) = send(
        &router,
        "POST",
        "/api/bookings",
        Some(json!({"scheduleId": 2, "date": "2024-03-10", "passengers": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["bookingNumber"], "TK-20240310-001");
    let booking_id = created["bookingId"].as_i64().unwrap();

    let (status, history) = send(&router, "GET", "/api/bookings", None).await;
    assert_eq!(status, StatusCode::OK);
    let history = history.as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["status"], "upcoming");
    assert_eq!(history[0]["train_name"], "Taksaka");

    let (status, _) = send(
        &router,
        "PUT",
        &format!("/api/bookings/{}/status", booking_id),
        Some(json!({"status": "cancelled"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, cancelled) = send(&router, "GET", "/api/bookings?category=cancelled", None).await;
    assert_eq!(cancelled.as_array().unwrap().len(), 1);

    let (_, stats) = send(&router, "GET", "/api/bookings/stats", None).await;
    assert_eq!(stats["count"], 1);
    assert_eq!(stats["total_spent"], 350_000);
    assert_eq!(stats["cancelled_count"], 1);

    let (_, miss) = send(&router, "GET", "/api/bookings?q=zzz", None).await;
    assert!(miss.as_array().unwrap().is_empty());

    let (status, second) = send(
        &router,
        "POST",
        "/api/bookings",
        Some(json!({"scheduleId": 2, "date": "2024-03-10", "passengers": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["bookingNumber"], "TK-20240310-002");

    let (status, _) = send(
        &router,
        "DELETE",
        &format!("/api/bookings/{}", booking_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, rebooked) = send(
        &router,
        "POST",
        "/api/bookings",
        Some(json!({"scheduleId": 2, "date": "2024-03-10", "passengers": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rebooked["bookingNumber"], "TK-20240310-003");

    let (status, _) = send(&router, "POST", "/api/reset", None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, empty) = send(&router, "GET", "/api/bookings", None).await;
    assert!(empty.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn invalid_inputs_map_to_4xx_errors() {
    let router = app(test_state());

    let (status, body) = send(
        &router,
        "POST",
        "/api/bookings",
        Some(json!({"scheduleId": 999, "date": "2024-03-10"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Schedule not found");

    let (status, body) = send(
        &router,
        "PUT",
        "/api/bookings/1/status",
        Some(json!({"status": "refunded"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("refunded"));
}

#[tokio::test]
async fn register_and_login_round_trip() {
    let router = app(test_state());

    let register = json!({
        "first_name": "Budi",
        "last_name": "Santoso",
        "email": "budi@email.com",
        "password": "rahasia123"
    });
    let (status, created) = send(&router, "POST", "/api/auth/register", Some(register.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let user_id = created["user_id"].as_i64().unwrap();

    let (status, body) = send(&router, "POST", "/api/auth/register", Some(register)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email already exists");

    let (status, user) = send(
        &router,
        "POST",
        "/api/auth/login",
        Some(json!({"email": "budi@email.com", "password": "rahasia123"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["user_id"], user_id);
    assert!(user.get("password_hash").is_none());

    let (status, body) = send(
        &router,
        "POST",
        "/api/auth/login",
        Some(json!({"email": "budi@email.com", "password": "salah"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");

    let (status, fetched) = send(&router, "GET", &format!("/api/users/{}", user_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["email"], "budi@email.com");
    assert!(fetched.get("password_hash").is_none());

    let (status, _) = send(&router, "GET", "/api/users/9999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn profile_update_is_shallow_merge() {
    let router = app(test_state());

    let (status, profile) = send(&router, "GET", "/api/users/profile", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["first_name"], "Andi");

    let (status, merged) = send(
        &router,
        "PUT",
        "/api/users/profile",
        Some(json!({"phone": "+62 811-0000-0000"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(merged["phone"], "+62 811-0000-0000");
    assert_eq!(merged["first_name"], "Andi");
}
