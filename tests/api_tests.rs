use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use solestore::config::Config;
use solestore::db::Store;
use solestore::state::SharedState;
use tower::ServiceExt;

async fn spawn_app() -> (Router, Arc<SharedState>) {
    let dir = std::env::temp_dir().join(format!("solestore-api-{}", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}?mode=rwc", dir.join("shop.db").display());
    config.catalog.images_path = dir.join("images").to_string_lossy().into_owned();
    config.server.secure_cookies = false;
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;

    let store = Store::new(&config.general.database_path)
        .await
        .expect("Failed to open store");
    let shared = Arc::new(SharedState::with_store(config, store));

    let state = solestore::api::create_app_state(shared.clone(), None);
    (solestore::api::router(state), shared)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Option<String>, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, set_cookie, json)
}

async fn register(app: &Router, username: &str) -> String {
    let (status, cookie, _) = send(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "name": username,
            "email": format!("{username}@example.com"),
            "username": username,
            "password": "secret",
            "confirm_password": "secret",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    cookie.expect("Registration should start a session")
}

async fn login_admin(app: &Router, shared: &SharedState) -> String {
    shared
        .auth_service
        .register_admin(solestore::services::Registration {
            name: "Boss".to_string(),
            email: "boss@example.com".to_string(),
            username: "boss".to_string(),
            password: "secret".to_string(),
            confirm_password: "secret".to_string(),
        })
        .await
        .unwrap();

    let (status, cookie, _) = send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": "boss", "password": "secret" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    cookie.expect("Login should start a session")
}

#[tokio::test]
async fn test_public_catalog() {
    let (app, _) = spawn_app().await;

    let (status, _, body) = send(&app, "GET", "/api/products", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"], json!([]));

    let (status, _, body) = send(&app, "GET", "/api/products/42", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (status, _, _) = send(&app, "GET", "/api/search?q=air", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_cart_requires_sign_in() {
    let (app, _) = spawn_app().await;

    let (status, _, _) = send(&app, "GET", "/api/cart", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, _) = send(&app, "POST", "/api/checkout", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_rejects_wrong_password() {
    let (app, _) = spawn_app().await;
    register(&app, "alice").await;

    let (status, cookie, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": "alice", "password": "wrong" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(cookie.is_none());
}

#[tokio::test]
async fn test_register_password_mismatch() {
    let (app, shared) = spawn_app().await;

    let (status, _, _) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "name": "Alice",
            "email": "alice@example.com",
            "username": "alice",
            "password": "secret",
            "confirm_password": "different",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(shared.store.list_users().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_shopping_flow() {
    let (app, shared) = spawn_app().await;
    let admin = login_admin(&app, &shared).await;

    let (status, _, body) = send(
        &app,
        "POST",
        "/api/admin/products",
        Some(&admin),
        Some(json!({ "name": "Air Max", "price": 100, "category": "Nike" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let product_id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["price"]["display"], "100VNĐ");

    let alice = register(&app, "alice").await;

    let (status, _, body) = send(&app, "GET", "/api/auth/me", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "alice");

    let (status, _, _) = send(&app, "POST", "/api/checkout", Some(&alice), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let cart_uri = format!("/api/cart/{product_id}");
    for _ in 0..2 {
        let (status, _, _) = send(
            &app,
            "POST",
            &cart_uri,
            Some(&alice),
            Some(json!({ "quantity": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, _, body) = send(&app, "GET", "/api/cart", Some(&alice), None).await;
    assert_eq!(body["data"]["items"][0]["quantity"], 2);
    assert_eq!(body["data"]["total"]["display"], "200VNĐ");

    let (status, _, body) = send(
        &app,
        "PUT",
        &cart_uri,
        Some(&alice),
        Some(json!({ "quantity": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"]["display"], "300VNĐ");

    let (status, _, body) = send(
        &app,
        "POST",
        "/api/checkout",
        Some(&alice),
        Some(json!({ "payment_method": "Cash" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"]["amount"], 300_000);
    assert_eq!(body["data"]["items"][0]["unit_price"]["amount"], 100_000);

    let (_, _, body) = send(&app, "GET", "/api/cart", Some(&alice), None).await;
    assert_eq!(body["data"]["items"], json!([]));

    let (_, _, body) = send(&app, "GET", "/api/orders", Some(&alice), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, _, _) = send(&app, "GET", "/api/admin/orders", Some(&alice), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_routes_forbidden_without_session() {
    let (app, _) = spawn_app().await;

    for uri in ["/api/admin/dashboard", "/api/admin/users", "/api/admin/orders/export"] {
        let (status, _, _) = send(&app, "GET", uri, None, None).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
    }
}

#[tokio::test]
async fn test_export_orders_csv() {
    let (app, shared) = spawn_app().await;
    let admin = login_admin(&app, &shared).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/admin/orders/export")
                .header(header::COOKIE, &admin)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/csv; charset=utf-8"
    );

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let csv = String::from_utf8(bytes.to_vec()).unwrap();
    assert_eq!(csv.trim_end(), "order_id,username,total,order_date,products");
}

#[tokio::test]
async fn test_admin_cannot_delete_own_account() {
    let (app, shared) = spawn_app().await;
    let admin = login_admin(&app, &shared).await;

    let boss = shared
        .store
        .get_user_by_username("boss")
        .await
        .unwrap()
        .unwrap();

    let (status, _, _) = send(
        &app,
        "DELETE",
        &format!("/api/admin/users/{}", boss.id),
        Some(&admin),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(shared.store.get_user(boss.id.value()).await.unwrap().is_some());
}

#[tokio::test]
async fn test_logout_ends_session() {
    let (app, _) = spawn_app().await;
    let alice = register(&app, "alice").await;

    let (status, _, _) = send(&app, "POST", "/api/auth/logout", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = send(&app, "GET", "/api/auth/me", Some(&alice), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_endpoints() {
    let (app, _) = spawn_app().await;

    let (status, _, body) = send(&app, "GET", "/api/system/health/live", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "alive");

    let (status, _, body) = send(&app, "GET", "/api/system/health/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["ready"], true);
    assert_eq!(body["data"]["database"], true);
}

#[tokio::test]
async fn test_order_detail_route() {
    let (app, shared) = spawn_app().await;
    let admin = login_admin(&app, &shared).await;

    let (_, _, body) = send(
        &app,
        "POST",
        "/api/admin/products",
        Some(&admin),
        Some(json!({ "name": "Air Max", "price": 100, "category": "Nike" })),
    )
    .await;
    let product_id = body["data"]["id"].as_i64().unwrap();

    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;

    send(&app, "POST", &format!("/api/cart/{product_id}"), Some(&alice), None).await;
    let (_, _, body) = send(&app, "POST", "/api/checkout", Some(&alice), None).await;
    let order_id = body["data"]["id"].as_i64().unwrap();
    let uri = format!("/api/orders/{order_id}");

    let (status, _, body) = send(&app, "GET", &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["items"][0]["product_name"], "Air Max");

    let (status, _, _) = send(&app, "GET", &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = send(&app, "GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
