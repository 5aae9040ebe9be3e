use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use lemburr::config::Config;
use serde_json::{Value, json};
use tower::ServiceExt;

/// NIK of the admin account seeded by the initial migration.
const ADMIN_NIK: &str = "admin";

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    // A single pooled connection keeps the in-memory database shared across
    // every request of a test.
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;

    let state = lemburr::api::create_app_state(config, None)
        .await
        .expect("Failed to create app state");
    lemburr::api::router(state)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, body)
}

/// Logs a NIK in and returns the session cookie to replay on later requests.
async fn login(app: &Router, nik: &str) -> String {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "nik": nik }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK, "login as {nik} failed");

    response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login must set a session cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_auth_flow() {
    let app = spawn_app().await;

    // No session: protected routes deny.
    let (status, _) = send(&app, "GET", "/api/requests/mine", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Unknown NIK cannot log in.
    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "nik": "does-not-exist" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Blank NIK is a validation error, not an auth failure.
    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "nik": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // The seeded admin logs in and sees itself.
    let cookie = login(&app, ADMIN_NIK).await;
    let (status, body) = send(&app, "GET", "/api/auth/me", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["nik"], "admin");
    assert_eq!(body["data"]["role"], "admin");

    // Logout invalidates the session.
    let (status, _) = send(&app, "POST", "/api/auth/logout", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "GET", "/api/auth/me", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_categories_registry() {
    let app = spawn_app().await;
    let cookie = login(&app, ADMIN_NIK).await;

    let (status, body) = send(&app, "GET", "/api/categories", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);

    let categories = body["data"].as_array().unwrap();
    assert_eq!(categories.len(), 8);

    let overnight = categories
        .iter()
        .find(|c| c["key"] == "shift2_offday")
        .expect("shift2_offday registered");
    assert_eq!(overnight["name"], "SHIFT 2 OFFDAY");
    assert_eq!(overnight["start_time"], "19:30");
    assert_eq!(overnight["end_time"], "04:30");
}

#[tokio::test]
async fn test_user_management() {
    let app = spawn_app().await;
    let cookie = login(&app, ADMIN_NIK).await;

    // Build the hierarchy top-down: approver2, then approver1, then employee.
    let (status, _) = send(
        &app,
        "POST",
        "/api/users",
        Some(&cookie),
        Some(json!({ "nik": "A2", "name": "Second Approver", "role": "approver2" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "POST",
        "/api/users",
        Some(&cookie),
        Some(json!({
            "nik": "A1", "name": "First Approver", "role": "approver1",
            "approver2": "A2"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["approver2"], "A2");

    let (status, _) = send(
        &app,
        "POST",
        "/api/users",
        Some(&cookie),
        Some(json!({
            "nik": "E1", "name": "Employee One", "role": "employee",
            "approver1": "A1", "approver2": "A2", "pickup_point": "Gate 3"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Duplicate NIK conflicts.
    let (status, _) = send(
        &app,
        "POST",
        "/api/users",
        Some(&cookie),
        Some(json!({ "nik": "E1", "name": "Duplicate", "role": "employee" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // An approver1 without an approver2 superior violates the hierarchy.
    let (status, _) = send(
        &app,
        "POST",
        "/api/users",
        Some(&cookie),
        Some(json!({ "nik": "A1B", "name": "Lonely Approver", "role": "approver1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // So does a slot reference to a user with the wrong role.
    let (status, _) = send(
        &app,
        "POST",
        "/api/users",
        Some(&cookie),
        Some(json!({
            "nik": "E2", "name": "Employee Two", "role": "employee",
            "approver1": "A2"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Directory listing is admin-only.
    let (status, body) = send(&app, "GET", "/api/users", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 4);

    let employee_cookie = login(&app, "E1").await;
    let (status, _) = send(&app, "GET", "/api/users", Some(&employee_cookie), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Approver pickers group eligible users per slot.
    let (status, body) = send(&app, "GET", "/api/users/approvers", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["approver1"][0]["nik"], "A1");
    assert_eq!(body["data"]["approver2"][0]["nik"], "A2");

    // Role reassignment re-validates the hierarchy.
    let (status, _) = send(
        &app,
        "PUT",
        "/api/users/E1/role",
        Some(&cookie),
        Some(json!({ "role": "approver1", "approver2": "A2" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "PUT",
        "/api/users/E1/role",
        Some(&cookie),
        Some(json!({ "role": "approver1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Self-service profile edit.
    let (status, body) = send(
        &app,
        "PUT",
        "/api/profile",
        Some(&employee_cookie),
        Some(json!({ "name": "Employee Renamed", "pickup_point": "Gate 5" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Employee Renamed");
    assert_eq!(body["data"]["pickup_point"], "Gate 5");

    // Deleting a user ends their session on the next call.
    let (status, _) = send(&app, "DELETE", "/api/users/E1", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "GET", "/api/auth/me", Some(&employee_cookie), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Admins cannot delete themselves.
    let (status, _) = send(&app, "DELETE", "/api/users/admin", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_submission_validation() {
    let app = spawn_app().await;
    let cookie = login(&app, ADMIN_NIK).await;

    send(
        &app,
        "POST",
        "/api/users",
        Some(&cookie),
        Some(json!({ "nik": "E1", "name": "Employee One", "role": "employee" })),
    )
    .await;
    let employee_cookie = login(&app, "E1").await;

    // Unknown category.
    let (status, _) = send(
        &app,
        "POST",
        "/api/requests",
        Some(&employee_cookie),
        Some(json!({
            "category_key": "shift9_never",
            "date": "2024-03-15", "start_time": "19:30", "end_time": "04:30",
            "reason": "audit"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Zero-length shift.
    let (status, _) = send(
        &app,
        "POST",
        "/api/requests",
        Some(&employee_cookie),
        Some(json!({
            "category_key": "shift2_offday",
            "date": "2024-03-15", "start_time": "19:30", "end_time": "19:30",
            "reason": "audit"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Malformed date.
    let (status, _) = send(
        &app,
        "POST",
        "/api/requests",
        Some(&employee_cookie),
        Some(json!({
            "category_key": "shift2_offday",
            "date": "15/03/2024", "start_time": "19:30", "end_time": "04:30",
            "reason": "audit"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Blank reason.
    let (status, _) = send(
        &app,
        "POST",
        "/api/requests",
        Some(&employee_cookie),
        Some(json!({
            "category_key": "shift2_offday",
            "date": "2024-03-15", "start_time": "19:30", "end_time": "04:30",
            "reason": "   "
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // A valid overnight submission computes its duration from the times.
    let (status, body) = send(
        &app,
        "POST",
        "/api/requests",
        Some(&employee_cookie),
        Some(json!({
            "category_key": "shift2_offday",
            "date": "2024-03-15", "start_time": "19:30", "end_time": "04:30",
            "reason": "Line changeover support"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["duration"], 9.0);
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["approver1_status"], "pending");
    assert_eq!(body["data"]["approver2_status"], "pending");
    assert_eq!(body["data"]["category"], "SHIFT 2 OFFDAY");
    assert_eq!(body["data"]["nik"], "E1");

    // It shows up in the owner's listing.
    let (status, body) = send(&app, "GET", "/api/requests/mine", Some(&employee_cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_system_status_and_metrics() {
    let app = spawn_app().await;
    let cookie = login(&app, ADMIN_NIK).await;

    let (status, body) = send(&app, "GET", "/api/system/status", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["database"], true);
    assert_eq!(body["data"]["total_users"], 1);
    assert_eq!(body["data"]["total_requests"], 0);

    // No Prometheus recorder is installed in tests; the endpoint still answers.
    let (status, _) = send(&app, "GET", "/api/metrics", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
}
