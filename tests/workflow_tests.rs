//! End-to-end approval workflow tests: the two-step approval chain, the
//! rejection short-circuit, the admin override, terminal immutability, the
//! pending queues, and reporting.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use lemburr::config::Config;
use serde_json::{Value, json};
use tower::ServiceExt;

const ADMIN_NIK: &str = "admin";

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
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

/// Seeds the standard directory: approver2 "A2", approver1 "A1" under A2,
/// employee "E1" signed by both. Returns the admin's session cookie.
async fn seed_directory(app: &Router) -> String {
    let admin = login(app, ADMIN_NIK).await;

    for payload in [
        json!({ "nik": "A2", "name": "Second Approver", "role": "approver2" }),
        json!({ "nik": "A1", "name": "First Approver", "role": "approver1", "approver2": "A2" }),
        json!({
            "nik": "E1", "name": "Employee One", "role": "employee",
            "approver1": "A1", "approver2": "A2"
        }),
    ] {
        let (status, _) = send(app, "POST", "/api/users", Some(&admin), Some(payload)).await;
        assert_eq!(status, StatusCode::OK);
    }

    admin
}

async fn submit(
    app: &Router,
    cookie: &str,
    date: &str,
    start: &str,
    end: &str,
) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/api/requests",
        Some(cookie),
        Some(json!({
            "category_key": "shift2_offday",
            "date": date, "start_time": start, "end_time": end,
            "reason": "Line changeover support"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["id"].as_i64().unwrap()
}

async fn decide(
    app: &Router,
    cookie: &str,
    id: i64,
    decision: &str,
) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        &format!("/api/requests/{id}/decision"),
        Some(cookie),
        Some(json!({ "decision": decision })),
    )
    .await
}

#[tokio::test]
async fn two_step_approval_chain() {
    let app = spawn_app().await;
    let admin = seed_directory(&app).await;
    let employee = login(&app, "E1").await;
    let approver1 = login(&app, "A1").await;
    let approver2 = login(&app, "A2").await;

    // shift2_offday 19:30 -> 04:30 is the 9-hour overnight case.
    let id = submit(&app, &employee, "2024-03-15", "19:30", "04:30").await;

    // First signature: slot resolves, overall stays pending.
    let (status, body) = decide(&app, &approver1, id, "approve").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["approver1_status"], "approved");
    assert_eq!(body["data"]["approver2_status"], "pending");
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["approver1_name"], "First Approver");
    assert!(body["data"]["approver1_approved_at"].is_string());
    assert!(body["data"]["approver2_name"].is_null());

    // Second signature: overall approved.
    let (status, body) = decide(&app, &approver2, id, "approve").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "approved");
    assert_eq!(body["data"]["approver2_name"], "Second Approver");
    assert_eq!(body["data"]["duration"], 9.0);

    // Terminal: nobody can act again, not even the admin.
    let (status, _) = decide(&app, &admin, id, "reject").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = decide(&app, &approver1, id, "approve").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn single_rejection_is_terminal() {
    let app = spawn_app().await;
    seed_directory(&app).await;
    let employee = login(&app, "E1").await;
    let approver1 = login(&app, "A1").await;
    let approver2 = login(&app, "A2").await;

    let id = submit(&app, &employee, "2024-03-16", "19:30", "04:30").await;

    // approver2 rejects first; the other slot never needs to act.
    let (status, body) = decide(&app, &approver2, id, "reject").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "rejected");
    assert_eq!(body["data"]["approver2_status"], "rejected");
    assert_eq!(body["data"]["approver1_status"], "pending");

    let (status, _) = decide(&app, &approver1, id, "approve").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_override_resolves_both_slots() {
    let app = spawn_app().await;
    let admin = seed_directory(&app).await;
    let employee = login(&app, "E1").await;

    let id = submit(&app, &employee, "2024-03-17", "19:30", "04:30").await;

    let (status, body) = decide(&app, &admin, id, "reject").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "rejected");
    // Both slots force-synced and stamped with the admin's name.
    assert_eq!(body["data"]["approver1_status"], "rejected");
    assert_eq!(body["data"]["approver2_status"], "rejected");
    assert_eq!(body["data"]["approver1_name"], "Administrator");
    assert_eq!(body["data"]["approver2_name"], "Administrator");
}

#[tokio::test]
async fn employees_cannot_decide() {
    let app = spawn_app().await;
    seed_directory(&app).await;
    let employee = login(&app, "E1").await;

    let id = submit(&app, &employee, "2024-03-18", "19:30", "04:30").await;

    let (status, _) = decide(&app, &employee, id, "approve").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = decide(&app, &employee, 999_999, "approve").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn pending_queues_track_slots() {
    let app = spawn_app().await;
    let admin = seed_directory(&app).await;
    let employee = login(&app, "E1").await;
    let approver1 = login(&app, "A1").await;
    let approver2 = login(&app, "A2").await;

    let first = submit(&app, &employee, "2024-03-19", "19:30", "04:30").await;
    let second = submit(&app, &employee, "2024-03-20", "19:30", "04:30").await;

    // Both approvers start with the full queue; the admin sees everything
    // pending; the employee approves nothing.
    let (_, body) = send(&app, "GET", "/api/requests/pending", Some(&approver1), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    let (_, body) = send(&app, "GET", "/api/requests/pending", Some(&approver2), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    let (_, body) = send(&app, "GET", "/api/requests/pending", Some(&admin), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    let (_, body) = send(&app, "GET", "/api/requests/pending", Some(&employee), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    // approver1 signs the first request: it leaves their queue but stays in
    // approver2's, because that slot is still unresolved.
    let (status, _) = decide(&app, &approver1, first, "approve").await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, "GET", "/api/requests/pending", Some(&approver1), None).await;
    let ids: Vec<i64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![second]);

    let (_, body) = send(&app, "GET", "/api/requests/pending", Some(&approver2), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    // A terminal request leaves every queue.
    let (status, _) = decide(&app, &approver2, second, "reject").await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, "GET", "/api/requests/pending", Some(&approver1), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
    let (_, body) = send(&app, "GET", "/api/requests/pending", Some(&admin), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn owner_edits_and_deletes() {
    let app = spawn_app().await;
    let admin = seed_directory(&app).await;
    let employee = login(&app, "E1").await;
    let approver1 = login(&app, "A1").await;
    let approver2 = login(&app, "A2").await;

    let id = submit(&app, &employee, "2024-03-21", "19:30", "04:30").await;

    // Owner corrects the times while pending; duration is recomputed.
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/requests/{id}"),
        Some(&employee),
        Some(json!({
            "category_key": "shift2_offday",
            "date": "2024-03-21", "start_time": "20:00", "end_time": "02:00",
            "reason": "Shortened window"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["duration"], 6.0);

    // Nobody else may edit it.
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/requests/{id}"),
        Some(&approver1),
        Some(json!({
            "category_key": "shift2_offday",
            "date": "2024-03-21", "start_time": "20:00", "end_time": "02:00",
            "reason": "Not mine"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Once approved, the record is immutable and owner deletion is gone too.
    decide(&app, &approver1, id, "approve").await;
    decide(&app, &approver2, id, "approve").await;

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/requests/{id}"),
        Some(&employee),
        Some(json!({
            "category_key": "shift2_offday",
            "date": "2024-03-21", "start_time": "20:00", "end_time": "02:00",
            "reason": "Too late"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/requests/{id}"),
        Some(&employee),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The admin may still delete a terminal record.
    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/requests/{id}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // A fresh pending request can be withdrawn by its owner.
    let id = submit(&app, &employee, "2024-03-22", "19:30", "04:30").await;
    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/requests/{id}"),
        Some(&employee),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, "GET", "/api/requests/mine", Some(&employee), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn report_excludes_unapproved_hours() {
    let app = spawn_app().await;
    let admin = seed_directory(&app).await;
    let employee = login(&app, "E1").await;
    let approver1 = login(&app, "A1").await;
    let approver2 = login(&app, "A2").await;

    // 2.0 approved + 3.0 approved + 1.5 rejected inside the period.
    let submit_custom = |date: &'static str, start: &'static str, end: &'static str| {
        let app = app.clone();
        let cookie = employee.clone();
        async move {
            let (status, body) = send(
                &app,
                "POST",
                "/api/requests",
                Some(&cookie),
                Some(json!({
                    "category_key": "shift1_weekday",
                    "date": date, "start_time": start, "end_time": end,
                    "reason": "Reporting scenario"
                })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            body["data"]["id"].as_i64().unwrap()
        }
    };

    let first = submit_custom("2024-03-05", "10:00", "12:00").await;
    let second = submit_custom("2024-03-12", "10:00", "13:00").await;
    let third = submit_custom("2024-03-19", "10:00", "11:30").await;

    for id in [first, second] {
        decide(&app, &approver1, id, "approve").await;
        decide(&app, &approver2, id, "approve").await;
    }
    decide(&app, &approver1, third, "reject").await;

    // One request outside the period must not show up.
    let outside = submit_custom("2024-04-02", "10:00", "12:00").await;
    decide(&app, &admin, outside, "approve").await;

    let (status, body) = send(
        &app,
        "GET",
        "/api/reports?start=2024-03-01&end=2024-03-31",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let summaries = body["data"].as_array().unwrap();
    assert_eq!(summaries.len(), 1);
    let summary = &summaries[0];
    assert_eq!(summary["nik"], "E1");
    assert_eq!(summary["total_requests"], 3);
    assert_eq!(summary["approved_requests"], 2);
    assert_eq!(summary["rejected_requests"], 1);
    assert_eq!(summary["pending_requests"], 0);
    assert_eq!(summary["total_hours"], 5.0);

    // The overall statistics collapse to the same numbers.
    let (status, body) = send(
        &app,
        "GET",
        "/api/reports/statistics?start=2024-03-01&end=2024-03-31",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_requests"], 3);
    assert_eq!(body["data"]["total_hours"], 5.0);

    // An inverted period is a validation error.
    let (status, _) = send(
        &app,
        "GET",
        "/api/reports?start=2024-03-31&end=2024-03-01",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn stale_decision_guard_loses_the_race() {
    use lemburr::db::{DecisionGuard, DecisionWrite, Store};
    use lemburr::domain::ApprovalStatus;
    use lemburr::models::NewUser;
    use lemburr::services::{DirectoryService, RequestService, SubmitRequest};

    let store = Store::with_pool_options("sqlite::memory:", 1, 1)
        .await
        .expect("store");
    let directory = DirectoryService::new(store.clone());
    let requests = RequestService::new(store.clone());

    directory
        .create(&NewUser {
            nik: "E1".to_string(),
            name: "Employee One".to_string(),
            role: lemburr::domain::Role::Employee,
            approver1: None,
            approver2: None,
            pickup_point: None,
        })
        .await
        .expect("create employee");

    let request = requests
        .submit(
            "E1",
            &SubmitRequest {
                category_key: "shift2_offday".to_string(),
                date: "2024-03-15".to_string(),
                start_time: "19:30".to_string(),
                end_time: "04:30".to_string(),
                reason: "CAS scenario".to_string(),
            },
        )
        .await
        .expect("submit");

    let guard = DecisionGuard {
        approver1_status: ApprovalStatus::Pending,
        approver2_status: ApprovalStatus::Pending,
    };
    let write = DecisionWrite {
        status: ApprovalStatus::Pending,
        approver1_status: ApprovalStatus::Approved,
        approver2_status: ApprovalStatus::Pending,
        approver1_name: Some("First Approver".to_string()),
        approver2_name: None,
        approver1_approved_at: None,
        approver2_approved_at: None,
    };

    // The first writer lands.
    let applied = store
        .apply_decision(request.id.value(), guard, write.clone())
        .await
        .expect("apply");
    assert!(applied);

    // A second writer planned against the same snapshot misses the guard and
    // must not overwrite anything.
    let applied = store
        .apply_decision(request.id.value(), guard, write)
        .await
        .expect("apply");
    assert!(!applied);

    let reloaded = store
        .get_request(request.id.value())
        .await
        .expect("get")
        .expect("exists");
    assert_eq!(reloaded.approver1_status, ApprovalStatus::Approved);
    assert_eq!(reloaded.status, ApprovalStatus::Pending);
}
