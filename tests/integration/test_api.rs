//! REST API integration tests: auth, role guards, CRUD, enrollment, and
//! the week-view endpoint, driven through the full router.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use rota::api::{create_rest_router, ApiState, RestApiConfig};
use rota::auth::SessionRegistry;
use rota::schedule::{LectureManager, TimeWindow};
use rota::store::{MemoryLectureStore, MemoryUserStore};
use rota::users::{CreateUser, Role, UserManager};

async fn setup() -> Router {
    let users = UserManager::new(Arc::new(MemoryUserStore::new()));
    for (username, role) in [
        ("admin", Role::Admin),
        ("teacher", Role::Teacher),
        ("student", Role::Student),
        ("student2", Role::Student),
    ] {
        users
            .create(CreateUser {
                username: username.to_string(),
                email: format!("{}@edu.example", username),
                name: None,
                password: format!("{}-pass", username),
                role,
            })
            .await
            .unwrap();
    }

    let state = Arc::new(ApiState::new(
        LectureManager::new(Arc::new(MemoryLectureStore::new())),
        users,
        Arc::new(SessionRegistry::new(3600, true)),
        TimeWindow::default(),
        4.0,
    ));

    create_rest_router(state, &RestApiConfig::default())
}

async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Token {}", token));
    }
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&value).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
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

async fn login(router: &Router, username: &str) -> String {
    let (status, body) = send(
        router,
        Method::POST,
        "/auth/token",
        None,
        Some(json!({ "username": username, "password": format!("{}-pass", username) })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body["token"].as_str().unwrap().to_string()
}

fn lecture_body(title: &str, day: u8, start: &str, end: &str) -> Value {
    json!({
        "title": title,
        "description": "integration test lecture",
        "day_of_week": day,
        "start_time": start,
        "end_time": end,
        "max_students": 30,
    })
}

#[tokio::test]
async fn health_is_public() {
    let router = setup().await;
    let (status, body) = send(&router, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let router = setup().await;
    let (status, _) = send(&router, Method::GET, "/api/lectures", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&router, Method::GET, "/api/lectures", Some("bogus"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_me_logout_round_trip() {
    let router = setup().await;

    let (status, _) = send(
        &router,
        Method::POST,
        "/auth/token",
        None,
        Some(json!({ "username": "student", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = login(&router, "student").await;

    let (status, body) = send(&router, Method::GET, "/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "student");
    assert_eq!(body["role"], "student");

    let (status, _) = send(&router, Method::POST, "/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&router, Method::GET, "/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn lecture_crud_respects_roles() {
    let router = setup().await;
    let teacher = login(&router, "teacher").await;
    let student = login(&router, "student").await;

    // Students cannot create lectures.
    let (status, _) = send(
        &router,
        Method::POST,
        "/api/lectures",
        Some(&student),
        Some(lecture_body("Sneaky", 1, "09:00", "10:00")),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Teachers can.
    let (status, created) = send(
        &router,
        Method::POST,
        "/api/lectures",
        Some(&teacher),
        Some(lecture_body("Algorithms", 1, "09:00", "10:30")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["start_time"], "09:00");

    // Anyone authenticated can read.
    let (status, fetched) = send(
        &router,
        Method::GET,
        &format!("/api/lectures/{}", id),
        Some(&student),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["title"], "Algorithms");

    // Patch, then delete.
    let (status, patched) = send(
        &router,
        Method::PATCH,
        &format!("/api/lectures/{}", id),
        Some(&teacher),
        Some(json!({ "title": "Advanced Algorithms" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["title"], "Advanced Algorithms");

    let (status, _) = send(
        &router,
        Method::DELETE,
        &format!("/api/lectures/{}", id),
        Some(&teacher),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &router,
        Method::GET,
        &format!("/api/lectures/{}", id),
        Some(&student),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_interval_is_rejected() {
    let router = setup().await;
    let teacher = login(&router, "teacher").await;

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/lectures",
        Some(&teacher),
        Some(lecture_body("Backwards", 1, "10:00", "09:00")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_schedule");
}

#[tokio::test]
async fn seconds_are_discarded_from_times() {
    let router = setup().await;
    let teacher = login(&router, "teacher").await;

    let (status, created) = send(
        &router,
        Method::POST,
        "/api/lectures",
        Some(&teacher),
        Some(lecture_body("Precise", 2, "09:00:00", "10:30:59")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["start_time"], "09:00");
    assert_eq!(created["end_time"], "10:30");
}

#[tokio::test]
async fn enrollment_flow_enforces_capacity() {
    let router = setup().await;
    let teacher = login(&router, "teacher").await;
    let student = login(&router, "student").await;
    let student2 = login(&router, "student2").await;

    let mut body = lecture_body("Tiny Seminar", 3, "14:00", "15:00");
    body["max_students"] = json!(1);
    let (_, created) = send(&router, Method::POST, "/api/lectures", Some(&teacher), Some(body)).await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, response) = send(
        &router,
        Method::POST,
        &format!("/api/lectures/{}/enroll", id),
        Some(&student),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(response["message"].as_str().unwrap().contains("Tiny Seminar"));

    // Enrolling twice conflicts.
    let (status, response) = send(
        &router,
        Method::POST,
        &format!("/api/lectures/{}/enroll", id),
        Some(&student),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(response["code"], "already_enrolled");

    // The seminar only holds one student.
    let (status, response) = send(
        &router,
        Method::POST,
        &format!("/api/lectures/{}/enroll", id),
        Some(&student2),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(response["code"], "lecture_full");

    let (status, _) = send(
        &router,
        Method::POST,
        &format!("/api/lectures/{}/unenroll", id),
        Some(&student),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, response) = send(
        &router,
        Method::POST,
        &format!("/api/lectures/{}/unenroll", id),
        Some(&student),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(response["code"], "not_enrolled");
}

#[tokio::test]
async fn user_management_is_admin_only() {
    let router = setup().await;
    let admin = login(&router, "admin").await;
    let teacher = login(&router, "teacher").await;

    let (status, _) = send(&router, Method::GET, "/api/users", Some(&teacher), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, listed) = send(&router, Method::GET, "/api/users", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["total"], 4);

    let (status, created) = send(
        &router,
        Method::POST,
        "/api/users",
        Some(&admin),
        Some(json!({
            "username": "newbie",
            "email": "newbie@edu.example",
            "password": "newbie-pass",
            "role": "student",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let new_id = created["id"].as_str().unwrap().to_string();

    // Usernames are unique.
    let (status, body) = send(
        &router,
        Method::POST,
        "/api/users",
        Some(&admin),
        Some(json!({
            "username": "newbie",
            "email": "other@edu.example",
            "password": "pw",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "duplicate_username");

    let (status, patched) = send(
        &router,
        Method::PATCH,
        &format!("/api/users/{}", new_id),
        Some(&admin),
        Some(json!({ "role": "teacher" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["role"], "teacher");

    let (status, _) = send(
        &router,
        Method::DELETE,
        &format!("/api/users/{}", new_id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn week_view_returns_laid_out_geometry() {
    let router = setup().await;
    let teacher = login(&router, "teacher").await;

    // Two overlapping Monday lectures and one isolated Tuesday lecture.
    let (_, a) = send(
        &router,
        Method::POST,
        "/api/lectures",
        Some(&teacher),
        Some(lecture_body("Mon A", 1, "09:00", "10:00")),
    )
    .await;
    let (_, b) = send(
        &router,
        Method::POST,
        "/api/lectures",
        Some(&teacher),
        Some(lecture_body("Mon B", 1, "09:30", "10:30")),
    )
    .await;
    send(
        &router,
        Method::POST,
        "/api/lectures",
        Some(&teacher),
        Some(lecture_body("Tue Solo", 2, "11:00", "12:00")),
    )
    .await;

    let (status, week) = send(
        &router,
        Method::GET,
        "/api/schedule/week?date=2026-08-06",
        Some(&teacher),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(week["week_start"], "2026-08-03");
    assert_eq!(week["previous_week"], "2026-07-27");
    assert_eq!(week["next_week"], "2026-08-10");
    assert_eq!(week["window"]["start"], "08:00");
    assert_eq!(week["window"]["hour_marks"].as_array().unwrap().len(), 12);
    assert_eq!(week["units_per_hour"], 4.0);

    let days = week["days"].as_array().unwrap();
    assert_eq!(days.len(), 7);

    let monday = &days[0];
    assert_eq!(monday["day_of_week"], 1);
    let monday_lectures = monday["lectures"].as_array().unwrap();
    assert_eq!(monday_lectures.len(), 2);

    // Ordered by start time: a before b, split 45/45 at 5 and 50.
    let first = &monday_lectures[0];
    let second = &monday_lectures[1];
    assert_eq!(first["lecture"]["id"], a["id"]);
    assert_eq!(second["lecture"]["id"], b["id"]);
    assert_eq!(first["geometry"]["width_percent"], 45.0);
    assert_eq!(first["geometry"]["left_percent"], 5.0);
    assert_eq!(second["geometry"]["width_percent"], 45.0);
    assert_eq!(second["geometry"]["left_percent"], 50.0);
    // 09:00 in an 08:00 window at 4 units/hour.
    assert_eq!(first["geometry"]["top_offset"], 4.0);
    assert_eq!(first["geometry"]["height"], 4.0);

    let tuesday = &days[1];
    let tuesday_lectures = tuesday["lectures"].as_array().unwrap();
    assert_eq!(tuesday_lectures.len(), 1);
    assert_eq!(tuesday_lectures[0]["geometry"]["width_percent"], 90.0);
    assert_eq!(tuesday_lectures[0]["geometry"]["left_percent"], 5.0);
}
