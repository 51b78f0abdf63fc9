use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`

use crate::{app::build_app, state::AppState};

fn setup_app() -> Router {
    build_app(AppState::fake())
}

async fn call(
    app: &Router,
    method: Method,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut req = Request::builder()
        .method(method)
        .uri(format!("/rpc/{path}"))
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty);
    let res = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
    let status = res.status();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn post(app: &Router, path: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
    call(app, Method::POST, path, token, Some(body)).await
}

async fn sign_up(app: &Router, username: &str, email: &str) -> (i64, String) {
    let (status, body) = post(
        app,
        "signUp",
        None,
        json!({ "username": username, "email": email, "password": "password123" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    (
        body["user"]["id"].as_i64().unwrap(),
        body["token"].as_str().unwrap().to_string(),
    )
}

#[tokio::test]
async fn healthcheck_is_public() {
    let app = setup_app();
    let (status, body) = call(&app, Method::GET, "healthcheck", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].as_str().is_some());
}

#[tokio::test]
async fn sign_up_response_has_no_password_hash() {
    let app = setup_app();
    let (status, body) = post(
        &app,
        "signUp",
        None,
        json!({ "username": "testuser", "email": "test@example.com", "password": "password123" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "testuser");
    assert!(body["user"].get("password_hash").is_none());
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn sign_up_conflicts_and_validation() {
    let app = setup_app();
    sign_up(&app, "testuser", "test@example.com").await;

    let (status, body) = post(
        &app,
        "signUp",
        None,
        json!({ "username": "testuser", "email": "other@example.com", "password": "password123" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["field"], "username");

    let (status, body) = post(
        &app,
        "signUp",
        None,
        json!({ "username": "otheruser", "email": "test@example.com", "password": "password123" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["message"], "email already exists");

    let (status, body) = post(
        &app,
        "signUp",
        None,
        json!({ "username": "shortpw", "email": "s@example.com", "password": "12345" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["field"], "password");
}

#[tokio::test]
async fn sign_in_messages_do_not_leak_which_part_failed() {
    let app = setup_app();
    sign_up(&app, "testuser", "test@example.com").await;

    let (ok, body) = post(
        &app,
        "signIn",
        None,
        json!({ "email": "test@example.com", "password": "password123" }),
    )
    .await;
    assert_eq!(ok, StatusCode::OK);
    assert_eq!(body["user"]["email"], "test@example.com");

    let (s1, wrong_pw) = post(
        &app,
        "signIn",
        None,
        json!({ "email": "test@example.com", "password": "nope" }),
    )
    .await;
    let (s2, unknown) = post(
        &app,
        "signIn",
        None,
        json!({ "email": "ghost@example.com", "password": "password123" }),
    )
    .await;
    assert_eq!(s1, StatusCode::UNAUTHORIZED);
    assert_eq!(s2, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_pw, unknown);
    assert_eq!(wrong_pw["error"]["message"], "invalid email or password");
    assert_eq!(wrong_pw["error"]["code"], "AUTHENTICATION_ERROR");
}

#[tokio::test]
async fn protected_procedures_require_a_valid_token() {
    let app = setup_app();
    for path in ["createTask", "getTasks", "getTask", "updateTask", "deleteTask"] {
        let (status, body) = post(&app, path, None, json!({ "id": 1, "title": "x" })).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{path}");
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");

        let (status, _) = post(&app, path, Some("garbage"), json!({ "id": 1, "title": "x" })).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{path}");
    }
}

#[tokio::test]
async fn bad_token_is_rejected_before_payload_validation() {
    let app = setup_app();
    let (status, _) = post(&app, "createTask", Some("garbage"), json!({ "title": "" })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn task_lifecycle() {
    let app = setup_app();
    let (user_id, token) = sign_up(&app, "testuser", "test@example.com").await;
    let token = Some(token.as_str());

    let (status, task) = post(
        &app,
        "createTask",
        token,
        json!({ "title": "Test Task", "description": "A task for testing", "due_date": "2024-12-31" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{task}");
    assert_eq!(task["title"], "Test Task");
    assert_eq!(task["description"], "A task for testing");
    assert_eq!(task["due_date"], "2024-12-31T00:00:00Z");
    assert_eq!(task["completed"], false);
    assert_eq!(task["user_id"], user_id);
    assert!(task["created_at"].is_string());
    let id = task["id"].as_i64().unwrap();

    let (status, fetched) = post(&app, "getTask", token, json!({ "id": id })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, task);

    let (status, updated) = post(
        &app,
        "updateTask",
        token,
        json!({ "id": id, "completed": true, "description": null }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["completed"], true);
    assert!(updated["description"].is_null());
    assert_eq!(updated["title"], "Test Task");
    assert_eq!(updated["created_at"], task["created_at"]);

    let (status, list) = call(&app, Method::GET, "getTasks", token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (_, deleted) = post(&app, "deleteTask", token, json!({ "id": id })).await;
    assert_eq!(deleted, json!({ "success": true }));
    let (status, again) = post(&app, "deleteTask", token, json!({ "id": id })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again, json!({ "success": false }));
}

#[tokio::test]
async fn other_users_tasks_are_invisible() {
    let app = setup_app();
    let (_, owner) = sign_up(&app, "owner", "owner@example.com").await;
    let (_, intruder) = sign_up(&app, "intruder", "intruder@example.com").await;

    let (_, task) = post(&app, "createTask", Some(&owner), json!({ "title": "secret" })).await;
    let id = task["id"].as_i64().unwrap();

    let (s_foreign, foreign) = post(&app, "getTask", Some(&intruder), json!({ "id": id })).await;
    let (s_missing, missing) = post(&app, "getTask", Some(&intruder), json!({ "id": id + 100 })).await;
    assert_eq!(s_foreign, StatusCode::NOT_FOUND);
    assert_eq!((s_foreign, &foreign), (s_missing, &missing));

    let (s_upd, upd) = post(
        &app,
        "updateTask",
        Some(&intruder),
        json!({ "id": id, "title": "mine now" }),
    )
    .await;
    assert_eq!(s_upd, StatusCode::NOT_FOUND);
    assert_eq!(upd, missing);

    let (_, del) = post(&app, "deleteTask", Some(&intruder), json!({ "id": id })).await;
    assert_eq!(del, json!({ "success": false }));

    let (_, list) = call(&app, Method::GET, "getTasks", Some(&intruder), None).await;
    assert_eq!(list, json!([]));

    let (_, still) = post(&app, "getTask", Some(&owner), json!({ "id": id })).await;
    assert_eq!(still["title"], "secret");
}

#[tokio::test]
async fn invalid_payloads_name_the_field() {
    let app = setup_app();
    let (_, token) = sign_up(&app, "testuser", "test@example.com").await;
    let token = Some(token.as_str());

    let cases = [
        ("createTask", json!({}), "title"),
        ("createTask", json!({ "title": "" }), "title"),
        ("createTask", json!({ "title": "x".repeat(201) }), "title"),
        ("createTask", json!({ "title": "ok", "due_date": "soon" }), "due_date"),
        ("getTask", json!({ "id": "one" }), "id"),
        ("updateTask", json!({ "id": 1, "completed": "yes" }), "completed"),
        ("updateTask", json!({ "id": 1, "title": null }), "title"),
        ("deleteTask", json!({}), "id"),
    ];
    for (path, body, field) in cases {
        let (status, res) = post(&app, path, token, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{path}: {res}");
        assert_eq!(res["error"]["field"], field, "{path}: {res}");
    }
}

#[tokio::test]
async fn due_dates_come_back_in_utc() {
    let app = setup_app();
    let (_, token) = sign_up(&app, "testuser", "test@example.com").await;
    let (status, task) = post(
        &app,
        "createTask",
        Some(&token),
        json!({ "title": "offset", "due_date": "2024-12-31T15:30:00+02:00" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{task}");
    assert_eq!(task["due_date"], "2024-12-31T13:30:00Z");
}
