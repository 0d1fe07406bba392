use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use tracker_api::{create_app, AppState, JwtService};
use tracker_domain::services::{EmployeeService, TaskService};
use tracker_infrastructure::{
    DatabaseManager, SqliteEmployeeRepository, SqliteTaskRepository, SqliteUserRepository,
};

async fn test_app() -> Router {
    let manager = DatabaseManager::new_in_memory().await.unwrap();
    manager.migrate().await.unwrap();

    let task_repo = Arc::new(SqliteTaskRepository::new(manager.pool().clone()));
    let employee_repo = Arc::new(SqliteEmployeeRepository::new(manager.pool().clone()));
    let user_repo = Arc::new(SqliteUserRepository::new(manager.pool().clone()));

    let state = AppState {
        task_service: Arc::new(TaskService::new(task_repo, employee_repo.clone())),
        employee_service: Arc::new(EmployeeService::new(employee_repo)),
        user_repo,
        jwt: Arc::new(JwtService::new("integration-test-secret", 24, 30)),
    };
    create_app(state)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn authed_request(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"));
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn register_and_login(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/users/register",
            json!({"email": "tester@example.com", "password": "password123"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            json!({"email": "tester@example.com", "password": "password123"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    body["data"]["access_token"].as_str().unwrap().to_string()
}

async fn create_employee(app: &Router, token: &str, full_name: &str) -> i64 {
    let response = app
        .clone()
        .oneshot(authed_request(
            "POST",
            "/api/employees",
            token,
            Some(json!({"full_name": full_name})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    response_json(response).await["data"]["id"].as_i64().unwrap()
}

async fn create_task(app: &Router, token: &str, body: Value) -> Value {
    let response = app
        .clone()
        .oneshot(authed_request("POST", "/api/tasks", token, Some(body)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    response_json(response).await["data"].clone()
}

#[tokio::test]
async fn test_health_check_is_public() {
    let app = test_app().await;
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = test_app().await;
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/tasks")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_with_wrong_password_rejected() {
    let app = test_app().await;
    register_and_login(&app).await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            json!({"email": "tester@example.com", "password": "wrong-password"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_rejects_short_password() {
    let app = test_app().await;
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/users/register",
            json!({"email": "weak@example.com", "password": "short"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = test_app().await;
    register_and_login(&app).await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/users/register",
            json!({"email": "tester@example.com", "password": "password123"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_refresh_token_flow() {
    let app = test_app().await;
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/users/register",
            json!({"email": "tester@example.com", "password": "password123"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            json!({"email": "tester@example.com", "password": "password123"}),
        ))
        .await
        .unwrap();
    let body = response_json(response).await;
    let refresh = body["data"]["refresh_token"].as_str().unwrap().to_string();
    let access = body["data"]["access_token"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/refresh",
            json!({"refresh_token": refresh}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert!(body["data"]["access_token"].is_string());

    // 访问令牌不能当作刷新令牌使用
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/refresh",
            json!({"refresh_token": access}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_task_crud_flow() {
    let app = test_app().await;
    let token = register_and_login(&app).await;

    let task = create_task(
        &app,
        &token,
        json!({"name": "Prepare quarterly report", "deadline": "2026-09-30"}),
    )
    .await;
    let id = task["id"].as_i64().unwrap();
    assert_eq!(task["status"], "start");

    let response = app
        .clone()
        .oneshot(authed_request(
            "GET",
            &format!("/api/tasks/{id}"),
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(authed_request(
            "POST",
            &format!("/api/tasks/{id}/update"),
            &token,
            Some(json!({"name": "Prepare quarterly report", "status": "finish"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["status"], "finish");

    let response = app
        .clone()
        .oneshot(authed_request(
            "POST",
            &format!("/api/tasks/{id}/delete"),
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(authed_request(
            "GET",
            &format!("/api/tasks/{id}"),
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_task_name_validation_and_uniqueness() {
    let app = test_app().await;
    let token = register_and_login(&app).await;

    let response = app
        .clone()
        .oneshot(authed_request(
            "POST",
            "/api/tasks",
            &token,
            Some(json!({"name": "Bad <name>!!"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    create_task(&app, &token, json!({"name": "unique task"})).await;
    let response = app
        .oneshot(authed_request(
            "POST",
            "/api/tasks",
            &token,
            Some(json!({"name": "unique task"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_important_tasks_with_candidates() {
    let app = test_app().await;
    let token = register_and_login(&app).await;

    create_employee(&app, &token, "Alice").await;
    let bob = create_employee(&app, &token, "Bob").await;
    let carol = create_employee(&app, &token, "Carol").await;

    // Bob已有一个进行中的任务，Alice空闲
    create_task(&app, &token, json!({"name": "bob busy work", "employee_id": bob})).await;

    // 未分配的父任务，其子任务由Carol执行
    let parent = create_task(&app, &token, json!({"name": "stuck parent"})).await;
    let parent_id = parent["id"].as_i64().unwrap();
    create_task(
        &app,
        &token,
        json!({"name": "stuck child", "parent_task_id": parent_id, "employee_id": carol}),
    )
    .await;

    let response = app
        .oneshot(authed_request("GET", "/api/tasks/important", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    let items = body["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"].as_i64().unwrap(), parent_id);

    // 响应携带序列化后的直接子任务
    let subtasks = items[0]["tasks"].as_array().unwrap();
    assert_eq!(subtasks.len(), 1);
    assert_eq!(subtasks[0]["name"], "stuck child");

    // 最少负载的是Alice（0个任务），Carol作为子任务执行人追加
    let names: Vec<&str> = items[0]["available_employees"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Alice", "Carol"]);
}

#[tokio::test]
async fn test_busy_employees_ordering() {
    let app = test_app().await;
    let token = register_and_login(&app).await;

    let light = create_employee(&app, &token, "Light").await;
    let heavy = create_employee(&app, &token, "Heavy").await;
    create_employee(&app, &token, "Idle").await;

    create_task(&app, &token, json!({"name": "l1", "employee_id": light})).await;
    create_task(&app, &token, json!({"name": "h1", "employee_id": heavy})).await;
    create_task(&app, &token, json!({"name": "h2", "employee_id": heavy})).await;

    let response = app
        .oneshot(authed_request("GET", "/api/employees/busy", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    let items = body["data"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["employee"]["full_name"], "Heavy");
    assert_eq!(items[0]["active_tasks_count"], 2);
    assert_eq!(items[1]["employee"]["full_name"], "Light");
}

#[tokio::test]
async fn test_employee_crud_flow() {
    let app = test_app().await;
    let token = register_and_login(&app).await;

    let id = create_employee(&app, &token, "Ivan Petrov").await;

    let response = app
        .clone()
        .oneshot(authed_request(
            "POST",
            &format!("/api/employees/{id}/update"),
            &token,
            Some(json!({"full_name": "Ivan Petrov", "post": "Senior Engineer"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["post"], "Senior Engineer");

    let response = app
        .clone()
        .oneshot(authed_request(
            "POST",
            &format!("/api/employees/{id}/delete"),
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(authed_request(
            "GET",
            &format!("/api/employees/{id}"),
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_task_with_unknown_employee_rejected() {
    let app = test_app().await;
    let token = register_and_login(&app).await;

    let response = app
        .oneshot(authed_request(
            "POST",
            "/api/tasks",
            &token,
            Some(json!({"name": "orphan task", "employee_id": 999})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
