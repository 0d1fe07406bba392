use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use tracker_domain::repositories::UserRepository;
use tracker_domain::services::{EmployeeService, TaskService};

use crate::auth::{auth_middleware, JwtService};
use crate::handlers::{
    auth::{login, refresh_token, register},
    employees::{
        busy_employees, create_employee, delete_employee, get_employee, list_employees,
        update_employee,
    },
    health::health_check,
    tasks::{create_task, delete_task, get_task, important_tasks, list_tasks, update_task},
};

/// API应用状态
#[derive(Clone)]
pub struct AppState {
    pub task_service: Arc<TaskService>,
    pub employee_service: Arc<EmployeeService>,
    pub user_repo: Arc<dyn UserRepository>,
    pub jwt: Arc<JwtService>,
}

/// 创建API路由；除健康检查与注册登录外均需JWT认证
pub fn create_routes(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health_check))
        .route("/api/users/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/refresh", post(refresh_token));

    let protected = Router::new()
        // 员工管理API
        .route("/api/employees", get(list_employees).post(create_employee))
        .route("/api/employees/busy", get(busy_employees))
        .route("/api/employees/{id}", get(get_employee))
        .route("/api/employees/{id}/update", post(update_employee))
        .route("/api/employees/{id}/delete", post(delete_employee))
        // 任务管理API
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route("/api/tasks/important", get(important_tasks))
        .route("/api/tasks/{id}", get(get_task))
        .route("/api/tasks/{id}/update", post(update_task))
        .route("/api/tasks/{id}/delete", post(delete_task))
        .layer(from_fn_with_state(state.clone(), auth_middleware));

    public.merge(protected).with_state(state)
}
