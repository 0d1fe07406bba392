use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use axum::Json;
use serde::Deserialize;

use crate::{
    error::ApiResult,
    response::{created, success, ApiResponse},
    routes::AppState,
};

/// 员工创建与更新请求
#[derive(Debug, Deserialize)]
pub struct EmployeeRequest {
    pub full_name: String,
    pub post: Option<String>,
}

pub async fn create_employee(
    State(state): State<AppState>,
    Json(request): Json<EmployeeRequest>,
) -> ApiResult<impl IntoResponse> {
    let employee = state
        .employee_service
        .create_employee(request.full_name, request.post)
        .await?;
    Ok(created(employee))
}

pub async fn list_employees(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let employees = state.employee_service.list_employees().await?;
    Ok(success(employees))
}

pub async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let employee = state.employee_service.get_employee(id).await?;
    Ok(success(employee))
}

pub async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<EmployeeRequest>,
) -> ApiResult<impl IntoResponse> {
    let employee = state
        .employee_service
        .update_employee(id, request.full_name, request.post)
        .await?;
    Ok(success(employee))
}

pub async fn delete_employee(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    state.employee_service.delete_employee(id).await?;
    Ok(Json(ApiResponse::success_empty_with_message(
        "员工已删除".to_string(),
    )))
}

/// 忙碌员工列表，按进行中任务数降序
pub async fn busy_employees(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let workloads = state.employee_service.busy_employees().await?;
    Ok(success(workloads))
}
