use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use tracker_domain::entities::TaskStatus;
use tracker_domain::services::TaskDraft;

use crate::{
    error::ApiResult,
    response::{created, success, ApiResponse},
    routes::AppState,
};

/// 任务创建与全量更新请求
#[derive(Debug, Deserialize)]
pub struct TaskRequest {
    pub name: String,
    pub parent_task_id: Option<i64>,
    pub employee_id: Option<i64>,
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
}

impl TaskRequest {
    fn into_draft(self) -> TaskDraft {
        TaskDraft {
            name: self.name,
            parent_task_id: self.parent_task_id,
            employee_id: self.employee_id,
            deadline: self.deadline,
            status: self.status.unwrap_or(TaskStatus::Open),
        }
    }
}

pub async fn create_task(
    State(state): State<AppState>,
    Json(request): Json<TaskRequest>,
) -> ApiResult<impl IntoResponse> {
    let task = state.task_service.create_task(request.into_draft()).await?;
    Ok(created(task))
}

pub async fn list_tasks(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let tasks = state.task_service.list_tasks().await?;
    Ok(success(tasks))
}

pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let task = state.task_service.get_task(id).await?;
    Ok(success(task))
}

pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<TaskRequest>,
) -> ApiResult<impl IntoResponse> {
    let task = state
        .task_service
        .update_task(id, request.into_draft())
        .await?;
    Ok(success(task))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    state.task_service.delete_task(id).await?;
    Ok(Json(ApiResponse::success_empty_with_message(
        "任务已删除".to_string(),
    )))
}

/// 重要任务列表，附带推荐的候选员工姓名
pub async fn important_tasks(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let tasks = state.task_service.important_tasks().await?;
    Ok(success(tasks))
}
