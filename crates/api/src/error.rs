use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use tracker_core::TrackerError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("业务错误: {0}")]
    Tracker(#[from] TrackerError),

    #[error("认证错误: {0}")]
    Authentication(#[from] crate::auth::AuthError),

    #[error("请求参数错误: {0}")]
    BadRequest(String),

    #[error("内部服务器错误: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message, error_type, suggestions) = match &self {
            ApiError::Tracker(TrackerError::TaskNotFound { id }) => (
                StatusCode::NOT_FOUND,
                format!("任务 ID {} 不存在", id),
                "TASK_NOT_FOUND".to_string(),
                vec![
                    "请检查任务ID是否正确".to_string(),
                    "使用 GET /api/tasks 查看所有任务".to_string(),
                ],
            ),
            ApiError::Tracker(TrackerError::EmployeeNotFound { id }) => (
                StatusCode::NOT_FOUND,
                format!("员工 ID {} 不存在", id),
                "EMPLOYEE_NOT_FOUND".to_string(),
                vec![
                    "请检查员工ID是否正确".to_string(),
                    "使用 GET /api/employees 查看所有员工".to_string(),
                ],
            ),
            ApiError::Tracker(TrackerError::UserNotFound { email }) => (
                StatusCode::NOT_FOUND,
                format!("用户 {} 不存在", email),
                "USER_NOT_FOUND".to_string(),
                vec!["请检查邮箱是否正确".to_string()],
            ),
            ApiError::Tracker(TrackerError::InvalidTaskName(msg)) => (
                StatusCode::BAD_REQUEST,
                format!("任务名称无效: {}", msg),
                "INVALID_TASK_NAME".to_string(),
                vec![
                    "名称仅允许字母、数字、空格及 . , - 字符".to_string(),
                    "名称长度不能超过100个字符".to_string(),
                ],
            ),
            ApiError::Tracker(TrackerError::DuplicateTaskName(name)) => (
                StatusCode::CONFLICT,
                format!("任务名称 '{}' 已存在", name),
                "DUPLICATE_TASK_NAME".to_string(),
                vec!["任务名称必须唯一，请换一个名称".to_string()],
            ),
            ApiError::Tracker(TrackerError::DuplicateEmail(email)) => (
                StatusCode::CONFLICT,
                format!("邮箱 '{}' 已被注册", email),
                "DUPLICATE_EMAIL".to_string(),
                vec!["请使用其他邮箱，或直接登录".to_string()],
            ),
            ApiError::Tracker(TrackerError::InvalidReference(msg)) => (
                StatusCode::BAD_REQUEST,
                format!("引用无效: {}", msg),
                "INVALID_REFERENCE".to_string(),
                vec![
                    "请确认引用的员工或父任务存在".to_string(),
                    "父任务不能形成循环".to_string(),
                ],
            ),
            ApiError::Tracker(TrackerError::ValidationError(msg)) => (
                StatusCode::BAD_REQUEST,
                format!("请求参数验证失败: {}", msg),
                "VALIDATION_ERROR".to_string(),
                vec!["请检查请求参数是否符合要求".to_string()],
            ),
            ApiError::Tracker(TrackerError::InvalidCredentials) => (
                StatusCode::UNAUTHORIZED,
                "邮箱或密码错误".to_string(),
                "INVALID_CREDENTIALS".to_string(),
                vec![
                    "请检查邮箱和密码".to_string(),
                    "使用 POST /api/users/register 注册新账号".to_string(),
                ],
            ),
            ApiError::Authentication(err) => (
                StatusCode::UNAUTHORIZED,
                format!("认证失败: {}", err),
                "AUTHENTICATION_ERROR".to_string(),
                vec![
                    "请在请求头中添加 Authorization: Bearer <token>".to_string(),
                    "使用 POST /api/auth/login 获取令牌".to_string(),
                ],
            ),
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                format!("请求参数错误: {}", msg),
                "BAD_REQUEST".to_string(),
                vec!["请检查请求格式和参数".to_string()],
            ),
            ApiError::Tracker(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "系统内部错误".to_string(),
                "INTERNAL_ERROR".to_string(),
                vec![
                    "系统遇到内部错误，请稍后重试".to_string(),
                    "查看 GET /health 检查系统状态".to_string(),
                ],
            ),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "系统内部错误".to_string(),
                "INTERNAL_ERROR".to_string(),
                vec![
                    "系统遇到内部错误，请稍后重试".to_string(),
                    format!("错误详情: {}", msg),
                ],
            ),
        };

        let body = Json(json!({
            "error": {
                "message": error_message,
                "type": error_type,
                "code": status.as_u16(),
                "suggestions": suggestions,
                "timestamp": chrono::Utc::now().to_rfc3339(),
            }
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
