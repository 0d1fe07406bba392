//! # Tracker API
//!
//! 员工任务跟踪系统的REST API模块，基于Axum框架构建。
//!
//! ## API 端点
//!
//! ### 用户与认证
//! - `POST /api/users/register` - 注册用户
//! - `POST /api/auth/login` - 登录获取令牌
//! - `POST /api/auth/refresh` - 刷新令牌
//!
//! ### 员工管理
//! - `GET /api/employees` - 获取员工列表
//! - `POST /api/employees` - 创建员工
//! - `GET /api/employees/{id}` - 获取员工详情
//! - `POST /api/employees/{id}/update` - 更新员工
//! - `POST /api/employees/{id}/delete` - 删除员工
//! - `GET /api/employees/busy` - 忙碌员工列表（按负载降序）
//!
//! ### 任务管理
//! - `GET /api/tasks` - 获取任务列表
//! - `POST /api/tasks` - 创建任务
//! - `GET /api/tasks/{id}` - 获取任务详情
//! - `POST /api/tasks/{id}/update` - 更新任务
//! - `POST /api/tasks/{id}/delete` - 删除任务
//! - `GET /api/tasks/important` - 重要任务及候选员工
//!
//! ### 系统
//! - `GET /health` - 健康检查

pub mod auth;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;

use axum::Router;

pub use auth::{AuthenticatedUser, JwtService};
pub use error::{ApiError, ApiResult};
pub use response::ApiResponse;
pub use routes::AppState;

/// 创建完整的API应用，含CORS与请求追踪中间件
pub fn create_app(state: AppState) -> Router {
    routes::create_routes(state)
        .layer(middleware::trace_layer())
        .layer(middleware::cors_layer())
}
