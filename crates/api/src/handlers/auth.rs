use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use tracker_core::TrackerError;
use tracker_domain::entities::{NewUser, User};

use crate::{
    error::{ApiError, ApiResult},
    response::ApiResponse,
    routes::AppState,
};

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// 注册新用户
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<(axum::http::StatusCode, Json<ApiResponse<User>>)> {
    if !request.email.contains('@') {
        return Err(ApiError::BadRequest("邮箱格式无效".to_string()));
    }
    if request.password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest("密码长度不能少于8个字符".to_string()));
    }

    let user = state
        .user_repo
        .create(&NewUser {
            email: request.email,
            phone: request.phone,
            password: request.password,
        })
        .await?;

    info!("新用户注册: {}", user.email);
    Ok((
        axum::http::StatusCode::CREATED,
        Json(ApiResponse::success(user)),
    ))
}

/// 邮箱密码登录，返回访问令牌与刷新令牌
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<ApiResponse<TokenResponse>>> {
    let user = state
        .user_repo
        .verify_credentials(&request.email, &request.password)
        .await?;

    let response = issue_tokens(&state, &user)?;
    info!("用户登录成功: {}", user.email);
    Ok(Json(ApiResponse::success(response)))
}

/// 用刷新令牌换取新的令牌对
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> ApiResult<Json<ApiResponse<TokenResponse>>> {
    let claims = state.jwt.validate_refresh_token(&request.refresh_token)?;
    let user_id = claims
        .sub
        .parse::<i64>()
        .map_err(|_| crate::auth::AuthError::InvalidToken)?;

    let user = state
        .user_repo
        .find_by_id(user_id)
        .await?
        .filter(|u| u.is_active)
        .ok_or(TrackerError::InvalidCredentials)?;

    let response = issue_tokens(&state, &user)?;
    Ok(Json(ApiResponse::success(response)))
}

fn issue_tokens(state: &AppState, user: &User) -> Result<TokenResponse, ApiError> {
    let access_token = state
        .jwt
        .issue_access_token(user)
        .map_err(|e| ApiError::Internal(format!("令牌签发失败: {}", e)))?;
    let refresh_token = state
        .jwt
        .issue_refresh_token(user)
        .map_err(|e| ApiError::Internal(format!("令牌签发失败: {}", e)))?;

    Ok(TokenResponse {
        access_token,
        refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt.access_expires_in_seconds(),
    })
}
