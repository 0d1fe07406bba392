use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use headers::{authorization::Bearer, Authorization, HeaderMapExt};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::warn;

use tracker_core::AuthConfig;
use tracker_domain::entities::User;

pub const BEARER_PREFIX: &str = "Bearer ";

const SCOPE_ACCESS: &str = "access";
const SCOPE_REFRESH: &str = "refresh";

/// JWT载荷；sub为用户ID，scope区分访问令牌与刷新令牌
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
    pub scope: String,
}

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    ExpiredToken,
    WrongTokenScope,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingToken => write!(f, "Missing authentication token"),
            AuthError::InvalidToken => write!(f, "Invalid authentication token"),
            AuthError::ExpiredToken => write!(f, "Authentication token has expired"),
            AuthError::WrongTokenScope => write!(f, "Token scope not valid for this operation"),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<AuthError> for StatusCode {
    fn from(_: AuthError) -> Self {
        StatusCode::UNAUTHORIZED
    }
}

/// 通过认证中间件后注入请求扩展的当前用户
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: i64,
    pub email: String,
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_hours: i64,
    refresh_days: i64,
}

impl JwtService {
    pub fn new(secret: &str, access_hours: i64, refresh_days: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_ref()),
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
            access_hours,
            refresh_days,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            &config.jwt_secret,
            config.jwt_expiration_hours,
            config.refresh_expiration_days,
        )
    }

    pub fn access_expires_in_seconds(&self) -> i64 {
        self.access_hours * 3600
    }

    pub fn issue_access_token(&self, user: &User) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue(user, Duration::hours(self.access_hours), SCOPE_ACCESS)
    }

    pub fn issue_refresh_token(&self, user: &User) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue(user, Duration::days(self.refresh_days), SCOPE_REFRESH)
    }

    fn issue(
        &self,
        user: &User,
        lifetime: Duration,
        scope: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            exp: (now + lifetime).timestamp(),
            iat: now.timestamp(),
            scope: scope.to_string(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
    }

    pub fn validate_access_token(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = self.validate(token)?;
        if claims.scope != SCOPE_ACCESS {
            return Err(AuthError::WrongTokenScope);
        }
        Ok(claims)
    }

    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = self.validate(token)?;
        if claims.scope != SCOPE_REFRESH {
            return Err(AuthError::WrongTokenScope);
        }
        Ok(claims)
    }

    fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::InvalidToken,
            })
    }
}

pub async fn auth_middleware(
    State(state): State<crate::routes::AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = extract_bearer_token(&req).ok_or_else(|| {
        warn!("请求缺少认证令牌: {}", req.uri().path());
        StatusCode::UNAUTHORIZED
    })?;

    match state.jwt.validate_access_token(&token) {
        Ok(claims) => {
            let user_id = claims
                .sub
                .parse::<i64>()
                .map_err(|_| StatusCode::UNAUTHORIZED)?;
            req.extensions_mut().insert(AuthenticatedUser {
                user_id,
                email: claims.email,
            });
            Ok(next.run(req).await)
        }
        Err(err) => {
            warn!("认证失败: {}", err);
            Err(err.into())
        }
    }
}

fn extract_bearer_token(req: &Request) -> Option<String> {
    req.headers()
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string())
        .or_else(|| {
            req.headers()
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .filter(|s| s.starts_with(BEARER_PREFIX))
                .map(|s| s[BEARER_PREFIX.len()..].to_string())
        })
}
