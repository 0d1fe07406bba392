use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::instrument;

use tracker_core::{TrackerError, TrackerResult};
use tracker_domain::entities::{NewUser, User};
use tracker_domain::repositories::UserRepository;

/// SQLite implementation of UserRepository
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Hash password using bcrypt
    fn hash_password(password: &str) -> TrackerResult<String> {
        bcrypt::hash(password, bcrypt::DEFAULT_COST)
            .map_err(|e| TrackerError::Internal(format!("密码哈希失败: {e}")))
    }

    /// Verify password using bcrypt
    fn verify_password(password: &str, hash: &str) -> bool {
        bcrypt::verify(password, hash).unwrap_or(false)
    }

    fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> TrackerResult<User> {
        Ok(User {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            password_hash: row.try_get("password_hash")?,
            is_active: row.try_get("is_active")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    #[instrument(skip(self, new_user), fields(email = %new_user.email))]
    async fn create(&self, new_user: &NewUser) -> TrackerResult<User> {
        let password_hash = Self::hash_password(&new_user.password)?;
        let now = Utc::now();

        let row = sqlx::query(
            r#"
            INSERT INTO users (email, phone, password_hash, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, email, phone, password_hash, is_active, created_at, updated_at
            "#,
        )
        .bind(&new_user.email)
        .bind(&new_user.phone)
        .bind(&password_hash)
        .bind(true)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err)
                if db_err.message().contains("UNIQUE constraint failed") =>
            {
                TrackerError::DuplicateEmail(new_user.email.clone())
            }
            _ => TrackerError::Database(e),
        })?;

        Self::row_to_user(&row)
    }

    async fn find_by_id(&self, id: i64) -> TrackerResult<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, email, phone, password_hash, is_active, created_at, updated_at
            FROM users WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    async fn find_by_email(&self, email: &str) -> TrackerResult<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, email, phone, password_hash, is_active, created_at, updated_at
            FROM users WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    #[instrument(skip(self, password))]
    async fn verify_credentials(&self, email: &str, password: &str) -> TrackerResult<User> {
        let user = self
            .find_by_email(email)
            .await?
            .ok_or(TrackerError::InvalidCredentials)?;

        if !user.is_active {
            return Err(TrackerError::InvalidCredentials);
        }
        if !Self::verify_password(password, &user.password_hash) {
            return Err(TrackerError::InvalidCredentials);
        }
        Ok(user)
    }
}
