use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::{debug, instrument};

use tracker_core::{TrackerError, TrackerResult};
use tracker_domain::entities::Task;
use tracker_domain::repositories::TaskRepository;

pub struct SqliteTaskRepository {
    pool: SqlitePool,
}

const TASK_COLUMNS: &str =
    "id, name, parent_task_id, employee_id, deadline, status, created_at, updated_at";

impl SqliteTaskRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_task(row: &sqlx::sqlite::SqliteRow) -> TrackerResult<Task> {
        Ok(Task {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            parent_task_id: row.try_get("parent_task_id")?,
            employee_id: row.try_get("employee_id")?,
            deadline: row.try_get("deadline")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    /// 把SQLite约束冲突映射为领域错误
    fn map_constraint_error(task_name: &str, err: sqlx::Error) -> TrackerError {
        if let sqlx::Error::Database(ref db_err) = err {
            let message = db_err.message();
            if message.contains("UNIQUE constraint failed") && message.contains("tasks.name") {
                return TrackerError::DuplicateTaskName(task_name.to_string());
            }
            if message.contains("FOREIGN KEY constraint failed") {
                return TrackerError::invalid_reference("父任务或执行人不存在");
            }
        }
        TrackerError::Database(err)
    }
}

#[async_trait]
impl TaskRepository for SqliteTaskRepository {
    #[instrument(skip(self, task), fields(task_name = %task.name))]
    async fn create(&self, task: &Task) -> TrackerResult<Task> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO tasks (name, parent_task_id, employee_id, deadline, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(&task.name)
        .bind(task.parent_task_id)
        .bind(task.employee_id)
        .bind(task.deadline)
        .bind(task.status)
        .bind(task.created_at)
        .bind(task.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Self::map_constraint_error(&task.name, e))?;

        let created = Self::row_to_task(&row)?;
        debug!("已创建任务: id={}", created.id);
        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> TrackerResult<Option<Task>> {
        let row = sqlx::query(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_task).transpose()
    }

    async fn find_all(&self) -> TrackerResult<Vec<Task>> {
        let rows = sqlx::query(&format!("SELECT {TASK_COLUMNS} FROM tasks ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::row_to_task).collect()
    }

    async fn find_open(&self) -> TrackerResult<Vec<Task>> {
        let rows = sqlx::query(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE status = 'start' ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_task).collect()
    }

    async fn find_by_parent(&self, parent_id: i64) -> TrackerResult<Vec<Task>> {
        let rows = sqlx::query(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE parent_task_id = $1 ORDER BY id"
        ))
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_task).collect()
    }

    #[instrument(skip(self, task), fields(task_id = task.id))]
    async fn update(&self, task: &Task) -> TrackerResult<Task> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE tasks
            SET name = $2, parent_task_id = $3, employee_id = $4, deadline = $5,
                status = $6, updated_at = $7
            WHERE id = $1
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(task.id)
        .bind(&task.name)
        .bind(task.parent_task_id)
        .bind(task.employee_id)
        .bind(task.deadline)
        .bind(task.status)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Self::map_constraint_error(&task.name, e))?;

        match row {
            Some(row) => Self::row_to_task(&row),
            None => Err(TrackerError::TaskNotFound { id: task.id }),
        }
    }

    async fn delete(&self, id: i64) -> TrackerResult<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_important(&self) -> TrackerResult<Vec<Task>> {
        let rows = sqlx::query(
            r#"
            SELECT DISTINCT p.id, p.name, p.parent_task_id, p.employee_id,
                   p.deadline, p.status, p.created_at, p.updated_at
            FROM tasks p
            INNER JOIN tasks c ON c.parent_task_id = p.id
            WHERE p.status = 'start'
              AND p.employee_id IS NULL
              AND c.status = 'start'
              AND c.employee_id IS NOT NULL
            ORDER BY p.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_task).collect()
    }
}
