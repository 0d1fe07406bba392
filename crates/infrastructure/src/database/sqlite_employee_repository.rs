use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::instrument;

use tracker_core::{TrackerError, TrackerResult};
use tracker_domain::entities::{Employee, EmployeeWorkload, Task};
use tracker_domain::repositories::EmployeeRepository;

pub struct SqliteEmployeeRepository {
    pool: SqlitePool,
}

impl SqliteEmployeeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_employee(row: &sqlx::sqlite::SqliteRow) -> TrackerResult<Employee> {
        Ok(Employee {
            id: row.try_get("id")?,
            full_name: row.try_get("full_name")?,
            post: row.try_get("post")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
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

    async fn tasks_of_employee(&self, employee_id: i64) -> TrackerResult<Vec<Task>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, parent_task_id, employee_id, deadline, status, created_at, updated_at
            FROM tasks WHERE employee_id = $1 ORDER BY id
            "#,
        )
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_task).collect()
    }
}

#[async_trait]
impl EmployeeRepository for SqliteEmployeeRepository {
    #[instrument(skip(self, employee), fields(full_name = %employee.full_name))]
    async fn create(&self, employee: &Employee) -> TrackerResult<Employee> {
        let row = sqlx::query(
            r#"
            INSERT INTO employees (full_name, post, created_at, updated_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, full_name, post, created_at, updated_at
            "#,
        )
        .bind(&employee.full_name)
        .bind(&employee.post)
        .bind(employee.created_at)
        .bind(employee.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_employee(&row)
    }

    async fn find_by_id(&self, id: i64) -> TrackerResult<Option<Employee>> {
        let row = sqlx::query(
            "SELECT id, full_name, post, created_at, updated_at FROM employees WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_employee).transpose()
    }

    async fn find_all(&self) -> TrackerResult<Vec<Employee>> {
        // 按 id 升序：候选人并列时的显式决胜顺序依赖它
        let rows = sqlx::query(
            "SELECT id, full_name, post, created_at, updated_at FROM employees ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_employee).collect()
    }

    async fn update(&self, employee: &Employee) -> TrackerResult<Employee> {
        let row = sqlx::query(
            r#"
            UPDATE employees
            SET full_name = $2, post = $3, updated_at = $4
            WHERE id = $1
            RETURNING id, full_name, post, created_at, updated_at
            "#,
        )
        .bind(employee.id)
        .bind(&employee.full_name)
        .bind(&employee.post)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Self::row_to_employee(&row),
            None => Err(TrackerError::EmployeeNotFound { id: employee.id }),
        }
    }

    async fn delete(&self, id: i64) -> TrackerResult<bool> {
        let result = sqlx::query("DELETE FROM employees WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn find_busy(&self) -> TrackerResult<Vec<EmployeeWorkload>> {
        let rows = sqlx::query(
            r#"
            SELECT e.id, e.full_name, e.post, e.created_at, e.updated_at,
                   COUNT(t.id) AS active_tasks_count
            FROM employees e
            INNER JOIN tasks t ON t.employee_id = e.id AND t.status = 'start'
            GROUP BY e.id
            ORDER BY active_tasks_count DESC, e.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut workloads = Vec::with_capacity(rows.len());
        for row in &rows {
            let employee = Self::row_to_employee(row)?;
            let active_tasks_count: i64 = row.try_get("active_tasks_count")?;
            let tasks = self.tasks_of_employee(employee.id).await?;
            workloads.push(EmployeeWorkload {
                employee,
                tasks,
                active_tasks_count,
            });
        }
        Ok(workloads)
    }
}
