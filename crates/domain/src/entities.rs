use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// 注册用户，邮箱作为唯一登录标识
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub phone: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 新用户注册数据，密码为明文，由仓储层负责哈希
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: i64,
    pub full_name: String,
    pub post: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    pub fn new(full_name: String, post: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // 将由数据库生成
            full_name,
            post,
            created_at: now,
            updated_at: now,
        }
    }
}

/// 员工及其当前任务负载，用于"忙碌员工"列表
#[derive(Debug, Clone, Serialize)]
pub struct EmployeeWorkload {
    pub employee: Employee,
    pub tasks: Vec<Task>,
    pub active_tasks_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub name: String,
    pub parent_task_id: Option<i64>,
    pub employee_id: Option<i64>,
    pub deadline: Option<NaiveDate>,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(
        name: String,
        parent_task_id: Option<i64>,
        employee_id: Option<i64>,
        deadline: Option<NaiveDate>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // 将由数据库生成
            name,
            parent_task_id,
            employee_id,
            deadline,
            status: TaskStatus::Open,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.status, TaskStatus::Open)
    }
    pub fn is_assigned(&self) -> bool {
        self.employee_id.is_some()
    }
}

/// 任务状态。线上格式沿用历史取值 "start"/"finish"。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TaskStatus {
    #[serde(rename = "start")]
    Open,
    #[serde(rename = "finish")]
    Finished,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Open => "start",
            TaskStatus::Finished => "finish",
        }
    }
}

impl sqlx::Type<sqlx::Sqlite> for TaskStatus {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <str as sqlx::Type<sqlx::Sqlite>>::type_info()
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for TaskStatus {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        match s {
            "start" => Ok(TaskStatus::Open),
            "finish" => Ok(TaskStatus::Finished),
            _ => Err(format!("Invalid task status: {s}").into()),
        }
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for TaskStatus {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        <&str as sqlx::Encode<sqlx::Sqlite>>::encode(self.as_str(), buf)
    }
}
