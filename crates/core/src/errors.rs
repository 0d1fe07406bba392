use thiserror::Error;

/// 任务跟踪系统统一错误类型
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("数据库操作错误: {0}")]
    DatabaseOperation(String),

    #[error("任务未找到: id={id}")]
    TaskNotFound { id: i64 },

    #[error("员工未找到: id={id}")]
    EmployeeNotFound { id: i64 },

    #[error("用户未找到: {email}")]
    UserNotFound { email: String },

    #[error("任务名称无效: {0}")]
    InvalidTaskName(String),

    #[error("任务名称已存在: {0}")]
    DuplicateTaskName(String),

    #[error("邮箱已被注册: {0}")]
    DuplicateEmail(String),

    #[error("无效的引用: {0}")]
    InvalidReference(String),

    #[error("员工池为空，无法计算候选人")]
    NoCandidates,

    #[error("用户名或密码错误")]
    InvalidCredentials,

    #[error("数据验证失败: {0}")]
    ValidationError(String),

    #[error("序列化错误: {0}")]
    Serialization(String),

    #[error("配置错误: {0}")]
    Configuration(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 统一的Result类型
pub type TrackerResult<T> = std::result::Result<T, TrackerError>;

impl TrackerError {
    pub fn database_error<S: Into<String>>(msg: S) -> Self {
        Self::DatabaseOperation(msg.into())
    }
    pub fn task_not_found(id: i64) -> Self {
        Self::TaskNotFound { id }
    }
    pub fn employee_not_found(id: i64) -> Self {
        Self::EmployeeNotFound { id }
    }
    pub fn user_not_found<S: Into<String>>(email: S) -> Self {
        Self::UserNotFound {
            email: email.into(),
        }
    }
    pub fn invalid_reference<S: Into<String>>(msg: S) -> Self {
        Self::InvalidReference(msg.into())
    }
    pub fn validation_error<S: Into<String>>(msg: S) -> Self {
        Self::ValidationError(msg.into())
    }
    pub fn config_error<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// 面向API调用方的提示信息
    pub fn user_message(&self) -> &str {
        match self {
            TrackerError::TaskNotFound { .. } => "请求的任务不存在",
            TrackerError::EmployeeNotFound { .. } => "请求的员工不存在",
            TrackerError::UserNotFound { .. } => "请求的用户不存在",
            TrackerError::InvalidTaskName(_) => "任务名称不符合要求",
            TrackerError::DuplicateTaskName(_) => "任务名称已被占用",
            TrackerError::DuplicateEmail(_) => "该邮箱已被注册",
            TrackerError::InvalidReference(_) => "引用的对象不存在或不合法",
            TrackerError::InvalidCredentials => "用户名或密码错误",
            TrackerError::ValidationError(_) => "输入数据验证失败",
            TrackerError::NoCandidates => "当前没有可用的候选员工",
            _ => "系统繁忙，请稍后重试",
        }
    }
}

impl From<serde_json::Error> for TrackerError {
    fn from(err: serde_json::Error) -> Self {
        TrackerError::Serialization(err.to_string())
    }
}
