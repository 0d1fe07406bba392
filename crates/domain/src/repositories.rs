//! 领域仓储抽象
//!
//! 定义数据访问的抽象接口，遵循依赖倒置原则

use async_trait::async_trait;
use tracker_core::TrackerResult;

use crate::entities::{Employee, EmployeeWorkload, NewUser, Task, User};

/// 用户仓储抽象
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// 创建用户，负责对明文密码进行哈希
    async fn create(&self, new_user: &NewUser) -> TrackerResult<User>;
    async fn find_by_id(&self, id: i64) -> TrackerResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> TrackerResult<Option<User>>;
    /// 校验邮箱与密码，失败时返回 `InvalidCredentials`
    async fn verify_credentials(&self, email: &str, password: &str) -> TrackerResult<User>;
}

/// 员工仓储抽象
#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    async fn create(&self, employee: &Employee) -> TrackerResult<Employee>;
    async fn find_by_id(&self, id: i64) -> TrackerResult<Option<Employee>>;
    /// 全量员工列表，按 id 升序，保证候选人选择的稳定顺序
    async fn find_all(&self) -> TrackerResult<Vec<Employee>>;
    async fn update(&self, employee: &Employee) -> TrackerResult<Employee>;
    /// 删除员工，其名下任务级联删除
    async fn delete(&self, id: i64) -> TrackerResult<bool>;
    /// 至少持有一个进行中任务的员工，按进行中任务数降序
    async fn find_busy(&self) -> TrackerResult<Vec<EmployeeWorkload>>;
}

/// 任务仓储抽象
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn create(&self, task: &Task) -> TrackerResult<Task>;
    async fn find_by_id(&self, id: i64) -> TrackerResult<Option<Task>>;
    async fn find_all(&self) -> TrackerResult<Vec<Task>>;
    /// 所有进行中的任务，工作量索引的数据来源
    async fn find_open(&self) -> TrackerResult<Vec<Task>>;
    /// 直接子任务，按 id 升序
    async fn find_by_parent(&self, parent_id: i64) -> TrackerResult<Vec<Task>>;
    async fn update(&self, task: &Task) -> TrackerResult<Task>;
    /// 删除任务，其子任务级联删除
    async fn delete(&self, id: i64) -> TrackerResult<bool>;
    /// 重要任务：本身进行中且未分配，但存在已分配且进行中的直接子任务
    async fn find_important(&self) -> TrackerResult<Vec<Task>>;
}
