//! 领域服务
//!
//! 在仓储之上编排业务规则：名称校验、引用检查、父任务环检测，
//! 以及重要任务的候选人推荐。

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, instrument};
use tracker_core::{TrackerError, TrackerResult};

use crate::entities::{Employee, EmployeeWorkload, Task, TaskStatus};
use crate::repositories::{EmployeeRepository, TaskRepository};
use crate::validation::validate_task_name;
use crate::workload::select_candidates;

/// 任务的可写字段集合，创建与全量更新共用
#[derive(Debug, Clone)]
pub struct TaskDraft {
    pub name: String,
    pub parent_task_id: Option<i64>,
    pub employee_id: Option<i64>,
    pub deadline: Option<NaiveDate>,
    pub status: TaskStatus,
}

/// 重要任务及其直接子任务与推荐候选员工
#[derive(Debug, Clone, Serialize)]
pub struct TaskWithCandidates {
    #[serde(flatten)]
    pub task: Task,
    pub tasks: Vec<Task>,
    pub available_employees: Vec<String>,
}

pub struct TaskService {
    task_repo: Arc<dyn TaskRepository>,
    employee_repo: Arc<dyn EmployeeRepository>,
}

impl TaskService {
    pub fn new(
        task_repo: Arc<dyn TaskRepository>,
        employee_repo: Arc<dyn EmployeeRepository>,
    ) -> Self {
        Self {
            task_repo,
            employee_repo,
        }
    }

    #[instrument(skip(self, draft), fields(task_name = %draft.name))]
    pub async fn create_task(&self, draft: TaskDraft) -> TrackerResult<Task> {
        validate_task_name(&draft.name)?;
        self.check_references(&draft, None).await?;

        let mut task = Task::new(
            draft.name,
            draft.parent_task_id,
            draft.employee_id,
            draft.deadline,
        );
        task.status = draft.status;

        let created = self.task_repo.create(&task).await?;
        debug!("创建任务: id={} name={}", created.id, created.name);
        Ok(created)
    }

    pub async fn get_task(&self, id: i64) -> TrackerResult<Task> {
        self.task_repo
            .find_by_id(id)
            .await?
            .ok_or(TrackerError::TaskNotFound { id })
    }

    pub async fn list_tasks(&self) -> TrackerResult<Vec<Task>> {
        self.task_repo.find_all().await
    }

    #[instrument(skip(self, draft), fields(task_id = id, task_name = %draft.name))]
    pub async fn update_task(&self, id: i64, draft: TaskDraft) -> TrackerResult<Task> {
        let existing = self.get_task(id).await?;
        validate_task_name(&draft.name)?;
        self.check_references(&draft, Some(id)).await?;

        let task = Task {
            id,
            name: draft.name,
            parent_task_id: draft.parent_task_id,
            employee_id: draft.employee_id,
            deadline: draft.deadline,
            status: draft.status,
            created_at: existing.created_at,
            updated_at: Utc::now(),
        };
        self.task_repo.update(&task).await
    }

    /// 删除任务；子任务随存储层级联删除
    pub async fn delete_task(&self, id: i64) -> TrackerResult<()> {
        if self.task_repo.delete(id).await? {
            Ok(())
        } else {
            Err(TrackerError::TaskNotFound { id })
        }
    }

    /// 重要任务查询：本身进行中且未分配、但存在已分配且进行中的
    /// 直接子任务的任务，并为每个任务计算推荐候选员工。
    ///
    /// 工作量快照（全量员工 + 进行中任务）在单次请求内只读取一次，
    /// 对每个任务重新执行选择；员工池为空时渲染为空候选列表。
    #[instrument(skip(self))]
    pub async fn important_tasks(&self) -> TrackerResult<Vec<TaskWithCandidates>> {
        let tasks = self.task_repo.find_important().await?;
        let employees = self.employee_repo.find_all().await?;
        let open_tasks = self.task_repo.find_open().await?;

        let mut results = Vec::with_capacity(tasks.len());
        for task in tasks {
            let subtasks = self.task_repo.find_by_parent(task.id).await?;
            let available_employees =
                match select_candidates(&employees, &open_tasks, &subtasks) {
                    Ok(names) => names,
                    Err(TrackerError::NoCandidates) => Vec::new(),
                    Err(err) => return Err(err),
                };
            results.push(TaskWithCandidates {
                task,
                tasks: subtasks,
                available_employees,
            });
        }
        Ok(results)
    }

    /// 校验员工与父任务引用，并拒绝会形成环的父任务链
    async fn check_references(
        &self,
        draft: &TaskDraft,
        task_id: Option<i64>,
    ) -> TrackerResult<()> {
        if let Some(employee_id) = draft.employee_id {
            if self.employee_repo.find_by_id(employee_id).await?.is_none() {
                return Err(TrackerError::invalid_reference(format!(
                    "执行人不存在: id={employee_id}"
                )));
            }
        }

        let Some(parent_id) = draft.parent_task_id else {
            return Ok(());
        };
        if self.task_repo.find_by_id(parent_id).await?.is_none() {
            return Err(TrackerError::invalid_reference(format!(
                "父任务不存在: id={parent_id}"
            )));
        }
        if let Some(id) = task_id {
            self.assert_no_cycle(id, parent_id).await?;
        }
        Ok(())
    }

    /// 沿父任务链向上走，若回到自身则构成环。
    /// visited 集合兜底，防止存量数据已有环时陷入死循环。
    async fn assert_no_cycle(&self, task_id: i64, parent_id: i64) -> TrackerResult<()> {
        let mut visited = HashSet::new();
        let mut current = Some(parent_id);
        while let Some(pid) = current {
            if pid == task_id {
                return Err(TrackerError::invalid_reference(format!(
                    "父任务引用形成循环: id={task_id}"
                )));
            }
            if !visited.insert(pid) {
                break;
            }
            current = self
                .task_repo
                .find_by_id(pid)
                .await?
                .and_then(|t| t.parent_task_id);
        }
        Ok(())
    }
}

pub struct EmployeeService {
    employee_repo: Arc<dyn EmployeeRepository>,
}

impl EmployeeService {
    pub fn new(employee_repo: Arc<dyn EmployeeRepository>) -> Self {
        Self { employee_repo }
    }

    pub async fn create_employee(
        &self,
        full_name: String,
        post: Option<String>,
    ) -> TrackerResult<Employee> {
        if full_name.trim().is_empty() {
            return Err(TrackerError::validation_error("员工姓名不能为空"));
        }
        self.employee_repo
            .create(&Employee::new(full_name, post))
            .await
    }

    pub async fn get_employee(&self, id: i64) -> TrackerResult<Employee> {
        self.employee_repo
            .find_by_id(id)
            .await?
            .ok_or(TrackerError::EmployeeNotFound { id })
    }

    pub async fn list_employees(&self) -> TrackerResult<Vec<Employee>> {
        self.employee_repo.find_all().await
    }

    pub async fn update_employee(
        &self,
        id: i64,
        full_name: String,
        post: Option<String>,
    ) -> TrackerResult<Employee> {
        if full_name.trim().is_empty() {
            return Err(TrackerError::validation_error("员工姓名不能为空"));
        }
        let mut employee = self.get_employee(id).await?;
        employee.full_name = full_name;
        employee.post = post;
        employee.updated_at = Utc::now();
        self.employee_repo.update(&employee).await
    }

    /// 删除员工；其名下任务随存储层级联删除
    pub async fn delete_employee(&self, id: i64) -> TrackerResult<()> {
        if self.employee_repo.delete(id).await? {
            Ok(())
        } else {
            Err(TrackerError::EmployeeNotFound { id })
        }
    }

    pub async fn busy_employees(&self) -> TrackerResult<Vec<EmployeeWorkload>> {
        self.employee_repo.find_busy().await
    }
}
