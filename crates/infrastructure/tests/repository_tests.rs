use tracker_core::TrackerError;
use tracker_domain::entities::{Employee, NewUser, Task, TaskStatus};
use tracker_domain::repositories::{EmployeeRepository, TaskRepository, UserRepository};
use tracker_infrastructure::{
    DatabaseManager, SqliteEmployeeRepository, SqliteTaskRepository, SqliteUserRepository,
};

async fn setup() -> DatabaseManager {
    let manager = DatabaseManager::new_in_memory().await.unwrap();
    manager.migrate().await.unwrap();
    manager
}

fn open_task(name: &str, parent: Option<i64>, employee: Option<i64>) -> Task {
    Task::new(name.to_string(), parent, employee, None)
}

#[tokio::test]
async fn test_health_check_after_migrate() {
    let manager = setup().await;
    assert!(manager.health_check().await.is_ok());
}

#[tokio::test]
async fn test_task_repository_crud() {
    let manager = setup().await;
    let repo = SqliteTaskRepository::new(manager.pool().clone());

    let created = repo.create(&open_task("first task", None, None)).await.unwrap();
    assert!(created.id > 0);
    assert_eq!(created.status, TaskStatus::Open);

    let found = repo.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(found.name, "first task");

    let mut updated = found.clone();
    updated.name = "renamed task".to_string();
    updated.status = TaskStatus::Finished;
    let updated = repo.update(&updated).await.unwrap();
    assert_eq!(updated.name, "renamed task");
    assert_eq!(updated.status, TaskStatus::Finished);

    assert!(repo.delete(created.id).await.unwrap());
    assert!(repo.find_by_id(created.id).await.unwrap().is_none());
    assert!(!repo.delete(created.id).await.unwrap());
}

#[tokio::test]
async fn test_duplicate_task_name_rejected() {
    let manager = setup().await;
    let repo = SqliteTaskRepository::new(manager.pool().clone());

    repo.create(&open_task("unique name", None, None)).await.unwrap();
    let result = repo.create(&open_task("unique name", None, None)).await;
    assert!(matches!(result, Err(TrackerError::DuplicateTaskName(_))));
}

#[tokio::test]
async fn test_dangling_references_rejected() {
    let manager = setup().await;
    let repo = SqliteTaskRepository::new(manager.pool().clone());

    let result = repo.create(&open_task("bad employee", None, Some(999))).await;
    assert!(matches!(result, Err(TrackerError::InvalidReference(_))));

    let result = repo.create(&open_task("bad parent", Some(999), None)).await;
    assert!(matches!(result, Err(TrackerError::InvalidReference(_))));
}

#[tokio::test]
async fn test_parent_delete_cascades_to_children() {
    let manager = setup().await;
    let repo = SqliteTaskRepository::new(manager.pool().clone());

    let parent = repo.create(&open_task("parent", None, None)).await.unwrap();
    let child = repo
        .create(&open_task("child", Some(parent.id), None))
        .await
        .unwrap();
    let grandchild = repo
        .create(&open_task("grandchild", Some(child.id), None))
        .await
        .unwrap();

    assert!(repo.delete(parent.id).await.unwrap());
    assert!(repo.find_by_id(child.id).await.unwrap().is_none());
    assert!(repo.find_by_id(grandchild.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_employee_delete_cascades_to_tasks() {
    let manager = setup().await;
    let employees = SqliteEmployeeRepository::new(manager.pool().clone());
    let tasks = SqliteTaskRepository::new(manager.pool().clone());

    let employee = employees
        .create(&Employee::new("Ivan Petrov".to_string(), None))
        .await
        .unwrap();
    let task = tasks
        .create(&open_task("his task", None, Some(employee.id)))
        .await
        .unwrap();

    assert!(employees.delete(employee.id).await.unwrap());
    assert!(tasks.find_by_id(task.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_find_open_filters_finished() {
    let manager = setup().await;
    let repo = SqliteTaskRepository::new(manager.pool().clone());

    let open = repo.create(&open_task("still open", None, None)).await.unwrap();
    let mut finished = repo.create(&open_task("done", None, None)).await.unwrap();
    finished.status = TaskStatus::Finished;
    repo.update(&finished).await.unwrap();

    let open_tasks = repo.find_open().await.unwrap();
    assert_eq!(open_tasks.len(), 1);
    assert_eq!(open_tasks[0].id, open.id);
}

#[tokio::test]
async fn test_find_important_filter() {
    let manager = setup().await;
    let employees = SqliteEmployeeRepository::new(manager.pool().clone());
    let tasks = SqliteTaskRepository::new(manager.pool().clone());

    let worker = employees
        .create(&Employee::new("Worker".to_string(), None))
        .await
        .unwrap();

    // 符合条件：进行中、未分配、有已分配且进行中的子任务
    let stuck = tasks.create(&open_task("stuck", None, None)).await.unwrap();
    tasks
        .create(&open_task("stuck sub", Some(stuck.id), Some(worker.id)))
        .await
        .unwrap();

    // 不符合：父任务已有执行人
    let assigned = tasks
        .create(&open_task("assigned parent", None, Some(worker.id)))
        .await
        .unwrap();
    tasks
        .create(&open_task("assigned sub", Some(assigned.id), Some(worker.id)))
        .await
        .unwrap();

    // 不符合：子任务未分配
    let idle = tasks.create(&open_task("idle parent", None, None)).await.unwrap();
    tasks
        .create(&open_task("idle sub", Some(idle.id), None))
        .await
        .unwrap();

    let important = tasks.find_important().await.unwrap();
    assert_eq!(important.len(), 1);
    assert_eq!(important[0].id, stuck.id);
}

#[tokio::test]
async fn test_find_busy_orders_by_load_desc() {
    let manager = setup().await;
    let employees = SqliteEmployeeRepository::new(manager.pool().clone());
    let tasks = SqliteTaskRepository::new(manager.pool().clone());

    let light = employees
        .create(&Employee::new("Light".to_string(), None))
        .await
        .unwrap();
    let heavy = employees
        .create(&Employee::new("Heavy".to_string(), None))
        .await
        .unwrap();
    let idle = employees
        .create(&Employee::new("Idle".to_string(), None))
        .await
        .unwrap();

    tasks.create(&open_task("l1", None, Some(light.id))).await.unwrap();
    tasks.create(&open_task("h1", None, Some(heavy.id))).await.unwrap();
    tasks.create(&open_task("h2", None, Some(heavy.id))).await.unwrap();
    // 已完成任务不计入负载
    let mut done = tasks.create(&open_task("h3", None, Some(heavy.id))).await.unwrap();
    done.status = TaskStatus::Finished;
    tasks.update(&done).await.unwrap();

    let busy = employees.find_busy().await.unwrap();
    assert_eq!(busy.len(), 2);
    assert_eq!(busy[0].employee.id, heavy.id);
    assert_eq!(busy[0].active_tasks_count, 2);
    assert_eq!(busy[1].employee.id, light.id);
    assert_eq!(busy[1].active_tasks_count, 1);
    // 空闲员工不出现在忙碌列表中
    assert!(busy.iter().all(|w| w.employee.id != idle.id));
    // 列表携带员工的全部任务，包括已完成的
    assert_eq!(busy[0].tasks.len(), 3);
}

#[tokio::test]
async fn test_user_repository_register_and_login() {
    let manager = setup().await;
    let repo = SqliteUserRepository::new(manager.pool().clone());

    let new_user = NewUser {
        email: "ivan@example.com".to_string(),
        phone: Some("+7-900-000-00-00".to_string()),
        password: "s3cret-pass".to_string(),
    };
    let user = repo.create(&new_user).await.unwrap();
    assert!(user.id > 0);
    assert!(user.is_active);
    // 密码只存哈希
    assert_ne!(user.password_hash, "s3cret-pass");

    let verified = repo
        .verify_credentials("ivan@example.com", "s3cret-pass")
        .await
        .unwrap();
    assert_eq!(verified.id, user.id);

    let wrong = repo
        .verify_credentials("ivan@example.com", "wrong-pass")
        .await;
    assert!(matches!(wrong, Err(TrackerError::InvalidCredentials)));

    let unknown = repo.verify_credentials("nobody@example.com", "x").await;
    assert!(matches!(unknown, Err(TrackerError::InvalidCredentials)));
}

#[tokio::test]
async fn test_duplicate_email_rejected() {
    let manager = setup().await;
    let repo = SqliteUserRepository::new(manager.pool().clone());

    let new_user = NewUser {
        email: "dup@example.com".to_string(),
        phone: None,
        password: "password1".to_string(),
    };
    repo.create(&new_user).await.unwrap();
    let result = repo.create(&new_user).await;
    assert!(matches!(result, Err(TrackerError::DuplicateEmail(_))));
}
