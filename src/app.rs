use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

use tracker_api::{create_app, AppState, JwtService};
use tracker_core::AppConfig;
use tracker_domain::services::{EmployeeService, TaskService};
use tracker_infrastructure::{
    DatabaseManager, SqliteEmployeeRepository, SqliteTaskRepository, SqliteUserRepository,
};

/// 主应用程序：装配数据库、服务与HTTP路由
pub struct Application {
    config: AppConfig,
    database: DatabaseManager,
    state: AppState,
}

impl Application {
    pub async fn new(config: AppConfig) -> Result<Self> {
        info!("初始化应用程序");

        let database = DatabaseManager::new(&config.database)
            .await
            .context("创建数据库连接池失败")?;
        database.migrate().await.context("执行数据库迁移失败")?;
        database
            .health_check()
            .await
            .context("数据库连通性检查失败")?;

        let task_repo = Arc::new(SqliteTaskRepository::new(database.pool().clone()));
        let employee_repo = Arc::new(SqliteEmployeeRepository::new(database.pool().clone()));
        let user_repo = Arc::new(SqliteUserRepository::new(database.pool().clone()));

        let state = AppState {
            task_service: Arc::new(TaskService::new(task_repo, employee_repo.clone())),
            employee_service: Arc::new(EmployeeService::new(employee_repo)),
            user_repo,
            jwt: Arc::new(JwtService::from_config(&config.auth)),
        };

        Ok(Self {
            config,
            database,
            state,
        })
    }

    /// 启动HTTP服务并阻塞到关闭信号
    pub async fn run(self, shutdown: impl Future<Output = ()> + Send + 'static) -> Result<()> {
        let app = create_app(self.state);

        let listener = TcpListener::bind(&self.config.api.bind_address)
            .await
            .with_context(|| format!("绑定地址失败: {}", self.config.api.bind_address))?;
        info!("API服务监听于 {}", self.config.api.bind_address);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .context("HTTP服务运行失败")?;

        info!("HTTP服务已停止，关闭数据库连接");
        self.database.close().await;
        Ok(())
    }
}
