//! 应用配置加载
//!
//! 配置来源按优先级从低到高依次为：默认值、TOML配置文件、
//! `TRACKER__` 分段前缀的环境变量，如 `TRACKER__DATABASE__URL`。

pub mod models;

use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub use models::{ApiConfig, AuthConfig, DatabaseConfig};

/// System configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub auth: AuthConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite:tracker.db".to_string(),
                max_connections: 10,
                min_connections: 1,
                connection_timeout_seconds: 30,
                idle_timeout_seconds: 600,
            },
            api: ApiConfig {
                bind_address: "0.0.0.0:8080".to_string(),
                cors_enabled: true,
                cors_origins: vec!["*".to_string()],
                request_timeout_seconds: 30,
            },
            auth: AuthConfig {
                jwt_secret: "change-this-secret-in-production".to_string(),
                jwt_expiration_hours: 24,
                refresh_expiration_days: 30,
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from config file and environment variables
    ///
    /// Load order:
    /// 1. Default configuration
    /// 2. Config file (TOML format)
    /// 3. Environment variable overrides (e.g. TRACKER__API__BIND_ADDRESS)
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = ConfigBuilder::builder();

        builder = Self::set_defaults(builder)?;

        if let Some(path) = config_path {
            if Path::new(path).exists() {
                builder = builder.add_source(File::new(path, FileFormat::Toml));
            } else {
                return Err(anyhow::anyhow!("配置文件不存在: {}", path));
            }
        } else {
            // 尝试默认配置文件路径
            let default_paths = [
                "config/tracker.toml",
                "tracker.toml",
                "/etc/tracker/config.toml",
            ];

            for path in &default_paths {
                if Path::new(path).exists() {
                    builder = builder.add_source(File::new(path, FileFormat::Toml));
                    break;
                }
            }
        }

        // 环境变量覆盖，优先级最高。分段用双下划线，
        // 避免与 max_connections 这类字段名里的下划线混淆。
        builder = builder.add_source(
            Environment::with_prefix("TRACKER")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder
            .build()
            .context("构建配置失败")?
            .try_deserialize()
            .context("反序列化配置失败")?;

        config.validate()?;

        Ok(config)
    }

    fn set_defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        let defaults = AppConfig::default();
        Ok(builder
            .set_default("database.url", defaults.database.url)?
            .set_default("database.max_connections", defaults.database.max_connections)?
            .set_default("database.min_connections", defaults.database.min_connections)?
            .set_default(
                "database.connection_timeout_seconds",
                defaults.database.connection_timeout_seconds,
            )?
            .set_default(
                "database.idle_timeout_seconds",
                defaults.database.idle_timeout_seconds,
            )?
            .set_default("api.bind_address", defaults.api.bind_address)?
            .set_default("api.cors_enabled", defaults.api.cors_enabled)?
            .set_default("api.cors_origins", defaults.api.cors_origins)?
            .set_default(
                "api.request_timeout_seconds",
                defaults.api.request_timeout_seconds,
            )?
            .set_default("auth.jwt_secret", defaults.auth.jwt_secret)?
            .set_default(
                "auth.jwt_expiration_hours",
                defaults.auth.jwt_expiration_hours,
            )?
            .set_default(
                "auth.refresh_expiration_days",
                defaults.auth.refresh_expiration_days,
            )?)
    }

    /// Validate the whole configuration
    pub fn validate(&self) -> Result<()> {
        self.database.validate()?;
        self.api.validate()?;
        self.auth.validate()?;
        Ok(())
    }
}
