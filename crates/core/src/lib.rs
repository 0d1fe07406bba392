pub mod config;
pub mod errors;

pub use config::{ApiConfig, AppConfig, AuthConfig, DatabaseConfig};
pub use errors::{TrackerError, TrackerResult};
