pub mod entities;
pub mod repositories;
pub mod services;
pub mod validation;
pub mod workload;

pub use entities::*;
pub use repositories::*;
pub use services::*;
pub use tracker_core::{TrackerError, TrackerResult};
