pub mod database;

pub use database::{
    DatabaseManager, SqliteEmployeeRepository, SqliteTaskRepository, SqliteUserRepository,
};
