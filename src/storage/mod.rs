//! 访问日志持久化（Sea-ORM）
//!
//! 支持 SQLite / MySQL / PostgreSQL，由数据库 URL 自动推断。

pub mod access_log_sink;
pub mod connection;

pub use access_log_sink::SeaOrmAccessLogSink;
pub use connection::{connect, connect_generic, connect_sqlite, run_migrations};

use crate::errors::{QuicklinkError, Result};

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<&'static str> {
    if database_url.starts_with("sqlite:")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
    {
        Ok("sqlite")
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql")
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres")
    } else {
        Err(QuicklinkError::config(format!(
            "Cannot infer database type from URL: {}. Supported: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}
