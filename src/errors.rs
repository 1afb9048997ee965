use std::fmt;

#[derive(Debug, Clone)]
pub enum QuicklinkError {
    InvalidInput(String),
    NotFound(String),
    StoreUnavailable(String),
    IdGeneration(String),
    Persistence(String),
    RateLimitExceeded(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    Config(String),
}

impl QuicklinkError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            QuicklinkError::InvalidInput(_) => "E001",
            QuicklinkError::NotFound(_) => "E002",
            QuicklinkError::StoreUnavailable(_) => "E003",
            QuicklinkError::IdGeneration(_) => "E004",
            QuicklinkError::Persistence(_) => "E005",
            QuicklinkError::RateLimitExceeded(_) => "E006",
            QuicklinkError::DatabaseConnection(_) => "E007",
            QuicklinkError::DatabaseOperation(_) => "E008",
            QuicklinkError::Config(_) => "E009",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            QuicklinkError::InvalidInput(_) => "Invalid Input",
            QuicklinkError::NotFound(_) => "Resource Not Found",
            QuicklinkError::StoreUnavailable(_) => "Store Unavailable",
            QuicklinkError::IdGeneration(_) => "ID Generation Error",
            QuicklinkError::Persistence(_) => "Persistence Error",
            QuicklinkError::RateLimitExceeded(_) => "Rate Limit Exceeded",
            QuicklinkError::DatabaseConnection(_) => "Database Connection Error",
            QuicklinkError::DatabaseOperation(_) => "Database Operation Error",
            QuicklinkError::Config(_) => "Configuration Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            QuicklinkError::InvalidInput(msg) => msg,
            QuicklinkError::NotFound(msg) => msg,
            QuicklinkError::StoreUnavailable(msg) => msg,
            QuicklinkError::IdGeneration(msg) => msg,
            QuicklinkError::Persistence(msg) => msg,
            QuicklinkError::RateLimitExceeded(msg) => msg,
            QuicklinkError::DatabaseConnection(msg) => msg,
            QuicklinkError::DatabaseOperation(msg) => msg,
            QuicklinkError::Config(msg) => msg,
        }
    }

    /// 格式化为彩色输出（用于启动失败时的终端提示）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for QuicklinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for QuicklinkError {}

// 便捷的构造函数
impl QuicklinkError {
    pub fn invalid_input<T: Into<String>>(msg: T) -> Self {
        QuicklinkError::InvalidInput(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        QuicklinkError::NotFound(msg.into())
    }

    pub fn store_unavailable<T: Into<String>>(msg: T) -> Self {
        QuicklinkError::StoreUnavailable(msg.into())
    }

    pub fn id_generation<T: Into<String>>(msg: T) -> Self {
        QuicklinkError::IdGeneration(msg.into())
    }

    pub fn persistence<T: Into<String>>(msg: T) -> Self {
        QuicklinkError::Persistence(msg.into())
    }

    pub fn rate_limit_exceeded<T: Into<String>>(msg: T) -> Self {
        QuicklinkError::RateLimitExceeded(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        QuicklinkError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        QuicklinkError::DatabaseOperation(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        QuicklinkError::Config(msg.into())
    }
}

impl From<redis::RedisError> for QuicklinkError {
    fn from(err: redis::RedisError) -> Self {
        QuicklinkError::StoreUnavailable(err.to_string())
    }
}

impl From<sea_orm::DbErr> for QuicklinkError {
    fn from(err: sea_orm::DbErr) -> Self {
        QuicklinkError::DatabaseOperation(err.to_string())
    }
}

impl From<config::ConfigError> for QuicklinkError {
    fn from(err: config::ConfigError) -> Self {
        QuicklinkError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, QuicklinkError>;
