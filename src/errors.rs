use std::fmt;

use actix_web::http::StatusCode;

#[derive(Debug, Clone)]
pub enum SnaplinkError {
    Validation(String),
    NotFound(String),
    Conflict(String),
    RateLimited { message: String, retry_after_ms: u64 },
    GenerationExhausted(String),
    OriginUnavailable(String),
    DatabaseConfig(String),
    DatabaseConnection(String),
    Config(String),
    Serialization(String),
    FileOperation(String),
}

impl SnaplinkError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            SnaplinkError::Validation(_) => "E001",
            SnaplinkError::NotFound(_) => "E002",
            SnaplinkError::Conflict(_) => "E003",
            SnaplinkError::RateLimited { .. } => "E004",
            SnaplinkError::GenerationExhausted(_) => "E005",
            SnaplinkError::OriginUnavailable(_) => "E006",
            SnaplinkError::DatabaseConfig(_) => "E007",
            SnaplinkError::DatabaseConnection(_) => "E008",
            SnaplinkError::Config(_) => "E009",
            SnaplinkError::Serialization(_) => "E010",
            SnaplinkError::FileOperation(_) => "E011",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            SnaplinkError::Validation(_) => "Validation Error",
            SnaplinkError::NotFound(_) => "Resource Not Found",
            SnaplinkError::Conflict(_) => "Short Code Conflict",
            SnaplinkError::RateLimited { .. } => "Rate Limit Exceeded",
            SnaplinkError::GenerationExhausted(_) => "Code Generation Exhausted",
            SnaplinkError::OriginUnavailable(_) => "Origin Store Unavailable",
            SnaplinkError::DatabaseConfig(_) => "Database Configuration Error",
            SnaplinkError::DatabaseConnection(_) => "Database Connection Error",
            SnaplinkError::Config(_) => "Configuration Error",
            SnaplinkError::Serialization(_) => "Serialization Error",
            SnaplinkError::FileOperation(_) => "File Operation Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            SnaplinkError::Validation(msg) => msg,
            SnaplinkError::NotFound(msg) => msg,
            SnaplinkError::Conflict(msg) => msg,
            SnaplinkError::RateLimited { message, .. } => message,
            SnaplinkError::GenerationExhausted(msg) => msg,
            SnaplinkError::OriginUnavailable(msg) => msg,
            SnaplinkError::DatabaseConfig(msg) => msg,
            SnaplinkError::DatabaseConnection(msg) => msg,
            SnaplinkError::Config(msg) => msg,
            SnaplinkError::Serialization(msg) => msg,
            SnaplinkError::FileOperation(msg) => msg,
        }
    }

    /// HTTP status the API layer answers with for this error.
    pub fn http_status(&self) -> StatusCode {
        match self {
            SnaplinkError::Validation(_) => StatusCode::BAD_REQUEST,
            SnaplinkError::NotFound(_) => StatusCode::NOT_FOUND,
            SnaplinkError::Conflict(_) => StatusCode::CONFLICT,
            SnaplinkError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            SnaplinkError::GenerationExhausted(_) | SnaplinkError::OriginUnavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Seconds a rate-limited client should wait, rounded up. `None` for other errors.
    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            SnaplinkError::RateLimited { retry_after_ms, .. } => {
                Some(retry_after_ms.div_ceil(1000).max(1))
            }
            _ => None,
        }
    }

    /// 格式化为彩色输出（用于 Server 模式）
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

impl fmt::Display for SnaplinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for SnaplinkError {}

// 便捷的构造函数
impl SnaplinkError {
    pub fn validation<T: Into<String>>(msg: T) -> Self {
        SnaplinkError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        SnaplinkError::NotFound(msg.into())
    }

    pub fn conflict<T: Into<String>>(msg: T) -> Self {
        SnaplinkError::Conflict(msg.into())
    }

    pub fn rate_limited<T: Into<String>>(msg: T, retry_after_ms: u64) -> Self {
        SnaplinkError::RateLimited {
            message: msg.into(),
            retry_after_ms,
        }
    }

    pub fn generation_exhausted<T: Into<String>>(msg: T) -> Self {
        SnaplinkError::GenerationExhausted(msg.into())
    }

    pub fn origin_unavailable<T: Into<String>>(msg: T) -> Self {
        SnaplinkError::OriginUnavailable(msg.into())
    }

    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        SnaplinkError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        SnaplinkError::DatabaseConnection(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        SnaplinkError::Config(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        SnaplinkError::Serialization(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        SnaplinkError::FileOperation(msg.into())
    }
}

impl From<sea_orm::DbErr> for SnaplinkError {
    fn from(err: sea_orm::DbErr) -> Self {
        if let Some(sea_orm::SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
            return SnaplinkError::Conflict(detail);
        }
        SnaplinkError::OriginUnavailable(err.to_string())
    }
}

impl From<std::io::Error> for SnaplinkError {
    fn from(err: std::io::Error) -> Self {
        SnaplinkError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for SnaplinkError {
    fn from(err: serde_json::Error) -> Self {
        SnaplinkError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for SnaplinkError {
    fn from(err: config::ConfigError) -> Self {
        SnaplinkError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SnaplinkError>;
