use std::fmt;

#[derive(Debug, Clone)]
pub enum ShortenerError {
    InvalidUrl(String),
    IncompleteUrl(String),
    UidConflict(String),
    BackendUnavailable(String),
    Validation(String),
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    FileOperation(String),
    Serialization(String),
    Config(String),
    Logging(String),
}

impl ShortenerError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            ShortenerError::InvalidUrl(_) => "E001",
            ShortenerError::IncompleteUrl(_) => "E002",
            ShortenerError::UidConflict(_) => "E003",
            ShortenerError::BackendUnavailable(_) => "E004",
            ShortenerError::Validation(_) => "E005",
            ShortenerError::DatabaseConfig(_) => "E006",
            ShortenerError::DatabaseConnection(_) => "E007",
            ShortenerError::DatabaseOperation(_) => "E008",
            ShortenerError::FileOperation(_) => "E009",
            ShortenerError::Serialization(_) => "E010",
            ShortenerError::Config(_) => "E011",
            ShortenerError::Logging(_) => "E012",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            ShortenerError::InvalidUrl(_) => "Invalid URL",
            ShortenerError::IncompleteUrl(_) => "Incomplete URL",
            ShortenerError::UidConflict(_) => "Short Code Conflict",
            ShortenerError::BackendUnavailable(_) => "Backend Unavailable",
            ShortenerError::Validation(_) => "Validation Error",
            ShortenerError::DatabaseConfig(_) => "Database Configuration Error",
            ShortenerError::DatabaseConnection(_) => "Database Connection Error",
            ShortenerError::DatabaseOperation(_) => "Database Operation Error",
            ShortenerError::FileOperation(_) => "File Operation Error",
            ShortenerError::Serialization(_) => "Serialization Error",
            ShortenerError::Config(_) => "Configuration Error",
            ShortenerError::Logging(_) => "Logging Setup Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            ShortenerError::InvalidUrl(msg)
            | ShortenerError::IncompleteUrl(msg)
            | ShortenerError::UidConflict(msg)
            | ShortenerError::BackendUnavailable(msg)
            | ShortenerError::Validation(msg)
            | ShortenerError::DatabaseConfig(msg)
            | ShortenerError::DatabaseConnection(msg)
            | ShortenerError::DatabaseOperation(msg)
            | ShortenerError::FileOperation(msg)
            | ShortenerError::Serialization(msg)
            | ShortenerError::Config(msg)
            | ShortenerError::Logging(msg) => msg,
        }
    }

    /// 用户可以自行修正的错误（输入问题，而不是系统故障）
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            ShortenerError::InvalidUrl(_)
                | ShortenerError::IncompleteUrl(_)
                | ShortenerError::Validation(_)
        )
    }

    /// 格式化为彩色输出（用于终端）
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

impl fmt::Display for ShortenerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for ShortenerError {}

// 便捷的构造函数
impl ShortenerError {
    pub fn invalid_url<T: Into<String>>(msg: T) -> Self {
        ShortenerError::InvalidUrl(msg.into())
    }

    pub fn incomplete_url<T: Into<String>>(msg: T) -> Self {
        ShortenerError::IncompleteUrl(msg.into())
    }

    pub fn uid_conflict<T: Into<String>>(msg: T) -> Self {
        ShortenerError::UidConflict(msg.into())
    }

    pub fn backend_unavailable<T: Into<String>>(msg: T) -> Self {
        ShortenerError::BackendUnavailable(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        ShortenerError::Validation(msg.into())
    }

    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        ShortenerError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        ShortenerError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        ShortenerError::DatabaseOperation(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        ShortenerError::FileOperation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        ShortenerError::Serialization(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        ShortenerError::Config(msg.into())
    }

    pub fn logging<T: Into<String>>(msg: T) -> Self {
        ShortenerError::Logging(msg.into())
    }
}

impl From<sea_orm::DbErr> for ShortenerError {
    fn from(err: sea_orm::DbErr) -> Self {
        ShortenerError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for ShortenerError {
    fn from(err: std::io::Error) -> Self {
        ShortenerError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for ShortenerError {
    fn from(err: serde_json::Error) -> Self {
        ShortenerError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ShortenerError>;
