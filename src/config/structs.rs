use serde::{Deserialize, Serialize};

use crate::errors::{Result, ShortenerError};

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 静态配置（从 TOML + 环境变量加载，启动时使用）
///
/// - shortener: 短码生成相关配置
/// - database: 关系型后端连接配置（database_url 为空时使用内存后端）
/// - storage: 内存后端快照文件
/// - batch: 批量删除处理器
/// - app: 生命周期相关（关闭超时）
/// - logging: 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub shortener: ShortenerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config file > 默认值
    /// ENV 前缀：SL，分隔符：__
    /// 示例：SL__SHORTENER__DEFAULT_LENGTH=10
    ///
    /// 文件不存在时使用默认值；文件无法解析或取值非法时返回 `Config` 错误。
    pub fn load(path: Option<&str>) -> Result<Self> {
        use config::{Config, Environment, File};

        let path = path.unwrap_or(DEFAULT_CONFIG_PATH);

        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("SL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ShortenerError::config(format!("Failed to build config: {}", e)))?;

        let config: StaticConfig = settings
            .try_deserialize()
            .map_err(|e| ShortenerError::config(format!("Failed to deserialize config: {}", e)))?;
        config.validate()?;

        if std::path::Path::new(path).exists() {
            eprintln!("[INFO] Configuration loaded from: {}", path);
        }
        Ok(config)
    }

    /// 检查无法用类型表达的约束
    pub fn validate(&self) -> Result<()> {
        if self.shortener.default_length == 0 {
            return Err(ShortenerError::config(
                "shortener.default_length must be at least 1",
            ));
        }
        Ok(())
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }
}

/// 短码生成配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortenerConfig {
    /// 拼接短链接的前缀，例如 http://localhost:8080/
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// 请求长度 <= 0 时使用的默认短码长度
    #[serde(default = "default_code_length")]
    pub default_length: usize,
}

/// 关系型数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// 为空时使用内存后端
    #[serde(default)]
    pub database_url: String,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    /// 连接超时（秒）
    #[serde(default = "default_database_timeout")]
    pub timeout: u64,
    #[serde(default = "default_ping_timeout_ms")]
    pub ping_timeout_ms: u64,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

/// 快照存储配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// 为空时禁用快照
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,
}

/// 批量删除处理器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    #[serde(default = "default_delete_flush_interval_ms")]
    pub delete_flush_interval_ms: u64,
    /// 关闭时是否先刷一次缓冲区
    #[serde(default)]
    pub flush_on_shutdown: bool,
}

/// 生命周期配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions for static config
// ============================================================

fn default_base_url() -> String {
    "http://localhost:8080/".to_string()
}

fn default_code_length() -> usize {
    8
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_database_timeout() -> u64 {
    8
}

fn default_ping_timeout_ms() -> u64 {
    1000
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    100
}

fn default_retry_max_delay_ms() -> u64 {
    2000
}

fn default_snapshot_path() -> String {
    "shortlinks.json".to_string()
}

fn default_delete_flush_interval_ms() -> u64 {
    1000
}

fn default_shutdown_timeout_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

impl Default for ShortenerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            default_length: default_code_length(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            pool_size: default_database_pool_size(),
            timeout: default_database_timeout(),
            ping_timeout_ms: default_ping_timeout_ms(),
            retry_count: default_retry_count(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            delete_flush_interval_ms: default_delete_flush_interval_ms(),
            flush_on_shutdown: false,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StaticConfig::default();
        assert_eq!(config.shortener.default_length, 8);
        assert!(config.database.database_url.is_empty());
        assert_eq!(config.batch.delete_flush_interval_ms, 1000);
        assert!(!config.batch.flush_on_shutdown);
        assert_eq!(config.storage.snapshot_path, "shortlinks.json");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: StaticConfig = toml::from_str(
            r#"
            [shortener]
            default_length = 12

            [database]
            database_url = "sqlite://links.db"
            "#,
        )
        .unwrap();

        assert_eq!(config.shortener.default_length, 12);
        assert_eq!(config.shortener.base_url, "http://localhost:8080/");
        assert_eq!(config.database.database_url, "sqlite://links.db");
        assert_eq!(config.database.retry_count, 3);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_sample_config_roundtrips() {
        let sample = StaticConfig::generate_sample_config();
        assert!(sample.contains("[shortener]"));
        let parsed: StaticConfig = toml::from_str(&sample).unwrap();
        assert_eq!(parsed.app.shutdown_timeout_secs, 30);
    }
}
