//! 连接池运行配置加载。

use std::env;

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env: {0}")]
    Missing(String),
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// 连接池运行配置。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub target_host: String,
    pub target_port: u16,
    pub idle_size: usize,
    pub max_size: usize,
    pub idle_timeout_seconds: u64,
    pub connect_timeout_ms: u64,
    pub tcp_nodelay: bool,
}

impl AppConfig {
    /// 从环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        let target_host = env::var("CONNPOOL_TARGET_HOST")
            .map_err(|_| ConfigError::Missing("CONNPOOL_TARGET_HOST".to_string()))?;
        let target_port = read_u16("CONNPOOL_TARGET_PORT")?;
        let idle_size = read_usize_with_default("CONNPOOL_IDLE_SIZE", 10)?;
        let max_size = read_usize_with_default("CONNPOOL_MAX_SIZE", 100)?;
        let idle_timeout_seconds = read_u64_with_default("CONNPOOL_IDLE_TIMEOUT_SECONDS", 600)?;
        let connect_timeout_ms = read_u64_with_default("CONNPOOL_CONNECT_TIMEOUT_MS", 5000)?;
        let tcp_nodelay = read_bool_with_default("CONNPOOL_TCP_NODELAY", true);

        Ok(Self {
            target_host,
            target_port,
            idle_size,
            max_size,
            idle_timeout_seconds,
            connect_timeout_ms,
            tcp_nodelay,
        })
    }
}

/// 读取 u16 类型环境变量。
fn read_u16(key: &str) -> Result<u16, ConfigError> {
    let value = env::var(key).map_err(|_| ConfigError::Missing(key.to_string()))?;
    value
        .parse::<u16>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_usize_with_default(key: &str, default: usize) -> Result<usize, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<usize>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_u64_with_default(key: &str, default: u64) -> Result<u64, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u64>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_bool_with_default(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "on"),
        Err(_) => default,
    }
}
