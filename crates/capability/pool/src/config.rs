//! 连接池配置

use crate::error::PoolError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 连接池配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// 空闲缓冲容量，同时也是预热连接数
    #[serde(default = "default_idle_size")]
    pub idle_size: usize,
    /// 存活连接上限（空闲 + 租借中）
    #[serde(default = "default_max_size")]
    pub max_size: usize,
    /// 空闲超时（毫秒），仅保存，当前不做回收
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_ms: u64,
}

fn default_idle_size() -> usize {
    10
}

fn default_max_size() -> usize {
    100
}

fn default_idle_timeout() -> u64 {
    600_000
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            idle_size: default_idle_size(),
            max_size: default_max_size(),
            idle_timeout_ms: default_idle_timeout(),
        }
    }
}

impl PoolConfig {
    pub fn new(idle_size: usize, max_size: usize, idle_timeout: Duration) -> Self {
        Self {
            idle_size,
            max_size,
            idle_timeout_ms: u64::try_from(idle_timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// 从 JSON 配置字符串解析（解析后即校验）
    pub fn from_json(json: &str) -> Result<Self, PoolError> {
        let config: PoolConfig =
            serde_json::from_str(json).map_err(|e| PoolError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    /// 校验容量关系：`max_size >= 1` 且 `idle_size <= max_size`
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.max_size == 0 {
            return Err(PoolError::InvalidConfig(
                "max_size must be at least 1".to_string(),
            ));
        }
        if self.idle_size > self.max_size {
            return Err(PoolError::InvalidConfig(format!(
                "idle_size {} exceeds max_size {}",
                self.idle_size, self.max_size
            )));
        }
        Ok(())
    }
}
