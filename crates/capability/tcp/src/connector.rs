//! TCP 连接工厂实现
//!
//! 按配置拨号目标地址，为连接池提供新连接。
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! let config = TcpConnectorConfig {
//!     host: "192.168.1.100".to_string(),
//!     port: 8080,
//!     connect_timeout_ms: 5000,
//!     nodelay: true,
//! };
//! let pool = ConnectionPool::new(TcpConnector::new(config), PoolConfig::default()).await?;
//! let mut conn = pool.acquire().await?;
//! conn.write_all(b"PING\n").await?;
//! conn.close().await?;
//! ```

use async_trait::async_trait;
use connpool::{ConnectionFactory, PoolError};
use serde::{Deserialize, Serialize};
use std::io;
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::{debug, warn};

/// TCP 连接工厂配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TcpConnectorConfig {
    /// 目标主机地址
    pub host: String,
    /// 目标端口
    pub port: u16,
    /// 连接超时（毫秒）
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,
    /// 是否开启 TCP_NODELAY
    #[serde(default = "default_nodelay")]
    pub nodelay: bool,
}

fn default_connect_timeout() -> u64 {
    5000
}

fn default_nodelay() -> bool {
    true
}

impl TcpConnectorConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// TCP 连接工厂
#[derive(Debug, Clone)]
pub struct TcpConnector {
    config: TcpConnectorConfig,
}

impl TcpConnector {
    pub fn new(config: TcpConnectorConfig) -> Self {
        Self { config }
    }

    /// 从 JSON 配置字符串解析
    pub fn from_json(json: &str) -> Result<Self, PoolError> {
        let config: TcpConnectorConfig = serde_json::from_str(json)
            .map_err(|e| PoolError::InvalidConfig(e.to_string()))?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &TcpConnectorConfig {
        &self.config
    }
}

#[async_trait]
impl ConnectionFactory for TcpConnector {
    type Connection = TcpStream;

    async fn create(&self) -> io::Result<TcpStream> {
        let addr = self.config.addr();
        let connect_timeout = Duration::from_millis(self.config.connect_timeout_ms);

        let stream = match tokio::time::timeout(connect_timeout, TcpStream::connect(&addr)).await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                warn!(addr = %addr, error = %e, "failed to connect");
                return Err(e);
            }
            Err(_) => {
                warn!(addr = %addr, timeout_ms = self.config.connect_timeout_ms, "connect timeout");
                return Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("connect to {} timed out", addr),
                ));
            }
        };

        if self.config.nodelay {
            stream.set_nodelay(true)?;
        }

        debug!(addr = %addr, "connected");
        Ok(stream)
    }
}
