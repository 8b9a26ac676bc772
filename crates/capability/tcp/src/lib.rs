//! # TCP 连接池能力模块
//!
//! - **TcpConnector**：带连接超时的 TCP 拨号工厂
//! - **connect_pool**：根据环境配置建立 TCP 连接池
//!
//! ## 配置格式
//!
//! ```json
//! { "host": "192.168.1.100", "port": 8080, "connect_timeout_ms": 5000, "nodelay": true }
//! ```

mod connector;

pub use connector::{TcpConnector, TcpConnectorConfig};

use connpool::{ConnectionPool, PoolConfig, PoolError};
use connpool_config::AppConfig;
use std::time::Duration;

/// TCP 连接池
pub type TcpPool = ConnectionPool<TcpConnector>;

/// 根据运行配置建立 TCP 连接池（预热 `idle_size` 个连接）
pub async fn connect_pool(config: &AppConfig) -> Result<TcpPool, PoolError> {
    let connector = TcpConnector::new(TcpConnectorConfig {
        host: config.target_host.clone(),
        port: config.target_port,
        connect_timeout_ms: config.connect_timeout_ms,
        nodelay: config.tcp_nodelay,
    });
    let pool_config = PoolConfig::new(
        config.idle_size,
        config.max_size,
        Duration::from_secs(config.idle_timeout_seconds),
    );
    ConnectionPool::new(connector, pool_config).await
}
