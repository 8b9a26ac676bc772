//! 日志初始化与连接池标识生成。

use tracing_subscriber::{EnvFilter, fmt};

/// 初始化 tracing（默认 info，可通过 RUST_LOG 覆盖）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 生成新的连接池标识，用作日志字段 `pool_id`。
pub fn new_pool_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
