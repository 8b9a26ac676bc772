//! 连接池错误类型定义

/// 连接池错误
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    /// 空闲缓冲为空且连接数已达上限
    #[error("pool exhausted: {live} of {max_size} connections in use")]
    Exhausted { live: usize, max_size: usize },

    /// 连接工厂创建失败（原样透传）
    #[error("create connection failed: {0}")]
    Create(#[source] std::io::Error),

    /// 销毁连接时底层关闭失败
    #[error("close connection failed: {0}")]
    Close(#[source] std::io::Error),

    /// 租借连接已关闭
    #[error("connection already closed")]
    AlreadyClosed,

    /// 连接池已关闭
    #[error("pool closed")]
    Closed,

    /// 配置校验错误
    #[error("invalid pool config: {0}")]
    InvalidConfig(String),
}
