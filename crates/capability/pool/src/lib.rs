//! # 连接池能力模块
//!
//! 提供有界的可复用网络连接池：
//! - **Acquire**：优先从空闲缓冲取连接，缓冲为空且未达上限时通过工厂新建
//! - **Release**：关闭租借连接时回收到空闲缓冲，缓冲已满则销毁
//! - **Close**：关闭连接池，排空并关闭全部空闲连接
//!
//! ## 架构设计
//!
//! ```text
//! ConnectionFactory (拨号逻辑，由调用方提供)
//!       │
//!       ▼
//! ConnectionPool ── PoolState { idle, live, closed }
//!       │
//!       ▼
//! LeasedConnection ── close()/drop ──▶ 回收 / 销毁
//! ```
//!
//! ## 计数不变量
//!
//! `0 <= live <= max_size`：新建连接前在同一临界区内检查并预占计数，
//! 工厂失败或 acquire 被取消时归还预占。
//!
//! ## 配置格式
//!
//! ```json
//! { "idle_size": 10, "max_size": 100, "idle_timeout_ms": 600000 }
//! ```

mod config;
mod connection;
mod error;
mod leased;
mod pool;

pub use config::PoolConfig;
pub use connection::{Connection, ConnectionFactory, FnFactory, factory_fn};
pub use error::PoolError;
pub use leased::LeasedConnection;
pub use pool::{ConnectionPool, PoolStatus};
