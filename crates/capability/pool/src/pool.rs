//! 连接池实现
//!
//! 所有可变状态（空闲队列、存活计数、关闭标记）由同一把互斥锁保护，
//! 临界区内不跨越 `.await`，因此租借连接可以在 `Drop` 中同步归还。
//! 工厂创建与底层关闭都在锁外执行。

use crate::config::PoolConfig;
use crate::connection::{Connection, ConnectionFactory};
use crate::error::PoolError;
use crate::leased::LeasedConnection;
use connpool_telemetry::new_pool_id;
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

/// 连接池状态快照
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatus {
    /// 存活连接数（空闲 + 租借中 + 创建中）
    pub live: usize,
    /// 当前空闲连接数
    pub idle: usize,
    /// 空闲缓冲容量
    pub idle_capacity: usize,
    /// 存活连接上限
    pub max_size: usize,
    /// 连接池是否已关闭
    pub closed: bool,
}

struct PoolState<C> {
    idle: VecDeque<C>,
    live: usize,
    closed: bool,
}

/// 连接池与租借连接共享的状态
pub(crate) struct Shared<C: Connection> {
    pub(crate) id: String,
    config: PoolConfig,
    state: Mutex<PoolState<C>>,
}

enum Checkout<'a, C: Connection> {
    Idle(C),
    Reserved(Reservation<'a, C>),
}

/// 新建连接前预占的计数，未提交即释放（工厂失败或 acquire 被取消）
struct Reservation<'a, C: Connection> {
    shared: &'a Shared<C>,
    armed: bool,
}

impl<C: Connection> Reservation<'_, C> {
    fn commit(mut self) {
        self.armed = false;
    }
}

impl<C: Connection> Drop for Reservation<'_, C> {
    fn drop(&mut self) {
        if self.armed {
            self.shared.forget();
        }
    }
}

impl<C: Connection> Shared<C> {
    fn lock(&self) -> MutexGuard<'_, PoolState<C>> {
        // 临界区内只有单步字段更新，锁中毒后状态仍一致
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn checkout(&self) -> Result<Checkout<'_, C>, PoolError> {
        let mut state = self.lock();
        if state.closed {
            return Err(PoolError::Closed);
        }
        if let Some(conn) = state.idle.pop_front() {
            return Ok(Checkout::Idle(conn));
        }
        if state.live >= self.config.max_size {
            return Err(PoolError::Exhausted {
                live: state.live,
                max_size: self.config.max_size,
            });
        }
        state.live += 1;
        Ok(Checkout::Reserved(Reservation {
            shared: self,
            armed: true,
        }))
    }

    /// 归还连接：空闲缓冲有空位且未关闭时入队，否则扣减计数并交回调用方销毁
    pub(crate) fn checkin(&self, conn: C) -> Option<C> {
        let mut state = self.lock();
        if !state.closed && state.idle.len() < self.config.idle_size {
            state.idle.push_back(conn);
            debug!(
                pool_id = %self.id,
                live = state.live,
                idle = state.idle.len(),
                "connection returned to idle buffer",
            );
            return None;
        }
        state.live = state.live.saturating_sub(1);
        debug!(
            pool_id = %self.id,
            live = state.live,
            closed = state.closed,
            "idle buffer unavailable, destroying connection",
        );
        Some(conn)
    }

    /// 扣减一个存活计数
    pub(crate) fn forget(&self) {
        let mut state = self.lock();
        state.live = state.live.saturating_sub(1);
    }

    fn is_closed(&self) -> bool {
        self.lock().closed
    }
}

impl<C: Connection> Drop for Shared<C> {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        for conn in state.idle.drain(..) {
            close_detached(&self.id, conn);
        }
    }
}

/// 有界连接池
///
/// 克隆开销很小，所有克隆共享同一份状态。
pub struct ConnectionPool<F: ConnectionFactory> {
    factory: Arc<F>,
    shared: Arc<Shared<F::Connection>>,
}

impl<F: ConnectionFactory> Clone for ConnectionPool<F> {
    fn clone(&self) -> Self {
        Self {
            factory: Arc::clone(&self.factory),
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<F: ConnectionFactory> fmt::Debug for ConnectionPool<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionPool")
            .field("id", &self.shared.id)
            .field("status", &self.status())
            .finish()
    }
}

impl<F: ConnectionFactory> ConnectionPool<F> {
    /// 创建连接池并预热 `idle_size` 个连接
    ///
    /// 预热中任一次创建失败即返回该错误，已创建的连接会先被关闭。
    pub async fn new(factory: F, config: PoolConfig) -> Result<Self, PoolError> {
        config.validate()?;
        let id = new_pool_id();

        let mut idle = VecDeque::with_capacity(config.idle_size);
        for _ in 0..config.idle_size {
            match factory.create().await {
                Ok(conn) => idle.push_back(conn),
                Err(e) => {
                    warn!(
                        pool_id = %id,
                        created = idle.len(),
                        error = %e,
                        "pool warm-up failed",
                    );
                    close_all(&id, idle).await;
                    return Err(PoolError::Create(e));
                }
            }
        }

        info!(
            pool_id = %id,
            idle_size = config.idle_size,
            max_size = config.max_size,
            "connection pool ready",
        );

        let live = idle.len();
        Ok(Self {
            factory: Arc::new(factory),
            shared: Arc::new(Shared {
                id,
                config,
                state: Mutex::new(PoolState {
                    idle,
                    live,
                    closed: false,
                }),
            }),
        })
    }

    /// 获取连接
    ///
    /// 空闲缓冲命中直接返回；否则在未达上限时调用工厂新建。
    /// 从不排队等待容量：要么立即成功，要么立即失败。
    pub async fn acquire(&self) -> Result<LeasedConnection<F::Connection>, PoolError> {
        let reservation = match self.shared.checkout()? {
            Checkout::Idle(conn) => {
                debug!(pool_id = %self.shared.id, "acquired idle connection");
                return Ok(LeasedConnection::new(conn, Arc::clone(&self.shared)));
            }
            Checkout::Reserved(reservation) => reservation,
        };

        let mut conn = match self.factory.create().await {
            Ok(conn) => conn,
            Err(e) => {
                debug!(pool_id = %self.shared.id, error = %e, "create connection failed");
                return Err(PoolError::Create(e));
            }
        };

        if self.shared.is_closed() {
            drop(reservation);
            if let Err(e) = conn.close().await {
                warn!(pool_id = %self.shared.id, error = %e, "close connection failed");
            }
            return Err(PoolError::Closed);
        }
        reservation.commit();

        debug!(pool_id = %self.shared.id, "created new connection");
        Ok(LeasedConnection::new(conn, Arc::clone(&self.shared)))
    }

    /// 关闭连接池：排空并关闭全部空闲连接
    ///
    /// 租借中的连接不受影响，归还时按缓冲已满处理（直接销毁）。
    /// 重复关闭返回 [`PoolError::Closed`]。
    pub async fn close(&self) -> Result<(), PoolError> {
        let (drained, leased) = {
            let mut state = self.shared.lock();
            if state.closed {
                return Err(PoolError::Closed);
            }
            state.closed = true;
            let drained: Vec<_> = state.idle.drain(..).collect();
            state.live = state.live.saturating_sub(drained.len());
            (drained, state.live)
        };

        let count = drained.len();
        let failed = close_all(&self.shared.id, drained).await;
        info!(
            pool_id = %self.shared.id,
            closed = count,
            failed,
            leased,
            "connection pool closed",
        );
        Ok(())
    }

    pub fn status(&self) -> PoolStatus {
        let state = self.shared.lock();
        PoolStatus {
            live: state.live,
            idle: state.idle.len(),
            idle_capacity: self.shared.config.idle_size,
            max_size: self.shared.config.max_size,
            closed: state.closed,
        }
    }

    pub fn config(&self) -> &PoolConfig {
        &self.shared.config
    }

    /// 空闲超时配置（当前不做回收）
    pub fn idle_timeout(&self) -> Duration {
        self.shared.config.idle_timeout()
    }

    pub fn id(&self) -> &str {
        &self.shared.id
    }
}

/// 逐个关闭连接，返回失败数
async fn close_all<C: Connection>(pool_id: &str, conns: impl IntoIterator<Item = C>) -> usize {
    let mut failed = 0;
    for mut conn in conns {
        if let Err(e) = conn.close().await {
            failed += 1;
            warn!(pool_id = %pool_id, error = %e, "close connection failed");
        }
    }
    failed
}

/// 在 `Drop` 中销毁连接：处于 tokio 运行时内时派生任务执行 `close`，否则直接丢弃
pub(crate) fn close_detached<C: Connection>(pool_id: &str, mut conn: C) {
    match Handle::try_current() {
        Ok(handle) => {
            let pool_id = pool_id.to_string();
            handle.spawn(async move {
                if let Err(e) = conn.close().await {
                    warn!(pool_id = %pool_id, error = %e, "close connection failed");
                }
            });
        }
        Err(_) => drop(conn),
    }
}
