//! 租借连接
//!
//! 持有底层连接与指向连接池状态的引用，拦截调用方的关闭动作并转入回收流程。

use crate::connection::Connection;
use crate::error::PoolError;
use crate::pool::{Shared, close_detached};
use std::fmt;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tracing::debug;

/// 从连接池租借的连接
///
/// 调用 [`close`](Self::close) 或直接丢弃都会触发回收：
/// 空闲缓冲有空位则放回，否则销毁并扣减存活计数。
pub struct LeasedConnection<C: Connection> {
    conn: Option<C>,
    shared: Arc<Shared<C>>,
}

impl<C: Connection> LeasedConnection<C> {
    pub(crate) fn new(conn: C, shared: Arc<Shared<C>>) -> Self {
        Self {
            conn: Some(conn),
            shared,
        }
    }

    /// 底层连接（关闭后为 `None`）
    pub fn get_ref(&self) -> Option<&C> {
        self.conn.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut C> {
        self.conn.as_mut()
    }

    pub fn is_closed(&self) -> bool {
        self.conn.is_none()
    }

    /// 归还连接
    ///
    /// 缓冲已满或连接池已关闭时销毁连接，底层关闭错误作为结果返回，
    /// 但存活计数无论成败都已扣减。
    pub async fn close(&mut self) -> Result<(), PoolError> {
        let conn = self.conn.take().ok_or(PoolError::AlreadyClosed)?;
        if let Some(mut surplus) = self.shared.checkin(conn) {
            surplus.close().await.map_err(PoolError::Close)?;
        }
        Ok(())
    }

    /// 从连接池中移除并关闭连接（用于调用方判定已损坏的连接）
    pub async fn discard(mut self) -> Result<(), PoolError> {
        let mut conn = self.conn.take().ok_or(PoolError::AlreadyClosed)?;
        self.shared.forget();
        debug!(pool_id = %self.shared.id, "discarding connection");
        conn.close().await.map_err(PoolError::Close)
    }
}

impl<C: Connection> Drop for LeasedConnection<C> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            if let Some(surplus) = self.shared.checkin(conn) {
                close_detached(&self.shared.id, surplus);
            }
        }
    }
}

impl<C: Connection> fmt::Debug for LeasedConnection<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeasedConnection")
            .field("pool_id", &self.shared.id)
            .field("closed", &self.is_closed())
            .finish()
    }
}

fn not_connected() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "connection already closed")
}

impl<C> AsyncRead for LeasedConnection<C>
where
    C: Connection + AsyncRead + Unpin,
{
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match Pin::into_inner(self).conn.as_mut() {
            Some(conn) => Pin::new(conn).poll_read(cx, buf),
            None => Poll::Ready(Err(not_connected())),
        }
    }
}

impl<C> AsyncWrite for LeasedConnection<C>
where
    C: Connection + AsyncWrite + Unpin,
{
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match Pin::into_inner(self).conn.as_mut() {
            Some(conn) => Pin::new(conn).poll_write(cx, buf),
            None => Poll::Ready(Err(not_connected())),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match Pin::into_inner(self).conn.as_mut() {
            Some(conn) => Pin::new(conn).poll_flush(cx),
            None => Poll::Ready(Err(not_connected())),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match Pin::into_inner(self).conn.as_mut() {
            Some(conn) => Pin::new(conn).poll_shutdown(cx),
            None => Poll::Ready(Err(not_connected())),
        }
    }
}
