//! 连接与连接工厂抽象

use async_trait::async_trait;
use std::future::Future;
use std::io;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

/// 可被连接池管理的连接。
///
/// `close` 是连接池唯一拦截的回收信号：租借期间调用方关闭的是
/// [`LeasedConnection`](crate::LeasedConnection)，只有连接池决定销毁时才会调用这里。
///
/// 在 `Drop` 路径上销毁（丢弃未关闭的多余租借连接、未调用 `close` 就丢弃连接池）时，
/// 若当前处于 tokio 运行时内，`close` 会在派生任务中执行，错误只记录日志；
/// 运行时外则直接丢弃连接，实现者需保证连接自身的 `Drop` 能释放资源。
#[async_trait]
pub trait Connection: Send + 'static {
    async fn close(&mut self) -> io::Result<()>;
}

#[async_trait]
impl Connection for TcpStream {
    async fn close(&mut self) -> io::Result<()> {
        self.shutdown().await
    }
}

/// 连接工厂：无参创建一个已打开的连接。
///
/// 连接池不关心地址、传输或认证，这些都由工厂实现负责。
#[async_trait]
pub trait ConnectionFactory: Send + Sync + 'static {
    type Connection: Connection;

    async fn create(&self) -> io::Result<Self::Connection>;
}

/// 闭包适配的连接工厂
pub struct FnFactory<F> {
    create: F,
}

/// 将 `Fn() -> Future<Output = io::Result<C>>` 闭包包装为连接工厂
pub fn factory_fn<F, Fut, C>(create: F) -> FnFactory<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = io::Result<C>> + Send + 'static,
    C: Connection,
{
    FnFactory { create }
}

#[async_trait]
impl<F, Fut, C> ConnectionFactory for FnFactory<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = io::Result<C>> + Send + 'static,
    C: Connection,
{
    type Connection = C;

    async fn create(&self) -> io::Result<C> {
        (self.create)().await
    }
}
