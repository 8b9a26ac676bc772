#![allow(dead_code)]

use async_trait::async_trait;
use connpool::{Connection, ConnectionFactory};
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// 测试用连接计数器。
#[derive(Debug, Default)]
pub struct Counters {
    pub calls: AtomicUsize,
    pub created: AtomicUsize,
    pub closed: AtomicUsize,
}

impl Counters {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

pub struct MockConnection {
    pub id: usize,
    counters: Arc<Counters>,
    fail_close: bool,
}

impl MockConnection {
    pub fn new(id: usize, counters: Arc<Counters>) -> Self {
        Self {
            id,
            counters,
            fail_close: false,
        }
    }
}

#[async_trait]
impl Connection for MockConnection {
    async fn close(&mut self) -> io::Result<()> {
        self.counters.closed.fetch_add(1, Ordering::SeqCst);
        if self.fail_close {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "close failed"));
        }
        Ok(())
    }
}

/// 测试用连接工厂：可注入创建失败、关闭失败与创建延迟。
pub struct MockFactory {
    pub counters: Arc<Counters>,
    /// 第 N 次（从 1 开始）及之后的创建失败，0 表示不失败
    fail_from: AtomicUsize,
    fail_close: AtomicBool,
    delay: Option<Duration>,
}

impl MockFactory {
    pub fn new() -> Self {
        Self {
            counters: Arc::new(Counters::default()),
            fail_from: AtomicUsize::new(0),
            fail_close: AtomicBool::new(false),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn failing_from(self, attempt: usize) -> Self {
        self.fail_from.store(attempt, Ordering::SeqCst);
        self
    }

    pub fn failing_close(self) -> Self {
        self.fail_close.store(true, Ordering::SeqCst);
        self
    }

    pub fn counters(&self) -> Arc<Counters> {
        Arc::clone(&self.counters)
    }
}

#[async_trait]
impl ConnectionFactory for MockFactory {
    type Connection = MockConnection;

    async fn create(&self) -> io::Result<MockConnection> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let attempt = self.counters.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let fail_from = self.fail_from.load(Ordering::SeqCst);
        if fail_from != 0 && attempt >= fail_from {
            return Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "connection refused",
            ));
        }
        self.counters.created.fetch_add(1, Ordering::SeqCst);
        Ok(MockConnection {
            id: attempt,
            counters: Arc::clone(&self.counters),
            fail_close: self.fail_close.load(Ordering::SeqCst),
        })
    }
}
