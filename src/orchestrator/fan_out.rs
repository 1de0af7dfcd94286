//! 并发分发 / 汇合工具
//!
//! 把同一个只读输入分发给 N 个相互独立的工作项，每个工作项一个 tokio 任务，
//! 用 Semaphore 限制同时进行的数量，最后按工作项的原始顺序返回每个槽位。
//!
//! - 汇合点只有一个写者（本函数），每个槽位只写一次
//! - `shutdown` 完成时中止所有未完成的任务，已经得到的输出全部保留
//! - 返回的 future 被丢弃时，所有仍在运行的任务随之中止

use futures::stream::{FuturesUnordered, StreamExt};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{AbortHandle, JoinError};
use tracing::{debug, error, warn};

/// 单个工作项的最终状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot<O> {
    /// 正常完成
    Completed(O),
    /// 任务 panic
    Panicked(String),
    /// 完成前被取消
    Cancelled,
}

impl<O> Slot<O> {
    fn from_join(index: usize, joined: Result<O, JoinError>) -> Self {
        match joined {
            Ok(output) => Slot::Completed(output),
            Err(e) if e.is_cancelled() => Slot::Cancelled,
            Err(e) => {
                error!("工作项 {} 执行失败: {}", index + 1, e);
                Slot::Panicked(e.to_string())
            }
        }
    }
}

/// 持有所有任务的 AbortHandle，析构时中止尚未结束的任务
struct AbortOnDrop(Vec<AbortHandle>);

impl AbortOnDrop {
    fn abort_all(&self) {
        for handle in &self.0 {
            handle.abort();
        }
    }
}

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.abort_all();
    }
}

/// 并发执行所有工作项
///
/// # 参数
/// - `input`: 所有工作项共享的只读输入
/// - `items`: 工作项列表
/// - `max_concurrent`: 最大并发数（0 按 1 处理）
/// - `shutdown`: 完成时取消剩余工作
/// - `work`: 对单个工作项的处理函数
///
/// # 返回
/// 与 `items` 等长、同序的槽位列表
pub async fn fan_out<I, T, O, F, Fut, S>(
    input: Arc<I>,
    items: Vec<T>,
    max_concurrent: usize,
    shutdown: S,
    work: F,
) -> Vec<Slot<O>>
where
    I: Send + Sync + 'static + ?Sized,
    T: Send + 'static,
    O: Send + 'static,
    F: Fn(Arc<I>, T) -> Fut + Clone + Send + 'static,
    Fut: Future<Output = O> + Send + 'static,
    S: Future<Output = ()>,
{
    let total = items.len();
    let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));
    let mut slots: Vec<Slot<O>> = (0..total).map(|_| Slot::Cancelled).collect();
    let mut guard = AbortOnDrop(Vec::with_capacity(total));
    let mut pending = FuturesUnordered::new();

    for (index, item) in items.into_iter().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        let input = Arc::clone(&input);
        let work = work.clone();

        let handle = tokio::spawn(async move {
            // Semaphore 不会被关闭，acquire 只会成功
            let _permit = semaphore.acquire_owned().await;
            work(input, item).await
        });

        guard.0.push(handle.abort_handle());
        pending.push(async move { (index, handle.await) });
    }

    debug!("已分发 {} 个工作项", total);

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;

            next = pending.next() => {
                let Some((index, joined)) = next else { break };
                slots[index] = Slot::from_join(index, joined);
            }
            _ = &mut shutdown => {
                warn!("收到取消信号，中止剩余 {} 个工作项", pending.len());
                guard.abort_all();
                // 已结束的任务不受 abort 影响，照常取回输出
                while let Some((index, joined)) = pending.next().await {
                    slots[index] = Slot::from_join(index, joined);
                }
                break;
            }
        }
    }

    slots
}
