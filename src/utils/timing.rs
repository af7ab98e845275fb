//! 可取消的等待
//!
//! 所有等待都和取消令牌赛跑，取消后立即返回。

use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// 等待结束的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wait {
    /// 正常完成
    Done,
    /// 等待期间被取消
    Cancelled,
}

/// 睡眠 `duration`，期间可被取消
pub async fn cancellable_sleep(duration: Duration, cancel: &CancellationToken) -> Wait {
    if cancel.is_cancelled() {
        return Wait::Cancelled;
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Wait::Cancelled,
        _ = tokio::time::sleep(duration) => Wait::Done,
    }
}

/// 每隔 `interval` 检查一次条件，直到条件成立或被取消
pub async fn poll_until<F, Fut>(interval: Duration, cancel: &CancellationToken, mut predicate: F) -> Wait
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    loop {
        if cancel.is_cancelled() {
            return Wait::Cancelled;
        }
        if predicate().await {
            return Wait::Done;
        }
        if cancellable_sleep(interval, cancel).await == Wait::Cancelled {
            return Wait::Cancelled;
        }
    }
}
