//! 会话入口
//!
//! 同一时间只允许一个上传会话；会话在后台任务中运行，调用方拿到只读进度和取消能力。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::info;

use crate::bridge::HostBridge;
use crate::error::{AppError, AppResult, UploadError};
use crate::models::Plan;
use crate::orchestrator::session::{EventSink, Outcome, RunContext, SessionHandle};
use crate::orchestrator::upload_orchestrator::{self, UploadOptions};

/// 活动会话标记，离开作用域时释放
struct ActiveGuard(Arc<AtomicBool>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// 上传器
#[derive(Debug, Clone, Default)]
pub struct Uploader {
    active: Arc<AtomicBool>,
}

impl Uploader {
    pub fn new() -> Self {
        Self::default()
    }

    /// 是否有会话正在运行
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// 在后台启动一个会话
    pub fn start(
        &self,
        plan: Plan,
        bridge: Arc<dyn HostBridge>,
        options: UploadOptions,
        events: EventSink,
    ) -> Result<ActiveUpload, UploadError> {
        if plan.is_empty() {
            return Err(UploadError::EmptyPlan);
        }
        if self
            .active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(UploadError::SessionActive);
        }
        let guard = ActiveGuard(self.active.clone());

        info!(
            "🚀 开始批量上传: {} 批, {} 个文件",
            plan.batch_count(),
            plan.file_count()
        );

        let (ctx, handle) = RunContext::new(events);
        let task = tokio::spawn(async move {
            let _guard = guard;
            upload_orchestrator::run(&plan, bridge.as_ref(), &options, &ctx).await
        });

        Ok(ActiveUpload { handle, task })
    }
}

/// 正在运行的会话
pub struct ActiveUpload {
    handle: SessionHandle,
    task: JoinHandle<Outcome>,
}

impl ActiveUpload {
    /// 只读进度 + 取消句柄
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// 等待会话结束
    pub async fn wait(self) -> AppResult<Outcome> {
        self.task
            .await
            .map_err(|e| AppError::Other(format!("上传任务异常退出: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FileDescriptor, FileRef, Tier, BYTES_PER_MB};
    use crate::services::plan;
    use async_trait::async_trait;
    use std::time::Duration;

    /// 发送前会卡住一段时间的桥接
    struct SlowBridge;

    #[async_trait]
    impl HostBridge for SlowBridge {
        async fn current_location_id(&self) -> Option<String> {
            Some("1".to_string())
        }

        async fn attach_files(&self, _files: &[FileRef]) -> bool {
            true
        }

        async fn send_message(&self, _text: &str) -> bool {
            tokio::time::sleep(Duration::from_secs(10)).await;
            true
        }
    }

    fn small_plan() -> Plan {
        let files: Vec<_> = (0..3)
            .map(|i| FileDescriptor::new(format!("{}.png", i), BYTES_PER_MB).into_ref())
            .collect();
        plan(&files, &Tier::Free.limits())
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_session_is_rejected_while_active() {
        let uploader = Uploader::new();
        let bridge: Arc<dyn HostBridge> = Arc::new(SlowBridge);

        let first = uploader
            .start(small_plan(), bridge.clone(), UploadOptions::default(), EventSink::none())
            .unwrap();
        assert!(uploader.is_active());

        let second = uploader.start(small_plan(), bridge.clone(), UploadOptions::default(), EventSink::none());
        assert_eq!(second.err(), Some(UploadError::SessionActive));

        assert_eq!(first.wait().await.unwrap(), Outcome::Completed);
        assert!(!uploader.is_active());

        let third = uploader
            .start(small_plan(), bridge, UploadOptions::default(), EventSink::none())
            .unwrap();
        assert_eq!(third.wait().await.unwrap(), Outcome::Completed);
    }

    #[tokio::test]
    async fn test_empty_plan_is_rejected() {
        let uploader = Uploader::new();
        let empty = plan(&[], &Tier::Free.limits());
        let result = uploader.start(empty, Arc::new(SlowBridge), UploadOptions::default(), EventSink::none());
        assert_eq!(result.err(), Some(UploadError::EmptyPlan));
        assert!(!uploader.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_through_handle() {
        let uploader = Uploader::new();
        let active = uploader
            .start(small_plan(), Arc::new(SlowBridge), UploadOptions::default(), EventSink::none())
            .unwrap();

        let handle = active.handle();
        // 取消不会打断正在进行的发送，但之后不再有新的调用
        handle.cancel();
        assert_eq!(active.wait().await.unwrap(), Outcome::Cancelled);
        assert!(!uploader.is_active());
    }
}
