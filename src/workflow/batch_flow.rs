//! 批次发送流程 - 流程层
//!
//! 核心职责：定义"一个批次"的完整发送流程
//!
//! 流程顺序：
//! 1. 附加文件
//! 2. 按模板生成消息文本
//! 3. 发送消息
//!
//! 每次调用桥接之前检查一次取消；已经发出的调用不会被打断。

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::bridge::HostBridge;
use crate::models::Batch;
use crate::services::MessageTemplate;
use crate::workflow::batch_ctx::BatchCtx;

/// 批次发送结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchResult {
    /// 已发出发送动作
    Sent,
    /// 附加文件失败
    AttachFailed,
    /// 发送消息失败
    SendFailed,
    /// 调用桥接前发现已取消
    Cancelled,
}

/// 批次发送流程
///
/// - 不持有任何资源（page）
/// - 只依赖桥接能力
pub struct BatchFlow {
    template: MessageTemplate,
}

impl BatchFlow {
    pub fn new(template: MessageTemplate) -> Self {
        Self { template }
    }

    pub async fn run<B: HostBridge + ?Sized>(
        &self,
        bridge: &B,
        batch: &Batch,
        ctx: &BatchCtx,
        cancel: &CancellationToken,
    ) -> BatchResult {
        if cancel.is_cancelled() {
            return BatchResult::Cancelled;
        }

        info!(
            "{} 📎 正在附加 {} 个文件 ({} MB)...",
            ctx,
            batch.len(),
            batch.total_mb()
        );
        for file in batch.files() {
            debug!("{}   - {} ({} 字节)", ctx, file.name, file.size_bytes);
        }

        if !bridge.attach_files(batch.files()).await {
            error!("{} ❌ 附加文件失败", ctx);
            return BatchResult::AttachFailed;
        }

        let text = self.template.render(&ctx.vars);

        if cancel.is_cancelled() {
            return BatchResult::Cancelled;
        }

        info!("{} 📤 正在发送: {}", ctx, text);
        if !bridge.send_message(&text).await {
            error!("{} ❌ 发送消息失败", ctx);
            return BatchResult::SendFailed;
        }

        info!("{} ✓ 已发送", ctx);
        BatchResult::Sent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FileDescriptor, FileRef, Tier, BYTES_PER_MB};
    use crate::services::plan;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// 记录调用的桥接，可选在附加时请求取消
    #[derive(Default)]
    struct StubBridge {
        attach_ok: bool,
        cancel_on_attach: Option<CancellationToken>,
        attached: Mutex<usize>,
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl HostBridge for StubBridge {
        async fn current_location_id(&self) -> Option<String> {
            None
        }

        async fn attach_files(&self, _files: &[FileRef]) -> bool {
            *self.attached.lock().unwrap() += 1;
            if let Some(token) = &self.cancel_on_attach {
                token.cancel();
            }
            self.attach_ok
        }

        async fn send_message(&self, text: &str) -> bool {
            self.sent.lock().unwrap().push(text.to_string());
            true
        }
    }

    fn first_batch() -> Batch {
        let files = vec![
            FileDescriptor::new("a.png", 10 * BYTES_PER_MB).into_ref(),
            FileDescriptor::new("b.png", 10 * BYTES_PER_MB).into_ref(),
        ];
        plan(&files, &Tier::Free.limits()).batches[0].clone()
    }

    fn flow() -> BatchFlow {
        BatchFlow::new(MessageTemplate::new("{index}/{total} • {count} • {size}MB"))
    }

    #[tokio::test]
    async fn test_sends_rendered_text() {
        let bridge = StubBridge {
            attach_ok: true,
            ..StubBridge::default()
        };
        let batch = first_batch();
        let ctx = BatchCtx::new(&batch, 0, 1);

        let result = flow().run(&bridge, &batch, &ctx, &CancellationToken::new()).await;
        assert_eq!(result, BatchResult::Sent);
        assert_eq!(*bridge.sent.lock().unwrap(), vec!["1/1 • 2 • 20.0MB"]);
    }

    #[tokio::test]
    async fn test_cancel_after_attach_skips_send() {
        let cancel = CancellationToken::new();
        let bridge = StubBridge {
            attach_ok: true,
            cancel_on_attach: Some(cancel.clone()),
            ..StubBridge::default()
        };
        let batch = first_batch();
        let ctx = BatchCtx::new(&batch, 0, 1);

        let result = flow().run(&bridge, &batch, &ctx, &cancel).await;
        assert_eq!(result, BatchResult::Cancelled);
        assert_eq!(*bridge.attached.lock().unwrap(), 1);
        assert!(bridge.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_before_attach() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let bridge = StubBridge::default();
        let batch = first_batch();
        let ctx = BatchCtx::new(&batch, 0, 1);

        let result = flow().run(&bridge, &batch, &ctx, &cancel).await;
        assert_eq!(result, BatchResult::Cancelled);
        assert_eq!(*bridge.attached.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_attach_failure_skips_send() {
        let bridge = StubBridge::default();
        let batch = first_batch();
        let ctx = BatchCtx::new(&batch, 0, 1);

        let result = flow().run(&bridge, &batch, &ctx, &CancellationToken::new()).await;
        assert_eq!(result, BatchResult::AttachFailed);
        assert!(bridge.sent.lock().unwrap().is_empty());
    }
}
