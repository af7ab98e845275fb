//! 上传编排器 - 编排层
//!
//! ## 职责
//!
//! 按顺序逐批驱动宿主页面，同一时间只有一个批次在发送。
//!
//! ## 状态机
//!
//! ```text
//! Idle → Running → {Paused ⇄ Running} → Completed | Cancelled | Failed
//! ```
//!
//! - 开始时锁定当前频道；每批发送前频道必须与锁定的一致，否则暂停并轮询
//! - 开始时读不到频道（页面不在频道内或读取失败）则不锁定，不会暂停
//! - 任何桥接失败都终止会话，不重试、不回滚
//! - 取消在等待点和每次桥接调用前生效

use std::time::Duration;

use tracing::{info, warn};

use crate::bridge::{HostBridge, NoticeKind};
use crate::models::{Plan, Settings};
use crate::orchestrator::session::{
    FailureStage, Outcome, RunContext, UploadEvent, UploadSession,
};
use crate::services::MessageTemplate;
use crate::utils::{cancellable_sleep, poll_until, Wait};
use crate::workflow::{BatchCtx, BatchFlow, BatchResult};

/// 编排参数
#[derive(Debug, Clone)]
pub struct UploadOptions {
    /// 批次之间的等待时间
    pub inter_batch_delay: Duration,
    /// 频道不一致时的轮询间隔
    pub drift_poll_interval: Duration,
    /// 完成后是否显示页面通知
    pub show_notifications: bool,
    /// 消息模板
    pub message_template: String,
}

impl UploadOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            inter_batch_delay: Duration::from_millis(settings.inter_batch_delay_ms),
            drift_poll_interval: Duration::from_millis(settings.drift_poll_interval_ms),
            show_notifications: settings.show_notifications,
            message_template: settings.message_template.clone(),
        }
    }
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// 运行一次上传会话
///
/// 同一个计划再次运行会从第一批重新发送。
pub async fn run<B: HostBridge + ?Sized>(
    plan: &Plan,
    bridge: &B,
    options: &UploadOptions,
    ctx: &RunContext,
) -> Outcome {
    let mut session = UploadSession::new(plan);
    let total = session.total();

    if ctx.cancel.is_cancelled() {
        return finish(&mut session, Outcome::Cancelled, total, bridge, options, ctx).await;
    }

    let locked = bridge.current_location_id().await;
    info!(
        "🔒 上传锁定到频道: {}",
        locked.as_deref().unwrap_or("(无)")
    );
    session.start(locked);
    ctx.publish(session.progress(total));

    let flow = BatchFlow::new(MessageTemplate::new(options.message_template.clone()));

    while let Some(batch) = session.current_batch().cloned() {
        let batch_ctx = BatchCtx::new(&batch, session.cursor(), total);

        if wait_for_locked_location(&mut session, bridge, options, ctx, total).await
            == Wait::Cancelled
        {
            return finish(&mut session, Outcome::Cancelled, total, bridge, options, ctx).await;
        }

        let outcome = match flow.run(bridge, &batch, &batch_ctx, &ctx.cancel).await {
            BatchResult::Sent => None,
            BatchResult::Cancelled => Some(Outcome::Cancelled),
            BatchResult::AttachFailed => Some(Outcome::Failed(FailureStage::Attach)),
            BatchResult::SendFailed => Some(Outcome::Failed(FailureStage::Send)),
        };
        if let Some(outcome) = outcome {
            return finish(&mut session, outcome, total, bridge, options, ctx).await;
        }

        session.advance();
        ctx.events.emit(UploadEvent::Progress {
            done: session.cursor(),
            total,
        });
        ctx.publish(session.progress(total));

        if session.cursor() < total {
            info!(
                "⏳ 等待 {}ms 后发送下一批...",
                options.inter_batch_delay.as_millis()
            );
            if cancellable_sleep(options.inter_batch_delay, &ctx.cancel).await == Wait::Cancelled {
                return finish(&mut session, Outcome::Cancelled, total, bridge, options, ctx).await;
            }
        }
    }

    finish(&mut session, Outcome::Completed, total, bridge, options, ctx).await
}

/// 确认仍在锁定的频道，不在时暂停并轮询直到回来或被取消
async fn wait_for_locked_location<B: HostBridge + ?Sized>(
    session: &mut UploadSession,
    bridge: &B,
    options: &UploadOptions,
    ctx: &RunContext,
    total: usize,
) -> Wait {
    if ctx.cancel.is_cancelled() {
        return Wait::Cancelled;
    }

    // 开始时没有读到频道则不锁定
    let Some(locked) = session.locked_location_id().map(str::to_owned) else {
        return Wait::Done;
    };
    if bridge.current_location_id().await.as_deref() == Some(locked.as_str()) {
        return Wait::Done;
    }

    warn!("⚠️ 检测到频道切换，暂停上传...");
    session.pause();
    ctx.events.emit(UploadEvent::LocationDrift { paused: true });
    ctx.publish(session.progress(total));

    let expected = locked.as_str();
    let result = poll_until(options.drift_poll_interval, &ctx.cancel, move || async move {
        bridge.current_location_id().await.as_deref() == Some(expected)
    })
    .await;

    if result == Wait::Done {
        info!("✓ 已回到原频道，继续上传");
        session.resume();
        ctx.events.emit(UploadEvent::LocationDrift { paused: false });
        ctx.publish(session.progress(total));
    }

    result
}

/// 结束会话：清理状态、发出唯一的结果事件、按需显示页面通知
async fn finish<B: HostBridge + ?Sized>(
    session: &mut UploadSession,
    outcome: Outcome,
    total: usize,
    bridge: &B,
    options: &UploadOptions,
    ctx: &RunContext,
) -> Outcome {
    let done = session.cursor();
    session.finish(outcome);

    match outcome {
        Outcome::Completed => {
            info!("🎉 全部 {} 批上传完成", total);
            if options.show_notifications {
                bridge
                    .notify(
                        &format!("🎉 All {} batches uploaded successfully!", total),
                        NoticeKind::Success,
                    )
                    .await;
            }
        }
        Outcome::Cancelled => {
            warn!("⏹️ 上传已取消 (已发送 {}/{})", done, total);
        }
        Outcome::Failed(stage) => {
            warn!("❌ 上传失败: {} (已发送 {}/{})", stage, done, total);
            bridge
                .notify(&format!("❌ Upload failed: {}", stage), NoticeKind::Error)
                .await;
        }
    }

    ctx.events.emit(UploadEvent::Finished(outcome));
    ctx.publish(session.progress(total));
    outcome
}
