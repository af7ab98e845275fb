//! 上传会话：状态、事件、对外句柄
//!
//! 会话本身只归运行循环所有；外部只能通过 [`SessionHandle`] 读取进度和请求取消。

use std::fmt;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use crate::models::{Batch, Plan};

/// 会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
    Paused,
    Completed,
    Cancelled,
    Failed,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Completed | SessionState::Cancelled | SessionState::Failed
        )
    }
}

/// 失败的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    Attach,
    Send,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureStage::Attach => f.write_str("attach failed"),
            FailureStage::Send => f.write_str("send failed"),
        }
    }
}

/// 会话的最终结果，每次运行恰好产生一个
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Cancelled,
    Failed(FailureStage),
}

impl Outcome {
    fn state(&self) -> SessionState {
        match self {
            Outcome::Completed => SessionState::Completed,
            Outcome::Cancelled => SessionState::Cancelled,
            Outcome::Failed(_) => SessionState::Failed,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Completed => f.write_str("completed"),
            Outcome::Cancelled => f.write_str("cancelled"),
            Outcome::Failed(stage) => write!(f, "failed: {}", stage),
        }
    }
}

/// 可读的进度快照
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// 已发送的批次数
    pub done: usize,
    /// 批次总数
    pub total: usize,
    pub state: SessionState,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            done: 0,
            total: 0,
            state: SessionState::Idle,
        }
    }
}

/// 发给展示层的事件
#[derive(Debug, Clone)]
pub enum UploadEvent {
    /// 计划已生成（或因换档位重新生成）
    PlanReady(Plan),
    /// 第 `done` 批已发送
    Progress { done: usize, total: usize },
    /// 频道切换导致暂停（true）或恢复（false）
    LocationDrift { paused: bool },
    /// 会话结束
    Finished(Outcome),
}

/// 事件出口，接收端丢弃后事件被静默丢弃
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    tx: Option<mpsc::UnboundedSender<UploadEvent>>,
}

impl EventSink {
    pub fn new(tx: mpsc::UnboundedSender<UploadEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    /// 不接收任何事件
    pub fn none() -> Self {
        Self::default()
    }

    pub fn emit(&self, event: UploadEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }
}

/// 上传会话
#[derive(Debug)]
pub struct UploadSession {
    plan: Vec<Batch>,
    cursor: usize,
    locked_location_id: Option<String>,
    paused: bool,
    state: SessionState,
}

impl UploadSession {
    pub fn new(plan: &Plan) -> Self {
        Self {
            plan: plan.batches.clone(),
            cursor: 0,
            locked_location_id: None,
            paused: false,
            state: SessionState::Idle,
        }
    }

    /// 锁定频道并进入运行状态
    pub fn start(&mut self, location_id: Option<String>) {
        self.locked_location_id = location_id;
        self.cursor = 0;
        self.paused = false;
        self.state = SessionState::Running;
    }

    pub fn total(&self) -> usize {
        self.plan.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn locked_location_id(&self) -> Option<&str> {
        self.locked_location_id.as_deref()
    }

    /// 下一个待发送的批次
    pub fn current_batch(&self) -> Option<&Batch> {
        if self.state.is_terminal() {
            return None;
        }
        self.plan.get(self.cursor)
    }

    /// 当前批次已发送
    pub fn advance(&mut self) {
        if self.cursor < self.plan.len() {
            self.cursor += 1;
        }
    }

    pub fn pause(&mut self) {
        self.paused = true;
        self.state = SessionState::Paused;
    }

    pub fn resume(&mut self) {
        self.paused = false;
        self.state = SessionState::Running;
    }

    /// 结束会话，清空计划和频道锁
    pub fn finish(&mut self, outcome: Outcome) {
        self.state = outcome.state();
        self.paused = false;
        self.locked_location_id = None;
        self.plan.clear();
    }

    pub fn progress(&self, total: usize) -> Progress {
        Progress {
            done: self.cursor,
            total,
            state: self.state,
        }
    }
}

/// 运行循环使用的通道
pub struct RunContext {
    pub cancel: CancellationToken,
    pub events: EventSink,
    progress: watch::Sender<Progress>,
}

impl RunContext {
    /// 创建运行通道和对应的外部句柄
    pub fn new(events: EventSink) -> (Self, SessionHandle) {
        let cancel = CancellationToken::new();
        let (progress_tx, progress_rx) = watch::channel(Progress::default());
        let handle = SessionHandle {
            cancel: cancel.clone(),
            progress: progress_rx,
        };
        (
            Self {
                cancel,
                events,
                progress: progress_tx,
            },
            handle,
        )
    }

    pub fn publish(&self, progress: Progress) {
        self.progress.send_replace(progress);
    }
}

/// 外部句柄：只读进度 + 取消
#[derive(Debug, Clone)]
pub struct SessionHandle {
    cancel: CancellationToken,
    progress: watch::Receiver<Progress>,
}

impl SessionHandle {
    /// 请求取消，在下一个等待点或下一次桥接调用前生效
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// 当前进度
    pub fn progress(&self) -> Progress {
        *self.progress.borrow()
    }

    /// 等待下一次进度变化，会话结束后返回 `None`
    pub async fn changed(&mut self) -> Option<Progress> {
        self.progress.changed().await.ok()?;
        Some(*self.progress.borrow_and_update())
    }
}
