//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责上传会话的生命周期和批次调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 加载设置、扫描文件、生成计划
//! - 交给展示层确认（可换档位重新计划）
//! - 连接浏览器、创建 DiscordBridge
//! - 启动会话并输出最终结果
//!
//! ### `uploader` - 会话入口
//! - 保证同一时间只有一个会话
//! - 在后台任务中运行会话，对外只暴露进度和取消
//!
//! ### `upload_orchestrator` - 会话状态机
//! - 频道锁定、暂停/恢复
//! - 逐批调用 workflow::BatchFlow
//! - 产生唯一的最终结果
//!
//! ### `session` - 会话数据
//! - UploadSession / Outcome / UploadEvent / SessionHandle
//!
//! ## 层次关系
//!
//! ```text
//! app (文件 → 计划 → 确认)
//!     ↓
//! uploader (单会话保护)
//!     ↓
//! upload_orchestrator (处理 Vec<Batch>)
//!     ↓
//! workflow::BatchFlow (处理单个 Batch)
//!     ↓
//! bridge (能力层：attach / send / location)
//!     ↓
//! infrastructure (基础设施：JsExecutor)
//! ```

pub mod app;
pub mod session;
pub mod upload_orchestrator;
pub mod uploader;

// 重新导出主要类型
pub use app::App;
pub use session::{
    EventSink, FailureStage, Outcome, Progress, RunContext, SessionHandle, SessionState,
    UploadEvent, UploadSession,
};
pub use upload_orchestrator::{run, UploadOptions};
pub use uploader::{ActiveUpload, Uploader};
