//! # Discord Batch Uploader
//!
//! 把超出 Discord 单文件 / 单消息限制的一组文件拆成多个批次，逐条消息自动上传
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `JsExecutor` - 唯一的 page owner，提供 eval() 和文件选择框能力
//! - `bridge/` - `HostBridge` 约定及其 Discord 实现
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 纯计算，不做 I/O
//! - `batch_planner` - First Fit Decreasing 批次规划
//! - `message_template` - 批次消息模板
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个批次"的发送流程
//! - `BatchCtx` - 上下文封装（第几批 / 共几批）
//! - `BatchFlow` - 流程编排（attach → 模板 → send）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/upload_orchestrator` - 会话状态机（频道锁定、暂停、取消）
//! - `orchestrator/uploader` - 单会话保护
//! - `orchestrator/app` - 应用入口
//!
//! ## 模块结构

pub mod bridge;
pub mod browser;
pub mod cli;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod presentation;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use bridge::{DiscordBridge, HostBridge};
pub use browser::connect_to_browser_and_page;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::JsExecutor;
pub use models::{Batch, FileDescriptor, FileRef, LimitsProfile, Plan, SkipRecord, Tier};
pub use orchestrator::{App, Outcome, SessionHandle, UploadEvent, UploadOptions, Uploader};
pub use services::plan;
pub use workflow::{BatchCtx, BatchFlow, BatchResult};
