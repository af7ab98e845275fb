//! 宿主页面桥接
//!
//! 编排层只依赖 [`HostBridge`] 的布尔成功约定，不关心页面元素是怎么找到的。

pub mod discord;

use async_trait::async_trait;

use crate::models::FileRef;

pub use discord::{DiscordBridge, HostTimings};

/// 页面通知类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// 宿主页面能力
#[async_trait]
pub trait HostBridge: Send + Sync {
    /// 当前所在的会话/频道 id
    async fn current_location_id(&self) -> Option<String>;

    /// 把一批文件放进消息输入区
    async fn attach_files(&self, files: &[FileRef]) -> bool;

    /// 写入消息文本并发送
    async fn send_message(&self, text: &str) -> bool;

    /// 在页面上显示一条通知，失败时忽略
    async fn notify(&self, _text: &str, _kind: NoticeKind) {}
}
