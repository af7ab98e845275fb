//! 用户设置

use serde::{Deserialize, Serialize};

use crate::models::limits::Tier;

/// 默认消息模板
pub const DEFAULT_MESSAGE_TEMPLATE: &str = "📦 Batch {index}/{total} • {count} files • {size} MB";

/// 用户设置
///
/// 缺失或未知的字段在反序列化时回退为默认值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// 是否启用
    pub enabled: bool,
    /// 默认档位 id（0-3）
    pub default_tier: u8,
    /// 完成后是否在页面上显示通知
    pub show_notifications: bool,
    /// 批次之间的等待时间
    pub inter_batch_delay_ms: u64,
    /// 每个批次附带的消息模板
    pub message_template: String,

    // --- 页面响应时间 ---
    /// 附加文件后等待页面处理的时间
    pub attach_settle_ms: u64,
    /// 写入文本后等待的时间
    pub text_settle_ms: u64,
    /// 按下发送后等待的时间
    pub send_settle_ms: u64,
    /// 频道切换时的轮询间隔
    pub drift_poll_interval_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            default_tier: Tier::Nitro.id(),
            show_notifications: true,
            inter_batch_delay_ms: 300,
            message_template: DEFAULT_MESSAGE_TEMPLATE.to_string(),
            attach_settle_ms: 500,
            text_settle_ms: 100,
            send_settle_ms: 300,
            drift_poll_interval_ms: 500,
        }
    }
}

impl Settings {
    /// 当前默认档位
    pub fn tier(&self) -> Tier {
        Tier::from_id(self.default_tier)
    }
}
