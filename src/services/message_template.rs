//! 批次消息模板
//!
//! 支持的占位符：`{index}`（从 1 开始）、`{total}`、`{count}`、`{size}`（MB，一位小数）。
//! 未知占位符原样保留。

use crate::models::Batch;

/// 渲染模板所需的批次信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateVars {
    pub index: usize,
    pub total: usize,
    pub count: usize,
    pub size_mb: String,
}

impl TemplateVars {
    /// 由批次位置（从 0 开始）生成
    pub fn for_batch(batch: &Batch, position: usize, total: usize) -> Self {
        Self {
            index: position + 1,
            total,
            count: batch.len(),
            size_mb: batch.total_mb(),
        }
    }
}

/// 消息模板
#[derive(Debug, Clone)]
pub struct MessageTemplate {
    template: String,
}

impl MessageTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// 替换所有已知占位符
    pub fn render(&self, vars: &TemplateVars) -> String {
        self.template
            .replace("{index}", &vars.index.to_string())
            .replace("{total}", &vars.total.to_string())
            .replace("{count}", &vars.count.to_string())
            .replace("{size}", &vars.size_mb)
    }
}
