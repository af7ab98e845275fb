//! 批次处理上下文
//!
//! 封装"我正在发送第几批"这一信息

use std::fmt::Display;

use crate::models::Batch;
use crate::services::TemplateVars;

/// 批次处理上下文
#[derive(Debug, Clone)]
pub struct BatchCtx {
    /// 批次位置（从0开始，也是发送顺序）
    pub position: usize,

    /// 批次总数
    pub total: usize,

    /// 消息模板变量
    pub vars: TemplateVars,
}

impl BatchCtx {
    /// 创建新的批次上下文
    pub fn new(batch: &Batch, position: usize, total: usize) -> Self {
        Self {
            position,
            total,
            vars: TemplateVars::for_batch(batch, position, total),
        }
    }
}

impl Display for BatchCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[批次 {}/{}]", self.position + 1, self.total)
    }
}
