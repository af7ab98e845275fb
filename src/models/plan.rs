//! 上传计划：批次与被跳过的文件

use crate::models::file::FileRef;
use crate::models::limits::{format_mb, LimitsProfile};

/// 一个批次，对应一条消息
///
/// 只能由批次规划器创建和填充，之后只读。
#[derive(Debug, Clone)]
pub struct Batch {
    files: Vec<FileRef>,
    total_bytes: u64,
}

impl Batch {
    pub(crate) fn with_first(file: FileRef) -> Self {
        Self {
            total_bytes: file.size_bytes,
            files: vec![file],
        }
    }

    /// 加入文件后是否仍满足数量和总量上限（边界值允许）
    pub(crate) fn accepts(&self, file: &FileRef, limits: &LimitsProfile) -> bool {
        self.files.len() < limits.max_files_per_message
            && self
                .total_bytes
                .checked_add(file.size_bytes)
                .is_some_and(|total| total <= limits.per_message_bytes_max)
    }

    pub(crate) fn push(&mut self, file: FileRef) {
        self.total_bytes = self.total_bytes.saturating_add(file.size_bytes);
        self.files.push(file);
    }

    pub fn files(&self) -> &[FileRef] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// 总大小（MB，一位小数）
    pub fn total_mb(&self) -> String {
        format_mb(self.total_bytes)
    }
}

/// 被跳过的文件
#[derive(Debug, Clone)]
pub struct SkipRecord {
    pub file: FileRef,
    pub reason: String,
}

/// 上传计划
#[derive(Debug, Clone)]
pub struct Plan {
    /// 生成计划时使用的限制
    pub limits: LimitsProfile,
    /// 按发送顺序排列的批次
    pub batches: Vec<Batch>,
    /// 单个文件就超出上限的文件
    pub skipped: Vec<SkipRecord>,
}

impl Plan {
    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// 所有批次中的文件数
    pub fn file_count(&self) -> usize {
        self.batches.iter().map(Batch::len).sum()
    }

    /// 所有批次的总大小
    pub fn total_bytes(&self) -> u64 {
        self.batches
            .iter()
            .fold(0u64, |acc, batch| acc.saturating_add(batch.total_bytes()))
    }
}
