//! 待上传的本地文件描述

use std::path::{Path, PathBuf};
use std::sync::Arc;

/// 文件描述
///
/// 身份按引用区分：同名同大小的两个描述是两个不同的文件，
/// 在计划和会话中统一用 [`FileRef`]（`Arc`）传递，比较时使用 `Arc::ptr_eq`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    /// 文件名（用于日志和预览）
    pub name: String,
    /// 文件大小（字节）
    pub size_bytes: u64,
    /// 本地路径（交给浏览器的文件选择框）
    pub path: PathBuf,
}

/// 共享的文件引用
pub type FileRef = Arc<FileDescriptor>;

impl FileDescriptor {
    /// 创建只有名称和大小的描述，路径与名称相同
    pub fn new(name: impl Into<String>, size_bytes: u64) -> Self {
        let name = name.into();
        Self {
            path: PathBuf::from(&name),
            name,
            size_bytes,
        }
    }

    /// 从本地路径创建描述，名称取路径中的文件名
    pub fn from_path(path: impl AsRef<Path>, size_bytes: u64) -> Self {
        let path = path.as_ref();
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        Self {
            name,
            size_bytes,
            path: path.to_path_buf(),
        }
    }

    /// 包装为共享引用
    pub fn into_ref(self) -> FileRef {
        Arc::new(self)
    }
}
