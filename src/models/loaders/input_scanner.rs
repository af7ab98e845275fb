use crate::error::{AppResult, InputError};
use crate::models::file::{FileDescriptor, FileRef};
use std::path::{Path, PathBuf};
use tokio::fs;

/// 扫描命令行给出的路径，生成文件列表
///
/// - 文件直接加入
/// - 目录只读取一层，按文件名排序
/// - 目录中无法读取的条目记录警告后跳过
pub async fn scan_inputs(paths: &[PathBuf]) -> AppResult<Vec<FileRef>> {
    let mut files = Vec::new();

    for path in paths {
        let metadata = fs::metadata(path).await.map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                InputError::NotFound {
                    path: path.display().to_string(),
                }
            } else {
                InputError::MetadataFailed {
                    path: path.display().to_string(),
                    source,
                }
            }
        })?;

        if metadata.is_dir() {
            let entries = scan_directory(path).await?;
            tracing::info!(
                "目录 {} 中找到 {} 个文件",
                path.display(),
                entries.len()
            );
            files.extend(entries);
        } else {
            files.push(FileDescriptor::from_path(path, metadata.len()).into_ref());
        }
    }

    Ok(files)
}

/// 读取目录下的所有普通文件（不递归）
async fn scan_directory(folder: &Path) -> AppResult<Vec<FileRef>> {
    let mut entries = fs::read_dir(folder)
        .await
        .map_err(|source| InputError::MetadataFailed {
            path: folder.display().to_string(),
            source,
        })?;

    let mut found = Vec::new();
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("读取目录条目失败 {}: {}", folder.display(), e);
                break;
            }
        };

        let path = entry.path();
        match entry.metadata().await {
            Ok(metadata) if metadata.is_file() => {
                found.push(FileDescriptor::from_path(&path, metadata.len()));
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!("读取文件信息失败 {}: {}", path.display(), e);
            }
        }
    }

    found.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(found.into_iter().map(FileDescriptor::into_ref).collect())
}
