use crate::error::{AppResult, SettingsError};
use crate::models::settings::Settings;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info, warn};

/// 从 TOML 文件加载设置
///
/// 文件不存在时返回默认设置；缺失字段使用默认值。
pub async fn load_settings(settings_path: &Path) -> AppResult<Settings> {
    if !fs::try_exists(settings_path).await.unwrap_or(false) {
        info!(
            "设置文件不存在，使用默认设置: {}",
            settings_path.display()
        );
        return Ok(Settings::default());
    }

    let content = fs::read_to_string(settings_path)
        .await
        .map_err(|source| SettingsError::ReadFailed {
            path: settings_path.display().to_string(),
            source,
        })?;

    let settings: Settings =
        toml::from_str(&content).map_err(|source| SettingsError::TomlParseFailed {
            path: settings_path.display().to_string(),
            source,
        })?;

    debug!("设置已加载: {:?}", settings);
    Ok(settings)
}

/// 将设置写回 TOML 文件
pub async fn save_settings(settings_path: &Path, settings: &Settings) -> AppResult<()> {
    let content = toml::to_string_pretty(settings).map_err(SettingsError::from)?;

    if let Some(parent) = settings_path.parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = fs::create_dir_all(parent).await {
                warn!("无法创建设置目录 {}: {}", parent.display(), e);
            }
        }
    }

    fs::write(settings_path, content)
        .await
        .map_err(|source| SettingsError::WriteFailed {
            path: settings_path.display().to_string(),
            source,
        })?;

    info!("✓ 设置已保存: {}", settings_path.display());
    Ok(())
}
