/// 程序配置文件
///
/// 只包含运行环境相关的配置；用户偏好（档位、模板、延迟）在 [`crate::models::Settings`] 中。
#[derive(Clone, Debug)]
pub struct Config {
    /// 浏览器调试端口
    pub browser_debug_port: u16,
    /// 目标URL（找不到已打开的 Discord 页面时导航到这里）
    pub target_url: String,
    /// 目标页面标题关键字
    pub target_title: String,
    /// 设置文件路径
    pub settings_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browser_debug_port: 9222,
            target_url: "https://discord.com/channels/@me".to_string(),
            target_title: "Discord".to_string(),
            settings_file: "batch_uploader.toml".to_string(),
            verbose_logging: false,
            output_log_file: "upload_log.txt".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            browser_debug_port: std::env::var("BROWSER_DEBUG_PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.browser_debug_port),
            target_url: std::env::var("TARGET_URL").unwrap_or(default.target_url),
            target_title: std::env::var("TARGET_TITLE").unwrap_or(default.target_title),
            settings_file: std::env::var("SETTINGS_FILE").unwrap_or(default.settings_file),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
        }
    }
}
