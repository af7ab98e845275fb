//! Discord 网页版桥接
//!
//! 通过 [`JsExecutor`] 操作 Discord 页面：
//! - 频道 id 从 `location.pathname` 解析
//! - 文件通过 CDP 放进消息框的 `<input type="file">`
//! - 文本写入 contenteditable 输入框后模拟回车发送

use async_trait::async_trait;
use regex::Regex;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::bridge::{HostBridge, NoticeKind};
use crate::error::{AppError, AppResult};
use crate::infrastructure::JsExecutor;
use crate::models::{FileRef, Settings};

/// 文件选择框，优先选支持多选的那个
const FILE_INPUT_SELECTORS: [&str; 2] = [r#"input[type="file"][multiple]"#, r#"input[type="file"]"#];

/// 消息输入框候选选择器，按顺序尝试
const TEXTBOX_SELECTORS: [&str; 4] = [
    r#"[data-slate-editor="true"]"#,
    r#"[role="textbox"]"#,
    r#"div[class*="slateTextArea"]"#,
    r#"div[contenteditable="true"]"#,
];

/// 页面响应等待时间
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostTimings {
    /// 附加文件后
    pub attach_settle: Duration,
    /// 写入文本后
    pub text_settle: Duration,
    /// 按下回车后
    pub send_settle: Duration,
}

impl HostTimings {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            attach_settle: Duration::from_millis(settings.attach_settle_ms),
            text_settle: Duration::from_millis(settings.text_settle_ms),
            send_settle: Duration::from_millis(settings.send_settle_ms),
        }
    }
}

impl Default for HostTimings {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Discord 页面桥接
pub struct DiscordBridge {
    executor: JsExecutor,
    timings: HostTimings,
}

impl DiscordBridge {
    pub fn new(executor: JsExecutor, timings: HostTimings) -> Self {
        Self { executor, timings }
    }

    /// 依次尝试文件选择框，直到有一个接受文件
    async fn attach_paths(&self, paths: Vec<String>) -> AppResult<()> {
        for selector in FILE_INPUT_SELECTORS {
            match self.executor.set_input_files(selector, paths.clone()).await {
                Ok(()) => {
                    debug!("已通过 {} 附加 {} 个文件", selector, paths.len());
                    return Ok(());
                }
                Err(e) => debug!("选择器 {} 附加失败: {}", selector, e),
            }
        }
        Err(AppError::element_not_found(FILE_INPUT_SELECTORS.join(", ")))
    }

    /// 找到输入框并写入文本
    async fn fill_textbox(&self, text: &str) -> AppResult<()> {
        let js_code = format!(
            r#"
            (() => {{
                const selectors = {selectors};
                for (const sel of selectors) {{
                    const el = document.querySelector(sel);
                    if (el && el.getAttribute('contenteditable') === 'true') {{
                        el.focus();
                        el.textContent = {text};
                        el.dispatchEvent(new Event('input', {{ bubbles: true }}));
                        return true;
                    }}
                }}
                return false;
            }})()
            "#,
            selectors = serde_json::to_string(&TEXTBOX_SELECTORS)?,
            text = serde_json::to_string(text)?,
        );
        let found = self
            .executor
            .eval_as::<bool>(js_code)
            .await
            .map_err(|e| AppError::bridge_step_failed("写入消息文本", e))?;
        if !found {
            return Err(AppError::element_not_found(TEXTBOX_SELECTORS.join(", ")));
        }
        Ok(())
    }

    /// 在输入框上模拟回车
    async fn press_enter(&self) -> AppResult<()> {
        let js_code = format!(
            r#"
            (() => {{
                const selectors = {selectors};
                for (const sel of selectors) {{
                    const el = document.querySelector(sel);
                    if (el && el.getAttribute('contenteditable') === 'true') {{
                        el.dispatchEvent(new KeyboardEvent('keydown', {{
                            key: 'Enter', code: 'Enter', keyCode: 13, which: 13,
                            bubbles: true, cancelable: true
                        }}));
                        return true;
                    }}
                }}
                return false;
            }})()
            "#,
            selectors = serde_json::to_string(&TEXTBOX_SELECTORS)?,
        );
        let found = self
            .executor
            .eval_as::<bool>(js_code)
            .await
            .map_err(|e| AppError::bridge_step_failed("模拟回车", e))?;
        if !found {
            return Err(AppError::element_not_found(TEXTBOX_SELECTORS.join(", ")));
        }
        Ok(())
    }
}

#[async_trait]
impl HostBridge for DiscordBridge {
    async fn current_location_id(&self) -> Option<String> {
        match self
            .executor
            .eval_as::<String>("window.location.pathname")
            .await
        {
            Ok(path) => parse_channel_id(&path),
            Err(e) => {
                warn!("读取页面地址失败: {}", e);
                None
            }
        }
    }

    async fn attach_files(&self, files: &[FileRef]) -> bool {
        let paths: Vec<String> = files
            .iter()
            .map(|f| f.path.to_string_lossy().to_string())
            .collect();

        if let Err(e) = self.attach_paths(paths).await {
            warn!("附加文件失败: {}", e);
            return false;
        }

        sleep(self.timings.attach_settle).await;
        true
    }

    async fn send_message(&self, text: &str) -> bool {
        if let Err(e) = self.fill_textbox(text).await {
            warn!("写入消息文本失败: {}", e);
            return false;
        }

        sleep(self.timings.text_settle).await;

        if let Err(e) = self.press_enter().await {
            warn!("发送消息失败: {}", e);
            return false;
        }

        sleep(self.timings.send_settle).await;
        true
    }

    async fn notify(&self, text: &str, kind: NoticeKind) {
        let (background, lifetime_ms) = match kind {
            NoticeKind::Success => ("#3ba55d", 5000),
            NoticeKind::Error => ("#ed4245", 8000),
        };
        let js_code = match serde_json::to_string(text) {
            Ok(text) => format!(
                r#"
                (() => {{
                    const el = document.createElement('div');
                    el.style.cssText = 'position:fixed;bottom:20px;right:20px;z-index:9999999;'
                        + 'padding:12px 18px;border-radius:8px;color:#fff;font-weight:600;'
                        + 'background:{background};';
                    el.textContent = {text};
                    document.body.appendChild(el);
                    setTimeout(() => el.remove(), {lifetime_ms});
                    return true;
                }})()
                "#
            ),
            Err(e) => {
                warn!("通知文本编码失败: {}", e);
                return;
            }
        };

        if let Err(e) = self.executor.eval(js_code).await {
            warn!("显示页面通知失败: {}", e);
        }
    }
}

/// 从 `/channels/<服务器id|@me>/<频道id>` 中取出频道 id
pub fn parse_channel_id(pathname: &str) -> Option<String> {
    let re = Regex::new(r"^/channels/(?:\d+|@me)/(\d+)").ok()?;
    re.captures(pathname)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
