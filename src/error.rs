use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 浏览器相关错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] BrowserError),
    /// 页面操作错误
    #[error("桥接错误: {0}")]
    Bridge(#[from] BridgeError),
    /// 设置读写错误
    #[error("设置错误: {0}")]
    Settings(#[from] SettingsError),
    /// 输入文件错误
    #[error("输入错误: {0}")]
    Input(#[from] InputError),
    /// 上传会话错误
    #[error("上传错误: {0}")]
    Upload(#[from] UploadError),
    /// 其他错误（用于包装第三方库错误）
    #[error("错误: {0}")]
    Other(String),
}

/// 浏览器相关错误
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 连接浏览器失败
    #[error("无法连接到浏览器 (端口: {port}): {source}")]
    ConnectionFailed {
        port: u16,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 执行脚本失败
    #[error("执行脚本失败: {source}")]
    ScriptExecutionFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// 页面操作错误
#[derive(Debug, Error)]
pub enum BridgeError {
    /// 页面中找不到元素
    #[error("页面中找不到元素: {selector}")]
    ElementNotFound { selector: String },
    /// 某一步页面操作失败
    #[error("{step}失败: {source}")]
    StepFailed {
        step: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// 设置读写错误
#[derive(Debug, Error)]
pub enum SettingsError {
    /// 读取设置文件失败
    #[error("读取设置文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入设置文件失败
    #[error("写入设置文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// TOML 序列化失败
    #[error("TOML序列化失败: {0}")]
    TomlSerializeFailed(#[from] toml::ser::Error),
}

/// 输入文件错误
#[derive(Debug, Error)]
pub enum InputError {
    /// 路径不存在
    #[error("路径不存在: {path}")]
    NotFound { path: String },
    /// 读取文件信息失败
    #[error("读取文件信息失败 ({path}): {source}")]
    MetadataFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 上传会话错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadError {
    /// 已有会话在运行
    #[error("已有上传会话正在进行")]
    SessionActive,
    /// 上传计划为空
    #[error("上传计划为空，没有可发送的批次")]
    EmptyPlan,
}

// ========== 从常见错误类型转换 ==========

impl From<chromiumoxide::error::CdpError> for AppError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AppError::Browser(BrowserError::ScriptExecutionFailed {
            source: Box::new(err),
        })
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Browser(BrowserError::ScriptExecutionFailed {
            source: Box::new(err),
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建浏览器连接错误
    pub fn browser_connection_failed(
        port: u16,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Browser(BrowserError::ConnectionFailed {
            port,
            source: Box::new(source),
        })
    }

    /// 创建元素缺失错误
    pub fn element_not_found(selector: impl Into<String>) -> Self {
        AppError::Bridge(BridgeError::ElementNotFound {
            selector: selector.into(),
        })
    }

    /// 创建页面操作失败错误
    pub fn bridge_step_failed(
        step: &'static str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        AppError::Bridge(BridgeError::StepFailed {
            step,
            source: source.into(),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
