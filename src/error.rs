use thiserror::Error;

use crate::workflow::BranchState;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 文档解析错误
    #[error("文档错误: {0}")]
    Extract(#[from] ExtractError),

    /// 评审要点不合法（空列表或空白要点）
    #[error("评审要点不合法: {reason}")]
    InvalidReviewPoints { reason: String },

    /// 某个评审要点的生成后端调用失败
    #[error("评审要点「{review_point}」在 {stage} 阶段失败: {source}")]
    Backend {
        review_point: String,
        stage: BranchState,
        #[source]
        source: BackendError,
    },

    /// 并发任务异常终止（panic 或被取消）
    #[error("评审任务异常终止: {reason}")]
    TaskAborted { reason: String },

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// HTTP 服务错误
    #[error("服务错误: {0}")]
    Server(String),
}

impl AppError {
    /// 是否属于调用方错误（对应 HTTP 4xx）
    pub fn is_client_error(&self) -> bool {
        match self {
            AppError::Extract(e) => e.is_client_error(),
            AppError::InvalidReviewPoints { .. } => true,
            _ => false,
        }
    }

    /// 创建分支失败错误
    pub fn backend(
        review_point: impl Into<String>,
        stage: BranchState,
        source: BackendError,
    ) -> Self {
        AppError::Backend {
            review_point: review_point.into(),
            stage,
            source,
        }
    }
}

/// 文档解析错误
#[derive(Debug, Error)]
pub enum ExtractError {
    /// 扩展名不在支持范围内
    #[error("不支持的文件格式 ({path}): 仅支持 docx 或 md 文件")]
    UnsupportedFormat { path: String },

    /// 文件不存在或不可读
    #[error("文件不存在: {path}")]
    NotFound { path: String },

    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// 文档结构损坏（zip 或 XML 无法解析）
    #[error("文档结构损坏 ({path}): {reason}")]
    MalformedDocument { path: String, reason: String },
}

impl ExtractError {
    /// 格式与文件缺失属于调用方错误，读取失败属于服务端错误
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ExtractError::ReadFailed { .. })
    }
}

/// 生成后端错误
#[derive(Debug, Error)]
pub enum BackendError {
    /// 网络请求失败
    #[error("{backend} 请求失败: {source}")]
    RequestFailed {
        backend: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// 后端返回非成功状态码
    #[error("{backend} 返回错误状态 {status}: {message}")]
    BadStatus {
        backend: String,
        status: u16,
        message: String,
    },

    /// 响应体无法解析
    #[error("{backend} 响应无法解析: {reason}")]
    MalformedResponse { backend: String, reason: String },

    /// 返回内容为空
    #[error("{backend} 返回内容为空 (模型: {model})")]
    EmptyContent { backend: String, model: String },

    /// 调用超时
    #[error("{backend} 调用超时 ({seconds} 秒)")]
    Timeout { backend: String, seconds: u64 },
}

impl BackendError {
    /// 创建网络请求失败错误
    pub fn request_failed(
        backend: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        BackendError::RequestFailed {
            backend: backend.into(),
            source: Box::new(source),
        }
    }
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({path}): {source}")]
    FileReadFailed {
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

    /// 缺少 API Key
    #[error("未配置 API Key，请设置 LLM_API_KEY 或 DASHSCOPE_API_KEY")]
    MissingApiKey,

    /// 配置值不合法
    #[error("配置项 {field} 不合法: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
