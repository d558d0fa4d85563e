//! 生成后端抽象
//!
//! 编排层只依赖 [`GenerationBackend`]，不感知具体服务商。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::clients::{DashScopeClient, OpenAiCompatibleClient};
use crate::config::{BackendKind, Config};
use crate::error::BackendError;
use crate::models::ModelParams;

/// 一次生成请求：system + user 两条消息
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system_message: String,
    pub user_message: String,
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl GenerationRequest {
    pub fn new(
        system_message: impl Into<String>,
        user_message: impl Into<String>,
        params: &ModelParams,
    ) -> Self {
        Self {
            system_message: system_message.into(),
            user_message: user_message.into(),
            model: params.model_name.clone(),
            temperature: params.temperature,
            max_output_tokens: params.max_output_tokens,
        }
    }
}

/// 文本生成后端
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// 后端名称（用于日志与错误信息）
    fn name(&self) -> &str;

    /// 发送请求并返回生成的文本
    async fn generate(&self, request: &GenerationRequest) -> Result<String, BackendError>;
}

/// 按配置构建生成后端
pub fn build_backend(config: &Config) -> Arc<dyn GenerationBackend> {
    match config.backend {
        BackendKind::Openai => Arc::new(OpenAiCompatibleClient::new(
            &config.llm_api_key,
            &config.llm_api_base_url,
        )),
        BackendKind::Dashscope => Arc::new(DashScopeClient::new(
            &config.llm_api_key,
            &config.llm_api_base_url,
        )),
    }
}

/// 带超时的生成调用，超时转为 `BackendError::Timeout`
pub async fn generate_with_timeout(
    backend: &dyn GenerationBackend,
    request: &GenerationRequest,
    timeout: Duration,
) -> Result<String, BackendError> {
    match tokio::time::timeout(timeout, backend.generate(request)).await {
        Ok(result) => result,
        Err(_) => {
            warn!("{} 调用超时 ({:?})", backend.name(), timeout);
            Err(BackendError::Timeout {
                backend: backend.name().to_string(),
                seconds: timeout.as_secs(),
            })
        }
    }
}
