//! OpenAI 兼容后端
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点，兼容 OpenAI API 的服务（DashScope 兼容模式、Azure、Doubao 等）

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::clients::llm_client::{GenerationBackend, GenerationRequest};
use crate::error::BackendError;

const BACKEND_NAME: &str = "openai";

/// OpenAI Chat Completions 兼容客户端
pub struct OpenAiCompatibleClient {
    client: Client<OpenAIConfig>,
}

impl OpenAiCompatibleClient {
    pub fn new(api_key: &str, api_base_url: &str) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(api_base_url);

        Self {
            client: Client::with_config(openai_config),
        }
    }
}

#[async_trait]
impl GenerationBackend for OpenAiCompatibleClient {
    fn name(&self) -> &str {
        BACKEND_NAME
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, BackendError> {
        debug!("调用 LLM API，模型: {}", request.model);
        debug!("用户消息长度: {} 字符", request.user_message.chars().count());

        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(request.system_message.as_str())
            .build()
            .map_err(|e| BackendError::request_failed(BACKEND_NAME, e))?;
        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(request.user_message.as_str())
            .build()
            .map_err(|e| BackendError::request_failed(BACKEND_NAME, e))?;

        let messages = vec![
            ChatCompletionRequestMessage::System(system_msg),
            ChatCompletionRequestMessage::User(user_msg),
        ];

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&request.model)
            .messages(messages)
            .temperature(request.temperature)
            .max_tokens(request.max_output_tokens)
            .build()
            .map_err(|e| BackendError::request_failed(BACKEND_NAME, e))?;

        let response = self.client.chat().create(chat_request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            BackendError::request_failed(BACKEND_NAME, e)
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| BackendError::EmptyContent {
                backend: BACKEND_NAME.to_string(),
                model: request.model.clone(),
            })?;

        Ok(content)
    }
}
