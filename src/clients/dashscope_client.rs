//! DashScope 原生文本生成后端
//!
//! `POST {base}/services/aigc/text-generation/generation`，使用 message 格式返回。

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::clients::llm_client::{GenerationBackend, GenerationRequest};
use crate::error::BackendError;

const BACKEND_NAME: &str = "dashscope";
const GENERATION_PATH: &str = "/services/aigc/text-generation/generation";

/// DashScope 客户端
pub struct DashScopeClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl DashScopeClient {
    pub fn new(api_key: &str, api_base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.to_string(),
            endpoint: format!("{}{}", api_base_url.trim_end_matches('/'), GENERATION_PATH),
        }
    }

    fn build_body(request: &GenerationRequest) -> serde_json::Value {
        json!({
            "model": request.model,
            "input": {
                "messages": [
                    { "role": "system", "content": request.system_message },
                    { "role": "user", "content": request.user_message },
                ]
            },
            "parameters": {
                "temperature": request.temperature,
                "max_tokens": request.max_output_tokens,
                "result_format": "message",
            }
        })
    }
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    output: Option<GenerationOutput>,
}

#[derive(Debug, Deserialize)]
struct GenerationOutput {
    #[serde(default)]
    choices: Vec<GenerationChoice>,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerationChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
}

/// 从响应体中提取生成文本：优先 `output.choices[0].message.content`，其次 `output.text`
fn extract_content(body: &str, model: &str) -> Result<String, BackendError> {
    let response: GenerationResponse =
        serde_json::from_str(body).map_err(|e| BackendError::MalformedResponse {
            backend: BACKEND_NAME.to_string(),
            reason: e.to_string(),
        })?;

    let output = response.output.ok_or_else(|| BackendError::MalformedResponse {
        backend: BACKEND_NAME.to_string(),
        reason: "响应缺少 output 字段".to_string(),
    })?;

    output
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .or(output.text)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or_else(|| BackendError::EmptyContent {
            backend: BACKEND_NAME.to_string(),
            model: model.to_string(),
        })
}

fn describe_error(body: &str) -> String {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    match (parsed.code, parsed.message) {
        (Some(code), Some(message)) => format!("{}: {}", code, message),
        (None, Some(message)) => message,
        (Some(code), None) => code,
        (None, None) => body.chars().take(200).collect(),
    }
}

#[async_trait]
impl GenerationBackend for DashScopeClient {
    fn name(&self) -> &str {
        BACKEND_NAME
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, BackendError> {
        debug!("调用 DashScope API，模型: {}", request.model);

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&Self::build_body(request))
            .send()
            .await
            .map_err(|e| {
                warn!("DashScope 请求失败: {}", e);
                BackendError::request_failed(BACKEND_NAME, e)
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::request_failed(BACKEND_NAME, e))?;

        if !status.is_success() {
            let message = describe_error(&body);
            warn!("DashScope 返回错误状态 {}: {}", status, message);
            return Err(BackendError::BadStatus {
                backend: BACKEND_NAME.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        debug!("DashScope API 调用成功");
        extract_content(&body, &request.model)
    }
}
