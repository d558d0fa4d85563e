//! 结论推理服务 - 业务能力层
//!
//! 根据评审要点与匹配内容，让后端给出分步推理与最终结论。
//! 推理过程与结论都在同一段文本中返回，没有固定分隔符。

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::clients::{generate_with_timeout, GenerationBackend, GenerationRequest};
use crate::error::BackendError;
use crate::models::ModelParams;

const CONCLUDE_SYSTEM_MESSAGE: &str = "你是一名文档评审专家。";

/// 结论推理服务
#[derive(Clone)]
pub struct ConclusionService {
    backend: Arc<dyn GenerationBackend>,
    params: ModelParams,
    timeout: Duration,
}

impl ConclusionService {
    pub fn new(
        backend: Arc<dyn GenerationBackend>,
        params: ModelParams,
        timeout: Duration,
    ) -> Self {
        Self {
            backend,
            params,
            timeout,
        }
    }

    /// 生成链式思维评审结论
    pub async fn conclude(
        &self,
        review_point: &str,
        matched_content: &str,
    ) -> Result<String, BackendError> {
        let request = GenerationRequest::new(
            CONCLUDE_SYSTEM_MESSAGE,
            build_conclusion_prompt(review_point, matched_content),
            &self.params,
        );

        debug!(
            "开始结论推理，要点: {}, 匹配内容长度: {} 字符",
            review_point,
            matched_content.chars().count()
        );
        generate_with_timeout(self.backend.as_ref(), &request, self.timeout).await
    }
}

/// 构建结论推理提示词
pub fn build_conclusion_prompt(review_point: &str, matched_content: &str) -> String {
    format!(
        r#"你是一名文档评审专家。请根据以下评审要点和相关文档内容，给出详细的评审结论，并展示你的推理过程：

评审要点：{}

相关内容：{}

请分步推理，最后单独一行以"结论："开头给出结论。"#,
        review_point, matched_content
    )
}
