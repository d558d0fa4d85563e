//! 内容匹配服务 - 业务能力层
//!
//! 只负责"从段落中找出与评审要点最相关的内容"，不关心流程

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::clients::{generate_with_timeout, GenerationBackend, GenerationRequest};
use crate::error::BackendError;
use crate::models::{ModelParams, ParagraphSequence};

/// 没有可引用内容时的哨兵文本
pub const NO_MATCH_SENTINEL: &str = "未找到直接相关内容";

const MATCH_SYSTEM_MESSAGE: &str = "你是一名文档分析专家。";

/// 内容匹配服务
///
/// 后端返回的文本原样作为匹配结果，不与段落列表做二次校验。
#[derive(Clone)]
pub struct MatchingService {
    backend: Arc<dyn GenerationBackend>,
    params: ModelParams,
    timeout: Duration,
}

impl MatchingService {
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

    /// 为评审要点匹配最相关的段落
    ///
    /// 段落为空时直接返回 [`NO_MATCH_SENTINEL`]，不调用后端。
    pub async fn match_content(
        &self,
        paragraphs: &ParagraphSequence,
        review_point: &str,
    ) -> Result<String, BackendError> {
        if paragraphs.is_empty() {
            debug!("段落为空，要点「{}」直接返回未匹配", review_point);
            return Ok(NO_MATCH_SENTINEL.to_string());
        }

        let request = GenerationRequest::new(
            MATCH_SYSTEM_MESSAGE,
            build_match_prompt(paragraphs, review_point),
            &self.params,
        );

        debug!(
            "开始内容匹配，段落数量: {}, 模型: {}",
            paragraphs.len(),
            self.params.model_name
        );
        generate_with_timeout(self.backend.as_ref(), &request, self.timeout).await
    }
}

/// 构建内容匹配提示词
pub fn build_match_prompt(paragraphs: &ParagraphSequence, review_point: &str) -> String {
    format!(
        r#"你是一名文档分析专家。请从下列文档段落中，找出与评审要点最相关的内容。

评审要点：{}

文档段落：
{}

请直接返回最相关的段落原文（如有多个可合并），不要添加解释。
如果没有任何相关段落，请只返回：{}"#,
        review_point,
        paragraphs.numbered(),
        NO_MATCH_SENTINEL
    )
}
