//! 评审相关数据结构

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::FailurePolicy;

/// 单次生成调用的模型参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    pub model_name: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl ModelParams {
    pub fn new(model_name: impl Into<String>, temperature: f32, max_output_tokens: u32) -> Self {
        Self {
            model_name: model_name.into(),
            temperature,
            max_output_tokens,
        }
    }
}

/// 编排器构造时传入的评审参数
#[derive(Debug, Clone)]
pub struct ReviewSettings {
    /// 内容匹配阶段参数
    pub matcher: ModelParams,
    /// 结论推理阶段参数
    pub reasoner: ModelParams,
    pub max_concurrent_reviews: usize,
    pub failure_policy: FailurePolicy,
    pub request_timeout: Duration,
}

/// 单个评审要点的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewResult {
    /// 匹配到的文档内容（或"未找到"哨兵文本）
    pub matched_content: String,
    /// 推理过程 + 最终结论
    pub conclusion: String,
}

/// 报告中的一个条目
///
/// 只有在 `CollectAll` 策略下才会出现 `Failed`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReviewEntry {
    Completed(ReviewResult),
    Failed { error: String },
}

impl ReviewEntry {
    pub fn as_result(&self) -> Option<&ReviewResult> {
        match self {
            ReviewEntry::Completed(result) => Some(result),
            ReviewEntry::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ReviewEntry::Failed { .. })
    }
}

/// 评审报告：评审要点 → 结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewReport {
    entries: HashMap<String, ReviewEntry>,
}

impl ReviewReport {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
        }
    }

    pub fn insert(&mut self, review_point: impl Into<String>, entry: ReviewEntry) {
        self.entries.insert(review_point.into(), entry);
    }

    pub fn get(&self, review_point: &str) -> Option<&ReviewEntry> {
        self.entries.get(review_point)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn review_points(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ReviewEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn failed_count(&self) -> usize {
        self.entries.values().filter(|e| e.is_failed()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_json_shape() {
        let mut report = ReviewReport::default();
        report.insert(
            "格式规范",
            ReviewEntry::Completed(ReviewResult {
                matched_content: "标题使用一级标题".to_string(),
                conclusion: "结论：通过".to_string(),
            }),
        );
        report.insert(
            "逻辑性",
            ReviewEntry::Failed {
                error: "调用超时".to_string(),
            },
        );

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["格式规范"]["matched_content"], "标题使用一级标题");
        assert_eq!(json["格式规范"]["conclusion"], "结论：通过");
        assert_eq!(json["逻辑性"]["error"], "调用超时");
        assert_eq!(report.failed_count(), 1);

        let back: ReviewReport = serde_json::from_value(json).unwrap();
        assert_eq!(back, report);
    }

    #[test]
    fn test_insert_same_key_overwrites() {
        let mut report = ReviewReport::default();
        report.insert("a", ReviewEntry::Failed { error: "1".into() });
        report.insert("a", ReviewEntry::Failed { error: "2".into() });
        assert_eq!(report.len(), 1);
        assert_eq!(
            report.get("a"),
            Some(&ReviewEntry::Failed { error: "2".into() })
        );
    }
}
