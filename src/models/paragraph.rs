//! 段落序列

use serde::Serialize;

/// 有序、非空、已去除首尾空白的段落序列
///
/// 对外使用 1 起始的编号（提示词中的引用编号）。允许重复段落。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ParagraphSequence {
    paragraphs: Vec<String>,
}

impl ParagraphSequence {
    /// 由任意文本片段构建，自动去除首尾空白并丢弃空片段
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let paragraphs = segments
            .into_iter()
            .map(|s| s.as_ref().trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        Self { paragraphs }
    }

    pub fn len(&self) -> usize {
        self.paragraphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paragraphs.iter().map(String::as_str)
    }

    /// 按 1 起始编号取段落
    pub fn get(&self, index: usize) -> Option<&str> {
        index
            .checked_sub(1)
            .and_then(|i| self.paragraphs.get(i))
            .map(String::as_str)
    }

    /// 渲染为 `[i] 段落` 的多行文本
    pub fn numbered(&self) -> String {
        self.paragraphs
            .iter()
            .enumerate()
            .map(|(i, p)| format!("[{}] {}", i + 1, p))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// 文本中是否原样包含至少一个段落
    pub fn contains_verbatim(&self, text: &str) -> bool {
        self.paragraphs.iter().any(|p| text.contains(p.as_str()))
    }

    pub fn into_inner(self) -> Vec<String> {
        self.paragraphs
    }
}
