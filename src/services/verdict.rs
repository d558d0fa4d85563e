//! 结论文本解析
//!
//! 后端返回的结论是自由文本，这里只做尽力而为的判定提取；
//! 解析结果仅用于摘要展示，不回写评审报告。

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

/// 最终判定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    Partial,
    Fail,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => write!(f, "通过"),
            Verdict::Partial => write!(f, "部分符合"),
            Verdict::Fail => write!(f, "不通过"),
        }
    }
}

const FAIL_KEYWORDS: &[&str] = &[
    "不通过",
    "未通过",
    "没有通过",
    "无法通过",
    "不能通过",
    "不符合",
    "未符合",
    "没有符合",
    "不合格",
    "不满足",
    "未满足",
    "没有满足",
    "无法满足",
    "未达到",
    "不达标",
    "not pass",
    "fail",
    "non-compliant",
    "not compliant",
];
const PARTIAL_KEYWORDS: &[&str] = &[
    "部分",
    "基本符合",
    "基本满足",
    "不完全",
    "未完全",
    "partial",
];
const PASS_KEYWORDS: &[&str] = &["通过", "符合", "合格", "满足", "达标", "pass", "compliant"];

fn marker() -> Option<&'static Regex> {
    static MARKER: OnceLock<Option<Regex>> = OnceLock::new();
    MARKER
        .get_or_init(|| Regex::new(r"(?i)结论|conclusion").ok())
        .as_ref()
}

/// 从结论文本中提取最终判定
///
/// 取最后一个"结论"/"Conclusion"标记之后的第一行非空文本进行判定，
/// 找不到标记或无法归类时返回 None。
pub fn parse_verdict(conclusion: &str) -> Option<Verdict> {
    let last = marker()?.find_iter(conclusion).last()?;
    let rest = conclusion[last.end()..]
        .trim_start_matches(|c: char| c.is_whitespace() || matches!(c, ':' | '：' | '*' | '#'));
    let line = rest.lines().map(str::trim).find(|l| !l.is_empty())?;
    classify(line)
}

fn classify(line: &str) -> Option<Verdict> {
    let lowered = line.to_lowercase();
    let has = |keywords: &[&str]| keywords.iter().any(|k| lowered.contains(k));

    if has(FAIL_KEYWORDS) {
        Some(Verdict::Fail)
    } else if has(PARTIAL_KEYWORDS) {
        Some(Verdict::Partial)
    } else if has(PASS_KEYWORDS) {
        Some(Verdict::Pass)
    } else {
        None
    }
}
