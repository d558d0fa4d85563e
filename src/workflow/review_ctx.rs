//! 评审分支上下文
//!
//! 封装"我正在处理哪个请求的第几个评审要点"这一信息

use std::fmt::Display;

/// 评审分支上下文
#[derive(Debug, Clone)]
pub struct ReviewCtx {
    /// 请求编号（仅用于日志显示）
    pub request_id: u64,

    /// 要点在请求中的序号（从1开始）
    pub point_index: usize,

    /// 评审要点
    pub review_point: String,
}

impl ReviewCtx {
    pub fn new(request_id: u64, point_index: usize, review_point: impl Into<String>) -> Self {
        Self {
            request_id,
            point_index,
            review_point: review_point.into(),
        }
    }
}

impl Display for ReviewCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[请求 #{} 要点#{} «{}»]",
            self.request_id, self.point_index, self.review_point
        )
    }
}
