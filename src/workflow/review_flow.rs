//! 评审分支流程 - 流程层
//!
//! 核心职责：定义"一个评审要点"的完整处理流程
//!
//! 流程顺序（严格串行，推理依赖匹配结果）：
//! 1. 内容匹配
//! 2. 结论推理
//!
//! 状态：`Pending → Matching → Concluding → Done`，任一调用失败进入 `Failed`，不重试。

use std::fmt;

use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::models::{ParagraphSequence, ReviewResult};
use crate::services::{ConclusionService, MatchingService, NO_MATCH_SENTINEL};
use crate::utils::logging::truncate_text;
use crate::workflow::review_ctx::ReviewCtx;

/// 分支状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchState {
    Pending,
    Matching,
    Concluding,
    Done,
    Failed,
}

impl BranchState {
    /// 是否为终止状态
    pub fn is_terminal(&self) -> bool {
        matches!(self, BranchState::Done | BranchState::Failed)
    }

    /// 状态转换是否合法
    pub fn can_transition_to(&self, next: BranchState) -> bool {
        use BranchState::*;
        matches!(
            (self, next),
            (Pending, Matching)
                | (Matching, Concluding)
                | (Matching, Failed)
                | (Concluding, Done)
                | (Concluding, Failed)
        )
    }
}

impl fmt::Display for BranchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BranchState::Pending => write!(f, "待处理"),
            BranchState::Matching => write!(f, "内容匹配"),
            BranchState::Concluding => write!(f, "结论推理"),
            BranchState::Done => write!(f, "完成"),
            BranchState::Failed => write!(f, "失败"),
        }
    }
}

/// 单个分支的状态跟踪
struct BranchTracker<'a> {
    ctx: &'a ReviewCtx,
    state: BranchState,
}

impl<'a> BranchTracker<'a> {
    fn new(ctx: &'a ReviewCtx) -> Self {
        Self {
            ctx,
            state: BranchState::Pending,
        }
    }

    fn advance(&mut self, next: BranchState) {
        debug_assert!(self.state.can_transition_to(next));
        debug!("{} 状态: {} → {}", self.ctx, self.state, next);
        self.state = next;
    }
}

/// 评审分支流程
///
/// - 编排"匹配 → 推理"两步
/// - 不持有任何共享可变状态，可被多个并发分支同时使用
/// - 只依赖业务能力（services）
#[derive(Clone)]
pub struct ReviewFlow {
    matcher: MatchingService,
    reasoner: ConclusionService,
}

impl ReviewFlow {
    pub fn new(matcher: MatchingService, reasoner: ConclusionService) -> Self {
        Self { matcher, reasoner }
    }

    pub async fn run(
        &self,
        paragraphs: &ParagraphSequence,
        ctx: &ReviewCtx,
    ) -> AppResult<ReviewResult> {
        let mut tracker = BranchTracker::new(ctx);

        // ========== 阶段 1: 内容匹配 ==========
        tracker.advance(BranchState::Matching);
        let matched_content = match self
            .matcher
            .match_content(paragraphs, &ctx.review_point)
            .await
        {
            Ok(content) => content,
            Err(e) => {
                tracker.advance(BranchState::Failed);
                warn!("{} ❌ 内容匹配失败: {}", ctx, e);
                return Err(AppError::backend(
                    &ctx.review_point,
                    BranchState::Matching,
                    e,
                ));
            }
        };
        self.observe_match(paragraphs, ctx, &matched_content);

        // ========== 阶段 2: 结论推理 ==========
        tracker.advance(BranchState::Concluding);
        let conclusion = match self
            .reasoner
            .conclude(&ctx.review_point, &matched_content)
            .await
        {
            Ok(conclusion) => conclusion,
            Err(e) => {
                tracker.advance(BranchState::Failed);
                warn!("{} ❌ 结论推理失败: {}", ctx, e);
                return Err(AppError::backend(
                    &ctx.review_point,
                    BranchState::Concluding,
                    e,
                ));
            }
        };

        tracker.advance(BranchState::Done);
        info!("{} ✓ 评审完成", ctx);

        Ok(ReviewResult {
            matched_content,
            conclusion,
        })
    }

    /// 匹配内容不含任何原文段落时给出警告（内容本身不做修改）
    fn observe_match(&self, paragraphs: &ParagraphSequence, ctx: &ReviewCtx, matched: &str) {
        debug!("{} 匹配内容: {}", ctx, truncate_text(matched, 80));
        if matched != NO_MATCH_SENTINEL && !paragraphs.contains_verbatim(matched) {
            warn!(
                "{} ⚠️ 匹配内容未原样出现在文档段落中，可能为改写或臆造: {}",
                ctx,
                truncate_text(matched, 80)
            );
        }
    }
}
