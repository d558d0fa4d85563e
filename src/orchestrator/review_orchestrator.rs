//! 评审编排器 - 编排层
//!
//! ## 职责
//!
//! 1. **段落抽取**：每个请求只抽取一次，所有分支共享只读段落序列
//! 2. **要点去重**：相同要点只保留首次出现
//! 3. **并发控制**：每个要点一个任务（`JoinSet`），`Semaphore` 限制同时进行的分支数
//! 4. **结果汇总**：等待全部分支结束后组装评审报告
//!
//! ## 失败策略
//!
//! - `FailFast`：首个失败立即返回，其余分支被取消
//! - `CollectAll`：等待所有分支，失败的要点以错误条目出现在报告中
//!
//! 调用方丢弃 `review` 的 future 时，`JoinSet` 随之销毁，所有进行中的分支被取消，
//! 不会返回部分报告。

use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::clients::{build_backend, GenerationBackend};
use crate::config::{Config, FailurePolicy};
use crate::error::{AppError, AppResult};
use crate::models::{
    extract_document, Document, ParagraphSequence, ReviewEntry, ReviewReport, ReviewSettings,
};
use crate::services::{ConclusionService, MatchingService};
use crate::utils::logging::{log_review_complete, log_review_start};
use crate::workflow::{ReviewCtx, ReviewFlow};

/// 评审编排器
pub struct ReviewOrchestrator {
    flow: Arc<ReviewFlow>,
    limiter: Arc<Semaphore>,
    failure_policy: FailurePolicy,
    next_request_id: AtomicU64,
}

impl ReviewOrchestrator {
    /// 使用指定后端与评审参数创建编排器
    pub fn new(backend: Arc<dyn GenerationBackend>, settings: ReviewSettings) -> Self {
        let matcher = MatchingService::new(
            backend.clone(),
            settings.matcher,
            settings.request_timeout,
        );
        let reasoner =
            ConclusionService::new(backend, settings.reasoner, settings.request_timeout);

        Self {
            flow: Arc::new(ReviewFlow::new(matcher, reasoner)),
            limiter: Arc::new(Semaphore::new(settings.max_concurrent_reviews.max(1))),
            failure_policy: settings.failure_policy,
            next_request_id: AtomicU64::new(1),
        }
    }

    /// 按配置创建编排器（校验配置并构建后端）
    pub fn from_config(config: &Config) -> AppResult<Self> {
        config.validate()?;
        Ok(Self::new(build_backend(config), config.review_settings()))
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    /// 评审文档
    ///
    /// 格式不支持或文件不存在时立即失败，不会调用后端。
    pub async fn review(
        &self,
        path: impl AsRef<Path>,
        review_points: &[String],
    ) -> AppResult<ReviewReport> {
        let document = Document::open(path.as_ref())?;
        validate_review_points(review_points)?;
        info!(
            "📄 读取文档: {} ({})",
            document.path().display(),
            document.format()
        );

        let paragraphs = tokio::task::spawn_blocking(move || extract_document(&document))
            .await
            .map_err(|e| AppError::TaskAborted {
                reason: format!("段落抽取任务失败: {}", e),
            })??;

        self.review_paragraphs(paragraphs, review_points).await
    }

    /// 对已抽取的段落执行评审
    pub async fn review_paragraphs(
        &self,
        paragraphs: ParagraphSequence,
        review_points: &[String],
    ) -> AppResult<ReviewReport> {
        validate_review_points(review_points)?;

        let request_id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        let points = dedup_review_points(review_points);
        let started = Instant::now();
        log_review_start(request_id, paragraphs.len(), points.len());

        let paragraphs = Arc::new(paragraphs);
        let mut tasks = JoinSet::new();

        for (idx, point) in points.iter().enumerate() {
            let ctx = ReviewCtx::new(request_id, idx + 1, point.clone());
            let flow = self.flow.clone();
            let paragraphs = paragraphs.clone();
            let limiter = self.limiter.clone();

            tasks.spawn(async move {
                let outcome = match limiter.acquire_owned().await {
                    Ok(_permit) => flow.run(&paragraphs, &ctx).await,
                    Err(e) => Err(AppError::TaskAborted {
                        reason: format!("并发许可获取失败: {}", e),
                    }),
                };
                (ctx, outcome)
            });
        }

        let mut report = ReviewReport::with_capacity(points.len());

        while let Some(joined) = tasks.join_next().await {
            let (ctx, outcome) = joined.map_err(|e| {
                error!("[请求 #{}] 分支任务异常: {}", request_id, e);
                AppError::TaskAborted {
                    reason: e.to_string(),
                }
            })?;

            match outcome {
                Ok(result) => report.insert(ctx.review_point, ReviewEntry::Completed(result)),
                Err(e) => match self.failure_policy {
                    FailurePolicy::FailFast => {
                        error!("{} ❌ 评审失败，取消其余 {} 个分支", ctx, tasks.len());
                        tasks.abort_all();
                        return Err(e);
                    }
                    FailurePolicy::CollectAll => {
                        warn!("{} ⚠️ 评审失败，记录为错误条目: {}", ctx, e);
                        report.insert(
                            ctx.review_point,
                            ReviewEntry::Failed {
                                error: e.to_string(),
                            },
                        );
                    }
                },
            }
        }

        log_review_complete(request_id, &report, started.elapsed());
        Ok(report)
    }
}

/// 要点列表不能为空，单个要点不能为空白
fn validate_review_points(review_points: &[String]) -> AppResult<()> {
    if review_points.is_empty() {
        return Err(AppError::InvalidReviewPoints {
            reason: "至少需要一个评审要点".to_string(),
        });
    }
    if let Some(pos) = review_points.iter().position(|p| p.trim().is_empty()) {
        return Err(AppError::InvalidReviewPoints {
            reason: format!("第 {} 个评审要点为空", pos + 1),
        });
    }
    Ok(())
}

/// 去重并保持首次出现的顺序
fn dedup_review_points(review_points: &[String]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(review_points.len());
    let mut points = Vec::with_capacity(review_points.len());
    for point in review_points {
        if seen.insert(point.as_str()) {
            points.push(point.clone());
        } else {
            warn!("⚠️ 评审要点重复，已忽略: {}", point);
        }
    }
    points
}
