//! # AI Doc Review
//!
//! 基于链式思维的文档评审：对一份文档按多个独立评审要点并发评审
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 后端层（Clients）
//! - `clients/` - 生成后端抽象 `GenerationBackend`，只暴露"生成文本"能力
//! - `OpenAiCompatibleClient` - OpenAI 兼容接口（async-openai）
//! - `DashScopeClient` - DashScope 原生接口（reqwest）
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个评审要点
//! - `MatchingService` - 内容匹配能力（低温度，偏向确定性）
//! - `ConclusionService` - 结论推理能力（较高温度，分步推理）
//! - `verdict` - 从结论文本中提取判定
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个评审要点"的完整处理流程
//! - `ReviewCtx` - 上下文封装（请求编号 + 要点序号）
//! - `ReviewFlow` - 流程编排（匹配 → 推理）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/` - 段落抽取、要点去重、并发调度与报告汇总
//!
//! ### 调用方
//! - `api/` - HTTP 上传接口（axum）
//! - `main.rs` - 命令行
//!
//! ## 模块结构

pub mod api;
pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{GenerationBackend, GenerationRequest};
pub use config::{BackendKind, Config, FailurePolicy};
pub use error::{AppError, AppResult, BackendError, ConfigError, ExtractError};
pub use models::{
    extract_paragraphs, Document, DocumentFormat, ModelParams, ParagraphSequence, ReviewEntry,
    ReviewReport, ReviewResult, ReviewSettings,
};
pub use orchestrator::ReviewOrchestrator;
pub use services::{parse_verdict, Verdict, NO_MATCH_SENTINEL};
pub use workflow::{BranchState, ReviewCtx, ReviewFlow};

/// 评审文档的直接调用入口
///
/// 等价于 `ReviewOrchestrator::review`，便于一次性调用。
pub async fn review_document(
    orchestrator: &ReviewOrchestrator,
    path: impl AsRef<std::path::Path>,
    review_points: &[String],
) -> AppResult<ReviewReport> {
    orchestrator.review(path, review_points).await
}
