//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责单次评审请求的并发调度与结果汇总，是整个系统的"指挥中心"。
//!
//! ## 层次关系
//!
//! ```text
//! api / main (调用方：HTTP 上传或命令行)
//!     ↓
//! orchestrator::ReviewOrchestrator (处理 Vec<评审要点>)
//!     ↓
//! workflow::ReviewFlow (处理单个评审要点：匹配 → 推理)
//!     ↓
//! services (能力层：matching / conclusion)
//!     ↓
//! clients (生成后端：openai / dashscope)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：编排器只管并发与汇总，不拼提示词
//! 2. **显式配置**：评审参数在构造时传入，不读取全局状态
//! 3. **向下依赖**：编排层 → workflow → services → clients

pub mod review_orchestrator;

pub use review_orchestrator::ReviewOrchestrator;
