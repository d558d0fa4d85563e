/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use std::time::Duration;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::ReviewReport;

/// 初始化日志
///
/// `RUST_LOG` 优先；否则默认 info，`verbose` 时为 debug。重复调用无副作用。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 文档评审服务启动 - 链式思维评审模式");
    info!(
        "启动时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("🤖 后端: {}  模型: {}", config.backend, config.llm_model_name);
    info!(
        "📊 最大并发要点数: {}  失败策略: {:?}",
        config.max_concurrent_reviews, config.failure_policy
    );
    info!("{}", "=".repeat(60));
}

/// 记录评审请求开始
pub fn log_review_start(request_id: u64, paragraph_count: usize, point_count: usize) {
    info!(
        "[请求 #{}] 📄 开始评审: {} 个段落, {} 个评审要点",
        request_id, paragraph_count, point_count
    );
}

/// 记录评审请求完成
pub fn log_review_complete(request_id: u64, report: &ReviewReport, elapsed: Duration) {
    let failed = report.failed_count();
    info!(
        "[请求 #{}] ✓ 评审完成: 成功 {}/{}，失败 {}，耗时 {:.1}s",
        request_id,
        report.len() - failed,
        report.len(),
        failed,
        elapsed.as_secs_f64()
    );
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大字符数
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
