use std::collections::HashSet;
use std::path::PathBuf;

use aidoc_review::utils::logging;
use aidoc_review::{
    api, parse_verdict, Config, FailurePolicy, ReviewEntry, ReviewOrchestrator, ReviewReport,
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::warn;

/// 链式思维文档评审
#[derive(Parser)]
#[command(name = "aidoc-review", version)]
struct Cli {
    /// TOML 配置文件（不指定时从环境变量读取）
    #[arg(long, global = true, env = "AIDOC_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 启动 HTTP 评审服务
    Serve {
        /// 监听地址，覆盖配置中的 server_bind_addr
        #[arg(long)]
        bind: Option<String>,
    },
    /// 评审单个文档并输出 JSON 报告
    Review {
        /// 待评审文档（.docx / .md）
        file: PathBuf,

        /// 评审要点，可重复
        #[arg(short = 'p', long = "point", required = true)]
        points: Vec<String>,

        /// 失败策略：fail-fast / collect-all
        #[arg(long)]
        policy: Option<FailurePolicy>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let mut config = match &cli.config {
        Some(path) => Config::from_toml_file(path)
            .with_context(|| format!("无法加载配置文件: {}", path.display()))?,
        None => Config::from_env().context("环境变量配置无效")?,
    };

    // 初始化日志
    logging::init(config.verbose_logging);

    match cli.command {
        Command::Serve { bind } => {
            if let Some(bind) = bind {
                config.server_bind_addr = bind;
            }
            logging::log_startup(&config);
            api::serve(&config).await?;
        }
        Command::Review {
            file,
            points,
            policy,
        } => {
            if let Some(policy) = policy {
                config.failure_policy = policy;
            }
            logging::log_startup(&config);

            let orchestrator = ReviewOrchestrator::from_config(&config)?;
            let report = tokio::select! {
                result = orchestrator.review(&file, &points) => result?,
                _ = tokio::signal::ctrl_c() => {
                    warn!("评审已取消");
                    anyhow::bail!("评审已被用户取消");
                }
            };

            println!("{}", serde_json::to_string_pretty(&report)?);
            print_summary(&points, &report);
        }
    }

    Ok(())
}

/// 按输入顺序打印每个要点的判定摘要
fn print_summary(points: &[String], report: &ReviewReport) {
    println!("\n{}", "=".repeat(60));
    println!("📊 评审摘要");
    println!("{}", "=".repeat(60));

    let mut seen = HashSet::new();
    for point in points.iter().filter(|p| seen.insert(p.as_str())) {
        let line = match report.get(point) {
            Some(ReviewEntry::Completed(result)) => match parse_verdict(&result.conclusion) {
                Some(verdict) => format!("✅ {}: {}", point, verdict),
                None => format!("❔ {}: 未能识别结论", point),
            },
            Some(ReviewEntry::Failed { error }) => format!("❌ {}: {}", point, error),
            None => format!("❔ {}: 无结果", point),
        };
        println!("{}", line);
    }
}
