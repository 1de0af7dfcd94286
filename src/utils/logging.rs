/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::{RunReport, RunStatus};

/// 初始化 tracing 日志
///
/// 优先使用 `RUST_LOG`；未设置时根据 `verbose` 选择 debug 或 info 级别
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("meeting_insights={},warn", default_level)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config, task_count: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 会议记录分析");
    info!("📄 文档: {}", config.transcript_path);
    info!("🤖 模型: {} ({:?})", config.llm_model_name, config.llm_provider);
    info!(
        "📊 任务数: {}, 最大并发数: {}",
        task_count, config.max_concurrent_tasks
    );
    info!("{}", "=".repeat(60));
}

/// 记录文档加载信息
///
/// # 参数
/// - `segments`: 片段数量
/// - `chars`: 字符总数
pub fn log_document_loaded(segments: usize, chars: usize) {
    info!("✓ 文档加载完成: {} 个片段, 共 {} 字符", segments, chars);
}

/// 打印最终统计信息
pub fn log_run_complete(report: &RunReport) {
    let total = report.order.len();
    info!("\n{}", "=".repeat(60));
    info!("📊 全部任务完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("注入日期: {}", report.current_date);
    info!("{}", "=".repeat(60));
    match report.status() {
        RunStatus::Success => {
            info!("✅ 成功: {}/{}", total, total);
        }
        RunStatus::Partial { failed } => {
            info!("✅ 成功: {}/{}", total - failed.len(), total);
            warn!("❌ 失败: {} ({})", failed.len(), failed.join(", "));
        }
    }
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（字符数）
///
/// # 返回
/// 返回截断后的单行文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    let single_line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if single_line.chars().count() > max_len {
        single_line.chars().take(max_len).collect::<String>() + "..."
    } else {
        single_line
    }
}
