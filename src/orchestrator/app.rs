//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：打印启动信息、按配置组装编排器
//! 2. **运行**：加载文档并执行所有任务，Ctrl-C 时放弃仍在进行的调用
//! 3. **输出**：按任务顺序分节打印答案，或输出 JSON 报告
//! 4. **统计**：汇总成功/失败数量

use anyhow::{Context, Result};
use std::io::Write;
use tracing::{info, warn};

use crate::config::{Config, OutputFormat};
use crate::models::{RunReport, RunStatus, TaskOutcome};
use crate::orchestrator::insight_orchestrator::InsightOrchestrator;
use crate::utils::logging::{log_run_complete, log_startup};

/// 应用主结构
pub struct App {
    config: Config,
    orchestrator: InsightOrchestrator,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        let orchestrator = InsightOrchestrator::from_config(&config)
            .await
            .context("编排器初始化失败")?;

        log_startup(&config, orchestrator.tasks().len());

        Ok(Self {
            config,
            orchestrator,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<RunReport> {
        let transcript_path = &self.config.transcript_path;

        let shutdown = async {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("⚠️ 收到 Ctrl-C，放弃未完成的任务");
            } else {
                // 无法监听信号时永不触发取消
                std::future::pending::<()>().await;
            }
        };

        let report = self
            .orchestrator
            .run_until(transcript_path, shutdown)
            .await
            .with_context(|| format!("处理文档失败: {}", transcript_path))?;

        log_run_complete(&report);

        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        match self.config.output_format {
            OutputFormat::Text => write_sections(&mut out, &report)?,
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut out, &report)?;
                writeln!(out)?;
            }
        }

        if let RunStatus::Partial { failed } = report.status() {
            warn!("⚠️ 部分任务失败: {}", failed.join(", "));
        } else {
            info!("✅ 所有任务均已完成");
        }

        Ok(report)
    }
}

/// 按任务顺序分节输出
pub fn write_sections(out: &mut impl Write, report: &RunReport) -> std::io::Result<()> {
    writeln!(out, "Answer:")?;
    for (name, outcome) in report.ordered() {
        writeln!(out, "----- {} -----", name)?;
        match outcome {
            Some(TaskOutcome::Answer(text)) => writeln!(out, "{}\n", text)?,
            Some(TaskOutcome::Failed(failure)) => writeln!(out, "[FAILED] {}\n", failure)?,
            None => writeln!(out, "[MISSING]\n")?,
        }
    }
    Ok(())
}
