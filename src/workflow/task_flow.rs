//! 任务处理流程 - 流程层
//!
//! 核心职责：定义"一个分析任务"的完整处理流程
//!
//! 流程顺序：
//! 1. 调用应答引擎（可选超时）
//! 2. 成功 → 答案；失败 → 失败标记
//!
//! 引擎错误在这里被转换为 `TaskOutcome::Failed`，不会向上传播，
//! 所以一个任务失败不会影响其他任务。

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use crate::error::EngineError;
use crate::models::{Document, TaskFailure, TaskOutcome};
use crate::services::AnswerEngine;
use crate::utils::logging::truncate_text;
use crate::workflow::task_ctx::TaskCtx;

/// 任务处理流程
///
/// - 持有应答引擎句柄，可以廉价 clone 给并发任务
/// - 不持有文档，文档由编排层按次传入
#[derive(Clone)]
pub struct TaskFlow {
    engine: Arc<dyn AnswerEngine>,
    call_timeout: Option<Duration>,
}

impl TaskFlow {
    pub fn new(engine: Arc<dyn AnswerEngine>) -> Self {
        Self {
            engine,
            call_timeout: None,
        }
    }

    /// 设置单次调用超时，`None` 表示不限制
    pub fn with_timeout(mut self, call_timeout: Option<Duration>) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub async fn run(&self, document: &Document, question: &str, ctx: &TaskCtx) -> TaskOutcome {
        info!("{} 🤖 开始调用应答引擎 ({})", ctx, self.engine.engine_id());
        let started = Instant::now();

        match self.ask(document, question, ctx).await {
            Ok(answer) => {
                info!(
                    "{} ✓ 完成，耗时 {:.1}s，答案 {} 字符",
                    ctx,
                    started.elapsed().as_secs_f64(),
                    answer.chars().count()
                );
                info!("{} 答案预览: {}", ctx, truncate_text(&answer, 60));
                TaskOutcome::Answer(answer)
            }
            Err(e) => {
                match &e {
                    EngineError::Timeout { .. } | EngineError::RateLimited { .. } => {
                        warn!("{} ⚠️ {}", ctx, e)
                    }
                    _ => error!("{} ❌ 调用失败: {}", ctx, e),
                }
                TaskOutcome::Failed(TaskFailure::from(&e))
            }
        }
    }

    async fn ask(
        &self,
        document: &Document,
        question: &str,
        ctx: &TaskCtx,
    ) -> Result<String, EngineError> {
        let call = self.engine.answer(document, question, ctx.today);
        match self.call_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| EngineError::Timeout {
                    model: self.engine.engine_id().to_string(),
                    seconds: limit.as_secs(),
                })?,
            None => call.await,
        }
    }
}
