//! 会议分析编排器 - 编排层
//!
//! ## 职责
//!
//! 1. **加载文档**：每次运行只加载一次，加载失败整次运行失败，不调用引擎
//! 2. **分发任务**：每个任务一次引擎调用，共享同一个只读文档，并发执行
//! 3. **汇合结果**：按任务集顺序把每个槽位写入结果映射，失败写入失败标记
//!
//! 加载器、应答引擎、任务集都在构造时显式传入，不使用全局单例。

use chrono::NaiveDate;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::AppResult;
use crate::models::{
    load_task_set, AutoLoader, Document, DocumentLoader, FailureKind, ResultMapping, RunReport,
    Task, TaskFailure, TaskOutcome, TaskSet,
};
use crate::orchestrator::fan_out::{fan_out, Slot};
use crate::services::{AnswerEngine, LlmService};
use crate::utils::logging::log_document_loaded;
use crate::workflow::{TaskCtx, TaskFlow};

/// 会议分析编排器
pub struct InsightOrchestrator {
    loader: Arc<dyn DocumentLoader>,
    flow: TaskFlow,
    tasks: TaskSet,
    max_concurrent_tasks: usize,
    current_date: Option<NaiveDate>,
}

impl InsightOrchestrator {
    /// 使用给定的加载器、引擎和任务集创建编排器
    pub fn new(
        loader: Arc<dyn DocumentLoader>,
        engine: Arc<dyn AnswerEngine>,
        tasks: TaskSet,
    ) -> Self {
        let max_concurrent_tasks = tasks.len().max(1);
        Self {
            loader,
            flow: TaskFlow::new(engine),
            tasks,
            max_concurrent_tasks,
            current_date: None,
        }
    }

    /// 按配置组装：自动选择加载器、LLM 引擎、内置或 TOML 任务集
    pub async fn from_config(config: &Config) -> AppResult<Self> {
        let tasks = match &config.tasks_file {
            Some(path) => load_task_set(Path::new(path)).await?,
            None => TaskSet::meeting_insights(),
        };

        let engine = LlmService::new(config)?;
        let call_timeout =
            (config.llm_timeout_secs > 0).then(|| Duration::from_secs(config.llm_timeout_secs));

        let mut orchestrator = Self::new(Arc::new(AutoLoader::new()), Arc::new(engine), tasks)
            .with_max_concurrent_tasks(config.max_concurrent_tasks)
            .with_call_timeout(call_timeout);
        orchestrator.current_date = config.current_date;

        Ok(orchestrator)
    }

    /// 最大并发数，1 表示顺序执行
    pub fn with_max_concurrent_tasks(mut self, max_concurrent_tasks: usize) -> Self {
        self.max_concurrent_tasks = max_concurrent_tasks.max(1);
        self
    }

    /// 单次引擎调用超时
    pub fn with_call_timeout(mut self, call_timeout: Option<Duration>) -> Self {
        self.flow = self.flow.with_timeout(call_timeout);
        self
    }

    /// 固定注入的当前日期；未设置时每次运行读取本地日期
    pub fn with_current_date(mut self, today: NaiveDate) -> Self {
        self.current_date = Some(today);
        self
    }

    pub fn tasks(&self) -> &TaskSet {
        &self.tasks
    }

    /// 运行所有任务
    pub async fn run(&self, file_path: impl AsRef<Path>) -> AppResult<RunReport> {
        self.run_until(file_path, std::future::pending()).await
    }

    /// 运行所有任务，`shutdown` 完成时放弃仍在进行的引擎调用
    ///
    /// 已收集的答案保留，未完成的任务记为 `Cancelled`
    pub async fn run_until<S>(&self, file_path: impl AsRef<Path>, shutdown: S) -> AppResult<RunReport>
    where
        S: Future<Output = ()>,
    {
        let path = file_path.as_ref();
        let today = self.today();

        info!("\n📁 正在加载文档: {}", path.display());
        let document = Arc::new(self.loader.load(path).await?);
        log_document_loaded(document.len(), document.char_count());

        let total = self.tasks.len();
        info!(
            "📋 分发 {} 个任务 (最大并发 {}), 当前日期 {}",
            total, self.max_concurrent_tasks, today
        );

        let work_items: Vec<(TaskCtx, Task)> = self
            .tasks
            .iter()
            .enumerate()
            .map(|(index, task)| {
                let ctx = TaskCtx::new(task.name.clone(), index + 1, total, today);
                (ctx, task.clone())
            })
            .collect();

        let flow = self.flow.clone();
        let slots = fan_out(
            Arc::clone(&document),
            work_items,
            self.max_concurrent_tasks,
            shutdown,
            move |document: Arc<Document>, (ctx, task): (TaskCtx, Task)| {
                let flow = flow.clone();
                async move { flow.run(&document, &task.question, &ctx).await }
            },
        )
        .await;

        let results = self.collect(slots);

        Ok(RunReport {
            source: path.to_path_buf(),
            current_date: today,
            segments: document.len(),
            order: self.tasks.names().into_iter().map(str::to_string).collect(),
            results,
        })
    }

    /// 汇合：按任务集顺序写入，重名任务以后面的为准
    fn collect(&self, slots: Vec<Slot<TaskOutcome>>) -> ResultMapping {
        let mut results = ResultMapping::new();
        for (task, slot) in self.tasks.iter().zip(slots) {
            let outcome = match slot {
                Slot::Completed(outcome) => outcome,
                Slot::Panicked(message) => {
                    TaskOutcome::Failed(TaskFailure::new(FailureKind::Panicked, message))
                }
                Slot::Cancelled => {
                    warn!("[任务 {}] 已取消", task.name);
                    TaskOutcome::Failed(TaskFailure::cancelled())
                }
            };
            results.record(task.name.clone(), outcome);
        }
        results
    }

    fn today(&self) -> NaiveDate {
        self.current_date
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}
