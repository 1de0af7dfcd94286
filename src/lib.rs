//! # Meeting Insights
//!
//! 从会议记录文档中提取结构化信息：参会人员及角色、每人发言摘要与观点归属、
//! 项目描述，以及一封后续跟进邮件草稿。
//!
//! ## 架构设计
//!
//! ### ① 数据层（Models）
//! - `models/` - 文档、任务、结果映射
//! - `DocumentLoader` - 文件路径 → 文档（PDF / 纯文本）
//! - `ResultMapping` - 任务名 → 答案或失败标记，带合并策略
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只回答单个问题
//! - `AnswerEngine` - 应答引擎接口
//! - `LlmService` - 基于 async-openai 的实现
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个任务"的完整处理流程
//! - `TaskCtx` - 上下文封装（任务名 + 序号 + 当前日期）
//! - `TaskFlow` - 调用引擎，把错误转换为失败标记
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/insight_orchestrator` - 加载一次文档，并发分发所有任务，汇合结果
//! - `orchestrator/fan_out` - 通用的并发分发/汇合工具
//! - `orchestrator/app` - 应用入口与结果输出
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{Document, DocumentLoader, ResultMapping, RunReport, RunStatus, Task, TaskSet};
pub use orchestrator::{App, InsightOrchestrator};
pub use services::{AnswerEngine, LlmService};
pub use workflow::{TaskCtx, TaskFlow};
