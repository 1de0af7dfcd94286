//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 按配置组装编排器
//! - 监听 Ctrl-C
//! - 输出结果与统计
//!
//! ### `insight_orchestrator` - 会议分析编排器
//! - 加载一次文档
//! - 对每个任务分发一次引擎调用
//! - 把答案和失败标记汇合到结果映射
//!
//! ### `fan_out` - 通用并发分发/汇合工具
//! - 共享只读输入，每个工作项一个 tokio 任务
//! - Semaphore 限制并发，按原始顺序返回槽位
//!
//! ## 层次关系
//!
//! ```text
//! app
//!     ↓
//! insight_orchestrator (处理 TaskSet)
//!     ↓
//! fan_out (并发执行)
//!     ↓
//! workflow::TaskFlow (处理单个 Task)
//!     ↓
//! services (能力层：AnswerEngine / LlmService)
//! ```

pub mod app;
pub mod fan_out;
pub mod insight_orchestrator;

pub use app::App;
pub use fan_out::{fan_out, Slot};
pub use insight_orchestrator::InsightOrchestrator;
