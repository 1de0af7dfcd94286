//! 任务处理上下文
//!
//! 封装"我正在处理第几个任务、用哪个日期"这一信息

use chrono::NaiveDate;
use std::fmt::Display;

/// 任务处理上下文
#[derive(Debug, Clone)]
pub struct TaskCtx {
    /// 任务名称（结果映射的键）
    pub task_name: String,

    /// 任务在任务集中的序号（从1开始，仅用于日志显示）
    pub task_index: usize,

    /// 任务总数
    pub total_tasks: usize,

    /// 本次运行注入的当前日期
    pub today: NaiveDate,
}

impl TaskCtx {
    pub fn new(task_name: String, task_index: usize, total_tasks: usize, today: NaiveDate) -> Self {
        Self {
            task_name,
            task_index,
            total_tasks,
            today,
        }
    }
}

impl Display for TaskCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[任务 {}/{} {}]",
            self.task_index, self.total_tasks, self.task_name
        )
    }
}
