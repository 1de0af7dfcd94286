//! 结果映射
//!
//! 任务名称 → 任务结果（答案或失败标记）。同一个键被多次写入时由合并策略
//! 决定最终值，默认策略是"后写覆盖先写"。

use chrono::NaiveDate;
use serde::ser::{SerializeMap, SerializeStruct, Serializer};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::EngineError;

/// 失败类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// 引擎调用失败（传输错误、空响应等）
    Engine,
    /// 请求频率限制
    RateLimited,
    /// 调用超时
    Timeout,
    /// 任务在完成前被取消
    Cancelled,
    /// 任务执行时 panic
    Panicked,
}

/// 失败标记
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl TaskFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn cancelled() -> Self {
        Self::new(FailureKind::Cancelled, "任务在完成前被取消")
    }
}

impl From<&EngineError> for TaskFailure {
    fn from(err: &EngineError) -> Self {
        let kind = match err {
            EngineError::RateLimited { .. } => FailureKind::RateLimited,
            EngineError::Timeout { .. } => FailureKind::Timeout,
            _ => FailureKind::Engine,
        };
        Self::new(kind, err.to_string())
    }
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

/// 单个任务的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum TaskOutcome {
    Answer(String),
    Failed(TaskFailure),
}

impl TaskOutcome {
    pub fn is_answer(&self) -> bool {
        matches!(self, TaskOutcome::Answer(_))
    }

    pub fn answer(&self) -> Option<&str> {
        match self {
            TaskOutcome::Answer(text) => Some(text),
            TaskOutcome::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&TaskFailure> {
        match self {
            TaskOutcome::Answer(_) => None,
            TaskOutcome::Failed(failure) => Some(failure),
        }
    }
}

/// 合并策略：(已有值, 新值) -> 合并后的值
pub trait MergePolicy: Send + Sync {
    fn merge(&self, existing: Option<TaskOutcome>, incoming: Option<TaskOutcome>)
        -> Option<TaskOutcome>;
}

impl<F> MergePolicy for F
where
    F: Fn(Option<TaskOutcome>, Option<TaskOutcome>) -> Option<TaskOutcome> + Send + Sync,
{
    fn merge(
        &self,
        existing: Option<TaskOutcome>,
        incoming: Option<TaskOutcome>,
    ) -> Option<TaskOutcome> {
        self(existing, incoming)
    }
}

/// 默认策略：有新值时覆盖，没有新值时保留旧值
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepLast;

impl MergePolicy for KeepLast {
    fn merge(
        &self,
        existing: Option<TaskOutcome>,
        incoming: Option<TaskOutcome>,
    ) -> Option<TaskOutcome> {
        incoming.or(existing)
    }
}

/// 结果映射
#[derive(Clone, Serialize)]
pub struct ResultMapping {
    #[serde(flatten)]
    entries: HashMap<String, TaskOutcome>,
    #[serde(skip)]
    policy: Arc<dyn MergePolicy>,
}

impl ResultMapping {
    pub fn new() -> Self {
        Self::with_policy(KeepLast)
    }

    pub fn with_policy(policy: impl MergePolicy + 'static) -> Self {
        Self {
            entries: HashMap::new(),
            policy: Arc::new(policy),
        }
    }

    /// 按合并策略写入一个键
    pub fn record(&mut self, key: impl Into<String>, outcome: TaskOutcome) {
        self.apply(key.into(), Some(outcome));
    }

    pub fn record_answer(&mut self, key: impl Into<String>, answer: impl Into<String>) {
        self.record(key, TaskOutcome::Answer(answer.into()));
    }

    pub fn record_failure(&mut self, key: impl Into<String>, failure: TaskFailure) {
        self.record(key, TaskOutcome::Failed(failure));
    }

    /// 把另一个映射并入当前映射，逐键使用当前映射的策略
    pub fn merge(&mut self, other: ResultMapping) {
        for (key, outcome) in other.entries {
            self.apply(key, Some(outcome));
        }
    }

    fn apply(&mut self, key: String, incoming: Option<TaskOutcome>) {
        let existing = self.entries.remove(&key);
        if let Some(merged) = self.policy.merge(existing, incoming) {
            self.entries.insert(key, merged);
        }
    }

    pub fn get(&self, key: &str) -> Option<&TaskOutcome> {
        self.entries.get(key)
    }

    pub fn answer(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(TaskOutcome::answer)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn has_failures(&self) -> bool {
        self.entries.values().any(|v| !v.is_answer())
    }
}

impl Default for ResultMapping {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ResultMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

/// 运行的最终状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    /// 所有任务都得到了答案
    Success,
    /// 部分任务失败（键按任务顺序排列）
    Partial { failed: Vec<String> },
}

/// 一次运行的报告
///
/// 序列化时 `results` 按 `order` 的顺序输出，与文本输出一致
#[derive(Debug, Clone)]
pub struct RunReport {
    /// 文档来源
    pub source: PathBuf,
    /// 本次运行注入的当前日期
    pub current_date: NaiveDate,
    /// 文档片段数
    pub segments: usize,
    /// 任务顺序（去重后）
    pub order: Vec<String>,
    /// 结果映射
    pub results: ResultMapping,
}

impl RunReport {
    pub fn status(&self) -> RunStatus {
        let failed: Vec<String> = self
            .order
            .iter()
            .filter(|name| self.results.get(name).map_or(true, |o| !o.is_answer()))
            .cloned()
            .collect();

        if failed.is_empty() {
            RunStatus::Success
        } else {
            RunStatus::Partial { failed }
        }
    }

    pub fn is_success(&self) -> bool {
        self.status() == RunStatus::Success
    }

    /// 按任务顺序遍历结果
    pub fn ordered(&self) -> impl Iterator<Item = (&str, Option<&TaskOutcome>)> {
        self.order
            .iter()
            .map(|name| (name.as_str(), self.results.get(name)))
    }
}

impl Serialize for RunReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("RunReport", 5)?;
        state.serialize_field("source", &self.source)?;
        state.serialize_field("current_date", &self.current_date)?;
        state.serialize_field("segments", &self.segments)?;
        state.serialize_field("order", &self.order)?;
        state.serialize_field("results", &OrderedResults(self))?;
        state.end()
    }
}

struct OrderedResults<'a>(&'a RunReport);

impl Serialize for OrderedResults<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.order.len()))?;
        for (name, outcome) in self.0.ordered() {
            map.serialize_entry(name, &outcome)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_write_wins() {
        let mut mapping = ResultMapping::new();
        mapping.record_answer("GenerateEmail", "first draft");
        mapping.record_answer("GenerateEmail", "second draft");

        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping.answer("GenerateEmail"), Some("second draft"));
    }

    #[test]
    fn test_keep_last_without_new_value_keeps_existing() {
        let existing = Some(TaskOutcome::Answer("kept".to_string()));
        assert_eq!(KeepLast.merge(existing.clone(), None), existing);
        assert_eq!(KeepLast.merge(None, None), None);
    }

    #[test]
    fn test_failure_overwritten_by_later_answer() {
        let mut mapping = ResultMapping::new();
        mapping.record_failure("A", TaskFailure::new(FailureKind::Timeout, "slow"));
        assert!(mapping.has_failures());

        mapping.record_answer("A", "done");
        assert!(!mapping.has_failures());
        assert_eq!(mapping.answer("A"), Some("done"));
    }

    #[test]
    fn test_custom_policy_keeps_first_answer() {
        let keep_first = |existing: Option<TaskOutcome>, incoming: Option<TaskOutcome>| {
            existing.or(incoming)
        };
        let mut mapping = ResultMapping::with_policy(keep_first);
        mapping.record_answer("A", "first");
        mapping.record_answer("A", "second");
        assert_eq!(mapping.answer("A"), Some("first"));
    }

    #[test]
    fn test_merge_mappings_disjoint_keys() {
        let mut left = ResultMapping::new();
        left.record_answer("A", "a");
        let mut right = ResultMapping::new();
        right.record_answer("B", "b");
        right.record_answer("A", "a2");

        left.merge(right);
        assert_eq!(left.len(), 2);
        assert_eq!(left.answer("A"), Some("a2"));
        assert_eq!(left.answer("B"), Some("b"));
    }

    #[test]
    fn test_report_status_partial_in_task_order() {
        let mut results = ResultMapping::new();
        results.record_answer("A", "ok");
        results.record_failure("C", TaskFailure::cancelled());
        results.record_failure("B", TaskFailure::new(FailureKind::Engine, "boom"));

        let report = RunReport {
            source: PathBuf::from("t.pdf"),
            current_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            segments: 1,
            order: vec!["A".to_string(), "B".to_string(), "C".to_string()],
            results,
        };

        assert_eq!(
            report.status(),
            RunStatus::Partial {
                failed: vec!["B".to_string(), "C".to_string()]
            }
        );
        assert!(!report.is_success());
    }

    #[test]
    fn test_report_json_follows_task_order() {
        let mut results = ResultMapping::new();
        for name in ["Zeta", "Alpha", "Mid", "Beta"] {
            results.record_answer(name, format!("{} answer", name));
        }
        results.record_failure("Mid", TaskFailure::new(FailureKind::Engine, "boom"));

        let report = RunReport {
            source: PathBuf::from("t.pdf"),
            current_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            segments: 1,
            order: vec![
                "Zeta".to_string(),
                "Alpha".to_string(),
                "Mid".to_string(),
                "Beta".to_string(),
                "Missing".to_string(),
            ],
            results,
        };

        let json = serde_json::to_string(&report).unwrap();
        let results_at = json.find("\"results\"").unwrap();
        let positions: Vec<usize> = ["Zeta", "Alpha", "Mid", "Beta", "Missing"]
            .iter()
            .map(|name| results_at + json[results_at..].find(&format!("\"{}\":", name)).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(json.contains("\"Missing\":null"));

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["results"]["Mid"]["status"], "failed");
        assert_eq!(value["current_date"], "2024-01-10");
    }

    #[test]
    fn test_serialize_outcomes() {
        let mut mapping = ResultMapping::new();
        mapping.record_failure("B", TaskFailure::new(FailureKind::RateLimited, "429"));
        let json = serde_json::to_value(&mapping).unwrap();
        assert_eq!(json["B"]["status"], "failed");
        assert_eq!(json["B"]["value"]["kind"], "rate_limited");
    }
}
