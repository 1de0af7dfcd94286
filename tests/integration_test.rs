use async_trait::async_trait;
use chrono::NaiveDate;
use meeting_insights::error::{AppError, EngineError, LoadError};
use meeting_insights::models::task::{
    GENERAL_SUMMARY, GENERATE_EMAIL, PROJECT_DESCRIPTION, TRANSCRIPT_ANALYSIS,
};
use meeting_insights::models::{
    AutoLoader, Document, DocumentLoader, FailureKind, RunStatus, Task, TaskSet,
};
use meeting_insights::services::{AnswerEngine, PromptTemplate};
use meeting_insights::{Config, InsightOrchestrator};
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const TRANSCRIPT: &str = "Meeting 2024-01-10: Sarah and Kent discussed the API design...";

/// 总是返回固定文档的加载器
struct StubLoader;

#[async_trait]
impl DocumentLoader for StubLoader {
    async fn load(&self, path: &Path) -> Result<Document, LoadError> {
        Ok(Document::new([TRANSCRIPT]).with_source(path))
    }
}

fn first_ten_words(question: &str) -> String {
    question.split_whitespace().take(10).collect::<Vec<_>>().join(" ")
}

/// 回显问题前十个词；`fail_on` 中的问题返回错误
#[derive(Default)]
struct EchoEngine {
    calls: AtomicUsize,
    fail_on: Vec<String>,
}

impl EchoEngine {
    fn failing_on(questions: Vec<String>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_on: questions,
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnswerEngine for EchoEngine {
    async fn answer(
        &self,
        document: &Document,
        question: &str,
        _today: NaiveDate,
    ) -> Result<String, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(document.segments(), &[TRANSCRIPT.to_string()]);

        if self.fail_on.iter().any(|q| q == question) {
            return Err(EngineError::Timeout {
                model: "echo".to_string(),
                seconds: 30,
            });
        }
        Ok(first_ten_words(question))
    }

    fn engine_id(&self) -> &str {
        "echo"
    }
}

/// 返回渲染后的完整提示词，用来观察日期注入
struct PromptEchoEngine;

#[async_trait]
impl AnswerEngine for PromptEchoEngine {
    async fn answer(
        &self,
        document: &Document,
        question: &str,
        today: NaiveDate,
    ) -> Result<String, EngineError> {
        Ok(PromptTemplate::transcript_qa().render(document, question, today))
    }

    fn engine_id(&self) -> &str {
        "prompt-echo"
    }
}

/// 对指定问题永远不返回
struct HangingEngine {
    hang_on: String,
}

#[async_trait]
impl AnswerEngine for HangingEngine {
    async fn answer(
        &self,
        _document: &Document,
        question: &str,
        _today: NaiveDate,
    ) -> Result<String, EngineError> {
        if question == self.hang_on {
            std::future::pending::<()>().await;
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
        Ok(first_ten_words(question))
    }

    fn engine_id(&self) -> &str {
        "hanging"
    }
}

/// 每次调用耗时 5 秒，记录完成的调用数
#[derive(Default)]
struct SlowCountingEngine {
    finished: AtomicUsize,
}

#[async_trait]
impl AnswerEngine for SlowCountingEngine {
    async fn answer(
        &self,
        _document: &Document,
        question: &str,
        _today: NaiveDate,
    ) -> Result<String, EngineError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        self.finished.fetch_add(1, Ordering::SeqCst);
        Ok(first_ten_words(question))
    }

    fn engine_id(&self) -> &str {
        "slow-counting"
    }
}

fn question_of(name: &str) -> String {
    TaskSet::meeting_insights()
        .iter()
        .find(|t| t.name == name)
        .map(|t| t.question.clone())
        .unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn orchestrator_with(engine: Arc<dyn AnswerEngine>) -> InsightOrchestrator {
    InsightOrchestrator::new(Arc::new(StubLoader), engine, TaskSet::meeting_insights())
        .with_current_date(date(2024, 1, 10))
}

#[tokio::test]
async fn test_end_to_end_echo_yields_four_keys() {
    let engine = Arc::new(EchoEngine::default());
    let orchestrator = orchestrator_with(engine.clone());

    let report = tokio_test::assert_ok!(orchestrator.run("project_meetings.pdf").await);

    assert_eq!(report.results.len(), 4);
    assert_eq!(engine.calls(), 4);
    for task in TaskSet::meeting_insights().iter() {
        let expected = first_ten_words(&task.question);
        assert_eq!(report.results.answer(&task.name), Some(expected.as_str()));
    }
    assert_eq!(report.status(), RunStatus::Success);
    assert_eq!(report.segments, 1);
}

#[tokio::test]
async fn test_key_set_equals_task_names() {
    let report = orchestrator_with(Arc::new(EchoEngine::default()))
        .run("project_meetings.pdf")
        .await
        .unwrap();

    let keys: HashSet<&str> = report.results.keys().collect();
    let expected: HashSet<&str> = [
        TRANSCRIPT_ANALYSIS,
        GENERAL_SUMMARY,
        PROJECT_DESCRIPTION,
        GENERATE_EMAIL,
    ]
    .into_iter()
    .collect();
    assert_eq!(keys, expected);

    let order: Vec<&str> = report.ordered().map(|(name, _)| name).collect();
    assert_eq!(
        order,
        vec![TRANSCRIPT_ANALYSIS, GENERAL_SUMMARY, PROJECT_DESCRIPTION, GENERATE_EMAIL]
    );
}

#[tokio::test]
async fn test_load_failure_skips_engine() {
    let engine = Arc::new(EchoEngine::default());
    let orchestrator = InsightOrchestrator::new(
        Arc::new(AutoLoader::new()),
        engine.clone(),
        TaskSet::meeting_insights(),
    );

    let err = tokio_test::assert_err!(orchestrator.run("does/not/exist/project_meetings.pdf").await);

    assert!(matches!(err, AppError::Load(LoadError::NotFound { .. })));
    assert_eq!(engine.calls(), 0);
}

#[tokio::test]
async fn test_single_engine_failure_is_partial_result() {
    let engine = Arc::new(EchoEngine::failing_on(vec![question_of(GENERATE_EMAIL)]));
    let report = orchestrator_with(engine.clone())
        .run("project_meetings.pdf")
        .await
        .unwrap();

    assert_eq!(engine.calls(), 4);
    assert_eq!(report.results.len(), 4);
    assert_eq!(
        report.status(),
        RunStatus::Partial {
            failed: vec![GENERATE_EMAIL.to_string()]
        }
    );

    let failure = report.results.get(GENERATE_EMAIL).unwrap().failure().unwrap();
    assert_eq!(failure.kind, FailureKind::Timeout);

    for name in [TRANSCRIPT_ANALYSIS, GENERAL_SUMMARY, PROJECT_DESCRIPTION] {
        let expected = first_ten_words(&question_of(name));
        assert_eq!(report.results.answer(name), Some(expected.as_str()));
    }
}

#[tokio::test]
async fn test_task_answers_independent_of_siblings() {
    let healthy = orchestrator_with(Arc::new(EchoEngine::default()))
        .run("project_meetings.pdf")
        .await
        .unwrap();
    let degraded = orchestrator_with(Arc::new(EchoEngine::failing_on(vec![
        question_of(GENERAL_SUMMARY),
        question_of(PROJECT_DESCRIPTION),
    ])))
    .run("project_meetings.pdf")
    .await
    .unwrap();

    for name in [TRANSCRIPT_ANALYSIS, GENERATE_EMAIL] {
        assert_eq!(healthy.results.get(name), degraded.results.get(name));
    }
    assert!(degraded.results.has_failures());
    assert!(!healthy.results.has_failures());
}

#[tokio::test]
async fn test_sequential_execution_gives_same_results() {
    let concurrent = orchestrator_with(Arc::new(EchoEngine::default()))
        .run("project_meetings.pdf")
        .await
        .unwrap();
    let sequential = orchestrator_with(Arc::new(EchoEngine::default()))
        .with_max_concurrent_tasks(1)
        .run("project_meetings.pdf")
        .await
        .unwrap();

    for name in concurrent.order.iter() {
        assert_eq!(concurrent.results.get(name), sequential.results.get(name));
    }
}

#[tokio::test]
async fn test_duplicate_task_name_last_write_wins() {
    let tasks = TaskSet::new(vec![
        Task::new("Roster", "first version of the roster question"),
        Task::new("Decisions", "what was decided"),
        Task::new("Roster", "second version of the roster question"),
    ]);
    let engine = Arc::new(EchoEngine::default());
    let orchestrator = InsightOrchestrator::new(Arc::new(StubLoader), engine.clone(), tasks);

    let report = orchestrator.run("notes.txt").await.unwrap();

    assert_eq!(engine.calls(), 3);
    assert_eq!(report.results.len(), 2);
    assert_eq!(
        report.results.answer("Roster"),
        Some("second version of the roster question")
    );
    assert_eq!(report.order, vec!["Roster".to_string(), "Decisions".to_string()]);
}

#[tokio::test]
async fn test_current_date_is_injected_per_run() {
    let engine: Arc<dyn AnswerEngine> = Arc::new(PromptEchoEngine);

    let first = orchestrator_with(engine.clone())
        .with_current_date(date(2024, 1, 10))
        .run("project_meetings.pdf")
        .await
        .unwrap();
    let second = orchestrator_with(engine)
        .with_current_date(date(2024, 3, 1))
        .run("project_meetings.pdf")
        .await
        .unwrap();

    let a = first.results.answer(GENERATE_EMAIL).unwrap();
    let b = second.results.answer(GENERATE_EMAIL).unwrap();
    assert_ne!(a, b);
    assert!(a.contains("Current date is 2024-01-10"));
    assert!(b.contains("Current date is 2024-03-01"));
    assert_eq!(first.current_date, date(2024, 1, 10));
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_keeps_collected_answers() {
    let engine = Arc::new(HangingEngine {
        hang_on: question_of(PROJECT_DESCRIPTION),
    });
    let orchestrator = orchestrator_with(engine);

    let report = orchestrator
        .run_until(
            "project_meetings.pdf",
            tokio::time::sleep(Duration::from_secs(10)),
        )
        .await
        .unwrap();

    assert_eq!(report.results.len(), 4);
    assert_eq!(
        report.results.get(PROJECT_DESCRIPTION).unwrap().failure().unwrap().kind,
        FailureKind::Cancelled
    );
    for name in [TRANSCRIPT_ANALYSIS, GENERAL_SUMMARY, GENERATE_EMAIL] {
        assert!(report.results.get(name).unwrap().is_answer());
    }
}

#[tokio::test(start_paused = true)]
async fn test_dropped_run_abandons_engine_calls() {
    let engine = Arc::new(SlowCountingEngine::default());
    let orchestrator = orchestrator_with(engine.clone());

    let outcome =
        tokio::time::timeout(Duration::from_secs(1), orchestrator.run("project_meetings.pdf")).await;
    assert!(outcome.is_err());

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(engine.finished.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_call_timeout_marks_only_slow_task() {
    let engine = Arc::new(HangingEngine {
        hang_on: question_of(TRANSCRIPT_ANALYSIS),
    });
    let orchestrator = orchestrator_with(engine).with_call_timeout(Some(Duration::from_secs(5)));

    let report = orchestrator.run("project_meetings.pdf").await.unwrap();

    assert_eq!(
        report.status(),
        RunStatus::Partial {
            failed: vec![TRANSCRIPT_ANALYSIS.to_string()]
        }
    );
    assert_eq!(
        report.results.get(TRANSCRIPT_ANALYSIS).unwrap().failure().unwrap().kind,
        FailureKind::Timeout
    );
}

#[tokio::test]
async fn test_from_config_reads_task_file() {
    let dir = tempfile::tempdir().unwrap();
    let tasks_path = dir.path().join("tasks.toml");
    tokio::fs::write(
        &tasks_path,
        "[[tasks]]\nname = \"Roster\"\nquestion = \"Who attended?\"\n",
    )
    .await
    .unwrap();

    let config = Config {
        tasks_file: Some(tasks_path.display().to_string()),
        llm_api_key: "sk-test".to_string(),
        ..Config::default()
    };

    let orchestrator = InsightOrchestrator::from_config(&config).await.unwrap();
    assert_eq!(orchestrator.tasks().names(), vec!["Roster"]);
}

#[tokio::test]
async fn test_from_config_without_key_fails() {
    let err = InsightOrchestrator::from_config(&Config::default())
        .await
        .err()
        .unwrap();
    assert!(matches!(err, AppError::Config(_)));
}

#[tokio::test]
async fn test_text_transcript_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("meeting.txt");
    tokio::fs::write(&path, format!("{}\n", TRANSCRIPT)).await.unwrap();

    let engine = Arc::new(EchoEngine::default());
    let orchestrator = InsightOrchestrator::new(
        Arc::new(AutoLoader::new()),
        engine.clone(),
        TaskSet::meeting_insights(),
    );

    let report = orchestrator.run(&path).await.unwrap();
    assert!(report.is_success());
    assert_eq!(engine.calls(), 4);
    assert_eq!(report.source, path);
}
