//! 分析任务定义
//!
//! 每个任务是一个名称加一个固定的问题。默认任务集为四个静态任务，
//! 也可以从 TOML 文件加载自定义任务集（见 `loaders::toml_loader`）。

use serde::{Deserialize, Serialize};

pub const TRANSCRIPT_ANALYSIS: &str = "TranscriptAnalysis";
pub const GENERAL_SUMMARY: &str = "GeneralSummary";
pub const PROJECT_DESCRIPTION: &str = "ProjectDescription";
pub const GENERATE_EMAIL: &str = "GenerateEmail";

const TRANSCRIPT_ANALYSIS_QUESTION: &str = r#"Conduct the transcript analysis. It is necessary to determine specialization of each meeting participant.
Create a list of meeting participants, indicate the name and potential specialization for each.
Expected output format:
Meeting (meeting date):
Participants:
1. Sarah Connor: scrum master
2. Kent Smith: software engineer
...
Agenda: (what was the meeting about, what was decided as the result of the meeting, top 3 challenges, top 3 insights)"#;

const GENERAL_SUMMARY_QUESTION: &str = r#"Create a general summary of all meetings for each participant:
name of the participant;
summary of what they were saying.

In addition, find out who generated ideas, who criticized them, who supported them, who was neutral.

Expected response structure:

Participant: Sarah Connor
Summary: (Summary)
Ideas:
  1. (Sarah's idea 1)
     Supporters: John Doe, Mike Smith
     Opposition: -
     Neutrals: Kate Jones
  2. (Sarah's idea 2)
     Supporters: Kate Jones
     Opposition: John Doe
     Neutrals: -"#;

const PROJECT_DESCRIPTION_QUESTION: &str = r#"Create a description of the project.
Include:
- What is the project about?
- What technologies are used in the project for the frontend, backend, data storage, etc.?
- What problems does the project have, what is planned to be implemented in the near future?"#;

const GENERATE_EMAIL_QUESTION: &str = r#"Based on the results of the last three meetings, write the text of a letter for all participants.
Ensure an optimistic and businesslike tone. In the text of the letter,
- summarize the meetings,
- include the next steps to be taken.
Don't forget to thank each participant. Also indicate the date of the next meeting as 10 days after today's date."#;

/// 单个分析任务
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// 任务名称，同时作为结果映射的键
    pub name: String,
    /// 发给应答引擎的问题
    pub question: String,
}

impl Task {
    pub fn new(name: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            question: question.into(),
        }
    }
}

/// 任务集，保持定义顺序（也是默认的输出顺序）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSet {
    pub tasks: Vec<Task>,
}

impl TaskSet {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    /// 内置的四个会议分析任务
    pub fn meeting_insights() -> Self {
        Self::new(vec![
            Task::new(TRANSCRIPT_ANALYSIS, TRANSCRIPT_ANALYSIS_QUESTION),
            Task::new(GENERAL_SUMMARY, GENERAL_SUMMARY_QUESTION),
            Task::new(PROJECT_DESCRIPTION, PROJECT_DESCRIPTION_QUESTION),
            Task::new(GENERATE_EMAIL, GENERATE_EMAIL_QUESTION),
        ])
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    /// 去重后的任务名称，按首次出现的顺序
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::with_capacity(self.tasks.len());
        for task in &self.tasks {
            if !names.contains(&task.name.as_str()) {
                names.push(task.name.as_str());
            }
        }
        names
    }

    /// 出现超过一次的任务名称
    pub fn duplicate_names(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        let mut duplicates: Vec<&str> = Vec::new();
        for task in &self.tasks {
            let name = task.name.as_str();
            if seen.contains(&name) {
                if !duplicates.contains(&name) {
                    duplicates.push(name);
                }
            } else {
                seen.push(name);
            }
        }
        duplicates
    }
}

impl Default for TaskSet {
    fn default() -> Self {
        Self::meeting_insights()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_task_order() {
        let tasks = TaskSet::default();
        assert_eq!(
            tasks.names(),
            vec![TRANSCRIPT_ANALYSIS, GENERAL_SUMMARY, PROJECT_DESCRIPTION, GENERATE_EMAIL]
        );
        assert!(tasks.duplicate_names().is_empty());
    }

    #[test]
    fn test_email_question_mentions_today() {
        let tasks = TaskSet::default();
        let email = tasks.iter().find(|t| t.name == GENERATE_EMAIL).unwrap();
        assert!(email.question.contains("10 days after today's date"));
    }

    #[test]
    fn test_duplicate_names_reported_once() {
        let tasks = TaskSet::new(vec![
            Task::new("A", "first"),
            Task::new("B", "second"),
            Task::new("A", "third"),
            Task::new("A", "fourth"),
        ]);
        assert_eq!(tasks.names(), vec!["A", "B"]);
        assert_eq!(tasks.duplicate_names(), vec!["A"]);
    }
}
