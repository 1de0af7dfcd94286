//! 提示词模板
//!
//! 占位符：`{date}`、`{docs}`、`{question}`。一次性替换，
//! 文档或问题里出现的同名花括号文本不会被二次展开。

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::models::Document;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{(date|docs|question)\}").expect("占位符正则"));

const TRANSCRIPT_QA_TEMPLATE: &str = r#"You are a helpful assistant that can answer user's questions about the meetings from the transcript.
Use the provided project transcript to answer questions.
---------------
Current date is {date}
Project transcript:
{docs}

Question:
{question}

---------------
Answer:
"#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// 会议记录问答模板
    pub fn transcript_qa() -> Self {
        Self::new(TRANSCRIPT_QA_TEMPLATE)
    }

    pub fn render(&self, document: &Document, question: &str, today: NaiveDate) -> String {
        let docs = document.render();
        let date = today.format("%Y-%m-%d").to_string();
        let question = question.trim();

        let rendered = PLACEHOLDER.replace_all(&self.template, |caps: &Captures| {
            match &caps[1] {
                "date" => date.clone(),
                "docs" => docs.clone(),
                _ => question.to_string(),
            }
        });

        rendered.into_owned()
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::transcript_qa()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_render_injects_date_docs_and_question() {
        let doc = Document::new(["Meeting 2024-01-10: Sarah and Kent discussed the API design..."]);
        let prompt = PromptTemplate::transcript_qa()
            .render(&doc, "  Who attended?  ", date(2024, 1, 20));

        assert!(prompt.contains("Current date is 2024-01-20"));
        assert!(prompt.contains("[Page 1]\nMeeting 2024-01-10: Sarah and Kent"));
        assert!(prompt.contains("Question:\nWho attended?\n"));
    }

    #[test]
    fn test_placeholders_inside_document_are_not_expanded() {
        let doc = Document::new(["Kent wrote {question} on the board"]);
        let prompt = PromptTemplate::new("{docs}|{question}")
            .render(&doc, "Q", date(2024, 1, 1));

        assert_eq!(prompt, "[Page 1]\nKent wrote {question} on the board\n|Q");
    }

    #[test]
    fn test_different_dates_render_differently() {
        let doc = Document::new(["notes"]);
        let template = PromptTemplate::default();
        let a = template.render(&doc, "q", date(2024, 1, 1));
        let b = template.render(&doc, "q", date(2024, 1, 2));
        assert_ne!(a, b);
    }
}
