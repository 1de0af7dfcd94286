pub mod answer_engine;
pub mod llm_service;
pub mod prompt;

pub use answer_engine::AnswerEngine;
pub use llm_service::LlmService;
pub use prompt::PromptTemplate;
