//! 应答引擎接口
//!
//! 给定文档、问题和当前日期，返回文本答案。编排层只依赖这个 trait，
//! 测试中可以替换为桩实现。

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::EngineError;
use crate::models::Document;

#[async_trait]
pub trait AnswerEngine: Send + Sync {
    /// 针对文档回答一个问题，`today` 会注入到提示词中
    async fn answer(
        &self,
        document: &Document,
        question: &str,
        today: NaiveDate,
    ) -> Result<String, EngineError>;

    /// 引擎标识（用于日志和错误信息），例如模型名称
    fn engine_id(&self) -> &str;
}
