//! LLM 服务 - 业务能力层
//!
//! 只负责"针对文档回答一个问题"的能力，不关心任务编排
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 通过 `LLM_PROVIDER` 选择 OpenAI 官方接口或兼容 OpenAI API 的自定义端点
//! - 可选的引擎边界重试（默认关闭）

use async_openai::{
    config::OpenAIConfig,
    error::{ApiError, OpenAIError},
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::{Config, EngineProvider};
use crate::error::{ConfigError, EngineError};
use crate::models::Document;
use crate::services::answer_engine::AnswerEngine;
use crate::services::prompt::PromptTemplate;

/// LLM 服务
///
/// 职责：
/// - 渲染提示词（当前日期 + 文档 + 问题）
/// - 调用兼容 OpenAI 的聊天接口
/// - 把底层错误归类为 `EngineError`
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
    temperature: f32,
    max_tokens: u32,
    max_retries: usize,
    template: PromptTemplate,
}

/// 重试等待的基准时长，第 n 次重试等待 n 倍
const RETRY_BASE_DELAY: Duration = Duration::from_secs(2);

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let openai_config = match config.llm_provider {
            EngineProvider::OpenAi => {
                if config.llm_api_key.trim().is_empty() {
                    return Err(ConfigError::Missing {
                        var_name: "LLM_API_KEY".to_string(),
                    });
                }
                OpenAIConfig::new().with_api_key(&config.llm_api_key)
            }
            EngineProvider::Compatible => {
                if config.llm_api_base_url.trim().is_empty() {
                    return Err(ConfigError::Missing {
                        var_name: "LLM_API_BASE_URL".to_string(),
                    });
                }
                // 本地部署的兼容端点可以不需要密钥
                OpenAIConfig::new()
                    .with_api_key(&config.llm_api_key)
                    .with_api_base(&config.llm_api_base_url)
            }
        };

        Ok(Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
            temperature: config.llm_temperature,
            max_tokens: config.llm_max_tokens,
            max_retries: config.llm_max_retries,
            template: PromptTemplate::default(),
        })
    }

    /// 通用的 LLM 调用函数
    ///
    /// # 参数
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息（可选）
    ///
    /// # 返回
    /// 返回去掉首尾空白的响应内容
    pub async fn send_to_llm(
        &self,
        user_message: &str,
        system_message: Option<&str>,
    ) -> Result<String, EngineError> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.chars().count());

        let mut messages = Vec::new();

        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()
                .map_err(EngineError::request_build_failed)?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()
            .map_err(EngineError::request_build_failed)?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build()
            .map_err(EngineError::request_build_failed)?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            classify_api_error(&self.model_name, e)
        })?;

        debug!("LLM API 调用成功");

        let choice = response
            .choices
            .first()
            .ok_or_else(|| EngineError::EmptyResponse {
                model: self.model_name.clone(),
            })?;

        let content = choice
            .message
            .content
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| EngineError::EmptyContent {
                model: self.model_name.clone(),
            })?;

        Ok(content.to_string())
    }
}

#[async_trait]
impl AnswerEngine for LlmService {
    async fn answer(
        &self,
        document: &Document,
        question: &str,
        today: NaiveDate,
    ) -> Result<String, EngineError> {
        let prompt = self.template.render(document, question, today);

        let mut attempt = 0;
        loop {
            match self.send_to_llm(&prompt, None).await {
                Ok(answer) => return Ok(answer),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = RETRY_BASE_DELAY * attempt as u32;
                    warn!(
                        "LLM 调用失败 (尝试 {}/{}), {:?} 后重试: {}",
                        attempt,
                        self.max_retries + 1,
                        delay,
                        e
                    );
                    sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn engine_id(&self) -> &str {
        &self.model_name
    }
}

/// 把 async-openai 的错误归类
///
/// - 接口返回的频率限制 → `RateLimited`
/// - 接口返回的其他错误（鉴权、参数等）、本地参数错误 → `ApiCallFailed`
/// - 其余（连接、读取、响应解析） → `Transport`
fn classify_api_error(model: &str, err: OpenAIError) -> EngineError {
    match err {
        OpenAIError::ApiError(api) if is_rate_limited(&api) => EngineError::RateLimited {
            model: model.to_string(),
            message: api.message,
        },
        rejected @ (OpenAIError::ApiError(_) | OpenAIError::InvalidArgument(_)) => {
            EngineError::api_call_failed(model, rejected)
        }
        other => EngineError::transport(model, other),
    }
}

/// 配额耗尽（insufficient_quota）不算频率限制，重试没有意义
fn is_rate_limited(api: &ApiError) -> bool {
    api.code.as_deref() == Some("rate_limit_exceeded")
        || matches!(
            api.r#type.as_deref(),
            Some("rate_limit_exceeded") | Some("requests") | Some("tokens")
        )
}
