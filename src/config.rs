use crate::error::ConfigError;
use chrono::NaiveDate;
use std::str::FromStr;

/// 应答引擎提供方
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineProvider {
    /// OpenAI 官方接口
    OpenAi,
    /// 兼容 OpenAI API 的自定义端点
    Compatible,
}

impl FromStr for EngineProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(EngineProvider::OpenAi),
            "compatible" | "custom" => Ok(EngineProvider::Compatible),
            other => Err(ConfigError::parse_failed("LLM_PROVIDER", other, "openai|compatible")),
        }
    }
}

/// 结果输出格式
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// 按任务分节打印
    Text,
    /// 整个运行报告输出为 JSON
    Json,
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(ConfigError::parse_failed("OUTPUT_FORMAT", other, "text|json")),
        }
    }
}

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 会议记录文件路径
    pub transcript_path: String,
    /// 自定义任务定义文件（TOML），为空时使用内置的四个任务
    pub tasks_file: Option<String>,
    /// 同时进行的分析任务数量
    pub max_concurrent_tasks: usize,
    /// 固定的"当前日期"，为空时每次运行读取本地日期
    pub current_date: Option<NaiveDate>,
    /// 输出格式
    pub output_format: OutputFormat,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- LLM 配置 ---
    pub llm_provider: EngineProvider,
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub llm_temperature: f32,
    pub llm_max_tokens: u32,
    /// 单次调用超时（秒），0 表示不限制
    pub llm_timeout_secs: u64,
    /// 引擎边界的重试次数，0 表示不重试
    pub llm_max_retries: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            transcript_path: "project_meetings.pdf".to_string(),
            tasks_file: None,
            max_concurrent_tasks: 4,
            current_date: None,
            output_format: OutputFormat::Text,
            verbose_logging: false,
            llm_provider: EngineProvider::OpenAi,
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o".to_string(),
            llm_temperature: 0.0,
            llm_max_tokens: 4096,
            llm_timeout_secs: 120,
            llm_max_retries: 0,
        }
    }
}

impl Config {
    /// 从环境变量加载配置（会先读取 `.env`）
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 从任意键值来源加载配置，未设置的项使用默认值
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let current_date = match var("CURRENT_DATE") {
            Some(raw) => Some(
                NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                    .map_err(|_| ConfigError::parse_failed("CURRENT_DATE", raw.clone(), "YYYY-MM-DD"))?,
            ),
            None => None,
        };

        let llm_api_key = var("LLM_API_KEY")
            .or_else(|| var("OPENAI_API_KEY"))
            .unwrap_or(default.llm_api_key);

        Ok(Self {
            transcript_path: var("TRANSCRIPT_PATH").unwrap_or(default.transcript_path),
            tasks_file: var("TASKS_FILE"),
            max_concurrent_tasks: parse_var(&var, "MAX_CONCURRENT_TASKS", "usize")?
                .unwrap_or(default.max_concurrent_tasks),
            current_date,
            output_format: parse_var(&var, "OUTPUT_FORMAT", "text|json")?
                .unwrap_or(default.output_format),
            verbose_logging: parse_var(&var, "VERBOSE_LOGGING", "bool")?
                .unwrap_or(default.verbose_logging),
            llm_provider: parse_var(&var, "LLM_PROVIDER", "openai|compatible")?
                .unwrap_or(default.llm_provider),
            llm_api_key,
            llm_api_base_url: var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            llm_temperature: parse_var(&var, "LLM_TEMPERATURE", "f32")?
                .unwrap_or(default.llm_temperature),
            llm_max_tokens: parse_var(&var, "LLM_MAX_TOKENS", "u32")?
                .unwrap_or(default.llm_max_tokens),
            llm_timeout_secs: parse_var(&var, "LLM_TIMEOUT_SECS", "u64")?
                .unwrap_or(default.llm_timeout_secs),
            llm_max_retries: parse_var(&var, "LLM_MAX_RETRIES", "usize")?
                .unwrap_or(default.llm_max_retries),
        })
    }
}

fn parse_var<T, F>(var: &F, name: &str, expected_type: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match var(name) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::parse_failed(name, raw, expected_type)),
        None => Ok(None),
    }
}
