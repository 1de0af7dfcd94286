//! 错误类型
//!
//! 分为四类：
//! - `LoadError`：文档加载失败，整次运行直接终止
//! - `EngineError`：单个任务调用应答引擎失败，只影响该任务
//! - `ConfigError`：环境变量配置错误
//! - `TaskSetError`：任务定义文件错误

use std::path::Path;
use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 文档加载错误
    #[error("文档加载错误: {0}")]
    Load(#[from] LoadError),
    /// 应答引擎错误
    #[error("应答引擎错误: {0}")]
    Engine(#[from] EngineError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 任务定义错误
    #[error("任务定义错误: {0}")]
    TaskSet(#[from] TaskSetError),
}

/// 文档加载错误
#[derive(Debug, Error)]
pub enum LoadError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    NotFound { path: String },

    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// 不支持的文件格式
    #[error("不支持的文件格式 ({path}): {extension}")]
    UnsupportedFormat { path: String, extension: String },

    /// 文档解析失败
    #[error("文档解析失败 ({path}): {source}")]
    ParseFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// 文档中没有可用文本
    #[error("文档中没有可用文本: {path}")]
    EmptyDocument { path: String },
}

/// 应答引擎错误
#[derive(Debug, Error)]
pub enum EngineError {
    /// API 调用失败
    #[error("LLM API调用失败 (模型: {model}): {source}")]
    ApiCallFailed {
        model: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// 网络传输失败（连接、读取响应等）
    #[error("LLM API传输失败 (模型: {model}): {source}")]
    Transport {
        model: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// 请求频率限制
    #[error("LLM API请求频率限制 (模型: {model}): {message}")]
    RateLimited { model: String, message: String },

    /// 调用超时
    #[error("LLM调用超时 (模型: {model}), 超过 {seconds} 秒")]
    Timeout { model: String, seconds: u64 },

    /// 返回结果为空
    #[error("LLM返回结果为空 (模型: {model})")]
    EmptyResponse { model: String },

    /// 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyContent { model: String },

    /// 构建请求失败
    #[error("构建LLM请求失败: {source}")]
    RequestBuildFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },

    /// 必需的配置项缺失
    #[error("缺少必需的配置项: {var_name}")]
    Missing { var_name: String },
}

/// 任务定义错误
#[derive(Debug, Error)]
pub enum TaskSetError {
    /// 读取任务文件失败
    #[error("读取任务文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// 任务列表为空
    #[error("任务列表为空")]
    Empty,

    /// 任务名称为空
    #[error("第 {index} 个任务的名称为空")]
    EmptyName { index: usize },

    /// 任务问题为空
    #[error("任务 {name} 的问题内容为空")]
    EmptyQuestion { name: String },
}

// ========== 便捷构造函数 ==========

impl LoadError {
    /// 创建文件读取错误
    pub fn read_failed(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            return LoadError::NotFound {
                path: path.display().to_string(),
            };
        }
        LoadError::ReadFailed {
            path: path.display().to_string(),
            source,
        }
    }

    /// 创建文档解析错误
    pub fn parse_failed(
        path: &Path,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        LoadError::ParseFailed {
            path: path.display().to_string(),
            source: Box::new(source),
        }
    }
}

impl EngineError {
    /// 创建LLM API调用错误
    pub fn api_call_failed(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        EngineError::ApiCallFailed {
            model: model.into(),
            source: Box::new(source),
        }
    }

    /// 创建网络传输错误
    pub fn transport(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        EngineError::Transport {
            model: model.into(),
            source: Box::new(source),
        }
    }

    /// 创建请求构建错误
    pub fn request_build_failed(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        EngineError::RequestBuildFailed {
            source: Box::new(source),
        }
    }

    /// 是否值得在引擎边界重试：只有频率限制和传输错误
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            EngineError::RateLimited { .. } | EngineError::Transport { .. }
        )
    }
}

impl ConfigError {
    pub fn parse_failed(
        var_name: impl Into<String>,
        value: impl Into<String>,
        expected_type: impl Into<String>,
    ) -> Self {
        ConfigError::EnvVarParseFailed {
            var_name: var_name.into(),
            value: value.into(),
            expected_type: expected_type.into(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
