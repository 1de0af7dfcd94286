//! 加载器
//!
//! - `DocumentLoader`：文件路径 → `Document`，按扩展名选择 PDF 或纯文本实现
//! - `toml_loader`：从 TOML 文件加载自定义任务集

pub mod pdf_loader;
pub mod text_loader;
pub mod toml_loader;

pub use pdf_loader::PdfLoader;
pub use text_loader::TextLoader;
pub use toml_loader::{load_task_set, parse_task_set};

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::debug;

use crate::error::LoadError;
use crate::models::Document;

/// 文档加载能力
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    /// 加载文档。文件缺失、不可读或无法解析时返回 `LoadError`
    async fn load(&self, path: &Path) -> Result<Document, LoadError>;
}

/// 按扩展名分派的加载器
#[derive(Debug, Default, Clone)]
pub struct AutoLoader {
    pdf: PdfLoader,
    text: TextLoader,
}

impl AutoLoader {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentLoader for AutoLoader {
    async fn load(&self, path: &Path) -> Result<Document, LoadError> {
        tokio::fs::metadata(path)
            .await
            .map_err(|e| LoadError::read_failed(path, e))?;

        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        debug!("按扩展名 '{}' 选择加载器: {}", extension, path.display());

        match extension.as_str() {
            "pdf" => self.pdf.load(path).await,
            "txt" | "text" | "md" => self.text.load(path).await,
            _ => Err(LoadError::UnsupportedFormat {
                path: path.display().to_string(),
                extension,
            }),
        }
    }
}

static TRAILING_SPACES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)[ \t]+$").expect("行尾空白正则"));
static BLANK_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("连续空行正则"));

/// 清理单页文本：去掉行尾空白，把连续空行压缩为一个
pub(crate) fn normalize_segment(text: &str) -> String {
    let text = text.replace("\r\n", "\n");
    let text = TRAILING_SPACES.replace_all(&text, "");
    let text = BLANK_RUNS.replace_all(&text, "\n\n");
    text.trim().to_string()
}

/// 清理所有页并去掉空白页；没有剩余文本时返回 `EmptyDocument`
pub(crate) fn build_document(path: &Path, pages: Vec<String>) -> Result<Document, LoadError> {
    let mut segments = Vec::with_capacity(pages.len());
    for page in &pages {
        let cleaned = normalize_segment(page);
        if !cleaned.is_empty() {
            segments.push(cleaned);
        }
    }

    if segments.is_empty() {
        return Err(LoadError::EmptyDocument {
            path: path.display().to_string(),
        });
    }

    debug!(
        "文档 {} 共 {} 页, 保留 {} 个非空片段",
        path.display(),
        pages.len(),
        segments.len()
    );

    Ok(Document::new(segments).with_source(path))
}
