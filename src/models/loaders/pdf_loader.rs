use async_trait::async_trait;
use std::path::Path;
use tracing::info;

use super::{build_document, DocumentLoader};
use crate::error::LoadError;
use crate::models::Document;

/// PDF 加载器，每页一个文本片段
///
/// 文本抽取交给 `pdf-extract`，在阻塞线程池中执行。
#[derive(Debug, Default, Clone)]
pub struct PdfLoader;

impl PdfLoader {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DocumentLoader for PdfLoader {
    async fn load(&self, path: &Path) -> Result<Document, LoadError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| LoadError::read_failed(path, e))?;

        info!("📄 正在解析 PDF: {} ({} 字节)", path.display(), bytes.len());

        let pages = tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem_by_pages(&bytes).map_err(|e| e.to_string())
        })
        .await
        .map_err(|e| LoadError::parse_failed(path, e))?
        .map_err(|msg| LoadError::ParseFailed {
            path: path.display().to_string(),
            source: msg.into(),
        })?;

        build_document(path, pages)
    }
}
