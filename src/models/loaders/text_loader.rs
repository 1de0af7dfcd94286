use async_trait::async_trait;
use std::path::Path;

use super::{build_document, DocumentLoader};
use crate::error::LoadError;
use crate::models::Document;

/// 纯文本加载器，换页符（`\x0c`）分隔页面
#[derive(Debug, Default, Clone)]
pub struct TextLoader;

impl TextLoader {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DocumentLoader for TextLoader {
    async fn load(&self, path: &Path) -> Result<Document, LoadError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| LoadError::read_failed(path, e))?;

        let pages = content.split('\x0c').map(str::to_string).collect();
        build_document(path, pages)
    }
}
