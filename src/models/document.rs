//! 会议记录文档
//!
//! 加载后不可变，整次运行内通过 `Arc<Document>` 只读共享给所有任务。

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// 文档：按顺序排列的文本片段（通常一页一个片段）
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    source: Option<PathBuf>,
    segments: Vec<String>,
}

impl Document {
    /// 由文本片段创建文档
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            source: None,
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// 记录文档来源路径
    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.iter().all(|s| s.trim().is_empty())
    }

    /// 所有片段的字符总数
    pub fn char_count(&self) -> usize {
        self.segments.iter().map(|s| s.chars().count()).sum()
    }

    /// 渲染为放入提示词的文本，每个片段带页码标记
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (index, segment) in self.segments.iter().enumerate() {
            if index > 0 {
                out.push('\n');
            }
            let _ = writeln!(out, "[Page {}]", index + 1);
            out.push_str(segment.trim_end());
            out.push('\n');
        }
        out
    }
}
