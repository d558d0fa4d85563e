//! 文档句柄与格式标签

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::ExtractError;

/// 支持的文档格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// Word 文档 (.docx)
    WordDocument,
    /// Markdown / 纯文本 (.md, .markdown)
    Markdown,
}

impl DocumentFormat {
    /// 根据扩展名判断格式（不区分大小写），不支持时返回 None
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "docx" => Some(DocumentFormat::WordDocument),
            "md" | "markdown" => Some(DocumentFormat::Markdown),
            _ => None,
        }
    }

    /// 根据文件名或路径判断格式
    pub fn from_path(path: &Path) -> Result<Self, ExtractError> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| ExtractError::UnsupportedFormat {
                path: path.display().to_string(),
            })
    }

    /// 临时文件使用的后缀
    pub fn suffix(&self) -> &'static str {
        match self {
            DocumentFormat::WordDocument => ".docx",
            DocumentFormat::Markdown => ".md",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFormat::WordDocument => write!(f, "docx"),
            DocumentFormat::Markdown => write!(f, "markdown"),
        }
    }
}

/// 待评审文档：路径 + 格式
///
/// 格式在构造时确定，之后不可变。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    path: PathBuf,
    format: DocumentFormat,
}

impl Document {
    /// 创建文档句柄，扩展名不受支持时立即失败（不访问文件系统）
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ExtractError> {
        let path = path.into();
        let format = DocumentFormat::from_path(&path)?;
        Ok(Self { path, format })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }
}
