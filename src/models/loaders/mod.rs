//! 段落抽取
//!
//! 把 docx / markdown 文档规整为有序的非空段落序列。抽取是纯函数，
//! 除读文件外没有副作用；同一文件重复抽取得到相同结果。

pub mod docx_loader;
pub mod markdown_loader;

use std::path::Path;

use tracing::{debug, warn};

use crate::error::ExtractError;
use crate::models::document::{Document, DocumentFormat};
use crate::models::paragraph::ParagraphSequence;

/// 从文件路径抽取段落
///
/// 扩展名不受支持时返回 `UnsupportedFormat`，且不会访问文件系统。
pub fn extract_paragraphs(path: impl AsRef<Path>) -> Result<ParagraphSequence, ExtractError> {
    let document = Document::open(path.as_ref())?;
    extract_document(&document)
}

/// 从已确定格式的文档抽取段落
pub fn extract_document(document: &Document) -> Result<ParagraphSequence, ExtractError> {
    let path = document.path();
    if !path.is_file() {
        return Err(ExtractError::NotFound {
            path: path.display().to_string(),
        });
    }

    let segments = match document.format() {
        DocumentFormat::WordDocument => docx_loader::load_docx(path)?,
        DocumentFormat::Markdown => markdown_loader::load_markdown(path)?,
    };
    let paragraphs = ParagraphSequence::from_segments(segments);

    if paragraphs.is_empty() {
        warn!("⚠️ 文档未提取到任何段落: {}", path.display());
    } else {
        debug!(
            "从 {} ({}) 提取到 {} 个段落",
            path.display(),
            document.format(),
            paragraphs.len()
        );
    }

    Ok(paragraphs)
}

pub(crate) fn read_failed(path: &Path, source: std::io::Error) -> ExtractError {
    if source.kind() == std::io::ErrorKind::NotFound {
        ExtractError::NotFound {
            path: path.display().to_string(),
        }
    } else {
        ExtractError::ReadFailed {
            path: path.display().to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_unsupported_format_checked_before_existence() {
        let err = extract_paragraphs("/no/such/dir/report.pdf").unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = extract_paragraphs("/no/such/dir/report.md").unwrap_err();
        assert!(matches!(err, ExtractError::NotFound { .. }));
    }

    #[test]
    fn test_directory_is_not_found() {
        let dir = tempfile::Builder::new().suffix(".md").tempdir().unwrap();
        let err = extract_paragraphs(dir.path()).unwrap_err();
        assert!(matches!(err, ExtractError::NotFound { .. }));
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let mut file = tempfile::Builder::new().suffix(".md").tempfile().unwrap();
        writeln!(file, "# 标题\n\n正文第一段\n  \n- 列表项").unwrap();

        let first = extract_paragraphs(file.path()).unwrap();
        let second = extract_paragraphs(file.path()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn test_empty_document_is_ok() {
        let mut file = tempfile::Builder::new().suffix(".md").tempfile().unwrap();
        writeln!(file, "\n   \n\t\n").unwrap();

        let paragraphs = extract_paragraphs(file.path()).unwrap();
        assert!(paragraphs.is_empty());
    }
}
