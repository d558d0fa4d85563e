//! Word (.docx) 段落读取
//!
//! docx 是一个 zip 包，正文位于 `word/document.xml`。这里只取正文顶层段落
//! （`w:body` 下的 `w:p`），表格内的段落与文本框内嵌段落不计入。

use std::fs::File;
use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use crate::error::ExtractError;

use super::read_failed;

const DOCUMENT_XML: &str = "word/document.xml";

/// 读取 docx 文件的顶层段落文本（未去空白）
pub fn load_docx(path: &Path) -> Result<Vec<String>, ExtractError> {
    let file = File::open(path).map_err(|e| read_failed(path, e))?;
    let mut archive = ZipArchive::new(file).map_err(|e| malformed(path, e))?;

    let mut xml = String::new();
    let mut entry = archive.by_name(DOCUMENT_XML).map_err(|e| malformed(path, e))?;
    entry
        .read_to_string(&mut xml)
        .map_err(|e| malformed(path, e))?;

    parse_document_xml(&xml).map_err(|reason| ExtractError::MalformedDocument {
        path: path.display().to_string(),
        reason,
    })
}

/// 解析 `document.xml`，按文档顺序返回每个顶层段落的文本
///
/// `w:t` 的文本直接拼接，`w:tab` 转为 `\t`，`w:br` / `w:cr` 转为 `\n`。
pub fn parse_document_xml(xml: &str) -> Result<Vec<String>, String> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current: Option<String> = None;
    let mut table_depth = 0usize;
    let mut paragraph_depth = 0usize;
    let mut in_text = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| format!("XML 解析失败 (位置 {}): {}", reader.buffer_position(), e))?;

        match event {
            Event::Start(e) => match e.name().as_ref() {
                b"w:tbl" => table_depth += 1,
                b"w:p" => {
                    paragraph_depth += 1;
                    if paragraph_depth == 1 && table_depth == 0 {
                        current = Some(String::new());
                    }
                }
                b"w:t" => in_text = true,
                _ => {}
            },
            Event::End(e) => match e.name().as_ref() {
                b"w:tbl" => table_depth = table_depth.saturating_sub(1),
                b"w:p" => {
                    if paragraph_depth == 1 {
                        if let Some(text) = current.take() {
                            paragraphs.push(text);
                        }
                    }
                    paragraph_depth = paragraph_depth.saturating_sub(1);
                }
                b"w:t" => in_text = false,
                _ => {}
            },
            Event::Empty(e) => {
                if paragraph_depth == 1 {
                    if let Some(text) = current.as_mut() {
                        match e.name().as_ref() {
                            b"w:tab" => text.push('\t'),
                            b"w:br" | b"w:cr" => text.push('\n'),
                            _ => {}
                        }
                    }
                }
            }
            Event::Text(t) => {
                if in_text && paragraph_depth == 1 {
                    if let Some(text) = current.as_mut() {
                        let unescaped = t.unescape().map_err(|e| e.to_string())?;
                        text.push_str(&unescaped);
                    }
                }
            }
            Event::CData(t) => {
                if in_text && paragraph_depth == 1 {
                    if let Some(text) = current.as_mut() {
                        text.push_str(&String::from_utf8_lossy(&t));
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}

fn malformed(path: &Path, e: impl std::fmt::Display) -> ExtractError {
    ExtractError::MalformedDocument {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn body(inner: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
            inner
        )
    }

    #[test]
    fn test_runs_are_concatenated() {
        let xml = body(
            r#"<w:p><w:r><w:t>系统必须</w:t></w:r><w:r><w:t xml:space="preserve"> 记录错误。</w:t></w:r></w:p>
               <w:p><w:r><w:t>响应时间</w:t><w:tab/><w:t>200ms</w:t></w:r></w:p>"#,
        );
        let paragraphs = parse_document_xml(&xml).unwrap();
        assert_eq!(paragraphs, vec!["系统必须 记录错误。", "响应时间\t200ms"]);
    }

    #[test]
    fn test_empty_paragraphs_are_kept_for_later_filtering() {
        let xml = body(r#"<w:p/><w:p><w:pPr/></w:p><w:p><w:r><w:t>正文</w:t></w:r></w:p>"#);
        let paragraphs = parse_document_xml(&xml).unwrap();
        // <w:p/> 不产生 Start/End 事件，只有显式开闭的段落会出现
        assert_eq!(paragraphs, vec!["", "正文"]);
    }

    #[test]
    fn test_table_paragraphs_are_skipped() {
        let xml = body(
            r#"<w:p><w:r><w:t>表格前</w:t></w:r></w:p>
               <w:tbl><w:tr><w:tc><w:p><w:r><w:t>单元格</w:t></w:r></w:p></w:tc></w:tr></w:tbl>
               <w:p><w:r><w:t>表格后</w:t></w:r></w:p>"#,
        );
        let paragraphs = parse_document_xml(&xml).unwrap();
        assert_eq!(paragraphs, vec!["表格前", "表格后"]);
    }

    #[test]
    fn test_escaped_text_and_line_breaks() {
        let xml = body(r#"<w:p><w:r><w:t>A &amp; B</w:t><w:br/><w:t>&lt;C&gt;</w:t></w:r></w:p>"#);
        let paragraphs = parse_document_xml(&xml).unwrap();
        assert_eq!(paragraphs, vec!["A & B\n<C>"]);
    }

    #[test]
    fn test_broken_xml_is_error() {
        assert!(parse_document_xml("<w:document><w:body><w:p></w:body>").is_err());
    }

    #[test]
    fn test_load_docx_from_zip() {
        let file = tempfile::Builder::new().suffix(".docx").tempfile().unwrap();
        {
            let mut zip = zip::ZipWriter::new(file.reopen().unwrap());
            zip.start_file(DOCUMENT_XML, SimpleFileOptions::default())
                .unwrap();
            zip.write_all(body(r#"<w:p><w:r><w:t>第一段</w:t></w:r></w:p>"#).as_bytes())
                .unwrap();
            zip.finish().unwrap();
        }

        let paragraphs = load_docx(file.path()).unwrap();
        assert_eq!(paragraphs, vec!["第一段"]);
    }

    #[test]
    fn test_not_a_zip_is_malformed() {
        let file = tempfile::Builder::new().suffix(".docx").tempfile().unwrap();
        std::fs::write(file.path(), "plain text pretending to be docx").unwrap();

        let err = load_docx(file.path()).unwrap_err();
        assert!(matches!(err, ExtractError::MalformedDocument { .. }));
    }

    #[test]
    fn test_zip_without_document_xml_is_malformed() {
        let file = tempfile::Builder::new().suffix(".docx").tempfile().unwrap();
        {
            let mut zip = zip::ZipWriter::new(file.reopen().unwrap());
            zip.start_file("word/styles.xml", SimpleFileOptions::default())
                .unwrap();
            zip.write_all(b"<w:styles/>").unwrap();
            zip.finish().unwrap();
        }

        let err = load_docx(file.path()).unwrap_err();
        assert!(matches!(err, ExtractError::MalformedDocument { .. }));
    }
}
