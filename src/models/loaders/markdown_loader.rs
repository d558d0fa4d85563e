use std::path::Path;

use crate::error::ExtractError;

use super::read_failed;

/// 按行读取 markdown / 纯文本
///
/// 不做任何 markdown 结构解析，标题、列表项都按普通文本行处理。
pub fn load_markdown(path: &Path) -> Result<Vec<String>, ExtractError> {
    let bytes = std::fs::read(path).map_err(|e| read_failed(path, e))?;
    let content = String::from_utf8(bytes).map_err(|e| ExtractError::ReadFailed {
        path: path.display().to_string(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
    })?;
    Ok(split_lines(&content))
}

/// 按 `\n`、`\r\n`、`\r` 切分，去除首尾空白并丢弃空行
pub fn split_lines(content: &str) -> Vec<String> {
    content
        .trim_start_matches('\u{feff}')
        .split(['\n', '\r'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
