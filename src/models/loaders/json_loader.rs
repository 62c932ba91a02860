use crate::error::{AppError, Result};
use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;

/// 读取并解析 JSON 文件
///
/// 文件不存在时返回 `Ok(None)`，由调用方决定是否视为空列表
pub async fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(AppError::file_read_failed(path.display().to_string(), e)),
    };

    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| AppError::json_parse_failed(path.display().to_string(), e))
}
