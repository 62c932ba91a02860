//! 本地缓存 - 基础设施层
//!
//! 浏览器 localStorage 的文件版本：一个 JSON 对象，键对应一份记录列表。
//! 值既可以是 JSON 数组，也可以是从浏览器导出的 JSON 字符串。

use crate::error::{AppError, Result, StoreError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// 管理面板使用的缓存键
pub mod keys {
    pub const CUSTOM_CATEGORIES: &str = "customCategories";
    pub const CUSTOM_EXAMS: &str = "customExams";
    pub const PURCHASES: &str = "purchases";
}

/// 本地缓存
///
/// 职责：
/// - 持有缓存文件路径和内容
/// - 按键读写记录列表
/// - 不认识分类 / 考试的业务规则
///
/// 写入只替换被修改的键，键里无法识别的记录原样保留
#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
    entries: Map<String, JsonValue>,
    corrupt: bool,
}

impl LocalStore {
    /// 打开缓存文件
    ///
    /// 文件不存在时得到空缓存；内容损坏时记录警告，以只读的空缓存打开，
    /// 之后的 `save` 会失败而不会覆盖原文件
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut corrupt = false;
        let entries = match fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => Map::new(),
            Ok(content) => match serde_json::from_str::<Map<String, JsonValue>>(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(
                        "⚠️ 本地缓存已损坏，按只读空缓存处理 ({}): {}",
                        path.display(),
                        e
                    );
                    corrupt = true;
                    Map::new()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("本地缓存不存在，使用空缓存: {}", path.display());
                Map::new()
            }
            Err(e) => return Err(AppError::file_read_failed(path.display().to_string(), e)),
        };

        Ok(Self {
            path,
            entries,
            corrupt,
        })
    }

    /// 不关联文件的空缓存
    pub fn in_memory() -> Self {
        Self {
            path: PathBuf::new(),
            entries: Map::new(),
            corrupt: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 打开时文件已损坏
    pub fn is_corrupt(&self) -> bool {
        self.corrupt
    }

    /// 读取记录列表
    ///
    /// 键不存在返回空列表；整个键无法解析时返回空列表，单条记录无法解析时跳过，均记录警告
    pub fn get_list<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let records = match self.records(key) {
            Ok(records) => records,
            Err(e) => {
                warn!("⚠️ {}，按空列表处理", e);
                return Vec::new();
            }
        };

        records
            .into_iter()
            .filter_map(|record| match serde_json::from_value::<T>(record) {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!("⚠️ 缓存键 {} 中有记录无法解析，已跳过: {}", key, e);
                    None
                }
            })
            .collect()
    }

    /// 读取键中的原始记录
    ///
    /// 键不存在或为空返回空列表；内容不是数组时返回错误
    pub fn records(&self, key: &str) -> Result<Vec<JsonValue>> {
        let not_a_list = || AppError::from(StoreError::NotAList { key: key.to_string() });
        match self.entries.get(key) {
            None | Some(JsonValue::Null) => Ok(Vec::new()),
            Some(JsonValue::Array(items)) => Ok(items.clone()),
            Some(JsonValue::String(raw)) if raw.trim().is_empty() => Ok(Vec::new()),
            Some(JsonValue::String(raw)) => match serde_json::from_str::<JsonValue>(raw) {
                Ok(JsonValue::Array(items)) => Ok(items),
                Ok(JsonValue::Null) => Ok(Vec::new()),
                _ => Err(not_a_list()),
            },
            Some(_) => Err(not_a_list()),
        }
    }

    /// 追加一条记录，键中已有的记录（包括无法识别的）原样保留
    pub fn push_record<T: Serialize>(&mut self, key: &str, record: &T) -> Result<()> {
        let mut records = self.records(key)?;
        records.push(to_json(key, record)?);
        self.entries.insert(key.to_string(), JsonValue::Array(records));
        Ok(())
    }

    /// 删除满足条件的记录并返回它们，其余记录原样保留
    pub fn remove_records(
        &mut self,
        key: &str,
        mut predicate: impl FnMut(&JsonValue) -> bool,
    ) -> Result<Vec<JsonValue>> {
        let (removed, kept): (Vec<_>, Vec<_>) =
            self.records(key)?.into_iter().partition(|record| predicate(record));
        if !removed.is_empty() {
            self.entries.insert(key.to_string(), JsonValue::Array(kept));
        }
        Ok(removed)
    }

    /// 写入记录列表（仅修改内存，需调用 `save` 落盘）
    pub fn set_list<T: Serialize>(&mut self, key: &str, items: &[T]) -> Result<()> {
        let value = to_json(key, items)?;
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    /// 删除一个键，返回键是否存在
    pub fn remove(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// 写回文件：先写临时文件再替换，避免中途失败留下半个文件
    ///
    /// 打开时文件已损坏则拒绝写入，原文件保持不变
    pub async fn save(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Ok(());
        }
        if self.corrupt {
            return Err(StoreError::CorruptFile {
                path: self.path.display().to_string(),
            }
            .into());
        }

        let content = serde_json::to_string_pretty(&self.entries).map_err(|source| {
            StoreError::SerializeFailed {
                key: "*".to_string(),
                source,
            }
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::file_write_failed(parent.display().to_string(), e))?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content)
            .await
            .map_err(|e| AppError::file_write_failed(tmp_path.display().to_string(), e))?;
        fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| AppError::file_write_failed(self.path.display().to_string(), e))?;

        debug!("本地缓存已保存: {}", self.path.display());
        Ok(())
    }
}

fn to_json<T: Serialize + ?Sized>(key: &str, value: &T) -> Result<JsonValue> {
    serde_json::to_value(value).map_err(|source| {
        StoreError::SerializeFailed {
            key: key.to_string(),
            source,
        }
        .into()
    })
}

/// 读取原始记录中的 ID 类字段，数字和字符串统一为字符串
pub fn record_field(record: &JsonValue, field: &str) -> Option<String> {
    match record.get(field)? {
        JsonValue::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        JsonValue::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(i), _, _) => Some(i.to_string()),
            (_, Some(u), _) => Some(u.to_string()),
            (_, _, Some(f)) if f.fract() == 0.0 => Some(format!("{:.0}", f)),
            _ => Some(n.to_string()),
        },
        _ => None,
    }
}
