use crate::clients::CatalogClient;
use crate::config::Config;
use crate::error::{AppError, FileError, Result};
use crate::models::{Category, Exam, ExamFile};
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use tracing::{info, warn};

use super::json_loader::read_json_file;

pub const CATEGORIES_FILE: &str = "categories.json";
pub const EXAMS_FILE: &str = "exams.json";

/// 打包数据的来源
pub enum CatalogSource {
    /// 本地目录，包含 categories.json / exams.json
    Directory(PathBuf),
    /// 远程静态资源，按 `<base_url>/<file>` 拉取
    Remote(CatalogClient),
}

impl CatalogSource {
    /// 根据配置选择数据源：http(s) 开头的视为远程地址
    pub fn from_config(config: &Config) -> Result<Self> {
        let source = config.data_source.trim();
        if source.starts_with("http://") || source.starts_with("https://") {
            Ok(CatalogSource::Remote(CatalogClient::new(source, config.http_timeout_secs)?))
        } else {
            Ok(CatalogSource::Directory(PathBuf::from(source)))
        }
    }

    /// 检查本地目录是否存在；远程来源不做检查
    pub fn ensure_available(&self) -> Result<()> {
        match self {
            CatalogSource::Directory(dir) if !dir.is_dir() => {
                Err(AppError::File(FileError::DirectoryNotFound {
                    path: dir.display().to_string(),
                }))
            }
            _ => Ok(()),
        }
    }

    /// 加载打包的分类列表，文件缺失时返回空列表
    pub async fn categories(&self) -> Result<Vec<Category>> {
        Ok(self.fetch::<Vec<Category>>(CATEGORIES_FILE).await?.unwrap_or_default())
    }

    /// 加载打包的考试列表，文件缺失时返回空列表
    pub async fn exams(&self) -> Result<Vec<Exam>> {
        Ok(self
            .fetch::<ExamFile>(EXAMS_FILE)
            .await?
            .map(ExamFile::into_exams)
            .unwrap_or_default())
    }

    async fn fetch<T: DeserializeOwned>(&self, file_name: &str) -> Result<Option<T>> {
        let result = match self {
            CatalogSource::Directory(dir) => read_json_file(&dir.join(file_name)).await?,
            CatalogSource::Remote(client) => client.fetch_json(file_name).await?,
        };

        match &result {
            Some(_) => info!("✓ 已加载打包数据: {}", file_name),
            None => warn!("⚠️ 打包数据不存在: {} ({})", file_name, self),
        }
        Ok(result)
    }
}

impl std::fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogSource::Directory(dir) => write!(f, "{}", dir.display()),
            CatalogSource::Remote(client) => write!(f, "{}", client.base_url()),
        }
    }
}
