use crate::error::{AppError, ConfigError, Result};
use serde::Deserialize;
use std::path::Path;

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 题库数据源：本地目录或 http(s) 基础地址
    pub data_source: String,
    /// 本地缓存文件（管理面板写入的记录）
    pub local_store_path: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 远程数据源的请求超时（秒）
    pub http_timeout_secs: u64,
    // --- 文档数据库配置 ---
    pub mongodb_uri: String,
    pub mongodb_database: String,
    pub admin_collection: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_source: "data".to_string(),
            local_store_path: "local_storage.json".to_string(),
            verbose_logging: false,
            http_timeout_secs: 10,
            mongodb_uri: "mongodb://localhost:27017".to_string(),
            mongodb_database: "exam_catalog".to_string(),
            admin_collection: "admins".to_string(),
        }
    }
}

impl Config {
    /// 从环境变量加载配置，未设置的项使用默认值
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 文件加载配置，环境变量优先于文件内容
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
        let file_config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::TomlParseFailed {
                path: path.display().to_string(),
                source,
            })?;
        file_config.with_env_overrides()
    }

    fn with_env_overrides(self) -> Result<Self> {
        Ok(Self {
            data_source: std::env::var("CATALOG_DATA_SOURCE").unwrap_or(self.data_source),
            local_store_path: std::env::var("LOCAL_STORE_PATH").unwrap_or(self.local_store_path),
            verbose_logging: parse_env("VERBOSE_LOGGING", "bool")?.unwrap_or(self.verbose_logging),
            http_timeout_secs: parse_env("HTTP_TIMEOUT_SECS", "u64")?
                .unwrap_or(self.http_timeout_secs),
            mongodb_uri: std::env::var("MONGODB_URI").unwrap_or(self.mongodb_uri),
            mongodb_database: std::env::var("MONGODB_DATABASE").unwrap_or(self.mongodb_database),
            admin_collection: std::env::var("ADMIN_COLLECTION").unwrap_or(self.admin_collection),
        })
    }
}

/// 读取并解析环境变量；未设置返回 None，格式错误返回配置错误
fn parse_env<T: std::str::FromStr>(
    var_name: &str,
    expected_type: &'static str,
) -> Result<Option<T>> {
    match std::env::var(var_name) {
        Ok(value) => value.trim().parse().map(Some).map_err(|_| {
            ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type,
            }
            .into()
        }),
        Err(_) => Ok(None),
    }
}
