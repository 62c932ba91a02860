use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 文件相关错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 题库数据源错误（本地目录或 HTTP）
    #[error("数据源错误: {0}")]
    Source(#[from] SourceError),
    /// 本地缓存错误
    #[error("本地缓存错误: {0}")]
    Store(#[from] StoreError),
    /// 输入校验错误
    #[error("校验错误: {0}")]
    Validation(#[from] ValidationError),
    /// 数据库错误
    #[error("数据库错误: {0}")]
    Database(#[from] DatabaseError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 命令输出序列化失败
    #[error("输出序列化失败: {0}")]
    Output(#[source] serde_json::Error),
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 目录不存在
    #[error("目录不存在: {path}")]
    DirectoryNotFound { path: String },
}

/// 数据源错误
#[derive(Debug, Error)]
pub enum SourceError {
    /// 网络请求失败
    #[error("请求失败 ({url}): {source}")]
    RequestFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// 服务器返回非成功状态码
    #[error("服务器返回错误状态 ({url}): {status}")]
    BadStatus { url: String, status: u16 },
    /// JSON 解析失败
    #[error("JSON解析失败 ({location}): {source}")]
    JsonParseFailed {
        location: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 本地缓存错误
#[derive(Debug, Error)]
pub enum StoreError {
    /// 序列化缓存内容失败
    #[error("无法序列化键 {key}: {source}")]
    SerializeFailed {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    /// 缓存文件打开时已损坏，拒绝覆盖
    #[error("缓存文件已损坏，拒绝写入 ({path})，请先修复或移走该文件")]
    CorruptFile { path: String },
    /// 键的内容不是记录列表，拒绝覆盖
    #[error("键 {key} 的内容不是记录列表，拒绝写入")]
    NotAList { key: String },
}

/// 输入校验错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// 字段为空
    #[error("{field} 不能为空")]
    EmptyField { field: &'static str },
    /// ID 已存在
    #[error("{kind} ID 已存在: {id}")]
    DuplicateId { kind: &'static str, id: String },
    /// 分类不存在
    #[error("分类不存在: {id}")]
    UnknownCategory { id: String },
    /// 考试不存在
    #[error("考试不存在: {id}")]
    UnknownExam { id: String },
    /// 密码过短
    #[error("密码长度至少为 {min} 个字符")]
    PasswordTooShort { min: usize },
    /// 未知的购买类型
    #[error("未知的购买类型: {value}")]
    UnknownPurchaseType { value: String },
    /// 有效期无法解析
    #[error("无法解析有效期: {value}")]
    InvalidValidity { value: String },
}

/// 数据库错误
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// 连接数据库失败
    #[error("无法连接数据库 ({uri}): {source}")]
    ConnectionFailed {
        uri: String,
        #[source]
        source: mongodb::error::Error,
    },
    /// 查询或写入失败
    #[error("数据库操作失败 ({operation}): {source}")]
    OperationFailed {
        operation: &'static str,
        #[source]
        source: mongodb::error::Error,
    },
    /// 密码哈希失败
    #[error("密码哈希失败: {message}")]
    PasswordHash { message: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: &'static str,
    },
    /// 配置文件解析失败
    #[error("配置文件解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 缺少必需的配置项
    #[error("缺少配置项: {name}")]
    Missing { name: &'static str },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建 JSON 解析错误
    pub fn json_parse_failed(location: impl Into<String>, source: serde_json::Error) -> Self {
        AppError::Source(SourceError::JsonParseFailed {
            location: location.into(),
            source,
        })
    }

    /// 创建数据库操作错误
    pub fn db_operation_failed(operation: &'static str, source: mongodb::error::Error) -> Self {
        AppError::Database(DatabaseError::OperationFailed { operation, source })
    }

    /// 是否为校验错误
    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type Result<T> = std::result::Result<T, AppError>;
