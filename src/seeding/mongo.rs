//! 文档数据库中的管理员集合

use crate::config::Config;
use crate::error::{AppError, DatabaseError, Result};
use crate::models::Admin;
use crate::seeding::repository::AdminRepository;
use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, IndexModel};
use tracing::{debug, info};

/// MongoDB 管理员集合
pub struct MongoAdminRepository {
    collection: Collection<Admin>,
}

impl MongoAdminRepository {
    /// 连接数据库
    pub async fn connect(config: &Config) -> Result<Self> {
        let client = Client::with_uri_str(&config.mongodb_uri)
            .await
            .map_err(|source| DatabaseError::ConnectionFailed {
                uri: redact_uri(&config.mongodb_uri),
                source,
            })?;

        info!(
            "🔗 已连接数据库: {} / {}.{}",
            redact_uri(&config.mongodb_uri),
            config.mongodb_database,
            config.admin_collection
        );

        let collection = client
            .database(&config.mongodb_database)
            .collection::<Admin>(&config.admin_collection);
        Ok(Self { collection })
    }
}

#[async_trait]
impl AdminRepository for MongoAdminRepository {
    async fn ensure_indexes(&self) -> Result<()> {
        let index = IndexModel::builder()
            .keys(doc! { "username": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        self.collection
            .create_index(index)
            .await
            .map_err(|e| AppError::db_operation_failed("create_index", e))?;
        debug!("username 唯一索引已就绪");
        Ok(())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Admin>> {
        self.collection
            .find_one(doc! { "username": username })
            .await
            .map_err(|e| AppError::db_operation_failed("find_one", e))
    }

    async fn insert(&self, admin: &Admin) -> Result<()> {
        self.collection
            .insert_one(admin)
            .await
            .map_err(|e| AppError::db_operation_failed("insert_one", e))?;
        Ok(())
    }
}

/// 日志中隐藏连接串里的密码
fn redact_uri(uri: &str) -> String {
    let Some((scheme, rest)) = uri.split_once("://") else {
        return uri.to_string();
    };
    match rest.split_once('@') {
        Some((credentials, host)) => {
            let user = credentials.split(':').next().unwrap_or_default();
            format!("{}://{}:***@{}", scheme, user, host)
        }
        None => uri.to_string(),
    }
}
