use crate::error::Result;
use crate::models::Admin;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// 管理员账号存储
#[async_trait]
pub trait AdminRepository: Send + Sync {
    /// 创建 username 唯一索引等初始化工作
    async fn ensure_indexes(&self) -> Result<()>;

    async fn find_by_username(&self, username: &str) -> Result<Option<Admin>>;

    async fn insert(&self, admin: &Admin) -> Result<()>;
}

/// 内存存储，用于测试和 `--dry-run`
#[derive(Debug, Default)]
pub struct InMemoryAdminRepository {
    admins: Mutex<HashMap<String, Admin>>,
}

impl InMemoryAdminRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.admins.lock().await.len()
    }
}

#[async_trait]
impl AdminRepository for InMemoryAdminRepository {
    async fn ensure_indexes(&self) -> Result<()> {
        Ok(())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Admin>> {
        Ok(self.admins.lock().await.get(username).cloned())
    }

    async fn insert(&self, admin: &Admin) -> Result<()> {
        self.admins
            .lock()
            .await
            .insert(admin.username.clone(), admin.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_insert_and_find() {
        let repo = InMemoryAdminRepository::new();
        tokio_test::block_on(async {
            repo.insert(&Admin::new("root", "hash")).await.unwrap();
            assert!(repo.find_by_username("root").await.unwrap().is_some());
            assert!(repo.find_by_username("nobody").await.unwrap().is_none());
            assert_eq!(repo.len().await, 1);
        });
    }
}
