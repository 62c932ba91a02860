//! 管理员初始化流程

use crate::error::{Result, ValidationError};
use crate::models::Admin;
use crate::seeding::password::hash_password;
use crate::seeding::repository::AdminRepository;
use tracing::{info, warn};

/// 密码最短长度
pub const MIN_PASSWORD_LEN: usize = 8;

/// 初始化结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedOutcome {
    /// 新建了账号
    Created(String),
    /// 账号已存在，未做修改
    AlreadyExists(String),
}

/// 创建管理员账号；已存在的账号不会被覆盖
pub async fn seed_admin(
    repo: &dyn AdminRepository,
    username: &str,
    password: &str,
) -> Result<SeedOutcome> {
    let username = username.trim();
    if username.is_empty() {
        return Err(ValidationError::EmptyField { field: "username" }.into());
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        }
        .into());
    }

    repo.ensure_indexes().await?;

    if repo.find_by_username(username).await?.is_some() {
        warn!("⚠️ 管理员 {} 已存在，跳过", username);
        return Ok(SeedOutcome::AlreadyExists(username.to_string()));
    }

    let admin = Admin::new(username, hash_password(password)?);
    repo.insert(&admin).await?;

    info!("✅ 已创建管理员: {}", username);
    Ok(SeedOutcome::Created(username.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::seeding::{verify_password, InMemoryAdminRepository};

    #[tokio::test]
    async fn test_seed_creates_hashed_admin() {
        let repo = InMemoryAdminRepository::new();
        let outcome = seed_admin(&repo, " admin ", "s3cure-passw0rd").await.unwrap();
        assert_eq!(outcome, SeedOutcome::Created("admin".to_string()));

        let stored = repo.find_by_username("admin").await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "s3cure-passw0rd");
        assert!(verify_password(&stored.password_hash, "s3cure-passw0rd").unwrap());
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let repo = InMemoryAdminRepository::new();
        seed_admin(&repo, "admin", "first-password").await.unwrap();
        let original = repo.find_by_username("admin").await.unwrap().unwrap();

        let outcome = seed_admin(&repo, "admin", "second-password").await.unwrap();
        assert_eq!(outcome, SeedOutcome::AlreadyExists("admin".to_string()));

        // 已有账号的密码保持不变
        let current = repo.find_by_username("admin").await.unwrap().unwrap();
        assert_eq!(current, original);
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_seed_validation() {
        let repo = InMemoryAdminRepository::new();

        let err = seed_admin(&repo, "  ", "long-enough-password").await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::EmptyField { field: "username" })
        ));

        let err = seed_admin(&repo, "admin", "short").await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::PasswordTooShort { .. })
        ));
        assert_eq!(repo.len().await, 0);
    }
}
