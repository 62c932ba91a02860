//! 购买记录与有效期检查
//!
//! 只读取本地缓存的购买记录，不涉及支付

use crate::error::Result;
use crate::infrastructure::{keys, LocalStore};
use crate::models::{Purchase, PurchaseType};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

/// 购买记录的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum PurchaseStatus {
    /// 有效；`expires_at` 为 None 表示终身有效
    Active {
        #[serde(rename = "expiresAt")]
        expires_at: Option<DateTime<Utc>>,
    },
    /// 已过期
    Expired {
        #[serde(rename = "expiredAt")]
        expired_at: DateTime<Utc>,
    },
    /// 有效期无法解析，按过期处理
    Invalid,
}

impl PurchaseStatus {
    pub fn is_active(self) -> bool {
        matches!(self, PurchaseStatus::Active { .. })
    }
}

/// 到期时间；终身有效或有效期无法使用时返回 None，需要区分时用 `status_of`
pub fn expiry_of(purchase: &Purchase) -> Option<DateTime<Utc>> {
    purchase
        .validity()
        .and_then(|validity| validity.expiry_from(purchase.purchased_at).ok().flatten())
}

/// 计算购买记录在 `now` 时刻的状态
pub fn status_of(purchase: &Purchase, now: DateTime<Utc>) -> PurchaseStatus {
    let Some(validity) = purchase.validity() else {
        warn!(
            "⚠️ 无法解析有效期 '{}' (记录: {})，按过期处理",
            purchase.course_validity.as_deref().unwrap_or_default(),
            purchase.key().unwrap_or("未知")
        );
        return PurchaseStatus::Invalid;
    };

    match validity.expiry_from(purchase.purchased_at) {
        Ok(Some(expires_at)) if now >= expires_at => PurchaseStatus::Expired {
            expired_at: expires_at,
        },
        Ok(expires_at) => PurchaseStatus::Active { expires_at },
        Err(e) => {
            warn!("⚠️ {} (记录: {})，按过期处理", e, purchase.key().unwrap_or("未知"));
            PurchaseStatus::Invalid
        }
    }
}

/// 是否已过期（有效期无法解析也视为过期）
pub fn is_expired(purchase: &Purchase, now: DateTime<Utc>) -> bool {
    !status_of(purchase, now).is_active()
}

/// 剩余整天数，不小于 0；终身有效返回 None
pub fn days_remaining(purchase: &Purchase, now: DateTime<Utc>) -> Option<i64> {
    match status_of(purchase, now) {
        PurchaseStatus::Active {
            expires_at: Some(expires_at),
        } => Some((expires_at - now).num_days().max(0)),
        PurchaseStatus::Active { expires_at: None } => None,
        PurchaseStatus::Expired { .. } | PurchaseStatus::Invalid => Some(0),
    }
}

/// 判断一条购买记录是否覆盖指定分类 / 考试
fn grants(purchase: &Purchase, category_id: &str, exam_id: Option<&str>) -> bool {
    match purchase.purchase_type {
        PurchaseType::Category | PurchaseType::Course => {
            purchase.covered_category() == Some(category_id)
        }
        PurchaseType::Test => match exam_id {
            Some(exam_id) => {
                purchase.test_id.as_deref().or(purchase.id.as_deref()) == Some(exam_id)
            }
            None => false,
        },
        PurchaseType::Other(_) => false,
    }
}

/// 查找授予访问权限的有效购买记录
///
/// 分类或课程购买覆盖分类下所有考试；单场考试购买只覆盖对应考试。
/// 调用方需保证 `exam_id` 属于 `category_id`
pub fn find_access<'a>(
    purchases: &'a [Purchase],
    category_id: &str,
    exam_id: Option<&str>,
    now: DateTime<Utc>,
) -> Option<&'a Purchase> {
    let category_id = category_id.trim();
    let exam_id = exam_id.map(str::trim);
    purchases
        .iter()
        .filter(|p| grants(p, category_id, exam_id))
        .find(|p| !is_expired(p, now))
}

/// 是否有权访问
pub fn has_access(
    purchases: &[Purchase],
    category_id: &str,
    exam_id: Option<&str>,
    now: DateTime<Utc>,
) -> bool {
    find_access(purchases, category_id, exam_id, now).is_some()
}

/// 仍然有效的购买记录
pub fn active_purchases(purchases: &[Purchase], now: DateTime<Utc>) -> Vec<&Purchase> {
    purchases.iter().filter(|p| !is_expired(p, now)).collect()
}

/// 读取本地缓存中的购买记录
pub fn cached_purchases(store: &LocalStore) -> Vec<Purchase> {
    store.get_list(keys::PURCHASES)
}

/// 从本地缓存中删除过期记录，返回删除数量
///
/// 无法解析的记录原样保留
pub async fn purge_expired(store: &mut LocalStore, now: DateTime<Utc>) -> Result<usize> {
    let removed = store
        .remove_records(keys::PURCHASES, |record| {
            serde_json::from_value::<Purchase>(record.clone())
                .map(|purchase| is_expired(&purchase, now))
                .unwrap_or(false)
        })?
        .len();

    if removed > 0 {
        store.save().await?;
        info!(
            "🗑️ 已清理 {} 条过期购买记录，剩余 {} 条",
            removed,
            store.records(keys::PURCHASES)?.len()
        );
    } else {
        info!("✓ 没有过期的购买记录");
    }

    Ok(removed)
}
