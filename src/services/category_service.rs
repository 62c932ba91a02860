//! 分类加载

use crate::error::Result;
use crate::infrastructure::{keys, LocalStore};
use crate::models::{CatalogSource, Category};
use crate::services::merge::merge_by_id;
use tracing::info;

/// 加载分类：打包数据 + 管理面板写入的本地记录
pub async fn load_categories(source: &CatalogSource, store: &LocalStore) -> Result<Vec<Category>> {
    let bundled = source.categories().await?;
    let local: Vec<Category> = store.get_list(keys::CUSTOM_CATEGORIES);
    let (bundled_count, local_count) = (bundled.len(), local.len());

    let merged = merge_by_id(bundled, local);
    info!(
        "📂 分类: 打包 {} 条, 本地 {} 条, 合并后 {} 条",
        bundled_count,
        local_count,
        merged.len()
    );
    Ok(merged)
}

/// 按 ID 查找分类
pub fn find_category<'a>(categories: &'a [Category], id: &str) -> Option<&'a Category> {
    let id = id.trim();
    categories.iter().find(|c| c.id == id)
}
