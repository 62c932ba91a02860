//! 考试加载

use crate::error::Result;
use crate::infrastructure::{keys, LocalStore};
use crate::models::{CatalogSource, Exam};
use crate::services::merge::merge_by_id;
use std::collections::HashMap;
use tracing::info;

/// 加载考试：打包数据 + 管理面板写入的本地记录
pub async fn load_exams(source: &CatalogSource, store: &LocalStore) -> Result<Vec<Exam>> {
    let bundled = source.exams().await?;
    let local: Vec<Exam> = store.get_list(keys::CUSTOM_EXAMS);
    let (bundled_count, local_count) = (bundled.len(), local.len());

    let merged = merge_by_id(bundled, local);
    info!(
        "📝 考试: 打包 {} 条, 本地 {} 条, 合并后 {} 条",
        bundled_count,
        local_count,
        merged.len()
    );
    Ok(merged)
}

/// 某个分类下的考试，保持合并后的顺序
pub fn exams_for_category<'a>(exams: &'a [Exam], category_id: &str) -> Vec<&'a Exam> {
    let category_id = category_id.trim();
    exams.iter().filter(|e| e.category_id == category_id).collect()
}

/// 各分类的考试数量
pub fn exam_counts(exams: &[Exam]) -> HashMap<&str, usize> {
    let mut counts = HashMap::new();
    for exam in exams {
        *counts.entry(exam.category_id.as_str()).or_insert(0) += 1;
    }
    counts
}
