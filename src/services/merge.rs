//! 按 ID 合并打包数据与本地缓存

use crate::models::Identified;
use std::collections::HashMap;
use tracing::warn;

/// 合并两份记录列表并按 ID 去重
///
/// - 先打包数据，后本地缓存
/// - 同一 ID 后出现的记录替换先出现的记录，但保留首次出现的位置
/// - ID 或名称为空的记录被丢弃
pub fn merge_by_id<T: Identified>(bundled: Vec<T>, local: Vec<T>) -> Vec<T> {
    let mut merged: Vec<T> = Vec::with_capacity(bundled.len() + local.len());
    let mut positions: HashMap<String, usize> = HashMap::new();

    for record in bundled.into_iter().chain(local) {
        if !record.is_listable() {
            warn!("⚠️ 跳过不完整的记录 (ID: '{}')", record.id());
            continue;
        }

        match positions.get(record.id()) {
            Some(&index) => merged[index] = record,
            None => {
                positions.insert(record.id().to_string(), merged.len());
                merged.push(record);
            }
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    #[test]
    fn test_local_overrides_in_place() {
        let bundled = vec![
            Category::new("1", "Banking", ""),
            Category::new("2", "SSC", ""),
        ];
        let local = vec![
            Category::new("3", "Railways", ""),
            Category::new("1", "Banking & Insurance", "edited"),
        ];

        let merged = merge_by_id(bundled, local);
        let names: Vec<&str> = merged.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Banking & Insurance", "SSC", "Railways"]);
    }

    #[test]
    fn test_duplicates_within_one_source() {
        let bundled = vec![
            Category::new("1", "First", ""),
            Category::new("1", "Second", ""),
        ];
        let merged = merge_by_id(bundled, Vec::new());
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].name, "Second");
    }

    #[test]
    fn test_drops_incomplete_records() {
        let local = vec![Category::new("", "No id", ""), Category::new("4", "  ", "")];
        assert!(merge_by_id(Vec::new(), local).is_empty());
    }
}
