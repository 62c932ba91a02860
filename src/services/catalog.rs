//! 合并后的题库目录快照

use crate::error::Result;
use crate::infrastructure::LocalStore;
use crate::models::{CatalogSource, Category, Exam};
use crate::services::{category_service, exam_service};
use futures::future::try_join;
use serde::Serialize;

/// 合并后的分类与考试
#[derive(Debug, Clone, Default, Serialize)]
pub struct Catalog {
    pub categories: Vec<Category>,
    pub exams: Vec<Exam>,
}

/// 列表页上的一行分类
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary<'a> {
    #[serde(flatten)]
    pub category: &'a Category,
    pub exam_count: usize,
}

impl Catalog {
    /// 同时加载分类和考试
    pub async fn load(source: &CatalogSource, store: &LocalStore) -> Result<Self> {
        let (categories, exams) = try_join(
            category_service::load_categories(source, store),
            exam_service::load_exams(source, store),
        )
        .await?;

        Ok(Self { categories, exams })
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        category_service::find_category(&self.categories, id)
    }

    pub fn exam(&self, id: &str) -> Option<&Exam> {
        let id = id.trim();
        self.exams.iter().find(|e| e.id == id)
    }

    pub fn exams_in(&self, category_id: &str) -> Vec<&Exam> {
        exam_service::exams_for_category(&self.exams, category_id)
    }

    /// 分类列表及其考试数量
    pub fn summaries(&self) -> Vec<CategorySummary<'_>> {
        let counts = exam_service::exam_counts(&self.exams);
        self.categories
            .iter()
            .map(|category| CategorySummary {
                category,
                exam_count: counts.get(category.id.as_str()).copied().unwrap_or(0),
            })
            .collect()
    }

    /// 没有对应分类的考试（分类被删除后残留）
    pub fn orphaned_exams(&self) -> Vec<&Exam> {
        self.exams
            .iter()
            .filter(|e| self.category(&e.category_id).is_none())
            .collect()
    }
}
