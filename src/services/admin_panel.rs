//! 管理面板 - 业务能力层
//!
//! 把管理员新增的分类、考试和购买记录写入本地缓存，列表页合并时会读到它们。
//! 打包数据只读，这里只能删除本地写入的记录。

use crate::error::{Result, ValidationError};
use crate::infrastructure::{keys, record_field, LocalStore};
use crate::models::{Category, CourseValidity, Exam, Purchase, PurchaseType};
use crate::services::catalog::Catalog;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use std::collections::HashSet;
use tracing::info;

/// 新分类
#[derive(Debug, Clone, Default)]
pub struct CategoryDraft {
    pub id: Option<String>,
    pub name: String,
    pub description: String,
}

/// 新考试
#[derive(Debug, Clone, Default)]
pub struct ExamDraft {
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub category_id: String,
}

/// 新购买记录
#[derive(Debug, Clone)]
pub struct PurchaseDraft {
    pub purchase_type: PurchaseType,
    pub category_id: String,
    pub exam_id: Option<String>,
    pub course_validity: Option<String>,
    pub purchased_at: Option<DateTime<Utc>>,
}

/// 管理面板
pub struct AdminPanel<'a> {
    store: &'a mut LocalStore,
}

impl<'a> AdminPanel<'a> {
    pub fn new(store: &'a mut LocalStore) -> Self {
        Self { store }
    }

    /// 新增分类
    pub async fn add_category(
        &mut self,
        catalog: &Catalog,
        draft: CategoryDraft,
    ) -> Result<Category> {
        let name = required("name", &draft.name)?;
        let used: HashSet<&str> = catalog.categories.iter().map(|c| c.id.as_str()).collect();
        let id = resolve_id("分类", draft.id.as_deref(), &used)?;

        let category = Category::new(id, name, draft.description.trim());
        self.store.push_record(keys::CUSTOM_CATEGORIES, &category)?;
        self.store.save().await?;

        info!("✓ 已新增分类: {} ({})", category.name, category.id);
        Ok(category)
    }

    /// 新增考试，分类必须已存在
    pub async fn add_exam(&mut self, catalog: &Catalog, draft: ExamDraft) -> Result<Exam> {
        let name = required("name", &draft.name)?;
        let category_id = required("categoryId", &draft.category_id)?;
        if catalog.category(category_id).is_none() {
            return Err(ValidationError::UnknownCategory {
                id: category_id.to_string(),
            }
            .into());
        }

        let used: HashSet<&str> = catalog.exams.iter().map(|e| e.id.as_str()).collect();
        let id = resolve_id("考试", draft.id.as_deref(), &used)?;

        let exam = Exam::new(id, name, draft.description.trim(), category_id);
        self.store.push_record(keys::CUSTOM_EXAMS, &exam)?;
        self.store.save().await?;

        info!("✓ 已新增考试: {} ({}) → 分类 {}", exam.name, exam.id, exam.category_id);
        Ok(exam)
    }

    /// 删除本地分类及其本地考试，返回一并删除的考试数量
    pub async fn remove_category(&mut self, id: &str) -> Result<usize> {
        let id = id.trim();
        let is_target = |record: &JsonValue| record_field(record, "id").as_deref() == Some(id);
        let categories = self.store.records(keys::CUSTOM_CATEGORIES)?;
        if !categories.iter().any(|record| is_target(record)) {
            return Err(ValidationError::UnknownCategory { id: id.to_string() }.into());
        }

        let removed_exams = self
            .store
            .remove_records(keys::CUSTOM_EXAMS, |record| {
                record_field(record, "categoryId").as_deref() == Some(id)
            })?
            .len();
        self.store.remove_records(keys::CUSTOM_CATEGORIES, is_target)?;
        self.store.save().await?;

        info!("🗑️ 已删除分类 {}，连带删除 {} 场考试", id, removed_exams);
        Ok(removed_exams)
    }

    /// 删除本地考试，返回被删除的原始记录
    pub async fn remove_exam(&mut self, id: &str) -> Result<JsonValue> {
        let id = id.trim();
        let removed = self
            .store
            .remove_records(keys::CUSTOM_EXAMS, |record| {
                record_field(record, "id").as_deref() == Some(id)
            })?
            .into_iter()
            .next()
            .ok_or_else(|| ValidationError::UnknownExam { id: id.to_string() })?;
        self.store.save().await?;

        info!(
            "🗑️ 已删除考试 {} ({})",
            removed.get("name").and_then(JsonValue::as_str).unwrap_or("未命名"),
            id
        );
        Ok(removed)
    }

    /// 记录一次购买
    pub async fn record_purchase(
        &mut self,
        catalog: &Catalog,
        draft: PurchaseDraft,
    ) -> Result<Purchase> {
        let category_id = required("categoryId", &draft.category_id)?;
        if catalog.category(category_id).is_none() {
            return Err(ValidationError::UnknownCategory {
                id: category_id.to_string(),
            }
            .into());
        }

        let course_validity = match draft.course_validity.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => {
                if CourseValidity::parse(raw).is_none() {
                    return Err(ValidationError::InvalidValidity {
                        value: raw.to_string(),
                    }
                    .into());
                }
                Some(raw.to_string())
            }
        };

        let (test_id, course_id) = match draft.purchase_type {
            PurchaseType::Test => {
                let exam_id = required("testId", draft.exam_id.as_deref().unwrap_or_default())?;
                match catalog.exam(exam_id) {
                    Some(exam) if exam.category_id == category_id => {}
                    _ => {
                        return Err(ValidationError::UnknownExam {
                            id: exam_id.to_string(),
                        }
                        .into())
                    }
                }
                (Some(exam_id.to_string()), None)
            }
            PurchaseType::Course => (None, Some(category_id.to_string())),
            PurchaseType::Category => (None, None),
            PurchaseType::Other(ref value) => {
                return Err(ValidationError::UnknownPurchaseType {
                    value: value.clone(),
                }
                .into())
            }
        };

        let existing: Vec<String> = self
            .store
            .records(keys::PURCHASES)?
            .iter()
            .filter_map(|record| record_field(record, "id"))
            .collect();
        let used: HashSet<&str> = existing.iter().map(String::as_str).collect();
        let id = resolve_id("购买记录", None, &used)?;

        let purchase = Purchase {
            id: Some(id),
            course_id,
            test_id,
            purchase_type: draft.purchase_type,
            category_id: Some(category_id.to_string()),
            course_validity,
            purchased_at: draft.purchased_at.unwrap_or_else(Utc::now),
        };

        self.store.push_record(keys::PURCHASES, &purchase)?;
        self.store.save().await?;

        info!(
            "✓ 已记录购买: {} / 分类 {} / 有效期 {}",
            purchase.purchase_type,
            category_id,
            purchase
                .validity()
                .map(|v| v.to_string())
                .unwrap_or_default()
        );
        Ok(purchase)
    }
}

/// 去除首尾空白后不能为空
fn required<'s>(field: &'static str, value: &'s str) -> Result<&'s str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::EmptyField { field }.into());
    }
    Ok(value)
}

/// 使用给定 ID（不可重复），或以当前毫秒时间戳生成一个未被占用的 ID
fn resolve_id(
    kind: &'static str,
    requested: Option<&str>,
    used: &HashSet<&str>,
) -> Result<String> {
    match requested.map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) if used.contains(id) => Err(ValidationError::DuplicateId {
            kind,
            id: id.to_string(),
        }
        .into()),
        Some(id) => Ok(id.to_string()),
        None => {
            let mut candidate = Utc::now().timestamp_millis();
            while used.contains(candidate.to_string().as_str()) {
                candidate += 1;
            }
            Ok(candidate.to_string())
        }
    }
}
