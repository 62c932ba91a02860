pub mod admin;
pub mod category;
pub mod de;
pub mod exam;
pub mod loaders;
pub mod purchase;

pub use admin::Admin;
pub use category::Category;
pub use exam::{Exam, ExamFile};
pub use loaders::{read_json_file, CatalogSource};
pub use purchase::{CourseValidity, Purchase, PurchaseType};

/// 可按 ID 去重的记录
pub trait Identified {
    fn id(&self) -> &str;

    /// 是否可以出现在列表中（ID 和名称等必填项不为空）
    fn is_listable(&self) -> bool;
}
