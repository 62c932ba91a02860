pub mod admin_panel;
pub mod catalog;
pub mod category_service;
pub mod exam_service;
pub mod merge;
pub mod purchase_service;

pub use admin_panel::{AdminPanel, CategoryDraft, ExamDraft, PurchaseDraft};
pub use catalog::{Catalog, CategorySummary};
pub use purchase_service::{has_access, PurchaseStatus};
