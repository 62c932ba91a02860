use crate::cli::{AdminCommand, Command};
use crate::config::Config;
use crate::error::{AppError, ConfigError, Result, ValidationError};
use crate::infrastructure::LocalStore;
use crate::models::{CatalogSource, Exam, Purchase, PurchaseType};
use crate::seeding::{
    self, AdminRepository, InMemoryAdminRepository, MongoAdminRepository, SeedOutcome,
};
use crate::services::purchase_service::{self, PurchaseStatus};
use crate::services::{AdminPanel, Catalog, CategoryDraft, ExamDraft, PurchaseDraft};
use crate::utils::logging::{self, truncate_text};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use std::fmt::Write as _;
use tracing::{info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    source: CatalogSource,
    store: LocalStore,
    json_output: bool,
}

impl App {
    /// 初始化应用：选择数据源并打开本地缓存
    pub async fn initialize(config: Config, json_output: bool) -> Result<Self> {
        logging::log_startup(&config);

        let source = CatalogSource::from_config(&config)?;
        if let Err(e) = source.ensure_available() {
            warn!("⚠️ {}，将只使用本地缓存中的记录", e);
        }
        let store = LocalStore::open(&config.local_store_path).await?;
        if store.is_corrupt() {
            warn!("⚠️ 本地缓存文件已损坏，管理命令和清理将拒绝写入");
        }

        Ok(Self {
            config,
            source,
            store,
            json_output,
        })
    }

    /// 执行一个命令，返回要打印到标准输出的内容
    pub async fn run(&mut self, command: Command) -> Result<String> {
        match command {
            Command::Categories => {
                let catalog = self.load_catalog().await?;
                self.render(&catalog.summaries(), || render_categories(&catalog))
            }
            Command::Exams { category_id } => {
                let catalog = self.load_catalog().await?;
                let category = catalog
                    .category(&category_id)
                    .ok_or_else(|| ValidationError::UnknownCategory {
                        id: category_id.clone(),
                    })?;
                let exams = catalog.exams_in(&category.id);
                self.render(&exams, || render_exams(&category.name, &exams))
            }
            Command::Access { category_id, exam } => {
                self.check_access(&category_id, exam.as_deref()).await
            }
            Command::Purchases { purge } => self.list_purchases(purge).await,
            Command::Admin(admin) => self.run_admin(admin).await,
            Command::SeedAdmin {
                username,
                password,
                dry_run,
            } => self.seed_admin(&username, password, dry_run).await,
        }
    }

    async fn load_catalog(&self) -> Result<Catalog> {
        let catalog = Catalog::load(&self.source, &self.store).await?;
        logging::log_catalog_loaded(catalog.categories.len(), catalog.exams.len());

        let orphans = catalog.orphaned_exams();
        if !orphans.is_empty() {
            warn!("⚠️ {} 场考试的分类不存在，列表中不会显示", orphans.len());
        }
        Ok(catalog)
    }

    async fn check_access(&self, category_id: &str, exam_id: Option<&str>) -> Result<String> {
        let catalog = self.load_catalog().await?;
        let category = catalog
            .category(category_id)
            .ok_or_else(|| ValidationError::UnknownCategory {
                id: category_id.to_string(),
            })?;
        // 考试必须属于所查询的分类
        if let Some(exam_id) = exam_id {
            match catalog.exam(exam_id) {
                Some(exam) if exam.category_id == category.id => {}
                _ => {
                    return Err(ValidationError::UnknownExam {
                        id: exam_id.to_string(),
                    }
                    .into())
                }
            }
        }

        let now = Utc::now();
        let purchases = purchase_service::cached_purchases(&self.store);
        let report = AccessReport::build(&purchases, category_id, exam_id, now);
        self.render(&report, || report.to_string())
    }

    async fn list_purchases(&mut self, purge: bool) -> Result<String> {
        let now = Utc::now();
        if purge {
            purchase_service::purge_expired(&mut self.store, now).await?;
        }

        let purchases = purchase_service::cached_purchases(&self.store);
        let rows: Vec<PurchaseRow> = purchases
            .iter()
            .map(|p| PurchaseRow::new(p, now))
            .collect();
        self.render(&rows, || render_purchases(&rows))
    }

    async fn run_admin(&mut self, command: AdminCommand) -> Result<String> {
        let catalog = self.load_catalog().await?;
        let mut panel = AdminPanel::new(&mut self.store);

        let value = match command {
            AdminCommand::AddCategory {
                id,
                name,
                description,
            } => {
                let category = panel
                    .add_category(
                        &catalog,
                        CategoryDraft {
                            id,
                            name,
                            description,
                        },
                    )
                    .await?;
                json!(category)
            }
            AdminCommand::AddExam {
                id,
                name,
                description,
                category,
            } => {
                let exam = panel
                    .add_exam(
                        &catalog,
                        ExamDraft {
                            id,
                            name,
                            description,
                            category_id: category,
                        },
                    )
                    .await?;
                json!(exam)
            }
            AdminCommand::RemoveCategory { id } => {
                let removed_exams = panel.remove_category(&id).await?;
                json!({ "removedCategory": id, "removedExams": removed_exams })
            }
            AdminCommand::RemoveExam { id } => {
                let exam = panel.remove_exam(&id).await?;
                json!({ "removedExam": exam })
            }
            AdminCommand::AddPurchase {
                purchase_type,
                category,
                exam,
                validity,
                purchased_at,
            } => {
                let purchase = panel
                    .record_purchase(
                        &catalog,
                        PurchaseDraft {
                            purchase_type: PurchaseType::from(purchase_type),
                            category_id: category,
                            exam_id: exam,
                            course_validity: validity,
                            purchased_at,
                        },
                    )
                    .await?;
                json!(purchase)
            }
        };

        Ok(if self.json_output {
            value.to_string()
        } else {
            format!("已写入 {}", self.store.path().display())
        })
    }

    async fn seed_admin(
        &self,
        username: &str,
        password: Option<String>,
        dry_run: bool,
    ) -> Result<String> {
        let password = password.ok_or(ConfigError::Missing {
            name: "ADMIN_PASSWORD",
        })?;

        let repo: Box<dyn AdminRepository> = if dry_run {
            info!("🧪 dry-run: 使用内存存储");
            Box::new(InMemoryAdminRepository::new())
        } else {
            Box::new(MongoAdminRepository::connect(&self.config).await?)
        };

        let outcome = seeding::seed_admin(repo.as_ref(), username, &password).await?;
        let (status, username) = match &outcome {
            SeedOutcome::Created(u) => ("created", u),
            SeedOutcome::AlreadyExists(u) => ("exists", u),
        };

        Ok(if self.json_output {
            json!({ "username": username, "status": status }).to_string()
        } else {
            match outcome {
                SeedOutcome::Created(u) => format!("管理员 {} 已创建", u),
                SeedOutcome::AlreadyExists(u) => format!("管理员 {} 已存在，未修改", u),
            }
        })
    }

    fn render<T: Serialize + ?Sized>(
        &self,
        value: &T,
        text: impl FnOnce() -> String,
    ) -> Result<String> {
        if self.json_output {
            serde_json::to_string_pretty(value).map_err(AppError::Output)
        } else {
            Ok(text())
        }
    }
}

/// 访问检查结果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessReport {
    pub category_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exam_id: Option<String>,
    pub granted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub via: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_remaining: Option<i64>,
}

impl AccessReport {
    pub fn build(
        purchases: &[Purchase],
        category_id: &str,
        exam_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> Self {
        let found = purchase_service::find_access(purchases, category_id, exam_id, now);
        Self {
            category_id: category_id.trim().to_string(),
            exam_id: exam_id.map(|e| e.trim().to_string()),
            granted: found.is_some(),
            via: found.map(|p| p.purchase_type.to_string()),
            expires_at: found.and_then(purchase_service::expiry_of),
            days_remaining: found.and_then(|p| purchase_service::days_remaining(p, now)),
        }
    }
}

impl std::fmt::Display for AccessReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let target = match &self.exam_id {
            Some(exam_id) => format!("分类 {} / 考试 {}", self.category_id, exam_id),
            None => format!("分类 {}", self.category_id),
        };
        if !self.granted {
            return write!(f, "❌ 无权访问 {}", target);
        }

        write!(
            f,
            "✅ 可以访问 {} (通过 {} 购买",
            target,
            self.via.as_deref().unwrap_or("未知")
        )?;
        match (self.expires_at, self.days_remaining) {
            (Some(expires_at), Some(days)) => write!(
                f,
                ", {} 到期, 剩余 {} 天)",
                expires_at.format("%Y-%m-%d"),
                days
            ),
            _ => write!(f, ", 终身有效)"),
        }
    }
}

/// 购买记录列表中的一行
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRow {
    #[serde(flatten)]
    pub purchase: Purchase,
    #[serde(flatten)]
    pub status: PurchaseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_remaining: Option<i64>,
}

impl PurchaseRow {
    fn new(purchase: &Purchase, now: DateTime<Utc>) -> Self {
        Self {
            purchase: purchase.clone(),
            status: purchase_service::status_of(purchase, now),
            days_remaining: purchase_service::days_remaining(purchase, now),
        }
    }
}

// ========== 文本输出 ==========

fn render_categories(catalog: &Catalog) -> String {
    let summaries = catalog.summaries();
    if summaries.is_empty() {
        return "暂无分类".to_string();
    }

    let mut out = String::new();
    for summary in summaries {
        let _ = writeln!(
            out,
            "{:<16} {:<24} {:>3} 场考试  {}",
            summary.category.id,
            summary.category.name,
            summary.exam_count,
            truncate_text(&summary.category.description, 40)
        );
    }
    out.trim_end().to_string()
}

fn render_exams(category_name: &str, exams: &[&Exam]) -> String {
    if exams.is_empty() {
        return format!("{} 下暂无考试", category_name);
    }

    let mut out = format!("{} ({} 场考试)\n", category_name, exams.len());
    for exam in exams {
        let _ = writeln!(
            out,
            "  {:<16} {:<28} {}",
            exam.id,
            exam.name,
            truncate_text(&exam.description, 40)
        );
    }
    out.trim_end().to_string()
}

fn render_purchases(rows: &[PurchaseRow]) -> String {
    if rows.is_empty() {
        return "暂无购买记录".to_string();
    }

    let mut out = String::new();
    for row in rows {
        let p = &row.purchase;
        let status = match row.status {
            PurchaseStatus::Active { expires_at: None } => "有效 (终身)".to_string(),
            PurchaseStatus::Active {
                expires_at: Some(at),
            } => format!(
                "有效至 {} (剩余 {} 天)",
                at.format("%Y-%m-%d"),
                row.days_remaining.unwrap_or(0)
            ),
            PurchaseStatus::Expired { expired_at } => {
                format!("已于 {} 过期", expired_at.format("%Y-%m-%d"))
            }
            PurchaseStatus::Invalid => "有效期无法解析".to_string(),
        };
        let _ = writeln!(
            out,
            "{:<16} {:<9} 分类 {:<12} 购买于 {}  {}",
            p.key().unwrap_or("-"),
            p.purchase_type.as_str(),
            p.category_id.as_deref().unwrap_or("-"),
            p.purchased_at.format("%Y-%m-%d"),
            status
        );
    }
    out.trim_end().to_string()
}
