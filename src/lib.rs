//! # Exam Catalog
//!
//! 考试备考目录：列出分类和考试，检查购买记录的访问权限，初始化管理员账号
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 本地缓存（浏览器 localStorage 的文件版本）
//! - `clients/` - 远程静态资源客户端
//!
//! ### ② 数据层（Models）
//! - `models/` - 分类、考试、购买记录、管理员
//! - `models/loaders` - 打包 JSON 数据的来源（本地目录 / HTTP）
//!
//! ### ③ 业务能力层（Services）
//! - `Catalog` - 合并打包数据与本地记录并按 ID 去重
//! - `purchase_service` - 有效期计算和访问检查
//! - `AdminPanel` - 向本地缓存写入分类、考试、购买记录
//!
//! ### ④ 初始化脚本（Seeding）
//! - `seeding/` - 向文档数据库写入管理员账号
//!
//! ## 模块结构

pub mod app;
pub mod cli;
pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod seeding;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use app::App;
pub use config::Config;
pub use error::{AppError, Result};
pub use infrastructure::LocalStore;
pub use models::{Admin, CatalogSource, Category, Exam, Purchase, PurchaseType};
pub use services::Catalog;
