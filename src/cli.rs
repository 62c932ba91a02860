use crate::models::de::parse_timestamp;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// `exam-catalog` 命令行
#[derive(Debug, Parser)]
#[command(name = "exam-catalog", version, about = "考试分类与考试目录")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// TOML 配置文件路径
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// 以 JSON 输出
    #[arg(long, global = true)]
    pub json: bool,

    /// 详细日志
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// 列出所有分类及考试数量
    Categories,
    /// 列出某个分类下的考试
    Exams { category_id: String },
    /// 检查对分类或考试的访问权限
    Access {
        category_id: String,
        #[arg(long)]
        exam: Option<String>,
    },
    /// 列出缓存的购买记录
    Purchases {
        /// 删除已过期的记录
        #[arg(long)]
        purge: bool,
    },
    /// 管理面板操作（写入本地缓存）
    #[command(subcommand)]
    Admin(AdminCommand),
    /// 在数据库中创建管理员账号
    SeedAdmin {
        #[arg(long)]
        username: String,
        #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        /// 使用内存存储，不连接数据库
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum AdminCommand {
    /// 新增分类
    AddCategory {
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// 新增考试
    AddExam {
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        category: String,
    },
    /// 删除本地分类（连同其本地考试）
    RemoveCategory { id: String },
    /// 删除本地考试
    RemoveExam { id: String },
    /// 记录一次购买
    AddPurchase {
        /// category / test / course
        #[arg(long = "type")]
        purchase_type: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        exam: Option<String>,
        /// 如 "6 months"、"1 year"，省略表示终身
        #[arg(long)]
        validity: Option<String>,
        /// 购买时间，默认当前时间
        #[arg(long, value_parser = parse_purchased_at)]
        purchased_at: Option<DateTime<Utc>>,
    },
}

fn parse_purchased_at(value: &str) -> Result<DateTime<Utc>, String> {
    parse_timestamp(value).ok_or_else(|| format!("无法解析日期: {}", value))
}
