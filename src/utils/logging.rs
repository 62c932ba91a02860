/// 日志工具模块
///
/// 初始化 tracing 订阅器，并提供启动和汇总信息的输出函数
use crate::config::Config;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化日志
///
/// `RUST_LOG` 优先；未设置时按 `verbose` 选择 debug 或 info
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("exam_catalog={},warn", default_level)));

    // 测试中可能重复初始化，忽略错误
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 题库目录启动 - {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
    info!("📁 数据源: {}", config.data_source);
    info!("💾 本地缓存: {}", config.local_store_path);
    info!("{}", "=".repeat(60));
}

/// 记录目录加载结果
pub fn log_catalog_loaded(categories: usize, exams: usize) {
    info!("✓ 目录已加载: {} 个分类, {} 场考试", categories, exams);
}

/// 截断长文本用于显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
