use anyhow::{Context, Result};
use clap::Parser;
use exam_catalog::cli::Cli;
use exam_catalog::utils::logging;
use exam_catalog::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("无法加载配置文件: {}", path.display()))?,
        None => Config::from_env().context("无法从环境变量加载配置")?,
    };

    // 初始化日志
    logging::init(cli.verbose || config.verbose_logging);

    // 初始化并运行应用
    let mut app = App::initialize(config, cli.json).await?;
    let output = app.run(cli.command).await?;
    if !output.is_empty() {
        println!("{}", output);
    }

    Ok(())
}
