//! craftbot - 交互式游戏世界会话控制台
//!
//! 入口：解析参数、初始化错误日志、加载配置，进入原始模式后运行会话控制器直到退出。

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use crossterm::style::Stylize;

use craftbot::adapter::SimConnector;
use craftbot::config::load_config;
use craftbot::console::{spawn_reader, Console, TerminalGuard};
use craftbot::core::{Controller, ShutdownManager};
use craftbot::observability;

/// 游戏世界会话控制台
#[derive(Parser, Debug)]
#[command(name = "craftbot", about = "交互式游戏世界会话控制台")]
struct Cli {
    /// 配置文件路径
    #[arg(long, default_value = "config.txt")]
    config: PathBuf,

    /// 错误日志路径（启动时清空）
    #[arg(long, default_value = "error.log")]
    error_log: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    observability::init(&cli.error_log)
        .with_context(|| format!("Failed to open error log {}", cli.error_log.display()))?;

    println!("{}", "=== craftbot 交互式控制台 ===".blue().bold());
    println!();

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "config load failed");
            eprintln!("{}", e.to_string().red());
            eprintln!("{}", "无法读取配置文件，程序退出".red());
            std::process::exit(1);
        }
    };

    println!("{}", "已加载配置:".green());
    for line in config.summary() {
        println!("  {line}");
    }
    println!();

    // 尚未链接协议适配器：使用模拟世界
    tracing::warn!("No protocol adapter linked, using simulated world");
    let connector = Arc::new(SimConnector::demo());

    let guard = TerminalGuard::enable().context("Failed to enable raw mode")?;
    let console = Console::stdout();
    let (controller, rx) = Controller::new(config, connector, console.clone());

    let shutdown = ShutdownManager::new();
    shutdown.install_signal_handlers(controller.sender());
    let reader = spawn_reader(
        console,
        controller.known_players(),
        controller.sender(),
        shutdown.token(),
    );

    controller.run(rx).await;

    shutdown.shutdown();
    let _ = reader.await;
    drop(guard);
    println!();
    Ok(())
}
