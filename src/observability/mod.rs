//! 可观测性：tracing 输出写入错误日志文件（启动时清空），不干扰交互终端

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// 默认只记录 error，可通过 RUST_LOG 覆盖
pub fn init(error_log: &Path) -> std::io::Result<()> {
    let file = File::create(error_log)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
    Ok(())
}
