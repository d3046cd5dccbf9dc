//! 关闭信号
//!
//! SIGINT / SIGTERM 转为 Interrupt 事件交给控制器处理（与 Ctrl+C 按键同一路径）；
//! 控制器退出后取消 token，让输入线程等后台任务结束。

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::core::event::{ControllerEvent, OperatorInput};

#[derive(Clone, Default)]
pub struct ShutdownManager {
    token: CancellationToken,
}

impl ShutdownManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn shutdown(&self) {
        self.token.cancel();
    }

    /// 安装系统信号处理器 (Ctrl+C, SIGTERM)
    pub fn install_signal_handlers(&self, tx: mpsc::UnboundedSender<ControllerEvent>) {
        let token = self.token.clone();
        let interrupt = tx.clone();
        tokio::spawn(async move {
            tokio::select! {
                result = tokio::signal::ctrl_c() => {
                    if result.is_ok() {
                        tracing::info!("Received SIGINT");
                        let _ = interrupt.send(ControllerEvent::Operator(OperatorInput::Interrupt));
                    }
                }
                _ = token.cancelled() => {}
            }
        });

        #[cfg(unix)]
        {
            let token = self.token.clone();
            tokio::spawn(async move {
                use tokio::signal::unix::{signal, SignalKind};
                let Ok(mut sigterm) = signal(SignalKind::terminate()) else {
                    return;
                };
                tokio::select! {
                    _ = sigterm.recv() => {
                        tracing::info!("Received SIGTERM");
                        let _ = tx.send(ControllerEvent::Operator(OperatorInput::Interrupt));
                    }
                    _ = token.cancelled() => {}
                }
            });
        }
    }
}
