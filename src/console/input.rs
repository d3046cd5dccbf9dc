//! 键盘读取：阻塞线程中轮询 crossterm 事件，把提交的行与控制键投递给控制器

use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{Console, KeyOutcome};
use crate::core::event::{ControllerEvent, OperatorInput};
use crate::core::state::KnownPlayers;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// 启动读取线程；cancel 触发或控制器通道关闭后退出
pub fn spawn_reader(
    console: Console,
    known: KnownPlayers,
    tx: mpsc::UnboundedSender<ControllerEvent>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::task::spawn_blocking(move || {
        while !cancel.is_cancelled() {
            let key = match event::poll(POLL_INTERVAL) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => key,
                    Ok(_) => continue,
                    Err(e) => {
                        tracing::error!(error = %e, "failed to read terminal event");
                        let _ = tx.send(ControllerEvent::Operator(OperatorInput::EndOfInput));
                        break;
                    }
                },
                Ok(false) => continue,
                Err(e) => {
                    tracing::error!(error = %e, "failed to poll terminal");
                    let _ = tx.send(ControllerEvent::Operator(OperatorInput::EndOfInput));
                    break;
                }
            };

            let input = match console.handle_key(key, &known) {
                KeyOutcome::Edited => continue,
                KeyOutcome::Submit(line) => OperatorInput::Line(line),
                KeyOutcome::Interrupt => OperatorInput::Interrupt,
                KeyOutcome::EndOfInput => OperatorInput::EndOfInput,
            };
            if tx.send(ControllerEvent::Operator(input)).is_err() {
                break;
            }
        }
        tracing::debug!("input reader stopped");
    })
}
