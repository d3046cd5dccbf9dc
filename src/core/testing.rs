//! 控制器测试支架：模拟连接器 + 内存控制台，手动驱动事件循环

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::adapter::{SimConnector, SimWorld};
use crate::config::{BotConfig, DEFAULT_PORT};
use crate::console::{Console, SharedBuffer};
use crate::core::controller::Controller;
use crate::core::event::{ControllerEvent, Flow, OperatorInput};

pub(crate) fn test_config(init_command: Option<&str>) -> BotConfig {
    BotConfig {
        server_address: "localhost".to_string(),
        server_port: DEFAULT_PORT,
        server_version: "1.20.1".to_string(),
        username: "Bot1".to_string(),
        init_command: init_command.map(str::to_string),
    }
}

pub(crate) struct Harness {
    pub controller: Controller,
    pub rx: mpsc::UnboundedReceiver<ControllerEvent>,
    pub connector: Arc<SimConnector>,
    pub out: SharedBuffer,
}

impl Harness {
    pub fn new() -> Self {
        Self::build(None, SimConnector::new())
    }

    pub fn with_init_command(command: &str) -> Self {
        Self::build(Some(command), SimConnector::new())
    }

    pub fn with_connector(connector: SimConnector) -> Self {
        Self::build(None, connector)
    }

    fn build(init_command: Option<&str>, connector: SimConnector) -> Self {
        let out = SharedBuffer::new();
        let console = Console::new(Box::new(out.clone()));
        let connector = Arc::new(connector);
        let (controller, rx) = Controller::new(test_config(init_command), connector.clone(), console);
        Self {
            controller,
            rx,
            connector,
            out,
        }
    }

    pub async fn start(&mut self) {
        self.controller.start().await;
        self.pump().await;
    }

    /// 让已就绪的任务运行，并处理通道中的全部事件，直到连续几轮没有新事件
    pub async fn pump(&mut self) -> Flow {
        let mut idle_rounds = 0;
        while idle_rounds < 3 {
            for _ in 0..4 {
                tokio::task::yield_now().await;
            }
            let mut handled = false;
            while let Ok(event) = self.rx.try_recv() {
                handled = true;
                if self.controller.handle(event).await == Flow::Exit {
                    return Flow::Exit;
                }
            }
            idle_rounds = if handled { 0 } else { idle_rounds + 1 };
        }
        Flow::Continue
    }

    /// 模拟操作员提交一行
    pub async fn line(&mut self, text: &str) -> Flow {
        let event = ControllerEvent::Operator(OperatorInput::Line(text.to_string()));
        if self.controller.handle(event).await == Flow::Exit {
            return Flow::Exit;
        }
        self.pump().await
    }

    pub async fn advance(&mut self, duration: Duration) {
        tokio::time::advance(duration).await;
        self.pump().await;
    }

    /// 按 1 秒步长推进时间，每步处理产生的事件
    pub async fn advance_secs(&mut self, secs: u64) {
        for _ in 0..secs {
            self.advance(Duration::from_secs(1)).await;
        }
    }

    pub fn world(&self) -> Arc<SimWorld> {
        self.connector
            .last_world()
            .expect("harness has not connected yet")
    }

    pub fn output(&self) -> String {
        self.out.contents()
    }
}
