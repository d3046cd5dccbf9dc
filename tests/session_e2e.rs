//! 会话端到端测试：模拟连接器 + 内存控制台，只通过公开 API 驱动控制器

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use craftbot::adapter::{MessagePosition, SimConnector, Vec3, WindowInfo, WorldEvent};
use craftbot::config::{BotConfig, Timings};
use craftbot::console::{Console, SharedBuffer};
use craftbot::core::{ControllerEvent, Flow, OperatorInput, SessionState};
use craftbot::Controller;

struct Session {
    controller: Controller,
    rx: mpsc::UnboundedReceiver<ControllerEvent>,
    connector: Arc<SimConnector>,
    out: SharedBuffer,
}

fn config(init_command: Option<&str>) -> BotConfig {
    BotConfig::from_str_source(&format!(
        "server_address = localhost\nserver_version = 1.20.1\nusername = Bot1\n{}",
        init_command
            .map(|c| format!("init_command = {c}\n"))
            .unwrap_or_default()
    ))
    .expect("valid config")
}

impl Session {
    async fn start(init_command: Option<&str>) -> Self {
        Self::start_with(init_command, Timings::default()).await
    }

    async fn start_with(init_command: Option<&str>, timings: Timings) -> Self {
        let out = SharedBuffer::new();
        let console = Console::new(Box::new(out.clone()));
        let connector = Arc::new(SimConnector::new());
        let (controller, rx) = Controller::new(config(init_command), connector.clone(), console);
        let controller = controller.with_timings(timings);
        let mut session = Self {
            controller,
            rx,
            connector,
            out,
        };
        session.controller.start().await;
        session.pump().await;
        session
    }

    async fn pump(&mut self) -> Flow {
        let mut idle = 0;
        while idle < 3 {
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
            idle = if handled { 0 } else { idle + 1 };
        }
        Flow::Continue
    }

    async fn line(&mut self, text: &str) -> Flow {
        let flow = self
            .controller
            .handle(ControllerEvent::Operator(OperatorInput::Line(text.into())))
            .await;
        if flow == Flow::Exit {
            return flow;
        }
        self.pump().await
    }

    async fn advance_secs(&mut self, secs: u64) {
        for _ in 0..secs {
            tokio::time::advance(Duration::from_secs(1)).await;
            self.pump().await;
        }
    }

    fn output(&self) -> String {
        self.out.contents()
    }
}

#[tokio::test(start_paused = true)]
async fn test_init_command_sent_once_before_listening() {
    let mut s = Session::start(Some("/login pass123")).await;
    assert_eq!(s.controller.state(), SessionState::Connected);
    let world = s.connector.last_world().expect("connected");
    assert!(world.chat_log().is_empty());

    s.advance_secs(1).await;
    assert_eq!(world.chat_log(), vec!["/login pass123".to_string()]);
    assert!(!s.output().contains("开始监听服务器消息"));

    s.advance_secs(5).await;
    assert_eq!(world.chat_log().len(), 1);
    let out = s.output();
    let init_at = out.find("执行初始命令: /login pass123").expect("init line");
    let listen_at = out.find("开始监听服务器消息").expect("listen line");
    assert!(init_at < listen_at);
}

#[tokio::test(start_paused = true)]
async fn test_operator_session_round_trip() {
    let mut s = Session::start(None).await;
    let world = s.connector.last_world().expect("connected");
    world.set_position(Vec3::new(1.5, 64.0, -2.25));

    s.line(".where").await;
    assert!(s.output().contains("机器人位置: X=1.50, Y=64.00, Z=-2.25"));

    s.line("hello there").await;
    assert_eq!(world.chat_log(), vec!["hello there".to_string()]);

    s.advance_secs(3).await;
    world.emit(WorldEvent::Chat {
        text: "<Alex> hi Bot1".into(),
        position: MessagePosition::Chat,
    });
    s.pump().await;
    assert!(s.output().contains("<Alex> hi Bot1"));

    assert_eq!(s.line(".exit").await, Flow::Exit);
    assert!(world.is_closed());
}

#[tokio::test(start_paused = true)]
async fn test_kick_then_reconnect() {
    let mut s = Session::start(None).await;
    let first = s.connector.last_world().expect("connected");

    first.emit(WorldEvent::Kicked {
        reason: "§cServer restart".into(),
    });
    s.pump().await;
    assert_eq!(s.controller.state(), SessionState::Disconnected);
    assert!(s.output().contains("将在5秒后尝试重连..."));

    s.line(".where").await;
    assert!(s.output().contains("Bot未连接"));

    s.advance_secs(5).await;
    assert_eq!(s.connector.attempts().len(), 2);
    assert_eq!(s.controller.state(), SessionState::Connected);
    let second = s.connector.last_world().expect("reconnected");
    assert!(!Arc::ptr_eq(&first, &second));
}

#[tokio::test(start_paused = true)]
async fn test_custom_reconnect_interval() {
    let timings = Timings {
        reconnect_interval: Duration::from_secs(2),
        ..Timings::default()
    };
    let mut s = Session::start_with(None, timings).await;
    let world = s.connector.last_world().expect("connected");

    world.emit(WorldEvent::Ended { reason: None });
    s.pump().await;
    assert!(s.output().contains("与服务器断开连接: 未知原因"));
    assert!(s.output().contains("将在2秒后尝试重连..."));

    s.advance_secs(2).await;
    assert_eq!(s.connector.attempts().len(), 2);
    assert_eq!(s.controller.state(), SessionState::Connected);
}

#[tokio::test(start_paused = true)]
async fn test_container_and_missing_position() {
    let mut s = Session::start(None).await;
    let world = s.connector.last_world().expect("connected");

    world.open_container(WindowInfo {
        kind: "minecraft:chest".into(),
        title: Some("Chest".into()),
        slots: Vec::new(),
    });
    s.pump().await;
    assert!(s.output().contains("打开容器: minecraft:chest - Chest"));

    world.close_container();
    s.pump().await;
    assert!(s.output().contains("关闭容器: minecraft:chest"));

    world.despawn();
    s.line(".where").await;
    assert!(s.output().contains("错误: 无法获取机器人位置"));
}
