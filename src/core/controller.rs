//! 会话控制器：顶层状态机
//!
//! 持有适配器会话、连接状态、已知玩家、后台任务与当前寻路目标的归属。
//! 所有事件（操作员输入、世界事件、定时 tick、延迟动作）都从同一个通道到达，
//! run 循环逐个处理到底；其他任务只负责投递事件，不修改控制器状态。

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::adapter::{
    AdapterError, GameSession, Goal, MessagePosition, SessionConnector, SessionLink, WorldEvent,
};
use crate::config::{BotConfig, Timings};
use crate::console::{classify, strip_format_codes, Category, Console, Line};
use crate::core::approach::{ApproachAndAct, BlockAction};
use crate::core::error::{CommandError, ErrorKind};
use crate::core::event::{ApproachStep, ControllerEvent, DelayedAction, Flow, OperatorInput};
use crate::core::progress::MovementProgress;
use crate::core::state::{KnownPlayers, SessionState};
use crate::core::task_manager::{BackgroundTask, TaskKind, TaskManager};

/// 当前寻路目标由谁下达
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GoalOwner {
    /// .go
    Movement,
    /// .hunt
    Follow,
    /// .open
    Approach,
}

pub struct Controller {
    pub(crate) config: BotConfig,
    pub(crate) timings: Timings,
    connector: Arc<dyn SessionConnector>,
    pub(crate) console: Console,
    tx: mpsc::UnboundedSender<ControllerEvent>,
    pub(crate) state: SessionState,
    pub(crate) session: Option<Arc<dyn GameSession>>,
    /// 每建立/拆除一次会话加一；过期会话的事件与延迟动作被丢弃
    epoch: u64,
    forwarder: Option<JoinHandle<()>>,
    pub(crate) online_since: Option<Instant>,
    pub(crate) listening: bool,
    pub(crate) known_players: KnownPlayers,
    pub(crate) tasks: TaskManager,
    pub(crate) approach: Option<ApproachAndAct>,
    pub(crate) goal_owner: Option<GoalOwner>,
    next_sequence: u64,
}

impl Controller {
    pub fn new(
        config: BotConfig,
        connector: Arc<dyn SessionConnector>,
        console: Console,
    ) -> (Self, mpsc::UnboundedReceiver<ControllerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let controller = Self {
            config,
            timings: Timings::default(),
            connector,
            console,
            tasks: TaskManager::new(tx.clone()),
            tx,
            state: SessionState::Disconnected,
            session: None,
            epoch: 0,
            forwarder: None,
            online_since: None,
            listening: false,
            known_players: KnownPlayers::new(),
            approach: None,
            goal_owner: None,
            next_sequence: 0,
        };
        (controller, rx)
    }

    pub fn with_timings(mut self, timings: Timings) -> Self {
        self.timings = timings;
        self
    }

    /// 事件发送端（输入线程、信号处理器使用）
    pub fn sender(&self) -> mpsc::UnboundedSender<ControllerEvent> {
        self.tx.clone()
    }

    pub fn known_players(&self) -> KnownPlayers {
        self.known_players.clone()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// 首次连接；失败则交给重连调度
    pub async fn start(&mut self) {
        if let Err(e) = self.connect().await {
            self.console.error(format!("连接服务器失败: {e}"));
            tracing::error!(error = %e, "initial connect failed");
            self.schedule_reconnect();
        }
    }

    /// 主循环：处理事件直到退出
    pub async fn run(mut self, mut rx: mpsc::UnboundedReceiver<ControllerEvent>) {
        self.start().await;
        self.console.show_prompt();
        while let Some(event) = rx.recv().await {
            if self.handle(event).await == Flow::Exit {
                break;
            }
        }
        tracing::info!("controller stopped");
    }

    pub async fn handle(&mut self, event: ControllerEvent) -> Flow {
        match event {
            ControllerEvent::Operator(OperatorInput::Line(line)) => self.handle_line(&line).await,
            ControllerEvent::Operator(OperatorInput::Interrupt) => {
                self.console.warning("正在退出...");
                self.shutdown().await
            }
            ControllerEvent::Operator(OperatorInput::EndOfInput) => {
                self.console.warning("正在退出程序...");
                self.shutdown().await
            }
            ControllerEvent::World { epoch, event } => {
                if epoch == self.epoch {
                    self.on_world_event(event).await;
                } else {
                    tracing::debug!(epoch, current = self.epoch, ?event, "stale world event ignored");
                }
                Flow::Continue
            }
            ControllerEvent::Tick { kind, generation } => {
                if let Some(task) = self.tasks.accept(kind, generation).cloned() {
                    self.on_tick(task).await;
                } else {
                    tracing::debug!(?kind, generation, "stale tick ignored");
                }
                Flow::Continue
            }
            ControllerEvent::Delayed { epoch, action } => {
                if epoch == self.epoch {
                    self.on_delayed(action).await;
                }
                Flow::Continue
            }
            ControllerEvent::Approach { sequence, step } => {
                if self.approach.as_ref().map(|a| a.sequence) == Some(sequence) {
                    self.on_approach_step(step).await;
                } else {
                    tracing::debug!(sequence, "stale approach step ignored");
                }
                Flow::Continue
            }
        }
    }

    // ---- 会话生命周期 ----

    async fn connect(&mut self) -> Result<(), AdapterError> {
        self.state = SessionState::Connecting;
        self.console.warning("正在连接到服务器...");
        match self.connector.connect(&self.config.credentials()).await {
            Ok(link) => {
                self.attach(link);
                Ok(())
            }
            Err(e) => {
                self.state = SessionState::Disconnected;
                Err(e)
            }
        }
    }

    /// 接管新会话：转发其事件流（带新的 epoch）
    fn attach(&mut self, link: SessionLink) {
        if let Some(forwarder) = self.forwarder.take() {
            forwarder.abort();
        }
        self.epoch += 1;
        let epoch = self.epoch;
        let tx = self.tx.clone();
        let mut events = link.events;
        self.forwarder = Some(tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                if tx.send(ControllerEvent::World { epoch, event }).is_err() {
                    break;
                }
            }
        }));
        self.session = Some(link.session);
        tracing::info!(epoch, "session attached");
    }

    /// 拆除当前会话；之后到达的旧事件因 epoch 不符被丢弃
    fn drop_session(&mut self) -> Option<Arc<dyn GameSession>> {
        if let Some(forwarder) = self.forwarder.take() {
            forwarder.abort();
        }
        self.epoch += 1;
        self.state = SessionState::Disconnected;
        self.listening = false;
        self.online_since = None;
        self.session.take()
    }

    fn schedule_reconnect(&mut self) {
        self.console.warning(format!(
            "将在{}秒后尝试重连...",
            self.timings.reconnect_interval.as_secs()
        ));
        self.tasks
            .start(BackgroundTask::ReconnectScheduler, self.timings.reconnect_interval);
    }

    fn schedule(&self, delay: Duration, event: ControllerEvent) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(event);
        });
    }

    /// 停止全部后台活动并断开；返回 Exit
    pub(crate) async fn shutdown(&mut self) -> Flow {
        let stopped = self.tasks.stop_all();
        self.approach = None;
        self.goal_owner = None;
        if let Some(session) = self.drop_session() {
            let _ = session.set_goal(None);
            session.quit().await;
        }
        tracing::info!(stopped, "shutdown complete");
        Flow::Exit
    }

    // ---- 世界事件 ----

    async fn on_world_event(&mut self, event: WorldEvent) {
        match event {
            WorldEvent::Ready => self.on_ready(),
            WorldEvent::Ended { reason } => {
                let reason = reason.unwrap_or_else(|| "未知原因".to_string());
                self.on_disconnected(format!("与服务器断开连接: {reason}")).await;
            }
            WorldEvent::Kicked { reason } => {
                let reason = strip_format_codes(&reason);
                self.on_disconnected(format!("被服务器踢出: {reason}")).await;
            }
            WorldEvent::Error(message) => {
                tracing::error!(error = %message, "session error");
                self.console.error(format!("Bot错误: {message}"));
            }
            WorldEvent::GoalReached => self.on_goal_reached(),
            WorldEvent::GoalFailed(reason) => self.on_goal_failed(&reason),
            WorldEvent::Health { health, .. } => {
                if health <= 0.0 {
                    self.console
                        .error("生命值归零，死因可能是战斗、掉落或其他伤害");
                } else if health < 5.0 {
                    self.console.warning(format!("警告：生命值过低 ({health}/20)"));
                }
            }
            WorldEvent::Died => {
                self.console.error("机器人死亡！正在尝试复活...");
                self.schedule(
                    self.timings.respawn_delay,
                    ControllerEvent::Delayed {
                        epoch: self.epoch,
                        action: DelayedAction::Respawn,
                    },
                );
            }
            WorldEvent::WindowOpened { kind, title } => {
                let title = title.unwrap_or_else(|| "无标题".to_string());
                self.console.notice(format!("打开容器: {kind} - {title}"));
            }
            WorldEvent::WindowClosed { kind } => match kind {
                Some(kind) => self.console.warning(format!("关闭容器: {kind}")),
                None => self.console.warning("关闭容器"),
            },
            WorldEvent::Chat { text, position } if self.listening => {
                self.on_chat(&text, position);
            }
            WorldEvent::PlayerJoined(name) if self.listening => {
                self.known_players.insert(&name);
                self.console.success(format!("玩家加入: {name}"));
            }
            WorldEvent::PlayerLeft(name) if self.listening => {
                self.console.error(format!("玩家离开: {name}"));
            }
            WorldEvent::PlayerUpdated(name) if self.listening => {
                self.known_players.insert(&name);
            }
            WorldEvent::Chat { .. }
            | WorldEvent::PlayerJoined(_)
            | WorldEvent::PlayerLeft(_)
            | WorldEvent::PlayerUpdated(_) => {
                tracing::trace!("world event before listening started");
            }
        }
    }

    fn on_ready(&mut self) {
        self.state = SessionState::Connected;
        self.online_since = Some(Instant::now());
        self.console.success("成功连接到服务器!");
        let epoch = self.epoch;
        self.schedule(
            self.timings.init_command_delay,
            ControllerEvent::Delayed {
                epoch,
                action: DelayedAction::InitCommand,
            },
        );
        self.schedule(
            self.timings.listen_delay,
            ControllerEvent::Delayed {
                epoch,
                action: DelayedAction::StartListening,
            },
        );
    }

    async fn on_disconnected(&mut self, message: String) {
        self.console.error(message);
        if let Some(session) = self.drop_session() {
            session.quit().await;
        }
        self.tasks.stop(TaskKind::MovementReporter);
        self.approach = None;
        self.goal_owner = None;
        self.schedule_reconnect();
    }

    fn on_chat(&mut self, text: &str, position: MessagePosition) {
        if position == MessagePosition::GameInfo {
            return;
        }
        let own_name = self
            .session
            .as_ref()
            .map(|s| s.username())
            .unwrap_or_default();
        let clean = strip_format_codes(text);
        let class = classify(&clean, &own_name);
        if let Some(name) = &class.joined {
            self.known_players.insert(name);
        }
        self.console.emit(Line::stamped(class.category, clean.clone()));
        if class.category == Category::Death {
            self.console.error(format!("死因: {clean}"));
        }
    }

    fn on_goal_reached(&mut self) {
        if let Some(approach) = self.approach.as_mut() {
            if approach.arrive() {
                self.goal_owner = None;
                let sequence = approach.sequence;
                self.schedule(
                    self.timings.settle_delay,
                    ControllerEvent::Approach {
                        sequence,
                        step: ApproachStep::Settled,
                    },
                );
                return;
            }
        }
        if self.tasks.stop(TaskKind::MovementReporter).is_some() {
            self.goal_owner = None;
            self.console.success("已到达目标位置!");
        }
    }

    fn on_goal_failed(&mut self, reason: &str) {
        tracing::warn!(reason, "goal failed");
        if let Some(mut approach) = self.approach.take() {
            approach.fail();
            self.goal_owner = None;
            self.console.error(format!("寻路失败: {reason}"));
            return;
        }
        if self.tasks.stop(TaskKind::MovementReporter).is_some() {
            self.goal_owner = None;
            self.console.error(format!("寻路失败: {reason}"));
        }
    }

    // ---- 延迟动作 ----

    async fn on_delayed(&mut self, action: DelayedAction) {
        let Some(session) = self.session.clone() else {
            return;
        };
        match action {
            DelayedAction::InitCommand => {
                let Some(command) = self.config.init_command.clone() else {
                    return;
                };
                self.console.info(format!("执行初始命令: {command}"));
                if let Err(e) = session.chat(&command).await {
                    self.report(&CommandError::adapter("发送初始命令失败", e));
                }
            }
            DelayedAction::StartListening => {
                self.listening = true;
                self.console.info("开始监听服务器消息...");
                self.console
                    .notice("提示: 输入.help查看内置命令，直接输入文本发送聊天消息");
            }
            DelayedAction::Respawn => match session.respawn().await {
                Ok(()) => self.console.warning("已发送复活命令"),
                Err(e) => {
                    tracing::error!(error = %e, "respawn failed");
                    self.console.error(format!("复活失败: {e}"));
                }
            },
        }
    }

    // ---- 周期任务 ----

    async fn on_tick(&mut self, task: BackgroundTask) {
        match task {
            BackgroundTask::ReconnectScheduler => {
                self.console.warning("正在尝试重连...");
                match self.connect().await {
                    Ok(()) => {
                        self.tasks.stop(TaskKind::ReconnectScheduler);
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "reconnect failed");
                        self.console.error(format!("重连失败: {e}"));
                    }
                }
            }
            BackgroundTask::MovementReporter {
                target,
                started,
                initial_distance,
            } => {
                let Some(position) = self.session.as_ref().and_then(|s| s.position()) else {
                    self.tasks.stop(TaskKind::MovementReporter);
                    return;
                };
                let progress = MovementProgress::sample(
                    initial_distance,
                    position.distance_to(target),
                    started.elapsed().as_secs_f64(),
                );
                self.console.info(progress.describe());
            }
            BackgroundTask::FollowLoop { target } => {
                let Some(session) = self.session.clone().filter(|s| s.position().is_some())
                else {
                    self.tasks.stop(TaskKind::FollowLoop);
                    return;
                };
                match session.player(&target).and_then(|p| p.position) {
                    Some(position) => {
                        let goal = Goal::Near {
                            target: position,
                            range: 2.0,
                        };
                        if let Err(e) = session.set_goal(Some(goal)) {
                            tracing::error!(error = %e, "follow goal rejected");
                            self.console.error("跟随玩家时出错");
                        }
                    }
                    None => {
                        self.console
                            .warning(format!("无法找到玩家 {target}，停止跟随"));
                        self.stop_movement();
                    }
                }
            }
        }
    }

    // ---- 方块操作序列 ----

    async fn on_approach_step(&mut self, step: ApproachStep) {
        let Some(mut approach) = self.approach.take() else {
            return;
        };
        match step {
            ApproachStep::Settled => {
                let (Some(session), Some(block)) = (self.session.clone(), approach.target().cloned())
                else {
                    return;
                };
                if let Err(e) = session.look_at(block.center()).await {
                    self.report(&CommandError::adapter("操作方块时出错", e));
                    return;
                }
                let Some(position) = session.position() else {
                    self.report(&CommandError::PositionUnavailable);
                    return;
                };
                if let Err(e) = approach.check_range(position.distance_to(block.position)) {
                    self.report(&e);
                    return;
                }
                self.console.success(format!(
                    "已到达方块附近，执行{}操作...",
                    approach.action.verb()
                ));

                let tx = self.tx.clone();
                let sequence = approach.sequence;
                let action = approach.action;
                tokio::spawn(async move {
                    let result = match action {
                        BlockAction::Dig => session.dig(&block).await,
                        BlockAction::Activate => session.activate_block(&block).await,
                    };
                    let _ = tx.send(ControllerEvent::Approach {
                        sequence,
                        step: ApproachStep::Finished(result.map_err(|e| e.to_string())),
                    });
                });
                self.approach = Some(approach);
            }
            ApproachStep::Finished(result) => {
                approach.finish(result.is_ok());
                match result {
                    Ok(()) => self.console.success(approach.action.done_message()),
                    Err(e) => {
                        tracing::error!(error = %e, "block action failed");
                        self.console.error(format!("操作方块时出错: {e}"));
                    }
                }
            }
        }
    }

    // ---- 寻路目标归属 ----

    /// 新目标的下达者接管寻路：停止其他下达者的活动并取消进行中的目标
    pub(crate) fn claim_goal(&mut self, owner: GoalOwner) {
        if owner != GoalOwner::Movement {
            self.tasks.stop(TaskKind::MovementReporter);
        }
        if owner != GoalOwner::Follow {
            self.tasks.stop(TaskKind::FollowLoop);
        }
        if owner != GoalOwner::Approach {
            if let Some(approach) = self.approach.take() {
                if approach.is_active() {
                    self.console
                        .warning(format!("已取消进行中的方块操作: {}", approach.query));
                }
            }
        }
        if self.goal_owner.take().is_some() {
            if let Some(session) = &self.session {
                if let Err(e) = session.set_goal(None) {
                    tracing::warn!(error = %e, "failed to cancel previous goal");
                }
            }
        }
        self.goal_owner = Some(owner);
    }

    /// 停止所有移动相关活动（.go stop / .hunt stop / 跟随目标丢失）
    pub(crate) fn stop_movement(&mut self) {
        if let Some(session) = &self.session {
            let _ = session.set_goal(None);
        }
        self.tasks.stop(TaskKind::MovementReporter);
        self.tasks.stop(TaskKind::FollowLoop);
        self.approach = None;
        self.goal_owner = None;
    }

    pub(crate) fn next_sequence(&mut self) -> u64 {
        self.next_sequence += 1;
        self.next_sequence
    }

    /// 在线会话；未连接时返回 NotConnected
    pub(crate) fn session(&self) -> Result<Arc<dyn GameSession>, CommandError> {
        match (&self.session, self.state) {
            (Some(session), SessionState::Connected) => Ok(Arc::clone(session)),
            _ => Err(CommandError::NotConnected),
        }
    }

    /// 错误只输出一行；适配器错误同时写入错误日志
    pub(crate) fn report(&self, err: &CommandError) {
        if err.kind() == ErrorKind::Adapter {
            tracing::error!(error = %err, "adapter error");
        }
        self.console.error(err.to_string());
    }
}
