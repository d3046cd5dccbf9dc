//! 命令执行：解析结果分派到 Controller 上的各个处理函数
//!
//! 每个处理函数返回 Result<(), CommandError>，错误由 handle_line 统一输出一行；
//! 每次执行记录一条 JSON 审计日志。

use std::time::{Duration, Instant};

use super::help::{HELP_LINES, HELP_TIP, HELP_TITLE};
use super::{parse, Command, GoTarget, HandAction, HandCommand, Input};
use crate::adapter::{scan_cube, Goal, Item, Vec3, ARMOR_SLOTS, MAIN_SLOTS, QUICK_BAR_LEN, SEARCH_RADIUS};
use crate::console::{Category, Line};
use crate::core::approach::{ApproachAndAct, BlockAction};
use crate::core::controller::{Controller, GoalOwner};
use crate::core::error::CommandError;
use crate::core::event::Flow;
use crate::core::task_manager::BackgroundTask;

const ARMOR_NAMES: [&str; 4] = ["头盔", "胸甲", "护腿", "靴子"];

/// 世界时间换算为 24 小时制钟点（tick 0 对应 06:00）
pub fn clock(ticks: u64) -> (u64, u64) {
    let hours = (ticks / 1000 + 6) % 24;
    let minutes = (ticks % 1000) * 60 / 1000;
    (hours, minutes)
}

pub fn format_online(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{}小时{}分钟{}秒", secs / 3600, secs % 3600 / 60, secs % 60)
}

fn describe_item(item: Option<&Item>) -> String {
    match item {
        Some(item) => format!("{} x{}", item.name, item.count),
        None => "空".to_string(),
    }
}

impl Controller {
    /// 处理操作员提交的一行
    pub(crate) async fn handle_line(&mut self, line: &str) -> Flow {
        let started = Instant::now();
        let input = match parse(line) {
            Ok(input) => input,
            Err(e) => {
                audit("parse", &Err(&e), started);
                self.report(&e);
                return Flow::Continue;
            }
        };

        let (name, result) = match input {
            Input::Chat(text) => ("chat", self.send_chat(&text).await),
            Input::Command(Command::Exit) => {
                audit("exit", &Ok(()), started);
                self.console.warning("正在退出程序...");
                return self.shutdown().await;
            }
            Input::Command(command) => {
                let name = command.name();
                (name, self.execute(command).await)
            }
        };
        audit(name, &result.as_ref().map(|_| ()), started);
        if let Err(e) = result {
            self.report(&e);
        }
        Flow::Continue
    }

    async fn execute(&mut self, command: Command) -> Result<(), CommandError> {
        match command {
            Command::Help => {
                self.show_help();
                Ok(())
            }
            Command::Where => self.show_position(),
            Command::Time => self.show_time(),
            Command::Info => self.show_info(),
            Command::Find => self.find_players(),
            Command::FindBlock(name) => self.find_block(&name),
            Command::Go(GoTarget::Stop) => {
                self.stop_movement();
                self.console.warning("停止寻路任务");
                Ok(())
            }
            Command::Go(GoTarget::To(target)) => self.go_to(target),
            Command::Hunt(None) => {
                self.stop_movement();
                self.console.warning("停止跟随玩家");
                Ok(())
            }
            Command::Hunt(Some(name)) => self.follow(&name),
            Command::Hand(HandCommand::Info) => self.show_hand(),
            Command::Hand(HandCommand::Slot(slot)) => self.select_slot(slot),
            Command::Hand(HandCommand::Use(action)) => self.use_hand(action),
            Command::Open { block, action } => self.open_block(&block, action),
            Command::Chest => {
                self.show_container();
                Ok(())
            }
            Command::Inv => self.show_inventory(),
            Command::Exit => Ok(()),
        }
    }

    async fn send_chat(&mut self, text: &str) -> Result<(), CommandError> {
        let session = self.session()?;
        session
            .chat(text)
            .await
            .map_err(|e| CommandError::adapter("发送消息失败", e))?;
        self.console.warning(format!("[发送] {text}"));
        Ok(())
    }

    fn show_help(&self) {
        self.console.emit(Line::bare(Category::Notice, HELP_TITLE));
        for line in HELP_LINES {
            self.console.row(*line);
        }
        self.console.row("");
        self.console.emit(Line::bare(Category::Warning, HELP_TIP));
    }

    fn position(&self) -> Result<Vec3, CommandError> {
        self.session()?
            .position()
            .ok_or(CommandError::PositionUnavailable)
    }

    fn show_position(&self) -> Result<(), CommandError> {
        let pos = self.position()?;
        self.console.success(format!(
            "机器人位置: X={:.2}, Y={:.2}, Z={:.2}",
            pos.x, pos.y, pos.z
        ));
        Ok(())
    }

    fn show_time(&self) -> Result<(), CommandError> {
        let ticks = self.session()?.time_of_day();
        let (hours, minutes) = clock(ticks);
        self.console.success(format!(
            "服务器时间: {ticks} ticks (约 {hours}:{minutes:02})"
        ));
        Ok(())
    }

    fn show_info(&self) -> Result<(), CommandError> {
        let session = self.session()?;
        let vitals = session.vitals();
        let online = self
            .online_since
            .map(|since| format_online(since.elapsed()))
            .unwrap_or_else(|| "未知".to_string());
        self.console.notice("Bot状态信息:");
        self.console.row(format!(
            "  世界维度: {}",
            vitals.dimension.as_deref().unwrap_or("未知")
        ));
        self.console.row(format!("  生命值: {:.1}/20.0", vitals.health));
        self.console.row(format!("  饱食度: {:.1}/20.0", vitals.food));
        self.console.row(format!("  在线时间: {online}"));
        Ok(())
    }

    fn find_players(&self) -> Result<(), CommandError> {
        let session = self.session()?;
        let me = session.position().ok_or(CommandError::PositionUnavailable)?;
        let own_name = session.username();
        let mut visible: Vec<(String, Vec3, f64)> = session
            .players()
            .into_iter()
            .filter(|p| p.username != own_name)
            .filter_map(|p| p.position.map(|pos| (p.username, pos, me.distance_to(pos))))
            .collect();
        visible.sort_by(|a, b| a.2.total_cmp(&b.2));

        if visible.is_empty() {
            self.console.warning("附近没有可见的玩家");
            return Ok(());
        }
        self.console.success("可见玩家列表:");
        for (name, pos, distance) in visible {
            self.console.row(format!(
                "  {name} - 距离:{distance:.2}方块, 坐标:({:.2}, {:.2}, {:.2})",
                pos.x, pos.y, pos.z
            ));
        }
        Ok(())
    }

    fn find_block(&self, name: &str) -> Result<(), CommandError> {
        let session = self.session()?;
        let origin = session.position().ok_or(CommandError::PositionUnavailable)?;
        let count = scan_cube(&*session, origin, SEARCH_RADIUS, name).len();
        if count > 0 {
            self.console
                .success(format!("找到方块 \"{name}\": 存在, 数量: {count}"));
        } else {
            self.console
                .warning(format!("方块 \"{name}\": 不存在, 数量: 0"));
        }
        Ok(())
    }

    fn go_to(&mut self, target: Vec3) -> Result<(), CommandError> {
        let session = self.session()?;
        let position = session.position().ok_or(CommandError::PositionUnavailable)?;
        let initial_distance = position.distance_to(target);

        self.claim_goal(GoalOwner::Movement);
        if let Err(e) = session.set_goal(Some(Goal::Block(target.floored()))) {
            self.goal_owner = None;
            return Err(CommandError::adapter("寻路时出错", e));
        }
        self.console.warning(format!(
            "开始寻路到坐标 ({}, {}, {})，距离: {initial_distance:.2}方块",
            target.x, target.y, target.z
        ));
        self.tasks.start(
            BackgroundTask::MovementReporter {
                target,
                started: tokio::time::Instant::now(),
                initial_distance,
            },
            self.timings.progress_interval,
        );
        Ok(())
    }

    fn follow(&mut self, name: &str) -> Result<(), CommandError> {
        let session = self.session()?;
        let visible = session.player(name).and_then(|p| p.position).is_some();
        if !visible {
            return Err(CommandError::PlayerNotFound(name.to_string()));
        }
        self.claim_goal(GoalOwner::Follow);
        self.console.success(format!("开始跟随玩家: {name}"));
        self.tasks.start(
            BackgroundTask::FollowLoop {
                target: name.to_string(),
            },
            self.timings.follow_interval,
        );
        Ok(())
    }

    fn show_hand(&self) -> Result<(), CommandError> {
        let session = self.session()?;
        let inventory = session.inventory();
        self.console.notice("物品栏信息:");
        self.console.emit(Line::bare(Category::Warning, "快捷栏 (0-8):"));
        for i in 0..QUICK_BAR_LEN {
            let current = if inventory.selected as usize == i {
                " [当前]"
            } else {
                ""
            };
            self.console.row(format!(
                "  {i}: {}{current}",
                describe_item(inventory.quick_bar(i))
            ));
        }
        self.console.emit(Line::bare(
            Category::Success,
            format!("当前手持: {}", describe_item(session.held_item().as_ref())),
        ));
        Ok(())
    }

    fn select_slot(&self, slot: u8) -> Result<(), CommandError> {
        let session = self.session()?;
        session
            .set_quick_bar_slot(slot)
            .map_err(|e| CommandError::adapter("切换槽位失败", e))?;
        let inventory = session.inventory();
        self.console.success(format!(
            "切换到槽位 {slot}: {}",
            describe_item(inventory.quick_bar(slot as usize))
        ));
        Ok(())
    }

    fn use_hand(&self, action: HandAction) -> Result<(), CommandError> {
        let session = self.session()?;
        let (result, label) = match action {
            HandAction::Primary => (session.swing_arm(), "执行左键动作"),
            HandAction::Secondary => (session.activate_item(), "执行右键动作"),
        };
        result.map_err(|e| CommandError::adapter("执行动作失败", e))?;
        self.console.success(label);
        Ok(())
    }

    /// .open：定位成功后新序列取代进行中的旧序列；定位失败时旧序列不受影响
    fn open_block(&mut self, query: &str, action: BlockAction) -> Result<(), CommandError> {
        let session = self.session()?;
        let mut approach = ApproachAndAct::new(self.next_sequence(), query, action);
        let distance = approach.locate(&*session)?;

        if let Some(previous) = self.approach.take() {
            if previous.is_active() {
                self.console
                    .warning(format!("已取消进行中的方块操作: {}", previous.query));
            }
        }
        self.console.warning(format!(
            "找到方块 {query}，距离: {distance:.2}方块，正在前往..."
        ));

        self.claim_goal(GoalOwner::Approach);
        if let Err(e) = session.set_goal(approach.goal()) {
            self.goal_owner = None;
            return Err(CommandError::adapter("寻找方块时出错", e));
        }
        self.approach = Some(approach);
        Ok(())
    }

    fn show_container(&self) {
        let window = self.session.as_ref().and_then(|s| s.open_window());
        let Some(window) = window else {
            self.console.warning("当前没有打开任何容器");
            return;
        };
        self.console.notice("当前打开的容器内容:");
        self.console.row(format!("  容器类型: {}", window.kind));
        self.console.row(format!(
            "  容器标题: {}",
            window.title.as_deref().unwrap_or("无标题")
        ));
        self.console.row(format!("  槽位数量: {}", window.slots.len()));
        for (i, item) in window.slots.iter().enumerate() {
            if let Some(item) = item {
                self.console
                    .row(format!("  槽位 {i}: {} x{}", item.name, item.count));
            }
        }
    }

    fn show_inventory(&self) -> Result<(), CommandError> {
        let inventory = self.session()?.inventory();
        self.console.notice("完整背包内容:");

        self.console.emit(Line::bare(Category::Warning, "快捷栏 (0-8):"));
        for i in 0..QUICK_BAR_LEN {
            if let Some(item) = inventory.quick_bar(i) {
                let current = if inventory.selected as usize == i {
                    " [当前]"
                } else {
                    ""
                };
                self.console
                    .row(format!("  {i}: {} x{}{current}", item.name, item.count));
            }
        }

        self.console.emit(Line::bare(Category::Warning, "主背包 (9-35):"));
        for i in MAIN_SLOTS {
            if let Some(item) = inventory.slot(i) {
                self.console
                    .row(format!("  槽位 {i}: {} x{}", item.name, item.count));
            }
        }

        self.console.emit(Line::bare(Category::Warning, "装备槽:"));
        for (name, slot) in ARMOR_NAMES.iter().zip(ARMOR_SLOTS) {
            if let Some(item) = inventory.slot(slot) {
                self.console.row(format!("  {name}: {}", item.name));
            }
        }
        Ok(())
    }
}

fn audit(command: &str, result: &Result<(), &CommandError>, started: Instant) {
    let (ok, outcome) = match result {
        Ok(()) => (true, "ok".to_string()),
        Err(e) => (false, format!("{:?}", e.kind()).to_lowercase()),
    };
    let audit = serde_json::json!({
        "event": "command_audit",
        "command": command,
        "ok": ok,
        "outcome": outcome,
        "duration_ms": started.elapsed().as_millis() as u64,
    });
    tracing::info!(audit = %audit.to_string(), "command");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{SimAction, SimConnector, WindowInfo};
    use crate::core::approach::ApproachState;
    use crate::core::task_manager::TaskKind;
    use crate::core::testing::Harness;

    #[test]
    fn test_clock_starts_at_six() {
        assert_eq!(clock(0), (6, 0));
        assert_eq!(clock(6000), (12, 0));
        assert_eq!(clock(18500), (0, 30));
        assert_eq!(clock(23999), (5, 59));
    }

    #[test]
    fn test_format_online() {
        assert_eq!(format_online(Duration::from_secs(3725)), "1小时2分钟5秒");
        assert_eq!(format_online(Duration::ZERO), "0小时0分钟0秒");
    }

    #[tokio::test(start_paused = true)]
    async fn test_commands_require_connection() {
        let connector = SimConnector::new();
        connector.fail_next(1);
        let mut h = Harness::with_connector(connector);
        h.start().await;

        h.line(".where").await;
        h.line("hello").await;
        assert_eq!(h.output().matches("错误: Bot未连接到服务器").count(), 2);

        // 停止类命令无需连接
        h.line(".go stop").await;
        assert!(h.output().contains("停止寻路任务"));
        h.line(".chest").await;
        assert!(h.output().contains("当前没有打开任何容器"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_go_issues_no_goal() {
        let mut h = Harness::new();
        h.start().await;
        for line in [".go 10 abc 3", ".go 1 2", ".go x y z"] {
            h.line(line).await;
        }
        assert!(h.world().goal_log().is_empty());
        assert!(!h.controller.tasks.is_active(TaskKind::MovementReporter));
        assert!(h.output().contains("错误: 坐标必须是数字"));
        assert!(h.output().contains("用法: .go <x> <y> <z> 或 .go stop"));

        h.advance_secs(15).await;
        assert!(!h.output().contains("移动进度"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_go_issues_block_goal_and_reports() {
        let mut h = Harness::new();
        h.start().await;
        h.line(".go 10.7 64 -3.2").await;
        assert_eq!(
            h.world().goal(),
            Some(Goal::Block(Vec3::new(10.0, 64.0, -4.0)))
        );
        assert!(h.output().contains("开始寻路到坐标 (10.7, 64, -3.2)"));

        h.line(".go stop").await;
        assert_eq!(h.world().goal(), None);
        h.advance_secs(20).await;
        assert!(!h.output().contains("移动进度"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_follow_switch_keeps_one_loop() {
        let mut h = Harness::new();
        h.start().await;
        let world = h.world();
        world.put_player("P", Vec3::new(5.0, 64.0, 0.0));
        world.put_player("Q", Vec3::new(-5.0, 64.0, 0.0));

        h.line(".hunt P").await;
        h.line(".hunt Q").await;
        // P 随后消失：旧循环若仍在运行会打印停止提示
        world.hide_player("P");
        h.advance_secs(3).await;

        assert!(!h.output().contains("无法找到玩家 P"));
        assert_eq!(
            h.controller.tasks.get(TaskKind::FollowLoop),
            Some(&BackgroundTask::FollowLoop { target: "Q".into() })
        );
        let near_q = Goal::Near {
            target: Vec3::new(-5.0, 64.0, 0.0),
            range: 2.0,
        };
        assert!(world.goal_log().iter().all(|g| *g == near_q));
        assert_eq!(world.goal_log().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_follow_target_lost_self_terminates() {
        let mut h = Harness::new();
        h.start().await;
        h.world().put_player("P", Vec3::new(5.0, 64.0, 0.0));
        h.line(".hunt P").await;
        h.advance_secs(1).await;
        h.world().remove_player("P");
        h.advance_secs(1).await;

        assert!(h.output().contains("无法找到玩家 P，停止跟随"));
        assert!(!h.controller.tasks.is_active(TaskKind::FollowLoop));
        let before = h.world().goal_log().len();
        h.advance_secs(5).await;
        assert_eq!(h.world().goal_log().len(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hunt_unknown_player() {
        let mut h = Harness::new();
        h.start().await;
        h.line(".hunt Nobody").await;
        assert!(h.output().contains("错误: 找不到玩家 Nobody"));
        assert!(!h.controller.tasks.is_active(TaskKind::FollowLoop));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_after_stop_has_no_effect() {
        let mut h = Harness::new();
        h.start().await;
        h.world().put_player("P", Vec3::new(5.0, 64.0, 0.0));
        h.line(".hunt P").await;
        let generation = h.controller.tasks.generation(TaskKind::FollowLoop).unwrap();
        h.line(".hunt stop").await;
        assert!(h.output().contains("停止跟随玩家"));

        let before = h.out.contents().len();
        h.controller
            .handle(crate::core::event::ControllerEvent::Tick {
                kind: TaskKind::FollowLoop,
                generation,
            })
            .await;
        assert_eq!(h.out.contents().len(), before);
        assert!(h.world().goal_log().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_in_range_executes_action() {
        let mut h = Harness::new();
        h.start().await;
        let world = h.world();
        world.place_block(Vec3::new(6.0, 64.0, 0.0), "chest");

        h.line(".open chest A").await;
        assert!(h.output().contains("找到方块 chest，距离:"));
        assert!(matches!(world.goal(), Some(Goal::Near { range, .. }) if range == 2.0));

        world.set_position(Vec3::new(4.5, 64.0, 0.5));
        world.arrive();
        h.pump().await;
        assert_eq!(
            h.controller.approach.as_ref().map(|a| a.state()),
            Some(ApproachState::Arriving)
        );

        h.advance(Duration::from_millis(500)).await;
        assert!(h.output().contains("已到达方块附近，执行破坏操作..."));
        assert!(h.output().contains("方块已破坏"));
        assert!(world.actions().contains(&SimAction::Dig(Vec3::new(6.0, 64.0, 0.0))));
        assert!(world.actions().contains(&SimAction::LookAt(Vec3::new(6.5, 64.5, 0.5))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_out_of_range_after_arrival() {
        let mut h = Harness::new();
        h.start().await;
        let world = h.world();
        world.place_block(Vec3::new(6.0, 64.0, 0.0), "chest");

        h.line(".open chest B").await;
        world.set_position(Vec3::new(10.0, 64.0, 0.0));
        world.arrive();
        h.pump().await;
        h.advance(Duration::from_millis(500)).await;

        assert!(h.output().contains("距离太远 (4.00方块)，无法操作"));
        assert!(!world
            .actions()
            .iter()
            .any(|a| matches!(a, SimAction::Dig(_) | SimAction::Activate(_))));
        assert!(h.controller.approach.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_cancels_prior_sequence() {
        let mut h = Harness::new();
        h.start().await;
        let world = h.world();
        world.place_block(Vec3::new(6.0, 64.0, 0.0), "chest");
        world.place_block(Vec3::new(-4.0, 64.0, 0.0), "oak_log");

        h.line(".open chest B").await;
        let first = h.controller.approach.as_ref().unwrap().sequence;
        h.line(".open log A").await;
        assert!(h.output().contains("已取消进行中的方块操作: chest"));
        let second = h.controller.approach.as_ref().unwrap().sequence;
        assert_ne!(first, second);

        h.controller
            .handle(crate::core::event::ControllerEvent::Approach {
                sequence: first,
                step: crate::core::event::ApproachStep::Settled,
            })
            .await;
        assert!(world.actions().iter().all(|a| !matches!(a, SimAction::LookAt(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_not_found_keeps_running_sequence() {
        let mut h = Harness::new();
        h.start().await;
        let world = h.world();
        world.place_block(Vec3::new(6.0, 64.0, 0.0), "chest");

        h.line(".open chest B").await;
        let first = h.controller.approach.as_ref().unwrap().sequence;
        let chest_goal = world.goal();
        assert!(chest_goal.is_some());

        h.line(".open diamond_ore A").await;
        assert!(h.output().contains("未找到方块: diamond_ore"));
        assert!(!h.output().contains("已取消进行中的方块操作"));
        assert_eq!(h.controller.approach.as_ref().map(|a| a.sequence), Some(first));
        assert_eq!(h.controller.goal_owner, Some(GoalOwner::Approach));
        assert_eq!(world.goal(), chest_goal);
    }

    #[tokio::test(start_paused = true)]
    async fn test_go_rejected_goal_leaves_no_owner() {
        use crate::adapter::GameSession;

        let mut h = Harness::new();
        h.start().await;
        h.world().quit().await;

        h.line(".go 1 64 1").await;
        assert!(h.output().contains("寻路时出错"));
        assert_eq!(h.controller.goal_owner, None);
        assert!(!h.controller.tasks.is_active(TaskKind::MovementReporter));
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_not_found_and_bad_letter() {
        let mut h = Harness::new();
        h.start().await;
        h.line(".open diamond_ore A").await;
        assert!(h.output().contains("未找到方块: diamond_ore"));
        h.line(".open chest Z").await;
        assert!(h.output().contains("错误: 动作必须是 A 或 B"));
        assert!(h.world().goal_log().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_queries() {
        let mut h = Harness::new();
        h.start().await;
        let world = h.world();
        world.set_time_of_day(18500);
        world.put_player("Far", Vec3::new(30.5, 64.0, 0.5));
        world.put_player("Near", Vec3::new(3.5, 64.0, 0.5));
        world.put_player("Hidden", Vec3::new(1.0, 64.0, 0.0));
        world.hide_player("Hidden");
        world.place_block(Vec3::new(2.0, 64.0, 2.0), "oak_log");
        world.place_block(Vec3::new(2.0, 65.0, 2.0), "oak_log");

        h.line(".where").await;
        h.line(".time").await;
        h.line(".find").await;
        h.line(".find_block log").await;
        h.line(".find_block diamond").await;
        h.line(".info").await;

        let out = h.output();
        assert!(out.contains("机器人位置: X=0.50, Y=64.00, Z=0.50"));
        assert!(out.contains("服务器时间: 18500 ticks (约 0:30)"));
        let near = out.find("  Near - 距离:3.00方块").unwrap();
        let far = out.find("  Far - 距离:30.00方块").unwrap();
        assert!(near < far);
        assert!(!out.contains("Hidden -"));
        assert!(out.contains("找到方块 \"log\": 存在, 数量: 2"));
        assert!(out.contains("方块 \"diamond\": 不存在, 数量: 0"));
        assert!(out.contains("  生命值: 20.0/20.0"));
        assert!(out.contains("  在线时间: 0小时0分钟0秒"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hand_and_inventory() {
        let mut h = Harness::new();
        h.start().await;
        let world = h.world();
        world.set_slot(36, Some(Item::new("stone_pickaxe", 1)));
        world.set_slot(38, Some(Item::new("bread", 8)));
        world.set_slot(12, Some(Item::new("cobblestone", 48)));
        world.set_slot(5, Some(Item::new("iron_helmet", 1)));
        world.set_slot(8, Some(Item::new("iron_boots", 1)));

        h.line(".hand 2").await;
        h.line(".hand info").await;
        h.line(".hand use A").await;
        h.line(".hand 9").await;
        h.line(".inv").await;

        let out = h.output();
        assert!(out.contains("切换到槽位 2: bread x8"));
        assert!(out.contains("  2: bread x8 [当前]"));
        assert!(out.contains("  1: 空"));
        assert!(out.contains("当前手持: bread x8"));
        assert!(out.contains("执行左键动作"));
        assert!(out.contains("切换槽位失败: invalid quick bar slot 9"));
        assert!(out.contains("  槽位 12: cobblestone x48"));
        assert!(out.contains("  头盔: iron_helmet"));
        assert!(out.contains("  靴子: iron_boots"));
        assert!(world.actions().contains(&SimAction::Swing));
    }

    #[tokio::test(start_paused = true)]
    async fn test_chest_listing() {
        let mut h = Harness::new();
        h.start().await;
        let mut slots = vec![None; 27];
        slots[4] = Some(Item::new("diamond", 3));
        h.world().open_container(WindowInfo {
            kind: "minecraft:chest".into(),
            title: Some("Loot".into()),
            slots,
        });
        h.pump().await;
        h.line(".chest").await;
        let out = h.output();
        assert!(out.contains("  容器标题: Loot"));
        assert!(out.contains("  槽位数量: 27"));
        assert!(out.contains("  槽位 4: diamond x3"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exit_and_unknown_command() {
        let mut h = Harness::new();
        h.start().await;
        h.line(".fly").await;
        assert!(h.output().contains("未知命令: .fly，输入 .help 查看帮助"));
        h.line("hi all").await;
        assert_eq!(h.world().chat_log(), vec!["hi all".to_string()]);

        assert_eq!(h.line(".exit").await, Flow::Exit);
        assert!(h.world().is_closed());
        assert!(h.output().contains("正在退出程序..."));
    }
}
