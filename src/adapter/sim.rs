//! 模拟世界适配器（无需真实服务器）
//!
//! 内存中的世界：方块、玩家、背包、容器；寻路目标由可选的步行任务按固定速度推进并回报到达。
//! 未链接协议适配器时主程序使用它；测试中可直接脚本化世界状态与事件。

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::traits::{AdapterError, Credentials, GameSession, SessionConnector, SessionLink};
use super::types::{
    Block, Goal, Inventory, Item, PlayerInfo, Vec3, Vitals, WindowInfo, WorldEvent, QUICK_BAR_LEN,
    QUICK_BAR_START,
};

/// 模拟世界中执行过的动作（供测试断言）
#[derive(Clone, Debug, PartialEq)]
pub enum SimAction {
    Chat(String),
    LookAt(Vec3),
    Dig(Vec3),
    Activate(Vec3),
    Swing,
    UseItem,
    SelectSlot(u8),
    Respawn,
    Quit,
}

#[derive(Debug)]
struct SimState {
    position: Option<Vec3>,
    players: BTreeMap<String, Option<Vec3>>,
    blocks: HashMap<[i64; 3], String>,
    time_of_day: u64,
    vitals: Vitals,
    inventory: Inventory,
    window: Option<WindowInfo>,
    goal: Option<Goal>,
    goal_log: Vec<Goal>,
    actions: Vec<SimAction>,
    closed: bool,
}

impl Default for SimState {
    fn default() -> Self {
        Self {
            position: Some(Vec3::new(0.5, 64.0, 0.5)),
            players: BTreeMap::new(),
            blocks: HashMap::new(),
            time_of_day: 0,
            vitals: Vitals {
                health: 20.0,
                food: 20.0,
                dimension: Some("overworld".to_string()),
            },
            inventory: Inventory::default(),
            window: None,
            goal: None,
            goal_log: Vec::new(),
            actions: Vec::new(),
            closed: false,
        }
    }
}

/// 模拟世界
#[derive(Debug)]
pub struct SimWorld {
    username: String,
    state: Mutex<SimState>,
    events: mpsc::UnboundedSender<WorldEvent>,
}

impl SimWorld {
    pub fn new(username: impl Into<String>, events: mpsc::UnboundedSender<WorldEvent>) -> Self {
        Self {
            username: username.into(),
            state: Mutex::new(SimState::default()),
            events,
        }
    }

    /// 不经过连接器创建世界，直接拿到事件接收端
    pub fn detached(username: &str) -> (Arc<Self>, mpsc::UnboundedReceiver<WorldEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self::new(username, tx)), rx)
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 推送一个世界事件（接收端已关闭时忽略）
    pub fn emit(&self, event: WorldEvent) {
        let _ = self.events.send(event);
    }

    // ---- 脚本化 ----

    pub fn set_position(&self, position: Vec3) {
        self.lock().position = Some(position);
    }

    pub fn despawn(&self) {
        self.lock().position = None;
    }

    pub fn set_time_of_day(&self, ticks: u64) {
        self.lock().time_of_day = ticks;
    }

    /// 玩家进入视距（或移动）
    pub fn put_player(&self, username: &str, position: Vec3) {
        self.lock()
            .players
            .insert(username.to_string(), Some(position));
    }

    /// 玩家离开视距但仍在线
    pub fn hide_player(&self, username: &str) {
        if let Some(slot) = self.lock().players.get_mut(username) {
            *slot = None;
        }
    }

    pub fn remove_player(&self, username: &str) {
        self.lock().players.remove(username);
    }

    pub fn place_block(&self, position: Vec3, name: &str) {
        self.lock()
            .blocks
            .insert(position.block_key(), name.to_string());
    }

    pub fn set_slot(&self, index: usize, item: Option<Item>) {
        let mut state = self.lock();
        if let Some(slot) = state.inventory.slots.get_mut(index) {
            *slot = item;
        }
    }

    /// 修改生命值并推送 Health 事件
    pub fn set_health(&self, health: f32) {
        let food = {
            let mut state = self.lock();
            state.vitals.health = health;
            state.vitals.food
        };
        self.emit(WorldEvent::Health { health, food });
    }

    pub fn open_container(&self, window: WindowInfo) {
        let (kind, title) = (window.kind.clone(), window.title.clone());
        self.lock().window = Some(window);
        self.emit(WorldEvent::WindowOpened { kind, title });
    }

    pub fn close_container(&self) {
        let kind = self.lock().window.take().map(|w| w.kind);
        self.emit(WorldEvent::WindowClosed { kind });
    }

    /// 立即完成当前目标并回报到达
    pub fn arrive(&self) {
        let had_goal = self.lock().goal.take().is_some();
        if had_goal {
            self.emit(WorldEvent::GoalReached);
        }
    }

    /// 放弃当前目标并回报寻路失败
    pub fn fail_goal(&self, reason: &str) {
        let had_goal = self.lock().goal.take().is_some();
        if had_goal {
            self.emit(WorldEvent::GoalFailed(reason.to_string()));
        }
    }

    // ---- 查询（测试断言用）----

    pub fn goal(&self) -> Option<Goal> {
        self.lock().goal.clone()
    }

    /// 所有曾经下达的目标（按顺序）
    pub fn goal_log(&self) -> Vec<Goal> {
        self.lock().goal_log.clone()
    }

    pub fn actions(&self) -> Vec<SimAction> {
        self.lock().actions.clone()
    }

    pub fn chat_log(&self) -> Vec<String> {
        self.lock()
            .actions
            .iter()
            .filter_map(|a| match a {
                SimAction::Chat(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    fn record(&self, action: SimAction) -> Result<(), AdapterError> {
        let mut state = self.lock();
        if state.closed {
            return Err(AdapterError::Closed);
        }
        state.actions.push(action);
        Ok(())
    }

    /// 步行任务：每个 step 按 speed（方块/秒）向目标推进，进入容差范围后回报 GoalReached
    pub fn spawn_walker(self: &Arc<Self>, speed: f64, step: Duration) -> JoinHandle<()> {
        let world = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(step);
            loop {
                ticker.tick().await;
                let reached = {
                    let mut state = world.lock();
                    if state.closed {
                        break;
                    }
                    let (Some(goal), Some(position)) = (state.goal.clone(), state.position) else {
                        continue;
                    };
                    let (target, tolerance) = match goal {
                        Goal::Block(b) => (b.offset(0.5, 0.0, 0.5), 0.5),
                        Goal::Near { target, range } => (target, range),
                    };
                    let remaining = position.distance_to(target);
                    if remaining <= tolerance {
                        state.goal = None;
                        true
                    } else {
                        let stride = (speed * step.as_secs_f64()).min(remaining);
                        let k = stride / remaining;
                        state.position = Some(position.offset(
                            (target.x - position.x) * k,
                            (target.y - position.y) * k,
                            (target.z - position.z) * k,
                        ));
                        false
                    }
                };
                if reached {
                    world.emit(WorldEvent::GoalReached);
                }
            }
        })
    }
}

#[async_trait]
impl GameSession for SimWorld {
    fn username(&self) -> String {
        self.username.clone()
    }

    fn position(&self) -> Option<Vec3> {
        self.lock().position
    }

    fn time_of_day(&self) -> u64 {
        self.lock().time_of_day
    }

    fn vitals(&self) -> Vitals {
        self.lock().vitals.clone()
    }

    fn players(&self) -> Vec<PlayerInfo> {
        let state = self.lock();
        let mut players: Vec<PlayerInfo> = state
            .players
            .iter()
            .map(|(name, position)| PlayerInfo {
                username: name.clone(),
                position: *position,
            })
            .collect();
        players.push(PlayerInfo {
            username: self.username.clone(),
            position: state.position,
        });
        players
    }

    fn block_at(&self, position: Vec3) -> Option<Block> {
        let key = position.block_key();
        self.lock().blocks.get(&key).map(|name| Block {
            name: name.clone(),
            position: position.floored(),
        })
    }

    fn inventory(&self) -> Inventory {
        self.lock().inventory.clone()
    }

    fn open_window(&self) -> Option<WindowInfo> {
        self.lock().window.clone()
    }

    async fn chat(&self, text: &str) -> Result<(), AdapterError> {
        self.record(SimAction::Chat(text.to_string()))
    }

    fn set_goal(&self, goal: Option<Goal>) -> Result<(), AdapterError> {
        let mut state = self.lock();
        if state.closed {
            return Err(AdapterError::Closed);
        }
        if let Some(g) = &goal {
            state.goal_log.push(g.clone());
        }
        state.goal = goal;
        Ok(())
    }

    async fn look_at(&self, point: Vec3) -> Result<(), AdapterError> {
        self.record(SimAction::LookAt(point))
    }

    async fn dig(&self, block: &Block) -> Result<(), AdapterError> {
        self.record(SimAction::Dig(block.position))?;
        self.lock().blocks.remove(&block.position.block_key());
        Ok(())
    }

    async fn activate_block(&self, block: &Block) -> Result<(), AdapterError> {
        self.record(SimAction::Activate(block.position))?;
        if block.name.contains("chest") {
            self.open_container(WindowInfo {
                kind: "minecraft:chest".to_string(),
                title: Some("Chest".to_string()),
                slots: vec![None; 27],
            });
        }
        Ok(())
    }

    fn swing_arm(&self) -> Result<(), AdapterError> {
        self.record(SimAction::Swing)
    }

    fn activate_item(&self) -> Result<(), AdapterError> {
        self.record(SimAction::UseItem)
    }

    fn set_quick_bar_slot(&self, slot: u8) -> Result<(), AdapterError> {
        if slot as usize >= QUICK_BAR_LEN {
            return Err(AdapterError::Action(format!("invalid quick bar slot {slot}")));
        }
        self.record(SimAction::SelectSlot(slot))?;
        self.lock().inventory.selected = slot;
        Ok(())
    }

    async fn respawn(&self) -> Result<(), AdapterError> {
        self.record(SimAction::Respawn)?;
        self.lock().vitals.health = 20.0;
        Ok(())
    }

    async fn quit(&self) {
        let mut state = self.lock();
        state.actions.push(SimAction::Quit);
        state.goal = None;
        state.closed = true;
    }
}

type WorldSetup = Box<dyn Fn(&SimWorld) + Send + Sync>;

/// 模拟连接器：可注入连续失败次数，记录每次连接尝试的时刻
pub struct SimConnector {
    setup: Option<WorldSetup>,
    walker: Option<(f64, Duration)>,
    failures_left: AtomicU32,
    attempts: Mutex<Vec<Instant>>,
    worlds: Mutex<Vec<Arc<SimWorld>>>,
}

impl Default for SimConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl SimConnector {
    /// 空世界、无步行任务（到达由调用方 arrive() 触发）
    pub fn new() -> Self {
        Self {
            setup: None,
            walker: None,
            failures_left: AtomicU32::new(0),
            attempts: Mutex::new(Vec::new()),
            worlds: Mutex::new(Vec::new()),
        }
    }

    /// 带示例方块、玩家、物品与步行任务的演示世界
    pub fn demo() -> Self {
        Self::new()
            .with_walker(4.3, Duration::from_millis(250))
            .with_setup(seed_demo_world)
    }

    pub fn with_setup(mut self, setup: impl Fn(&SimWorld) + Send + Sync + 'static) -> Self {
        self.setup = Some(Box::new(setup));
        self
    }

    pub fn with_walker(mut self, speed: f64, step: Duration) -> Self {
        self.walker = Some((speed, step));
        self
    }

    /// 接下来的 n 次连接尝试失败
    pub fn fail_next(&self, n: u32) {
        self.failures_left.store(n, Ordering::SeqCst);
    }

    pub fn attempts(&self) -> Vec<Instant> {
        self.attempts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// 最近一次成功连接创建的世界
    pub fn last_world(&self) -> Option<Arc<SimWorld>> {
        self.worlds
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

#[async_trait]
impl SessionConnector for SimConnector {
    async fn connect(&self, credentials: &Credentials) -> Result<SessionLink, AdapterError> {
        self.attempts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Instant::now());

        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(AdapterError::Connect(format!(
                "{}:{} unreachable",
                credentials.host, credentials.port
            )));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let world = Arc::new(SimWorld::new(credentials.username.clone(), tx));
        if let Some(setup) = &self.setup {
            setup(&world);
        }
        if let Some((speed, step)) = self.walker {
            world.spawn_walker(speed, step);
        }
        world.emit(WorldEvent::Ready);
        tracing::info!(host = %credentials.host, user = %credentials.username, "simulated session opened");

        self.worlds
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::clone(&world));
        Ok(SessionLink {
            session: world,
            events: rx,
        })
    }
}

fn seed_demo_world(world: &SimWorld) {
    world.set_time_of_day(6000);
    for x in -3..=3 {
        for z in -3..=3 {
            world.place_block(Vec3::new(x as f64, 63.0, z as f64), "grass_block");
        }
    }
    world.place_block(Vec3::new(6.0, 64.0, 2.0), "chest");
    world.place_block(Vec3::new(-5.0, 64.0, 4.0), "oak_log");
    world.place_block(Vec3::new(-5.0, 65.0, 4.0), "oak_log");
    world.place_block(Vec3::new(9.0, 62.0, -7.0), "iron_ore");
    world.put_player("Alex", Vec3::new(12.0, 64.0, -3.0));
    world.put_player("Steve", Vec3::new(-20.0, 70.0, 15.0));
    world.set_slot(QUICK_BAR_START, Some(Item::new("stone_pickaxe", 1)));
    world.set_slot(QUICK_BAR_START + 1, Some(Item::new("bread", 8)));
    world.set_slot(12, Some(Item::new("cobblestone", 48)));
    world.set_slot(6, Some(Item::new("leather_chestplate", 1)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> Credentials {
        Credentials {
            host: "localhost".to_string(),
            port: 25565,
            username: "Bot1".to_string(),
            version: "1.20.1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_connect_emits_ready() {
        let connector = SimConnector::new();
        let mut link = connector.connect(&creds()).await.unwrap();
        assert_eq!(link.events.recv().await, Some(WorldEvent::Ready));
        assert_eq!(link.session.username(), "Bot1");
    }

    #[tokio::test]
    async fn test_fail_next_counts_down() {
        let connector = SimConnector::new();
        connector.fail_next(2);
        assert!(connector.connect(&creds()).await.is_err());
        assert!(connector.connect(&creds()).await.is_err());
        assert!(connector.connect(&creds()).await.is_ok());
        assert_eq!(connector.attempts().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_walker_reaches_near_goal() {
        let (world, mut rx) = SimWorld::detached("Bot1");
        world.set_position(Vec3::new(0.0, 64.0, 0.0));
        world
            .set_goal(Some(Goal::Near {
                target: Vec3::new(10.0, 64.0, 0.0),
                range: 2.0,
            }))
            .unwrap();
        let _walker = world.spawn_walker(4.0, Duration::from_millis(250));

        let event = tokio::time::timeout(Duration::from_secs(10), rx.recv()).await.unwrap();
        assert_eq!(event, Some(WorldEvent::GoalReached));
        let pos = world.position().unwrap();
        assert!(pos.distance_to(Vec3::new(10.0, 64.0, 0.0)) <= 2.0);
        assert!(world.goal().is_none());
    }

    #[tokio::test]
    async fn test_quit_closes_session() {
        let (world, _rx) = SimWorld::detached("Bot1");
        world.quit().await;
        assert!(world.is_closed());
        assert_eq!(world.chat("hi").await, Err(AdapterError::Closed));
    }
}
