//! 世界数据类型：坐标、方块、物品、背包、玩家、容器、寻路目标与世界事件

/// 世界坐标
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn distance_to(&self, other: Vec3) -> f64 {
        let (dx, dy, dz) = (self.x - other.x, self.y - other.y, self.z - other.z);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    pub fn offset(&self, dx: f64, dy: f64, dz: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// 所在方块的整数坐标
    pub fn floored(&self) -> Self {
        Self::new(self.x.floor(), self.y.floor(), self.z.floor())
    }

    pub fn block_key(&self) -> [i64; 3] {
        [
            self.x.floor() as i64,
            self.y.floor() as i64,
            self.z.floor() as i64,
        ]
    }
}

/// 方块：名称 + 方块坐标（整数）
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub name: String,
    pub position: Vec3,
}

impl Block {
    /// 名称等于或包含查询串
    pub fn matches(&self, query: &str) -> bool {
        self.name == query || self.name.contains(query)
    }

    pub fn center(&self) -> Vec3 {
        self.position.offset(0.5, 0.5, 0.5)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item {
    pub name: String,
    pub count: u32,
}

impl Item {
    pub fn new(name: impl Into<String>, count: u32) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }
}

/// 背包布局：5..9 护甲，9..36 主背包，36..45 快捷栏
pub const ARMOR_SLOTS: std::ops::Range<usize> = 5..9;
pub const MAIN_SLOTS: std::ops::Range<usize> = 9..36;
pub const QUICK_BAR_START: usize = 36;
pub const QUICK_BAR_LEN: usize = 9;
pub const INVENTORY_SIZE: usize = 46;

#[derive(Clone, Debug, PartialEq)]
pub struct Inventory {
    pub slots: Vec<Option<Item>>,
    /// 当前选中的快捷栏槽位（0..9）
    pub selected: u8,
}

impl Default for Inventory {
    fn default() -> Self {
        Self {
            slots: vec![None; INVENTORY_SIZE],
            selected: 0,
        }
    }
}

impl Inventory {
    pub fn slot(&self, index: usize) -> Option<&Item> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    pub fn quick_bar(&self, index: usize) -> Option<&Item> {
        self.slot(QUICK_BAR_START + index)
    }

    pub fn held(&self) -> Option<&Item> {
        self.quick_bar(self.selected as usize)
    }
}

/// 生命值 / 饱食度 / 维度
#[derive(Clone, Debug, PartialEq)]
pub struct Vitals {
    pub health: f32,
    pub food: f32,
    pub dimension: Option<String>,
}

/// 玩家；实体不在视距内时 position 为 None
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerInfo {
    pub username: String,
    pub position: Option<Vec3>,
}

/// 打开的容器界面
#[derive(Clone, Debug, PartialEq)]
pub struct WindowInfo {
    pub kind: String,
    pub title: Option<String>,
    pub slots: Vec<Option<Item>>,
}

/// 交给寻路能力的目标
#[derive(Clone, Debug, PartialEq)]
pub enum Goal {
    /// 站到指定方块上
    Block(Vec3),
    /// 进入目标点 range 范围内
    Near { target: Vec3, range: f64 },
}

/// 聊天消息的显示位置
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessagePosition {
    Chat,
    System,
    /// 动作栏（快捷栏上方的提示），控制台不显示
    GameInfo,
}

/// 适配器推送给控制器的世界事件
#[derive(Clone, Debug, PartialEq)]
pub enum WorldEvent {
    /// 登录完成，可以接受命令
    Ready,
    /// 连接结束（主动断开或网络中断）
    Ended { reason: Option<String> },
    /// 被服务器踢出
    Kicked { reason: String },
    /// 协议 / 运行时错误，不改变会话状态
    Error(String),
    GoalReached,
    GoalFailed(String),
    Health { health: f32, food: f32 },
    Died,
    Chat {
        text: String,
        position: MessagePosition,
    },
    PlayerJoined(String),
    PlayerLeft(String),
    PlayerUpdated(String),
    WindowOpened { kind: String, title: Option<String> },
    WindowClosed { kind: Option<String> },
}
