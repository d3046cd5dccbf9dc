//! 游戏会话适配器抽象
//!
//! 线协议与寻路由外部适配器实现：SessionConnector 负责建立连接，返回 GameSession 句柄与世界事件流；
//! 控制器只通过这两个 trait 访问远端世界。

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use super::types::{Block, Goal, Inventory, Item, PlayerInfo, Vec3, Vitals, WindowInfo, WorldEvent};

/// 适配器层错误（连接失败、会话已关闭、动作被拒绝）
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AdapterError {
    #[error("连接失败: {0}")]
    Connect(String),

    #[error("会话已关闭")]
    Closed,

    #[error("{0}")]
    Action(String),
}

/// 连接参数（来自配置）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub version: String,
}

/// 一次成功连接的产物：会话句柄 + 该会话的世界事件流
pub struct SessionLink {
    pub session: Arc<dyn GameSession>,
    pub events: mpsc::UnboundedReceiver<WorldEvent>,
}

/// 连接器：每次调用创建一个新的会话实例
#[async_trait]
pub trait SessionConnector: Send + Sync {
    async fn connect(&self, credentials: &Credentials) -> Result<SessionLink, AdapterError>;
}

/// 已建立的会话。查询读取适配器本地缓存的世界状态（同步）；动作可能需要等待服务器（异步）。
#[async_trait]
pub trait GameSession: Send + Sync {
    /// 登录用户名
    fn username(&self) -> String;

    /// 自身位置；实体尚未生成时为 None
    fn position(&self) -> Option<Vec3>;

    /// 世界时间（0..24000 tick）
    fn time_of_day(&self) -> u64;

    fn vitals(&self) -> Vitals;

    /// 所有已知玩家（含不可见者，不可见时 position 为 None）
    fn players(&self) -> Vec<PlayerInfo>;

    fn player(&self, username: &str) -> Option<PlayerInfo> {
        self.players().into_iter().find(|p| p.username == username)
    }

    /// 查询给定坐标所在方块（坐标向下取整）；区块未加载时为 None
    fn block_at(&self, position: Vec3) -> Option<Block>;

    fn inventory(&self) -> Inventory;

    fn held_item(&self) -> Option<Item> {
        self.inventory().held().cloned()
    }

    /// 当前打开的容器界面
    fn open_window(&self) -> Option<WindowInfo>;

    async fn chat(&self, text: &str) -> Result<(), AdapterError>;

    /// 设置（Some）或取消（None）寻路目标；到达/失败通过 WorldEvent 异步回报
    fn set_goal(&self, goal: Option<Goal>) -> Result<(), AdapterError>;

    async fn look_at(&self, point: Vec3) -> Result<(), AdapterError>;

    async fn dig(&self, block: &Block) -> Result<(), AdapterError>;

    async fn activate_block(&self, block: &Block) -> Result<(), AdapterError>;

    /// 主动作（挥手 / 左键）
    fn swing_arm(&self) -> Result<(), AdapterError>;

    /// 副动作（使用手持物品 / 右键）
    fn activate_item(&self) -> Result<(), AdapterError>;

    fn set_quick_bar_slot(&self, slot: u8) -> Result<(), AdapterError>;

    /// 复活请求；默认发送服务器命令 /respawn
    async fn respawn(&self) -> Result<(), AdapterError> {
        self.chat("/respawn").await
    }

    /// 断开连接并释放资源
    async fn quit(&self);
}
