//! 游戏会话适配器层：trait 边界、世界数据类型、方块扫描、模拟世界实现

pub mod scan;
pub mod sim;
pub mod traits;
pub mod types;

pub use scan::{nearest, scan_cube, BlockHit, SEARCH_RADIUS};
pub use sim::{SimAction, SimConnector, SimWorld};
pub use traits::{AdapterError, Credentials, GameSession, SessionConnector, SessionLink};
pub use types::{
    Block, Goal, Inventory, Item, MessagePosition, PlayerInfo, Vec3, Vitals, WindowInfo,
    WorldEvent, ARMOR_SLOTS, MAIN_SLOTS, QUICK_BAR_LEN, QUICK_BAR_START,
};
