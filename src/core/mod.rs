//! 核心编排层：会话控制器、事件、后台任务管理、方块操作序列、错误分类

pub mod approach;
pub mod controller;
pub mod error;
pub mod event;
pub mod progress;
pub mod shutdown;
pub mod state;
pub mod task_manager;

#[cfg(test)]
pub(crate) mod testing;

pub use approach::{ApproachAndAct, ApproachState, BlockAction};
pub use controller::{Controller, GoalOwner};
pub use error::{CommandError, ErrorKind};
pub use event::{ControllerEvent, Flow, OperatorInput};
pub use progress::MovementProgress;
pub use shutdown::ShutdownManager;
pub use state::{KnownPlayers, SessionState};
pub use task_manager::{BackgroundTask, TaskKind, TaskManager};
