//! 控制器事件：操作员输入、世界事件、定时 tick、延迟动作与方块操作序列步骤
//!
//! 所有异步来源都只向同一个通道投递事件，Controller 按到达顺序逐个处理到底。

use crate::adapter::WorldEvent;
use crate::core::task_manager::TaskKind;

/// 来自控制台的输入
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorInput {
    /// 提交的一行（已去除首尾空白，非空）
    Line(String),
    /// Ctrl+C / SIGTERM
    Interrupt,
    /// 输入流结束（Ctrl+D）
    EndOfInput,
}

/// Ready 之后按固定延迟触发的动作，以及死亡后的复活
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayedAction {
    InitCommand,
    StartListening,
    Respawn,
}

/// 方块操作序列的异步步骤
#[derive(Debug, Clone, PartialEq)]
pub enum ApproachStep {
    /// 到达后的稳定等待结束，可以测量交互距离
    Settled,
    /// 破坏/激活动作完成
    Finished(Result<(), String>),
}

#[derive(Debug)]
pub enum ControllerEvent {
    Operator(OperatorInput),
    /// epoch 标识产生该事件的连接；过期连接的事件被丢弃
    World { epoch: u64, event: WorldEvent },
    /// generation 标识产生该 tick 的任务实例；与当前实例不符的 tick 被丢弃
    Tick { kind: TaskKind, generation: u64 },
    Delayed { epoch: u64, action: DelayedAction },
    Approach { sequence: u64, step: ApproachStep },
}

/// 单个事件处理后的去向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}
