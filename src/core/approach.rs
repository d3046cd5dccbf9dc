//! 方块操作序列（.open）：定位 → 寻路 → 到达 → 动作 → 完成/失败
//!
//! 目标容差（2）比交互距离（3）宽松但不保证到达后一定在交互范围内，
//! 因此到达并稳定后要重新测量距离，超出交互距离则以距离错误中止，不执行动作。
//! 同一时刻只保留一个序列：新的 .open 会取消进行中的旧序列。

use crate::adapter::{nearest, Block, GameSession, Goal, SEARCH_RADIUS};
use crate::core::error::CommandError;

/// 寻路目标容差（方块）
pub const GOAL_TOLERANCE: f64 = 2.0;
/// 最大交互距离（方块）
pub const INTERACTION_RANGE: f64 = 3.0;

/// 到达后执行的动作
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockAction {
    /// A：破坏
    Dig,
    /// B：打开/激活
    Activate,
}

impl BlockAction {
    /// 解析动作字母（不区分大小写）
    pub fn from_letter(letter: &str) -> Option<Self> {
        match letter.to_uppercase().as_str() {
            "A" => Some(BlockAction::Dig),
            "B" => Some(BlockAction::Activate),
            _ => None,
        }
    }

    pub fn verb(self) -> &'static str {
        match self {
            BlockAction::Dig => "破坏",
            BlockAction::Activate => "打开",
        }
    }

    pub fn done_message(self) -> &'static str {
        match self {
            BlockAction::Dig => "方块已破坏",
            BlockAction::Activate => "方块已激活",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApproachState {
    Locating,
    Navigating,
    Arriving,
    Acting,
    Done,
    Failed,
}

/// 一次 .open 调用对应的序列实例
#[derive(Clone, Debug)]
pub struct ApproachAndAct {
    pub sequence: u64,
    pub query: String,
    pub action: BlockAction,
    target: Option<Block>,
    state: ApproachState,
}

impl ApproachAndAct {
    pub fn new(sequence: u64, query: impl Into<String>, action: BlockAction) -> Self {
        Self {
            sequence,
            query: query.into(),
            action,
            target: None,
            state: ApproachState::Locating,
        }
    }

    pub fn state(&self) -> ApproachState {
        self.state
    }

    pub fn target(&self) -> Option<&Block> {
        self.target.as_ref()
    }

    /// 尚未完成或失败
    pub fn is_active(&self) -> bool {
        !matches!(self.state, ApproachState::Done | ApproachState::Failed)
    }

    /// Locating：在扫描范围内找最近的匹配方块；返回它与自身的距离
    pub fn locate(&mut self, session: &dyn GameSession) -> Result<f64, CommandError> {
        debug_assert_eq!(self.state, ApproachState::Locating);
        let Some(origin) = session.position() else {
            self.state = ApproachState::Failed;
            return Err(CommandError::PositionUnavailable);
        };
        match nearest(session, origin, SEARCH_RADIUS, &self.query) {
            Some(hit) => {
                self.target = Some(hit.block);
                self.state = ApproachState::Navigating;
                Ok(hit.distance)
            }
            None => {
                self.state = ApproachState::Failed;
                Err(CommandError::BlockNotFound(self.query.clone()))
            }
        }
    }

    /// 交给寻路的目标：方块附近 GOAL_TOLERANCE 以内
    pub fn goal(&self) -> Option<Goal> {
        self.target.as_ref().map(|block| Goal::Near {
            target: block.position,
            range: GOAL_TOLERANCE,
        })
    }

    /// Navigating → Arriving；其他状态下收到到达事件返回 false
    pub fn arrive(&mut self) -> bool {
        if self.state == ApproachState::Navigating {
            self.state = ApproachState::Arriving;
            true
        } else {
            false
        }
    }

    /// Arriving：用稳定后测得的距离决定是否进入 Acting
    pub fn check_range(&mut self, distance: f64) -> Result<(), CommandError> {
        if self.state != ApproachState::Arriving {
            return Ok(());
        }
        if distance > INTERACTION_RANGE {
            self.state = ApproachState::Failed;
            return Err(CommandError::OutOfRange { distance });
        }
        self.state = ApproachState::Acting;
        Ok(())
    }

    /// Acting → Done / Failed
    pub fn finish(&mut self, ok: bool) {
        if self.state == ApproachState::Acting {
            self.state = if ok {
                ApproachState::Done
            } else {
                ApproachState::Failed
            };
        }
    }

    pub fn fail(&mut self) {
        self.state = ApproachState::Failed;
    }
}
