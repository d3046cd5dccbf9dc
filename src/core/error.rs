//! 命令错误类型与分类
//!
//! 校验错误、会话不可用、世界错误、适配器错误各自只向操作员输出一行；
//! 除断线重连外都不自动重试，需要操作员重新下达命令。

use thiserror::Error;

use crate::adapter::AdapterError;

/// 命令执行过程中可能出现的错误；Display 即操作员看到的文本
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("错误: Bot未连接到服务器")]
    NotConnected,

    #[error("用法: {0}")]
    Usage(&'static str),

    #[error("错误: 坐标必须是数字")]
    InvalidCoordinate,

    #[error("错误: 动作必须是 A 或 B")]
    InvalidAction,

    #[error("未知的hand子命令: {0}")]
    UnknownHandCommand(String),

    #[error("未知命令: {0}，输入 .help 查看帮助")]
    UnknownCommand(String),

    #[error("错误: 找不到玩家 {0}")]
    PlayerNotFound(String),

    #[error("未找到方块: {0}")]
    BlockNotFound(String),

    #[error("距离太远 ({distance:.2}方块)，无法操作")]
    OutOfRange { distance: f64 },

    #[error("错误: 无法获取机器人位置")]
    PositionUnavailable,

    #[error("{context}: {source}")]
    Adapter {
        context: &'static str,
        #[source]
        source: AdapterError,
    },
}

/// 错误分类
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// 参数格式错误：命令中止，状态不变
    Validation,
    /// 需要在线会话但当前未连接
    SessionUnavailable,
    /// 方块/玩家找不到、超出交互距离：进行中的序列中止
    World,
    /// 远端会话报告的错误：同时写入侧通道日志
    Adapter,
}

impl CommandError {
    pub fn adapter(context: &'static str, source: AdapterError) -> Self {
        Self::Adapter { context, source }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CommandError::Usage(_)
            | CommandError::InvalidCoordinate
            | CommandError::InvalidAction
            | CommandError::UnknownHandCommand(_)
            | CommandError::UnknownCommand(_) => ErrorKind::Validation,
            CommandError::NotConnected => ErrorKind::SessionUnavailable,
            CommandError::PlayerNotFound(_)
            | CommandError::BlockNotFound(_)
            | CommandError::OutOfRange { .. }
            | CommandError::PositionUnavailable => ErrorKind::World,
            CommandError::Adapter { .. } => ErrorKind::Adapter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            CommandError::UnknownCommand(".fly".into()).to_string(),
            "未知命令: .fly，输入 .help 查看帮助"
        );
        assert_eq!(
            CommandError::OutOfRange { distance: 4.0 }.to_string(),
            "距离太远 (4.00方块)，无法操作"
        );
        assert_eq!(
            CommandError::adapter("切换槽位失败", AdapterError::Action("bad slot".into())).to_string(),
            "切换槽位失败: bad slot"
        );
    }

    #[test]
    fn test_kinds() {
        assert_eq!(CommandError::InvalidCoordinate.kind(), ErrorKind::Validation);
        assert_eq!(CommandError::NotConnected.kind(), ErrorKind::SessionUnavailable);
        assert_eq!(CommandError::BlockNotFound("chest".into()).kind(), ErrorKind::World);
        assert_eq!(
            CommandError::adapter("x", AdapterError::Closed).kind(),
            ErrorKind::Adapter
        );
    }
}
