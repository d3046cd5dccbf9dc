//! 命令解释：一行输入 → 聊天或结构化命令
//!
//! `.` 开头为控制台命令；其余（包括 `/` 开头的服务器原生命令）原样作为聊天发送。

pub mod handlers;
pub mod help;
pub mod parser;

use crate::adapter::Vec3;
use crate::core::approach::BlockAction;

pub use parser::parse;

/// 解析后的一行输入
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Chat(String),
    Command(Command),
}

#[derive(Debug, Clone, PartialEq)]
pub enum GoTarget {
    Stop,
    To(Vec3),
}

/// .hand use 的两种动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandAction {
    /// A：左键（挥手）
    Primary,
    /// B：右键（使用手持物品）
    Secondary,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HandCommand {
    Info,
    Slot(u8),
    Use(HandAction),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Where,
    Time,
    Info,
    Find,
    FindBlock(String),
    Go(GoTarget),
    /// None 表示停止跟随
    Hunt(Option<String>),
    Hand(HandCommand),
    Open { block: String, action: BlockAction },
    Chest,
    Inv,
    Exit,
}

impl Command {
    /// 审计日志中的命令名
    pub fn name(&self) -> &'static str {
        match self {
            Command::Help => "help",
            Command::Where => "where",
            Command::Time => "time",
            Command::Info => "info",
            Command::Find => "find",
            Command::FindBlock(_) => "find_block",
            Command::Go(_) => "go",
            Command::Hunt(_) => "hunt",
            Command::Hand(_) => "hand",
            Command::Open { .. } => "open",
            Command::Chest => "chest",
            Command::Inv => "inv",
            Command::Exit => "exit",
        }
    }
}
