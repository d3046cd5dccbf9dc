//! craftbot - 游戏世界会话的交互式操作员控制台
//!
//! 模块划分：
//! - **adapter**: 游戏会话适配器边界（连接、世界查询、动作、寻路）与模拟世界实现
//! - **command**: 输入行解析、命令分派与各命令的执行
//! - **config**: 配置加载（config.txt + 环境变量）与固定时序
//! - **console**: 控制台 I/O 复用（输入行编辑、历史、补全、着色输出）
//! - **core**: 会话控制器、事件通道、后台任务管理、方块操作序列
//! - **observability**: tracing 错误日志

pub mod adapter;
pub mod command;
pub mod config;
pub mod console;
pub mod core;
pub mod observability;

pub use crate::core::Controller;
