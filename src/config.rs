//! 应用配置：从 config.txt 与环境变量加载
//!
//! 文件格式为 `key = value` 行，`#` 开头为注释，空行忽略；值取第一个 `=` 之后的原文（仅去首尾空白，
//! 不做转义与引号处理）。
//! 加载顺序：先读文件，再用环境变量 `CRAFTBOT_*` 覆盖（如 `CRAFTBOT_USERNAME=Bot2`）。

use std::error::Error as StdError;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::adapter::Credentials;

/// 未配置 server_port 时使用的默认端口
pub const DEFAULT_PORT: u16 = 25565;

/// 配置错误：任一情况都会让进程以退出码 1 结束
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("无法读取配置文件 {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: config::ConfigError,
    },

    #[error("缺少必要配置: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
}

/// `key = value` 行格式
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyValueFormat;

impl config::Format for KeyValueFormat {
    fn parse(
        &self,
        uri: Option<&String>,
        text: &str,
    ) -> Result<config::Map<String, config::Value>, Box<dyn StdError + Send + Sync>> {
        let mut map = config::Map::new();
        for line in text.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            map.insert(
                key.trim().to_string(),
                config::Value::new(uri, value.trim().to_string()),
            );
        }
        Ok(map)
    }
}

impl config::FileStoredFormat for KeyValueFormat {
    fn file_extensions(&self) -> &'static [&'static str] {
        &["txt"]
    }
}

/// 文件中的原始键值，全部可选
#[derive(Debug, Clone, Deserialize, Default)]
struct RawConfig {
    server_address: Option<String>,
    server_port: Option<u16>,
    server_version: Option<String>,
    username: Option<String>,
    init_command: Option<String>,
}

/// 校验后的配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotConfig {
    pub server_address: String,
    pub server_port: u16,
    pub server_version: String,
    pub username: String,
    /// 连接成功后发送一次的聊天行（如 `/login <密码>`）
    pub init_command: Option<String>,
}

impl BotConfig {
    pub fn credentials(&self) -> Credentials {
        Credentials {
            host: self.server_address.clone(),
            port: self.server_port,
            username: self.username.clone(),
            version: self.server_version.clone(),
        }
    }

    /// 启动时打印的配置摘要
    pub fn summary(&self) -> Vec<String> {
        vec![
            format!("服务器地址: {}", self.server_address),
            format!("服务器端口: {}", self.server_port),
            format!("服务器版本: {}", self.server_version),
            format!("用户名: {}", self.username),
            format!(
                "初始命令: {}",
                self.init_command.as_deref().unwrap_or("(无)")
            ),
        ]
    }

    fn validate(raw: RawConfig) -> Result<Self, ConfigError> {
        // 空字符串与缺失同等对待
        let present = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

        let server_address = present(raw.server_address);
        let server_version = present(raw.server_version);
        let username = present(raw.username);

        let missing: Vec<&'static str> = [
            ("server_address", server_address.is_none()),
            ("server_version", server_version.is_none()),
            ("username", username.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();

        match (server_address, server_version, username) {
            (Some(server_address), Some(server_version), Some(username)) => Ok(Self {
                server_address,
                server_port: raw.server_port.unwrap_or(DEFAULT_PORT),
                server_version,
                username,
                init_command: present(raw.init_command),
            }),
            _ => Err(ConfigError::Missing(missing)),
        }
    }

    /// 从字符串解析（不叠加环境变量）
    pub fn from_str_source(text: &str) -> Result<Self, ConfigError> {
        let raw = config::Config::builder()
            .add_source(config::File::from_str(text, KeyValueFormat))
            .build()
            .and_then(|c| c.try_deserialize::<RawConfig>())
            .map_err(|source| ConfigError::Read {
                path: "<inline>".to_string(),
                source,
            })?;
        Self::validate(raw)
    }
}

/// 读取配置文件并叠加环境变量 CRAFTBOT_*；文件不存在或不可读时返回 Read 错误
pub fn load_config(path: &Path) -> Result<BotConfig, ConfigError> {
    let display = path.display().to_string();
    let raw = config::Config::builder()
        .add_source(config::File::new(&display, KeyValueFormat).required(true))
        .add_source(config::Environment::with_prefix("CRAFTBOT").try_parsing(true))
        .build()
        .and_then(|c| c.try_deserialize::<RawConfig>())
        .map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
    BotConfig::validate(raw)
}

/// 固定时序常量（秒级“时间单位”）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    /// Ready 之后发送初始命令的延迟
    pub init_command_delay: Duration,
    /// Ready 之后开始处理聊天/玩家事件的延迟（跳过服务器的初始状态同步突发）
    pub listen_delay: Duration,
    pub reconnect_interval: Duration,
    pub progress_interval: Duration,
    pub follow_interval: Duration,
    pub respawn_delay: Duration,
    /// 到达方块附近后、测量交互距离前的等待
    pub settle_delay: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            init_command_delay: Duration::from_secs(1),
            listen_delay: Duration::from_secs(3),
            reconnect_interval: Duration::from_secs(5),
            progress_interval: Duration::from_secs(10),
            follow_interval: Duration::from_secs(1),
            respawn_delay: Duration::from_secs(1),
            settle_delay: Duration::from_millis(500),
        }
    }
}
