//! 会话级状态：连接状态机与已知玩家集合
//!
//! 二者都只由 Controller 修改；KnownPlayers 另外被补全函数只读共享。

use std::collections::BTreeSet;
use std::sync::{Arc, PoisonError, RwLock};

/// 连接状态（进程内唯一，由 Controller 持有）
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Connected,
}

/// 已知玩家名：只增不减，仅用于命令行补全，允许过期
#[derive(Clone, Debug, Default)]
pub struct KnownPlayers {
    names: Arc<RwLock<BTreeSet<String>>>,
}

impl KnownPlayers {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一个玩家名；新增时返回 true
    pub fn insert(&self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        self.names
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(name)
    }

    /// 按前缀（不区分大小写）筛选
    pub fn matching(&self, prefix: &str) -> Vec<String> {
        let prefix = prefix.to_lowercase();
        self.names
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|name| name.to_lowercase().starts_with(&prefix))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.names.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_players_grow_monotonically() {
        let players = KnownPlayers::new();
        assert!(players.insert("Alex"));
        assert!(!players.insert("Alex"));
        assert!(players.insert("alice"));
        assert!(!players.insert("  "));
        assert_eq!(players.len(), 2);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let players = KnownPlayers::new();
        players.insert("Alex");
        players.insert("alice");
        players.insert("Steve");
        assert_eq!(players.matching("AL"), vec!["Alex".to_string(), "alice".to_string()]);
        assert_eq!(players.matching("st"), vec!["Steve".to_string()]);
        assert!(players.matching("z").is_empty());
    }

    #[test]
    fn test_clones_share_storage() {
        let players = KnownPlayers::new();
        let view = players.clone();
        players.insert("Notch");
        assert!(view.contains("Notch"));
    }
}
