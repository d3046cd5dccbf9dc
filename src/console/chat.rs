//! 服务器聊天文本的清洗与分类

use std::sync::OnceLock;

use regex::Regex;

use super::style::Category;

static FORMAT_CODE: OnceLock<Regex> = OnceLock::new();
static PLAYER_CHAT: OnceLock<Regex> = OnceLock::new();
static JOINED: OnceLock<Regex> = OnceLock::new();
static WHISPER: OnceLock<Regex> = OnceLock::new();

const DEATH_VERBS: &[&str] = &["was slain", "fell", "drowned", "burned", "died", "killed"];

/// 去掉 `§x` 格式码
pub fn strip_format_codes(text: &str) -> String {
    let re = FORMAT_CODE.get_or_init(|| Regex::new(r"§[0-9a-fk-or]").expect("valid regex"));
    re.replace_all(text, "").into_owned()
}

/// 一条聊天消息的分类结果
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatClass {
    pub category: Category,
    /// "X joined the game" 中解析出的玩家名
    pub joined: Option<String>,
}

/// 按文本内容分类（输入应已去除格式码）；own_name 用于识别自身死亡消息
pub fn classify(text: &str, own_name: &str) -> ChatClass {
    let player_chat = PLAYER_CHAT.get_or_init(|| Regex::new(r"^<[A-Za-z0-9_]+>").expect("valid regex"));
    let whisper = WHISPER.get_or_init(|| {
        Regex::new(r"^([A-Za-z0-9_]+ whispers to you:|你收到来自 [A-Za-z0-9_]+ 的私聊)").expect("valid regex")
    });

    let category = if player_chat.is_match(text) {
        Category::Chat
    } else if text.contains("joined the game") || text.contains("加入了游戏") {
        let joined_re = JOINED.get_or_init(|| {
            Regex::new(r"([A-Za-z0-9_]+).*(?:joined the game|加入了游戏)").expect("valid regex")
        });
        let joined = joined_re
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string());
        return ChatClass {
            category: Category::Success,
            joined,
        };
    } else if text.contains("left the game") || text.contains("离开了游戏") {
        Category::Error
    } else if !own_name.is_empty()
        && text.contains(own_name)
        && DEATH_VERBS.iter().any(|verb| text.contains(verb))
    {
        Category::Death
    } else if whisper.is_match(text) {
        Category::Whisper
    } else if text.starts_with("[Server]") || text.starts_with("服务器") {
        Category::Notice
    } else {
        Category::Plain
    };

    ChatClass {
        category,
        joined: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_format_codes() {
        assert_eq!(strip_format_codes("§cYou are §lbanned§r!"), "You are banned!");
        assert_eq!(strip_format_codes("no codes"), "no codes");
    }

    #[test]
    fn test_join_extracts_name() {
        let class = classify("Alex joined the game", "Bot1");
        assert_eq!(class.category, Category::Success);
        assert_eq!(class.joined.as_deref(), Some("Alex"));

        let class = classify("Steve 加入了游戏", "Bot1");
        assert_eq!(class.joined.as_deref(), Some("Steve"));

        // 玩家名只由 ASCII 字母、数字和下划线组成
        let class = classify("玩家 Steve 加入了游戏", "Bot1");
        assert_eq!(class.joined.as_deref(), Some("Steve"));
        assert_eq!(classify("<玩家> hi", "Bot1").category, Category::Plain);
    }

    #[test]
    fn test_categories() {
        assert_eq!(classify("<Alex> hi", "Bot1").category, Category::Chat);
        assert_eq!(classify("Alex left the game", "Bot1").category, Category::Error);
        assert_eq!(
            classify("Bot1 was slain by Zombie", "Bot1").category,
            Category::Death
        );
        assert_eq!(
            classify("Alex was slain by Zombie", "Bot1").category,
            Category::Plain
        );
        assert_eq!(
            classify("Alex whispers to you: psst", "Bot1").category,
            Category::Whisper
        );
        assert_eq!(classify("[Server] restarting", "Bot1").category, Category::Notice);
    }
}
