//! 输出行：消息类别（决定颜色）+ 时间戳 + 文本

use chrono::Local;
use crossterm::style::{Color, StyledContent, Stylize};

/// 消息类别
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    Success,
    Error,
    Warning,
    Info,
    /// 服务器公告、系统提示
    Notice,
    Chat,
    /// 自身死亡
    Death,
    Whisper,
    Plain,
}

impl Category {
    pub fn color(self) -> Option<Color> {
        match self {
            Category::Success => Some(Color::Green),
            Category::Error | Category::Death => Some(Color::Red),
            Category::Warning => Some(Color::Yellow),
            Category::Info => Some(Color::Blue),
            Category::Notice => Some(Color::Cyan),
            Category::Chat => Some(Color::White),
            Category::Whisper => Some(Color::Magenta),
            Category::Plain => None,
        }
    }
}

/// 一行待输出的内容
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Line {
    pub category: Category,
    pub text: String,
    /// 列表行等不带时间戳
    pub timestamp: Option<String>,
}

impl Line {
    /// 带当前本地时间戳的一行
    pub fn stamped(category: Category, text: impl Into<String>) -> Self {
        Self {
            category,
            text: text.into(),
            timestamp: Some(Local::now().format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }

    /// 不带时间戳的行（列表、小标题）
    pub fn bare(category: Category, text: impl Into<String>) -> Self {
        Self {
            category,
            text: text.into(),
            timestamp: None,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::bare(Category::Plain, text)
    }

    /// 不带颜色的完整文本
    pub fn render(&self) -> String {
        let prefix = if self.category == Category::Death {
            "[死亡] "
        } else {
            ""
        };
        match &self.timestamp {
            Some(ts) => format!("[{ts}] {prefix}{}", self.text),
            None => format!("{prefix}{}", self.text),
        }
    }

    pub fn styled(&self) -> StyledContent<String> {
        let text = self.render();
        let styled = match self.category.color() {
            Some(color) => text.with(color),
            None => text.stylize(),
        };
        if self.category == Category::Death {
            styled.bold()
        } else {
            styled
        }
    }
}
