//! 命令历史：最多 100 条，仅与上一条去重，不持久化

use std::collections::VecDeque;

pub const HISTORY_LIMIT: usize = 100;

#[derive(Debug, Default)]
pub struct CommandHistory {
    entries: VecDeque<String>,
    /// 浏览位置；None 表示不在浏览中（位于最新条目之后）
    cursor: Option<usize>,
    /// 开始浏览前正在编辑的内容
    draft: String,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: &str) {
        self.cursor = None;
        if self.entries.back().map(String::as_str) == Some(line) {
            return;
        }
        self.entries.push_back(line.to_string());
        if self.entries.len() > HISTORY_LIMIT {
            self.entries.pop_front();
        }
    }

    /// 上一条；current 为当前编辑内容（首次进入浏览时保存）
    pub fn previous(&mut self, current: &str) -> Option<&str> {
        let index = match self.cursor {
            None => {
                if self.entries.is_empty() {
                    return None;
                }
                self.draft = current.to_string();
                self.entries.len() - 1
            }
            Some(0) => 0,
            Some(i) => i - 1,
        };
        self.cursor = Some(index);
        self.entries.get(index).map(String::as_str)
    }

    /// 下一条；越过最新条目后回到浏览前的草稿
    pub fn next(&mut self) -> Option<&str> {
        let index = self.cursor?;
        if index + 1 < self.entries.len() {
            self.cursor = Some(index + 1);
            self.entries.get(index + 1).map(String::as_str)
        } else {
            self.cursor = None;
            Some(self.draft.as_str())
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}
