//! 控制台 I/O 复用
//!
//! 唯一的交互输入行由 Screen 持有；任何组件都可以随时 emit 一行输出：
//! 先擦掉当前输入行，写出内容并换行，再重绘提示符与未提交的缓冲并恢复光标列。
//! 按键处理与 emit 共用同一把锁，因此输出不会与正在编辑的行交错。

pub mod chat;
pub mod completion;
pub mod history;
pub mod input;
pub mod line;
pub mod style;

use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crossterm::cursor::MoveToColumn;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{Color, Print, PrintStyledContent, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::queue;

use crate::core::state::KnownPlayers;

pub use chat::{classify, strip_format_codes, ChatClass};
pub use completion::complete;
pub use history::CommandHistory;
pub use input::spawn_reader;
pub use line::LineEditor;
pub use style::{Category, Line};

pub const PROMPT: &str = "[Bot] > ";

/// 一次按键的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// 仅编辑或无操作
    Edited,
    /// 提交一行（已去除首尾空白，非空）
    Submit(String),
    Interrupt,
    EndOfInput,
}

struct Screen {
    out: Box<dyn Write + Send>,
    editor: LineEditor,
    history: CommandHistory,
}

impl Screen {
    fn redraw_input(&mut self) -> io::Result<()> {
        let column = line::str_width(PROMPT) + self.editor.cursor_width();
        queue!(
            self.out,
            MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            SetForegroundColor(Color::Cyan),
            Print(PROMPT),
            ResetColor,
            Print(self.editor.as_string()),
            MoveToColumn(column as u16)
        )?;
        self.out.flush()
    }

    fn write_line(&mut self, line: &Line) -> io::Result<()> {
        queue!(
            self.out,
            MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            PrintStyledContent(line.styled()),
            ResetColor,
            Print("\r\n")
        )?;
        self.redraw_input()
    }
}

/// 控制台句柄（可克隆，所有克隆共享同一屏幕状态）
#[derive(Clone)]
pub struct Console {
    screen: Arc<Mutex<Screen>>,
}

impl Console {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            screen: Arc::new(Mutex::new(Screen {
                out,
                editor: LineEditor::new(),
                history: CommandHistory::new(),
            })),
        }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    fn lock(&self) -> MutexGuard<'_, Screen> {
        self.screen.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 输出一行，保留正在编辑的输入
    pub fn emit(&self, line: Line) {
        if let Err(e) = self.lock().write_line(&line) {
            tracing::error!(error = %e, "console write failed");
        }
    }

    pub fn success(&self, text: impl Into<String>) {
        self.emit(Line::stamped(Category::Success, text));
    }

    pub fn error(&self, text: impl Into<String>) {
        self.emit(Line::stamped(Category::Error, text));
    }

    pub fn warning(&self, text: impl Into<String>) {
        self.emit(Line::stamped(Category::Warning, text));
    }

    pub fn info(&self, text: impl Into<String>) {
        self.emit(Line::stamped(Category::Info, text));
    }

    pub fn notice(&self, text: impl Into<String>) {
        self.emit(Line::stamped(Category::Notice, text));
    }

    /// 不带时间戳的列表行
    pub fn row(&self, text: impl Into<String>) {
        self.emit(Line::plain(text));
    }

    pub fn show_prompt(&self) {
        if let Err(e) = self.lock().redraw_input() {
            tracing::error!(error = %e, "console write failed");
        }
    }

    /// 当前输入缓冲与光标（字符下标）
    pub fn snapshot(&self) -> (String, usize) {
        let screen = self.lock();
        (screen.editor.as_string(), screen.editor.cursor())
    }

    /// 处理一个按键；known 用于补全玩家名
    pub fn handle_key(&self, key: KeyEvent, known: &KnownPlayers) -> KeyOutcome {
        if key.kind == KeyEventKind::Release {
            return KeyOutcome::Edited;
        }
        let mut screen = self.lock();
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let outcome = match key.code {
            KeyCode::Char('c') if ctrl => KeyOutcome::Interrupt,
            KeyCode::Char('d') if ctrl => {
                if screen.editor.is_empty() {
                    KeyOutcome::EndOfInput
                } else {
                    screen.editor.delete();
                    KeyOutcome::Edited
                }
            }
            KeyCode::Char(c) if !ctrl => {
                screen.editor.insert(c);
                KeyOutcome::Edited
            }
            KeyCode::Backspace => {
                screen.editor.backspace();
                KeyOutcome::Edited
            }
            KeyCode::Delete => {
                screen.editor.delete();
                KeyOutcome::Edited
            }
            KeyCode::Left => {
                screen.editor.left();
                KeyOutcome::Edited
            }
            KeyCode::Right => {
                screen.editor.right();
                KeyOutcome::Edited
            }
            KeyCode::Home => {
                screen.editor.home();
                KeyOutcome::Edited
            }
            KeyCode::End => {
                screen.editor.end();
                KeyOutcome::Edited
            }
            KeyCode::Up => {
                let current = screen.editor.as_string();
                if let Some(entry) = screen.history.previous(&current).map(str::to_string) {
                    screen.editor.set(&entry);
                }
                KeyOutcome::Edited
            }
            KeyCode::Down => {
                if let Some(entry) = screen.history.next().map(str::to_string) {
                    screen.editor.set(&entry);
                }
                KeyOutcome::Edited
            }
            KeyCode::Tab => {
                let current = screen.editor.as_string();
                let hits = complete(&current, known);
                match hits.as_slice() {
                    [] => {}
                    [only] => screen.editor.set(only),
                    many => {
                        let listing = many.join("  ");
                        if let Err(e) = screen.write_line(&Line::plain(listing)) {
                            tracing::error!(error = %e, "console write failed");
                        }
                    }
                }
                KeyOutcome::Edited
            }
            KeyCode::Enter => {
                let text = screen.editor.take();
                let trimmed = text.trim().to_string();
                if let Err(e) = queue!(screen.out, Print("\r\n")) {
                    tracing::error!(error = %e, "console write failed");
                }
                if trimmed.is_empty() {
                    KeyOutcome::Edited
                } else {
                    screen.history.push(&trimmed);
                    KeyOutcome::Submit(trimmed)
                }
            }
            _ => KeyOutcome::Edited,
        };
        if outcome != KeyOutcome::Interrupt && outcome != KeyOutcome::EndOfInput {
            if let Err(e) = screen.redraw_input() {
                tracing::error!(error = %e, "console write failed");
            }
        }
        outcome
    }
}

/// 内存输出（测试中捕获控制台内容）
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        let bytes = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// 终端原始模式守卫：创建时开启，drop 时恢复
pub struct TerminalGuard;

impl TerminalGuard {
    pub fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}
