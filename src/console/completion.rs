//! Tab 补全：返回整行候选

use crate::core::state::KnownPlayers;

pub const BUILTIN_COMMANDS: &[&str] = &[
    ".help",
    ".where",
    ".time",
    ".info",
    ".find",
    ".find_block",
    ".go",
    ".hunt",
    ".hand",
    ".open",
    ".chest",
    ".inv",
    ".exit",
];

const HAND_ARGS: &[&str] = &[
    "info", "use", "0", "1", "2", "3", "4", "5", "6", "7", "8", "9",
];

const ACTION_LETTERS: &[&str] = &["A", "B"];

/// 常用的服务器原生命令
pub const REMOTE_COMMANDS: &[&str] = &[
    "/help", "/list", "/msg", "/tell", "/w", "/r", "/home", "/spawn", "/tp", "/gamemode",
];

const WHISPER_COMMANDS: &[&str] = &["/msg", "/tell", "/w"];

pub fn complete(line: &str, known: &KnownPlayers) -> Vec<String> {
    let mut hits: Vec<String> = BUILTIN_COMMANDS
        .iter()
        .filter(|cmd| cmd.starts_with(line))
        .map(|cmd| cmd.to_string())
        .collect();

    let parts: Vec<&str> = line.split(' ').collect();

    if line.starts_with(".hand ") {
        match parts.as_slice() {
            [_, partial] => hits.extend(
                HAND_ARGS
                    .iter()
                    .filter(|arg| arg.starts_with(partial))
                    .map(|arg| format!(".hand {arg}")),
            ),
            [_, "use", partial] => hits.extend(
                ACTION_LETTERS
                    .iter()
                    .filter(|arg| arg.starts_with(partial))
                    .map(|arg| format!(".hand use {arg}")),
            ),
            _ => {}
        }
    }

    if line.starts_with(".open ") {
        if let [_, block, partial] = parts.as_slice() {
            hits.extend(
                ACTION_LETTERS
                    .iter()
                    .filter(|arg| arg.starts_with(partial))
                    .map(|arg| format!(".open {block} {arg}")),
            );
        }
    }

    if line.starts_with('/') {
        hits.extend(
            REMOTE_COMMANDS
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| cmd.to_string()),
        );
        if let [command, partial] = parts.as_slice() {
            if WHISPER_COMMANDS.contains(command) {
                hits.extend(
                    known
                        .matching(partial)
                        .into_iter()
                        .map(|name| format!("{command} {name}")),
                );
            }
        }
    }

    hits
}
