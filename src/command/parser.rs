//! 输入行解析与参数校验（纯函数，不访问会话）

use super::{Command, GoTarget, HandAction, HandCommand, Input};
use crate::adapter::Vec3;
use crate::core::approach::BlockAction;
use crate::core::error::CommandError;

pub fn parse(line: &str) -> Result<Input, CommandError> {
    let line = line.trim();
    if !line.starts_with('.') {
        return Ok(Input::Chat(line.to_string()));
    }

    let parts: Vec<&str> = line.split_whitespace().collect();
    let args = &parts[1..];
    let command = match parts[0] {
        ".help" => Command::Help,
        ".where" => Command::Where,
        ".time" => Command::Time,
        ".info" => Command::Info,
        ".find" => Command::Find,
        ".find_block" => match args.first() {
            Some(name) => Command::FindBlock(name.to_string()),
            None => return Err(CommandError::Usage(".find_block <方块名>")),
        },
        ".go" => Command::Go(parse_go(args)?),
        ".hunt" => match args.first() {
            None | Some(&"stop") => Command::Hunt(None),
            Some(name) => Command::Hunt(Some(name.to_string())),
        },
        ".hand" => Command::Hand(parse_hand(args)?),
        ".open" => match args {
            [block, letter, ..] => Command::Open {
                block: block.to_string(),
                action: BlockAction::from_letter(letter).ok_or(CommandError::InvalidAction)?,
            },
            _ => return Err(CommandError::Usage(".open <方块名> <A/B>")),
        },
        ".chest" => Command::Chest,
        ".inv" => Command::Inv,
        ".exit" => Command::Exit,
        other => return Err(CommandError::UnknownCommand(other.to_string())),
    };
    Ok(Input::Command(command))
}

fn parse_go(args: &[&str]) -> Result<GoTarget, CommandError> {
    if args.first() == Some(&"stop") {
        return Ok(GoTarget::Stop);
    }
    let [x, y, z, ..] = args else {
        return Err(CommandError::Usage(".go <x> <y> <z> 或 .go stop"));
    };
    let coord = |s: &str| {
        s.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or(CommandError::InvalidCoordinate)
    };
    Ok(GoTarget::To(Vec3::new(coord(x)?, coord(y)?, coord(z)?)))
}

fn parse_hand(args: &[&str]) -> Result<HandCommand, CommandError> {
    let Some(sub) = args.first() else {
        return Err(CommandError::Usage(".hand info|<0-9>|use <A/B>"));
    };
    match *sub {
        "info" => Ok(HandCommand::Info),
        "use" => match args.get(1).map(|s| s.to_uppercase()).as_deref() {
            None => Err(CommandError::Usage(".hand use <A/B>")),
            Some("A") => Ok(HandCommand::Use(HandAction::Primary)),
            Some("B") => Ok(HandCommand::Use(HandAction::Secondary)),
            Some(_) => Err(CommandError::InvalidAction),
        },
        digit if digit.len() == 1 && digit.as_bytes()[0].is_ascii_digit() => {
            Ok(HandCommand::Slot(digit.as_bytes()[0] - b'0'))
        }
        other => Err(CommandError::UnknownHandCommand(other.to_string())),
    }
}
