// Operator commands typed at the dashboard prompt.
// Parsing only; the app module decides what each command does.

use crate::core::dashboard::{Tab, TypeFilter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Refresh,
    List,
    Tab(Tab),
    Filter(TypeFilter),
    /// 1-based position in the visible list.
    Open(usize),
    Close,
    /// `None` targets the main control.
    Read(Option<usize>),
    Pause(Option<usize>),
    Resume(Option<usize>),
    Stop(Option<usize>),
    Help,
    Quit,
}

/// `Ok(None)` for a blank line.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let argument = words.next();
    if let Some(extra) = words.next() {
        return Err(format!("Unexpected argument '{}'", extra));
    }

    let command = match verb.to_ascii_lowercase().as_str() {
        "refresh" | "r" => Command::Refresh,
        "list" | "ls" => Command::List,
        "tab" => Command::Tab(required(verb, argument)?.parse()?),
        "today" => Command::Tab(Tab::Today),
        "all" => Command::Tab(Tab::All),
        "filter" | "type" => Command::Filter(required(verb, argument)?.parse()?),
        "open" => Command::Open(card_index(required(verb, argument)?)?),
        "close" => Command::Close,
        "read" | "listen" => Command::Read(argument.map(card_index).transpose()?),
        "pause" => Command::Pause(argument.map(card_index).transpose()?),
        "resume" => Command::Resume(argument.map(card_index).transpose()?),
        "stop" => Command::Stop(argument.map(card_index).transpose()?),
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("Unknown command '{}'. Type 'help' for a list.", other)),
    };
    Ok(Some(command))
}

fn required<'a>(verb: &str, argument: Option<&'a str>) -> Result<&'a str, String> {
    argument.ok_or_else(|| format!("'{}' needs an argument", verb))
}

fn card_index(value: &str) -> Result<usize, String> {
    match value.trim_start_matches('#').parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("'{}' is not a report number", value)),
    }
}

pub fn help_text() -> &'static str {
    "Commands:
  refresh            reload reports now
  list               show the report list again
  tab today|all      choose the date tab (also: today, all)
  filter all|summary|executive
  open N / close     show or hide report N in full
  read [N]           read report N aloud, or the open/first report
  pause [N]          pause narration
  resume [N]         resume narration
  stop [N]           stop narration
  help               this text
  quit               leave the dashboard"
}
