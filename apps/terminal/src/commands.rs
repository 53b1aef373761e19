use thiserror::Error;

pub const HELP_TEXT: &str = "\
commands:
  search <query>   look up tracks (alias: / <query>)
  play <n>         stream result n from the last search (or just type n)
  pause            halt the current track
  stop             stop playback
  status           show the current session
  help             show this message
  quit             stop playback and exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    Play(usize),
    Pause,
    Stop,
    Status,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("nothing to do; type `help` for commands")]
    Empty,
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
    #[error("`{0}` is not a result number")]
    InvalidIndex(String),
    #[error("unknown command `{0}`; type `help` for commands")]
    Unknown(String),
}

impl Command {
    /// 结果编号从 1 开始，与列表显示一致。
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(CommandError::Empty);
        }

        if let Some(query) = line.strip_prefix('/') {
            return search(query);
        }

        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };

        match head.to_ascii_lowercase().as_str() {
            "search" | "s" => search(rest),
            "play" | "p" => {
                if rest.is_empty() {
                    return Err(CommandError::MissingArgument("play"));
                }
                index(rest)
            }
            "pause" => Ok(Command::Pause),
            "stop" => Ok(Command::Stop),
            "status" => Ok(Command::Status),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            _ if rest.is_empty() && head.chars().all(|c| c.is_ascii_digit()) => index(head),
            _ => Err(CommandError::Unknown(head.to_string())),
        }
    }
}

fn search(query: &str) -> Result<Command, CommandError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(CommandError::MissingArgument("search"));
    }
    Ok(Command::Search(query.to_string()))
}

fn index(raw: &str) -> Result<Command, CommandError> {
    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Ok(Command::Play(n)),
        _ => Err(CommandError::InvalidIndex(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_search_forms() {
        assert_eq!(
            Command::parse("search  lo-fi beats "),
            Ok(Command::Search("lo-fi beats".into()))
        );
        assert_eq!(
            Command::parse("/ daft punk"),
            Ok(Command::Search("daft punk".into()))
        );
        assert_eq!(
            Command::parse("/ "),
            Err(CommandError::MissingArgument("search"))
        );
    }

    #[test]
    fn parses_play_and_bare_numbers() {
        assert_eq!(Command::parse("play 3"), Ok(Command::Play(3)));
        assert_eq!(Command::parse("7"), Ok(Command::Play(7)));
        assert_eq!(
            Command::parse("play 0"),
            Err(CommandError::InvalidIndex("0".into()))
        );
        assert_eq!(
            Command::parse("play two"),
            Err(CommandError::InvalidIndex("two".into()))
        );
        assert_eq!(Command::parse("play"), Err(CommandError::MissingArgument("play")));
    }

    #[test]
    fn parses_controls_case_insensitively() {
        assert_eq!(Command::parse("PAUSE"), Ok(Command::Pause));
        assert_eq!(Command::parse("stop"), Ok(Command::Stop));
        assert_eq!(Command::parse("Status"), Ok(Command::Status));
        assert_eq!(Command::parse("?"), Ok(Command::Help));
        assert_eq!(Command::parse("exit"), Ok(Command::Quit));
    }

    #[test]
    fn rejects_blank_and_unknown_input() {
        assert_eq!(Command::parse("   "), Err(CommandError::Empty));
        assert_eq!(
            Command::parse("rewind 10"),
            Err(CommandError::Unknown("rewind".into()))
        );
    }
}
