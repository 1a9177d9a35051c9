use std::path::PathBuf;

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Exit,
    Clear,
    Reset,
    Copy,
    CopyAll,
    Paste,
    Version,
    Status,
    Models,
    Transcribe(PathBuf),
    Unknown(String),
}

pub fn is_command(input: &str) -> bool {
    input.trim_start().starts_with('/')
}

impl Command {
    pub fn parse(input: &str) -> Command {
        let input = input.trim();
        let (name, arg) = match input.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (input, ""),
        };
        match (name, arg) {
            ("/exit" | "/quit", _) => Command::Exit,
            ("/clear", _) => Command::Clear,
            ("/reset", _) => Command::Reset,
            ("/copy", _) => Command::Copy,
            ("/copy_all", _) => Command::CopyAll,
            ("/paste", _) => Command::Paste,
            ("/version", _) => Command::Version,
            ("/status", _) => Command::Status,
            ("/models", _) => Command::Models,
            ("/transcribe", path) if !path.is_empty() => Command::Transcribe(PathBuf::from(path)),
            _ => Command::Unknown(input.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_commands() {
        assert!(is_command("/exit"));
        assert!(is_command("  /transcribe a.wav"));
        assert!(!is_command("What is the result of 1+2?"));
    }

    #[test]
    fn parses_arguments() {
        assert_eq!(Command::parse("/quit"), Command::Exit);
        assert_eq!(Command::parse("/copy_all"), Command::CopyAll);
        assert_eq!(
            Command::parse("/transcribe  resources/frost.wav "),
            Command::Transcribe(PathBuf::from("resources/frost.wav"))
        );
        assert_eq!(
            Command::parse("/transcribe"),
            Command::Unknown("/transcribe".to_string())
        );
        assert_eq!(Command::parse("/nope"), Command::Unknown("/nope".to_string()));
    }
}
