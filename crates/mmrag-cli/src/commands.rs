//! Parsing of chat input lines

use std::path::PathBuf;

/// What a line typed at the chat prompt asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Ask(String),
    Upload(PathBuf),
    Image(PathBuf),
    ClearImage,
    ClearChat,
    ClearUploads,
    Help,
    Exit,
    Empty,
    /// A slash command that is unknown or missing its argument
    Invalid(String),
}

impl ChatCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return ChatCommand::Empty;
        }

        match line.to_lowercase().as_str() {
            "exit" | "quit" => return ChatCommand::Exit,
            "help" | "/help" => return ChatCommand::Help,
            "/clear" => return ChatCommand::ClearChat,
            "/clear-uploads" => return ChatCommand::ClearUploads,
            "/clear-image" => return ChatCommand::ClearImage,
            _ => {}
        }

        if !line.starts_with('/') {
            return ChatCommand::Ask(line.to_string());
        }

        let (command, argument) = match line.split_once(char::is_whitespace) {
            Some((command, argument)) => (command, argument.trim()),
            None => (line, ""),
        };

        match (command.to_lowercase().as_str(), argument) {
            ("/upload", path) if !path.is_empty() => ChatCommand::Upload(PathBuf::from(path)),
            ("/image", path) if !path.is_empty() => ChatCommand::Image(PathBuf::from(path)),
            _ => ChatCommand::Invalid(line.to_string()),
        }
    }
}
