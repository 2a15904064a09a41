#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Help,
    Dump,
    History,
    Stream,
    Quit,
    Unknown(String),
}

pub const HELP_TEXT: &str = "\
Commands:
  /help     show this help
  /dump     print the last raw response as JSON
  /history  list the conversation messages
  /stream   toggle streaming mode
  /quit     end the conversation";

pub fn parse_slash_command(input: &str) -> Option<SlashCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let command = trimmed
        .split_whitespace()
        .next()
        .unwrap_or(trimmed)
        .to_string();

    let parsed = match command.as_str() {
        "/help" => SlashCommand::Help,
        "/dump" => SlashCommand::Dump,
        "/history" => SlashCommand::History,
        "/stream" => SlashCommand::Stream,
        "/quit" | "/exit" => SlashCommand::Quit,
        _ => SlashCommand::Unknown(command),
    };

    Some(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parser_recognizes_known_and_unknown_slash_commands() {
        assert_eq!(parse_slash_command("plain prompt"), None);
        assert_eq!(parse_slash_command(" /help "), Some(SlashCommand::Help));
        assert_eq!(parse_slash_command("/dump"), Some(SlashCommand::Dump));
        assert_eq!(parse_slash_command("/history"), Some(SlashCommand::History));
        assert_eq!(parse_slash_command("/stream on"), Some(SlashCommand::Stream));
        assert_eq!(parse_slash_command("/exit"), Some(SlashCommand::Quit));
        assert_eq!(
            parse_slash_command("/nope extra args"),
            Some(SlashCommand::Unknown("/nope".to_string()))
        );
    }
}
