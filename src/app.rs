//! Console collaborator around the chat engine: model menu, REPL loop and
//! turn rendering.

use std::io::{self, BufRead, Write};

use chat_engine::{ConversationState, Delta, DeltaChannel, TurnOutcome, TurnSettings};
use chat_provider::{InvocationMode, Message, ModelProvider};

use crate::catalog::{free_models, CatalogModel};
use crate::commands::{parse_slash_command, SlashCommand, HELP_TEXT};
use crate::config::EnvConfig;
use crate::error::AppError;
use crate::providers::ChatBackend;

pub const PROMPT: &str = "> ";
pub const REASONING_HEADER: &str = "[reasoning]";
pub const SUMMARY_HEADER: &str = "[summary]";
pub const ANSWER_HEADER: &str = "[answer]";

const HISTORY_PREVIEW_CHARS: usize = 60;

/// Fetches the catalog, lets the user pick a zero-cost model and runs the
/// conversation until `/quit` or end of input.
///
/// Returns the final history; empty when the user left at the menu.
pub fn run_app<R: BufRead, W: Write>(
    backend: &dyn ChatBackend,
    config: &EnvConfig,
    mut input: R,
    mut output: W,
) -> Result<Vec<Message>, AppError> {
    let entries = backend.list_models().map_err(AppError::Catalog)?;
    let models = free_models(&entries);
    if models.is_empty() {
        return Err(AppError::NoFreeModels);
    }

    let Some(model) = select_model(&models, &mut input, &mut output)? else {
        return Ok(Vec::new());
    };
    tracing::info!(model = %model.id, "model selected");
    writeln!(
        output,
        "Chatting with {} ({}). Type /help for commands.",
        model.display_name, model.id
    )?;

    let mut session = ChatSession::new(backend.provider(), config.turn_settings(model.id.clone()));
    run_repl(&mut session, &mut input, &mut output)?;
    Ok(session.finish())
}

/// Prints the numbered menu and reads a choice. `None` at end of input.
pub fn select_model<'m, R: BufRead, W: Write>(
    models: &'m [CatalogModel],
    input: &mut R,
    output: &mut W,
) -> io::Result<Option<&'m CatalogModel>> {
    writeln!(output, "Zero-cost models on OpenRouter:")?;
    for (index, model) in models.iter().enumerate() {
        writeln!(output, "{}. {} ({})", index + 1, model.display_name, model.id)?;
    }

    loop {
        write!(output, "Select a model [1-{}]: ", models.len())?;
        output.flush()?;

        let Some(line) = read_line(input)? else {
            writeln!(output)?;
            return Ok(None);
        };

        match line.trim().parse::<usize>() {
            Ok(choice) if (1..=models.len()).contains(&choice) => {
                return Ok(models.get(choice - 1));
            }
            _ => writeln!(
                output,
                "Please enter a number between 1 and {}.",
                models.len()
            )?,
        }
    }
}

/// Reads lines until the session asks to exit or input ends.
pub fn run_repl<R: BufRead, W: Write>(
    session: &mut ChatSession<'_>,
    input: &mut R,
    output: &mut W,
) -> io::Result<()> {
    while !session.should_exit() {
        session.await_user();
        write!(output, "{PROMPT}")?;
        output.flush()?;

        let Some(line) = read_line(input)? else {
            writeln!(output)?;
            break;
        };
        session.handle_line(&line, output)?;
    }

    Ok(())
}

fn read_line<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

/// One interactive conversation with a fixed model.
pub struct ChatSession<'p> {
    provider: &'p dyn ModelProvider,
    settings: TurnSettings,
    state: ConversationState,
    should_exit: bool,
}

impl<'p> ChatSession<'p> {
    pub fn new(provider: &'p dyn ModelProvider, settings: TurnSettings) -> Self {
        Self {
            provider,
            settings,
            state: ConversationState::new(),
            should_exit: false,
        }
    }

    pub fn settings(&self) -> &TurnSettings {
        &self.settings
    }

    pub fn history(&self) -> &[Message] {
        self.state.history()
    }

    pub fn should_exit(&self) -> bool {
        self.should_exit
    }

    fn await_user(&mut self) {
        self.state.await_user();
    }

    /// Handles one line of user input: a slash command or a chat turn.
    pub fn handle_line(&mut self, line: &str, output: &mut dyn Write) -> io::Result<()> {
        let text = line.trim();
        if text.is_empty() {
            return Ok(());
        }

        match parse_slash_command(text) {
            Some(command) => self.run_command(command, output),
            None => self.run_turn(text, output),
        }
    }

    /// Ends the conversation and returns its history.
    pub fn finish(self) -> Vec<Message> {
        self.state.end()
    }

    fn run_command(&mut self, command: SlashCommand, output: &mut dyn Write) -> io::Result<()> {
        match command {
            SlashCommand::Help => writeln!(output, "{HELP_TEXT}"),
            SlashCommand::Dump => match self.state.diagnostic_dump() {
                Some(dump) => writeln!(output, "{dump}"),
                None => writeln!(output, "No response yet."),
            },
            SlashCommand::History => {
                let history = self.state.history();
                writeln!(output, "{} messages", history.len())?;
                for (index, message) in history.iter().enumerate() {
                    writeln!(
                        output,
                        "{}. {}: {}",
                        index + 1,
                        message.role.as_str(),
                        preview(&message.content)
                    )?;
                }
                Ok(())
            }
            SlashCommand::Stream => {
                let (mode, label) = match self.settings.mode {
                    InvocationMode::Batch => (InvocationMode::Streaming, "on"),
                    InvocationMode::Streaming => (InvocationMode::Batch, "off"),
                };
                self.settings.mode = mode;
                writeln!(output, "Streaming {label}.")
            }
            SlashCommand::Quit => {
                self.should_exit = true;
                Ok(())
            }
            SlashCommand::Unknown(command) => {
                writeln!(output, "Unknown command: {command} (try /help)")
            }
        }
    }

    fn run_turn(&mut self, text: &str, output: &mut dyn Write) -> io::Result<()> {
        let mut printer = StreamPrinter::default();
        let outcome = self
            .state
            .run_turn(self.provider, &self.settings, text, &mut |delta| {
                printer.print(output, &delta)
            });
        printer.finish(output)?;

        if !outcome.succeeded {
            let message = outcome.error_message.as_deref().unwrap_or("turn failed");
            return writeln!(output, "Error: {message}");
        }

        render_outcome(&outcome, &printer, output)
    }
}

/// Mirrors streamed deltas under a header per region.
#[derive(Default)]
struct StreamPrinter {
    region: Option<DeltaChannel>,
    showed_reasoning: bool,
    showed_answer: bool,
    error: Option<io::Error>,
}

impl StreamPrinter {
    fn print(&mut self, output: &mut dyn Write, delta: &Delta) {
        if self.error.is_some() {
            return;
        }
        if let Err(error) = self.write_delta(output, delta) {
            self.error = Some(error);
        }
    }

    fn write_delta(&mut self, output: &mut dyn Write, delta: &Delta) -> io::Result<()> {
        if self.region != Some(delta.channel) {
            if self.region.is_some() {
                writeln!(output)?;
            }
            let header = match delta.channel {
                DeltaChannel::Reasoning => {
                    self.showed_reasoning = true;
                    REASONING_HEADER
                }
                DeltaChannel::Answer => {
                    self.showed_answer = true;
                    ANSWER_HEADER
                }
            };
            writeln!(output, "{header}")?;
            self.region = Some(delta.channel);
        }

        write!(output, "{}", delta.text)?;
        output.flush()
    }

    fn finish(&mut self, output: &mut dyn Write) -> io::Result<()> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }
        if self.region.is_some() {
            writeln!(output)?;
        }
        Ok(())
    }
}

/// Prints whatever the stream did not already show.
fn render_outcome(
    outcome: &TurnOutcome,
    printer: &StreamPrinter,
    output: &mut dyn Write,
) -> io::Result<()> {
    if !printer.showed_reasoning {
        print_block(output, REASONING_HEADER, &outcome.printed_reasoning.join("\n"))?;
    }
    print_block(output, SUMMARY_HEADER, &outcome.printed_summary.join("\n"))?;
    if !printer.showed_answer {
        print_block(output, ANSWER_HEADER, &outcome.printed_answer)?;
    }
    Ok(())
}

fn print_block(output: &mut dyn Write, header: &str, body: &str) -> io::Result<()> {
    let body = body.trim();
    if body.is_empty() {
        return Ok(());
    }
    writeln!(output, "{header}\n{body}")
}

fn preview(content: &str) -> String {
    let first_line = content.lines().next().unwrap_or_default();
    let mut preview: String = first_line.chars().take(HISTORY_PREVIEW_CHARS).collect();
    if preview.len() < content.len() {
        preview.push_str("...");
    }
    preview
}

#[cfg(test)]
mod tests {
    use chat_provider_mock::MockProvider;

    use super::*;

    fn models() -> Vec<CatalogModel> {
        vec![
            CatalogModel {
                id: "a:free".to_string(),
                display_name: "A".to_string(),
            },
            CatalogModel {
                id: "b:free".to_string(),
                display_name: "B".to_string(),
            },
        ]
    }

    #[test]
    fn select_model_reprompts_until_valid_index() {
        let models = models();
        let mut input = "zero\n9\n2\n".as_bytes();
        let mut output = Vec::new();

        let selected = select_model(&models, &mut input, &mut output).expect("menu io");

        assert_eq!(selected.map(|model| model.id.as_str()), Some("b:free"));
        let printed = String::from_utf8(output).expect("utf8 output");
        assert!(printed.contains("1. A (a:free)\n2. B (b:free)\n"));
        assert_eq!(printed.matches("Please enter a number between 1 and 2.").count(), 2);
    }

    #[test]
    fn select_model_returns_none_at_end_of_input() {
        let models = models();
        let mut input = "".as_bytes();
        let mut output = Vec::new();

        assert_eq!(select_model(&models, &mut input, &mut output).expect("menu io"), None);
    }

    #[test]
    fn stream_command_toggles_mode() {
        let provider = MockProvider::new();
        let mut session = ChatSession::new(&provider, TurnSettings::new("m"));
        let mut output = Vec::new();

        session.handle_line("/stream", &mut output).expect("command io");
        assert_eq!(session.settings().mode, InvocationMode::Streaming);
        session.handle_line("/stream", &mut output).expect("command io");
        assert_eq!(session.settings().mode, InvocationMode::Batch);

        let printed = String::from_utf8(output).expect("utf8 output");
        assert_eq!(printed, "Streaming on.\nStreaming off.\n");
    }

    #[test]
    fn blank_lines_are_ignored() {
        let provider = MockProvider::new();
        let mut session = ChatSession::new(&provider, TurnSettings::new("m"));
        let mut output = Vec::new();

        session.handle_line("   \n", &mut output).expect("blank io");

        assert!(output.is_empty());
        assert!(session.history().is_empty());
        assert!(provider.requests().is_empty());
    }

    #[test]
    fn preview_truncates_long_and_multiline_content() {
        assert_eq!(preview("short"), "short");
        assert_eq!(preview("first\nsecond"), "first...");
        assert_eq!(preview(&"x".repeat(80)), format!("{}...", "x".repeat(60)));
    }
}
