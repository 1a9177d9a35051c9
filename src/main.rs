mod commands;
mod data;
mod history;
mod response;
mod utils;

use std::env;
use std::error::Error;
use std::io::Write;
use std::time::Duration;

use clipboard::{ClipboardContext, ClipboardProvider};
use commands::{is_command, Command};
use console::style;
use data::CommandCompletion;
use dialoguer::{theme::ColorfulTheme, BasicHistory, Input, Select};
use edgen_client::{ChatCompletionRequest, Edgen, Message};
use history::History;
use indicatif::ProgressBar;
use tokio::runtime::Runtime;

const SYSTEM_PROMPT: &str = "You are Edgen, a helpful assistant.";

struct Session {
    rt: Runtime,
    client: Edgen,
    history: History,
    context: Vec<Message>,
    code_blocks: Vec<String>,
    stream: bool,
}

fn print_nicely_formatted_history(history: &[Message]) {
    for message in history {
        match message.role.as_str() {
            "user" => println!("{} {}", style("User:").cyan().bold(), message.content),
            "assistant" => println!("{} {}", style("Edgen:").green().bold(), message.content),
            _ => println!("{} {}", style("System:").dim(), message.content),
        }
        println!();
    }
}

fn report(err: &edgen_client::Error) {
    if err.is_connection() {
        eprintln!("{}", style("No connection. Is edgen running?").red());
    } else {
        eprintln!("{} {}", style("Request failed:").red(), err);
    }
}

fn clipboard() -> Option<ClipboardContext> {
    match ClipboardProvider::new() {
        Ok(clipboard) => Some(clipboard),
        Err(e) => {
            eprintln!("Clipboard unavailable: {}", e);
            None
        }
    }
}

impl Session {
    fn chat(&mut self, prompt: String) {
        self.context.push(Message::user(prompt));
        let mut messages = vec![Message::system(SYSTEM_PROMPT)];
        messages.extend(self.context.iter().cloned());
        let request = ChatCompletionRequest::new(self.client.config().model.clone(), messages);

        self.code_blocks.clear();
        let answer = if self.stream {
            let spinner = ProgressBar::new_spinner();
            spinner.set_message("thinking...");
            spinner.enable_steady_tick(Duration::from_millis(100));

            let client = &self.client;
            let code_blocks = &mut self.code_blocks;
            self.rt.block_on(async move {
                match client.chat_completion_stream(request).await {
                    Ok(stream) => {
                        response::process_response(stream.deltas(), code_blocks, Some(spinner)).await
                    }
                    Err(e) => {
                        spinner.finish_and_clear();
                        Err(e)
                    }
                }
            })
        } else {
            self.rt
                .block_on(self.client.chat_completion(request))
                .map(|completion| {
                    let content = completion.content().unwrap_or_default().to_string();
                    utils::handle_output(&content, &mut self.code_blocks);
                    content
                })
        };

        match answer {
            Ok(answer) => {
                self.context.push(Message::assistant(answer));
                if let Err(e) = self.rt.block_on(self.history.save_context(&self.context)) {
                    eprintln!("Failed to save context: {}", e);
                }
            }
            Err(e) => {
                self.context.pop();
                report(&e);
            }
        }
    }

    /// Runs a command. Returns the prompt to send when the command produces one.
    fn handle_command(&mut self, command: Command) -> Result<Option<String>, Box<dyn Error>> {
        match command {
            Command::Exit => std::process::exit(0),
            Command::Clear => println!("\x1B[2J\x1B[1;1H"),
            Command::Reset => {
                self.context.clear();
                self.code_blocks.clear();
                self.rt.block_on(self.history.save_context(&self.context))?;
                println!("Conversation reset.");
            }
            Command::Copy => {
                if self.code_blocks.is_empty() {
                    println!("No code blocks to copy.");
                    return Ok(None);
                }
                let selection = Select::with_theme(&ColorfulTheme::default())
                    .with_prompt("Select code block to copy")
                    .items(&self.code_blocks[..])
                    .default(0)
                    .interact()?;
                if let Some(mut clipboard) = clipboard() {
                    clipboard.set_contents(self.code_blocks[selection].clone())?;
                    println!("Code block copied to clipboard");
                }
            }
            Command::CopyAll => {
                if self.code_blocks.is_empty() {
                    println!("No code blocks to copy.");
                    return Ok(None);
                }
                if let Some(mut clipboard) = clipboard() {
                    clipboard.set_contents(self.code_blocks.join("\n\n"))?;
                    println!("All code blocks copied to clipboard");
                }
            }
            Command::Paste => {
                let Some(mut clipboard) = clipboard() else {
                    return Ok(None);
                };
                let pasted = clipboard.get_contents()?;
                print!("\n{}", pasted);
                std::io::stdout().flush()?;

                let details = Input::<String>::with_theme(&ColorfulTheme::default())
                    .with_prompt("Add additional details")
                    .allow_empty(true)
                    .interact_text()?;
                return Ok(Some(format!("{}\n{}", pasted, details)));
            }
            Command::Version => match self.rt.block_on(self.client.version()) {
                Ok(version) => println!("edgen {}", version),
                Err(e) => report(&e),
            },
            Command::Status => match self.rt.block_on(self.client.chat_completions_status()) {
                Ok(status) => {
                    println!("active model: {}", status.active_model);
                    println!(
                        "last activity: {:?} ({:?})",
                        status.last_activity, status.last_activity_result
                    );
                    for error in &status.last_errors {
                        println!("  {}", style(error).red());
                    }
                }
                Err(e) => report(&e),
            },
            Command::Models => match self.rt.block_on(self.client.models()) {
                Ok(models) if models.is_empty() => println!("No models."),
                Ok(models) => {
                    for model in &models {
                        println!("{} (owned by {})", model.id, model.owned_by);
                    }
                }
                Err(e) => report(&e),
            },
            Command::Transcribe(path) => {
                let model = self.client.config().model.clone();
                match self.rt.block_on(self.client.transcription(&model, &path)) {
                    Ok(transcription) => println!("{}", transcription.text.trim()),
                    Err(e) => report(&e),
                }
            }
            Command::Unknown(cmd) => println!("Unknown command: {}", cmd),
        }
        Ok(None)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let rt = Runtime::new()?;
    let history_file = env::var("EDGEN_HISTORY").unwrap_or_else(|_| "edgen_history.json".to_string());
    let history = History::new(&history_file);

    let context = match rt.block_on(history.load_context()) {
        Ok(entries) => {
            if !entries.is_empty() {
                println!("Previous conversation:");
                print_nicely_formatted_history(&entries);
            }
            entries
        }
        Err(e) => {
            eprintln!("Failed to load history: {}", e);
            Vec::new()
        }
    };

    let mut session = Session {
        rt,
        client: Edgen::new(),
        history,
        context,
        code_blocks: Vec::new(),
        stream: env::var("EDGEN_STREAM").map(|v| v != "0").unwrap_or(true),
    };
    log::info!("talking to {}", session.client.config().base_url);

    let mut input_history = BasicHistory::new().max_entries(99).no_duplicates(false);
    let completion = CommandCompletion::default();

    loop {
        let input = Input::<String>::with_theme(&ColorfulTheme::default())
            .with_prompt("you")
            .completion_with(&completion)
            .history_with(&mut input_history)
            .interact_text()?;

        let prompt = if is_command(&input) {
            match session.handle_command(Command::parse(&input)) {
                Ok(Some(prompt)) => prompt,
                Ok(None) => continue,
                Err(e) => {
                    eprintln!("Command failed: {}", e);
                    continue;
                }
            }
        } else {
            input
        };

        session.chat(prompt);
        println!();
        std::io::stdout().flush()?;
    }
}
