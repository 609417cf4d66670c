// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `parley shell` command implementation.
//!
//! An interactive REPL with readline history. Answers stream to stdout as
//! they arrive while the conversation store is updated underneath; Ctrl+C
//! during a generation stops it, Ctrl+C or Ctrl+D at the prompt exits.

use std::future::Future;
use std::io::Write;
use std::path::PathBuf;

use colored::Colorize;
use parley_config::ParleyConfig;
use parley_context::{UsageLevel, format_context_size};
use parley_core::{ConversationStore, ParleyError, SessionId};
use parley_search::summary::no_results_message;
use parley_session::{
    ChatController, ERROR_NOTICE, GenerationReport, GenerationState, SearchAnswer,
    STOPPED_MARKER,
};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;
use tracing::debug;

use crate::app::App;
use crate::commands::session_line;

const HELP: &str = "\
/new               start a new chat
/list              list chats
/select <n>        switch to chat n
/delete <n>        delete chat n
/title <text>      rename the current chat
/model [name]      show or select the model
/context [size]    show or select the context size
/attach [path]     attach a file to the next message, or list attachments
/detach            drop pending attachments
/search <query>    answer from a web search
/usage             estimated context usage
/quit              exit";

/// A parsed line of shell input.
#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Send(&'a str),
    New,
    List,
    Select(usize),
    Delete(usize),
    Title(&'a str),
    Model(Option<&'a str>),
    Context(Option<u32>),
    Attach(Option<&'a str>),
    Detach,
    Search(&'a str),
    Usage,
    Help,
    Quit,
    Invalid(String),
}

fn parse_command(line: &str) -> Command<'_> {
    let line = line.trim();
    let Some(rest) = line.strip_prefix('/') else {
        return Command::Send(line);
    };
    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };
    let arg_opt = (!arg.is_empty()).then_some(arg);

    match name {
        "new" => Command::New,
        "list" => Command::List,
        "select" => index_arg(arg).map_or_else(|| usage("/select <n>"), Command::Select),
        "delete" => index_arg(arg).map_or_else(|| usage("/delete <n>"), Command::Delete),
        "title" if !arg.is_empty() => Command::Title(arg),
        "title" => usage("/title <text>"),
        "model" => Command::Model(arg_opt),
        "context" => match arg_opt {
            None => Command::Context(None),
            Some(size) => match size.parse::<u32>() {
                Ok(size) if size > 0 => Command::Context(Some(size)),
                _ => usage("/context <size>"),
            },
        },
        "attach" => Command::Attach(arg_opt),
        "detach" => Command::Detach,
        "search" if !arg.is_empty() => Command::Search(arg),
        "search" => usage("/search <query>"),
        "usage" => Command::Usage,
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => Command::Invalid(format!("unknown command /{other}, try /help")),
    }
}

fn index_arg(arg: &str) -> Option<usize> {
    arg.parse::<usize>().ok().filter(|n| *n > 0)
}

fn usage(text: &str) -> Command<'static> {
    Command::Invalid(format!("usage: {text}"))
}

struct ShellState {
    chat: SessionId,
    attachments: Vec<PathBuf>,
}

/// Runs the `parley shell` interactive REPL.
pub async fn run_shell(config: ParleyConfig, ephemeral: bool) -> Result<(), ParleyError> {
    let app = App::open(config, ephemeral).await?;
    let controller = app.controller()?;
    let mut state = ShellState {
        chat: app.store.ensure_session().await,
        attachments: Vec::new(),
    };

    let mut rl = DefaultEditor::new()
        .map_err(|e| ParleyError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", "parley shell".bold().green());
    match app.settings.selected_model().await {
        Some(model) => println!("Model: {}", model.yellow()),
        None => println!("No model selected, pick one with {}.", "/model <name>".yellow()),
    }
    println!("Type {} for commands, {} to exit.\n", "/help".yellow(), "/quit".yellow());

    loop {
        let prompt = format!("{}> ", "parley".green());
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                let command = parse_command(trimmed);
                if command == Command::Quit {
                    break;
                }
                if let Err(e) = handle_command(&app, &controller, &mut state, command).await {
                    eprintln!("{}: {e}", "error".red());
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    app.close().await;
    println!("{}", "goodbye".dimmed());
    Ok(())
}

async fn handle_command(
    app: &App,
    controller: &ChatController,
    state: &mut ShellState,
    command: Command<'_>,
) -> Result<(), ParleyError> {
    let store = &app.store;
    match command {
        Command::Send(input) => {
            let (tx, rx) = mpsc::unbounded_channel();
            let turn = controller.send_message(&state.chat, input, &state.attachments, Some(tx));
            let report = stream_to_stdout(controller, &state.chat, turn, rx).await?;
            state.attachments.clear();
            print_report(&report);
        }
        Command::Search(query) => {
            println!("{}", "Searching the web...".dimmed());
            let (tx, rx) = mpsc::unbounded_channel();
            let turn = controller.search_and_answer(&state.chat, query, Some(tx));
            match stream_to_stdout(controller, &state.chat, turn, rx).await? {
                SearchAnswer::NoResults { .. } => println!("{}", no_results_message(query)),
                SearchAnswer::Cancelled => println!("{}", "search cancelled".dimmed()),
                SearchAnswer::Answered { outcome, report } => {
                    print_report(&report);
                    for result in outcome.results.iter().filter(|r| !r.link.is_empty()) {
                        println!("  {} {}", "-".dimmed(), result.link.dimmed());
                    }
                }
            }
        }
        Command::New => {
            state.chat = store.create_session().await;
            println!("Started a new chat.");
        }
        Command::List => {
            let current = store.current_session_id().await;
            for (i, session) in store.sessions().await.iter().enumerate() {
                println!(
                    "{}",
                    session_line(i + 1, session, current.as_ref() == Some(&session.id))
                );
            }
        }
        Command::Select(n) => {
            let session = nth_session(&**store, n).await?;
            store.select_session(&session.id).await;
            state.chat = session.id;
            state.attachments.clear();
            println!("Switched to {} ({} messages).", session.title.bold(), session.messages.len());
        }
        Command::Delete(n) => {
            let session = nth_session(&**store, n).await?;
            store.delete_session(&session.id).await;
            println!("Deleted {}.", session.title.bold());
            if session.id == state.chat {
                state.chat = store.ensure_session().await;
            }
        }
        Command::Title(title) => {
            store.update_title(&state.chat, title).await;
            println!("Renamed to {}.", title.bold());
        }
        Command::Model(None) => {
            let selected = app.settings.selected_model().await;
            for model in app.client.list_models().await? {
                let marker = if selected.as_deref() == Some(model.name.as_str()) {
                    "*"
                } else {
                    " "
                };
                println!("{marker} {}", model.name);
            }
        }
        Command::Model(Some(name)) => select_model(app, name).await?,
        Command::Context(None) => {
            let model = app.settings.selected_model().await.unwrap_or_default();
            let current = app.settings.context_size().await;
            let sizes: Vec<String> = app
                .settings
                .available_context_sizes(&model)
                .await
                .into_iter()
                .map(|s| s.to_string())
                .collect();
            println!(
                "Context size: {} (available: {})",
                format_context_size(u64::from(current)),
                sizes.join(", ")
            );
        }
        Command::Context(Some(size)) => {
            let model = app.settings.selected_model().await.unwrap_or_default();
            let available = app.settings.available_context_sizes(&model).await;
            if !available.contains(&size) {
                return Err(ParleyError::InvalidRequest(format!(
                    "context size {size} is not available for this model"
                )));
            }
            app.settings.set_context_size(size).await?;
            println!("Context size set to {}.", format_context_size(u64::from(size)));
        }
        Command::Attach(Some(path)) => {
            let path = PathBuf::from(path);
            if !path.is_file() {
                return Err(ParleyError::InvalidRequest(format!(
                    "{} is not a readable file",
                    path.display()
                )));
            }
            println!("Attached {}.", path.display());
            state.attachments.push(path);
        }
        Command::Attach(None) => {
            if state.attachments.is_empty() {
                println!("No attachments.");
            }
            for path in &state.attachments {
                println!("  {}", path.display());
            }
        }
        Command::Detach => {
            state.attachments.clear();
            println!("Attachments cleared.");
        }
        Command::Usage => {
            let usage = controller.usage(&state.chat, "", &state.attachments).await;
            let percent = format!("{}%", usage.percent);
            let percent = match usage.level {
                UsageLevel::Low => percent.green(),
                UsageLevel::Moderate => percent.yellow(),
                UsageLevel::High => percent.truecolor(255, 140, 0),
                UsageLevel::Critical => percent.red(),
            };
            println!("{} ({percent})", usage.describe());
        }
        Command::Help => println!("{HELP}"),
        Command::Invalid(message) => println!("{}", message.yellow()),
        Command::Quit => {}
    }
    Ok(())
}

async fn select_model(app: &App, name: &str) -> Result<(), ParleyError> {
    app.settings.set_selected_model(name).await?;
    app.refresh_model_info(name).await;

    let available = app.settings.available_context_sizes(name).await;
    let current = app.settings.context_size().await;
    if !available.contains(&current) {
        if let Some(&largest) = available.last() {
            app.settings.set_context_size(largest).await?;
        }
    }
    println!(
        "Model set to {} (context {}).",
        name.bold(),
        format_context_size(u64::from(app.settings.context_size().await))
    );
    Ok(())
}

async fn nth_session(
    store: &dyn ConversationStore,
    n: usize,
) -> Result<parley_core::ChatSession, ParleyError> {
    store
        .sessions()
        .await
        .into_iter()
        .nth(n - 1)
        .ok_or_else(|| ParleyError::InvalidRequest(format!("no chat number {n}")))
}

/// Prints fragments as they arrive until `turn` finishes. Ctrl+C stops the
/// generation running in `chat`.
async fn stream_to_stdout<T>(
    controller: &ChatController,
    chat: &SessionId,
    turn: impl Future<Output = T>,
    mut fragments: mpsc::UnboundedReceiver<String>,
) -> T {
    tokio::pin!(turn);
    let mut stdout = std::io::stdout();
    let result = loop {
        tokio::select! {
            result = &mut turn => break result,
            Some(fragment) = fragments.recv() => {
                print!("{fragment}");
                let _ = stdout.flush();
            }
            _ = tokio::signal::ctrl_c() => {
                let cancelled = controller.cancel(chat);
                debug!(session_id = %chat, cancelled, "interrupt received");
            }
        }
    };
    while let Ok(fragment) = fragments.try_recv() {
        print!("{fragment}");
    }
    let _ = stdout.flush();
    result
}

fn print_report(report: &GenerationReport) {
    match report.state {
        GenerationState::Completed => println!(),
        GenerationState::Cancelled if report.message_id.is_some() => {
            println!("{}", STOPPED_MARKER.dimmed());
        }
        GenerationState::Cancelled => println!("{}", "generation cancelled".dimmed()),
        _ => {
            println!();
            if report.text == ERROR_NOTICE {
                println!("{}", ERROR_NOTICE.red());
            }
            if let Some(e) = &report.error {
                eprintln!("{}: {e}", "error".red());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_sent() {
        assert_eq!(parse_command("  hello there "), Command::Send("hello there"));
    }

    #[test]
    fn commands_with_arguments() {
        assert_eq!(parse_command("/select 2"), Command::Select(2));
        assert_eq!(parse_command("/delete 1"), Command::Delete(1));
        assert_eq!(parse_command("/title  My chat "), Command::Title("My chat"));
        assert_eq!(parse_command("/model llama3:8b"), Command::Model(Some("llama3:8b")));
        assert_eq!(parse_command("/model"), Command::Model(None));
        assert_eq!(parse_command("/context 8192"), Command::Context(Some(8192)));
        assert_eq!(parse_command("/attach ./notes.md"), Command::Attach(Some("./notes.md")));
        assert_eq!(parse_command("/search rust async"), Command::Search("rust async"));
        assert_eq!(parse_command("/exit"), Command::Quit);
    }

    #[test]
    fn bad_arguments_are_reported() {
        assert!(matches!(parse_command("/select zero"), Command::Invalid(_)));
        assert!(matches!(parse_command("/select 0"), Command::Invalid(_)));
        assert!(matches!(parse_command("/context -1"), Command::Invalid(_)));
        assert!(matches!(parse_command("/search"), Command::Invalid(_)));
        assert!(matches!(parse_command("/title"), Command::Invalid(_)));
        assert!(matches!(parse_command("/frobnicate"), Command::Invalid(m) if m.contains("/help")));
    }
}
