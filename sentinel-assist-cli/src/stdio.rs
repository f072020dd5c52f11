use sentinel_assist_core::application::bootstrap::build_orchestrator;
use sentinel_assist_core::{
    AgentError, AppConfig, BootstrapError, Orchestrator, ProgressEvent,
    application::agent::{DISCLAIMER, HISTORY_TRIMMED_WARNING},
};
use thiserror::Error;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

const BANNER: &str = "\
Sentinel AI Assistant
Query incidents, alerts, trends and entities using natural language.
Type /help for commands.";

const HELP: &str = "\
/clear    summarise and reset the conversation
/history  show how many turns are in memory
/help     show this list
/quit     leave (also /exit)
Ctrl-C cancels a running question.";

const GOODBYE: &str = "Goodbye.";

#[derive(Debug, Error)]
pub enum StdioError {
    #[error("stdin/stdout I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{}", .0.user_message())]
    Bootstrap(#[from] BootstrapError),
}

#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Empty,
    Quit,
    Clear,
    Help,
    History,
    UnknownCommand(&'a str),
    Question(&'a str),
}

fn classify(line: &str) -> Input<'_> {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    if !line.starts_with('/') {
        return Input::Question(line);
    }
    match line.to_lowercase().as_str() {
        "/quit" | "/exit" => Input::Quit,
        "/clear" => Input::Clear,
        "/help" => Input::Help,
        "/history" => Input::History,
        _ => Input::UnknownCommand(line),
    }
}

/// Interactive chat on stdin/stdout. Progress and diagnostics go to stderr.
pub async fn run(config: &AppConfig) -> Result<(), StdioError> {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut agent = build_orchestrator(config)?.with_progress(tx);
    let printer = tokio::spawn(print_progress(rx));

    eprintln!("{BANNER}\n{DISCLAIMER}\n");
    let mut lines = BufReader::new(io::stdin()).lines();
    let mut stdout = io::stdout();

    loop {
        stdout.write_all(b"\nYou: ").await?;
        stdout.flush().await?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            write_line(&mut stdout, &format!("\n{GOODBYE}")).await?;
            break;
        };

        match classify(&line) {
            Input::Empty => continue,
            Input::Quit => {
                write_line(&mut stdout, GOODBYE).await?;
                break;
            }
            Input::Help => write_line(&mut stdout, HELP).await?,
            Input::History => {
                let turns = agent.history_len();
                write_line(&mut stdout, &format!("{turns} turn(s) in memory.")).await?;
            }
            Input::UnknownCommand(command) => {
                write_line(&mut stdout, &format!("Unknown command {command}. Type /help.")).await?;
            }
            Input::Clear => clear(&mut agent, &mut stdout).await?,
            Input::Question(question) => ask(&mut agent, &mut stdout, question).await?,
        }
    }

    drop(agent);
    let _ = printer.await;
    info!("Chat session ended");
    Ok(())
}

async fn ask(
    agent: &mut Orchestrator,
    stdout: &mut io::Stdout,
    question: &str,
) -> Result<(), StdioError> {
    let cancel = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    match agent.send_message_or_cancel(question, cancel).await {
        Ok(outcome) => {
            debug!(rounds = outcome.rounds, model_calls = outcome.model_calls, "Turn finished");
            let mut text = format!("\nAssistant: {}", outcome.response);
            if !outcome.footer.is_empty() {
                text.push_str("\n\n");
                text.push_str(&outcome.footer);
            }
            write_line(stdout, &text).await?;
        }
        Err(AgentError::Cancelled) => {
            eprintln!("\nCancelled. The conversation is unchanged.");
        }
        Err(err) => {
            warn!(%err, "Turn failed");
            eprintln!("\nError: {}", err.user_message());
        }
    }
    Ok(())
}

async fn clear(agent: &mut Orchestrator, stdout: &mut io::Stdout) -> Result<(), StdioError> {
    match agent.clear().await {
        Ok(summary) => {
            // Clear the terminal and move the cursor home.
            stdout.write_all(b"\x1b[2J\x1b[H").await?;
            eprintln!("{BANNER}\n");
            write_line(
                stdout,
                &format!("--- Conversation cleared ---\n\nSummary of previous conversation:\n{summary}\n"),
            )
            .await?;
        }
        Err(err) => {
            warn!(%err, "Clear failed");
            eprintln!("\nError: {}", err.user_message());
        }
    }
    Ok(())
}

async fn print_progress(mut rx: mpsc::UnboundedReceiver<ProgressEvent>) {
    while let Some(event) = rx.recv().await {
        match event {
            ProgressEvent::ToolStarted { status, .. } => eprintln!("  {status}"),
            ProgressEvent::RoundLimitReached { rounds } => {
                eprintln!("  Reached {rounds} rounds of tool calls, preparing an answer...")
            }
            ProgressEvent::HistoryTrimmed { .. } => eprintln!("  {HISTORY_TRIMMED_WARNING}"),
        }
    }
}

async fn write_line(stdout: &mut io::Stdout, text: &str) -> Result<(), StdioError> {
    stdout.write_all(text.as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await?;
    Ok(())
}
