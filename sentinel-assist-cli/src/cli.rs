use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "sentinel-assist",
    version,
    about = "Ask questions about Microsoft Sentinel incidents in plain language"
)]
pub struct Cli {
    /// Configuration file (defaults to config/sentinel.toml)
    #[arg(long, global = true)]
    pub config: Option<String>,
    /// Silence diagnostic logging on stderr
    #[arg(long, short, global = true)]
    pub quiet: bool,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Interactive session (default)
    Chat,
    /// Verify configuration, model access and workspace access, then exit
    Check,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Chat)
    }
}
