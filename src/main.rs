use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fxdca::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for fxdca::AppCommand {
    fn from(cmd: Commands) -> fxdca::AppCommand {
        match cmd {
            Commands::Plan => fxdca::AppCommand::Plan,
            Commands::Next => fxdca::AppCommand::Next,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Evaluate today's purchase plan and send the notification
    Plan,
    /// Show the next regular contribution day
    Next,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => fxdca::cli::setup::setup(),
        Some(cmd) => fxdca::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
