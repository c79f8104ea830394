pub mod cli;
pub mod core;
pub mod notify;
pub mod providers;

use crate::core::config::AppConfig;
use crate::notify::{ConsoleNotifier, DiscordNotifier, Notifier};
use crate::providers::yahoo_finance::YahooRateProvider;
use anyhow::Result;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Evaluate today's purchase plan, display it, and notify.
    Plan,
    /// Show the next regular contribution day.
    Next,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("fxdca starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    match command {
        AppCommand::Plan => {
            let provider = YahooRateProvider::new(config.yahoo_base_url());
            let notifier: Box<dyn Notifier> = match config.webhook_url() {
                Some(url) => Box::new(DiscordNotifier::new(&url)),
                None => Box::new(ConsoleNotifier),
            };
            cli::plan::run(&config, &provider, notifier.as_ref()).await
        }
        AppCommand::Next => cli::next::run(&config),
    }
}
