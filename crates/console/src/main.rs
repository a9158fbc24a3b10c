use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use modguard_events::NotificationBus;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod config;
mod render;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so that `--json` output on stdout stays parseable.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "modguard=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = cli::Cli::parse();
    let config = config::ConsoleConfig::from_env();

    let bus = Arc::new(NotificationBus::default());
    let mut notifications = bus.subscribe();

    let result = commands::run(cli, &config, bus).await;

    while let Ok(notification) = notifications.try_recv() {
        eprintln!("{}", render::notification(&notification));
    }

    match result {
        Ok(()) => Ok(ExitCode::SUCCESS),
        // The notification printed above is all the user needs to see.
        Err(e) if e.is::<commands::Reported>() => Ok(ExitCode::FAILURE),
        Err(e) => Err(e),
    }
}
