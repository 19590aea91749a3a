//! Stockroom - inventory back office
//!
//! Each invocation runs one command against the local store and prints a
//! JSON envelope on stdout. Logs go to stderr.

use std::process::ExitCode;

use clap::Parser;
use stockroom_core::Envelope;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;
mod commands;
mod state;

fn print(value: &serde_json::Value, pretty: bool) {
    let text = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    match text {
        Ok(text) => println!("{text}"),
        Err(e) => tracing::error!("Failed to render output: {}", e),
    }
}

fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stockroom=info")))
        .init();

    let result = state::AppState::new(cli.config.as_deref())
        .and_then(|state| commands::run(cli.command, cli.token.as_deref(), &state.stockroom));

    match result {
        Ok(value) => {
            print(&value, cli.pretty);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::debug!("Command failed: {}", e);
            let envelope = Envelope::<()>::error(&e);
            match serde_json::to_value(&envelope) {
                Ok(value) => print(&value, cli.pretty),
                Err(e) => tracing::error!("Failed to render error: {}", e),
            }
            ExitCode::FAILURE
        }
    }
}
