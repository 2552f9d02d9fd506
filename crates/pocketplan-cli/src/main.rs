//! PocketPlan CLI - Monthly budget chart with AI savings tips
//!
//! Usage:
//!   pocketplan                  Interactive session (needs OPENAI_API_KEY for tips)
//!   pocketplan --no-chart       Print the allocation as a table
//!   pocketplan --model gpt-4o   Use a different chat model
//!   pocketplan --check          Check the tips backend connection and exit

mod chart;
mod cli;
mod commands;
mod terminal;


use std::io::{self, IsTerminal};

use anyhow::Result;
use clap::Parser;
use pocketplan_core::{AIClient, PromptLibrary};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use chart::ChartMode;
use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (warn, so the
    // prompts stay readable)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .compact()
                .with_writer(io::stderr),
        )
        .init();

    let mode = if cli.no_chart || !io::stdout().is_terminal() {
        ChartMode::Text
    } else {
        ChartMode::Terminal
    };

    let mut client = AIClient::from_env();
    if let Some(ref model) = cli.model {
        client = client.with_model(model);
    }
    if let Some(ref api_base) = cli.api_base {
        client = client.with_host(api_base);
    }

    let mut stdout = io::stdout();
    if cli.check {
        if !commands::cmd_check(&mut stdout, &client).await? {
            std::process::exit(1);
        }
        return Ok(());
    }

    let mut prompts = PromptLibrary::new();
    commands::run_session(io::stdin().lock(), &mut stdout, client, &mut prompts, mode).await?;

    Ok(())
}
