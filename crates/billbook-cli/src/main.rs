//! Billbook CLI - Household bills tracker
//!
//! Usage:
//!   billbook init                          Create the bills file
//!   billbook add --name Rent --due-day 1 --amount 1200
//!   billbook pay <id> --month 2024-02      Mark a bill paid
//!   billbook summary                       Totals for the current month
//!   billbook serve --port 3000             Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use billbook_core::BillsAssistant;
use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let data_path = commands::resolve_data_path(cli.data.as_deref())?;

    match cli.command {
        Commands::Init => commands::cmd_init(&data_path),
        Commands::Serve {
            port,
            host,
            static_dir,
            allow_origins,
        } => {
            commands::cmd_serve(
                &data_path,
                &host,
                port,
                static_dir.as_deref(),
                &allow_origins,
            )
            .await
        }
        Commands::Status => commands::cmd_status(&data_path),
        Commands::Export => {
            let store = commands::open_store(&data_path)?;
            commands::cmd_export(&store)
        }
        Commands::List { month } => {
            let store = commands::open_store(&data_path)?;
            commands::cmd_list(&store, month.as_deref())
        }
        Commands::Add {
            name,
            due_day,
            amount,
            notes,
            one_time,
            id,
        } => {
            let store = commands::open_store(&data_path)?;
            let bill = commands::NewBillArgs {
                id,
                name,
                due_day,
                amount,
                notes,
                one_time,
            };
            commands::cmd_add(&store, bill)
        }
        Commands::Remove { id } => {
            let store = commands::open_store(&data_path)?;
            commands::cmd_remove(&store, &id)
        }
        Commands::Pay { id, month } => {
            let store = commands::open_store(&data_path)?;
            commands::cmd_set_paid(&store, &id, month.as_deref(), true)
        }
        Commands::Unpay { id, month } => {
            let store = commands::open_store(&data_path)?;
            commands::cmd_set_paid(&store, &id, month.as_deref(), false)
        }
        Commands::Summary { month } => {
            let store = commands::open_store(&data_path)?;
            commands::cmd_summary(&store, month.as_deref())
        }
        Commands::Ask { question, month } => {
            let store = commands::open_store(&data_path)?;
            let assistant = BillsAssistant::from_env();
            commands::cmd_ask(&store, &assistant, &question, month.as_deref()).await
        }
    }
}
