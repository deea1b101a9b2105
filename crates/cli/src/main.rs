// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `amelia` — CLI surface over a running amelia-api server.

mod client;
mod color;
mod commands;
mod driver_factory;
mod exit_error;
mod output;

use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use commands::config::ConfigArgs;
use commands::run::RunArgs;
use commands::server::ServerArgs;
use commands::start::StartArgs;
use exit_error::ExitError;
use output::OutputFormat;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "+", env!("BUILD_GIT_HASH"));

#[derive(Parser)]
#[command(name = "amelia", version = VERSION, about = "Orchestrates agentic coding workflows")]
struct Cli {
    /// Base URL of the amelia-api server
    #[arg(long, global = true, env = "AMELIA_API_URL", default_value = "http://127.0.0.1:8420")]
    api_url: String,

    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run or inspect the amelia-api server process
    Server(ServerArgs),
    /// Create (and optionally start) a workflow
    Start(StartArgs),
    /// Create, start, and follow a workflow's events until it finishes
    Run(RunArgs),
    /// Inspect and edit server settings and profiles
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() {
    let matches = Cli::command().styles(color::styles()).get_matches();
    let cli = match Cli::from_arg_matches(&matches) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };

    let result = match cli.command {
        Commands::Server(args) => commands::server::server(args, cli.output, &cli.api_url).await,
        Commands::Start(args) => commands::start::start(args, cli.output, &cli.api_url).await,
        Commands::Run(args) => commands::run::run(args, cli.output, &cli.api_url).await,
        Commands::Config(args) => commands::config::config(args, cli.output, &cli.api_url).await,
    };

    if let Err(e) = result {
        if let Some(exit_error) = e.downcast_ref::<ExitError>() {
            eprintln!("{}", exit_error);
            std::process::exit(exit_error.code);
        }
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
