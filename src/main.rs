use std::process::ExitCode;

use clap::Parser;
use commands::Cli;
use state::AppState;

extern crate pretty_env_logger;
#[macro_use]
extern crate log;

mod commands;
mod config;
mod error;
mod network;
mod runtime;
mod service;
mod state;
mod storage;

#[tokio::main]
async fn main() -> ExitCode {
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "info");
    }
    let _ = pretty_env_logger::try_init_timed();

    let cli = Cli::parse();

    let config = match config::build_config() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let state = match AppState::new(config, cli.plain_store) {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to initialize: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match commands::dispatch(cli.command, &state).await {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
