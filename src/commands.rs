use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::error::AppResult;
use crate::network::{ChangePoller, IwInspector, NetworkWatcher, WifiInspector};
use crate::runtime::{JobOutcome, LoginJob};
use crate::state::AppState;

#[derive(Parser)]
#[command(
    name = "portalwatch",
    version,
    about = "Automatic captive-portal login for the MMMUT campus network"
)]
pub struct Cli {
    /// Store credentials in the preference file instead of the platform keyring
    #[arg(long, global = true)]
    pub plain_store: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Watch for campus WiFi association and log in automatically
    Run,
    /// Perform a single login attempt now
    Login,
    /// Save the portal credentials
    Credentials {
        roll_number: String,
        password: String,
    },
    /// Turn automatic login on
    Enable,
    /// Turn automatic login off
    Disable,
    /// Show the stored settings and the last attempt
    Status,
}

pub async fn dispatch(command: Command, state: &AppState) -> AppResult<ExitCode> {
    match command {
        Command::Run => run(state).await,
        Command::Login => login(state).await,
        Command::Credentials {
            roll_number,
            password,
        } => {
            state
                .store
                .save_credentials(Some(&roll_number), Some(&password));
            println!("Credentials saved");
            Ok(ExitCode::SUCCESS)
        }
        Command::Enable => {
            state.store.set_auto_login_enabled(true);
            println!("Auto-login enabled");
            Ok(ExitCode::SUCCESS)
        }
        Command::Disable => {
            state.store.set_auto_login_enabled(false);
            println!("Auto-login disabled");
            Ok(ExitCode::SUCCESS)
        }
        Command::Status => {
            status(state);
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run(state: &AppState) -> AppResult<ExitCode> {
    let inspector: Arc<dyn WifiInspector> = Arc::new(IwInspector);
    let watcher = Arc::new(NetworkWatcher::new(
        Arc::clone(&state.store),
        Arc::clone(&state.portal),
        Arc::clone(&inspector),
        Arc::clone(&state.scheduler),
    ));
    let poller = ChangePoller::new(
        inspector,
        Duration::from_secs(state.config.network.poll_interval_secs),
    );

    info!("Watching for campus WiFi association");
    tokio::select! {
        _ = poller.watch(watcher) => {}
        result = tokio::signal::ctrl_c() => {
            result.map_err(|e| anyhow::anyhow!("Failed to listen for shutdown signal: {}", e))?;
            info!("Shutting down");
        }
    }

    Ok(ExitCode::SUCCESS)
}

async fn login(state: &AppState) -> AppResult<ExitCode> {
    let job = LoginJob::new(Arc::clone(&state.store), Arc::clone(&state.portal));
    let outcome = job.run().await;

    let message = state
        .store
        .last_login_result()
        .unwrap_or_else(|| "No result recorded".to_string());
    println!("{}", message);

    Ok(match outcome {
        JobOutcome::Success => ExitCode::SUCCESS,
        JobOutcome::Failure => ExitCode::FAILURE,
    })
}

fn status(state: &AppState) {
    let store = &state.store;
    println!(
        "Auto-login:   {}",
        if store.auto_login_enabled() {
            "enabled"
        } else {
            "disabled"
        }
    );
    if store.has_credentials() {
        println!("Credentials:  saved (roll number {})", store.roll_number());
    } else {
        println!("Credentials:  not saved");
    }
    match (store.last_login_time(), store.last_login_result()) {
        (Some(time), Some(result)) => println!("Last attempt: {} ({})", time, result),
        _ => println!("Last attempt: never"),
    }
}
