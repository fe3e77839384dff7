// fuego-wallet/src/main.rs
mod commands;
mod wallet {
    pub mod config;
    pub mod constants;
    pub mod contacts;
    pub mod core;
    pub mod executor;
    pub mod paths;
    pub mod process;
    pub mod storage;
}

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use fuego_core::WalletError;
use log::{debug, LevelFilter};

use crate::commands::{print_error, print_warning, run_command, Commands};
use crate::wallet::core::{Core, Overrides};
use crate::wallet::executor::ExecutorMode;
use crate::wallet::paths::FuegoPaths;

/// Fuego CLI: a sovereign Solana wallet for AI agents.
#[derive(Parser, Debug)]
#[command(name = "fuego", author, version, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Data directory (default: ~/.fuego)
    #[arg(short, long, global = true, env = "FUEGO_HOME")]
    directory: Option<PathBuf>,

    /// RPC endpoint, overriding the configured rpcUrl
    #[arg(long, global = true, env = "FUEGO_RPC_URL")]
    rpc_url: Option<String>,

    /// How balances and transfers are executed: rpc, server or script
    #[arg(long, global = true, env = "FUEGO_EXECUTOR")]
    executor: Option<ExecutorMode>,

    #[command(subcommand)]
    command: Commands,
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(default)
        .parse_default_env()
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let paths = FuegoPaths::from_env(cli.directory)?;
    debug!("Using data directory {:?}", paths.data_dir());

    let core = Core::new(
        paths,
        Overrides {
            rpc_url: cli.rpc_url,
            executor: cli.executor,
        },
    );
    run_command(&core, cli.command).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if !e.use_stderr() => {
            // --help and --version
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            let _ = e.print();
            return ExitCode::FAILURE;
        }
    };
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!("Command failed: {:?}", e);
            match e.downcast_ref::<WalletError>() {
                Some(WalletError::AlreadyExists(message)) => print_warning(message),
                _ => print_error(&format!("{:#}", e)),
            }
            ExitCode::FAILURE
        }
    }
}
