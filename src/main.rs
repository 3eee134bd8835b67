//! Oraichain Agent Kit CLI
//!
//! Lists the agent actions and runs them against a CometBFT endpoint.

use clap::{Parser, Subcommand};
use oraichain_agent_kit::{
    default_registry, ActionResponse, Config, Error, OraichainAgentKit, Result, RpcConfig,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "orai-agent")]
#[command(about = "Signer-less Oraichain agent kit")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List every action with its description and input schema
    Actions,

    /// Run one action and print its response envelope
    Call {
        /// Action name, e.g. TOKEN_BALANCE_ACTION
        name: String,

        /// Action input as a JSON object
        #[arg(short, long, default_value = "{}")]
        args: String,
    },

    /// Show current configuration
    Config,
}

fn init_logging(verbose: bool, json: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| fmt::layer().with_writer(std::io::stderr)))
        .with(filter)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(path),
        None => Ok(Config {
            rpc: RpcConfig::from_env(),
            ..Config::default()
        }),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore if not found)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose, cli.json_logs);

    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::Actions => {
            let kit = Arc::new(OraichainAgentKit::connect(config)?);
            let registry = default_registry(kit);
            println!("{}", serde_json::to_string_pretty(&registry.descriptors())?);
        }
        Commands::Call { name, args } => {
            let response = match serde_json::from_str(&args) {
                Ok(args) => {
                    let kit = Arc::new(OraichainAgentKit::connect(config)?);
                    default_registry(kit).call(&name, args).await
                }
                Err(e) => ActionResponse::from(Error::validation(
                    "input",
                    format!("a JSON document ({})", e),
                )),
            };
            println!("{}", serde_json::to_string_pretty(&response)?);
            if !response.is_success() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
