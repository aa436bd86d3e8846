//! Mechanic Shop CLI Entry Point
//!
//! Usage: `mechanic-shop DBNAME PORT USER [--host HOST] [--engine postgres|sqlite]`
//!
//! Connects once, runs the interactive main menu on stdin/stdout until the
//! operator exits or input ends, then disconnects. Logs go to stderr.

use anyhow::{anyhow, Result};
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use mechanic_shop::config::{self, EngineKind, ShopArgs};
use mechanic_shop::{run_menu, ConnectionConfig, Console, DatabaseEngine, ShopClient};

/// Interactive client for the mechanic shop database
#[derive(Parser)]
#[command(name = "mechanic-shop")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    args: ShopArgs,

    /// Enable debug logging (unless RUST_LOG is set)
    #[arg(long)]
    debug: bool,
}

fn init_tracing(debug: bool) -> Result<()> {
    let default_level = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(debug)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.debug)?;

    let config = config::resolve(&cli.args)?;

    match cli.args.engine {
        #[cfg(feature = "postgres")]
        EngineKind::Postgres => {
            run_session::<mechanic_shop::engine::postgres::PostgresEngine>(&config).await
        }
        #[cfg(feature = "sqlite")]
        EngineKind::Sqlite => {
            run_session::<mechanic_shop::engine::sqlite::SqliteEngine>(&config).await
        }
        #[allow(unreachable_patterns)]
        other => Err(anyhow!("engine '{other:?}' is not enabled in this build")),
    }
}

/// Run one connected session
///
/// Connection and menu failures are reported here, once, and become a
/// failing exit code.
async fn run_session<E: DatabaseEngine>(config: &ConnectionConfig) -> Result<ExitCode> {
    print!("Connecting to database...");
    println!("Connection URL: {}\n", config.display_url());

    let mut client = match ShopClient::<E>::connect(config).await {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error - Unable to Connect to Database: {e}");
            println!("Make sure you started postgres on this machine");
            return Ok(ExitCode::FAILURE);
        }
    };
    println!("Done");

    let mut console = Console::stdio();
    let outcome = run_menu(&mut client, &mut console).await;
    if let Err(e) = &outcome {
        tracing::debug!(code = e.error_code(), "menu ended with an error");
        eprintln!("{e}");
    }

    print!("Disconnecting from database...");
    client.disconnect().await;
    println!("Done\n\nBye !");

    Ok(if outcome.is_ok() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
