//! Configuration Management
//!
//! The shop client is configured entirely from the command line: database
//! name, port and user are positional, host and engine are options. There is
//! no config file and no password (the server must accept a blank one).
//!
//! # Engines
//! - `postgres`: `DBNAME` is the database name on `--host:PORT`
//! - `sqlite`: `DBNAME` is the database file path (`:memory:` allowed);
//!   port and user are accepted for a uniform command line but unused

use clap::{Args, ValueEnum};
use std::path::PathBuf;

use crate::engine::ConnectionConfig;
use crate::error::{Result, ShopError};

/// Default PostgreSQL host
pub const DEFAULT_HOST: &str = "localhost";

/// Engine selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum EngineKind {
    /// PostgreSQL server (default)
    #[default]
    Postgres,
    /// SQLite database file
    Sqlite,
}

/// Connection arguments
#[derive(Debug, Clone, Args)]
pub struct ShopArgs {
    /// Database name (file path for --engine sqlite)
    #[arg(value_name = "DBNAME")]
    pub database: String,

    /// Server port
    #[arg(value_name = "PORT")]
    pub port: u16,

    /// Database user
    #[arg(value_name = "USER")]
    pub user: String,

    /// Server host
    #[arg(long, default_value = DEFAULT_HOST)]
    pub host: String,

    /// Database engine
    #[arg(long, value_enum, default_value_t = EngineKind::Postgres)]
    pub engine: EngineKind,
}

/// Turn parsed arguments into a connection configuration
///
/// # Errors
/// `ConfigError` if a required value is empty or the PostgreSQL port is 0.
pub fn resolve(args: &ShopArgs) -> Result<ConnectionConfig> {
    if args.database.trim().is_empty() {
        return Err(ShopError::config_error("database name must not be empty"));
    }

    match args.engine {
        EngineKind::Postgres => {
            if args.port == 0 {
                return Err(ShopError::config_error("port must be between 1 and 65535"));
            }
            if args.user.trim().is_empty() {
                return Err(ShopError::config_error("user must not be empty"));
            }
            if args.host.trim().is_empty() {
                return Err(ShopError::config_error("host must not be empty"));
            }
            Ok(ConnectionConfig::postgres(
                args.host.clone(),
                args.port,
                args.user.clone(),
                String::new(),
                args.database.clone(),
            ))
        }
        EngineKind::Sqlite => Ok(ConnectionConfig::sqlite(PathBuf::from(&args.database))),
    }
}
