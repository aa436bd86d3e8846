//! Mechanic Shop - Interactive Database Client
//!
//! A menu-driven console client for a car-repair shop database. An operator
//! registers customers, mechanics and cars, opens service requests, and runs
//! a few fixed listings against a single PostgreSQL (or SQLite) connection
//! held for the whole session.
//!
//! # Module Organization
//! - [`error`] - Error types and handling
//! - [`engine`] - Database engine trait and implementations
//! - [`client`] - Session facade over one open engine connection
//! - [`output`] - Result-set text rendering
//! - [`console`] - Operator input/output handle
//! - [`workflow`] - One function per menu entry, plus the menu loop
//! - [`config`] - Command-line connection arguments

pub mod client;
pub mod config;
pub mod console;
pub mod engine;
pub mod error;
pub mod output;
pub mod workflow;

pub use client::ShopClient;
pub use console::Console;
pub use engine::{ConnectionConfig, DatabaseEngine, DatabaseType, QueryResult, SqlValue};
pub use error::{Result, ShopError};
pub use workflow::{run_menu, MenuChoice};
