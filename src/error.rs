//! Shop Client Errors
//!
//! Every failure reaches the operator as one line on the console's error
//! stream. The stable codes from [`ShopError::error_code`] are for tests and
//! log fields.
//!
//! # Categories
//! - `ConnectionFailed`: the session connection could not be opened (fatal at startup)
//! - `QueryFailed`: a statement or query was rejected by the database
//! - `InvalidInput`: operator input that cannot become a bound value
//! - `EngineError`: driver-level failure outside a statement (closing, sequences)
//! - `ConfigError`: bad command-line connection arguments
//! - `MissingValue`: a query returned nothing where a value was required
//! - `NotImplemented`: menu entries with no backing logic
//! - `InputClosed`: the operator's input stream ended
//! - `Io`: console read/write failure

use thiserror::Error;

/// Error type for the shop client
#[derive(Error, Debug)]
pub enum ShopError {
    #[error("Unable to connect to database: {0}")]
    ConnectionFailed(String),

    #[error("Statement failed: {0}")]
    QueryFailed(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{engine} driver error: {detail}")]
    EngineError { engine: String, detail: String },

    #[error("Bad connection arguments: {0}")]
    ConfigError(String),

    #[error("Missing value: {0}")]
    MissingValue(String),

    #[error("{0} is not implemented")]
    NotImplemented(String),

    #[error("Input stream closed")]
    InputClosed,

    #[error("Console I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ShopError {
    /// Stable code for this error's category
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::ConnectionFailed(_) => "CONNECTION_FAILED",
            Self::QueryFailed(_) => "QUERY_FAILED",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::EngineError { .. } => "ENGINE_ERROR",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::MissingValue(_) => "MISSING_VALUE",
            Self::NotImplemented(_) => "NOT_IMPLEMENTED",
            Self::InputClosed => "INPUT_CLOSED",
            Self::Io(_) => "IO_ERROR",
        }
    }

    /// Text shown to the operator
    ///
    /// The connection password is never formatted into an error.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    pub fn connection_failed(detail: impl Into<String>) -> Self {
        Self::ConnectionFailed(detail.into())
    }

    pub fn query_failed(detail: impl Into<String>) -> Self {
        Self::QueryFailed(detail.into())
    }

    pub fn invalid_input(detail: impl Into<String>) -> Self {
        Self::InvalidInput(detail.into())
    }

    pub fn engine_error(engine: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::EngineError { engine: engine.into(), detail: detail.into() }
    }

    pub fn config_error(detail: impl Into<String>) -> Self {
        Self::ConfigError(detail.into())
    }

    pub fn missing_value(detail: impl Into<String>) -> Self {
        Self::MissingValue(detail.into())
    }

    /// Not-implemented error naming the menu workflow
    pub fn not_implemented(workflow: impl Into<String>) -> Self {
        Self::NotImplemented(workflow.into())
    }
}

/// Result alias for shop client operations
pub type Result<T> = std::result::Result<T, ShopError>;
