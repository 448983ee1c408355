#![deny(missing_docs)]

//! # CLI Errors
//!
//! Error types for the CLI crate.

use derive_more::{Display, From};
use paramstyle_core::ParamError;

/// Main error enum for CLI operations.
#[derive(Debug, Display, From)]
pub enum CliError {
    /// IO Error wrapper.
    #[display("IO Error: {}", _0)]
    Io(std::io::Error),

    /// Parameter metadata or value was rejected.
    #[display("{}", _0)]
    Param(ParamError),

    /// JSON output failed.
    #[display("JSON Error: {}", _0)]
    Json(serde_json::Error),

    /// YAML output failed.
    #[display("YAML Error: {}", _0)]
    Yaml(serde_yaml::Error),

    /// Bad command line input.
    #[display("Operation failed: {}", _0)]
    General(String),
}

impl std::error::Error for CliError {}

/// Result type alias.
pub type CliResult<T> = Result<T, CliError>;
