//! Output formatting for command results.

use crate::error::CliResult;
use serde::Serialize;

/// How results are printed.
#[derive(clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty printed JSON.
    #[default]
    Json,
    /// YAML document.
    Yaml,
    /// One line of plain text.
    Text,
}

/// A result with its structured and plain text renderings.
pub struct Output<'a, T: Serialize> {
    value: &'a T,
    text: String,
}

impl<'a, T: Serialize> Output<'a, T> {
    pub fn new(value: &'a T, text: String) -> Self {
        Self { value, text }
    }

    pub fn render(self, format: OutputFormat) -> CliResult<String> {
        match format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(self.value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(self.value)?),
            OutputFormat::Text => Ok(self.text),
        }
    }
}
