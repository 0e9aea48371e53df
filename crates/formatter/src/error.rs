//! Error types for the formatter

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("Invalid test case: command #{index} {reason}")]
    InvalidTestCase { index: usize, reason: String },

    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

pub type FormatResult<T> = Result<T, FormatError>;
