//! Error types for Sound Manager.

use std::io;

/// Errors produced by the shell and its sound backends.
#[derive(Debug, thiserror::Error)]
pub enum SoundError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("sound backend error: {0}")]
    Backend(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl SoundError {
    /// Whether the error is a user mistake at the prompt (bad input) rather
    /// than a failure of the machinery behind a command.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::InvalidArgument(_) | Self::UnknownCommand(_))
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, SoundError>;
