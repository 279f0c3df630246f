use thiserror::Error;

use piquant_core::CoreError;
use piquant_options::OptionError;

#[derive(Error, Debug)]
pub enum ScriptError {
    #[error(transparent)]
    Options(#[from] OptionError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Invalid position weight matrix at line {line}: {reason}")]
    InvalidPwm { line: usize, reason: String },

    #[error("Truncated read record at line {0}")]
    TruncatedRecord(usize),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
