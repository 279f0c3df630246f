use thiserror::Error;

use piquant_options::OptionError;
use piquant_scripts::ScriptError;

#[derive(Error, Debug)]
pub enum QuantError {
    #[error("Failed to parse {file} at line {line}: {reason}")]
    ResultsParseError {
        file: String,
        line: usize,
        reason: String,
    },

    #[error("Column '{column}' not found in {file}")]
    MissingColumn { file: String, column: String },

    #[error("{0} requires paired-end reads")]
    PairedEndRequired(String),

    #[error(transparent)]
    Options(#[from] OptionError),

    #[error(transparent)]
    Script(#[from] ScriptError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
