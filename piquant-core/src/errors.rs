use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Can't read file: {0}")]
    FileReadError(String),

    #[error("Error parsing GTF line {line}: {reason}")]
    GtfParseError { line: usize, reason: String },

    #[error("Error parsing expression profile line {line}: {reason}")]
    ProfileParseError { line: usize, reason: String },

    #[error("Expression profile is empty: {0}")]
    EmptyProfile(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
