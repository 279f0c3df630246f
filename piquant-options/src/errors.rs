use thiserror::Error;

#[derive(Error, Debug)]
pub enum OptionError {
    #[error("Invalid value '{value}' for option --{option}: {reason}")]
    InvalidOption {
        option: String,
        value: String,
        reason: String,
    },

    #[error("No value supplied for option --{0}")]
    MissingOption(String),

    #[error("Unknown option '{flag}' in parameters file at line {line}")]
    UnknownOption { line: usize, flag: String },

    #[error("Run name '{0}' does not match the supplied options")]
    InvalidRunName(String),

    #[error("No runs to process: no parameter values were supplied")]
    EmptyParameterSpace,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl OptionError {
    pub fn invalid(option: &str, value: &str, reason: impl Into<String>) -> Self {
        OptionError::InvalidOption {
            option: option.replace('_', "-"),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}
