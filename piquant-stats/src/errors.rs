use thiserror::Error;

use piquant_options::OptionError;

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("Missing column '{column}' in {file}")]
    MissingColumn { file: String, column: String },

    #[error(transparent)]
    Options(#[from] OptionError),

    #[error(transparent)]
    Polars(#[from] polars::error::PolarsError),

    #[error(transparent)]
    Table(#[from] anyhow::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
