//! Core data model shared by the piquant crates.
//!
//! This crate knows how to read the reference inputs of a benchmark (GTF
//! transcript models) and the ground truth written by the read simulator
//! (the expression profile), and holds the file and column names every
//! other crate agrees on.

pub mod consts;
pub mod errors;
#[cfg(feature = "dataframe")]
pub mod frames;
pub mod gtf;
pub mod models;
pub mod utils;

// re-exports
pub use errors::CoreError;
pub use gtf::{ExonRecord, read_gtf_exons};
pub use models::{Exon, ExpressionProfile, ProfileRow, Strand};
