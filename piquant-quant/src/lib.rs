//! Quantification tools and the scripts that run them.
//!
//! A [Quantifier] writes its preparation and quantification commands into a
//! run's `run_quantification.sh` and reads back the abundances it produced,
//! as [TranscriptAbundances].

pub mod abundances;
pub mod errors;
pub mod quantifiers;
pub mod script;

// re-exports
pub use abundances::TranscriptAbundances;
pub use errors::QuantError;
pub use quantifiers::{QuantInputs, Quantifier, quantifier_for};
pub use script::{QuantScriptConfig, check_quantifier_preconditions, write_quantification_script};
