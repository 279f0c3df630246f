//! Options for piquant runs.
//!
//! Two families of options exist. *Run options* take a single value
//! (directories, reference files, thresholds). *Quant-run options* take a
//! comma separated list of values, and the Cartesian product of those
//! lists defines the set of benchmark runs, each of which is named by
//! joining the file-name form of its values.

pub mod errors;
pub mod options;
pub mod parameters;
pub mod params_file;
pub mod run_options;
pub mod values;

// re-exports
pub use errors::OptionError;
pub use options::{QuantRunOption, RunOption};
pub use parameters::{ParameterSet, QuantRunValues};
pub use run_options::RunOptions;
pub use values::{OptionValue, PlotFormat, QuantMethod};
pub use params_file::{RawOptions, merge_options, parse_params, read_params_file};
