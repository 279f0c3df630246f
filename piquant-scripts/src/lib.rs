//! Generation of the bash scripts that drive a benchmark, and the read
//! handling those scripts call back into piquant for.
//!
//! Scripts are written with [writer::ShellWriter]. The simulation script of
//! a reads directory is produced by [simulation]; the quantification script
//! is assembled by `piquant-quant`, which knows the tools.

pub mod bias;
pub mod errors;
pub mod reads;
pub mod simulation;
pub mod writer;

// re-exports
pub use bias::{Pwm, simulate_read_bias};
pub use errors::ScriptError;
pub use simulation::{SimulationConfig, write_flux_params_files, write_simulation_script};
pub use writer::{ShellWriter, quote};
