//! Accuracy statistics for quantification runs.
//!
//! A run's `tpms.csv` pairs the real abundance of every transcript with the
//! quantifier's estimate. From it, [analyse_quantification_run] computes
//! each [Statistic] over all transcripts, per bucket of each grouped
//! [Classifier], over gene-level sums, and writes cumulative distributions
//! for the distribution classifiers.

pub mod analysis;
pub mod classifiers;
pub mod errors;
pub mod files;
pub mod positivity;
pub mod statistics;
pub mod tpms;

// re-exports
pub use analysis::{AnalysisConfig, analyse_quantification_run, stats_frame, tag_columns};
pub use classifiers::{Classifier, ClassifierKind, Levels, cumulative_distribution};
pub use errors::StatsError;
pub use files::{DISTRIBUTION_PERCENT_COL, OVERALL_PREFIX, StatsFile};
pub use positivity::{Positivity, PositivityCounts};
pub use statistics::{Statistic, StatsContext};
pub use tpms::{RunTpms, TpmRow, read_tpms};
