//! Comparing runs: overall statistics tables and the plots drawn from them.
//!
//! [analyse_runs] stacks the statistics each run wrote into `overall_*`
//! tables in the stats directory, collects the resource usage the runs
//! recorded, and draws comparison plots under `<stats_dir>/plots`.

pub mod aggregate;
pub mod plan;
pub mod render;
pub mod usage;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;

use piquant_options::{ParameterSet, PlotFormat, QuantRunValues};

// re-exports
pub use aggregate::{OverallStats, RowKey, StatsRecord, aggregate_run_stats};
pub use plan::{PlotData, PlotOptions, PlotSpec, Series, plan_plots};
pub use render::{render_plot, render_plots};
pub use usage::{OverallUsage, UsagePhase, UsageSummary, aggregate_usage, read_usage_file};

pub const PLOTS_DIR: &str = "plots";

/// What [analyse_runs] produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunsAnalysis {
    pub tables: Vec<PathBuf>,
    pub num_plots: usize,
}

///
/// Aggregate the statistics and usage of every run in the parameter space
/// and plot them. Runs without statistics are skipped.
///
pub fn analyse_runs(
    values: &QuantRunValues,
    quant_dir: &Path,
    stats_dir: &Path,
    format: PlotFormat,
    options: &PlotOptions,
) -> Result<RunsAnalysis> {
    std::fs::create_dir_all(stats_dir)
        .with_context(|| format!("Failed to create {:?}", stats_dir))?;

    let runs: Vec<(ParameterSet, PathBuf)> = values
        .parameter_sets()
        .into_iter()
        .map(|params| {
            let run_dir = quant_dir.join(params.run_name());
            (params, run_dir)
        })
        .collect();

    let mut analysis = RunsAnalysis::default();

    let mut overall = aggregate_run_stats(&runs)?;
    for stats in overall.iter_mut() {
        analysis.tables.push(stats.write(stats_dir)?);
    }

    let mut usage = Vec::new();
    for phase in UsagePhase::ALL {
        let mut phase_usage = aggregate_usage(phase, &runs)?;
        analysis.tables.push(phase_usage.write(stats_dir)?);
        usage.push(phase_usage);
    }

    let plots = plan_plots(&overall, &usage, values, options);
    analysis.num_plots = render_plots(&plots, &stats_dir.join(PLOTS_DIR), format)?;

    info!(
        "Wrote {} overall tables and {} plots to {:?}",
        analysis.tables.len(),
        analysis.num_plots,
        stats_dir
    );
    Ok(analysis)
}
