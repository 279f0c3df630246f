//! Resource usage of the external tools, as recorded by `/usr/bin/time`.
//!
//! Each timed command appends a line `real,user,sys,max-memory` to the
//! run's usage file. A run's usage is the sum of its commands' times and
//! the largest memory footprint among them.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{info, warn};
use polars::prelude::*;

use piquant_core::consts::{PREQUANT_USAGE_FILE, QUANT_USAGE_FILE};
use piquant_core::frames::{float_values, write_csv};
use piquant_options::ParameterSet;
use piquant_stats::tag_columns;

use crate::aggregate::{RowKey, StatsRecord};

pub const REAL_TIME_COL: &str = "real-time";
pub const USER_TIME_COL: &str = "user-time";
pub const SYS_TIME_COL: &str = "sys-time";
pub const MAX_MEMORY_COL: &str = "max-memory";

pub const USAGE_METRICS: [&str; 4] = [REAL_TIME_COL, USER_TIME_COL, SYS_TIME_COL, MAX_MEMORY_COL];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UsagePhase {
    Prequantification,
    Quantification,
}

impl UsagePhase {
    pub const ALL: [UsagePhase; 2] = [UsagePhase::Prequantification, UsagePhase::Quantification];

    /// Name used in overall file and plot names.
    pub fn name(&self) -> &'static str {
        match self {
            UsagePhase::Prequantification => "prequant",
            UsagePhase::Quantification => "quant",
        }
    }

    pub fn run_file(&self) -> &'static str {
        match self {
            UsagePhase::Prequantification => PREQUANT_USAGE_FILE,
            UsagePhase::Quantification => QUANT_USAGE_FILE,
        }
    }

    pub fn overall_file(&self) -> String {
        format!("overall_{}_usage.csv", self.name())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UsageSummary {
    pub real_time: f64,
    pub user_time: f64,
    pub sys_time: f64,
    pub max_memory: f64,
}

impl UsageSummary {
    fn values(&self) -> [f64; 4] {
        [self.real_time, self.user_time, self.sys_time, self.max_memory]
    }
}

///
/// Summarise a usage file written by `/usr/bin/time -f "%e,%U,%S,%M"`.
///
pub fn read_usage_file(path: &Path) -> Result<UsageSummary> {
    let df = CsvReadOptions::default()
        .with_has_header(false)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .with_context(|| format!("Failed to open {:?}", path))?
        .finish()
        .with_context(|| format!("Failed to parse {:?}", path))?;

    let column = |i: usize| float_values(&df, &format!("column_{}", i));
    let sum = |values: Vec<f64>| values.into_iter().filter(|v| !v.is_nan()).sum::<f64>();

    Ok(UsageSummary {
        real_time: sum(column(1)?),
        user_time: sum(column(2)?),
        sys_time: sum(column(3)?),
        max_memory: column(4)?
            .into_iter()
            .filter(|v| !v.is_nan())
            .fold(0.0, f64::max),
    })
}

/// Usage of one phase across all runs that recorded it.
#[derive(Debug, Clone)]
pub struct OverallUsage {
    pub phase: UsagePhase,
    pub frame: DataFrame,
    pub records: Vec<StatsRecord>,
}

impl OverallUsage {
    pub fn write(&mut self, stats_dir: &Path) -> Result<PathBuf> {
        let path = stats_dir.join(self.phase.overall_file());
        write_csv(&mut self.frame, &path)?;
        Ok(path)
    }
}

///
/// Gather the usage of every run for a phase. Runs without a usage file
/// (prequantification is only run once per quantifier) are left out;
/// unreadable files are logged and left out.
///
pub fn aggregate_usage(
    phase: UsagePhase,
    runs: &[(ParameterSet, PathBuf)],
) -> Result<OverallUsage> {
    let mut summaries: Vec<(&ParameterSet, UsageSummary)> = Vec::new();
    for (params, run_dir) in runs {
        let path = run_dir.join(phase.run_file());
        if !path.exists() {
            continue;
        }
        match read_usage_file(&path) {
            Ok(summary) => summaries.push((params, summary)),
            Err(e) => warn!("Ignoring usage of {}: {:#}", params.run_name(), e),
        }
    }

    let mut frame = DataFrame::empty();
    let mut records = Vec::with_capacity(summaries.len());
    for (params, summary) in &summaries {
        let mut columns = tag_columns(params, 1);
        for (metric, value) in USAGE_METRICS.iter().zip(summary.values()) {
            columns.push(Column::new((*metric).into(), vec![value]));
        }
        let row = DataFrame::new(columns)?;
        if frame.width() == 0 {
            frame = row;
        } else {
            frame.vstack_mut(&row)?;
        }

        records.push(StatsRecord {
            params: (*params).clone(),
            key: RowKey::Run,
            values: USAGE_METRICS
                .iter()
                .map(|m| m.to_string())
                .zip(summary.values())
                .collect::<BTreeMap<String, f64>>(),
        });
    }

    info!(
        "Collected {} usage of {} runs",
        phase.name(),
        records.len()
    );
    Ok(OverallUsage {
        phase,
        frame,
        records,
    })
}
