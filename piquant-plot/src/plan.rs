//! Deciding which plots to draw and what goes in each.
//!
//! Planning is kept apart from rendering so the set of plots produced for a
//! given parameter space can be checked without drawing anything.

use std::path::PathBuf;

use piquant_options::{OptionValue, ParameterSet, QuantRunOption, QuantRunValues};
use piquant_stats::{Classifier, Statistic, StatsFile};

use crate::aggregate::{OverallStats, RowKey, StatsRecord};
use crate::usage::{OverallUsage, USAGE_METRICS, UsagePhase};

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlotData {
    /// Lines over a numeric x axis. Category labels replace the numeric
    /// tick labels when present.
    Lines {
        series: Vec<Series>,
        categories: Option<Vec<String>>,
    },
    /// A box per category, summarising the values of all runs in it.
    Boxes { categories: Vec<(String, Vec<f64>)> },
    /// One bar per category.
    Bars { categories: Vec<(String, f64)> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlotSpec {
    /// Path under the plots directory, without extension.
    pub path: PathBuf,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub y_range: Option<(f64, f64)>,
    pub data: PlotData,
}

/// Plot directory name for an option: `read_depth` -> `read-depth`.
fn dir_name(option: QuantRunOption) -> String {
    option.flag()
}

///
/// Every combination of values of `options` (a single empty combination
/// when there are none).
///
fn combinations(values: &QuantRunValues, options: &[QuantRunOption]) -> Vec<ParameterSet> {
    match values.for_options(options) {
        Ok(restricted) if !options.is_empty() => restricted.parameter_sets(),
        _ => vec![ParameterSet::new()],
    }
}

fn fixed_suffix(fixed: &ParameterSet) -> String {
    fixed
        .iter()
        .map(|(option, value)| option.file_name(value))
        .collect::<Vec<String>>()
        .join("_")
}

fn fixed_caption(fixed: &ParameterSet) -> String {
    fixed
        .iter()
        .map(|(option, value)| option.value_name(value))
        .collect::<Vec<String>>()
        .join(", ")
}

fn file_stem(name: &str, fixed: &ParameterSet) -> String {
    if fixed.is_empty() {
        name.to_string()
    } else {
        format!("{}_{}", name, fixed_suffix(fixed))
    }
}

fn title(main: &str, fixed: &ParameterSet) -> String {
    if fixed.is_empty() {
        main.to_string()
    } else {
        format!("{} ({})", main, fixed_caption(fixed))
    }
}

fn option_values(values: &QuantRunValues, option: QuantRunOption) -> Vec<OptionValue> {
    values.get(option).cloned().unwrap_or_default()
}

fn others(options: &[QuantRunOption], excluded: &[QuantRunOption]) -> Vec<QuantRunOption> {
    options
        .iter()
        .copied()
        .filter(|o| !excluded.contains(o))
        .collect()
}

fn sorted_points(mut points: Vec<(f64, f64)>) -> Vec<(f64, f64)> {
    points.sort_by(|a, b| a.0.total_cmp(&b.0));
    points
}

///
/// Line series, one per value of `group`, of records matching `fixed`.
/// `point` maps a record to its (x, y), or `None` to leave it out.
///
fn series_per_group<F>(
    records: &[StatsRecord],
    values: &QuantRunValues,
    group: QuantRunOption,
    fixed: &ParameterSet,
    point: F,
) -> Vec<Series>
where
    F: Fn(&StatsRecord) -> Option<(f64, f64)>,
{
    option_values(values, group)
        .into_iter()
        .map(|group_value| {
            let selection = fixed.clone().with(group, group_value);
            Series {
                label: group.value_name(&group_value),
                points: sorted_points(
                    records
                        .iter()
                        .filter(|r| r.matches(&selection))
                        .filter_map(&point)
                        .collect(),
                ),
            }
        })
        .filter(|s| !s.points.is_empty())
        .collect()
}

/// Settings that shape the plots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotOptions {
    /// Classifier buckets with fewer true positives are not plotted.
    pub grouped_threshold: u64,
}

///
/// Statistic against each numeric option, one line per value of another
/// option: `per-<G>/by-<X>/<stat>/<stat>_<fixed>`.
///
pub fn numeric_option_plots(stats: &OverallStats, values: &QuantRunValues) -> Vec<PlotSpec> {
    let varying = values.non_degenerate_options();
    let mut plots = Vec::new();

    for &x in varying.iter().filter(|o| o.is_numeric()) {
        for &group in varying.iter().filter(|&&o| o != x) {
            for fixed in combinations(values, &others(&varying, &[x, group])) {
                for statistic in Statistic::ALL {
                    let series = series_per_group(&stats.records, values, group, &fixed, |r| {
                        let x_value = r.params.get(x)?.as_f64()?;
                        Some((x_value, r.value(statistic.name())?))
                    });
                    if series.is_empty() {
                        continue;
                    }
                    plots.push(PlotSpec {
                        path: PathBuf::from(format!("per-{}", dir_name(group)))
                            .join(format!("by-{}", dir_name(x)))
                            .join(statistic.name())
                            .join(file_stem(statistic.name(), &fixed)),
                        title: title(
                            &format!("{} by {}", statistic.title(), x.title().to_lowercase()),
                            &fixed,
                        ),
                        x_label: x.title().to_string(),
                        y_label: statistic.title().to_string(),
                        y_range: statistic.range(),
                        data: PlotData::Lines {
                            series,
                            categories: None,
                        },
                    });
                }
            }
        }
    }
    plots
}

fn boxes_over(
    records: &[StatsRecord],
    values: &QuantRunValues,
    x: QuantRunOption,
    statistic: Statistic,
    fixed: &ParameterSet,
) -> Vec<(String, Vec<f64>)> {
    option_values(values, x)
        .into_iter()
        .map(|x_value| {
            let selection = fixed.clone().with(x, x_value);
            let samples: Vec<f64> = records
                .iter()
                .filter(|r| r.matches(&selection))
                .filter_map(|r| r.value(statistic.name()))
                .collect();
            (x.value_name(&x_value), samples)
        })
        .filter(|(_, samples)| !samples.is_empty())
        .collect()
}

///
/// Spread of each statistic over the runs sharing a value of an option:
/// `distributions/per-<X>/<stat>`, and the same restricted to each value
/// of every other varying option.
///
pub fn distribution_plots(stats: &OverallStats, values: &QuantRunValues) -> Vec<PlotSpec> {
    let varying = values.non_degenerate_options();
    let mut plots = Vec::new();

    for &x in &varying {
        let mut selections = vec![ParameterSet::new()];
        for &other in varying.iter().filter(|&&o| o != x) {
            selections.extend(
                option_values(values, other)
                    .into_iter()
                    .map(|v| ParameterSet::new().with(other, v)),
            );
        }

        for fixed in &selections {
            for statistic in Statistic::ALL.into_iter().filter(|s| !s.is_count()) {
                let categories = boxes_over(&stats.records, values, x, statistic, fixed);
                if categories.is_empty() {
                    continue;
                }
                plots.push(PlotSpec {
                    path: PathBuf::from("distributions")
                        .join(format!("per-{}", dir_name(x)))
                        .join(file_stem(statistic.name(), fixed)),
                    title: title(
                        &format!("{} per {}", statistic.title(), x.title().to_lowercase()),
                        fixed,
                    ),
                    x_label: x.title().to_string(),
                    y_label: statistic.title().to_string(),
                    y_range: statistic.range(),
                    data: PlotData::Boxes { categories },
                });
            }
        }
    }
    plots
}

///
/// Statistics per classifier bucket, one line per value of an option:
/// `by-<classifier>/per-<G>/<stat>/<stat>_<fixed>`.
///
pub fn grouped_classifier_plots(
    stats: &OverallStats,
    classifier: Classifier,
    values: &QuantRunValues,
    options: &PlotOptions,
) -> Vec<PlotSpec> {
    let varying = values.non_degenerate_options();
    let labels = classifier.levels().map(|l| l.labels()).unwrap_or_default();
    let tp_column = Statistic::NumTruePositiveTpms.name();
    let threshold = options.grouped_threshold as f64;
    let mut plots = Vec::new();

    for &group in &varying {
        for fixed in combinations(values, &others(&varying, &[group])) {
            for statistic in Statistic::ALL {
                let series = series_per_group(&stats.records, values, group, &fixed, |r| {
                    let RowKey::Bucket(index, _) = r.key else {
                        return None;
                    };
                    if r.value(tp_column).unwrap_or(0.0) < threshold {
                        return None;
                    }
                    Some((index as f64, r.value(statistic.name())?))
                });
                if series.is_empty() {
                    continue;
                }
                plots.push(PlotSpec {
                    path: PathBuf::from(format!("by-{}", classifier.name()))
                        .join(format!("per-{}", dir_name(group)))
                        .join(statistic.name())
                        .join(file_stem(statistic.name(), &fixed)),
                    title: title(
                        &format!("{} by {}", statistic.title(), classifier.title().to_lowercase()),
                        &fixed,
                    ),
                    x_label: classifier.title().to_string(),
                    y_label: statistic.title().to_string(),
                    y_range: statistic.range(),
                    data: PlotData::Lines {
                        series,
                        categories: Some(labels.clone()),
                    },
                });
            }
        }
    }
    plots
}

///
/// Cumulative distribution curves, one per value of an option:
/// `cumulative/<classifier>/<asc|desc>/per-<G>/<classifier>_<fixed>`.
///
pub fn cumulative_plots(
    stats: &OverallStats,
    classifier: Classifier,
    ascending: bool,
    values: &QuantRunValues,
) -> Vec<PlotSpec> {
    let varying = values.non_degenerate_options();
    let direction = if ascending { "asc" } else { "desc" };
    let y_label = if ascending {
        "Percentage of TPMs below threshold"
    } else {
        "Percentage of TPMs above threshold"
    };
    let mut plots = Vec::new();

    for &group in &varying {
        for fixed in combinations(values, &others(&varying, &[group])) {
            let series = series_per_group(&stats.records, values, group, &fixed, |r| {
                let RowKey::Threshold(threshold) = r.key else {
                    return None;
                };
                Some((threshold, r.value(piquant_stats::DISTRIBUTION_PERCENT_COL)?))
            });
            if series.is_empty() {
                continue;
            }
            plots.push(PlotSpec {
                path: PathBuf::from("cumulative")
                    .join(classifier.name())
                    .join(direction)
                    .join(format!("per-{}", dir_name(group)))
                    .join(file_stem(classifier.name(), &fixed)),
                title: title(classifier.title(), &fixed),
                x_label: classifier.title().to_string(),
                y_label: y_label.to_string(),
                y_range: Some((0.0, 100.0)),
                data: PlotData::Lines {
                    series,
                    categories: None,
                },
            });
        }
    }
    plots
}

fn usage_title(metric: &str) -> &'static str {
    match metric {
        "real-time" => "Real time (s)",
        "user-time" => "User time (s)",
        "sys-time" => "System time (s)",
        _ => "Maximum memory (KiB)",
    }
}

///
/// Prequantification usage as a bar per quantifier, quantification usage
/// as a box per quantifier: `resource-usage/<phase>_<metric>`.
///
pub fn usage_plots(usage: &OverallUsage, values: &QuantRunValues) -> Vec<PlotSpec> {
    let methods = option_values(values, QuantRunOption::QuantMethod);
    let mut plots = Vec::new();

    for metric in USAGE_METRICS {
        let per_method: Vec<(String, Vec<f64>)> = methods
            .iter()
            .map(|method| {
                let selection = ParameterSet::new().with(QuantRunOption::QuantMethod, *method);
                let samples: Vec<f64> = usage
                    .records
                    .iter()
                    .filter(|r| r.matches(&selection))
                    .filter_map(|r| r.value(metric))
                    .collect();
                (method.to_string(), samples)
            })
            .filter(|(_, samples)| !samples.is_empty())
            .collect();
        if per_method.is_empty() {
            continue;
        }

        let data = match usage.phase {
            UsagePhase::Prequantification => PlotData::Bars {
                categories: per_method
                    .into_iter()
                    .map(|(method, samples)| (method, samples.into_iter().fold(0.0, f64::max)))
                    .collect(),
            },
            UsagePhase::Quantification => PlotData::Boxes {
                categories: per_method,
            },
        };

        plots.push(PlotSpec {
            path: PathBuf::from("resource-usage").join(format!("{}_{}", usage.phase.name(), metric)),
            title: format!("{} ({})", usage_title(metric), usage.phase.name()),
            x_label: QuantRunOption::QuantMethod.title().to_string(),
            y_label: usage_title(metric).to_string(),
            y_range: None,
            data,
        });
    }
    plots
}

///
/// Plan every plot for the aggregated statistics of a benchmark.
///
pub fn plan_plots(
    overall: &[OverallStats],
    usage: &[OverallUsage],
    values: &QuantRunValues,
    options: &PlotOptions,
) -> Vec<PlotSpec> {
    let mut plots = Vec::new();
    for stats in overall {
        match stats.file {
            StatsFile::Transcript => {
                plots.extend(numeric_option_plots(stats, values));
                plots.extend(distribution_plots(stats, values));
            }
            StatsFile::Grouped(classifier) => {
                plots.extend(grouped_classifier_plots(stats, classifier, values, options));
            }
            StatsFile::Distribution {
                classifier,
                ascending,
            } => plots.extend(cumulative_plots(stats, classifier, ascending, values)),
            StatsFile::Gene => {}
        }
    }
    for phase_usage in usage {
        plots.extend(usage_plots(phase_usage, values));
    }
    plots
}
