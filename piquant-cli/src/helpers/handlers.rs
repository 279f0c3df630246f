use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::ArgMatches;
use log::info;

use piquant_core::read_gtf_exons;
use piquant_options::QuantMethod;
use piquant_scripts::reads::calculate_reads_for_depth;
use piquant_scripts::{Pwm, simulate_read_bias};
use piquant_stats::{AnalysisConfig, StatsContext, analyse_quantification_run};
use piquant_truth::{
    AssemblyInputs, assemble_quantification_data, calculate_unique_sequence,
    count_transcripts_for_genes, write_transcript_counts, write_unique_sequence,
};

fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .with_context(|| format!("--{} is required", name))
}

fn parsed<T>(matches: &ArgMatches, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    matches
        .get_one::<String>(name)
        .map(|value| {
            value
                .parse::<T>()
                .map_err(|e| anyhow::anyhow!("Invalid value '{}' for --{}: {}", value, name, e))
        })
        .transpose()
}

fn required_parsed<T>(matches: &ArgMatches, name: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    parsed(matches, name)?.with_context(|| format!("--{} is required", name))
}

pub fn run_reads_for_depth(matches: &ArgMatches) -> Result<()> {
    let profile = required(matches, "profile")?;
    let read_length: u32 = required_parsed(matches, "read-length")?;
    let read_depth: u32 = required_parsed(matches, "read-depth")?;

    let num_reads = calculate_reads_for_depth(Path::new(profile), read_length, read_depth)?;
    // captured by the simulation script
    println!("{}", num_reads);
    Ok(())
}

pub fn run_read_bias(matches: &ArgMatches) -> Result<()> {
    let input = required(matches, "input")?;
    let output = required(matches, "output")?;
    let num_reads: usize = required_parsed(matches, "num-reads")?;
    let lines_per_record: usize = required_parsed(matches, "lines-per-record")?;
    let pwm = match matches.get_one::<String>("bias-pwm") {
        Some(path) => Pwm::from_file(Path::new(path))?,
        None => Pwm::default(),
    };

    simulate_read_bias(
        Path::new(input),
        Path::new(output),
        num_reads,
        lines_per_record,
        &pwm,
        &mut rand::rng(),
    )?;
    Ok(())
}

pub fn run_transcript_counts(matches: &ArgMatches) -> Result<()> {
    let gtf = required(matches, "transcript-gtf")?;
    let output = required(matches, "output")?;

    let records = read_gtf_exons(Path::new(gtf))?;
    let counts = count_transcripts_for_genes(&records);
    write_transcript_counts(&counts, Path::new(output))?;
    info!("Wrote gene sizes of {} transcripts to {}", counts.len(), output);
    Ok(())
}

pub fn run_unique_sequence(matches: &ArgMatches) -> Result<()> {
    let gtf = required(matches, "transcript-gtf")?;
    let output = required(matches, "output")?;

    let records = read_gtf_exons(Path::new(gtf))?;
    let sequences = calculate_unique_sequence(&records);
    write_unique_sequence(&sequences, Path::new(output))?;
    info!(
        "Wrote unique sequence of {} transcripts to {}",
        sequences.len(),
        output
    );
    Ok(())
}

pub fn run_assemble(matches: &ArgMatches) -> Result<()> {
    let quant_method: QuantMethod = required_parsed(matches, "quant-method")?;
    let inputs = AssemblyInputs {
        quant_method,
        expression_profile: Path::new(required(matches, "expression-profile")?),
        results: Path::new(required(matches, "results")?),
        transcript_counts: Path::new(required(matches, "transcript-counts")?),
        unique_sequence: Path::new(required(matches, "unique-sequence")?),
    };
    assemble_quantification_data(&inputs, Path::new(required(matches, "output")?))
}

pub fn run_analyse_run(matches: &ArgMatches) -> Result<()> {
    let run_name = required(matches, "run-name")?;
    let tpms = required(matches, "tpms")?;
    let output_dir = required(matches, "output-dir")?;

    let defaults = StatsContext::default();
    let config = AnalysisConfig {
        context: StatsContext {
            not_present_cutoff: parsed(matches, "not-present-cutoff")?
                .unwrap_or(defaults.not_present_cutoff),
            error_fraction_threshold: parsed(matches, "error-fraction-threshold")?
                .unwrap_or(defaults.error_fraction_threshold),
        },
        ..AnalysisConfig::default()
    };

    analyse_quantification_run(run_name, Path::new(tpms), Path::new(output_dir), &config)?;
    Ok(())
}
