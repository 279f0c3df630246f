//! The `run_quantification.sh` script of a quantification directory.

use std::path::{Path, PathBuf};

use log::debug;

use piquant_core::consts::{
    EXPRESSION_PROFILE_FILE, QUANTIFICATION_SCRIPT, TPMS_FILE, TRANSCRIPT_COUNTS_FILE,
    UNIQUE_SEQUENCE_FILE,
};
use piquant_options::{ParameterSet, RunOption, RunOptions};
use piquant_scripts::reads::reads_files;
use piquant_scripts::{ShellWriter, quote};

use crate::errors::QuantError;
use crate::quantifiers::{QuantInputs, Quantifier, quantifier_for};

pub const RUN_PREQUANTIFICATION: &str = "RUN_PREQUANTIFICATION";
pub const QUANTIFY_TRANSCRIPTS: &str = "QUANTIFY_TRANSCRIPTS";
pub const ANALYSE_RESULTS: &str = "ANALYSE_RESULTS";

///
/// Settings for the quantification script of one run.
///
#[derive(Debug, Clone)]
pub struct QuantScriptConfig {
    pub run_name: String,
    pub inputs: QuantInputs,
    /// Reads directory of the run, holding the ground-truth profile.
    pub reads_run_dir: PathBuf,
    /// The piquant executable the script calls back into.
    pub piquant: PathBuf,
    pub nocleanup: bool,
    pub record_usage: bool,
    pub not_present_cutoff: f64,
    pub error_fraction_threshold: f64,
}

impl QuantScriptConfig {
    pub fn new(
        params: &ParameterSet,
        options: &RunOptions,
        piquant: &Path,
    ) -> Result<Self, QuantError> {
        let reads_run_dir = options
            .reads_dir()?
            .join(params.reads_parameters().run_name());

        Ok(QuantScriptConfig {
            run_name: params.run_name(),
            inputs: QuantInputs {
                transcript_gtf: options.transcript_gtf()?,
                genome_fasta: options.genome_fasta()?,
                quantifier_dir: options.quantifier_dir()?,
                reads_files: reads_files(&reads_run_dir, params)?,
                paired_end: params.paired_end()?,
                errors: params.errors()?,
                stranded: params.stranded()?,
            },
            reads_run_dir,
            piquant: piquant.to_path_buf(),
            nocleanup: options.switch(RunOption::NoCleanup),
            record_usage: !options.switch(RunOption::NoUsage),
            not_present_cutoff: options.not_present_cutoff()?,
            error_fraction_threshold: options.number(RunOption::ErrorFractionThreshold)?,
        })
    }

    fn scratch_file(&self, name: &str) -> String {
        quote(&self.inputs.quantifier_dir.join(name).to_string_lossy())
    }
}

/// Fails when the tool cannot quantify the run's reads.
pub fn check_quantifier_preconditions(
    quantifier: &dyn Quantifier,
    paired_end: bool,
) -> Result<(), QuantError> {
    if quantifier.requires_paired_end_reads() && !paired_end {
        return Err(QuantError::PairedEndRequired(quantifier.name().to_string()));
    }
    Ok(())
}

fn write_option_handling(writer: &mut ShellWriter) {
    writer.section(|w| {
        for variable in [RUN_PREQUANTIFICATION, QUANTIFY_TRANSCRIPTS, ANALYSE_RESULTS] {
            w.add_line(&format!("{}=", variable));
        }
    });

    writer.section(|w| {
        w.while_block("getopts \":pqa\" opt", |w| {
            w.case_block("$opt", |w| {
                for (flag, variable) in [
                    ("p", RUN_PREQUANTIFICATION),
                    ("q", QUANTIFY_TRANSCRIPTS),
                    ("a", ANALYSE_RESULTS),
                ] {
                    w.case_option_block(flag, |w| w.add_line(&format!("{}=1", variable)));
                }
                w.case_option_block("\\?", |w| {
                    w.add_line("echo \"Invalid option: -$OPTARG\" >&2");
                    w.add_line("exit 1");
                });
            });
        });
    });
}

fn write_if_exists_skip(writer: &mut ShellWriter, file: &str, command: Vec<String>) {
    writer.if_block(&format!("[ ! -f {} ]", file), |w| w.add_command(&command));
}

fn flag_is_set(variable: &str) -> String {
    format!("[ -n \"${}\" ]", variable)
}

///
/// Write `run_quantification.sh` into a quantification run directory.
///
/// The script takes `-p` (prepare shared references), `-q` (quantify) and
/// `-a` (assemble and analyse results); each phase can be rerun on its own.
///
pub fn write_quantification_script(
    run_dir: &Path,
    params: &ParameterSet,
    config: &QuantScriptConfig,
) -> Result<(), QuantError> {
    let method = params.quant_method()?;
    let quantifier = quantifier_for(method);
    check_quantifier_preconditions(quantifier.as_ref(), config.inputs.paired_end)?;

    let piquant = quote(&config.piquant.to_string_lossy());
    let gtf = quote(&config.inputs.transcript_gtf.to_string_lossy());
    let counts_file = config.scratch_file(TRANSCRIPT_COUNTS_FILE);
    let unique_file = config.scratch_file(UNIQUE_SEQUENCE_FILE);

    let mut writer = ShellWriter::script();
    write_option_handling(&mut writer);

    writer.section(|w| {
        w.if_block(&flag_is_set(RUN_PREQUANTIFICATION), |w| {
            w.add_line(&format!(
                "mkdir -p {}",
                quote(&config.inputs.quantifier_dir.to_string_lossy())
            ));
            w.add_blank();
            quantifier.write_preparatory_commands(w, config.record_usage, &config.inputs);
            w.add_blank();

            w.add_comment("Count transcripts per gene and unique sequence per transcript");
            write_if_exists_skip(
                w,
                &counts_file,
                vec![
                    format!("{} count_transcripts_for_genes", piquant),
                    format!("--transcript-gtf {}", gtf),
                    format!("--output {}", counts_file),
                ],
            );
            write_if_exists_skip(
                w,
                &unique_file,
                vec![
                    format!("{} calculate_unique_transcript_sequence", piquant),
                    format!("--transcript-gtf {}", gtf),
                    format!("--output {}", unique_file),
                ],
            );
        });
    });

    writer.section(|w| {
        w.if_block(&flag_is_set(QUANTIFY_TRANSCRIPTS), |w| {
            quantifier.write_quantification_commands(w, config.record_usage, &config.inputs);
            if !config.nocleanup {
                w.add_blank();
                w.add_comment("Remove intermediate files");
                quantifier.write_cleanup(w);
            }
        });
    });

    let expression_profile = config.reads_run_dir.join(EXPRESSION_PROFILE_FILE);
    writer.if_block(&flag_is_set(ANALYSE_RESULTS), |w| {
        w.add_comment("Assemble real and calculated abundances");
        w.add_command(&[
            format!("{} assemble_quantification_data", piquant),
            format!("--quant-method {}", method.name()),
            format!(
                "--expression-profile {}",
                quote(&expression_profile.to_string_lossy())
            ),
            format!("--results {}", quantifier.results_file()),
            format!("--transcript-counts {}", counts_file),
            format!("--unique-sequence {}", unique_file),
            format!("--output {}", TPMS_FILE),
        ]);
        w.add_blank();
        w.add_comment("Calculate accuracy statistics for the run");
        w.add_command(&[
            format!("{} analyse_quantification_run", piquant),
            format!("--run-name {}", config.run_name),
            format!("--tpms {}", TPMS_FILE),
            "--output-dir .".to_string(),
            format!("--not-present-cutoff {}", config.not_present_cutoff),
            format!(
                "--error-fraction-threshold {}",
                config.error_fraction_threshold
            ),
        ]);
    });

    writer.write_to_file(&run_dir.join(QUANTIFICATION_SCRIPT))?;
    debug!("Wrote {} to {}", QUANTIFICATION_SCRIPT, run_dir.display());
    Ok(())
}
