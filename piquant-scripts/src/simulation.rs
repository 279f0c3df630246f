//! Flux Simulator parameter files and the `run_simulation.sh` script that
//! turns them into a reads directory.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::debug;

use piquant_core::consts::{
    EXPRESSION_PARAMS_FILE, EXPRESSION_PROFILE_FILE, NOISE_EXPRESSION_PARAMS_FILE,
    NOISE_EXPRESSION_PROFILE_FILE, NOISE_SIMULATION_PARAMS_FILE, SIMULATION_PARAMS_FILE,
    SIMULATION_SCRIPT,
};
use piquant_options::{OptionError, ParameterSet, RunOption, RunOptions};

use crate::errors::ScriptError;
use crate::reads::{lines_per_read, lines_per_record, reads_file_names, simulated_reads_file};
use crate::writer::{ShellWriter, quote};

pub const READ_NUMBER_PLACEHOLDER: &str = "READ_NUMBER_PLACEHOLDER";
const FLUX_SIMULATOR: &str = "flux-simulator";
const NOISE_READS_STEM: &str = "noise_reads";

///
/// Reference inputs and settings shared by every reads directory.
///
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub transcript_gtf: PathBuf,
    pub genome_fasta: PathBuf,
    pub num_molecules: u64,
    pub noise_transcript_gtf: Option<PathBuf>,
    pub num_noise_molecules: u64,
    pub bias_pwm: Option<PathBuf>,
    /// The piquant executable the script calls back into.
    pub piquant: PathBuf,
}

impl SimulationConfig {
    pub fn from_run_options(options: &RunOptions, piquant: &Path) -> Result<Self, OptionError> {
        Ok(SimulationConfig {
            transcript_gtf: options.transcript_gtf()?,
            genome_fasta: options.genome_fasta()?,
            num_molecules: options.integer(RunOption::NumMolecules)?,
            noise_transcript_gtf: options
                .optional_path(RunOption::NoiseTranscriptGtf)
                .map(Path::to_path_buf),
            num_noise_molecules: options.integer(RunOption::NumNoiseMolecules)?,
            bias_pwm: options.optional_path(RunOption::BiasPwm).map(Path::to_path_buf),
            piquant: piquant.to_path_buf(),
        })
    }

    fn noise_gtf(&self) -> Result<&Path, ScriptError> {
        self.noise_transcript_gtf.as_deref().ok_or_else(|| {
            OptionError::MissingOption(RunOption::NoiseTranscriptGtf.flag()).into()
        })
    }
}

/// Ordered `KEY value` lines of a Flux Simulator parameter file.
#[derive(Debug, Default)]
struct FluxParams {
    entries: Vec<(&'static str, String)>,
}

impl FluxParams {
    fn set(&mut self, key: &'static str, value: impl ToString) -> &mut Self {
        self.entries.push((key, value.to_string()));
        self
    }

    fn write(&self, path: &Path) -> std::io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        for (key, value) in &self.entries {
            writeln!(writer, "{} {}", key, value)?;
        }
        writer.flush()
    }
}

fn expression_params(gtf: &Path, genome: &Path, molecules: u64, profile: &str) -> FluxParams {
    let mut params = FluxParams::default();
    params
        .set("REF_FILE_NAME", gtf.display())
        .set("GEN_DIR", genome.display())
        .set("NB_MOLECULES", molecules)
        .set("POLYA_SCALE", "NaN")
        .set("POLYA_SHAPE", "NaN")
        .set("TSS_MEAN", "NaN")
        .set("PRO_FILE_NAME", profile);
    params
}

fn simulation_params(
    base: FluxParams,
    params: &ParameterSet,
    library_stem: &str,
    reads_file: &str,
) -> Result<FluxParams, ScriptError> {
    let read_length = params.read_length()?;
    let paired_end = params.paired_end()?;
    let mut flux = base;
    flux.set("LIB_FILE_NAME", format!("{}.lib", library_stem))
        .set("SEQ_FILE_NAME", reads_file)
        .set("READ_NUMBER", READ_NUMBER_PLACEHOLDER)
        .set("READ_LENGTH", read_length)
        .set("PAIRED_END", if paired_end { "YES" } else { "NO" })
        .set("FASTA", "YES")
        .set("UNIQUE_IDS", "YES");
    if params.errors()? {
        // flux ships error models for 35 and 76 base reads
        flux.set("ERR_FILE", if read_length > 50 { 76 } else { 35 });
    }
    if params.stranded()? {
        flux.set(
            "READ_STRAND",
            if paired_end { "MATE1_SENSE" } else { "SENSE" },
        );
    }
    Ok(flux)
}

fn has_noise(params: &ParameterSet) -> Result<bool, ScriptError> {
    Ok(params.noise_perc()? > 0)
}

///
/// Write the Flux Simulator parameter files for one reads directory.
///
pub fn write_flux_params_files(
    run_dir: &Path,
    params: &ParameterSet,
    config: &SimulationConfig,
) -> Result<(), ScriptError> {
    let errors = params.errors()?;

    expression_params(
        &config.transcript_gtf,
        &config.genome_fasta,
        config.num_molecules,
        EXPRESSION_PROFILE_FILE,
    )
    .write(&run_dir.join(EXPRESSION_PARAMS_FILE))?;

    simulation_params(
        expression_params(
            &config.transcript_gtf,
            &config.genome_fasta,
            config.num_molecules,
            EXPRESSION_PROFILE_FILE,
        ),
        params,
        "flux_simulator_simulation",
        &simulated_reads_file(errors),
    )?
    .write(&run_dir.join(SIMULATION_PARAMS_FILE))?;

    if has_noise(params)? {
        let noise_gtf = config.noise_gtf()?;
        let noise_expression = || {
            expression_params(
                noise_gtf,
                &config.genome_fasta,
                config.num_noise_molecules,
                NOISE_EXPRESSION_PROFILE_FILE,
            )
        };
        noise_expression().write(&run_dir.join(NOISE_EXPRESSION_PARAMS_FILE))?;
        simulation_params(
            noise_expression(),
            params,
            "flux_simulator_noise_simulation",
            &noise_reads_file(errors),
        )?
        .write(&run_dir.join(NOISE_SIMULATION_PARAMS_FILE))?;
    }

    debug!("Wrote Flux Simulator parameters to {}", run_dir.display());
    Ok(())
}

fn noise_reads_file(errors: bool) -> String {
    simulated_reads_file(errors).replacen("reads", NOISE_READS_STEM, 1)
}

fn paste_dashes(n: usize) -> String {
    vec!["-"; n].join(" ")
}

fn fix_zero_length_transcripts(writer: &mut ShellWriter, profile: &str) {
    writer.add_comment("Some transcripts are given zero length by the simulator; drop them");
    writer.add_line(&format!(
        "awk -F '\\t' '$4 > 0' {} > {}.tmp",
        profile, profile
    ));
    writer.add_line(&format!("mv {}.tmp {}", profile, profile));
}

fn add_read_number(writer: &mut ShellWriter, variable: &str, params_file: &str) {
    writer.add_line(&format!(
        "sed -i \"s/{}/${{{}}}/\" {}",
        READ_NUMBER_PLACEHOLDER, variable, params_file
    ));
}

fn run_flux(writer: &mut ShellWriter, params_file: &str, phase_flags: &str) {
    writer.add_line(&format!(
        "{} -p {} {}",
        FLUX_SIMULATOR, params_file, phase_flags
    ));
}

///
/// Write `run_simulation.sh` for one reads directory.
///
pub fn write_simulation_script(
    run_dir: &Path,
    params: &ParameterSet,
    config: &SimulationConfig,
) -> Result<(), ScriptError> {
    let read_length = params.read_length()?;
    let read_depth = params.read_depth()?;
    let paired_end = params.paired_end()?;
    let errors = params.errors()?;
    let bias = params.bias()?;
    let noise_perc = params.noise_perc()?;
    let piquant = quote(&config.piquant.to_string_lossy());
    let reads_file = simulated_reads_file(errors);

    let mut writer = ShellWriter::script();

    writer.section(|w| {
        w.add_comment("Create expression profile");
        run_flux(w, EXPRESSION_PARAMS_FILE, "-x");
        fix_zero_length_transcripts(w, EXPRESSION_PROFILE_FILE);
    });

    writer.section(|w| {
        w.add_comment("Calculate the number of reads required for the requested depth");
        w.add_command(&[
            format!("READS_FOR_DEPTH=$({} calculate_reads_for_depth", piquant),
            format!("--profile {}", EXPRESSION_PROFILE_FILE),
            format!("--read-length {}", read_length),
            format!("--read-depth {})", read_depth),
        ]);
        w.add_line("FINAL_READS=${READS_FOR_DEPTH}");
        if bias {
            w.add_comment("Simulate twice as many reads, bias selection keeps half");
            w.add_line("READS_FOR_DEPTH=$((READS_FOR_DEPTH * 2))");
        }
        add_read_number(w, "READS_FOR_DEPTH", SIMULATION_PARAMS_FILE);
    });

    writer.section(|w| {
        w.add_comment("Simulate reads");
        run_flux(w, SIMULATION_PARAMS_FILE, "-l -s");
    });

    if noise_perc > 0 {
        let noise_reads = noise_reads_file(errors);
        writer.section(|w| {
            w.add_comment("Simulate noise reads and mix them with the main reads");
            run_flux(w, NOISE_EXPRESSION_PARAMS_FILE, "-x");
            fix_zero_length_transcripts(w, NOISE_EXPRESSION_PROFILE_FILE);
            w.add_line(&format!(
                "NOISE_READS=$((FINAL_READS * {} / (100 - {})))",
                noise_perc, noise_perc
            ));
            w.add_line("SIMULATED_NOISE_READS=${NOISE_READS}");
            if bias {
                w.add_line("SIMULATED_NOISE_READS=$((NOISE_READS * 2))");
            }
            add_read_number(w, "SIMULATED_NOISE_READS", NOISE_SIMULATION_PARAMS_FILE);
            run_flux(w, NOISE_SIMULATION_PARAMS_FILE, "-l -s");
            w.add_line(&format!("cat {} >> {}", noise_reads, reads_file));
            w.add_line(&format!("rm {}", noise_reads));
            w.add_line("FINAL_READS=$((FINAL_READS + NOISE_READS))");
        });
    }

    let record_lines = lines_per_record(errors, paired_end);
    writer.section(|w| {
        w.add_comment("Shuffle reads, keeping the lines of each record together");
        w.add_pipe(&[
            format!("paste {} < {}", paste_dashes(record_lines), reads_file),
            "shuf".to_string(),
            format!("tr '\\t' '\\n' > {}.shuffled", reads_file),
        ]);
        w.add_line(&format!("mv {}.shuffled {}", reads_file, reads_file));
    });

    if bias {
        writer.section(|w| {
            w.add_comment("Keep the reads best matching the positional bias");
            let mut command = vec![
                format!("{} simulate_read_bias", piquant),
                format!("--input {}", reads_file),
                format!("--output {}.biased", reads_file),
                "--num-reads ${FINAL_READS}".to_string(),
                format!("--lines-per-record {}", record_lines),
            ];
            if let Some(pwm) = &config.bias_pwm {
                command.push(format!("--bias-pwm {}", quote(&pwm.to_string_lossy())));
            }
            w.add_command(&command);
            w.add_line(&format!("mv {}.biased {}", reads_file, reads_file));
        });
    }

    if paired_end {
        let names = reads_file_names(params)?;
        let read_lines = lines_per_read(errors);
        let fields = (1..=read_lines)
            .map(|i| format!("${}", i))
            .collect::<Vec<String>>()
            .join(", ");
        writer.section(|w| {
            w.add_comment("Split paired reads into left and right files");
            w.add_pipe(&[
                format!("paste {} < {}", paste_dashes(read_lines), reads_file),
                format!(
                    "awk -F '\\t' -v OFS='\\n' '$1 ~ /\\/1$/ {{ print {f} > \"{left}\" }} $1 ~ /\\/2$/ {{ print {f} > \"{right}\" }}'",
                    f = fields,
                    left = names[0],
                    right = names[1]
                ),
            ]);
            w.add_line(&format!("rm {}", reads_file));
        });
    }

    writer.add_comment("Remove intermediate simulator files");
    writer.add_line("rm -f flux_simulator_*.lib flux_simulator_*.bed");

    writer.write_to_file(&run_dir.join(SIMULATION_SCRIPT))?;
    debug!("Wrote {} to {}", SIMULATION_SCRIPT, run_dir.display());
    Ok(())
}
