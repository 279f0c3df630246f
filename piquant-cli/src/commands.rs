//! The user-facing commands.
//!
//! Each command owns the options it accepts and an ordered list of
//! [Executable]s run once for every point of the parameter space. Every
//! precondition is checked for every run before any run is touched, so a
//! misconfigured invocation fails without doing partial work.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};

use piquant_core::consts::{
    QUANTIFICATION_LOG, QUANTIFICATION_SCRIPT, SIMULATION_LOG, SIMULATION_SCRIPT, TPMS_FILE,
};
use piquant_options::{
    OptionError, ParameterSet, QuantMethod, QuantRunOption, QuantRunValues, RawOptions,
    RunOption, RunOptions,
};
use piquant_plot::PlotOptions;
use piquant_quant::{
    QuantScriptConfig, check_quantifier_preconditions, quantifier_for,
    write_quantification_script,
};
use piquant_scripts::reads::reads_files;
use piquant_scripts::{SimulationConfig, write_flux_params_files, write_simulation_script};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PiquantCommand {
    PrepareReadDirs,
    CreateReads,
    CheckReads,
    PrepareQuantDirs,
    Prequantify,
    Quantify,
    CheckQuant,
    AnalyseRuns,
}

impl PiquantCommand {
    pub const ALL: [PiquantCommand; 8] = [
        PiquantCommand::PrepareReadDirs,
        PiquantCommand::CreateReads,
        PiquantCommand::CheckReads,
        PiquantCommand::PrepareQuantDirs,
        PiquantCommand::Prequantify,
        PiquantCommand::Quantify,
        PiquantCommand::CheckQuant,
        PiquantCommand::AnalyseRuns,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PiquantCommand::PrepareReadDirs => "prepare_read_dirs",
            PiquantCommand::CreateReads => "create_reads",
            PiquantCommand::CheckReads => "check_reads",
            PiquantCommand::PrepareQuantDirs => "prepare_quant_dirs",
            PiquantCommand::Prequantify => "prequantify",
            PiquantCommand::Quantify => "quantify",
            PiquantCommand::CheckQuant => "check_quant",
            PiquantCommand::AnalyseRuns => "analyse_runs",
        }
    }

    pub fn from_name(name: &str) -> Option<PiquantCommand> {
        PiquantCommand::ALL.iter().find(|c| c.name() == name).copied()
    }

    pub fn about(&self) -> &'static str {
        match self {
            PiquantCommand::PrepareReadDirs => {
                "Create a reads directory per run holding simulator parameters and a simulation script"
            }
            PiquantCommand::CreateReads => "Launch the read simulation of every reads directory",
            PiquantCommand::CheckReads => "Check that reads were simulated for every run",
            PiquantCommand::PrepareQuantDirs => {
                "Create a quantification directory per run holding a quantification script"
            }
            PiquantCommand::Prequantify => {
                "Build the shared indexes of each quantification tool, once per tool"
            }
            PiquantCommand::Quantify => "Launch quantification and analysis of every run",
            PiquantCommand::CheckQuant => "Check that every run was quantified and analysed",
            PiquantCommand::AnalyseRuns => {
                "Aggregate the statistics of all runs into overall tables and plots"
            }
        }
    }

    /// Reads commands work on reads directories, which are independent of
    /// the quantification tool.
    pub fn is_reads_command(&self) -> bool {
        matches!(
            self,
            PiquantCommand::PrepareReadDirs | PiquantCommand::CreateReads | PiquantCommand::CheckReads
        )
    }

    pub fn quant_run_options(&self) -> &'static [QuantRunOption] {
        if self.is_reads_command() {
            &QuantRunOption::READS
        } else {
            &QuantRunOption::ALL
        }
    }

    pub fn required_run_options(&self) -> &'static [RunOption] {
        match self {
            PiquantCommand::PrepareReadDirs => &[
                RunOption::ReadsDir,
                RunOption::TranscriptGtf,
                RunOption::GenomeFasta,
            ],
            PiquantCommand::CreateReads | PiquantCommand::CheckReads => &[RunOption::ReadsDir],
            PiquantCommand::PrepareQuantDirs => &[
                RunOption::ReadsDir,
                RunOption::QuantDir,
                RunOption::TranscriptGtf,
                RunOption::GenomeFasta,
            ],
            PiquantCommand::Prequantify | PiquantCommand::Quantify | PiquantCommand::CheckQuant => {
                &[RunOption::QuantDir]
            }
            PiquantCommand::AnalyseRuns => &[RunOption::QuantDir, RunOption::StatsDir],
        }
    }

    pub fn optional_run_options(&self) -> &'static [RunOption] {
        match self {
            PiquantCommand::PrepareReadDirs => &[
                RunOption::NumMolecules,
                RunOption::NoiseTranscriptGtf,
                RunOption::NumNoiseMolecules,
                RunOption::BiasPwm,
            ],
            PiquantCommand::PrepareQuantDirs => &[
                RunOption::QuantifierDir,
                RunOption::NoCleanup,
                RunOption::NoUsage,
                RunOption::NotPresentCutoff,
                RunOption::ErrorFractionThreshold,
            ],
            PiquantCommand::AnalyseRuns => &[RunOption::PlotFormat, RunOption::GroupedThreshold],
            _ => &[],
        }
    }

    /// Every run option the command accepts.
    pub fn run_options(&self) -> Vec<RunOption> {
        self.required_run_options()
            .iter()
            .chain(self.optional_run_options())
            .copied()
            .collect()
    }

    pub fn executables(&self) -> &'static [Executable] {
        match self {
            PiquantCommand::PrepareReadDirs => &[
                Executable::CheckRunDirAbsent,
                Executable::CheckNoiseOptions,
                Executable::CreateRunDir,
                Executable::WriteSimulationFiles,
            ],
            PiquantCommand::CreateReads => {
                &[Executable::CheckRunDirPresent, Executable::RunSimulation]
            }
            PiquantCommand::CheckReads => {
                &[Executable::CheckRunDirPresent, Executable::CheckReadsCreated]
            }
            PiquantCommand::PrepareQuantDirs => &[
                Executable::CheckQuantifierPreconditions,
                Executable::CheckRunDirAbsent,
                Executable::CreateRunDir,
                Executable::WriteQuantificationScript,
            ],
            PiquantCommand::Prequantify => {
                &[Executable::CheckRunDirPresent, Executable::RunPrequantification]
            }
            PiquantCommand::Quantify => {
                &[Executable::CheckRunDirPresent, Executable::RunQuantification]
            }
            PiquantCommand::CheckQuant => &[
                Executable::CheckRunDirPresent,
                Executable::CheckQuantificationCompleted,
            ],
            // runs without statistics are skipped when aggregating
            PiquantCommand::AnalyseRuns => &[],
        }
    }
}

/// One step of a command, run for a single point of the parameter space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Executable {
    CheckRunDirAbsent,
    CheckRunDirPresent,
    CheckNoiseOptions,
    CheckQuantifierPreconditions,
    CreateRunDir,
    WriteSimulationFiles,
    WriteQuantificationScript,
    RunSimulation,
    RunPrequantification,
    RunQuantification,
    CheckReadsCreated,
    CheckQuantificationCompleted,
}

impl Executable {
    /// Preconditions are checked for every run before any other step runs.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Executable::CheckRunDirAbsent
                | Executable::CheckRunDirPresent
                | Executable::CheckNoiseOptions
                | Executable::CheckQuantifierPreconditions
        )
    }

    pub fn run(&self, context: &mut CommandContext, params: &ParameterSet) -> Result<()> {
        let run_dir = context.run_dir(params)?;

        match self {
            Executable::CheckRunDirAbsent => {
                if run_dir.exists() {
                    anyhow::bail!("Run directory {:?} already exists", run_dir);
                }
            }
            Executable::CheckRunDirPresent => {
                if !run_dir.is_dir() {
                    anyhow::bail!("Run directory {:?} does not exist", run_dir);
                }
            }
            Executable::CheckNoiseOptions => {
                if params.noise_perc()? > 0 && !context.options.is_set(RunOption::NoiseTranscriptGtf)
                {
                    return Err(OptionError::MissingOption(RunOption::NoiseTranscriptGtf.flag()).into());
                }
            }
            Executable::CheckQuantifierPreconditions => {
                let quantifier = quantifier_for(params.quant_method()?);
                check_quantifier_preconditions(quantifier.as_ref(), params.paired_end()?)?;
            }
            Executable::CreateRunDir => {
                std::fs::create_dir_all(&run_dir)
                    .with_context(|| format!("Failed to create {:?}", run_dir))?;
            }
            Executable::WriteSimulationFiles => {
                let config = SimulationConfig::from_run_options(&context.options, &context.piquant)?;
                write_flux_params_files(&run_dir, params, &config)?;
                write_simulation_script(&run_dir, params, &config)?;
            }
            Executable::WriteQuantificationScript => {
                let config = QuantScriptConfig::new(params, &context.options, &context.piquant)?;
                write_quantification_script(&run_dir, params, &config)?;
            }
            Executable::RunSimulation => {
                launch_script(&run_dir, SIMULATION_SCRIPT, None, SIMULATION_LOG)?;
            }
            Executable::RunPrequantification => {
                let method = params.quant_method()?;
                if context.first_run_for(method) {
                    launch_script(&run_dir, QUANTIFICATION_SCRIPT, Some("-p"), QUANTIFICATION_LOG)?;
                } else {
                    debug!("{} already prequantified, skipping {}", method, params);
                }
            }
            Executable::RunQuantification => {
                launch_script(&run_dir, QUANTIFICATION_SCRIPT, Some("-qa"), QUANTIFICATION_LOG)?;
            }
            Executable::CheckReadsCreated => {
                let missing: Vec<PathBuf> = reads_files(&run_dir, params)?
                    .into_iter()
                    .filter(|f| !f.exists())
                    .collect();
                if !missing.is_empty() {
                    warn!("Reads missing for {}: {:?}", params, missing);
                    context.incomplete.push(params.run_name());
                }
            }
            Executable::CheckQuantificationCompleted => {
                if !run_dir.join(TPMS_FILE).exists() {
                    warn!("{} missing for {}", TPMS_FILE, params);
                    context.incomplete.push(params.run_name());
                }
            }
        }
        Ok(())
    }
}

///
/// Run a script in its run directory in the background, immune to hangups,
/// with its output captured in a log file. Does not wait for the script.
///
fn launch_script(run_dir: &Path, script: &str, flags: Option<&str>, log: &str) -> Result<()> {
    let mut command_line = format!("nohup bash {}", script);
    if let Some(flags) = flags {
        command_line.push(' ');
        command_line.push_str(flags);
    }
    command_line.push_str(&format!(" > {} 2>&1 &", log));

    let status = Command::new("sh")
        .arg("-c")
        .arg(&command_line)
        .current_dir(run_dir)
        .status()
        .with_context(|| format!("Failed to launch {} in {:?}", script, run_dir))?;
    if !status.success() {
        anyhow::bail!("Launching {} in {:?} failed with {}", script, run_dir, status);
    }
    debug!("Launched '{}' in {:?}", command_line, run_dir);
    Ok(())
}

/// The validated options of one invocation, and what its steps recorded.
#[derive(Debug)]
pub struct CommandContext {
    pub command: PiquantCommand,
    pub options: RunOptions,
    pub values: QuantRunValues,
    /// The piquant executable generated scripts call back into.
    pub piquant: PathBuf,
    prequantified: HashSet<QuantMethod>,
    incomplete: Vec<String>,
}

impl CommandContext {
    ///
    /// Validate raw options for a command. Options the command does not
    /// accept are ignored, so one parameter file can serve every command.
    ///
    pub fn from_raw(command: PiquantCommand, raw: &RawOptions, piquant: &Path) -> Result<Self> {
        let mut supplied = QuantRunValues::new();
        for option in command.quant_run_options() {
            if let Some(values) = raw.get(option.name()) {
                supplied.set(*option, option.validate_list(values)?);
            }
        }
        let values = supplied.for_options(command.quant_run_options())?;

        let accepted = command.run_options();
        let options = RunOptions::from_raw(
            raw.iter()
                .filter(|(name, _)| RunOption::from_name(name).is_some_and(|o| accepted.contains(&o)))
                .map(|(name, value)| (name.as_str(), value.as_str())),
        )?;
        for option in command.required_run_options() {
            if !options.is_set(*option) {
                return Err(OptionError::MissingOption(option.flag()).into());
            }
        }

        info!(
            "{}: {} runs over {} varying options",
            command.name(),
            values.num_parameter_sets(),
            values.non_degenerate_options().len()
        );
        Ok(CommandContext {
            command,
            options,
            values,
            piquant: piquant.to_path_buf(),
            prequantified: HashSet::new(),
            incomplete: Vec::new(),
        })
    }

    pub fn run_dir(&self, params: &ParameterSet) -> Result<PathBuf, OptionError> {
        let parent = if self.command.is_reads_command() {
            self.options.reads_dir()?
        } else {
            self.options.quant_dir()?
        };
        Ok(parent.join(params.run_name()))
    }

    /// True the first time a tool is seen, false after.
    fn first_run_for(&mut self, method: QuantMethod) -> bool {
        self.prequantified.insert(method)
    }

    /// Names of runs a check found incomplete.
    pub fn incomplete(&self) -> &[String] {
        &self.incomplete
    }

    fn finish(&self) -> Result<()> {
        if self.command == PiquantCommand::AnalyseRuns {
            let plot_options = PlotOptions {
                grouped_threshold: self.options.integer(RunOption::GroupedThreshold)?,
            };
            piquant_plot::analyse_runs(
                &self.values,
                &self.options.quant_dir()?,
                &self.options.stats_dir()?,
                self.options.plot_format()?,
                &plot_options,
            )?;
        }
        Ok(())
    }
}

///
/// Run a command: its preconditions for every run, then its remaining
/// steps run by run, then any finishing step. Fails when a check found
/// incomplete runs.
///
pub fn execute(context: &mut CommandContext) -> Result<()> {
    let (preconditions, steps): (Vec<Executable>, Vec<Executable>) = context
        .command
        .executables()
        .iter()
        .partition(|e| e.is_precondition());
    let values = context.values.clone();

    let mut check = |params: &ParameterSet| -> Result<()> {
        for executable in &preconditions {
            executable.run(context, params)?;
        }
        Ok(())
    };
    values.execute_for_all(&mut [&mut check])?;

    if !steps.is_empty() {
        let pb = ProgressBar::new(values.num_parameter_sets() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?,
        );
        pb.set_message(context.command.name());

        let mut step = |params: &ParameterSet| -> Result<()> {
            for executable in &steps {
                executable.run(context, params)?;
            }
            pb.inc(1);
            Ok(())
        };
        values.execute_for_all(&mut [&mut step])?;
        pb.finish_and_clear();
    }

    context.finish()?;

    if !context.incomplete.is_empty() {
        anyhow::bail!(
            "{} of {} runs are incomplete: {}",
            context.incomplete.len(),
            values.num_parameter_sets(),
            context.incomplete.join(", ")
        );
    }
    info!("{} finished", context.command.name());
    Ok(())
}
