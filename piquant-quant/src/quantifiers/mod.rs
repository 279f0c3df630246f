//! The quantification tools piquant can benchmark.
//!
//! Each tool is a [Quantifier]: it writes its side of the quantification
//! script and knows how to read the abundances it produced. Nothing
//! outside this module knows which tool a run uses.

use std::path::{Path, PathBuf};

use piquant_core::consts::{PREQUANT_USAGE_FILE, QUANT_USAGE_FILE};
use piquant_options::QuantMethod;
use piquant_scripts::{ShellWriter, quote};

use crate::abundances::TranscriptAbundances;
use crate::errors::QuantError;

pub mod cufflinks;
pub mod express;
pub mod rsem;
pub mod sailfish;

pub use cufflinks::Cufflinks;
pub use express::Express;
pub use rsem::Rsem;
pub use sailfish::Sailfish;

const TIME_FORMAT: &str = "%e,%U,%S,%M";

///
/// Everything a tool needs to know to write its commands for one run.
///
#[derive(Debug, Clone)]
pub struct QuantInputs {
    pub transcript_gtf: PathBuf,
    /// Directory of per-sequence genome FASTA files.
    pub genome_fasta: PathBuf,
    /// Scratch directory shared by all runs for indexes and references.
    pub quantifier_dir: PathBuf,
    /// One reads file, or the left and right files for paired-end reads.
    pub reads_files: Vec<PathBuf>,
    pub paired_end: bool,
    /// Reads simulated with errors are FASTQ, otherwise FASTA.
    pub errors: bool,
    pub stranded: bool,
}

impl QuantInputs {
    pub(crate) fn scratch(&self, relative: &str) -> String {
        quote(&self.quantifier_dir.join(relative).to_string_lossy())
    }

    pub(crate) fn quoted(path: &Path) -> String {
        quote(&path.to_string_lossy())
    }

    pub(crate) fn reads(&self) -> Vec<String> {
        self.reads_files.iter().map(|p| Self::quoted(p)).collect()
    }
}

///
/// The operations through which the quantification script and the
/// analysis drive a tool.
///
pub trait Quantifier {
    fn name(&self) -> &'static str;

    ///
    /// Commands building any index or reference shared by all runs. They
    /// are guarded by a check on the target directory, so repeating them
    /// does nothing.
    ///
    fn write_preparatory_commands(
        &self,
        writer: &mut ShellWriter,
        record_usage: bool,
        inputs: &QuantInputs,
    );

    /// Commands producing the tool's native output in the run directory.
    fn write_quantification_commands(
        &self,
        writer: &mut ShellWriter,
        record_usage: bool,
        inputs: &QuantInputs,
    );

    /// Commands removing intermediate files not needed for analysis.
    fn write_cleanup(&self, writer: &mut ShellWriter);

    /// Output file within the run directory.
    fn results_file(&self) -> &'static str;

    fn requires_paired_end_reads(&self) -> bool {
        false
    }

    fn calculate_transcript_abundances(
        &self,
        results_file: &Path,
    ) -> Result<TranscriptAbundances, QuantError>;
}

/// The tool implementing a quantification method.
pub fn quantifier_for(method: QuantMethod) -> Box<dyn Quantifier> {
    match method {
        QuantMethod::Cufflinks => Box::new(Cufflinks),
        QuantMethod::Rsem => Box::new(Rsem),
        QuantMethod::Express => Box::new(Express),
        QuantMethod::Sailfish => Box::new(Sailfish),
    }
}

/// Which usage file a timed command appends to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    Prequantification,
    Quantification,
}

///
/// Prefix a command with GNU time appending its resource usage to the
/// phase's usage file, when usage is being recorded.
///
pub(crate) fn timed(record_usage: bool, phase: Phase, command: &str) -> String {
    if !record_usage {
        return command.to_string();
    }
    let usage_file = match phase {
        Phase::Prequantification => PREQUANT_USAGE_FILE,
        Phase::Quantification => QUANT_USAGE_FILE,
    };
    format!(
        "/usr/bin/time -f \"{}\" -a -o {} {}",
        TIME_FORMAT, usage_file, command
    )
}

///
/// Guard preparation commands on the absence of a scratch directory. The
/// directory is created for the commands to write into and removed again
/// if any of them fails, so a failed build is retried on the next run.
///
pub(crate) fn unless_directory_exists<F>(writer: &mut ShellWriter, directory: &str, body: F)
where
    F: FnOnce(&mut ShellWriter),
{
    writer.if_block(&format!("[ ! -d {} ]", directory), |w| {
        w.add_line(&format!("trap {} ERR", quote(&format!("rm -rf {}", directory))));
        w.add_line(&format!("mkdir -p {}", directory));
        body(w);
        w.add_line("trap - ERR");
    });
}

/// Concatenate the per-sequence genome FASTA files into one file.
pub(crate) fn concatenate_genome(writer: &mut ShellWriter, inputs: &QuantInputs, target: &str) {
    writer.add_line(&format!(
        "cat {}/*.fa > {}",
        QuantInputs::quoted(&inputs.genome_fasta),
        target
    ));
}
