//! Commands the generated scripts call back into.

use clap::{Arg, Command};

pub const READS_FOR_DEPTH_CMD: &str = "calculate_reads_for_depth";
pub const READ_BIAS_CMD: &str = "simulate_read_bias";
pub const TRANSCRIPT_COUNTS_CMD: &str = "count_transcripts_for_genes";
pub const UNIQUE_SEQUENCE_CMD: &str = "calculate_unique_transcript_sequence";
pub const ASSEMBLE_CMD: &str = "assemble_quantification_data";
pub const ANALYSE_RUN_CMD: &str = "analyse_quantification_run";

fn required(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).required(true).help(help)
}

pub fn create_reads_for_depth_cli() -> Command {
    Command::new(READS_FOR_DEPTH_CMD)
        .about("Print the number of reads needed to cover expressed transcripts to a depth")
        .arg(required("profile", "Flux Simulator expression profile"))
        .arg(required("read-length", "Length of each read"))
        .arg(required("read-depth", "Target depth of coverage"))
}

pub fn create_read_bias_cli() -> Command {
    Command::new(READ_BIAS_CMD)
        .about("Select reads by a position weight matrix to simulate positional bias")
        .arg(required("input", "Reads file to select from"))
        .arg(required("output", "Reads file to write the selected reads to"))
        .arg(required("num-reads", "Number of reads to select"))
        .arg(required("lines-per-record", "Lines of each read or read pair"))
        .arg(
            Arg::new("bias-pwm")
                .long("bias-pwm")
                .help("Position weight matrix; a built-in matrix is used by default"),
        )
}

pub fn create_transcript_counts_cli() -> Command {
    Command::new(TRANSCRIPT_COUNTS_CMD)
        .about("Count the transcripts of the gene of every transcript in a GTF file")
        .arg(required("transcript-gtf", "GTF file of transcript models"))
        .arg(required("output", "CSV file to write the counts to"))
}

pub fn create_unique_sequence_cli() -> Command {
    Command::new(UNIQUE_SEQUENCE_CMD)
        .about("Calculate the length of sequence unique to each transcript in a GTF file")
        .arg(required("transcript-gtf", "GTF file of transcript models"))
        .arg(required("output", "CSV file to write the lengths to"))
}

pub fn create_assemble_cli() -> Command {
    Command::new(ASSEMBLE_CMD)
        .about("Join real and estimated abundances of a run into a TPMs file")
        .arg(required("quant-method", "Quantification tool that produced the results"))
        .arg(required("expression-profile", "Flux Simulator expression profile"))
        .arg(required("results", "Results file written by the quantification tool"))
        .arg(required("transcript-counts", "Transcripts per gene, as written by count_transcripts_for_genes"))
        .arg(required("unique-sequence", "Unique sequence lengths, as written by calculate_unique_transcript_sequence"))
        .arg(required("output", "TPMs file to write"))
}

pub fn create_analyse_run_cli() -> Command {
    Command::new(ANALYSE_RUN_CMD)
        .about("Calculate accuracy statistics for one quantification run")
        .arg(required("run-name", "Name of the run"))
        .arg(required("tpms", "TPMs file of the run"))
        .arg(required("output-dir", "Directory to write statistics files to"))
        .arg(
            Arg::new("not-present-cutoff")
                .long("not-present-cutoff")
                .help("TPM at or below which a transcript is not present"),
        )
        .arg(
            Arg::new("error-fraction-threshold")
                .long("error-fraction-threshold")
                .help("Percent error above which a true positive counts as an error"),
        )
}
