use std::path::Path;

use piquant_scripts::ShellWriter;

use super::{Phase, QuantInputs, Quantifier, timed, unless_directory_exists};
use crate::abundances::{Column, TranscriptAbundances, read_tab_separated};
use crate::errors::QuantError;

const REFERENCE_DIR: &str = "express";
const REFERENCE_NAME: &str = "express/transcripts";
const TRANSCRIPTS_FASTA: &str = "express/transcripts.transcripts.fa";
const HITS_FILE: &str = "hits.bam";

///
/// eXpress, streaming Bowtie alignments to the transcriptome.
///
#[derive(Debug, Clone, Copy, Default)]
pub struct Express;

impl Quantifier for Express {
    fn name(&self) -> &'static str {
        "Express"
    }

    fn write_preparatory_commands(
        &self,
        writer: &mut ShellWriter,
        record_usage: bool,
        inputs: &QuantInputs,
    ) {
        unless_directory_exists(writer, &inputs.scratch(REFERENCE_DIR), |w| {
            w.add_comment("Extract transcript sequences and build a Bowtie index of them");
            w.add_command(&[
                timed(
                    record_usage,
                    Phase::Prequantification,
                    "rsem-prepare-reference --no-polyA",
                ),
                format!("--gtf {}", QuantInputs::quoted(&inputs.transcript_gtf)),
                QuantInputs::quoted(&inputs.genome_fasta),
                inputs.scratch(REFERENCE_NAME),
            ]);
            w.add_line(&timed(
                record_usage,
                Phase::Prequantification,
                &format!(
                    "bowtie-build --offrate 1 {} {}",
                    inputs.scratch(TRANSCRIPTS_FASTA),
                    inputs.scratch(REFERENCE_NAME)
                ),
            ));
        })
    }

    fn write_quantification_commands(
        &self,
        writer: &mut ShellWriter,
        record_usage: bool,
        inputs: &QuantInputs,
    ) {
        let reads = inputs.reads();
        let reads = if inputs.paired_end {
            format!("-1 {} -2 {}", reads[0], reads[1])
        } else {
            reads.join(" ")
        };
        let format_flag = if inputs.errors { "-q" } else { "-f" };

        writer.add_comment("Align reads to the transcriptome");
        writer.add_pipe(&[
            timed(
                record_usage,
                Phase::Quantification,
                &format!(
                    "bowtie {} -e 99999999 -l 25 -I 1 -X 1000 -a -S -m 200 {} {}",
                    format_flag,
                    inputs.scratch(REFERENCE_NAME),
                    reads
                ),
            ),
            format!(
                "{} > {}",
                timed(record_usage, Phase::Quantification, "samtools view -Sb -"),
                HITS_FILE
            ),
        ]);
        writer.add_blank();

        writer.add_comment("Estimate transcript abundances with eXpress");
        let mut express = timed(record_usage, Phase::Quantification, "express");
        if inputs.stranded {
            express.push_str(if inputs.paired_end {
                " --fr-stranded"
            } else {
                " --f-stranded"
            });
        }
        writer.add_line(&format!(
            "{} {} {}",
            express,
            inputs.scratch(TRANSCRIPTS_FASTA),
            HITS_FILE
        ));
    }

    fn write_cleanup(&self, writer: &mut ShellWriter) {
        writer.add_line(&format!("rm -f {}", HITS_FILE));
    }

    fn results_file(&self) -> &'static str {
        "results.xprs"
    }

    fn calculate_transcript_abundances(
        &self,
        results_file: &Path,
    ) -> Result<TranscriptAbundances, QuantError> {
        read_tab_separated(results_file, Column::Name("target_id"), Column::Name("tpm"))
    }
}
