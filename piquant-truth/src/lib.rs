//! Ground truth for a quantification run.
//!
//! Two tables are derived once per transcript GTF and shared by every run
//! through the quantifier scratch directory: the size of each transcript's
//! gene, and how much of each transcript's sequence is unique to it. A
//! finished run then joins these with the simulator's expression profile
//! and the quantifier's estimates into `tpms.csv`.

pub mod assemble;
pub mod gene_counts;
pub mod unique_sequence;

// re-exports
pub use assemble::{
    AssemblyInputs, TranscriptTpm, assemble_quantification_data, assemble_tpms, tpms_frame,
    write_tpms,
};
pub use gene_counts::{
    TranscriptGene, count_transcripts_for_genes, read_transcript_counts, write_transcript_counts,
};
pub use unique_sequence::{
    TranscriptSequence, calculate_unique_sequence, read_unique_sequence, write_unique_sequence,
};
