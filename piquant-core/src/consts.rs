/// Relative abundances are scaled so that they sum to one million.
pub const TPM_SCALE: f64 = 1_000_000.0;

/// TPM at or below which a transcript is considered not present.
pub const DEFAULT_NOT_PRESENT_CUTOFF: f64 = 0.1;

// columns of the assembled tpms.csv
pub const TRANSCRIPT_COL: &str = "transcript";
pub const GENE_COL: &str = "gene";
pub const LENGTH_COL: &str = "length";
pub const UNIQUE_LENGTH_COL: &str = "unique-length";
pub const NUM_TRANSCRIPTS_COL: &str = "num-transcripts";
pub const REAL_TPM_COL: &str = "real-tpm";
pub const CALC_TPM_COL: &str = "calc-tpm";

// files inside a reads directory
pub const EXPRESSION_PARAMS_FILE: &str = "flux_simulator_expression.par";
pub const SIMULATION_PARAMS_FILE: &str = "flux_simulator_simulation.par";
pub const NOISE_EXPRESSION_PARAMS_FILE: &str = "flux_simulator_noise_expression.par";
pub const NOISE_SIMULATION_PARAMS_FILE: &str = "flux_simulator_noise_simulation.par";
pub const EXPRESSION_PROFILE_FILE: &str = "flux_simulator_expression.pro";
pub const NOISE_EXPRESSION_PROFILE_FILE: &str = "flux_simulator_noise_expression.pro";
pub const SIMULATION_SCRIPT: &str = "run_simulation.sh";
pub const SIMULATION_LOG: &str = "run_simulation.log";
pub const READS_FILE_STEM: &str = "reads";

// files inside a quant directory
pub const QUANTIFICATION_SCRIPT: &str = "run_quantification.sh";
pub const QUANTIFICATION_LOG: &str = "run_quantification.log";
pub const TPMS_FILE: &str = "tpms.csv";
pub const PREQUANT_USAGE_FILE: &str = "prequant_usage.csv";
pub const QUANT_USAGE_FILE: &str = "quant_usage.csv";

// files inside the quantifier scratch directory
pub const DEFAULT_QUANTIFIER_SCRATCH_DIR: &str = "quantifier_scratch";
pub const TRANSCRIPT_COUNTS_FILE: &str = "transcript_counts.csv";
pub const UNIQUE_SEQUENCE_FILE: &str = "unique_sequence.csv";
