use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;

use piquant_options::options::ValueKind;
use piquant_options::{RawOptions, merge_options, read_params_file};

use crate::commands::{CommandContext, PiquantCommand, execute};
use crate::runs::cli::PARAMS_FILE;

///
/// Option values given on the command line, keyed by option name. Switches
/// that were not given are left out so a parameter file can set them.
///
fn command_line_options(command: PiquantCommand, matches: &ArgMatches) -> RawOptions {
    let mut raw = RawOptions::new();
    for option in command.quant_run_options() {
        if let Some(values) = matches.get_one::<String>(option.name()) {
            raw.insert(option.name().to_string(), values.clone());
        }
    }
    for option in command.run_options() {
        match option.kind() {
            ValueKind::Switch => {
                if matches.get_flag(option.name()) {
                    raw.insert(option.name().to_string(), String::new());
                }
            }
            _ => {
                if let Some(value) = matches.get_one::<String>(option.name()) {
                    raw.insert(option.name().to_string(), value.clone());
                }
            }
        }
    }
    raw
}

pub fn run_command(command: PiquantCommand, matches: &ArgMatches) -> Result<()> {
    let from_command_line = command_line_options(command, matches);
    let raw = match matches.get_one::<String>(PARAMS_FILE) {
        Some(params_file) => {
            let from_file = read_params_file(Path::new(params_file))
                .with_context(|| format!("Failed to read parameters from {}", params_file))?;
            merge_options(from_file, from_command_line)
        }
        None => from_command_line,
    };

    let piquant = std::env::current_exe().context("Failed to locate the piquant executable")?;
    let mut context = CommandContext::from_raw(command, &raw, &piquant)?;
    execute(&mut context)
}
