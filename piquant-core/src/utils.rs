use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;

///
/// Get a reader for either a gzip'd or non-gzip'd file.
///
/// # Arguments
///
/// - path: path to the file to read
///
pub fn get_dynamic_reader(path: &Path) -> Result<BufReader<Box<dyn Read>>> {
    let is_gzipped = path.extension() == Some(OsStr::new("gz"));
    let file = File::open(path).with_context(|| format!("Failed to open file: {:?}", path))?;
    let file: Box<dyn Read> = match is_gzipped {
        true => Box::new(MultiGzDecoder::new(file)),
        false => Box::new(file),
    };

    Ok(BufReader::new(file))
}

///
/// Extract the value of a GTF attribute (column 9), e.g. `transcript_id "T1";`.
///
pub fn extract_gtf_attribute<'a>(attrs: &'a str, key: &str) -> Option<&'a str> {
    attrs
        .split(';')
        .map(str::trim)
        .filter_map(|attr| attr.split_once(char::is_whitespace))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.trim().trim_matches('"'))
}

///
/// Write a file by first writing to a temporary sibling and then renaming it
/// into place, so concurrent readers never see a partial file.
///
pub fn write_atomically<F>(path: &Path, write_contents: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    let tmp_path = temporary_sibling(path);
    {
        let file = File::create(&tmp_path)
            .with_context(|| format!("Failed to create file: {:?}", tmp_path))?;
        let mut writer = BufWriter::new(file);
        write_contents(&mut writer)?;
        writer.flush()?;
    }
    fs::rename(&tmp_path, path)
        .with_context(|| format!("Failed to move {:?} to {:?}", tmp_path, path))?;
    Ok(())
}

fn temporary_sibling(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp.{}", file_name, std::process::id()))
}
