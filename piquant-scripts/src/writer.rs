//! An indenting writer for generated bash scripts.
//!
//! Block constructs take the body as a closure; the opening line, the
//! indentation and the closing keyword are handled by the writer.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

const INDENT: &str = "    ";

#[derive(Debug, Default, Clone)]
pub struct ShellWriter {
    lines: Vec<String>,
    indent_level: usize,
}

impl ShellWriter {
    pub fn new() -> Self {
        ShellWriter::default()
    }

    ///
    /// A writer pre-loaded with the shebang and the strict-mode options
    /// every generated script starts with.
    ///
    pub fn script() -> Self {
        let mut writer = ShellWriter::new();
        writer.add_line("#!/usr/bin/env bash");
        writer.add_blank();
        writer.add_line("set -o nounset");
        writer.add_line("set -o errexit");
        writer.add_blank();
        writer
    }

    pub fn indent_level(&self) -> usize {
        self.indent_level
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn add_line(&mut self, line: &str) {
        if line.is_empty() {
            self.lines.push(String::new());
        } else {
            self.lines
                .push(format!("{}{}", INDENT.repeat(self.indent_level), line));
        }
    }

    pub fn add_blank(&mut self) {
        self.lines.push(String::new());
    }

    pub fn add_comment(&mut self, comment: &str) {
        self.add_line(&format!("# {}", comment));
    }

    ///
    /// Add a long command split over several lines, each continued with a
    /// trailing backslash and the continuation lines indented once more.
    ///
    pub fn add_command(&mut self, parts: &[String]) {
        let Some((first, rest)) = parts.split_first() else {
            return;
        };
        if rest.is_empty() {
            self.add_line(first);
            return;
        }
        self.add_line(&format!("{} \\", first));
        self.indent_level += 1;
        for (i, part) in rest.iter().enumerate() {
            if i + 1 == rest.len() {
                self.add_line(part);
            } else {
                self.add_line(&format!("{} \\", part));
            }
        }
        self.indent_level -= 1;
    }

    /// Add a pipeline, one stage per line.
    pub fn add_pipe(&mut self, stages: &[String]) {
        let Some((first, rest)) = stages.split_first() else {
            return;
        };
        let mut parts = vec![first.clone()];
        parts.extend(rest.iter().map(|s| format!("| {}", s)));
        self.add_command(&parts);
    }

    pub fn add_echo(&mut self, message: &str) {
        self.add_line(&format!("echo \"{}\"", message));
    }

    fn block<F>(&mut self, open: String, close: &str, body: F)
    where
        F: FnOnce(&mut Self),
    {
        self.add_line(&open);
        self.indent_level += 1;
        body(self);
        self.indent_level -= 1;
        self.add_line(close);
    }

    /// A group of related lines, separated from what follows by a blank line.
    pub fn section<F>(&mut self, body: F)
    where
        F: FnOnce(&mut Self),
    {
        body(self);
        self.add_blank();
    }

    pub fn if_block<F>(&mut self, condition: &str, body: F)
    where
        F: FnOnce(&mut Self),
    {
        self.block(format!("if {}; then", condition), "fi", body)
    }

    pub fn while_block<F>(&mut self, condition: &str, body: F)
    where
        F: FnOnce(&mut Self),
    {
        self.block(format!("while {}; do", condition), "done", body)
    }

    pub fn case_block<F>(&mut self, expression: &str, body: F)
    where
        F: FnOnce(&mut Self),
    {
        self.block(format!("case {} in", expression), "esac", body)
    }

    pub fn case_option_block<F>(&mut self, pattern: &str, body: F)
    where
        F: FnOnce(&mut Self),
    {
        self.add_line(&format!("{})", pattern));
        self.indent_level += 1;
        body(self);
        self.add_line(";;");
        self.indent_level -= 1;
    }

    /// The script text, newline terminated.
    pub fn contents(&self) -> String {
        let mut contents = self.lines.join("\n");
        contents.push('\n');
        contents
    }

    ///
    /// Write the script to `path` and make it executable.
    ///
    pub fn write_to_file(&self, path: &Path) -> std::io::Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(self.contents().as_bytes())?;
        writer.flush()?;

        #[cfg(unix)]
        fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;

        Ok(())
    }
}

/// Quote a value for safe use as a single shell word.
pub fn quote(value: &str) -> String {
    if !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "/._-+=:,".contains(c))
    {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', r"'\''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_script_preamble() {
        let writer = ShellWriter::script();
        assert_eq!(
            writer.lines()[..4],
            ["#!/usr/bin/env bash", "", "set -o nounset", "set -o errexit"]
        );
    }

    #[rstest]
    fn test_nested_blocks_are_indented_and_closed() {
        let mut writer = ShellWriter::new();
        writer.while_block("getopts \":pqa\" opt", |w| {
            w.case_block("$opt", |w| {
                w.case_option_block("p", |w| w.add_line("RUN_PREQUANTIFICATION=1"))
            })
        });

        assert_eq!(
            writer.contents(),
            "while getopts \":pqa\" opt; do\n\
             \x20   case $opt in\n\
             \x20       p)\n\
             \x20           RUN_PREQUANTIFICATION=1\n\
             \x20           ;;\n\
             \x20   esac\n\
             done\n"
        );
        assert_eq!(writer.indent_level(), 0);
    }

    #[rstest]
    fn test_if_block() {
        let mut writer = ShellWriter::new();
        writer.if_block("[ -n \"$X\" ]", |w| w.add_line("echo $X"));
        assert_eq!(writer.lines(), ["if [ -n \"$X\" ]; then", "    echo $X", "fi"]);
    }

    #[rstest]
    fn test_section_adds_blank_line() {
        let mut writer = ShellWriter::new();
        writer.section(|w| w.add_line("A=1"));
        assert_eq!(writer.lines(), ["A=1", ""]);
    }

    #[rstest]
    fn test_add_pipe() {
        let mut writer = ShellWriter::new();
        writer.add_pipe(&["cat reads.fasta".to_string(), "shuf".to_string()]);
        assert_eq!(writer.lines(), ["cat reads.fasta \\", "    | shuf"]);
    }

    #[rstest]
    #[case("reads.fasta", "reads.fasta")]
    #[case("/data/genome dir", "'/data/genome dir'")]
    #[case("it's", r"'it'\''s'")]
    #[case("", "''")]
    fn test_quote(#[case] value: &str, #[case] expected: &str) {
        assert_eq!(quote(value), expected);
    }

    #[cfg(unix)]
    #[rstest]
    fn test_written_script_is_executable() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("run.sh");
        ShellWriter::script().write_to_file(&path).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
        assert!(fs::read_to_string(&path).unwrap().starts_with("#!/usr/bin/env bash\n"));
    }
}
