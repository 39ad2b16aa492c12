//! Console report - progress lines and summaries
//!
//! Summaries go to `out` (stdout in the binary), failures to `err` (stderr).

use std::io::{self, Write};

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

pub struct Reporter<W: Write, E: Write> {
    out: W,
    err: E,
    styled: bool,
}

impl<W: Write, E: Write> Reporter<W, E> {
    /// `styled` enables ANSI bold headings
    pub fn new(out: W, err: E, styled: bool) -> Self {
        Self { out, err, styled }
    }

    fn heading(&self, text: &str) -> String {
        if self.styled { format!("{}{}{}", BOLD, text, RESET) } else { text.to_string() }
    }

    pub fn file_started(&mut self, index: usize, total: usize, name: &str) -> io::Result<()> {
        write!(self.out, "🔍 Analyzing file {} of {}: {}...\n\n", index, total, name)?;
        self.out.flush()
    }

    pub fn file_summary(&mut self, name: &str, summary: &str) -> io::Result<()> {
        let heading = self.heading(&format!("Summary for {}:", name));
        write!(self.out, "{}\n\n{}\n\n\n", heading, summary)?;
        self.out.flush()
    }

    pub fn file_failed(&mut self, name: &str, error: &dyn std::fmt::Display) -> io::Result<()> {
        writeln!(self.err, "Error analyzing {}: {}", name, error)
    }

    pub fn bundle_summary(&mut self, files: &[&str], summary: &str) -> io::Result<()> {
        let heading = self.heading(&format!("Bundle summary ({}):", files.join(", ")));
        write!(self.out, "{}\n\n{}\n\n", heading, summary)?;
        self.out.flush()
    }

    pub fn no_files(&mut self, known: &[&str]) -> io::Result<()> {
        writeln!(self.out, "No recognized files found in bundle (looked for {}).", known.join(", "))
    }

    pub fn prompt(&mut self, label: &str, prompt: &str) -> io::Result<()> {
        write!(self.out, "----- prompt: {} -----\n{}\n", label, prompt)?;
        self.out.flush()
    }

    pub fn into_inner(self) -> (W, E) {
        (self.out, self.err)
    }
}
