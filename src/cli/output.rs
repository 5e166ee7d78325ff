//! Report printing.

use crate::bundler::BundleReport;
use std::io::{self, Write};

/// Writes run reports to stdout and warnings to stderr.
#[derive(Debug, Clone, Copy)]
pub struct OutputManager {
    json: bool,
    quiet: bool,
}

impl OutputManager {
    /// Creates an output manager.
    pub fn new(json: bool, quiet: bool) -> Self {
        Self { json, quiet }
    }

    /// Prints `report` as text or JSON.
    pub fn report(&self, report: &BundleReport) -> crate::error::Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        if self.json {
            serde_json::to_writer_pretty(&mut out, report)?;
            writeln!(out)?;
        } else if !self.quiet {
            write_text(&mut out, report)?;
        }
        Ok(())
    }
}

/// Human-readable report, one line per target.
pub fn write_text(out: &mut impl Write, report: &BundleReport) -> io::Result<()> {
    for artifact in &report.artifacts {
        writeln!(
            out,
            "packaged {:<18} {} ({} bytes, sha256 {})",
            artifact.target.to_string(),
            artifact.path.display(),
            artifact.size,
            artifact.checksum
        )?;
    }
    for skipped in &report.skipped {
        writeln!(out, "skipped  {:<18} {}", skipped.target.to_string(), skipped.reason)?;
    }
    for failed in &report.failed {
        writeln!(out, "failed   {:<18} {}", failed.target.to_string(), failed.reason)?;
    }
    Ok(())
}
