//! Textual health-check report

use std::collections::BTreeMap;
use std::fmt::{self, Write};

use crate::check::TimedCheckResult;

/// Renders the result map as the plain-text report consumed by the HTTP
/// surface and the logs.
pub fn render_report(results: &BTreeMap<String, TimedCheckResult>) -> String {
    let mut out = String::new();
    write_report(results, &mut out).expect("writing to a String cannot fail");
    out
}

/// One line per healthy check, one or two lines plus an optional cause dump
/// per unhealthy check.
pub fn write_report<W: Write>(
    results: &BTreeMap<String, TimedCheckResult>,
    out: &mut W,
) -> fmt::Result {
    if results.is_empty() {
        return writeln!(out, "! No health checks registered.");
    }

    for (name, timed) in results {
        if timed.is_healthy() {
            writeln!(
                out,
                "* {}=OK (executed at {}) in {}ms",
                name,
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
                timed.elapsed_ms()
            )?;
            if let Some(message) = timed.message() {
                writeln!(out, "  {}", message)?;
            }
        } else {
            writeln!(out, "! {}=ERROR in {}ms", name, timed.elapsed_ms())?;
            if let Some(message) = timed.message() {
                writeln!(out, "!  {}", message)?;
            }
            if let Some(error) = timed.error() {
                writeln!(out)?;
                writeln!(out, "{:?}", error)?;
                writeln!(out)?;
            }
        }
    }

    Ok(())
}
