//! Terminal output helpers.
//!
//! Results go to stdout so they can be piped; diagnostics go to stderr.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

/// Width of the label column printed by [`field`].
const LABEL_WIDTH: usize = 16;

pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn error(msg: &str) {
    eprintln!("{} {}", "Error:".red().bold(), msg);
}

pub fn warning(msg: &str) {
    eprintln!("{} {}", "Warning:".yellow().bold(), msg);
}

/// Informational line on stderr.
pub fn note(msg: &str) {
    eprintln!("{}", msg.dimmed());
}

/// Print an aligned `label  value` line.
pub fn field(label: &str, value: &str) {
    let label = format!("{label}:");
    println!("{} {}", format!("{label:<LABEL_WIDTH$}").dimmed(), value);
}

pub fn json_pretty<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
