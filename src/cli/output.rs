//! Terminal output formatting
//!
//! Status messages go to stderr with colors (respects NO_COLOR, CLICOLOR,
//! CLICOLOR_FORCE automatically). Command results are written uncolored to a
//! caller-supplied writer so they can be captured.

use std::io::{self, Write};

use chrono::Local;
use colored::Colorize;
use serde::Serialize;

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print indented guidance to stderr
pub fn hint(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("  {}", msg);
}

/// Console log timestamp, e.g. `18 Oct 10:42:07`
pub fn timestamp() -> String {
    Local::now().format("%-d %b %H:%M:%S").to_string()
}

/// Timestamped console line: `<timestamp> - <msg>`
pub fn log(out: &mut dyn Write, msg: &(impl std::fmt::Display + ?Sized)) -> io::Result<()> {
    writeln!(out, "{} - {}", timestamp(), msg)
}

/// Plain line
pub fn line(out: &mut dyn Write, msg: &(impl std::fmt::Display + ?Sized)) -> io::Result<()> {
    writeln!(out, "{}", msg)
}

/// Tab-indented list entry
pub fn detail(out: &mut dyn Write, msg: &(impl std::fmt::Display + ?Sized)) -> io::Result<()> {
    writeln!(out, "\t{}", msg)
}

/// Empty line
pub fn blank(out: &mut dyn Write) -> io::Result<()> {
    writeln!(out)
}

/// Pretty JSON rendering of a result value.
pub fn pretty(value: &impl Serialize) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("<unprintable: {e}>"))
}
