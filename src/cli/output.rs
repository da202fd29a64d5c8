// Output formatting for CLI status and errors
//
// Log lines go to stdout; everything here goes to stderr so piping the
// output keeps only entries.

use crate::error::{error_line, CloudtailError};
use colored::*;

/// Print an error to stderr
pub fn print_error(err: &CloudtailError) {
    eprintln!("{}", error_line(err));
}

/// Print an informational message to stderr
pub fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue().bold(), message);
}
