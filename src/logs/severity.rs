// Severity column formatting

use colored::*;

/// Display width of the severity column
pub const SEVERITY_WIDTH: usize = 20;

/// Format a severity label with its color and pad it to the column width
///
/// Known severities (ERROR, INFO, DEBUG, NOTICE, WARNING) are colored;
/// anything else is passed through as-is.
pub fn format_severity(severity: &str) -> String {
    let colored = match severity {
        "ERROR" => severity.red(),
        "INFO" => severity.cyan(),
        "DEBUG" => severity.green(),
        "NOTICE" => severity.magenta(),
        "WARNING" => severity.yellow(),
        _ => severity.normal(),
    };

    format!("{:<width$}", colored, width = SEVERITY_WIDTH)
}
