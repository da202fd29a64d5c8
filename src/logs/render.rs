// Rendering of a single log entry into a printable line

use super::entry::{LogEntry, Payload, StructuredPayload};
use super::severity::format_severity;

/// Display width of the function name column
pub const FUNCTION_WIDTH: usize = 15;

/// Display width string payloads are padded to
pub const PAYLOAD_WIDTH: usize = 20;

/// JSON payloads are cut to this many characters in human mode
pub const MAX_JSON_PAYLOAD_CHARS: usize = 255;

/// Placeholder when the entry names no function
pub const MISSING_FUNCTION_NAME: &str = "N/A";

/// Placeholder when the entry carries no payload
pub const UNKNOWN_PAYLOAD: &str = "Unknown log payload.";

/// Message substituted for audit-log payloads
pub const AUDIT_LOG_SETUP: &str = "Setting up Cloud Logging.";

/// How entries are turned into lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Emit the whole entry as indented JSON instead of the payload column
    pub json: bool,
    /// Drop the timestamp column
    pub simplified: bool,
}

/// Render one entry as `<severity> <timestamp> <function> <payload>`
pub fn render_entry(entry: &LogEntry, options: &RenderOptions) -> String {
    let severity = format_severity(entry.severity());
    let mut function = pad(
        entry.function_name().unwrap_or(MISSING_FUNCTION_NAME),
        FUNCTION_WIDTH,
    );

    let payload = if options.json {
        json_entry(entry)
    } else {
        match entry.payload() {
            Payload::Text(text) => pad(text, PAYLOAD_WIDTH),
            Payload::Proto(StructuredPayload::AuditLog { method_name }) => {
                function = pad(method_name.unwrap_or(MISSING_FUNCTION_NAME), FUNCTION_WIDTH);
                pad(AUDIT_LOG_SETUP, PAYLOAD_WIDTH)
            }
            Payload::Json(value) => {
                let serialized = value.to_string();
                pad(
                    &truncate_chars(&serialized, MAX_JSON_PAYLOAD_CHARS),
                    PAYLOAD_WIDTH,
                )
            }
            Payload::Proto(StructuredPayload::Other(value)) => value.to_string(),
            Payload::Unknown => pad(UNKNOWN_PAYLOAD, PAYLOAD_WIDTH),
        }
    };

    if options.simplified {
        format!("{} {} {}", severity, function, payload)
    } else {
        format!("{} {} {} {}", severity, entry.timestamp(), function, payload)
    }
}

/// Pretty JSON of the whole entry
///
/// Uses the value received from the service when there is one, so null
/// fields survive; object keys come out sorted either way. Entries built in
/// code fall back to their typed fields.
fn json_entry(entry: &LogEntry) -> String {
    let pretty = match &entry.raw {
        Some(raw) => serde_json::to_string_pretty(raw),
        None => serde_json::to_string_pretty(entry),
    };
    pretty.unwrap_or_else(|e| format!("<unserializable entry: {}>", e))
}

/// Left-align `s` in a column of `width` characters
fn pad(s: &str, width: usize) -> String {
    format!("{:<width$}", s, width = width)
}

/// Keep at most `max_chars` characters of `s`
fn truncate_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
