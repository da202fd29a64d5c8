// Log entry model as returned by the Cloud Logging entries:list API

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// `@type` tag carried by audit-log payloads
pub const AUDIT_LOG_TYPE: &str = "type.googleapis.com/google.cloud.audit.AuditLog";

/// Severity reported when the entry carries none
pub const DEFAULT_SEVERITY: &str = "DEFAULT";

/// Resource label holding the function name
const FUNCTION_NAME_LABEL: &str = "function_name";

/// A single structured log record
///
/// Only the fields this crate reads are typed; everything else is kept in
/// `extra` so the entry can be re-emitted whole.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Unique id of the physical log event
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insert_id: Option<String>,

    /// Severity label (ERROR, INFO, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,

    /// ISO-8601 timestamp of the event
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    /// Monitored resource that produced the entry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<MonitoredResource>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_payload: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_payload: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proto_payload: Option<Value>,

    /// Fields not modelled above
    #[serde(flatten)]
    pub extra: Map<String, Value>,

    /// The entry exactly as the service sent it, when built by
    /// [`LogEntry::from_raw`]
    #[serde(skip)]
    pub raw: Option<Value>,
}

/// Resource descriptor attached to an entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonitoredResource {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,

    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

/// The payload an entry carries, in display preference order
///
/// Only proto payloads are classified; a JSON payload is always shown as
/// serialized text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Payload<'a> {
    Text(&'a str),
    Json(&'a Value),
    Proto(StructuredPayload<'a>),
    Unknown,
}

/// Shape of a structured payload, keyed on its `@type` tag
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StructuredPayload<'a> {
    /// An audit-log record; only the method name is displayed
    AuditLog { method_name: Option<&'a str> },
    Other(&'a Value),
}

impl<'a> StructuredPayload<'a> {
    /// Classify a structured payload by its type tag
    pub fn classify(value: &'a Value) -> Self {
        match value.get("@type").and_then(Value::as_str) {
            Some(AUDIT_LOG_TYPE) => StructuredPayload::AuditLog {
                method_name: value.get("methodName").and_then(Value::as_str),
            },
            _ => StructuredPayload::Other(value),
        }
    }
}

impl LogEntry {
    /// Build an entry from the service's JSON, keeping the original value
    ///
    /// An entry whose fields do not match the expected types is kept with
    /// only its insert id, so it still renders with placeholders.
    pub fn from_raw(raw: Value) -> Self {
        let mut entry = match serde_json::from_value::<LogEntry>(raw.clone()) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("Malformed log entry, rendering best-effort: {}", e);
                LogEntry {
                    insert_id: raw
                        .get("insertId")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                    ..Default::default()
                }
            }
        };
        entry.raw = Some(raw);
        entry
    }

    /// Severity label, falling back to `DEFAULT`
    pub fn severity(&self) -> &str {
        self.severity.as_deref().unwrap_or(DEFAULT_SEVERITY)
    }

    /// Timestamp, or an empty string when absent
    pub fn timestamp(&self) -> &str {
        self.timestamp.as_deref().unwrap_or("")
    }

    /// Function name from the resource labels, if present
    pub fn function_name(&self) -> Option<&str> {
        self.resource
            .as_ref()
            .and_then(|r| r.labels.get(FUNCTION_NAME_LABEL))
            .map(String::as_str)
    }

    /// Select the payload to display: text, then JSON, then proto
    pub fn payload(&self) -> Payload<'_> {
        if let Some(text) = self.text_payload.as_deref().filter(|t| !t.is_empty()) {
            return Payload::Text(text);
        }
        if let Some(json) = &self.json_payload {
            return Payload::Json(json);
        }
        if let Some(proto) = &self.proto_payload {
            return Payload::Proto(StructuredPayload::classify(proto));
        }
        Payload::Unknown
    }

    /// Identity used to suppress repeats across polls
    ///
    /// Entries without an insert id fall back to a key built from their
    /// visible content.
    pub fn dedup_key(&self) -> Cow<'_, str> {
        match &self.insert_id {
            Some(id) => Cow::Borrowed(id.as_str()),
            None => {
                let payload = self
                    .text_payload
                    .clone()
                    .or_else(|| self.json_payload.as_ref().map(Value::to_string))
                    .or_else(|| self.proto_payload.as_ref().map(Value::to_string))
                    .unwrap_or_default();
                Cow::Owned(format!(
                    "{}|{}|{}|{}",
                    self.timestamp(),
                    self.severity(),
                    self.function_name().unwrap_or(""),
                    payload
                ))
            }
        }
    }
}
