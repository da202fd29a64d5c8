// Shared helpers for integration tests
#![allow(dead_code)]

use cloudtail::error::Result;
use cloudtail::logs::LogEntry;
use cloudtail::source::{ListRequest, ListResponse, LogSource};
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Log source answering from a script and recording every request
///
/// Once the script runs out it answers with empty batches.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    responses: Mutex<VecDeque<ListResponse>>,
    requests: Mutex<Vec<ListRequest>>,
    cancel_after: Option<(usize, CancellationToken)>,
}

impl ScriptedSource {
    pub fn new(responses: impl IntoIterator<Item = ListResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            ..Default::default()
        }
    }

    /// Cancel `token` once `calls` requests have been made
    pub fn cancel_after(mut self, calls: usize, token: CancellationToken) -> Self {
        self.cancel_after = Some((calls, token));
        self
    }

    pub fn requests(&self) -> Vec<ListRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl LogSource for ScriptedSource {
    async fn list(&self, request: &ListRequest) -> Result<ListResponse> {
        let calls = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len()
        };

        if let Some((after, token)) = &self.cancel_after {
            if calls >= *after {
                token.cancel();
            }
        }

        let next = self.responses.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(|| ListResponse::ok(Vec::new())))
    }
}

/// A text entry for a Cloud Function
pub fn text_entry(id: &str, timestamp: &str, text: &str) -> LogEntry {
    LogEntry::from_raw(json!({
        "insertId": id,
        "severity": "INFO",
        "timestamp": timestamp,
        "resource": {
            "type": "cloud_function",
            "labels": { "function_name": "myFunction" }
        },
        "textPayload": text
    }))
}

/// An audit-log entry for `method`
pub fn audit_entry(id: &str, timestamp: &str, method: &str) -> LogEntry {
    LogEntry::from_raw(json!({
        "insertId": id,
        "severity": "NOTICE",
        "timestamp": timestamp,
        "resource": { "type": "audited_resource", "labels": {} },
        "protoPayload": {
            "@type": "type.googleapis.com/google.cloud.audit.AuditLog",
            "methodName": method,
            "serviceName": "logging.googleapis.com"
        }
    }))
}

/// Three unique entries, newest first: T3, T2, T1
pub fn descending_batch() -> Vec<LogEntry> {
    vec![
        text_entry("id-3", "2024-01-01T10:00:03.000Z", "third"),
        text_entry("id-2", "2024-01-01T10:00:02.000Z", "second"),
        text_entry("id-1", "2024-01-01T10:00:01.000Z", "first"),
    ]
}
