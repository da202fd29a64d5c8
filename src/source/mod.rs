// Log source - where batches of entries come from

mod client;

pub use client::{CloudLoggingClient, DEFAULT_ENDPOINT};

use crate::error::Result;
use crate::logs::LogEntry;
use serde::Serialize;
use std::future::Future;

/// Sort order requested from the log source (newest first)
pub const ORDER_BY_TIMESTAMP_DESC: &str = "timestamp desc";

/// Parameters of one entries:list call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRequest {
    /// Parents to read from, e.g. `projects/my-project`
    pub resource_names: Vec<String>,
    /// Advanced logs filter; empty means no filter
    #[serde(skip_serializing_if = "String::is_empty")]
    pub filter: String,
    pub order_by: String,
}

impl ListRequest {
    /// Newest-first request for a single project
    pub fn newest_first(project_ref: impl Into<String>, filter: impl Into<String>) -> Self {
        Self {
            resource_names: vec![project_ref.into()],
            filter: filter.into(),
            order_by: ORDER_BY_TIMESTAMP_DESC.to_string(),
        }
    }
}

/// Outcome of one entries:list call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListResponse {
    /// HTTP status returned by the service
    pub status: u16,
    /// Reason or error message accompanying the status
    pub status_text: String,
    /// Entries, newest first
    pub entries: Vec<LogEntry>,
}

impl ListResponse {
    /// A 200 response carrying `entries`
    pub fn ok(entries: Vec<LogEntry>) -> Self {
        Self {
            status: 200,
            status_text: "OK".to_string(),
            entries,
        }
    }

    /// A failed response with no entries
    pub fn failed(status: u16, status_text: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            entries: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// A remote service that can list log entries
///
/// Implementations report HTTP-level failures through
/// [`ListResponse::status`] and reserve `Err` for failures below HTTP.
pub trait LogSource {
    fn list(&self, request: &ListRequest) -> impl Future<Output = Result<ListResponse>> + Send;
}
