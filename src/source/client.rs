// Cloud Logging REST client (entries:list)

use super::{ListRequest, ListResponse, LogSource};
use crate::error::{CloudtailError, Result};
use crate::logs::LogEntry;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use ureq::tls::{RootCerts, TlsConfig, TlsProvider};
use ureq::Agent;

/// Public Cloud Logging endpoint for listing entries
pub const DEFAULT_ENDPOINT: &str = "https://logging.googleapis.com/v2/entries:list";

/// Maximum response body size accepted from the service (10 MB)
const MAX_RESPONSE_SIZE: u64 = 10 * 1024 * 1024;

/// Body of a successful entries:list response
#[derive(Debug, Deserialize)]
struct ListEntriesBody {
    #[serde(default)]
    entries: Vec<Value>,
}

/// Body of a Google API error response
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
}

/// Blocking HTTPS client, driven from a blocking task
#[derive(Clone)]
pub struct CloudLoggingClient {
    agent: Agent,
    endpoint: String,
    access_token: String,
}

impl CloudLoggingClient {
    /// Create a client for `endpoint` authenticating with a bearer token
    pub fn new(
        endpoint: impl Into<String>,
        access_token: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let tls_config = TlsConfig::builder()
            .provider(TlsProvider::NativeTls)
            .root_certs(RootCerts::PlatformVerifier)
            .build();

        // Non-2xx statuses are mapped by the caller, not raised by ureq.
        let agent: Agent = Agent::config_builder()
            .tls_config(tls_config)
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            endpoint: endpoint.into(),
            access_token: access_token.into(),
        }
    }

    /// Perform one entries:list call on the current thread
    fn list_blocking(&self, request: &ListRequest) -> Result<ListResponse> {
        let body = serde_json::to_vec(request).map_err(|e| {
            CloudtailError::SerializationError(format!("Failed to serialize request: {}", e))
        })?;

        let mut response = self
            .agent
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.access_token))
            .header("Content-Type", "application/json")
            .send(&body[..])
            .map_err(|e| {
                CloudtailError::Network(format!("Request to {} failed: {}", self.endpoint, e))
            })?;

        let status = response.status();
        let text = response
            .body_mut()
            .with_config()
            .limit(MAX_RESPONSE_SIZE)
            .read_to_string()
            .map_err(|e| {
                CloudtailError::Network(format!(
                    "Failed to read response from {}: {}",
                    self.endpoint, e
                ))
            })?;

        if status.as_u16() != 200 {
            let reason = status.canonical_reason().unwrap_or("Unknown status");
            return Ok(ListResponse::failed(
                status.as_u16(),
                error_message(&text).unwrap_or_else(|| reason.to_string()),
            ));
        }

        let parsed: ListEntriesBody = serde_json::from_str(&text).map_err(|e| {
            CloudtailError::DeserializationError(format!("Failed to parse log entries: {}", e))
        })?;

        Ok(ListResponse::ok(
            parsed.entries.into_iter().map(LogEntry::from_raw).collect(),
        ))
    }
}

impl LogSource for CloudLoggingClient {
    async fn list(&self, request: &ListRequest) -> Result<ListResponse> {
        let client = self.clone();
        let request = request.clone();

        tracing::debug!(
            "Listing entries from {} (filter: {:?})",
            client.endpoint,
            request.filter
        );

        tokio::task::spawn_blocking(move || client.list_blocking(&request))
            .await
            .map_err(|e| CloudtailError::Other(format!("Log fetch task failed: {}", e)))?
    }
}

impl fmt::Debug for CloudLoggingClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudLoggingClient")
            .field("endpoint", &self.endpoint)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Extract `error.message` from a Google API error body
fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .map(|b| b.error.message)
        .filter(|m| !m.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_from_api_body() {
        let body = r#"{"error":{"code":403,"message":"The caller does not have permission","status":"PERMISSION_DENIED"}}"#;
        assert_eq!(
            error_message(body),
            Some("The caller does not have permission".to_string())
        );
    }

    #[test]
    fn test_error_message_missing() {
        assert_eq!(error_message("<html>Bad Gateway</html>"), None);
        assert_eq!(error_message(r#"{"error":{}}"#), None);
    }

    #[test]
    fn test_debug_redacts_token() {
        let client = CloudLoggingClient::new(DEFAULT_ENDPOINT, "secret-token", Duration::from_secs(5));
        let debug = format!("{:?}", client);
        assert!(debug.contains(DEFAULT_ENDPOINT));
        assert!(!debug.contains("secret-token"));
    }

    #[test]
    fn test_malformed_entry_does_not_fail_the_body() {
        let parsed: ListEntriesBody = serde_json::from_str(
            r#"{"entries":[{"insertId":"ok","severity":"INFO"},{"insertId":"bad","timestamp":42}]}"#,
        )
        .unwrap();
        let entries: Vec<LogEntry> = parsed.entries.into_iter().map(LogEntry::from_raw).collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].insert_id.as_deref(), Some("bad"));
    }

    #[test]
    fn test_entries_body_defaults_to_empty() {
        let parsed: ListEntriesBody = serde_json::from_str("{}").unwrap();
        assert!(parsed.entries.is_empty());
    }
}
