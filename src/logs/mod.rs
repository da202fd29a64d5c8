// Logs module - Rendering, deduplication and polling of log entries

mod batch;
mod cache;
mod entry;
mod poller;
mod render;
mod severity;

pub use batch::{BatchProcessor, MAX_ENTRIES_PER_BATCH};
pub use cache::DedupCache;
pub use entry::{
    LogEntry, MonitoredResource, Payload, StructuredPayload, AUDIT_LOG_TYPE, DEFAULT_SEVERITY,
};
pub use poller::{LogPoller, PollWindow};
pub use render::{
    render_entry, RenderOptions, AUDIT_LOG_SETUP, MISSING_FUNCTION_NAME, UNKNOWN_PAYLOAD,
};
pub use severity::format_severity;
