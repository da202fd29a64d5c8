// Poll loop - fetch batches from a log source, once or on an interval

use super::batch::BatchProcessor;
use super::render::RenderOptions;
use crate::config::{CredentialScope, TailOptions};
use crate::error::{error_line, CloudtailError, Result};
use crate::source::{ListRequest, LogSource};
use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use std::io::{Stderr, Stdout, Write};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Lower time bound of one fetch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollWindow {
    since: Option<DateTime<Utc>>,
}

impl PollWindow {
    /// No lower bound; the service returns its most recent entries
    pub fn unbounded() -> Self {
        Self { since: None }
    }

    pub fn since(since: DateTime<Utc>) -> Self {
        Self { since: Some(since) }
    }

    /// Window reaching `intervals` poll intervals back from `now`
    ///
    /// Consecutive windows overlap; repeats are absorbed by the dedup cache.
    pub fn overlapping(now: DateTime<Utc>, interval: Duration, intervals: u32) -> Self {
        let span_ms = interval.as_millis().saturating_mul(u128::from(intervals));
        let since = i64::try_from(span_ms)
            .ok()
            .and_then(TimeDelta::try_milliseconds)
            .and_then(|span| now.checked_sub_signed(span));
        Self { since }
    }

    pub fn lower_bound(&self) -> Option<DateTime<Utc>> {
        self.since
    }

    /// Logs filter for this window, empty when unbounded
    pub fn filter(&self) -> String {
        match self.since {
            Some(since) => format!(
                "timestamp >= \"{}\"",
                since.to_rfc3339_opts(SecondsFormat::Millis, true)
            ),
            None => String::new(),
        }
    }
}

/// Fetches batches for one project and prints them through a
/// [`BatchProcessor`]
///
/// One poller is one session: its dedup state lives as long as it does.
#[derive(Debug)]
pub struct LogPoller<S, W: Write = Stdout, E: Write = Stderr> {
    source: S,
    project_ref: String,
    credentials: CredentialScope,
    interval: Duration,
    overlap_intervals: u32,
    processor: BatchProcessor<W>,
    errors: E,
}

impl<S: LogSource> LogPoller<S> {
    /// Create a poller printing to stdout and reporting to stderr
    pub fn new(
        source: S,
        project_ref: impl Into<String>,
        credentials: CredentialScope,
        options: &TailOptions,
    ) -> Self {
        Self::with_sinks(
            source,
            project_ref,
            credentials,
            options,
            std::io::stdout(),
            std::io::stderr(),
        )
    }
}

impl<S: LogSource, W: Write, E: Write> LogPoller<S, W, E> {
    /// Create a poller with explicit output and error sinks
    pub fn with_sinks(
        source: S,
        project_ref: impl Into<String>,
        credentials: CredentialScope,
        options: &TailOptions,
        out: W,
        errors: E,
    ) -> Self {
        let render = RenderOptions {
            json: options.json,
            simplified: options.simplified,
        };

        Self {
            source,
            project_ref: project_ref.into(),
            credentials,
            interval: options.poll_interval(),
            overlap_intervals: options.overlap_intervals,
            processor: BatchProcessor::new(render, out),
            errors,
        }
    }

    /// Fetch the most recent batch once and print it
    ///
    /// Errors are returned to the caller, not written to the error sink.
    pub async fn run_once(&mut self) -> Result<Vec<String>> {
        self.fetch(PollWindow::unbounded()).await
    }

    /// Poll every interval until `cancel` fires
    ///
    /// The first fetch happens immediately. A tick waits for the previous
    /// fetch to finish; a failed tick is reported on the error sink and the
    /// loop carries on. Only a failing error sink ends the loop early.
    pub async fn run_watch(&mut self, cancel: CancellationToken) -> Result<()> {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            "Watching {} every {}ms",
            self.project_ref,
            self.interval.as_millis()
        );

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                result = self.tick(Utc::now()) => result,
            };

            match result {
                Ok(lines) => {
                    tracing::debug!("Tick printed {} new entries", lines.len());
                }
                Err(e) => self.report(&e)?,
            }
        }

        tracing::info!("Stopped watching {}", self.project_ref);
        Ok(())
    }

    /// One watch iteration as of `now`
    pub async fn tick(&mut self, now: DateTime<Utc>) -> Result<Vec<String>> {
        let window = PollWindow::overlapping(now, self.interval, self.overlap_intervals);
        self.fetch(window).await
    }

    /// Fetch one window and hand the batch to the processor
    async fn fetch(&mut self, window: PollWindow) -> Result<Vec<String>> {
        let request = ListRequest::newest_first(self.project_ref.as_str(), window.filter());
        let response = self.source.list(&request).await?;

        if !response.is_success() {
            tracing::debug!(
                "Log source answered {} ({})",
                response.status,
                response.status_text
            );
            return Err(CloudtailError::from_status(
                response.status,
                &response.status_text,
                self.credentials.is_local(),
            ));
        }

        self.processor.process(&response.entries)
    }

    /// Write a failed tick to the error sink
    fn report(&mut self, err: &CloudtailError) -> Result<()> {
        tracing::debug!("Tick failed: {:?}", err);
        writeln!(self.errors, "{}", error_line(err))?;
        self.errors.flush()?;
        Ok(())
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn processor(&self) -> &BatchProcessor<W> {
        &self.processor
    }

    pub fn error_output(&self) -> &E {
        &self.errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_unbounded_window_has_empty_filter() {
        assert_eq!(PollWindow::unbounded().filter(), "");
        assert_eq!(PollWindow::unbounded().lower_bound(), None);
    }

    #[test]
    fn test_filter_uses_iso8601_millis() {
        let since = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        assert_eq!(
            PollWindow::since(since).filter(),
            "timestamp >= \"2024-01-01T10:00:00.000Z\""
        );
    }

    #[test]
    fn test_overlapping_window_reaches_back_ten_intervals() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 10, 1, 0).unwrap();
        let window = PollWindow::overlapping(now, Duration::from_millis(6000), 10);
        assert_eq!(
            window.lower_bound(),
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_overlapping_window_out_of_range_is_unbounded() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let window = PollWindow::overlapping(now, Duration::from_secs(u64::MAX), u32::MAX);
        assert_eq!(window.lower_bound(), None);
    }
}
