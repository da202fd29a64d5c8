// Batch processing: order, cap, dedup and print one fetched batch

use super::cache::DedupCache;
use super::entry::LogEntry;
use super::render::{render_entry, RenderOptions};
use crate::error::Result;
use std::io::{Stdout, Write};

/// At most this many entries of a batch are considered
pub const MAX_ENTRIES_PER_BATCH: usize = 50;

/// Prints batches of entries to an output sink, skipping repeats
///
/// Owns the session's [`DedupCache`], so two processors never share
/// printed state.
#[derive(Debug)]
pub struct BatchProcessor<W: Write = Stdout> {
    options: RenderOptions,
    cache: DedupCache,
    out: W,
}

impl<W: Write> BatchProcessor<W> {
    pub fn new(options: RenderOptions, out: W) -> Self {
        Self {
            options,
            cache: DedupCache::new(),
            out,
        }
    }

    /// Print the new entries of a batch and return the printed lines
    ///
    /// The batch arrives newest-first; it is printed oldest-first. Entries
    /// past [`MAX_ENTRIES_PER_BATCH`] are dropped. Each line is written and
    /// flushed before its id is marked.
    pub fn process(&mut self, entries: &[LogEntry]) -> Result<Vec<String>> {
        let mut printed = Vec::new();

        for entry in entries.iter().rev().take(MAX_ENTRIES_PER_BATCH) {
            let key = entry.dedup_key();
            if self.cache.seen(&key) {
                continue;
            }

            let line = render_entry(entry, &self.options);
            writeln!(self.out, "{}", line)?;
            self.out.flush()?;
            self.cache.mark(&key);
            printed.push(line);
        }

        Ok(printed)
    }

    pub fn cache(&self) -> &DedupCache {
        &self.cache
    }

    /// Access the output sink
    pub fn output(&self) -> &W {
        &self.out
    }

    /// Consume the processor, returning the output sink
    pub fn into_output(self) -> W {
        self.out
    }
}
