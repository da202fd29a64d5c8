use std::collections::HashSet;

/// Ids of entries already printed during one session
///
/// Grows for the life of the session and is never pruned.
#[derive(Debug, Clone, Default)]
pub struct DedupCache {
    seen: HashSet<String>,
}

impl DedupCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `id` was marked earlier in this session
    pub fn seen(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    /// Record `id` as printed; marking twice is a no-op
    pub fn mark(&mut self, id: &str) {
        if !self.seen.contains(id) {
            self.seen.insert(id.to_string());
        }
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
