//! Value cache: rendered value prompt → score.
//!
//! Owned by the task and shared by every search run on that task instance. Entries are
//! never evicted and never replaced; the first stored score for a prompt is authoritative.

use std::collections::HashMap;

use crate::search::Score;

/// Score cache keyed by the rendered value prompt (not by candidate identity).
#[derive(Clone, Debug, Default)]
pub struct ValueCache {
    entries: HashMap<String, Score>,
}

impl ValueCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached score for a rendered prompt.
    pub fn get(&self, prompt: &str) -> Option<Score> {
        self.entries.get(prompt).copied()
    }

    /// Stores `score` for `prompt` unless an entry exists; returns the score now cached.
    pub fn insert(&mut self, prompt: impl Into<String>, score: Score) -> Score {
        *self.entries.entry(prompt.into()).or_insert(score)
    }

    pub fn contains(&self, prompt: &str) -> bool {
        self.entries.contains_key(prompt)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_insert_wins() {
        let mut cache = ValueCache::new();
        assert_eq!(cache.insert("p", 1.0), 1.0);
        assert_eq!(cache.insert("p", 5.0), 1.0);
        assert_eq!(cache.get("p"), Some(1.0));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn missing_key_is_none() {
        let cache = ValueCache::new();
        assert!(cache.get("absent").is_none());
        assert!(cache.is_empty());
        assert!(!cache.contains("absent"));
    }
}
