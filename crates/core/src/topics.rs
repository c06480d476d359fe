//! Per-slide topic sequencing.

use std::sync::Arc;

use crate::source::SearchSource;

/// Turns a root topic into one topic per slide position.
pub trait TopicSequencer: Send + Sync {
    /// Exactly `count` topics; position 0 is always the root topic.
    fn sequence(&self, topic: &str, count: usize) -> Vec<String>;
}

/// Shared topic sequencer.
pub type BoxedSequencer = Arc<dyn TopicSequencer>;

/// Uses the root topic for every slide.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTopics;

impl TopicSequencer for IdentityTopics {
    fn sequence(&self, topic: &str, count: usize) -> Vec<String> {
        vec![topic.to_string(); count]
    }
}

/// Spreads related words over the deck.
///
/// The pool is the root topic followed by distinct related words in the
/// order the source returned them; positions cycle through the pool. With
/// no related words every position gets the root topic.
pub struct SynonymTopics {
    source: Arc<dyn SearchSource>,
    limit: usize,
}

impl SynonymTopics {
    pub fn new(source: Arc<dyn SearchSource>, limit: usize) -> Self {
        Self { source, limit }
    }

    fn pool(&self, topic: &str) -> Vec<String> {
        let root = topic.trim();
        let mut pool = vec![root.to_string()];

        for word in self.source.search(root, self.limit) {
            let word = word.trim();
            if word.is_empty() || pool.iter().any(|seen| seen.eq_ignore_ascii_case(word)) {
                continue;
            }
            pool.push(word.to_string());
        }

        pool
    }
}

impl TopicSequencer for SynonymTopics {
    fn sequence(&self, topic: &str, count: usize) -> Vec<String> {
        let pool = self.pool(topic);
        log::debug!("Topic pool for '{}': {:?}", topic, pool);
        (0..count).map(|i| pool[i % pool.len()].clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::EmptySource;

    struct Related(Vec<&'static str>);

    impl SearchSource for Related {
        fn search(&self, _query: &str, limit: usize) -> Vec<String> {
            self.0.iter().take(limit).map(|s| s.to_string()).collect()
        }
    }

    #[test]
    fn test_identity_repeats_root() {
        assert_eq!(IdentityTopics.sequence("cat", 3), vec!["cat", "cat", "cat"]);
        assert!(IdentityTopics.sequence("cat", 0).is_empty());
    }

    #[test]
    fn test_synonyms_start_with_root_and_cycle() {
        let sequencer = SynonymTopics::new(Arc::new(Related(vec!["kitten", "feline"])), 10);
        assert_eq!(
            sequencer.sequence("cat", 5),
            vec!["cat", "kitten", "feline", "cat", "kitten"]
        );
    }

    #[test]
    fn test_synonyms_skip_duplicates_and_blanks() {
        let sequencer = SynonymTopics::new(Arc::new(Related(vec!["Cat", " ", "kitten", "kitten"])), 10);
        assert_eq!(sequencer.sequence("cat", 3), vec!["cat", "kitten", "cat"]);
    }

    #[test]
    fn test_synonyms_fall_back_to_root() {
        let sequencer = SynonymTopics::new(Arc::new(EmptySource), 10);
        assert_eq!(sequencer.sequence("cat", 2), vec!["cat", "cat"]);
    }

    #[test]
    fn test_synonyms_respect_limit() {
        let sequencer = SynonymTopics::new(Arc::new(Related(vec!["a", "b", "c"])), 1);
        assert_eq!(sequencer.sequence("cat", 4), vec!["cat", "a", "cat", "a"]);
    }
}
