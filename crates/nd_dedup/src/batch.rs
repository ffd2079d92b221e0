use std::collections::HashSet;
use std::fmt;

use crate::similarity::{ratio, DEFAULT_SIMILARITY_THRESHOLD};

/// Anything carrying the two comparison keys the batch filter looks at.
pub trait DedupKeys {
    fn url_norm(&self) -> &str;
    fn title_norm(&self) -> &str;
}

impl DedupKeys for (String, String) {
    fn url_norm(&self) -> &str {
        &self.0
    }

    fn title_norm(&self) -> &str {
        &self.1
    }
}

/// Why a candidate was dropped within its own ingestion batch.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchRejection {
    SeenUrl,
    SeenTitle,
    SimilarTitle { matched: String, ratio: f64 },
}

impl fmt::Display for BatchRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchRejection::SeenUrl => write!(f, "url already seen in this batch"),
            BatchRejection::SeenTitle => write!(f, "title already seen in this batch"),
            BatchRejection::SimilarTitle { matched, ratio } => {
                write!(f, "title similar to \"{}\" ({:.3})", matched, ratio)
            }
        }
    }
}

/// Cross-source filter for one ingestion cycle. Build one at the start of a
/// cycle and drop it at the end; the first candidate seen for a story wins.
///
/// Fuzzy comparison walks every admitted title, so a batch costs O(n²)
/// ratio computations.
#[derive(Debug)]
pub struct BatchDeduplicator {
    threshold: f64,
    seen_url_norms: HashSet<String>,
    /// Admitted titles in admission order.
    seen_title_norms: Vec<String>,
    seen_title_set: HashSet<String>,
}

impl Default for BatchDeduplicator {
    fn default() -> Self {
        Self::new(DEFAULT_SIMILARITY_THRESHOLD)
    }
}

impl BatchDeduplicator {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            seen_url_norms: HashSet::new(),
            seen_title_norms: Vec::new(),
            seen_title_set: HashSet::new(),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Checks a candidate against what has been admitted so far without recording it.
    pub fn check<C: DedupKeys + ?Sized>(&self, candidate: &C) -> Result<(), BatchRejection> {
        if self.seen_url_norms.contains(candidate.url_norm()) {
            return Err(BatchRejection::SeenUrl);
        }

        let title = candidate.title_norm();
        if self.seen_title_set.contains(title) {
            return Err(BatchRejection::SeenTitle);
        }

        for seen in &self.seen_title_norms {
            let score = ratio(title, seen);
            if score >= self.threshold {
                return Err(BatchRejection::SimilarTitle {
                    matched: seen.clone(),
                    ratio: score,
                });
            }
        }

        Ok(())
    }

    /// Checks a candidate and, if it passes, records its keys.
    pub fn admit<C: DedupKeys + ?Sized>(&mut self, candidate: &C) -> Result<(), BatchRejection> {
        self.check(candidate)?;
        self.seen_url_norms.insert(candidate.url_norm().to_string());
        self.seen_title_set.insert(candidate.title_norm().to_string());
        self.seen_title_norms.push(candidate.title_norm().to_string());
        Ok(())
    }

    /// Keeps the candidates that pass, in order, handing each rejection to `on_reject`.
    pub fn filter<C, F>(&mut self, candidates: Vec<C>, mut on_reject: F) -> Vec<C>
    where
        C: DedupKeys,
        F: FnMut(&C, BatchRejection),
    {
        let mut admitted = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            match self.admit(&candidate) {
                Ok(()) => admitted.push(candidate),
                Err(reason) => on_reject(&candidate, reason),
            }
        }
        admitted
    }

    pub fn len(&self) -> usize {
        self.seen_title_norms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen_title_norms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(url: &str, title: &str) -> (String, String) {
        (url.to_string(), title.to_string())
    }

    #[test]
    fn test_rejects_seen_url() {
        let mut batch = BatchDeduplicator::default();
        batch.admit(&keys("https://x.com/a", "fed cuts rates")).unwrap();
        assert_eq!(
            batch.admit(&keys("https://x.com/a", "apple launches iphone")),
            Err(BatchRejection::SeenUrl)
        );
    }

    #[test]
    fn test_rejects_exact_title() {
        let mut batch = BatchDeduplicator::default();
        batch.admit(&keys("https://x.com/a", "fed cuts rates")).unwrap();
        assert_eq!(
            batch.admit(&keys("https://y.com/b", "fed cuts rates")),
            Err(BatchRejection::SeenTitle)
        );
    }

    #[test]
    fn test_rejects_similar_title() {
        let mut batch = BatchDeduplicator::default();
        batch.admit(&keys("https://x.com/a", "fed cuts rates by 50bps")).unwrap();
        match batch.admit(&keys("https://y.com/b", "fed cuts rates by 50 bps")) {
            Err(BatchRejection::SimilarTitle { matched, ratio }) => {
                assert_eq!(matched, "fed cuts rates by 50bps");
                assert!(ratio >= DEFAULT_SIMILARITY_THRESHOLD);
            }
            other => panic!("expected a similar-title rejection, got {:?}", other),
        }
        assert_eq!(batch.len(), 1);
    }

    #[test]
    fn test_rejected_candidates_are_not_recorded() {
        let mut batch = BatchDeduplicator::default();
        batch.admit(&keys("https://x.com/a", "fed cuts rates")).unwrap();
        // rejected for its title; its url must stay unseen
        assert!(batch.admit(&keys("https://y.com/b", "fed cuts rates")).is_err());
        assert!(batch.admit(&keys("https://y.com/b", "apple launches iphone")).is_ok());
    }

    #[test]
    fn test_first_seen_wins() {
        let mut batch = BatchDeduplicator::default();
        let mut rejected = Vec::new();
        let admitted = batch.filter(
            vec![
                keys("https://x.com/a", "microsoft beats estimates"),
                keys("https://y.com/a", "microsoft beats estimate"),
                keys("https://z.com/c", "meta unveils new headset"),
            ],
            |candidate, reason| rejected.push((candidate.0.clone(), reason)),
        );

        assert_eq!(admitted.len(), 2);
        assert_eq!(admitted[0].0, "https://x.com/a");
        assert_eq!(admitted[1].0, "https://z.com/c");
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].0, "https://y.com/a");
    }

    #[test]
    fn test_check_does_not_record() {
        let batch = BatchDeduplicator::default();
        assert!(batch.check(&keys("https://x.com/a", "t")).is_ok());
        assert!(batch.is_empty());
    }

    #[test]
    fn test_custom_threshold() {
        let mut batch = BatchDeduplicator::new(0.5);
        batch.admit(&keys("https://x.com/a", "abcd")).unwrap();
        assert!(batch.admit(&keys("https://x.com/b", "bcde")).is_err());
    }

    #[test]
    fn test_rejection_display() {
        let reason = BatchRejection::SimilarTitle { matched: "fed cuts rates".to_string(), ratio: 0.95 };
        assert_eq!(reason.to_string(), "title similar to \"fed cuts rates\" (0.950)");
    }
}
