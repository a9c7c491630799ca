//! Aggregate study statistics over the vocabulary

use serde::Serialize;

use crate::model::VocabularyItem;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProgressStats {
    pub total_words: usize,
    pub studied: usize,
    pub never_studied: usize,
    pub needs_review: usize,
    pub favorites: usize,
    /// Sum of presentations over all words
    pub total_attempts: u64,
    pub correct_attempts: u64,
    pub accuracy_percent: f64,
}

impl ProgressStats {
    pub fn from_words(words: &[VocabularyItem]) -> Self {
        let mut stats = ProgressStats {
            total_words: words.len(),
            ..Default::default()
        };

        for word in words {
            if word.is_unstudied() {
                stats.never_studied += 1;
            } else {
                stats.studied += 1;
            }
            if word.needs_review() {
                stats.needs_review += 1;
            }
            if word.is_favorite {
                stats.favorites += 1;
            }
            stats.total_attempts += u64::from(word.study_count);
            stats.correct_attempts += u64::from(word.correct_count);
        }

        if stats.total_attempts > 0 {
            stats.accuracy_percent = stats.correct_attempts as f64 / stats.total_attempts as f64 * 100.0;
        }
        stats
    }
}
