//! Answer grading with near-miss feedback for typed answers

use serde::Serialize;
use strsim::{jaro_winkler, levenshtein, normalized_levenshtein};

/// Similarity at or above which a wrong answer counts as a near miss
pub const NEAR_MISS_THRESHOLD: f64 = 0.8;

/// Result of comparing a submitted answer with the expected one
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grade {
    pub is_correct: bool,
    /// 1.0 for an exact match
    pub similarity: f64,
    /// Levenshtein distance between the normalized strings
    pub distance: usize,
}

impl Grade {
    /// Wrong, but close enough to hint "almost"
    pub fn is_near_miss(&self) -> bool {
        !self.is_correct && self.similarity >= NEAR_MISS_THRESHOLD
    }
}

pub fn normalize_answer(answer: &str) -> String {
    answer.trim().to_lowercase()
}

/// Trimmed, case-insensitive equality
pub fn answers_match(submitted: &str, expected: &str) -> bool {
    normalize_answer(submitted) == normalize_answer(expected)
}

pub fn grade(submitted: &str, expected: &str) -> Grade {
    let input = normalize_answer(submitted);
    let expected = normalize_answer(expected);

    if input == expected {
        return Grade {
            is_correct: true,
            similarity: 1.0,
            distance: 0,
        };
    }

    // Jaro-Winkler weighted higher, it is kinder to typos
    let similarity = normalized_levenshtein(&input, &expected) * 0.4 + jaro_winkler(&input, &expected) * 0.6;

    Grade {
        is_correct: false,
        similarity,
        distance: levenshtein(&input, &expected),
    }
}
