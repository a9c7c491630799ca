//! Vocabulary items, categories and the word-type catalogue

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Accuracy below which a studied word is due for review
pub const REVIEW_ACCURACY_THRESHOLD: f64 = 0.7;

/// Pseudo-category matching every word. Also the "no word-type filter" sentinel.
pub const ALL: &str = "All";
pub const FAVORITES: &str = "Favorites";
pub const NEW: &str = "New";
pub const NEEDS_REVIEW: &str = "NeedsReview";

/// Reserved categories with their seed colors, in display order
pub const RESERVED_CATEGORIES: [(&str, &str); 4] = [
    (ALL, "#512BD4"),
    (FAVORITES, "#FF6B6B"),
    (NEW, "#4ECDC4"),
    (NEEDS_REVIEW, "#FFE66D"),
];

pub const DEFAULT_CATEGORY_COLOR: &str = "#512BD4";

/// Separator of the comma-joined category field
const CATEGORY_SEPARATOR: char = ',';

/// Vocabulary entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyItem {
    pub id: i64,
    pub korean: String,
    pub meaning: String,
    pub pronunciation: Option<String>,
    pub example_sentence: Option<String>,
    pub example_translation: Option<String>,
    /// Comma-joined category names
    pub category: Option<String>,
    pub word_type: Option<String>,
    /// 1 (easy) to 5 (hard)
    pub difficulty: u8,
    pub study_count: u32,
    pub correct_count: u32,
    /// `None` until the word is answered for the first time
    pub last_studied_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub is_favorite: bool,
}

impl VocabularyItem {
    /// New, unsaved word (id 0) that has never been studied
    pub fn new(korean: impl Into<String>, meaning: impl Into<String>) -> Self {
        Self {
            id: 0,
            korean: korean.into(),
            meaning: meaning.into(),
            pronunciation: None,
            example_sentence: None,
            example_translation: None,
            category: None,
            word_type: None,
            difficulty: 1,
            study_count: 0,
            correct_count: 0,
            last_studied_at: None,
            created_at: Utc::now(),
            is_favorite: false,
        }
    }

    pub fn set_difficulty(&mut self, level: u8) {
        self.difficulty = level.clamp(1, 5);
    }

    /// Ratio of correct answers, 0.0 for a word never presented
    pub fn accuracy(&self) -> f64 {
        if self.study_count == 0 {
            0.0
        } else {
            self.correct_count as f64 / self.study_count as f64
        }
    }

    pub fn is_unstudied(&self) -> bool {
        self.study_count == 0 || self.last_studied_at.is_none()
    }

    pub fn needs_review(&self) -> bool {
        self.is_unstudied() || self.accuracy() < REVIEW_ACCURACY_THRESHOLD
    }

    /// Apply one answered presentation to the counters
    pub fn record_result(&mut self, correct: bool, at: DateTime<Utc>) {
        self.study_count += 1;
        if correct {
            self.correct_count += 1;
        }
        self.last_studied_at = Some(at);
    }

    /// Category names from the comma-joined field
    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.category
            .as_deref()
            .unwrap_or("")
            .split(CATEGORY_SEPARATOR)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Whole-token membership: "Comm" does not match "Greetings,Common"
    pub fn has_category(&self, name: &str) -> bool {
        let name = name.trim();
        !name.is_empty() && self.category_names().any(|c| c == name)
    }

    /// Drop `name` from the category field. Returns true if it was present.
    pub fn remove_category(&mut self, name: &str) -> bool {
        if !self.has_category(name) {
            return false;
        }
        let kept: Vec<String> = self
            .category_names()
            .filter(|c| *c != name.trim())
            .map(str::to_string)
            .collect();
        self.category = join_categories(kept);
        true
    }
}

/// Join category names into the stored field; `None` when nothing is left
pub fn join_categories<I, S>(names: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let names: Vec<String> = names
        .into_iter()
        .map(|n| n.as_ref().trim().to_string())
        .filter(|n| !n.is_empty())
        .collect();

    if names.is_empty() {
        None
    } else {
        Some(names.join(","))
    }
}

/// User-defined or reserved category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    /// Hex color, e.g. `#512BD4`
    pub color: String,
    pub display_order: u32,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            color: DEFAULT_CATEGORY_COLOR.to_string(),
            display_order: 0,
            created_at: Utc::now(),
        }
    }

    pub fn is_reserved(&self) -> bool {
        is_reserved_name(&self.name)
    }
}

pub fn is_reserved_name(name: &str) -> bool {
    RESERVED_CATEGORIES.iter().any(|(reserved, _)| *reserved == name)
}

/// Categories a word can be tagged with (reserved pseudo-filters excluded)
pub fn assignable(categories: &[Category]) -> Vec<&Category> {
    categories.iter().filter(|c| !c.is_reserved()).collect()
}

// ============= Word types =============

/// Korean parts of speech offered for the word-type tag
pub const WORD_TYPES: [&str; 9] = [
    "명사",
    "동사",
    "형용사",
    "부사",
    "대명사",
    "조사",
    "감탄사",
    "수사",
    "관형사",
];

/// Vietnamese label for a Korean part of speech; unknown input is echoed
pub fn word_type_label(word_type: &str) -> &str {
    match word_type {
        "명사" => "Danh từ",
        "동사" => "Động từ",
        "형용사" => "Tính từ",
        "부사" => "Trạng từ",
        "대명사" => "Đại từ",
        "조사" => "Trợ từ",
        "감탄사" => "Thán từ",
        "수사" => "Số từ",
        "관형사" => "Quán từ",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged(category: &str) -> VocabularyItem {
        let mut item = VocabularyItem::new("안녕", "xin chào");
        item.category = Some(category.to_string());
        item
    }

    #[test]
    fn test_whole_token_membership() {
        let item = tagged("Greetings,Common");
        assert!(item.has_category("Common"));
        assert!(item.has_category("Greetings"));
        assert!(!item.has_category("Comm"));
        assert!(!item.has_category("Greet"));
        assert!(!item.has_category(""));
    }

    #[test]
    fn test_single_token_membership() {
        let item = tagged("Common");
        assert!(item.has_category("Common"));
        assert!(!item.has_category("Commons"));
        assert!(!VocabularyItem::new("a", "b").has_category("Common"));
    }

    #[test]
    fn test_remove_category() {
        let mut item = tagged("Greetings,Common");
        assert!(item.remove_category("Greetings"));
        assert_eq!(item.category.as_deref(), Some("Common"));
        assert!(!item.remove_category("Greetings"));
        assert!(item.remove_category("Common"));
        assert_eq!(item.category, None);
    }

    #[test]
    fn test_join_categories_skips_blanks() {
        assert_eq!(join_categories(["Food", " ", "Travel "]).as_deref(), Some("Food,Travel"));
        assert_eq!(join_categories(Vec::<String>::new()), None);
    }

    #[test]
    fn test_needs_review() {
        let mut item = VocabularyItem::new("사과", "quả táo");
        assert!(item.is_unstudied());
        assert!(item.needs_review());

        let now = Utc::now();
        for _ in 0..3 {
            item.record_result(true, now);
        }
        assert!(!item.needs_review());
        assert_eq!(item.accuracy(), 1.0);

        item.record_result(false, now);
        item.record_result(false, now);
        // 3 / 5 = 0.6
        assert!(item.needs_review());
        assert!(item.correct_count <= item.study_count);
    }

    #[test]
    fn test_difficulty_clamped() {
        let mut item = VocabularyItem::new("물", "nước");
        item.set_difficulty(9);
        assert_eq!(item.difficulty, 5);
        item.set_difficulty(0);
        assert_eq!(item.difficulty, 1);
    }

    #[test]
    fn test_assignable_excludes_reserved() {
        let categories = vec![Category::new(ALL), Category::new("Food"), Category::new(NEEDS_REVIEW)];
        let names: Vec<&str> = assignable(&categories).iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Food"]);
    }

    #[test]
    fn test_word_type_label() {
        assert_eq!(word_type_label("동사"), "Động từ");
        assert_eq!(word_type_label("unknown"), "unknown");
    }
}
