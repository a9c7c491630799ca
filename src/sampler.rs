//! Random batch selection with category and word-type filters

use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::model::{VocabularyItem, ALL, FAVORITES};

/// Category and word-type constraints for a random session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleFilter {
    /// Selected category names; `All` or an empty list disables category filtering
    pub categories: Vec<String>,
    /// Exact word type; `None`, blank or `All` disables the filter
    pub word_type: Option<String>,
}

impl SampleFilter {
    pub fn categories<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            categories: names.into_iter().map(Into::into).collect(),
            word_type: None,
        }
    }

    pub fn with_word_type(mut self, word_type: impl Into<String>) -> Self {
        self.word_type = Some(word_type.into());
        self
    }

    fn selected(&self) -> impl Iterator<Item = &str> {
        self.categories
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
    }

    fn category_filter_active(&self) -> bool {
        self.selected().next().is_some() && !self.selected().any(|c| c == ALL)
    }

    fn word_type(&self) -> Option<&str> {
        self.word_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty() && *t != ALL)
    }

    /// Whether `word` passes both filters
    pub fn matches(&self, word: &VocabularyItem) -> bool {
        self.matches_categories(word) && self.matches_word_type(word)
    }

    fn matches_categories(&self, word: &VocabularyItem) -> bool {
        if !self.category_filter_active() {
            return true;
        }
        let in_selected = || self.selected().any(|c| word.has_category(c));

        if self.selected().any(|c| c == FAVORITES) {
            if self.selected().any(|c| c != FAVORITES) {
                word.is_favorite || in_selected()
            } else {
                word.is_favorite
            }
        } else {
            in_selected()
        }
    }

    fn matches_word_type(&self, word: &VocabularyItem) -> bool {
        match self.word_type() {
            Some(wanted) => word.word_type.as_deref() == Some(wanted),
            None => true,
        }
    }
}

/// Up to `count` random words passing `filter`
pub fn select_random<R>(
    words: &[VocabularyItem],
    count: usize,
    filter: &SampleFilter,
    rng: &mut R,
) -> Vec<VocabularyItem>
where
    R: Rng + ?Sized,
{
    if count == 0 {
        return Vec::new();
    }

    let mut matching: Vec<&VocabularyItem> = words.iter().filter(|w| filter.matches(w)).collect();
    if matching.is_empty() {
        debug!("random selection: no words match {:?}", filter);
        return Vec::new();
    }

    matching.shuffle(rng);
    matching.into_iter().take(count).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    fn word(id: i64, category: Option<&str>, word_type: Option<&str>, favorite: bool) -> VocabularyItem {
        let mut w = VocabularyItem::new(format!("단어{id}"), format!("từ {id}"));
        w.id = id;
        w.category = category.map(str::to_string);
        w.word_type = word_type.map(str::to_string);
        w.is_favorite = favorite;
        w
    }

    fn ids(words: &[VocabularyItem]) -> Vec<i64> {
        let mut ids: Vec<i64> = words.iter().map(|w| w.id).collect();
        ids.sort_unstable();
        ids
    }

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(9)
    }

    #[test]
    fn test_no_filter_returns_permutation() {
        let words: Vec<VocabularyItem> = (1..=8).map(|i| word(i, None, None, false)).collect();
        let picked = select_random(&words, 20, &SampleFilter::default(), &mut rng());
        assert_eq!(ids(&picked), (1..=8).collect::<Vec<i64>>());
    }

    #[test]
    fn test_all_disables_category_filter() {
        let words = vec![word(1, Some("Food"), None, false), word(2, None, None, false)];
        let filter = SampleFilter::categories(["All", "Food"]);
        assert_eq!(select_random(&words, 10, &filter, &mut rng()).len(), 2);
    }

    #[test]
    fn test_favorites_only() {
        let words: Vec<VocabularyItem> = (1..=10)
            .map(|i| word(i, Some("Food"), None, i <= 3))
            .collect();
        let filter = SampleFilter::categories(["Favorites"]);
        assert_eq!(ids(&select_random(&words, 10, &filter, &mut rng())), vec![1, 2, 3]);
        assert_eq!(select_random(&words, 2, &filter, &mut rng()).len(), 2);
    }

    #[test]
    fn test_favorites_or_category() {
        let words = vec![
            word(1, Some("Food"), None, false),
            word(2, Some("Travel"), None, true),
            word(3, Some("Travel"), None, false),
        ];
        let filter = SampleFilter::categories(["Favorites", "Food"]);
        assert_eq!(ids(&select_random(&words, 10, &filter, &mut rng())), vec![1, 2]);
    }

    #[test]
    fn test_whole_token_category_match() {
        let words = vec![word(1, Some("Greetings,Common"), None, false)];
        let common = SampleFilter::categories(["Common"]);
        let comm = SampleFilter::categories(["Comm"]);
        assert_eq!(select_random(&words, 5, &common, &mut rng()).len(), 1);
        assert!(select_random(&words, 5, &comm, &mut rng()).is_empty());
    }

    #[test]
    fn test_word_type_filter() {
        let words = vec![
            word(1, None, Some("동사"), false),
            word(2, None, Some("명사"), false),
            word(3, None, None, false),
        ];
        let verbs = SampleFilter::default().with_word_type("동사");
        assert_eq!(ids(&select_random(&words, 5, &verbs, &mut rng())), vec![1]);

        let any = SampleFilter::default().with_word_type("All");
        assert_eq!(select_random(&words, 5, &any, &mut rng()).len(), 3);
    }

    #[test]
    fn test_count_limits_result() {
        let words: Vec<VocabularyItem> = (1..=10).map(|i| word(i, None, None, false)).collect();
        let picked = select_random(&words, 4, &SampleFilter::default(), &mut rng());
        assert_eq!(picked.len(), 4);
        let unique: HashSet<i64> = picked.iter().map(|w| w.id).collect();
        assert_eq!(unique.len(), 4);
        assert!(select_random(&words, 0, &SampleFilter::default(), &mut rng()).is_empty());
    }
}
