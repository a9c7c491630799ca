//! Review-first batch selection for a study session
//!
//! Words that were never studied or are answered correctly less than 70% of
//! the time are picked first: never-studied words ahead of studied ones, then
//! by ascending accuracy. Any remaining slots are filled with the newest of
//! the other words, and the batch is shuffled.

use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::model::VocabularyItem;

/// Pick up to `count` words for a review session, in random order
pub fn select_for_review<R>(words: &[VocabularyItem], count: usize, rng: &mut R) -> Vec<VocabularyItem>
where
    R: Rng + ?Sized,
{
    if words.is_empty() || count == 0 {
        debug!("review selection skipped: {} words, count {}", words.len(), count);
        return Vec::new();
    }

    let (mut review, mut rest): (Vec<&VocabularyItem>, Vec<&VocabularyItem>) =
        words.iter().partition(|w| w.needs_review());

    // Stable: ties keep input order
    review.sort_by(|a, b| {
        review_rank(a)
            .cmp(&review_rank(b))
            .then_with(|| a.accuracy().total_cmp(&b.accuracy()))
    });
    review.truncate(count);

    let mut selected: Vec<VocabularyItem> = review.into_iter().cloned().collect();

    if selected.len() < count {
        rest.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let backfill = rest
            .into_iter()
            .take(count - selected.len())
            .cloned()
            .collect::<Vec<_>>();
        debug!(
            "review selection: {} due, {} backfilled",
            selected.len(),
            backfill.len()
        );
        selected.extend(backfill);
    }

    selected.shuffle(rng);
    selected
}

/// 0 for never-studied words, 1 otherwise
fn review_rank(word: &VocabularyItem) -> u8 {
    if word.is_unstudied() {
        0
    } else {
        1
    }
}
