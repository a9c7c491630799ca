//! Word store interface consumed by the study core

use chrono::{DateTime, Utc};

use crate::error::StoreResult;
use crate::model::{Category, VocabularyItem};

/// Record store holding vocabulary items and categories.
///
/// Implementations must serialize concurrent `record_result` calls for the
/// same item; the study core never locks.
pub trait WordStore {
    fn get_all(&self) -> StoreResult<Vec<VocabularyItem>>;

    fn get_by_id(&self, id: i64) -> StoreResult<Option<VocabularyItem>>;

    /// Insert (id 0) or update; returns the item's id
    fn save(&self, item: &VocabularyItem) -> StoreResult<i64>;

    /// Categories sorted by display order, then name
    fn get_all_categories(&self) -> StoreResult<Vec<Category>>;

    /// Count one answered presentation of `id`. `Ok(None)` if the word is gone.
    fn record_result(
        &self,
        id: i64,
        correct: bool,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<VocabularyItem>> {
        let Some(mut item) = self.get_by_id(id)? else {
            return Ok(None);
        };
        item.record_result(correct, at);
        self.save(&item)?;
        Ok(Some(item))
    }
}

impl<T: WordStore + ?Sized> WordStore for &T {
    fn get_all(&self) -> StoreResult<Vec<VocabularyItem>> {
        (**self).get_all()
    }

    fn get_by_id(&self, id: i64) -> StoreResult<Option<VocabularyItem>> {
        (**self).get_by_id(id)
    }

    fn save(&self, item: &VocabularyItem) -> StoreResult<i64> {
        (**self).save(item)
    }

    fn get_all_categories(&self) -> StoreResult<Vec<Category>> {
        (**self).get_all_categories()
    }

    fn record_result(
        &self,
        id: i64,
        correct: bool,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<VocabularyItem>> {
        (**self).record_result(id, correct, at)
    }
}
