//! SQLite-backed word store

use std::path::Path;

use chrono::{DateTime, Utc};
use log::{debug, info};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::categories::filter_by_category;
use crate::error::{StoreError, StoreResult};
use crate::model::{is_reserved_name, Category, VocabularyItem, RESERVED_CATEGORIES};
use crate::store::WordStore;

const WORD_COLUMNS: &str = "id, korean, meaning, pronunciation, example_sentence, example_translation, \
     category, word_type, difficulty, study_count, correct_count, last_studied_at, created_at, is_favorite";

const CATEGORY_COLUMNS: &str = "id, name, color, display_order, created_at";

/// Word store over a single SQLite connection
pub struct SqliteWordStore {
    conn: Connection,
}

impl SqliteWordStore {
    /// Open (or create) the database at `path` and make sure the schema exists
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        info!("opened vocabulary database at {}", path.display());
        Self::init(conn)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS vocabulary (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                korean TEXT NOT NULL,
                meaning TEXT NOT NULL,
                pronunciation TEXT,
                example_sentence TEXT,
                example_translation TEXT,
                category TEXT,
                word_type TEXT,
                difficulty INTEGER NOT NULL DEFAULT 1,
                study_count INTEGER NOT NULL DEFAULT 0,
                correct_count INTEGER NOT NULL DEFAULT 0,
                last_studied_at TEXT,
                created_at TEXT NOT NULL,
                is_favorite INTEGER NOT NULL DEFAULT 0
            );
            CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                color TEXT NOT NULL,
                display_order INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            );",
        )?;

        let store = Self { conn };
        store.seed_reserved_categories()?;
        Ok(store)
    }

    /// Make sure the reserved categories exist at orders 0..3 and renumber the
    /// rest from 4 in their current order
    fn seed_reserved_categories(&self) -> StoreResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        let now = Utc::now();
        let mut inserted = 0;
        for (order, (name, color)) in RESERVED_CATEGORIES.iter().enumerate() {
            inserted += tx.execute(
                "INSERT OR IGNORE INTO categories (name, color, display_order, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![name, color, order as u32, now],
            )?;
            tx.execute(
                "UPDATE categories SET display_order = ?1 WHERE name = ?2",
                params![order as u32, name],
            )?;
        }

        let user_ids = {
            let mut stmt = tx.prepare("SELECT id, name FROM categories ORDER BY display_order, name")?;
            let rows = stmt
                .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows.into_iter()
                .filter(|(_, name)| !is_reserved_name(name))
                .map(|(id, _)| id)
                .collect::<Vec<_>>()
        };
        for (offset, id) in user_ids.iter().enumerate() {
            tx.execute(
                "UPDATE categories SET display_order = ?1 WHERE id = ?2",
                params![(RESERVED_CATEGORIES.len() + offset) as u32, id],
            )?;
        }
        tx.commit()?;

        if inserted > 0 {
            debug!("seeded {} reserved categories", inserted);
        }
        Ok(())
    }

    // ==================== Word Operations ====================

    pub fn delete_word(&self, id: i64) -> StoreResult<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM vocabulary WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    /// Words shown under a category in the vocabulary list, newest first
    pub fn words_in_category(&self, name: &str) -> StoreResult<Vec<VocabularyItem>> {
        let words = self.get_all()?;
        Ok(filter_by_category(&words, name).into_iter().cloned().collect())
    }

    /// Case- and whitespace-insensitive search over Korean, meaning and pronunciation
    pub fn search(&self, text: &str) -> StoreResult<Vec<VocabularyItem>> {
        let needle = squash(text);
        let words = self.get_all()?;
        Ok(words
            .into_iter()
            .filter(|w| {
                squash(&w.korean).contains(&needle)
                    || squash(&w.meaning).contains(&needle)
                    || w.pronunciation.as_deref().is_some_and(|p| squash(p).contains(&needle))
            })
            .collect())
    }

    /// Existing word with the same Korean text, ignoring case and spacing
    pub fn find_duplicate(&self, korean: &str, exclude_id: Option<i64>) -> StoreResult<Option<VocabularyItem>> {
        let target = squash(korean);
        let words = self.get_all()?;
        Ok(words
            .into_iter()
            .find(|w| Some(w.id) != exclude_id && squash(&w.korean) == target))
    }

    // ==================== Category Operations ====================

    pub fn get_category(&self, id: i64) -> StoreResult<Option<Category>> {
        let category = self
            .conn
            .query_row(
                &format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ?1"),
                params![id],
                row_to_category,
            )
            .optional()?;
        Ok(category)
    }

    /// Insert (id 0, appended after the last category) or update; returns the id
    pub fn save_category(&self, category: &Category) -> StoreResult<i64> {
        if category.id != 0 {
            let stored = self
                .get_category(category.id)?
                .ok_or(StoreError::CategoryNotFound(category.id))?;
            if is_reserved_name(&stored.name) && stored.name != category.name {
                return Err(StoreError::ReservedCategory(stored.name));
            }
            let updated = self.conn.execute(
                "UPDATE categories SET name = ?1, color = ?2, display_order = ?3 WHERE id = ?4",
                params![category.name, category.color, category.display_order, category.id],
            )?;
            if updated == 0 {
                return Err(StoreError::CategoryNotFound(category.id));
            }
            return Ok(category.id);
        }

        let next_order: u32 = self.conn.query_row(
            "SELECT COALESCE(MAX(display_order) + 1, 0) FROM categories",
            [],
            |row| row.get(0),
        )?;
        self.conn.execute(
            "INSERT INTO categories (name, color, display_order, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![category.name, category.color, next_order, Utc::now()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Persist display orders of the given categories in one transaction
    pub fn update_category_order(&self, categories: &[Category]) -> StoreResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        for category in categories {
            tx.execute(
                "UPDATE categories SET display_order = ?1 WHERE id = ?2",
                params![category.display_order, category.id],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Delete a user category and untag its words. Returns the number of words re-tagged.
    pub fn delete_category(&self, id: i64) -> StoreResult<usize> {
        let category = self
            .get_category(id)?
            .ok_or(StoreError::CategoryNotFound(id))?;
        if is_reserved_name(&category.name) {
            return Err(StoreError::ReservedCategory(category.name));
        }

        let tx = self.conn.unchecked_transaction()?;
        let mut retagged = 0;
        for mut word in self.get_all()? {
            if word.remove_category(&category.name) {
                tx.execute(
                    "UPDATE vocabulary SET category = ?1 WHERE id = ?2",
                    params![word.category, word.id],
                )?;
                retagged += 1;
            }
        }
        tx.execute("DELETE FROM categories WHERE id = ?1", params![id])?;
        tx.commit()?;
        debug!("deleted category '{}', re-tagged {} words", category.name, retagged);
        Ok(retagged)
    }
}

impl WordStore for SqliteWordStore {
    fn get_all(&self) -> StoreResult<Vec<VocabularyItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {WORD_COLUMNS} FROM vocabulary ORDER BY created_at DESC, id DESC"
        ))?;
        let words = stmt
            .query_map([], row_to_word)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(words)
    }

    fn get_by_id(&self, id: i64) -> StoreResult<Option<VocabularyItem>> {
        Ok(get_word(&self.conn, id)?)
    }

    fn save(&self, item: &VocabularyItem) -> StoreResult<i64> {
        if item.id != 0 {
            let updated = self.conn.execute(
                "UPDATE vocabulary SET korean = ?1, meaning = ?2, pronunciation = ?3, example_sentence = ?4,
                    example_translation = ?5, category = ?6, word_type = ?7, difficulty = ?8, study_count = ?9,
                    correct_count = ?10, last_studied_at = ?11, is_favorite = ?12
                 WHERE id = ?13",
                params![
                    item.korean,
                    item.meaning,
                    item.pronunciation,
                    item.example_sentence,
                    item.example_translation,
                    item.category,
                    item.word_type,
                    item.difficulty,
                    item.study_count,
                    item.correct_count,
                    item.last_studied_at,
                    item.is_favorite,
                    item.id,
                ],
            )?;
            if updated == 0 {
                return Err(StoreError::WordNotFound(item.id));
            }
            return Ok(item.id);
        }

        self.conn.execute(
            "INSERT INTO vocabulary (korean, meaning, pronunciation, example_sentence, example_translation,
                category, word_type, difficulty, study_count, correct_count, last_studied_at, created_at, is_favorite)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                item.korean,
                item.meaning,
                item.pronunciation,
                item.example_sentence,
                item.example_translation,
                item.category,
                item.word_type,
                item.difficulty,
                item.study_count,
                item.correct_count,
                item.last_studied_at,
                item.created_at,
                item.is_favorite,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_all_categories(&self) -> StoreResult<Vec<Category>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY display_order, name"
        ))?;
        let categories = stmt
            .query_map([], row_to_category)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(categories)
    }

    /// Increment in SQL so concurrent answers to one word cannot lose an update
    fn record_result(
        &self,
        id: i64,
        correct: bool,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<VocabularyItem>> {
        let tx = self.conn.unchecked_transaction()?;
        let updated = tx.execute(
            "UPDATE vocabulary
             SET study_count = study_count + 1, correct_count = correct_count + ?2, last_studied_at = ?3
             WHERE id = ?1",
            params![id, correct as u32, at],
        )?;
        if updated == 0 {
            return Ok(None);
        }
        let word = get_word(&tx, id)?;
        tx.commit()?;
        Ok(word)
    }
}

fn get_word(conn: &Connection, id: i64) -> rusqlite::Result<Option<VocabularyItem>> {
    conn.query_row(
        &format!("SELECT {WORD_COLUMNS} FROM vocabulary WHERE id = ?1"),
        params![id],
        row_to_word,
    )
    .optional()
}

fn row_to_word(row: &Row<'_>) -> rusqlite::Result<VocabularyItem> {
    Ok(VocabularyItem {
        id: row.get(0)?,
        korean: row.get(1)?,
        meaning: row.get(2)?,
        pronunciation: row.get(3)?,
        example_sentence: row.get(4)?,
        example_translation: row.get(5)?,
        category: row.get(6)?,
        word_type: row.get(7)?,
        difficulty: row.get(8)?,
        study_count: row.get(9)?,
        correct_count: row.get(10)?,
        last_studied_at: row.get(11)?,
        created_at: row.get(12)?,
        is_favorite: row.get(13)?,
    })
}

fn row_to_category(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        color: row.get(2)?,
        display_order: row.get(3)?,
        created_at: row.get(4)?,
    })
}

/// Lowercase with all whitespace removed
fn squash(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn store() -> SqliteWordStore {
        SqliteWordStore::open_in_memory().unwrap()
    }

    fn add(store: &SqliteWordStore, korean: &str, meaning: &str, category: Option<&str>) -> i64 {
        let mut word = VocabularyItem::new(korean, meaning);
        word.category = category.map(str::to_string);
        store.save(&word).unwrap()
    }

    #[test]
    fn test_reserved_categories_seeded() {
        let store = store();
        let categories = store.get_all_categories().unwrap();
        let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["All", "Favorites", "New", "NeedsReview"]);
        let orders: Vec<u32> = categories.iter().map(|c| c.display_order).collect();
        assert_eq!(orders, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_reopen_does_not_duplicate_seed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vocab.db");
        {
            let store = SqliteWordStore::open(&path).unwrap();
            store.save_category(&Category::new("Food")).unwrap();
        }
        let store = SqliteWordStore::open(&path).unwrap();
        assert_eq!(store.get_all_categories().unwrap().len(), 5);
    }

    #[test]
    fn test_reopen_after_reorder_keeps_orders_unique() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vocab.db");
        {
            let store = SqliteWordStore::open(&path).unwrap();
            let food = store.save_category(&Category::new("Food")).unwrap();
            store.save_category(&Category::new("Travel")).unwrap();
            let mut categories = store.get_all_categories().unwrap();
            let changed = crate::categories::move_up(&mut categories, food);
            store.update_category_order(&changed).unwrap();
        }

        let store = SqliteWordStore::open(&path).unwrap();
        let categories = store.get_all_categories().unwrap();
        let listed: Vec<(&str, u32)> = categories
            .iter()
            .map(|c| (c.name.as_str(), c.display_order))
            .collect();
        assert_eq!(
            listed,
            vec![
                ("All", 0),
                ("Favorites", 1),
                ("New", 2),
                ("NeedsReview", 3),
                ("Food", 4),
                ("Travel", 5)
            ]
        );
    }

    #[test]
    fn test_reserved_category_cannot_be_renamed() {
        let store = store();
        let mut all = store.get_all_categories().unwrap().remove(0);
        all.name = "Everything".to_string();
        assert!(matches!(
            store.save_category(&all),
            Err(StoreError::ReservedCategory(name)) if name == "All"
        ));

        // Recolouring is still allowed
        all.name = "All".to_string();
        all.color = "#000000".to_string();
        store.save_category(&all).unwrap();
        assert_eq!(store.get_category(all.id).unwrap().unwrap().color, "#000000");
    }

    #[test]
    fn test_missing_reserved_category_restored_on_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vocab.db");
        {
            let store = SqliteWordStore::open(&path).unwrap();
            store.save_category(&Category::new("Food")).unwrap();
            store
                .conn
                .execute("UPDATE categories SET name = 'Everything' WHERE name = 'All'", [])
                .unwrap();
        }

        let store = SqliteWordStore::open(&path).unwrap();
        let names: Vec<String> = store
            .get_all_categories()
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names[..4], ["All", "Favorites", "New", "NeedsReview"]);
        assert_eq!(names.len(), 6);
    }

    #[test]
    fn test_save_and_get_roundtrip() {
        let store = store();
        let mut word = VocabularyItem::new("학교", "trường học");
        word.pronunciation = Some("hak-gyo".to_string());
        word.word_type = Some("명사".to_string());
        word.is_favorite = true;
        let id = store.save(&word).unwrap();

        let loaded = store.get_by_id(id).unwrap().unwrap();
        assert_eq!(loaded.korean, "학교");
        assert_eq!(loaded.pronunciation.as_deref(), Some("hak-gyo"));
        assert!(loaded.is_favorite);
        assert_eq!(loaded.last_studied_at, None);
        assert!(store.get_by_id(id + 100).unwrap().is_none());
    }

    #[test]
    fn test_update_missing_word_fails() {
        let store = store();
        let mut word = VocabularyItem::new("없다", "không có");
        word.id = 42;
        assert!(matches!(store.save(&word), Err(StoreError::WordNotFound(42))));
    }

    #[test]
    fn test_get_all_newest_first() {
        let store = store();
        let base = Utc::now();
        for (i, korean) in ["하나", "둘", "셋"].iter().enumerate() {
            let mut word = VocabularyItem::new(*korean, "số");
            word.created_at = base + Duration::minutes(i as i64);
            store.save(&word).unwrap();
        }
        let all: Vec<String> = store.get_all().unwrap().into_iter().map(|w| w.korean).collect();
        assert_eq!(all, vec!["셋", "둘", "하나"]);
    }

    #[test]
    fn test_record_result_increments() {
        let store = store();
        let id = add(&store, "물", "nước", None);
        let now = Utc::now();

        let after = store.record_result(id, true, now).unwrap().unwrap();
        assert_eq!((after.study_count, after.correct_count), (1, 1));
        let after = store.record_result(id, false, now).unwrap().unwrap();
        assert_eq!((after.study_count, after.correct_count), (2, 1));
        assert!(after.last_studied_at.is_some());

        assert!(store.record_result(id + 1, true, now).unwrap().is_none());
    }

    #[test]
    fn test_search_ignores_case_and_spaces() {
        let store = store();
        add(&store, "안녕 하세요", "Xin chào", None);
        add(&store, "감사합니다", "cảm ơn", None);

        assert_eq!(store.search("안녕하세요").unwrap().len(), 1);
        assert_eq!(store.search("XIN CHAO").unwrap().len(), 0);
        assert_eq!(store.search("xinchào").unwrap().len(), 1);
    }

    #[test]
    fn test_find_duplicate() {
        let store = store();
        let id = add(&store, "사랑", "tình yêu", None);
        assert!(store.find_duplicate(" 사 랑 ", None).unwrap().is_some());
        assert!(store.find_duplicate("사랑", Some(id)).unwrap().is_none());
    }

    #[test]
    fn test_new_category_appended() {
        let store = store();
        let id = store.save_category(&Category::new("Food")).unwrap();
        let food = store.get_category(id).unwrap().unwrap();
        assert_eq!(food.display_order, 4);
    }

    #[test]
    fn test_delete_category_untags_words() {
        let store = store();
        let food = store.save_category(&Category::new("Food")).unwrap();
        let a = add(&store, "밥", "cơm", Some("Food,Common"));
        let b = add(&store, "빵", "bánh mì", Some("Food"));
        add(&store, "물", "nước", Some("Common"));

        assert_eq!(store.delete_category(food).unwrap(), 2);
        assert_eq!(store.get_by_id(a).unwrap().unwrap().category.as_deref(), Some("Common"));
        assert_eq!(store.get_by_id(b).unwrap().unwrap().category, None);
        assert!(store.get_category(food).unwrap().is_none());
    }

    #[test]
    fn test_failed_category_delete_keeps_word_tags() {
        let store = store();
        let food = store.save_category(&Category::new("Food")).unwrap();
        let id = add(&store, "밥", "cơm", Some("Food,Common"));
        store
            .conn
            .execute_batch(
                "CREATE TRIGGER keep_categories BEFORE DELETE ON categories
                 BEGIN SELECT RAISE(ABORT, 'locked'); END;",
            )
            .unwrap();

        assert!(matches!(store.delete_category(food), Err(StoreError::Sqlite(_))));
        assert_eq!(
            store.get_by_id(id).unwrap().unwrap().category.as_deref(),
            Some("Food,Common")
        );
        assert!(store.get_category(food).unwrap().is_some());
    }

    #[test]
    fn test_reserved_category_cannot_be_deleted() {
        let store = store();
        let all = store.get_all_categories().unwrap().remove(0);
        assert!(matches!(
            store.delete_category(all.id),
            Err(StoreError::ReservedCategory(_))
        ));
    }

    #[test]
    fn test_update_category_order() {
        let store = store();
        let mut categories = store.get_all_categories().unwrap();
        categories[0].display_order = 3;
        categories[3].display_order = 0;
        store
            .update_category_order(&[categories[0].clone(), categories[3].clone()])
            .unwrap();
        let names: Vec<String> = store
            .get_all_categories()
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["NeedsReview", "Favorites", "New", "All"]);
    }

    #[test]
    fn test_words_in_category() {
        let store = store();
        add(&store, "안녕", "xin chào", Some("Greetings,Common"));
        add(&store, "바다", "biển", Some("Nature"));
        assert_eq!(store.words_in_category("Common").unwrap().len(), 1);
        assert_eq!(store.words_in_category("Comm").unwrap().len(), 0);
        assert_eq!(store.words_in_category("All").unwrap().len(), 2);
    }
}
