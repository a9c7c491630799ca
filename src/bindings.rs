//! Python bindings over a database path

use pyo3::exceptions::PyRuntimeError;
use pyo3::prelude::*;

use crate::categories::category_counts;
use crate::choices::{build_choices, Direction};
use crate::db::SqliteWordStore;
use crate::grading::grade;
use crate::model::{join_categories, VocabularyItem};
use crate::sampler::{select_random, SampleFilter};
use crate::scheduler::select_for_review;
use crate::settings::DEFAULT_DISTRACTOR_POOL;
use crate::store::WordStore;

/// Vocabulary word as seen from Python
#[pyclass(name = "Word")]
#[derive(Debug, Clone)]
pub struct PyWord {
    #[pyo3(get)]
    pub id: i64,
    #[pyo3(get)]
    pub korean: String,
    #[pyo3(get)]
    pub meaning: String,
    #[pyo3(get)]
    pub pronunciation: Option<String>,
    #[pyo3(get)]
    pub category: Option<String>,
    #[pyo3(get)]
    pub word_type: Option<String>,
    #[pyo3(get)]
    pub study_count: u32,
    #[pyo3(get)]
    pub correct_count: u32,
    #[pyo3(get)]
    pub is_favorite: bool,
}

#[pymethods]
impl PyWord {
    fn __repr__(&self) -> String {
        format!(
            "Word(id={}, korean='{}', studied={}/{})",
            self.id, self.korean, self.correct_count, self.study_count
        )
    }
}

impl From<&VocabularyItem> for PyWord {
    fn from(word: &VocabularyItem) -> Self {
        Self {
            id: word.id,
            korean: word.korean.clone(),
            meaning: word.meaning.clone(),
            pronunciation: word.pronunciation.clone(),
            category: word.category.clone(),
            word_type: word.word_type.clone(),
            study_count: word.study_count,
            correct_count: word.correct_count,
            is_favorite: word.is_favorite,
        }
    }
}

/// Category with the number of words listed under it
#[pyclass(name = "CategoryInfo")]
#[derive(Debug, Clone)]
pub struct PyCategory {
    #[pyo3(get)]
    pub id: i64,
    #[pyo3(get)]
    pub name: String,
    #[pyo3(get)]
    pub color: String,
    #[pyo3(get)]
    pub display_order: u32,
    #[pyo3(get)]
    pub word_count: usize,
}

fn to_py_err(e: impl std::fmt::Display) -> PyErr {
    PyRuntimeError::new_err(e.to_string())
}

fn open(db_path: &str) -> PyResult<SqliteWordStore> {
    SqliteWordStore::open(db_path).map_err(to_py_err)
}

fn to_py_words(words: &[VocabularyItem]) -> Vec<PyWord> {
    words.iter().map(PyWord::from).collect()
}

#[pyfunction]
#[pyo3(name = "init_database")]
pub fn py_init_database(db_path: &str) -> PyResult<()> {
    open(db_path).map(|_| ())
}

#[pyfunction]
#[pyo3(name = "get_all_words")]
pub fn py_get_all_words(db_path: &str) -> PyResult<Vec<PyWord>> {
    let store = open(db_path)?;
    let words = store.get_all().map_err(to_py_err)?;
    Ok(to_py_words(&words))
}

#[pyfunction]
#[pyo3(name = "add_word", signature = (db_path, korean, meaning, categories=None, word_type=None))]
pub fn py_add_word(
    db_path: &str,
    korean: &str,
    meaning: &str,
    categories: Option<Vec<String>>,
    word_type: Option<String>,
) -> PyResult<i64> {
    let store = open(db_path)?;
    let mut word = VocabularyItem::new(korean.trim(), meaning.trim());
    word.category = join_categories(categories.unwrap_or_default());
    word.word_type = word_type;
    store.save(&word).map_err(to_py_err)
}

#[pyfunction]
#[pyo3(name = "get_categories")]
pub fn py_get_categories(db_path: &str) -> PyResult<Vec<PyCategory>> {
    let store = open(db_path)?;
    let categories = store.get_all_categories().map_err(to_py_err)?;
    let words = store.get_all().map_err(to_py_err)?;
    Ok(category_counts(&categories, &words)
        .into_iter()
        .map(|c| PyCategory {
            id: c.category.id,
            name: c.category.name,
            color: c.category.color,
            display_order: c.category.display_order,
            word_count: c.count,
        })
        .collect())
}

#[pyfunction]
#[pyo3(name = "select_for_review")]
pub fn py_select_for_review(db_path: &str, count: usize) -> PyResult<Vec<PyWord>> {
    let store = open(db_path)?;
    let words = store.get_all().map_err(to_py_err)?;
    let picked = select_for_review(&words, count, &mut rand::thread_rng());
    Ok(to_py_words(&picked))
}

#[pyfunction]
#[pyo3(name = "select_random", signature = (db_path, count, categories=None, word_type=None))]
pub fn py_select_random(
    db_path: &str,
    count: usize,
    categories: Option<Vec<String>>,
    word_type: Option<String>,
) -> PyResult<Vec<PyWord>> {
    let store = open(db_path)?;
    let words = store.get_all().map_err(to_py_err)?;
    let filter = SampleFilter {
        categories: categories.unwrap_or_default(),
        word_type,
    };
    let picked = select_random(&words, count, &filter, &mut rand::thread_rng());
    Ok(to_py_words(&picked))
}

#[pyfunction]
#[pyo3(name = "build_choices", signature = (db_path, word_id, reverse=false))]
pub fn py_build_choices(db_path: &str, word_id: i64, reverse: bool) -> PyResult<Vec<String>> {
    let store = open(db_path)?;
    let word = store
        .get_by_id(word_id)
        .map_err(to_py_err)?
        .ok_or_else(|| to_py_err(format!("Word not found: {}", word_id)))?;
    let words = store.get_all().map_err(to_py_err)?;

    let mut rng = rand::thread_rng();
    let pool = select_random(&words, DEFAULT_DISTRACTOR_POOL, &SampleFilter::default(), &mut rng);
    let direction = if reverse { Direction::Reverse } else { Direction::Forward };
    Ok(build_choices(&word, direction, &pool, &mut rng).to_vec())
}

/// Returns the word's updated (study_count, correct_count), or None if it is gone
#[pyfunction]
#[pyo3(name = "record_answer")]
pub fn py_record_answer(db_path: &str, word_id: i64, correct: bool) -> PyResult<Option<(u32, u32)>> {
    let store = open(db_path)?;
    let updated = store
        .record_result(word_id, correct, chrono::Utc::now())
        .map_err(to_py_err)?;
    Ok(updated.map(|w| (w.study_count, w.correct_count)))
}

/// Returns (is_correct, similarity, near_miss)
#[pyfunction]
#[pyo3(name = "check_answer")]
pub fn py_check_answer(user_input: &str, expected: &str) -> (bool, f64, bool) {
    let grade = grade(user_input, expected);
    (grade.is_correct, grade.similarity, grade.is_near_miss())
}
