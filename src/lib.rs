//! Korean vocabulary study core
//!
//! Word selection, multiple-choice generation, answer grading and the study
//! session state machine for a flashcard app, over a SQLite word store.

pub mod categories;
pub mod choices;
pub mod db;
pub mod error;
pub mod grading;
pub mod model;
pub mod progress;
pub mod sampler;
pub mod scheduler;
pub mod session;
pub mod settings;
pub mod store;

#[cfg(feature = "python")]
mod bindings;

pub use categories::{category_counts, filter_by_category, move_down, move_up, normalize_order, CategoryCount};
pub use choices::{build_choices, ChoiceSet, Direction};
pub use db::SqliteWordStore;
pub use error::{StoreError, StudyError};
pub use grading::{grade, Grade};
pub use model::{Category, VocabularyItem};
pub use progress::ProgressStats;
pub use sampler::{select_random, SampleFilter};
pub use scheduler::select_for_review;
pub use session::{AnswerOutcome, SessionRunner, SessionState, SessionSummary, Submission};
pub use settings::{AnswerMode, SelectionMode, StudySettings};
pub use store::WordStore;

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Python module
#[cfg(feature = "python")]
#[pymodule]
fn kvocab_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Store
    m.add_function(wrap_pyfunction!(bindings::py_init_database, m)?)?;
    m.add_function(wrap_pyfunction!(bindings::py_get_all_words, m)?)?;
    m.add_function(wrap_pyfunction!(bindings::py_add_word, m)?)?;
    m.add_function(wrap_pyfunction!(bindings::py_get_categories, m)?)?;

    // Selection
    m.add_function(wrap_pyfunction!(bindings::py_select_for_review, m)?)?;
    m.add_function(wrap_pyfunction!(bindings::py_select_random, m)?)?;

    // Answering
    m.add_function(wrap_pyfunction!(bindings::py_build_choices, m)?)?;
    m.add_function(wrap_pyfunction!(bindings::py_record_answer, m)?)?;
    m.add_function(wrap_pyfunction!(bindings::py_check_answer, m)?)?;

    m.add_class::<bindings::PyWord>()?;
    m.add_class::<bindings::PyCategory>()?;

    Ok(())
}
