//! Error types for the word store and study sessions

use thiserror::Error;

use crate::session::AnswerOutcome;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Word not found: {0}")]
    WordNotFound(i64),

    #[error("Category not found: {0}")]
    CategoryNotFound(i64),

    #[error("Reserved category cannot be deleted: {0}")]
    ReservedCategory(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StudyError {
    /// A store call failed; selection is unavailable
    #[error("Word store error: {0}")]
    Store(#[from] StoreError),

    /// The answer was graded and the session moved on, but the counters were not written
    #[error("Answer recorded in session but statistics were not saved: {source}")]
    StatsNotSaved {
        outcome: AnswerOutcome,
        #[source]
        source: StoreError,
    },

    #[error("Invalid settings: {0}")]
    Settings(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StudyError>;
